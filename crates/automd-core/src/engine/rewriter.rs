use super::error::PrepError;
use super::identity::IdentityMap;
use crate::core::io::prepi::{
    SectionMarker, atom_row_name, is_renamable_atom_row, replace_atom_row_name,
};
use crate::core::utils::identifiers::{canonicalize_hydrogen_names, is_backbone_linkage};
use tracing::{debug, trace};

const IMPROPER_ATOMS: usize = 4;
const LOOP_ATOMS: usize = 2;
const FIELD_WIDTH: usize = 5;

const FORWARD_LINK: [&str; IMPROPER_ATOMS] = ["CA", "+M", "C", "O"];
const BACKWARD_LINK: [&str; IMPROPER_ATOMS] = ["-M", "CA", "N", "H"];

/// Position of the rewriter within the residue template.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Section {
    AtomTable,
    /// Just after the `IMPROPER` marker; an immediate blank line is a header delimiter.
    ImproperHeader,
    ImproperRecords,
    LoopRecords,
    /// After the loop block, waiting for end of file.
    Idle,
}

/// Rewrites a residue template from typing-tool atom names to canonical names.
///
/// Atom rows get their name columns replaced in place, improper and loop records
/// are re-emitted in 5-column right-justified fields. For capped residues the
/// improper block is completed with the forward (`CA +M C O`) and backward
/// (`-M CA N H`) backbone records it lacks.
pub struct TemplateRewriter<'a> {
    map: &'a IdentityMap,
    capped: bool,
}

impl<'a> TemplateRewriter<'a> {
    pub fn new(map: &'a IdentityMap, capped: bool) -> Self {
        Self { map, capped }
    }

    pub fn rewrite(&self, template: &str) -> Result<String, PrepError> {
        let mut pass = RewritePass::new(self.map, self.capped, template.len());
        for (idx, raw) in template.split_inclusive('\n').enumerate() {
            pass.step(idx + 1, raw)?;
        }
        pass.finish();
        Ok(canonicalize_hydrogen_names(&pass.output))
    }
}

struct RewritePass<'a> {
    map: &'a IdentityMap,
    capped: bool,
    section: Section,
    forward_seen: bool,
    backward_seen: bool,
    /// Line ending of the most recent terminated line.
    eol: String,
    output: String,
}

impl<'a> RewritePass<'a> {
    fn new(map: &'a IdentityMap, capped: bool, capacity: usize) -> Self {
        Self {
            map,
            capped,
            section: Section::AtomTable,
            forward_seen: false,
            backward_seen: false,
            eol: "\n".to_string(),
            output: String::with_capacity(capacity),
        }
    }

    fn step(&mut self, line_number: usize, raw: &str) -> Result<(), PrepError> {
        let content = raw.trim_end_matches(['\n', '\r']);
        let ending = &raw[content.len()..];
        if !ending.is_empty() && ending != self.eol {
            self.eol = ending.to_string();
        }
        let fields: Vec<&str> = content.split_whitespace().collect();

        if let Some(marker) = SectionMarker::detect(content) {
            if self.in_improper_block() {
                self.close_improper_block();
            }
            self.output.push_str(raw);
            self.enter(match marker {
                SectionMarker::Improper => Section::ImproperHeader,
                SectionMarker::Loop => Section::LoopRecords,
            });
            return Ok(());
        }

        match self.section {
            Section::AtomTable => {
                if is_renamable_atom_row(content) {
                    let typed = atom_row_name(content).unwrap_or_default();
                    let canonical = self.map.translate(typed, line_number, content)?;
                    let renamed = replace_atom_row_name(content, canonical).ok_or_else(|| {
                        PrepError::MissingIdentity {
                            name: typed.to_string(),
                            line_number,
                            line: content.to_string(),
                        }
                    })?;
                    trace!(line_number, from = typed, to = canonical, "Renamed atom row");
                    self.output.push_str(&renamed);
                    self.output.push_str(ending);
                } else {
                    self.output.push_str(raw);
                }
            }
            Section::ImproperHeader if fields.is_empty() => {
                self.output.push_str(raw);
                self.section = Section::ImproperRecords;
            }
            Section::ImproperHeader | Section::ImproperRecords => {
                if fields.is_empty() {
                    self.close_improper_block();
                    self.section = Section::AtomTable;
                } else if fields.len() < IMPROPER_ATOMS {
                    self.close_improper_block();
                    self.output.push_str(raw);
                    self.section = Section::AtomTable;
                } else {
                    self.section = Section::ImproperRecords;
                    let record = self.translate_improper(&fields, line_number, content)?;
                    self.output.push_str(&record);
                    self.output.push_str(terminator(ending, &self.eol));
                }
            }
            Section::LoopRecords => {
                if fields.len() < LOOP_ATOMS {
                    self.output.push_str(raw);
                    self.section = Section::Idle;
                } else {
                    let mut record = String::with_capacity(LOOP_ATOMS * FIELD_WIDTH + 1);
                    for atom in &fields[..LOOP_ATOMS] {
                        let canonical = self.map.translate(atom, line_number, content)?;
                        push_field(&mut record, canonical);
                    }
                    self.output.push_str(&record);
                    self.output.push_str(terminator(ending, &self.eol));
                }
            }
            Section::Idle => self.output.push_str(raw),
        }
        Ok(())
    }

    fn finish(&mut self) {
        if self.in_improper_block() {
            if !self.output.is_empty() && !self.output.ends_with('\n') {
                self.output.push_str(&self.eol);
            }
            self.close_improper_block();
        }
    }

    fn enter(&mut self, section: Section) {
        if section == Section::ImproperHeader {
            self.forward_seen = false;
            self.backward_seen = false;
        }
        self.section = section;
    }

    fn in_improper_block(&self) -> bool {
        matches!(
            self.section,
            Section::ImproperHeader | Section::ImproperRecords
        )
    }

    fn translate_improper(
        &mut self,
        fields: &[&str],
        line_number: usize,
        content: &str,
    ) -> Result<String, PrepError> {
        let mut record = String::with_capacity(IMPROPER_ATOMS * FIELD_WIDTH + 1);
        for atom in &fields[..IMPROPER_ATOMS] {
            if is_backbone_linkage(atom) {
                self.forward_seen |= atom.contains("+M");
                self.backward_seen |= atom.contains("-M");
                push_field(&mut record, atom);
            } else {
                let canonical = self.map.translate(atom, line_number, content)?;
                push_field(&mut record, canonical);
            }
        }
        Ok(record)
    }

    /// Emits any missing backbone records for capped residues, then the blank
    /// terminator, all ending in the template's own line ending.
    fn close_improper_block(&mut self) {
        if self.capped {
            if !self.forward_seen {
                debug!("Injecting forward backbone improper");
                self.output.push_str(&link_record(&FORWARD_LINK, &self.eol));
            }
            if !self.backward_seen {
                debug!("Injecting backward backbone improper");
                self.output.push_str(&link_record(&BACKWARD_LINK, &self.eol));
            }
        }
        self.forward_seen = true;
        self.backward_seen = true;
        self.output.push_str(&self.eol);
    }
}

fn terminator<'s>(ending: &'s str, eol: &'s str) -> &'s str {
    if ending.is_empty() { eol } else { ending }
}

fn push_field(record: &mut String, atom: &str) {
    record.push_str(&format!("{:>width$}", atom, width = FIELD_WIDTH));
}

fn link_record(atoms: &[&str], eol: &str) -> String {
    let mut record = String::with_capacity(atoms.len() * FIELD_WIDTH + eol.len());
    for atom in atoms {
        push_field(&mut record, atom);
    }
    record.push_str(eol);
    record
}
