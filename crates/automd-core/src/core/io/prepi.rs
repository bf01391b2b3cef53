use crate::core::models::atom::AtomCharge;
use crate::core::utils::identifiers::{DUMMY_ATOM_NAME, DUMMY_ATOM_TYPE};
use std::io::{self, BufRead};
use thiserror::Error;

pub const IMPROPER_MARKER: &str = "IMPROPER";
pub const LOOP_MARKER: &str = "LOOP";

const ATOM_ROW_FIELDS: usize = 11;
const ATOM_ROW_MIN_WIDTH: usize = 60;
const NAME_FIELD: std::ops::Range<usize> = 6..10;

#[derive(Debug, Error)]
pub enum TemplateError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
    #[error("Parse error on line {line}: {kind}")]
    Parse {
        line: usize,
        kind: TemplateParseErrorKind,
    },
}

#[derive(Debug, Error)]
pub enum TemplateParseErrorKind {
    #[error("Invalid atom index '{0}'")]
    InvalidIndex(String),
    #[error("Invalid partial charge '{0}'")]
    InvalidCharge(String),
}

/// Section markers recognized in a residue template.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SectionMarker {
    Improper,
    Loop,
}

impl SectionMarker {
    pub fn detect(line: &str) -> Option<Self> {
        match line.trim() {
            IMPROPER_MARKER => Some(SectionMarker::Improper),
            LOOP_MARKER => Some(SectionMarker::Loop),
            _ => None,
        }
    }
}

/// One row of the atom table of a residue template: index, name, type,
/// topological type, three connectivity indices, internal coordinates, charge.
#[derive(Debug, Clone, PartialEq)]
pub struct AtomTableRow {
    pub index: usize,
    pub name: String,
    pub atom_type: String,
    pub charge: f64,
}

impl AtomTableRow {
    /// Returns `Ok(None)` for any line that does not have the atom-row field count.
    pub fn parse(line: &str, line_number: usize) -> Result<Option<Self>, TemplateError> {
        let fields: Vec<&str> = line.split_whitespace().collect();
        if fields.len() != ATOM_ROW_FIELDS {
            return Ok(None);
        }
        let index = fields[0].parse().map_err(|_| TemplateError::Parse {
            line: line_number,
            kind: TemplateParseErrorKind::InvalidIndex(fields[0].to_string()),
        })?;
        let raw_charge = fields[ATOM_ROW_FIELDS - 1];
        let charge = raw_charge.parse().map_err(|_| TemplateError::Parse {
            line: line_number,
            kind: TemplateParseErrorKind::InvalidCharge(raw_charge.to_string()),
        })?;
        Ok(Some(Self {
            index,
            name: fields[1].to_string(),
            atom_type: fields[2].to_string(),
            charge,
        }))
    }

    pub fn is_dummy(&self) -> bool {
        self.atom_type == DUMMY_ATOM_TYPE || self.name == DUMMY_ATOM_NAME
    }
}

/// Whether `line` is a non-dummy atom row eligible for name translation.
pub fn is_renamable_atom_row(line: &str) -> bool {
    let content = line.trim_end_matches(['\n', '\r']);
    if content.len() < ATOM_ROW_MIN_WIDTH {
        return false;
    }
    let fields: Vec<&str> = content.split_whitespace().collect();
    fields.len() == ATOM_ROW_FIELDS && fields[2] != DUMMY_ATOM_TYPE
}

/// The atom name of an atom row, read from its whitespace-separated fields.
pub fn atom_row_name(line: &str) -> Option<&str> {
    line.split_whitespace().nth(1)
}

/// Replaces columns 7-10 of an atom row with `name`, left-justified to four characters.
pub fn replace_atom_row_name(line: &str, name: &str) -> Option<String> {
    let head = line.get(..NAME_FIELD.start)?;
    let tail = line.get(NAME_FIELD.end..)?;
    Some(format!("{head}{name:<4}{tail}"))
}

/// Reads the (name, charge) pairs of every non-dummy atom row.
pub fn read_template_charges(reader: &mut impl BufRead) -> Result<Vec<AtomCharge>, TemplateError> {
    let mut charges = Vec::new();
    for (idx, line_res) in reader.lines().enumerate() {
        let line = line_res?;
        if let Some(row) = AtomTableRow::parse(&line, idx + 1)? {
            if !row.is_dummy() {
                charges.push(AtomCharge::new(&row.name, row.charge));
            }
        }
    }
    Ok(charges)
}
