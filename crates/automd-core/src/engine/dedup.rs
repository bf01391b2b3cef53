use super::error::PrepError;
use crate::core::io::pdb::{RecordKind, StructureFile};
use crate::core::models::residue::ResidueName;
use crate::core::utils::identifiers::element_class;
use std::collections::HashSet;
use tracing::debug;

/// Infix between the element prefix and the numeric suffix of a synthesized name.
const RENAME_INFIX: &str = "X";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rename {
    /// Output serial of the renamed atom.
    pub serial: usize,
    pub from: String,
    pub to: String,
}

#[derive(Debug, Clone)]
pub struct DedupOutcome {
    pub structure: StructureFile,
    pub renames: Vec<Rename>,
}

/// Produces the canonical structural file: pairwise-distinct atom names, serials
/// 1..N, every record assigned to `residue_name` with residue index 1.
///
/// A repeated name is replaced by its element prefix, `X` and the smallest
/// integer suffix not taken by any name of the file. The input is left untouched.
pub fn resolve_duplicate_names(
    input: &StructureFile,
    residue_name: &ResidueName,
    max_attempts: usize,
) -> Result<DedupOutcome, PrepError> {
    let mut taken: HashSet<String> = input.atoms().map(|a| a.name.clone()).collect();
    let mut accepted: HashSet<String> = HashSet::with_capacity(input.len());
    let mut renames = Vec::new();
    let mut structure = StructureFile {
        records: Vec::with_capacity(input.len()),
    };

    for (idx, source) in input.records.iter().enumerate() {
        let serial = idx + 1;
        let mut record = source.clone();

        if accepted.contains(&record.atom.name) {
            let replacement = next_free_name(&record.atom.name, &taken, max_attempts)?;
            debug!(
                serial,
                from = %record.atom.name,
                to = %replacement,
                "Renaming duplicate atom"
            );
            renames.push(Rename {
                serial,
                from: record.atom.name.clone(),
                to: replacement.clone(),
            });
            taken.insert(replacement.clone());
            record.atom.name = replacement;
        }
        accepted.insert(record.atom.name.clone());

        record.kind = RecordKind::Atom;
        record.alt_loc.clear();
        record.chain_id.clear();
        record.insertion_code.clear();
        record.atom.residue_name = residue_name.as_str().to_string();
        record.atom.residue_id = 1;
        structure.records.push(record);
    }
    structure.renumber();

    Ok(DedupOutcome { structure, renames })
}

fn next_free_name(
    name: &str,
    taken: &HashSet<String>,
    max_attempts: usize,
) -> Result<String, PrepError> {
    let prefix = element_class(name);
    (1..=max_attempts)
        .map(|suffix| format!("{prefix}{RENAME_INFIX}{suffix}"))
        .find(|candidate| !taken.contains(candidate))
        .ok_or_else(|| PrepError::NamingCollisionExhausted {
            name: name.to_string(),
            attempts: max_attempts,
        })
}
