use super::error::PrepError;
use crate::core::io::pdb::StructureFile;
use crate::core::models::atom::{Atom, AtomCharge, AtomLineVariant};
use std::collections::HashMap;

const TERMINATOR: &str = "TER";

/// Joins template charges onto the canonical structure by atom name.
///
/// Atoms come out in template order with serials 1..N and the template charge
/// set; every template atom must exist in the structure.
pub fn charged_atoms(
    structure: &StructureFile,
    charges: &[AtomCharge],
) -> Result<Vec<Atom>, PrepError> {
    let by_name: HashMap<&str, &Atom> = structure
        .atoms()
        .map(|atom| (atom.name.as_str(), atom))
        .collect();

    charges
        .iter()
        .enumerate()
        .map(|(idx, entry)| {
            let source = by_name
                .get(entry.name.as_str())
                .ok_or_else(|| PrepError::AtomNotInStructure {
                    name: entry.name.clone(),
                })?;
            let mut atom = (*source).clone();
            atom.set_serial(idx + 1);
            atom.set_charge(entry.charge);
            Ok(atom)
        })
        .collect()
}

/// Charged atom lines followed by the `TER` record.
pub fn render_charged_structure(atoms: &[Atom]) -> String {
    let mut output = String::new();
    for atom in atoms {
        output.push_str(&atom.record_line(AtomLineVariant::Charged));
        output.push('\n');
    }
    output.push_str(TERMINATOR);
    output.push('\n');
    output
}

/// Sum of the assigned charges, rounded as the typing tool reports net charge.
pub fn net_charge(atoms: &[Atom]) -> f64 {
    let total: f64 = atoms.iter().map(|a| a.charge).sum();
    (total * 1e4).round() / 1e4
}
