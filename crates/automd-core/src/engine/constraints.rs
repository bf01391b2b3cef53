use super::config::{CapNames, ChargeTables};
use crate::core::io::pdb::StructureFile;
use std::fmt;
use tracing::debug;

const NAMELIST_END: &str = "&end";

/// Pins the charge of one atom during charge fitting.
#[derive(Debug, Clone, PartialEq)]
pub struct ChargeConstraint {
    /// 1-based position of the atom among the structure's atom records.
    pub position: usize,
    pub atom_name: String,
    pub charge: f64,
}

impl fmt::Display for ChargeConstraint {
    /// Group of one atom: the group size and charge, then the (molecule, atom) pair.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{:>5}{:>10.5}", 1, self.charge)?;
        writeln!(f, "{:>5}{:>5}", 1, self.position)
    }
}

/// Collects a constraint for every atom with a reference charge in its role's table.
///
/// Capping-residue atoms are looked up in the N- or C-cap table, every other
/// atom in the backbone table.
pub fn charge_constraints(
    structure: &StructureFile,
    caps: &CapNames,
    tables: &ChargeTables,
) -> Vec<ChargeConstraint> {
    let constraints: Vec<ChargeConstraint> = structure
        .atoms()
        .enumerate()
        .filter_map(|(idx, atom)| {
            let role = caps.role_of(&atom.residue_name);
            tables.lookup(role, &atom.name).map(|charge| ChargeConstraint {
                position: idx + 1,
                atom_name: atom.name.clone(),
                charge,
            })
        })
        .collect();
    debug!(count = constraints.len(), "Generated charge constraints");
    constraints
}

/// Renders the constraint block appended to charge-fitting inputs, closed by two blank lines.
pub fn render_constraints(constraints: &[ChargeConstraint]) -> String {
    let mut block: String = constraints.iter().map(ToString::to_string).collect();
    block.push_str("\n\n");
    block
}

/// Drops everything after the first blank line that follows the `&end` namelist terminator.
pub fn truncate_after_namelist(input: &str) -> String {
    let mut output = String::with_capacity(input.len());
    let mut past_namelist = false;
    for line in input.split_inclusive('\n') {
        let trimmed = line.trim();
        if past_namelist && trimmed.is_empty() {
            break;
        }
        if trimmed == NAMELIST_END {
            past_namelist = true;
        }
        output.push_str(line);
    }
    output
}

/// Truncates a charge-fitting input and appends the rendered constraint block.
pub fn assemble_fitting_input(input: &str, constraints: &[ChargeConstraint]) -> String {
    let mut output = truncate_after_namelist(input);
    if !output.is_empty() && !output.ends_with('\n') {
        output.push('\n');
    }
    output.push_str(&render_constraints(constraints));
    output
}
