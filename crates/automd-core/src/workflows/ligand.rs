use super::{read_input, write_output};
use crate::core::io::pdb::StructureFile;
use crate::core::io::prepi::read_template_charges;
use crate::core::models::atom::Atom;
use crate::engine::config::PrepConfig;
use crate::engine::dedup::{DedupOutcome, resolve_duplicate_names};
use crate::engine::error::PrepError;
use crate::engine::ligand::{charged_atoms, net_charge, render_charged_structure};
use std::path::Path;
use tracing::{info, instrument, warn};

/// Writes the canonical structural file for `config.residue_name`.
#[instrument(skip_all, name = "format_workflow")]
pub fn format_structure(
    input: &Path,
    output: &Path,
    config: &PrepConfig,
) -> Result<DedupOutcome, PrepError> {
    let text = read_input(input)?;
    let structure = StructureFile::parse_str(&text)?;
    if structure.is_empty() {
        warn!(path = %input.display(), "Structural file has no atom records");
    }
    info!(
        atoms = structure.len(),
        residue = %config.residue_name,
        "Resolving duplicate atom names"
    );

    let outcome = resolve_duplicate_names(&structure, &config.residue_name, config.max_rename_attempts)?;
    let mut buffer = Vec::new();
    outcome.structure.write_to(&mut buffer)?;
    write_output(output, &String::from_utf8_lossy(&buffer))?;

    info!(
        renamed = outcome.renames.len(),
        path = %output.display(),
        "Wrote canonical structural file"
    );
    Ok(outcome)
}

/// Writes the canonical structure with the residue template's charges, in
/// template order.
#[instrument(skip_all, name = "charged_ligand_workflow")]
pub fn emit_charged_structure(
    structure: &Path,
    template: &Path,
    output: &Path,
) -> Result<Vec<Atom>, PrepError> {
    let structure = StructureFile::parse_str(&read_input(structure)?)?;
    let charges = read_template_charges(&mut read_input(template)?.as_bytes())?;

    let atoms = charged_atoms(&structure, &charges)?;
    write_output(output, &render_charged_structure(&atoms))?;
    info!(
        atoms = atoms.len(),
        net_charge = net_charge(&atoms),
        path = %output.display(),
        "Wrote charged structure"
    );
    Ok(atoms)
}
