//! # Workflows Module
//!
//! File-level entry points for each preparation step. Every workflow checks its
//! inputs exist, reads them, drives the [`engine`](crate::engine) and writes the
//! step's output files; the external tools run in between are the caller's concern.
//!
//! - **Ligand Workflows** ([`ligand`]) - Canonical structural file and charged ligand structure
//! - **Residue Workflows** ([`residue`]) - Capped fragments, quantum-chemistry structures,
//!   charge constraints, mainchain descriptors and the final residue template

pub mod ligand;
pub mod residue;

use crate::engine::error::PrepError;
use std::path::Path;

pub(crate) fn read_input(path: &Path) -> Result<String, PrepError> {
    if !path.is_file() {
        return Err(PrepError::MissingFile(path.to_path_buf()));
    }
    std::fs::read_to_string(path).map_err(|e| PrepError::io(path, e))
}

pub(crate) fn write_output(path: &Path, content: &str) -> Result<(), PrepError> {
    std::fs::write(path, content).map_err(|e| PrepError::io(path, e))
}
