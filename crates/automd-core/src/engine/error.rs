use super::config::{ChargeTableError, ConfigError};
use crate::core::io::pdb::PdbError;
use crate::core::io::prepi::TemplateError;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PrepError {
    #[error("Atom '{name}' has no identity mapping (template line {line_number}: '{line}')")]
    MissingIdentity {
        name: String,
        line_number: usize,
        line: String,
    },

    #[error(
        "Record count mismatch: canonical file has {canonical} atom records but typing-tool file has {typed}"
    )]
    RecordCountMismatch { canonical: usize, typed: usize },

    #[error("Typing-tool atom '{typed}' maps to both '{first}' and '{second}'")]
    AmbiguousIdentity {
        typed: String,
        first: String,
        second: String,
    },

    #[error("No free name for duplicate atom '{name}' after {attempts} attempts")]
    NamingCollisionExhausted { name: String, attempts: usize },

    #[error("Duplicated atom names outside capping residues: {}", .names.join(", "))]
    DuplicateAtomNames { names: Vec<String> },

    #[error("Template atom '{name}' is absent from the structural file")]
    AtomNotInStructure { name: String },

    #[error("Residue {residue_id} not found in structural file")]
    ResidueNotFound { residue_id: isize },

    #[error("Required file not found: {}", .0.display())]
    MissingFile(PathBuf),

    #[error("Invalid configuration: {0}")]
    Config(#[from] ConfigError),

    #[error("Structural file error: {0}")]
    Structure(#[from] PdbError),

    #[error("Residue template error: {0}")]
    Template(#[from] TemplateError),

    #[error("Charge table error: {0}")]
    ChargeTable(#[from] ChargeTableError),

    #[error("I/O error on '{}': {source}", .path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
}

impl PrepError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        PrepError::Io {
            path: path.into(),
            source,
        }
    }
}
