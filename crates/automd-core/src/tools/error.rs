use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ToolError {
    #[error("'{program}' was not found in PATH or is not executable")]
    NotFound { program: String },

    #[error("Failed to start '{program}': {source}")]
    Spawn {
        program: String,
        source: std::io::Error,
    },

    #[error("'{program}' exited with {}: {stderr}", .status.map_or("a signal".to_string(), |c| format!("status {c}")))]
    NonZeroExit {
        program: String,
        status: Option<i32>,
        stderr: String,
    },

    #[error("'{program}' did not produce expected file '{}'", .path.display())]
    MissingArtifact { program: String, path: PathBuf },

    #[error("Quantum-chemistry log '{}' does not end with normal termination", .log.display())]
    AbnormalTermination { log: PathBuf },

    #[error("I/O error on '{}': {source}", .path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
}
