//! # Tools Module
//!
//! Contracts with the external executables the preparation relies on.
//!
//! - **Invocation** ([`command`]) - Argument builders, `PATH` lookup and a blocking runner
//! - **Quantum Chemistry** ([`qm`]) - Coordinate blocks, input decks and log checks
//! - **Cleanup** ([`cleanup`]) - Best-effort removal of scratch files
//! - **Error Handling** ([`error`]) - Tool failure type

pub mod cleanup;
pub mod command;
pub mod error;
pub mod qm;
