//! Provides input/output functionality for the fixed-column text formats exchanged
//! with the external tools.
//!
//! Structural files are handled by [`pdb`], residue parameter templates by
//! [`prepi`]. Both preserve the exact column offsets the external tools expect.

pub mod pdb;
pub mod prepi;
