//! Atom-level data models shared by the readers, writers and the engine.

pub mod atom;
pub mod residue;
