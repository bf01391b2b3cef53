//! # Core Module
//!
//! Fundamental data structures and text codecs used by every preparation step.
//!
//! ## Architecture
//!
//! - **Atom Representation** ([`models`]) - Atoms, template charges and residue names
//! - **File I/O** ([`io`]) - Fixed-column structural files and residue templates
//! - **Identifier Tables** ([`utils`]) - Capping residues, halogen prefixes and
//!   hydrogen-name canonicalization

pub mod io;
pub mod models;
pub mod utils;
