//! # Engine Module
//!
//! Reconciles atom identities between the structural file, the typing tool's
//! output and the residue template, and produces the auxiliary inputs the
//! external tools consume.
//!
//! ## Architecture
//!
//! - **Configuration** ([`config`]) - Residue settings, capping names and reference charge tables
//! - **Duplicate Names** ([`dedup`]) - Canonical structural file with distinct atom names
//! - **Identity Map** ([`identity`]) - Positional typing-tool to canonical name translation
//! - **Template Rewriting** ([`rewriter`]) - Section state machine over the residue template
//! - **Charge Constraints** ([`constraints`]) - Pinned cap and backbone charges for charge fitting
//! - **Mainchain Descriptor** ([`mainchain`]) - Head, tail and omitted atoms for residue truncation
//! - **Caps** ([`caps`]) - Capped single-residue fragments and quantum-chemistry structures
//! - **Charged Ligand** ([`ligand`]) - Template charges joined back onto coordinates
//! - **Error Handling** ([`error`]) - Engine error type

pub mod caps;
pub mod config;
pub mod constraints;
pub mod dedup;
pub mod error;
pub mod identity;
pub mod ligand;
pub mod mainchain;
pub mod rewriter;
