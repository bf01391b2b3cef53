//! # automd Core Library
//!
//! Prepares the structural and parameter files of nonstandard residues and small
//! molecules for AMBER molecular-dynamics simulation.
//!
//! ## Architectural Philosophy
//!
//! The library follows a layered architecture so that text handling, the
//! reconciliation logic and file-level orchestration stay separate.
//!
//! - **[`core`]: The Foundation.** Stateless atom models, fixed-column readers and
//!   writers for structural files and residue templates, and identifier tables.
//!
//! - **[`engine`]: The Logic Core.** Duplicate-name resolution, the cross-format
//!   identity map, the template section rewriter, charge constraints and the
//!   mainchain descriptor. Every operation here works on in-memory records.
//!
//! - **[`workflows`]: The Public API.** Reads input files, drives the engine and
//!   writes the output files each preparation step produces.
//!
//! - **[`tools`]: External Collaborators.** Argument contracts and a synchronous
//!   runner for the typing, gap-filling, truncation, charge-fitting, system-building
//!   and quantum-chemistry executables, plus scratch-file cleanup.

pub mod core;
pub mod engine;
pub mod tools;
pub mod workflows;
