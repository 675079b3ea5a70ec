//! Remote note service boundary.
//!
//! # Responsibility
//! - Define the list/create/update/delete contract the sync engine consumes.
//! - Provide a file-backed service usable by the CLI and local setups.
//!
//! # Invariants
//! - Every remote failure is reported as a single `TransientFailure` kind.
//! - Remote ids are plain strings; temporary client ids never cross this boundary.

pub mod file_service;
pub mod service;
