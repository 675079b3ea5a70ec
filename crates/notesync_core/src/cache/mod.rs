//! Client-side snapshot cache of the note list.
//!
//! # Responsibility
//! - Persist the last confirmed note list with its capture time.
//! - Apply the expiry policy used for cold-start rendering.
//! - Offer memory, JSON file and SQLite backends behind one contract.
//!
//! # Invariants
//! - A snapshot is only used for display while younger than the max age.
//! - Cache failures never undo a confirmed mutation; they are logged.

pub mod file_backend;
pub mod local_cache;
pub mod sqlite_backend;
