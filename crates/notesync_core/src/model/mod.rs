//! Domain model for the optimistic note list.
//!
//! # Responsibility
//! - Define the note record shared by store, cache and remote layers.
//! - Distinguish client-minted temporary ids from server-issued stable ids.
//!
//! # Invariants
//! - A `NoteId` is either temporary or stable, never both.
//! - Temporary tokens are strictly increasing within one minting generator.

pub mod note;
