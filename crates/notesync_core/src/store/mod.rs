//! Canonical in-memory note collection.
//!
//! # Responsibility
//! - Hold the ordered note list that the UI renders.
//! - Offer the small set of atomic mutations the sync engine relies on.
//!
//! # Invariants
//! - Note ids are unique at all times.
//! - Only the sync coordinator mutates the store.

pub mod note_store;
