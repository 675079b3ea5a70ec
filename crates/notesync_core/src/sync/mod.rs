//! Optimistic synchronization engine.
//!
//! # Responsibility
//! - Coordinate local-first note mutations with the remote service.
//! - Debounce edits per note and reconcile results with explicit outcomes.
//!
//! # Invariants
//! - All mutation goes through `SyncCoordinator` on one logical thread.
//! - Operations on the same note are applied in submission order.

pub mod coordinator;
pub mod debounce;
pub mod outcome;
pub mod session;
