//! Note domain model.
//!
//! # Responsibility
//! - Define the canonical note record rendered by the UI.
//! - Mint temporary ids for notes not yet confirmed by the remote service.
//!
//! # Invariants
//! - `Note::id` is the only identity field; text carries no identity.
//! - Minted temporary tokens never repeat and never decrease.

use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};

/// Client-minted placeholder identity, derived from epoch milliseconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TempToken(u64);

impl TempToken {
    /// Rebuilds a token from its raw value, e.g. when reading persisted state.
    pub fn from_value(value: u64) -> Self {
        Self(value)
    }

    /// Returns the raw token value.
    pub fn value(self) -> u64 {
        self.0
    }
}

/// Identity of a note as seen by the client.
///
/// A note starts with `Temporary` when created locally and switches to
/// `Stable` once the remote service confirms it.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NoteId {
    /// Placeholder used while the create call is in flight.
    Temporary(TempToken),
    /// Identifier issued by the remote service.
    Stable(String),
}

impl NoteId {
    /// Creates a stable id from a server-issued identifier.
    pub fn stable(id: impl Into<String>) -> Self {
        Self::Stable(id.into())
    }

    pub fn is_temporary(&self) -> bool {
        matches!(self, Self::Temporary(_))
    }

    /// Returns the server identifier, if this id has one.
    pub fn as_stable(&self) -> Option<&str> {
        match self {
            Self::Stable(id) => Some(id.as_str()),
            Self::Temporary(_) => None,
        }
    }
}

impl Display for NoteId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Temporary(token) => write!(f, "tmp:{}", token.0),
            Self::Stable(id) => write!(f, "{id}"),
        }
    }
}

/// One free-text note.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Note {
    pub id: NoteId,
    /// Arbitrary text, newlines allowed. Not validated by core.
    pub text: String,
    /// Creation time in epoch milliseconds, when known.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<i64>,
}

impl Note {
    pub fn new(id: NoteId, text: impl Into<String>) -> Self {
        Self {
            id,
            text: text.into(),
            created_at: None,
        }
    }

    /// Sets the creation timestamp (epoch milliseconds).
    pub fn with_created_at(mut self, created_at: i64) -> Self {
        self.created_at = Some(created_at);
        self
    }
}

/// Mints strictly increasing temporary tokens from epoch milliseconds.
///
/// Two mints within the same millisecond (or after the wall clock steps
/// backwards) still produce distinct, increasing values.
#[derive(Debug, Default)]
pub struct TempIdGenerator {
    last: u64,
}

impl TempIdGenerator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Mints the next temporary id for the given wall-clock reading.
    pub fn mint(&mut self, epoch_ms: i64) -> NoteId {
        let candidate = u64::try_from(epoch_ms).unwrap_or(0);
        let next = candidate.max(self.last.saturating_add(1));
        self.last = next;
        NoteId::Temporary(TempToken(next))
    }
}

#[cfg(test)]
mod tests {
    use super::{Note, NoteId, TempIdGenerator};

    #[test]
    fn mint_is_strictly_increasing_within_same_millisecond() {
        let mut generator = TempIdGenerator::new();
        let first = generator.mint(1_000);
        let second = generator.mint(1_000);
        let third = generator.mint(999);
        assert!(first < second);
        assert!(second < third);
        assert!(first.is_temporary());
    }

    #[test]
    fn mint_follows_wall_clock_when_it_moves_forward() {
        let mut generator = TempIdGenerator::new();
        generator.mint(10);
        match generator.mint(5_000) {
            NoteId::Temporary(token) => assert_eq!(token.value(), 5_000),
            other => panic!("unexpected id: {other}"),
        }
    }

    #[test]
    fn stable_id_display_is_the_raw_server_id() {
        let id = NoteId::stable("1718000000000");
        assert_eq!(id.to_string(), "1718000000000");
        assert_eq!(id.as_stable(), Some("1718000000000"));
    }

    #[test]
    fn note_serializes_without_missing_created_at() {
        let note = Note::new(NoteId::stable("a"), "line1\nline2");
        let json = serde_json::to_string(&note).expect("note should serialize");
        assert!(!json.contains("created_at"));
        let parsed: Note = serde_json::from_str(&json).expect("note should parse");
        assert_eq!(parsed, note);
    }
}
