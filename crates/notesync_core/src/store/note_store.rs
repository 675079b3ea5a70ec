//! Ordered note store.
//!
//! # Responsibility
//! - Keep notes in display order (newest insert first).
//! - Provide position-preserving text/id replacement and rollback re-insertion.
//!
//! # Invariants
//! - No two notes share an id; every insert path checks for duplicates.
//! - `update_text` and `replace_id` never move a note.
//! - Each operation either fully applies or leaves the store untouched.

use crate::model::note::{Note, NoteId};
use log::warn;
use std::collections::HashSet;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub type StoreResult<T> = Result<T, StoreError>;

/// Semantic errors returned by store mutations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    DuplicateId(NoteId),
    NotFound(NoteId),
}

impl Display for StoreError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::DuplicateId(id) => write!(f, "note id already present: {id}"),
            Self::NotFound(id) => write!(f, "note not found: {id}"),
        }
    }
}

impl Error for StoreError {}

/// Canonical ordered collection of notes.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NoteStore {
    notes: Vec<Note>,
}

impl NoteStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns notes in display order.
    pub fn list(&self) -> &[Note] {
        &self.notes
    }

    pub fn len(&self) -> usize {
        self.notes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.notes.is_empty()
    }

    pub fn get(&self, id: &NoteId) -> Option<&Note> {
        self.notes.iter().find(|note| &note.id == id)
    }

    pub fn contains(&self, id: &NoteId) -> bool {
        self.position(id).is_some()
    }

    /// Returns the display index of `id`.
    pub fn position(&self, id: &NoteId) -> Option<usize> {
        self.notes.iter().position(|note| &note.id == id)
    }

    /// Prepends one note.
    pub fn insert_at_front(&mut self, note: Note) -> StoreResult<()> {
        if self.contains(&note.id) {
            return Err(StoreError::DuplicateId(note.id));
        }
        self.notes.insert(0, note);
        Ok(())
    }

    /// Re-inserts a note at a previously recorded index.
    ///
    /// The index is clamped to the current length, so a store that shrank in
    /// the meantime still receives the note at the nearest valid position.
    pub fn restore_at(&mut self, index: usize, note: Note) -> StoreResult<usize> {
        if self.contains(&note.id) {
            return Err(StoreError::DuplicateId(note.id));
        }
        let index = index.min(self.notes.len());
        self.notes.insert(index, note);
        Ok(index)
    }

    /// Replaces the whole collection.
    ///
    /// Later duplicates of an id are dropped. Returns the number dropped.
    pub fn replace_all(&mut self, notes: Vec<Note>) -> usize {
        let incoming = notes.len();
        let mut seen = HashSet::with_capacity(incoming);
        let unique: Vec<Note> = notes
            .into_iter()
            .filter(|note| seen.insert(note.id.clone()))
            .collect();
        let dropped = incoming - unique.len();
        if dropped > 0 {
            warn!(
                "event=store_replace_all module=store status=dedup dropped={} kept={}",
                dropped,
                unique.len()
            );
        }
        self.notes = unique;
        dropped
    }

    /// Replaces note text in place.
    pub fn update_text(&mut self, id: &NoteId, text: impl Into<String>) -> StoreResult<()> {
        let note = self
            .notes
            .iter_mut()
            .find(|note| &note.id == id)
            .ok_or_else(|| StoreError::NotFound(id.clone()))?;
        note.text = text.into();
        Ok(())
    }

    /// Removes one note and returns its former index with the value.
    pub fn remove(&mut self, id: &NoteId) -> StoreResult<(usize, Note)> {
        let index = self
            .position(id)
            .ok_or_else(|| StoreError::NotFound(id.clone()))?;
        Ok((index, self.notes.remove(index)))
    }

    /// Swaps only the id field of one note.
    pub fn replace_id(&mut self, old_id: &NoteId, new_id: NoteId) -> StoreResult<()> {
        if old_id == &new_id {
            return if self.contains(old_id) {
                Ok(())
            } else {
                Err(StoreError::NotFound(new_id))
            };
        }
        if self.contains(&new_id) {
            return Err(StoreError::DuplicateId(new_id));
        }
        let note = self
            .notes
            .iter_mut()
            .find(|note| &note.id == old_id)
            .ok_or_else(|| StoreError::NotFound(old_id.clone()))?;
        note.id = new_id;
        Ok(())
    }
}
