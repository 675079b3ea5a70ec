//! JSON-file-backed note service.
//!
//! # Responsibility
//! - Persist notes newest-first in one JSON document.
//! - Behave like the hosted notes back-end so the engine can run locally.
//!
//! # Invariants
//! - A missing document reads as an empty list.
//! - New ids derive from epoch milliseconds and are bumped until unique.
//! - Deleting an absent id is acknowledged; updating one fails.

use crate::clock::SharedClock;
use crate::json_file::{read_json, write_json_atomic};
use crate::remote::service::{
    RemoteNote, RemoteNoteService, RemoteOp, ServiceResult, TransientFailure,
};
use log::{debug, warn};
use std::path::{Path, PathBuf};

/// Note service storing its state in a local JSON file.
pub struct FileNoteService {
    path: PathBuf,
    clock: SharedClock,
}

impl FileNoteService {
    pub fn new(path: impl Into<PathBuf>, clock: SharedClock) -> Self {
        Self {
            path: path.into(),
            clock,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_notes(&self, op: RemoteOp) -> ServiceResult<Vec<RemoteNote>> {
        read_json::<Vec<RemoteNote>>(&self.path)
            .map(Option::unwrap_or_default)
            .map_err(|err| {
                warn!(
                    "event=remote_read module=remote status=error op={} error={}",
                    op, err
                );
                TransientFailure::new(op, err.to_string())
            })
    }

    fn write_notes(&self, op: RemoteOp, notes: &[RemoteNote]) -> ServiceResult<()> {
        write_json_atomic(&self.path, notes).map_err(|err| {
            warn!(
                "event=remote_write module=remote status=error op={} error={}",
                op, err
            );
            TransientFailure::new(op, err.to_string())
        })
    }

    fn next_id(&self, notes: &[RemoteNote]) -> String {
        let mut candidate = self.clock.epoch_ms();
        while notes.iter().any(|note| note.id == candidate.to_string()) {
            candidate += 1;
        }
        candidate.to_string()
    }
}

impl RemoteNoteService for FileNoteService {
    fn list(&self) -> ServiceResult<Vec<RemoteNote>> {
        self.read_notes(RemoteOp::List)
    }

    fn create(&self, text: &str) -> ServiceResult<RemoteNote> {
        let mut notes = self.read_notes(RemoteOp::Create)?;
        let note = RemoteNote {
            id: self.next_id(&notes),
            text: text.to_string(),
            created_at: Some(self.clock.epoch_ms()),
        };
        notes.insert(0, note.clone());
        self.write_notes(RemoteOp::Create, &notes)?;
        debug!(
            "event=remote_create module=remote status=ok id={} total={}",
            note.id,
            notes.len()
        );
        Ok(note)
    }

    fn update(&self, id: &str, text: &str) -> ServiceResult<()> {
        let mut notes = self.read_notes(RemoteOp::Update)?;
        let note = notes
            .iter_mut()
            .find(|note| note.id == id)
            .ok_or_else(|| TransientFailure::new(RemoteOp::Update, format!("no note `{id}`")))?;
        note.text = text.to_string();
        self.write_notes(RemoteOp::Update, &notes)
    }

    fn delete(&self, id: &str) -> ServiceResult<()> {
        let mut notes = self.read_notes(RemoteOp::Delete)?;
        let before = notes.len();
        notes.retain(|note| note.id != id);
        if notes.len() == before {
            debug!("event=remote_delete module=remote status=noop id={}", id);
            return Ok(());
        }
        self.write_notes(RemoteOp::Delete, &notes)
    }
}
