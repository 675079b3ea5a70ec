//! SQLite cache backend.
//!
//! # Invariants
//! - Saving replaces the whole snapshot in one immediate transaction.
//! - `position` preserves display order across reloads.
//! - Rows that cannot be mapped back to a note are rejected, not skipped.

use crate::cache::local_cache::{CacheBackend, CacheError, CacheResult, CacheSnapshot};
use crate::db::open_db;
use crate::model::note::{Note, NoteId, TempToken};
use rusqlite::{params, Connection, OptionalExtension, TransactionBehavior};
use std::path::Path;

/// Snapshot cache stored in a migrated SQLite database.
pub struct SqliteCacheBackend {
    conn: Connection,
}

impl SqliteCacheBackend {
    /// Opens (and migrates) the cache database at `path`.
    pub fn open(path: impl AsRef<Path>) -> CacheResult<Self> {
        Ok(Self {
            conn: open_db(path)?,
        })
    }

    /// Wraps an already migrated connection.
    pub fn from_connection(conn: Connection) -> Self {
        Self { conn }
    }
}

impl CacheBackend for SqliteCacheBackend {
    fn get(&self) -> CacheResult<Option<CacheSnapshot>> {
        let captured_at: Option<i64> = self
            .conn
            .query_row(
                "SELECT captured_at FROM cache_meta WHERE slot = 1;",
                [],
                |row| row.get(0),
            )
            .optional()?;
        let Some(captured_at_ms) = captured_at else {
            return Ok(None);
        };

        let mut stmt = self.conn.prepare(
            "SELECT id_kind, note_id, text, created_at
             FROM cached_notes
             ORDER BY position ASC;",
        )?;
        let mut rows = stmt.query([])?;
        let mut notes = Vec::new();
        while let Some(row) = rows.next()? {
            let kind: String = row.get("id_kind")?;
            let raw_id: String = row.get("note_id")?;
            notes.push(Note {
                id: parse_note_id(&kind, &raw_id)?,
                text: row.get("text")?,
                created_at: row.get("created_at")?,
            });
        }

        Ok(Some(CacheSnapshot::new(notes, captured_at_ms)))
    }

    fn set(&mut self, snapshot: &CacheSnapshot) -> CacheResult<()> {
        let tx = self
            .conn
            .transaction_with_behavior(TransactionBehavior::Immediate)?;
        tx.execute("DELETE FROM cached_notes;", [])?;
        {
            let mut insert = tx.prepare(
                "INSERT INTO cached_notes (position, id_kind, note_id, text, created_at)
                 VALUES (?1, ?2, ?3, ?4, ?5);",
            )?;
            for (position, note) in snapshot.notes.iter().enumerate() {
                let (kind, raw_id) = note_id_to_db(&note.id);
                insert.execute(params![
                    i64::try_from(position).unwrap_or(i64::MAX),
                    kind,
                    raw_id,
                    note.text.as_str(),
                    note.created_at,
                ])?;
            }
        }
        tx.execute(
            "INSERT INTO cache_meta (slot, captured_at) VALUES (1, ?1)
             ON CONFLICT(slot) DO UPDATE SET captured_at = excluded.captured_at;",
            [snapshot.captured_at_ms],
        )?;
        tx.commit()?;
        Ok(())
    }
}

fn note_id_to_db(id: &NoteId) -> (&'static str, String) {
    match id {
        NoteId::Stable(value) => ("stable", value.clone()),
        NoteId::Temporary(token) => ("temporary", token.value().to_string()),
    }
}

fn parse_note_id(kind: &str, raw: &str) -> CacheResult<NoteId> {
    match kind {
        "stable" => Ok(NoteId::Stable(raw.to_string())),
        "temporary" => raw
            .parse::<u64>()
            .map(|value| NoteId::Temporary(TempToken::from_value(value)))
            .map_err(|_| {
                CacheError::InvalidData(format!("invalid temporary token `{raw}` in cached_notes"))
            }),
        other => Err(CacheError::InvalidData(format!(
            "invalid id kind `{other}` in cached_notes.id_kind"
        ))),
    }
}
