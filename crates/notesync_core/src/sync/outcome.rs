//! Pending-operation handles and outcome types for the two-phase protocol.
//!
//! Phase one (`begin_*`) applies a change locally and returns a pending
//! handle holding the rollback snapshot. Phase two (`finish_*`) consumes the
//! handle together with the remote result and reports one outcome.

use crate::config::ConfigError;
use crate::model::note::{Note, NoteId};
use crate::remote::service::TransientFailure;
use crate::store::note_store::StoreError;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Local (non-remote) failures of coordinator calls.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SyncError {
    Config(ConfigError),
    Store(StoreError),
}

impl Display for SyncError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Config(err) => write!(f, "invalid sync config: {err}"),
            Self::Store(err) => write!(f, "{err}"),
        }
    }
}

impl Error for SyncError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Config(err) => Some(err),
            Self::Store(err) => Some(err),
        }
    }
}

impl From<ConfigError> for SyncError {
    fn from(value: ConfigError) -> Self {
        Self::Config(value)
    }
}

impl From<StoreError> for SyncError {
    fn from(value: StoreError) -> Self {
        Self::Store(value)
    }
}

/// Optimistically inserted note awaiting its create confirmation.
#[derive(Debug)]
#[must_use = "a pending create must be finished with the remote result"]
pub struct PendingCreate {
    pub(crate) temp_id: NoteId,
    pub(crate) text: String,
}

impl PendingCreate {
    pub fn temp_id(&self) -> &NoteId {
        &self.temp_id
    }

    /// Text as submitted; this is what a rollback hands back.
    pub fn text(&self) -> &str {
        &self.text
    }
}

/// Optimistically removed note awaiting its delete confirmation.
#[derive(Debug, Clone)]
#[must_use = "a pending delete must be finished with the remote result"]
pub struct PendingDelete {
    pub(crate) index: usize,
    pub(crate) note: Note,
    pub(crate) cancelled_edit: Option<String>,
}

impl PendingDelete {
    pub fn id(&self) -> &NoteId {
        &self.note.id
    }

    /// Display index the note held before removal.
    pub fn index(&self) -> usize {
        self.index
    }

    /// Server id to send the delete to; `None` while the create is unconfirmed.
    pub fn remote_id(&self) -> Option<&str> {
        self.note.id.as_stable()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CreateOutcome {
    /// The server id replaced the temporary id; local text kept.
    Confirmed {
        id: NoteId,
        /// Result of sending an edit that became due while the create was in flight.
        follow_up: Option<EditOutcome>,
    },
    /// The optimistic note was removed; `text` is returned for retry.
    RolledBack {
        text: String,
        error: TransientFailure,
    },
    /// The note disappeared locally (e.g. a refresh replaced the list); result discarded.
    Superseded { server_id: String },
    /// The user deleted the note before confirmation; a remote delete was issued.
    ///
    /// `cleanup` is `Committed` or `RolledBack` under the server id.
    DeletedBeforeConfirm {
        server_id: String,
        cleanup: DeleteOutcome,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EditOutcome {
    /// Remote update succeeded.
    Synced { id: NoteId },
    /// Remote update failed; local text kept.
    Failed { id: NoteId, error: TransientFailure },
    /// Held until the note's create confirms.
    Parked { id: NoteId },
    /// Note no longer exists locally; nothing sent.
    Discarded { id: NoteId },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeleteOutcome {
    /// Remote delete succeeded.
    Committed { id: NoteId },
    /// Remote delete failed and the note was put back.
    ///
    /// `restored_at` is `None` when the id reappeared meanwhile and the
    /// snapshot was dropped to keep ids unique.
    RolledBack {
        id: NoteId,
        restored_at: Option<usize>,
        error: TransientFailure,
    },
    /// Id was not present; nothing happened.
    NotPresent { id: NoteId },
    /// Removed locally; the remote delete follows the create confirmation.
    DeferredToCreate { id: NoteId },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RefreshOutcome {
    /// Store replaced by the fetched list.
    Replaced { notes: usize, dropped_edits: usize },
    /// Fetch failed; store unchanged.
    Failed { error: TransientFailure },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheRestore {
    /// A fresh snapshot was loaded into the store.
    Restored { notes: usize, age_ms: i64 },
    /// No usable snapshot (missing, unreadable or expired).
    Unavailable,
}

/// Result of a cold start: cache render followed by a remote refresh.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StartReport {
    pub cache: CacheRestore,
    pub refresh: RefreshOutcome,
}
