//! Remote note service contract.

use crate::model::note::{Note, NoteId};
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};

pub type ServiceResult<T> = Result<T, TransientFailure>;

/// Remote operation kind, carried by failures and log events.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RemoteOp {
    List,
    Create,
    Update,
    Delete,
}

impl RemoteOp {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::List => "list",
            Self::Create => "create",
            Self::Update => "update",
            Self::Delete => "delete",
        }
    }
}

impl Display for RemoteOp {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Any remote call that did not complete successfully.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransientFailure {
    pub op: RemoteOp,
    pub message: String,
}

impl TransientFailure {
    pub fn new(op: RemoteOp, message: impl Into<String>) -> Self {
        Self {
            op,
            message: message.into(),
        }
    }
}

impl Display for TransientFailure {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "remote {} failed: {}", self.op, self.message)
    }
}

impl Error for TransientFailure {}

/// Note as returned by the remote service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoteNote {
    #[serde(rename = "_id")]
    pub id: String,
    pub text: String,
    #[serde(default, rename = "createdAt", skip_serializing_if = "Option::is_none")]
    pub created_at: Option<i64>,
}

impl From<RemoteNote> for Note {
    fn from(value: RemoteNote) -> Self {
        Self {
            id: NoteId::Stable(value.id),
            text: value.text,
            created_at: value.created_at,
        }
    }
}

/// Capability for persisting notes remotely.
///
/// Implementations decide transport and timeouts; the core imposes none.
pub trait RemoteNoteService {
    /// Returns all notes in the service's display order.
    fn list(&self) -> ServiceResult<Vec<RemoteNote>>;
    /// Creates a note and returns it with its stable id.
    fn create(&self, text: &str) -> ServiceResult<RemoteNote>;
    /// Replaces the text of one note.
    fn update(&self, id: &str, text: &str) -> ServiceResult<()>;
    /// Deletes one note.
    fn delete(&self, id: &str) -> ServiceResult<()>;
}

impl<T: RemoteNoteService + ?Sized> RemoteNoteService for Box<T> {
    fn list(&self) -> ServiceResult<Vec<RemoteNote>> {
        (**self).list()
    }

    fn create(&self, text: &str) -> ServiceResult<RemoteNote> {
        (**self).create(text)
    }

    fn update(&self, id: &str, text: &str) -> ServiceResult<()> {
        (**self).update(id, text)
    }

    fn delete(&self, id: &str) -> ServiceResult<()> {
        (**self).delete(id)
    }
}
