//! Snapshot cache contract and expiry policy.

use crate::clock::SharedClock;
use crate::db::DbError;
use crate::json_file::JsonFileError;
use crate::model::note::Note;
use log::{info, warn};
use serde::{Deserialize, Serialize};
use std::cell::RefCell;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::rc::Rc;

pub type CacheResult<T> = Result<T, CacheError>;

/// Cache backend failure.
#[derive(Debug)]
pub enum CacheError {
    Json(JsonFileError),
    Db(DbError),
    InvalidData(String),
}

impl Display for CacheError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Json(err) => write!(f, "{err}"),
            Self::Db(err) => write!(f, "{err}"),
            Self::InvalidData(message) => write!(f, "invalid cached data: {message}"),
        }
    }
}

impl Error for CacheError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Json(err) => Some(err),
            Self::Db(err) => Some(err),
            Self::InvalidData(_) => None,
        }
    }
}

impl From<JsonFileError> for CacheError {
    fn from(value: JsonFileError) -> Self {
        Self::Json(value)
    }
}

impl From<DbError> for CacheError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for CacheError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// Captured copy of the note list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheSnapshot {
    pub notes: Vec<Note>,
    /// Capture time in epoch milliseconds.
    pub captured_at_ms: i64,
}

impl CacheSnapshot {
    pub fn new(notes: Vec<Note>, captured_at_ms: i64) -> Self {
        Self {
            notes,
            captured_at_ms,
        }
    }

    pub fn age_ms(&self, now_ms: i64) -> i64 {
        now_ms.saturating_sub(self.captured_at_ms)
    }

    /// Returns whether the snapshot is strictly younger than `max_age_ms`.
    pub fn is_fresh(&self, now_ms: i64, max_age_ms: i64) -> bool {
        self.age_ms(now_ms) < max_age_ms
    }
}

/// Storage behind `LocalCache`.
pub trait CacheBackend {
    fn get(&self) -> CacheResult<Option<CacheSnapshot>>;
    fn set(&mut self, snapshot: &CacheSnapshot) -> CacheResult<()>;
}

/// In-process backend. Clones share the same slot.
#[derive(Debug, Clone, Default)]
pub struct MemoryCacheBackend {
    slot: Rc<RefCell<Option<CacheSnapshot>>>,
}

impl MemoryCacheBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a backend pre-seeded with one snapshot.
    pub fn with_snapshot(snapshot: CacheSnapshot) -> Self {
        Self {
            slot: Rc::new(RefCell::new(Some(snapshot))),
        }
    }

    /// Returns the stored snapshot without expiry filtering.
    pub fn peek(&self) -> Option<CacheSnapshot> {
        self.slot.borrow().clone()
    }
}

impl CacheBackend for MemoryCacheBackend {
    fn get(&self) -> CacheResult<Option<CacheSnapshot>> {
        Ok(self.slot.borrow().clone())
    }

    fn set(&mut self, snapshot: &CacheSnapshot) -> CacheResult<()> {
        *self.slot.borrow_mut() = Some(snapshot.clone());
        Ok(())
    }
}

/// Expiry-aware cache facade used by the sync session.
pub struct LocalCache {
    backend: Box<dyn CacheBackend>,
    clock: SharedClock,
    max_age_ms: i64,
}

impl LocalCache {
    pub fn new(backend: Box<dyn CacheBackend>, clock: SharedClock, max_age_ms: i64) -> Self {
        Self {
            backend,
            clock,
            max_age_ms,
        }
    }

    pub fn max_age_ms(&self) -> i64 {
        self.max_age_ms
    }

    /// Reads the stored snapshot regardless of age.
    ///
    /// Backend failures are logged and read as "no snapshot".
    pub fn load(&self) -> Option<CacheSnapshot> {
        match self.backend.get() {
            Ok(snapshot) => snapshot,
            Err(err) => {
                warn!("event=cache_load module=cache status=error error={}", err);
                None
            }
        }
    }

    /// Reads the stored snapshot only when it is still within the max age.
    pub fn load_fresh(&self) -> Option<CacheSnapshot> {
        let snapshot = self.load()?;
        let now_ms = self.clock.epoch_ms();
        if snapshot.is_fresh(now_ms, self.max_age_ms) {
            return Some(snapshot);
        }
        info!(
            "event=cache_load module=cache status=expired age_ms={} max_age_ms={}",
            snapshot.age_ms(now_ms),
            self.max_age_ms
        );
        None
    }

    /// Captures `notes` with a fresh timestamp and persists them.
    pub fn save(&mut self, notes: &[Note]) -> CacheResult<CacheSnapshot> {
        let snapshot = CacheSnapshot::new(notes.to_vec(), self.clock.epoch_ms());
        self.backend.set(&snapshot)?;
        Ok(snapshot)
    }
}
