//! Optimistic note synchronization engine.
//! This crate owns what the user sees the instant they act, what gets sent to
//! the remote note service, and how failures are rolled back or tolerated.

pub mod cache;
pub mod clock;
pub mod config;
pub mod db;
mod json_file;
pub mod logging;
pub mod model;
pub mod remote;
pub mod store;
pub mod sync;

pub use cache::file_backend::JsonFileCacheBackend;
pub use cache::local_cache::{
    CacheBackend, CacheError, CacheResult, CacheSnapshot, LocalCache, MemoryCacheBackend,
};
pub use cache::sqlite_backend::SqliteCacheBackend;
pub use clock::{Clock, ManualClock, SharedClock, SystemClock};
pub use config::{ConfigError, SyncConfig};
pub use json_file::JsonFileError;
pub use logging::{default_log_level, init_logging, logging_status, LoggingError};
pub use model::note::{Note, NoteId, TempIdGenerator, TempToken};
pub use remote::file_service::FileNoteService;
pub use remote::service::{
    RemoteNote, RemoteNoteService, RemoteOp, ServiceResult, TransientFailure,
};
pub use store::note_store::{NoteStore, StoreError, StoreResult};
pub use sync::coordinator::SyncCoordinator;
pub use sync::debounce::DebounceScheduler;
pub use sync::outcome::{
    CacheRestore, CreateOutcome, DeleteOutcome, EditOutcome, PendingCreate, PendingDelete,
    RefreshOutcome, StartReport, SyncError,
};
pub use sync::session::SyncSession;

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
