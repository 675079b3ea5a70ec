//! Explicit session context for one note list.
//!
//! # Responsibility
//! - Own the note store, cache handle, remote handle and clock together.
//! - Replace any process-wide note/cache state with one constructed value.

use crate::cache::local_cache::LocalCache;
use crate::clock::SharedClock;
use crate::remote::service::RemoteNoteService;
use crate::store::note_store::NoteStore;

/// Everything the coordinator needs, constructed once by the host.
pub struct SyncSession<R: RemoteNoteService> {
    pub(crate) store: NoteStore,
    pub(crate) cache: LocalCache,
    pub(crate) remote: R,
    pub(crate) clock: SharedClock,
}

impl<R: RemoteNoteService> SyncSession<R> {
    /// Creates a session with an empty store.
    pub fn new(remote: R, cache: LocalCache, clock: SharedClock) -> Self {
        Self {
            store: NoteStore::new(),
            cache,
            remote,
            clock,
        }
    }

    pub fn store(&self) -> &NoteStore {
        &self.store
    }

    pub fn cache(&self) -> &LocalCache {
        &self.cache
    }

    pub fn remote(&self) -> &R {
        &self.remote
    }

    pub fn clock(&self) -> &SharedClock {
        &self.clock
    }
}
