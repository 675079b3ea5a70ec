#![allow(dead_code)]

use notesync_core::{
    LocalCache, ManualClock, MemoryCacheBackend, RemoteNote, RemoteNoteService, RemoteOp,
    ServiceResult, SharedClock, SyncConfig, SyncCoordinator, SyncSession, TransientFailure,
};
use std::cell::RefCell;
use std::collections::HashSet;
use std::rc::Rc;
use std::sync::Arc;

pub const START_MS: i64 = 1_700_000_000_000;
pub const HOUR_MS: i64 = 60 * 60 * 1_000;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    List,
    Create(String),
    Update(String, String),
    Delete(String),
}

#[derive(Default)]
struct RemoteState {
    notes: Vec<RemoteNote>,
    calls: Vec<Call>,
    failing: HashSet<RemoteOp>,
    issued: u64,
}

/// In-process remote whose failures are switched on per operation.
/// Clones share state, so tests keep one handle while the session owns another.
#[derive(Clone, Default)]
pub struct ScriptedRemote {
    state: Rc<RefCell<RemoteState>>,
}

impl ScriptedRemote {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_notes(notes: &[(&str, &str)]) -> Self {
        let remote = Self::new();
        remote.state.borrow_mut().notes = notes
            .iter()
            .map(|(id, text)| RemoteNote {
                id: id.to_string(),
                text: text.to_string(),
                created_at: None,
            })
            .collect();
        remote
    }

    pub fn fail(&self, op: RemoteOp) {
        self.state.borrow_mut().failing.insert(op);
    }

    pub fn recover(&self, op: RemoteOp) {
        self.state.borrow_mut().failing.remove(&op);
    }

    pub fn calls(&self) -> Vec<Call> {
        self.state.borrow().calls.clone()
    }

    pub fn updates(&self) -> Vec<(String, String)> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                Call::Update(id, text) => Some((id, text)),
                _ => None,
            })
            .collect()
    }

    pub fn remote_notes(&self) -> Vec<RemoteNote> {
        self.state.borrow().notes.clone()
    }

    fn begin(&self, op: RemoteOp, call: Call) -> ServiceResult<()> {
        let mut state = self.state.borrow_mut();
        state.calls.push(call);
        if state.failing.contains(&op) {
            return Err(TransientFailure::new(op, "scripted failure"));
        }
        Ok(())
    }
}

impl RemoteNoteService for ScriptedRemote {
    fn list(&self) -> ServiceResult<Vec<RemoteNote>> {
        self.begin(RemoteOp::List, Call::List)?;
        Ok(self.remote_notes())
    }

    fn create(&self, text: &str) -> ServiceResult<RemoteNote> {
        self.begin(RemoteOp::Create, Call::Create(text.to_string()))?;
        let mut state = self.state.borrow_mut();
        state.issued += 1;
        let note = RemoteNote {
            id: format!("srv-{}", state.issued),
            text: text.to_string(),
            created_at: None,
        };
        state.notes.insert(0, note.clone());
        Ok(note)
    }

    fn update(&self, id: &str, text: &str) -> ServiceResult<()> {
        self.begin(
            RemoteOp::Update,
            Call::Update(id.to_string(), text.to_string()),
        )?;
        let mut state = self.state.borrow_mut();
        match state.notes.iter_mut().find(|note| note.id == id) {
            Some(note) => {
                note.text = text.to_string();
                Ok(())
            }
            None => Err(TransientFailure::new(RemoteOp::Update, "unknown id")),
        }
    }

    fn delete(&self, id: &str) -> ServiceResult<()> {
        self.begin(RemoteOp::Delete, Call::Delete(id.to_string()))?;
        self.state.borrow_mut().notes.retain(|note| note.id != id);
        Ok(())
    }
}

pub struct Harness {
    pub coordinator: SyncCoordinator<ScriptedRemote>,
    pub remote: ScriptedRemote,
    pub cache: MemoryCacheBackend,
    pub clock: Arc<ManualClock>,
}

pub fn harness() -> Harness {
    harness_with(ScriptedRemote::new(), MemoryCacheBackend::new())
}

pub fn harness_with(remote: ScriptedRemote, cache: MemoryCacheBackend) -> Harness {
    let clock = Arc::new(ManualClock::new(START_MS));
    let shared: SharedClock = clock.clone();
    let config = SyncConfig::default();
    let local_cache = LocalCache::new(
        Box::new(cache.clone()),
        shared.clone(),
        config.cache_max_age_ms,
    );
    let session = SyncSession::new(remote.clone(), local_cache, shared);
    let coordinator = SyncCoordinator::new(session, config).unwrap();
    Harness {
        coordinator,
        remote,
        cache,
        clock,
    }
}

/// Harness whose store is already loaded with `notes` from the remote.
pub fn loaded_harness(notes: &[(&str, &str)]) -> Harness {
    let mut h = harness_with(ScriptedRemote::with_notes(notes), MemoryCacheBackend::new());
    h.coordinator.refresh();
    h
}

pub fn ids(h: &Harness) -> Vec<String> {
    h.coordinator
        .notes()
        .iter()
        .map(|note| note.id.to_string())
        .collect()
}

pub fn texts(h: &Harness) -> Vec<String> {
    h.coordinator
        .notes()
        .iter()
        .map(|note| note.text.clone())
        .collect()
}

pub fn assert_unique_ids(h: &Harness) {
    let mut seen = HashSet::new();
    for note in h.coordinator.notes() {
        assert!(seen.insert(note.id.clone()), "duplicate id {}", note.id);
    }
}
