//! Optimistic sync coordinator.
//!
//! # Responsibility
//! - Apply create/edit/delete to the store immediately.
//! - Dispatch or debounce the matching remote calls.
//! - Commit or roll back each change when its remote result arrives.
//! - Mirror confirmed state into the local cache.
//!
//! # Invariants
//! - Store ids stay unique through every apply, confirm and rollback path.
//! - Temporary ids never reach the remote service.
//! - Edit failures keep local text; create and delete failures roll back.
//! - Only stable-id notes are written to the cache.
//! - No remote call is retried automatically.

use crate::config::SyncConfig;
use crate::model::note::{Note, NoteId, TempIdGenerator};
use crate::remote::service::{RemoteNote, RemoteNoteService, ServiceResult};
use crate::store::note_store::StoreError;
use crate::sync::debounce::DebounceScheduler;
use crate::sync::outcome::{
    CacheRestore, CreateOutcome, DeleteOutcome, EditOutcome, PendingCreate, PendingDelete,
    RefreshOutcome, StartReport, SyncError,
};
use crate::sync::session::SyncSession;
use log::{debug, info, warn};
use std::collections::HashMap;
use std::time::Instant;

/// Bookkeeping for a create whose remote call has not resolved yet.
#[derive(Debug, Default)]
struct InFlightCreate {
    /// Rollback snapshot of a local delete issued before confirmation.
    deleted: Option<PendingDelete>,
    parked_edit: Option<String>,
}

/// Drives optimistic mutations of one session's note list.
pub struct SyncCoordinator<R: RemoteNoteService> {
    session: SyncSession<R>,
    config: SyncConfig,
    edits: DebounceScheduler<NoteId, String>,
    temp_ids: TempIdGenerator,
    creates: HashMap<NoteId, InFlightCreate>,
}

impl<R: RemoteNoteService> SyncCoordinator<R> {
    /// Creates a coordinator over `session` after validating `config`.
    pub fn new(session: SyncSession<R>, config: SyncConfig) -> Result<Self, SyncError> {
        config.validate()?;
        Ok(Self {
            edits: DebounceScheduler::new(config.debounce_window()),
            session,
            config,
            temp_ids: TempIdGenerator::new(),
            creates: HashMap::new(),
        })
    }

    pub fn session(&self) -> &SyncSession<R> {
        &self.session
    }

    pub fn into_session(self) -> SyncSession<R> {
        self.session
    }

    pub fn config(&self) -> &SyncConfig {
        &self.config
    }

    /// Notes in display order.
    pub fn notes(&self) -> &[Note] {
        self.session.store.list()
    }

    pub fn is_create_in_flight(&self, id: &NoteId) -> bool {
        self.creates.contains_key(id)
    }

    /// Text of the armed (not yet sent) edit for `id`.
    pub fn pending_edit(&self, id: &NoteId) -> Option<&str> {
        self.edits.pending(id).map(String::as_str)
    }

    /// Earliest instant at which `poll` has work to do.
    pub fn next_deadline(&self) -> Option<Instant> {
        self.edits.next_deadline()
    }

    /// Renders a fresh cached snapshot, if any, into the store.
    pub fn restore_from_cache(&mut self) -> CacheRestore {
        let Some(snapshot) = self.session.cache.load_fresh() else {
            info!("event=cold_start module=sync status=cache_unavailable");
            return CacheRestore::Unavailable;
        };

        let age_ms = snapshot.age_ms(self.session.clock.epoch_ms());
        self.session.store.replace_all(snapshot.notes);
        let notes = self.session.store.len();
        info!(
            "event=cold_start module=sync status=cache_restored notes={} age_ms={}",
            notes, age_ms
        );
        CacheRestore::Restored { notes, age_ms }
    }

    /// Cold start: cache first for immediate display, then a superseding fetch.
    pub fn start(&mut self) -> StartReport {
        let cache = self.restore_from_cache();
        let refresh = self.refresh();
        StartReport { cache, refresh }
    }

    /// Fetches the remote list and replaces local state with it.
    pub fn refresh(&mut self) -> RefreshOutcome {
        info!("event=refresh module=sync status=start");
        let result = self.session.remote.list();
        self.finish_refresh(result)
    }

    /// Applies a fetched list: last fetch wins, no merging.
    ///
    /// Unsent edits are dropped, since the fetched text now overwrites them.
    pub fn finish_refresh(&mut self, result: ServiceResult<Vec<RemoteNote>>) -> RefreshOutcome {
        let remote_notes = match result {
            Ok(notes) => notes,
            Err(error) => {
                warn!("event=refresh module=sync status=error error={}", error);
                return RefreshOutcome::Failed { error };
            }
        };

        let parked = self
            .creates
            .values_mut()
            .flat_map(|state| {
                let deferred = state
                    .deleted
                    .as_mut()
                    .and_then(|deleted| deleted.cancelled_edit.take());
                [state.parked_edit.take(), deferred]
            })
            .flatten()
            .count();
        let dropped_edits = self.edits.drain().len() + parked;

        self.session
            .store
            .replace_all(remote_notes.into_iter().map(Note::from).collect());
        let notes = self.session.store.len();
        info!(
            "event=refresh module=sync status=ok notes={} dropped_edits={}",
            notes, dropped_edits
        );
        self.persist_confirmed();
        RefreshOutcome::Replaced {
            notes,
            dropped_edits,
        }
    }

    /// Creates a note: optimistic insert, remote create, confirm or roll back.
    pub fn create_note(&mut self, text: impl Into<String>) -> Result<CreateOutcome, SyncError> {
        let pending = self.begin_create(text)?;
        let result = self.session.remote.create(pending.text());
        Ok(self.finish_create(pending, result))
    }

    /// Inserts a note under a fresh temporary id at the front of the list.
    pub fn begin_create(&mut self, text: impl Into<String>) -> Result<PendingCreate, SyncError> {
        let text = text.into();
        let created_at = self.session.clock.epoch_ms();
        let mut temp_id = self.temp_ids.mint(created_at);
        while self.session.store.contains(&temp_id) {
            temp_id = self.temp_ids.mint(created_at);
        }

        let note = Note::new(temp_id.clone(), text.clone()).with_created_at(created_at);
        self.session.store.insert_at_front(note)?;
        self.creates.insert(temp_id.clone(), InFlightCreate::default());
        info!(
            "event=note_create module=sync status=start temp_id={} text_len={}",
            temp_id,
            text.len()
        );
        Ok(PendingCreate { temp_id, text })
    }

    /// Resolves a create with its remote result.
    ///
    /// On success only the id is adopted; text typed meanwhile is kept.
    pub fn finish_create(
        &mut self,
        pending: PendingCreate,
        result: ServiceResult<RemoteNote>,
    ) -> CreateOutcome {
        let PendingCreate { temp_id, text } = pending;
        let state = self.creates.remove(&temp_id).unwrap_or_default();

        let server_id = match result {
            Ok(remote_note) => remote_note.id,
            Err(error) => {
                self.edits.cancel(&temp_id);
                let removed = self.session.store.remove(&temp_id).is_ok();
                warn!(
                    "event=note_create module=sync status=rolled_back temp_id={} removed={} error={}",
                    temp_id, removed, error
                );
                return CreateOutcome::RolledBack { text, error };
            }
        };

        let stable_id = NoteId::Stable(server_id.clone());
        if let Some(mut deleted) = state.deleted {
            self.edits.cancel(&temp_id);
            deleted.note.id = stable_id;
            info!(
                "event=note_create module=sync status=deleted_before_confirm temp_id={} id={}",
                temp_id, server_id
            );
            let result = self.session.remote.delete(&server_id);
            let cleanup = self.finish_delete(deleted, result);
            return CreateOutcome::DeletedBeforeConfirm { server_id, cleanup };
        }

        if let Err(err) = self.session.store.replace_id(&temp_id, stable_id.clone()) {
            self.edits.cancel(&temp_id);
            let removed = match err {
                StoreError::DuplicateId(_) => self.session.store.remove(&temp_id).is_ok(),
                StoreError::NotFound(_) => false,
            };
            debug!(
                "event=note_create module=sync status=superseded temp_id={} id={} removed={} reason={}",
                temp_id, server_id, removed, err
            );
            return CreateOutcome::Superseded { server_id };
        }

        self.edits.rekey(&temp_id, stable_id.clone());
        info!(
            "event=note_create module=sync status=ok temp_id={} id={}",
            temp_id, stable_id
        );

        let follow_up = match state.parked_edit {
            Some(text) if !self.edits.is_armed(&stable_id) => {
                Some(self.send_update(&stable_id, text))
            }
            _ => None,
        };
        self.persist_confirmed();
        CreateOutcome::Confirmed {
            id: stable_id,
            follow_up,
        }
    }

    /// Replaces note text now and (re)arms its debounced remote update.
    pub fn edit_note(&mut self, id: &NoteId, text: impl Into<String>) -> Result<(), SyncError> {
        let text = text.into();
        self.session.store.update_text(id, text.clone())?;
        let text_len = text.len();
        let coalesced = self
            .edits
            .schedule(id.clone(), text, self.session.clock.now())
            .is_some();
        debug!(
            "event=note_edit module=sync status=scheduled id={} text_len={} coalesced={}",
            id, text_len, coalesced
        );
        Ok(())
    }

    /// Sends every edit whose quiet window has elapsed.
    pub fn poll(&mut self) -> Vec<EditOutcome> {
        let due = self.edits.take_due(self.session.clock.now());
        self.dispatch_edits(due)
    }

    /// Sends every armed edit immediately, e.g. before shutdown.
    pub fn flush_pending(&mut self) -> Vec<EditOutcome> {
        let armed = self.edits.drain();
        self.dispatch_edits(armed)
    }

    /// Deletes a note: optimistic removal, remote delete, confirm or roll back.
    pub fn delete_note(&mut self, id: &NoteId) -> DeleteOutcome {
        let Some(pending) = self.begin_delete(id) else {
            return DeleteOutcome::NotPresent { id: id.clone() };
        };
        let Some(remote_id) = pending.remote_id().map(str::to_owned) else {
            return DeleteOutcome::DeferredToCreate { id: id.clone() };
        };
        let result = self.session.remote.delete(&remote_id);
        self.finish_delete(pending, result)
    }

    /// Removes a note locally and cancels its unsent edit.
    ///
    /// Returns `None` when the id is absent. For a note whose create is in
    /// flight the snapshot is also kept until the create resolves.
    pub fn begin_delete(&mut self, id: &NoteId) -> Option<PendingDelete> {
        let Ok((index, note)) = self.session.store.remove(id) else {
            debug!("event=note_delete module=sync status=noop id={}", id);
            return None;
        };

        let cancelled_edit = self.edits.cancel(id);
        let pending = PendingDelete {
            index,
            note,
            cancelled_edit,
        };
        if let Some(state) = self.creates.get_mut(id) {
            let parked = state.parked_edit.take();
            let mut deferred = pending.clone();
            deferred.cancelled_edit = deferred.cancelled_edit.or(parked);
            state.deleted = Some(deferred);
        }
        info!(
            "event=note_delete module=sync status=start id={} index={} cancelled_edit={}",
            id,
            index,
            pending.cancelled_edit.is_some()
        );
        Some(pending)
    }

    /// Resolves a delete; on failure the note returns to its former index.
    ///
    /// A delete of an unconfirmed note is resolved by its create instead.
    pub fn finish_delete(
        &mut self,
        pending: PendingDelete,
        result: ServiceResult<()>,
    ) -> DeleteOutcome {
        let PendingDelete {
            index,
            note,
            cancelled_edit,
        } = pending;
        let id = note.id.clone();
        if id.is_temporary() {
            return DeleteOutcome::DeferredToCreate { id };
        }

        let error = match result {
            Ok(()) => {
                info!("event=note_delete module=sync status=ok id={}", id);
                self.persist_confirmed();
                return DeleteOutcome::Committed { id };
            }
            Err(error) => error,
        };

        let restored_at = self.session.store.restore_at(index, note).ok();
        if restored_at.is_some() {
            if let Some(text) = cancelled_edit {
                self.edits.schedule(id.clone(), text, self.session.clock.now());
            }
            self.persist_confirmed();
        }
        warn!(
            "event=note_delete module=sync status=rolled_back id={} index={} restored={} error={}",
            id,
            index,
            restored_at.is_some(),
            error
        );
        DeleteOutcome::RolledBack {
            id,
            restored_at,
            error,
        }
    }

    fn dispatch_edits(&mut self, due: Vec<(NoteId, String)>) -> Vec<EditOutcome> {
        due.into_iter()
            .map(|(id, text)| self.dispatch_edit(id, text))
            .collect()
    }

    fn dispatch_edit(&mut self, id: NoteId, text: String) -> EditOutcome {
        if !self.session.store.contains(&id) {
            debug!("event=note_edit module=sync status=discarded id={}", id);
            return EditOutcome::Discarded { id };
        }

        if id.is_temporary() {
            return match self.creates.get_mut(&id) {
                Some(state) => {
                    state.parked_edit = Some(text);
                    debug!("event=note_edit module=sync status=parked id={}", id);
                    EditOutcome::Parked { id }
                }
                None => EditOutcome::Discarded { id },
            };
        }

        self.send_update(&id, text)
    }

    fn send_update(&mut self, id: &NoteId, text: String) -> EditOutcome {
        let Some(remote_id) = id.as_stable() else {
            return EditOutcome::Discarded { id: id.clone() };
        };

        match self.session.remote.update(remote_id, &text) {
            Ok(()) => {
                info!(
                    "event=note_edit module=sync status=ok id={} text_len={}",
                    id,
                    text.len()
                );
                self.persist_confirmed();
                EditOutcome::Synced { id: id.clone() }
            }
            Err(error) => {
                warn!(
                    "event=note_edit module=sync status=error id={} error={}",
                    id, error
                );
                EditOutcome::Failed {
                    id: id.clone(),
                    error,
                }
            }
        }
    }

    fn persist_confirmed(&mut self) {
        let confirmed: Vec<Note> = self
            .session
            .store
            .list()
            .iter()
            .filter(|note| !note.id.is_temporary())
            .cloned()
            .collect();
        if let Err(err) = self.session.cache.save(&confirmed) {
            warn!(
                "event=cache_save module=cache status=error notes={} error={}",
                confirmed.len(),
                err
            );
        }
    }
}
