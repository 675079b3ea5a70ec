mod common;

use common::{loaded_harness, texts};
use notesync_core::{EditOutcome, NoteId, RemoteOp, StoreError, SyncError};

#[test]
fn rapid_edits_within_window_send_one_update_with_last_text() {
    let mut h = loaded_harness(&[("n1", "")]);
    let id = NoteId::stable("n1");

    h.coordinator.edit_note(&id, "a").unwrap();
    h.clock.advance_ms(300);
    h.coordinator.edit_note(&id, "ab").unwrap();
    h.clock.advance_ms(300);
    h.coordinator.edit_note(&id, "abc").unwrap();

    h.clock.advance_ms(999);
    assert!(h.coordinator.poll().is_empty());
    assert!(h.remote.updates().is_empty());

    h.clock.advance_ms(1);
    assert_eq!(h.coordinator.poll(), vec![EditOutcome::Synced { id }]);
    assert_eq!(
        h.remote.updates(),
        vec![("n1".to_string(), "abc".to_string())]
    );

    h.clock.advance_ms(10_000);
    assert!(h.coordinator.poll().is_empty());
    assert_eq!(h.remote.updates().len(), 1);
}

#[test]
fn edit_applies_locally_before_any_remote_call() {
    let mut h = loaded_harness(&[("n1", "one"), ("n2", "two")]);

    h.coordinator
        .edit_note(&NoteId::stable("n2"), "two, revised")
        .unwrap();

    assert_eq!(
        texts(&h),
        vec!["one".to_string(), "two, revised".to_string()]
    );
    assert!(h.remote.updates().is_empty());
    assert_eq!(
        h.coordinator.pending_edit(&NoteId::stable("n2")),
        Some("two, revised")
    );
}

#[test]
fn failed_update_keeps_local_text_and_reports() {
    let mut h = loaded_harness(&[("n1", "server text")]);
    let id = NoteId::stable("n1");
    h.remote.fail(RemoteOp::Update);

    h.coordinator.edit_note(&id, "local text").unwrap();
    h.clock.advance_ms(1_000);
    let outcomes = h.coordinator.poll();

    assert_eq!(outcomes.len(), 1);
    match &outcomes[0] {
        EditOutcome::Failed { id: failed, error } => {
            assert_eq!(failed, &id);
            assert_eq!(error.op, RemoteOp::Update);
        }
        other => panic!("unexpected outcome: {other:?}"),
    }
    assert_eq!(texts(&h), vec!["local text".to_string()]);
    assert_eq!(h.cache.peek().unwrap().notes[0].text, "server text");
}

#[test]
fn engine_stays_usable_after_an_update_failure() {
    let mut h = loaded_harness(&[("n1", "x"), ("n2", "y")]);
    h.remote.fail(RemoteOp::Update);
    h.coordinator.edit_note(&NoteId::stable("n1"), "x1").unwrap();
    h.clock.advance_ms(1_000);
    h.coordinator.poll();

    h.remote.recover(RemoteOp::Update);
    h.coordinator.edit_note(&NoteId::stable("n2"), "y1").unwrap();
    h.clock.advance_ms(1_000);

    assert_eq!(
        h.coordinator.poll(),
        vec![EditOutcome::Synced {
            id: NoteId::stable("n2")
        }]
    );
}

#[test]
fn edits_to_different_ids_are_debounced_independently() {
    let mut h = loaded_harness(&[("n1", ""), ("n2", "")]);

    h.coordinator.edit_note(&NoteId::stable("n1"), "first").unwrap();
    h.clock.advance_ms(600);
    h.coordinator.edit_note(&NoteId::stable("n2"), "second").unwrap();

    h.clock.advance_ms(400);
    assert_eq!(
        h.coordinator.poll(),
        vec![EditOutcome::Synced {
            id: NoteId::stable("n1")
        }]
    );
    h.clock.advance_ms(600);
    assert_eq!(
        h.coordinator.poll(),
        vec![EditOutcome::Synced {
            id: NoteId::stable("n2")
        }]
    );
    assert_eq!(
        h.remote.updates(),
        vec![
            ("n1".to_string(), "first".to_string()),
            ("n2".to_string(), "second".to_string()),
        ]
    );
}

#[test]
fn edit_of_missing_note_is_rejected_without_scheduling() {
    let mut h = loaded_harness(&[("n1", "one")]);
    let ghost = NoteId::stable("ghost");

    let err = h.coordinator.edit_note(&ghost, "boo").unwrap_err();

    assert_eq!(err, SyncError::Store(StoreError::NotFound(ghost.clone())));
    assert_eq!(h.coordinator.pending_edit(&ghost), None);
    assert_eq!(h.coordinator.next_deadline(), None);
}

#[test]
fn flush_pending_sends_armed_edits_without_waiting() {
    let mut h = loaded_harness(&[("n1", "one")]);
    h.coordinator.edit_note(&NoteId::stable("n1"), "uno").unwrap();

    let outcomes = h.coordinator.flush_pending();

    assert_eq!(
        outcomes,
        vec![EditOutcome::Synced {
            id: NoteId::stable("n1")
        }]
    );
    assert_eq!(h.remote.updates(), vec![("n1".to_string(), "uno".to_string())]);
    assert_eq!(h.cache.peek().unwrap().notes[0].text, "uno");
}

#[test]
fn refresh_overwrites_unsent_edits() {
    let mut h = loaded_harness(&[("n1", "server")]);
    h.coordinator.edit_note(&NoteId::stable("n1"), "local").unwrap();

    let refreshed = h.coordinator.refresh();

    assert_eq!(
        refreshed,
        notesync_core::RefreshOutcome::Replaced {
            notes: 1,
            dropped_edits: 1
        }
    );
    assert_eq!(texts(&h), vec!["server".to_string()]);
    h.clock.advance_ms(1_000);
    assert!(h.coordinator.poll().is_empty());
}
