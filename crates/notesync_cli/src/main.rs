//! Command-line smoke surface for `notesync_core`.
//!
//! # Responsibility
//! - Drive the sync engine against a local file-backed note service.
//! - Keep output line-oriented and deterministic for quick sanity checks.

use clap::{Parser, Subcommand};
use log::{info, warn};
use notesync_core::{
    default_log_level, init_logging, CacheRestore, CreateOutcome, DeleteOutcome, EditOutcome,
    FileNoteService, LocalCache, NoteId, RefreshOutcome, RemoteNoteService, SharedClock,
    SqliteCacheBackend, SyncConfig, SyncCoordinator, SyncSession, SystemClock,
};
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

#[derive(Debug, Parser)]
#[command(name = "notesync", version, about = "Optimistic note list with a local cache")]
struct Cli {
    /// JSON document acting as the remote note service.
    #[arg(long, default_value = "notes.json")]
    store: PathBuf,
    /// SQLite file holding the cached snapshot.
    #[arg(long, default_value = "notes-cache.sqlite3")]
    cache: PathBuf,
    /// Absolute directory for rolling log files; logging is off when unset.
    #[arg(long)]
    log_dir: Option<PathBuf>,
    #[arg(long)]
    log_level: Option<String>,
    /// Quiet window for edits, in milliseconds.
    #[arg(long, default_value_t = notesync_core::config::DEFAULT_DEBOUNCE_WINDOW_MS)]
    debounce_ms: u64,
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Print notes, newest first, from the cache while it is fresh.
    List,
    /// Add a note.
    Add { text: String },
    /// Replace a note's text.
    Edit { id: String, text: String },
    /// Delete a note.
    Rm { id: String },
    /// Fetch the list from the store and rewrite the cache.
    Refresh,
}

impl Command {
    fn name(&self) -> &'static str {
        match self {
            Self::List => "list",
            Self::Add { .. } => "add",
            Self::Edit { .. } => "edit",
            Self::Rm { .. } => "rm",
            Self::Refresh => "refresh",
        }
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(message) => {
            eprintln!("error: {message}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<(), String> {
    if let Some(log_dir) = cli.log_dir.as_ref() {
        let level = cli.log_level.as_deref().unwrap_or(default_log_level());
        init_logging(level, log_dir).map_err(|err| err.to_string())?;
    }

    let config = SyncConfig {
        debounce_window_ms: cli.debounce_ms,
        ..SyncConfig::default()
    };
    let clock: SharedClock = Arc::new(SystemClock);
    let backend = SqliteCacheBackend::open(&cli.cache).map_err(|err| err.to_string())?;
    let cache = LocalCache::new(Box::new(backend), clock.clone(), config.cache_max_age_ms);
    let remote = FileNoteService::new(&cli.store, clock.clone());
    let session = SyncSession::new(remote, cache, clock);
    let mut coordinator = SyncCoordinator::new(session, config).map_err(|err| err.to_string())?;

    if matches!(cli.command, Command::List) {
        show_cached_or_fetch(&mut coordinator);
    } else {
        let start = coordinator.start();
        info!(
            "event=cli_start module=cli status=ok command={} cache={:?}",
            cli.command.name(),
            start.cache
        );
        if let RefreshOutcome::Failed { error } = &start.refresh {
            warn!("event=cli_start module=cli status=stale error={}", error);
            eprintln!("warning: showing cached notes, refresh failed: {error}");
        }
    }

    match cli.command {
        Command::List | Command::Refresh => {}
        Command::Add { text } => {
            let outcome = coordinator
                .create_note(text)
                .map_err(|err| err.to_string())?;
            match outcome {
                CreateOutcome::Confirmed { id, .. } => println!("added {id}"),
                CreateOutcome::RolledBack { text, error } => {
                    return Err(format!("add failed ({error}); text kept for retry: {text}"));
                }
                other => println!("add resolved as {other:?}"),
            }
        }
        Command::Edit { id, text } => {
            coordinator
                .edit_note(&NoteId::stable(id), text)
                .map_err(|err| err.to_string())?;
            for outcome in coordinator.flush_pending() {
                if let EditOutcome::Failed { id, error } = outcome {
                    eprintln!("warning: edit of {id} kept locally, sync failed: {error}");
                }
            }
        }
        Command::Rm { id } => match coordinator.delete_note(&NoteId::stable(id)) {
            DeleteOutcome::Committed { id } => println!("deleted {id}"),
            DeleteOutcome::NotPresent { id } => println!("no note {id}"),
            DeleteOutcome::RolledBack { id, error, .. } => {
                return Err(format!("delete of {id} rolled back: {error}"));
            }
            DeleteOutcome::DeferredToCreate { id } => println!("delete of {id} deferred"),
        },
    }

    for note in coordinator.notes() {
        println!("{}\t{}", note.id, note.text.replace('\n', "\\n"));
    }
    Ok(())
}

/// Renders the fresh cache without touching the store; fetches only when no
/// usable snapshot exists.
fn show_cached_or_fetch<R: RemoteNoteService>(coordinator: &mut SyncCoordinator<R>) {
    let restored = coordinator.restore_from_cache();
    info!(
        "event=cli_start module=cli status=ok command=list cache={:?}",
        restored
    );
    if restored != CacheRestore::Unavailable {
        return;
    }
    if let RefreshOutcome::Failed { error } = coordinator.refresh() {
        warn!("event=cli_start module=cli status=error error={}", error);
        eprintln!("warning: no cached notes and refresh failed: {error}");
    }
}

#[cfg(test)]
mod tests {
    use super::show_cached_or_fetch;
    use notesync_core::{
        CacheSnapshot, LocalCache, ManualClock, MemoryCacheBackend, Note, NoteId, RemoteNote,
        RemoteNoteService, ServiceResult, SharedClock, SyncConfig, SyncCoordinator, SyncSession,
    };
    use std::cell::Cell;
    use std::sync::Arc;

    const NOW_MS: i64 = 1_700_000_000_000;

    #[derive(Default)]
    struct CountingRemote {
        lists: Cell<usize>,
    }

    impl RemoteNoteService for CountingRemote {
        fn list(&self) -> ServiceResult<Vec<RemoteNote>> {
            self.lists.set(self.lists.get() + 1);
            Ok(vec![RemoteNote {
                id: "remote".to_string(),
                text: "from store".to_string(),
                created_at: None,
            }])
        }

        fn create(&self, text: &str) -> ServiceResult<RemoteNote> {
            Ok(RemoteNote {
                id: "created".to_string(),
                text: text.to_string(),
                created_at: None,
            })
        }

        fn update(&self, _id: &str, _text: &str) -> ServiceResult<()> {
            Ok(())
        }

        fn delete(&self, _id: &str) -> ServiceResult<()> {
            Ok(())
        }
    }

    fn coordinator(backend: MemoryCacheBackend) -> SyncCoordinator<CountingRemote> {
        let clock: SharedClock = Arc::new(ManualClock::new(NOW_MS));
        let config = SyncConfig::default();
        let cache = LocalCache::new(Box::new(backend), clock.clone(), config.cache_max_age_ms);
        let session = SyncSession::new(CountingRemote::default(), cache, clock);
        SyncCoordinator::new(session, config).unwrap()
    }

    #[test]
    fn list_uses_fresh_cache_without_fetching() {
        let backend = MemoryCacheBackend::with_snapshot(CacheSnapshot::new(
            vec![Note::new(NoteId::stable("cached"), "from cache")],
            NOW_MS - 1_000,
        ));
        let mut coordinator = coordinator(backend);

        show_cached_or_fetch(&mut coordinator);

        assert_eq!(coordinator.session().remote().lists.get(), 0);
        assert_eq!(coordinator.notes()[0].id, NoteId::stable("cached"));
    }

    #[test]
    fn list_fetches_when_cache_is_missing() {
        let mut coordinator = coordinator(MemoryCacheBackend::new());

        show_cached_or_fetch(&mut coordinator);

        assert_eq!(coordinator.session().remote().lists.get(), 1);
        assert_eq!(coordinator.notes()[0].id, NoteId::stable("remote"));
    }
}
