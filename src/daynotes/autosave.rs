//! # Autosave
//!
//! Sits between edits and storage. Every content change restarts a quiet
//! period; when it elapses the notebook is flushed to the local store and,
//! if someone is logged in, the active note is pushed to the remote.
//!
//! ```text
//! Saved ──edit──▶ Saving ──flush ok, push ok──▶ SyncedToCloud ──display delay──▶ Saved
//!                   │
//!                   ├──flush, not logged in──▶ Saved
//!                   └──flush, push failed────▶ SyncFailed (until the next edit)
//! ```
//!
//! The timers here live in their own [`Scheduler`], separate from the
//! notebook's persistence debounce. A failing remote never holds up a local
//! write, and a local write failure is the notebook's to retry.

use crate::auth::AuthProvider;
use crate::clock::Clock;
use crate::config::NotesConfig;
use crate::error::{NotesError, Result};
use crate::model::Collection;
use crate::notebook::Notebook;
use crate::scheduler::Scheduler;
use crate::store::KeyValueStore;
use chrono::{DateTime, Duration, NaiveDate, Utc};
use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::Rc;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SaveStatus {
    #[default]
    Saved,
    Saving,
    SyncedToCloud,
    SyncFailed,
}

impl fmt::Display for SaveStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            SaveStatus::Saved => "Saved",
            SaveStatus::Saving => "Saving...",
            SaveStatus::SyncedToCloud => "Synced to cloud",
            SaveStatus::SyncFailed => "Sync failed",
        };
        f.write_str(label)
    }
}

/// What gets pushed to the remote on each autosave.
pub struct SyncPayload<'a> {
    pub date: NaiveDate,
    pub content: &'a str,
    pub notes: &'a Collection,
}

/// Remote side of autosave. Only a mock exists.
pub trait RemoteSync {
    fn push(&mut self, payload: &SyncPayload<'_>) -> Result<()>;
}

/// Accepts every push unless told to fail. Clones share state, so a test can
/// keep a handle after moving one into [`Autosave`].
#[derive(Debug, Clone, Default)]
pub struct MockRemote {
    fail: Rc<Cell<bool>>,
    pushes: Rc<RefCell<Vec<(NaiveDate, String)>>>,
}

impl MockRemote {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_fail(&self, fail: bool) {
        self.fail.set(fail);
    }

    pub fn push_count(&self) -> usize {
        self.pushes.borrow().len()
    }

    pub fn last_push(&self) -> Option<(NaiveDate, String)> {
        self.pushes.borrow().last().cloned()
    }
}

impl RemoteSync for MockRemote {
    fn push(&mut self, payload: &SyncPayload<'_>) -> Result<()> {
        if self.fail.get() {
            return Err(NotesError::Api("Simulated sync failure".to_string()));
        }
        self.pushes
            .borrow_mut()
            .push((payload.date, payload.content.to_string()));
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
enum AutosaveTimer {
    Flush,
    RevertStatus,
}

pub struct Autosave<R: RemoteSync> {
    status: SaveStatus,
    timers: Scheduler<AutosaveTimer>,
    delay: Duration,
    status_display: Duration,
    remote: R,
}

impl<R: RemoteSync> Autosave<R> {
    pub fn new(remote: R, config: &NotesConfig) -> Self {
        Self {
            status: SaveStatus::default(),
            timers: Scheduler::new(),
            delay: config.autosave_delay(),
            status_display: config.status_display(),
            remote,
        }
    }

    pub fn status(&self) -> SaveStatus {
        self.status
    }

    pub fn remote(&self) -> &R {
        &self.remote
    }

    /// Restarts the quiet period. Blank content is ignored.
    pub fn content_changed(&mut self, content: &str, now: DateTime<Utc>) {
        if content.trim().is_empty() {
            return;
        }
        self.timers.cancel(&AutosaveTimer::RevertStatus);
        self.status = SaveStatus::Saving;
        let deadline = self
            .timers
            .schedule_after(AutosaveTimer::Flush, self.delay, now);
        tracing::debug!(%deadline, "Autosave scheduled");
    }

    pub fn is_pending(&self) -> bool {
        self.timers.is_pending(&AutosaveTimer::Flush)
    }

    pub fn next_deadline(&mut self) -> Option<DateTime<Utc>> {
        self.timers.next_deadline()
    }

    /// Runs whatever is due at the notebook clock's current time.
    pub fn tick<S, C, A>(&mut self, notebook: &mut Notebook<S, C>, auth: &A)
    where
        S: KeyValueStore,
        C: Clock,
        A: AuthProvider,
    {
        let now = notebook.clock().now();
        for timer in self.timers.drain_due(now) {
            match timer {
                AutosaveTimer::Flush => self.save(notebook, auth, now),
                AutosaveTimer::RevertStatus => {
                    if self.status == SaveStatus::SyncedToCloud {
                        self.status = SaveStatus::Saved;
                    }
                }
            }
        }
    }

    /// Runs a pending save right away instead of waiting out the delay.
    pub fn flush_now<S, C, A>(&mut self, notebook: &mut Notebook<S, C>, auth: &A)
    where
        S: KeyValueStore,
        C: Clock,
        A: AuthProvider,
    {
        if self.timers.cancel(&AutosaveTimer::Flush) {
            let now = notebook.clock().now();
            self.save(notebook, auth, now);
        }
    }

    fn save<S, C, A>(&mut self, notebook: &mut Notebook<S, C>, auth: &A, now: DateTime<Utc>)
    where
        S: KeyValueStore,
        C: Clock,
        A: AuthProvider,
    {
        if !notebook.flush() {
            tracing::warn!("Local save failed; will retry on the next edit");
        }

        if !auth.is_logged_in() {
            self.status = SaveStatus::Saved;
            return;
        }

        let payload = SyncPayload {
            date: notebook.selection().date,
            content: notebook.current_content(),
            notes: notebook.notes(),
        };
        match self.remote.push(&payload) {
            Ok(()) => {
                tracing::info!(user = auth.display_name(), "Synced to cloud");
                self.status = SaveStatus::SyncedToCloud;
                self.timers
                    .schedule_after(AutosaveTimer::RevertStatus, self.status_display, now);
            }
            Err(e) => {
                tracing::error!("Sync failed: {}", e);
                self.status = SaveStatus::SyncFailed;
            }
        }
    }
}
