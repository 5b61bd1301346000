//! Application state, built once at startup and passed to whatever drives it.
//!
//! A [`Session`] owns the notebook, the autosave state machine, the mocked
//! auth provider and the theme preference. There are no globals: a UI holds a
//! `Session` and calls into it, then reads back what it needs to render.

use crate::auth::MockAuth;
use crate::autosave::{Autosave, RemoteSync, SaveStatus};
use crate::clock::Clock;
use crate::config::NotesConfig;
use crate::error::Result;
use crate::notebook::Notebook;
use crate::persistence::Persistence;
use crate::store::KeyValueStore;
use crate::theme::ThemeSettings;
use chrono::{DateTime, Utc};

pub struct Session<S: KeyValueStore, C: Clock, R: RemoteSync> {
    pub notebook: Notebook<S, C>,
    pub autosave: Autosave<R>,
    pub auth: MockAuth,
    pub theme: ThemeSettings,
}

impl<S: KeyValueStore, C: Clock, R: RemoteSync> Session<S, C, R> {
    /// Loads notes and theme from `store` and ensures today has a note.
    pub fn start(store: S, clock: C, remote: R, config: &NotesConfig) -> Self {
        let persistence = Persistence::new(store).with_prefix(&config.key_prefix);
        let theme = ThemeSettings::initialize(&persistence);
        let notebook = Notebook::open(persistence, clock, config);
        Self {
            notebook,
            autosave: Autosave::new(remote, config),
            auth: MockAuth::new(),
            theme,
        }
    }

    /// Replaces the active note's content and restarts autosave. Returns
    /// false when nothing is selected.
    pub fn edit(&mut self, content: &str) -> bool {
        if !self.notebook.set_current_content(content) {
            return false;
        }
        let now = self.notebook.clock().now();
        self.autosave.content_changed(content, now);
        true
    }

    pub fn change_theme(&mut self, name: &str) -> Result<()> {
        self.theme.change(name, self.notebook.persistence())
    }

    pub fn save_status(&self) -> SaveStatus {
        self.autosave.status()
    }

    /// Runs every component's due timers.
    pub fn tick(&mut self) {
        self.notebook.tick();
        self.autosave.tick(&mut self.notebook, &self.auth);
    }

    /// Earliest moment [`Session::tick`] has work to do.
    pub fn next_deadline(&mut self) -> Option<DateTime<Utc>> {
        match (self.notebook.next_deadline(), self.autosave.next_deadline()) {
            (Some(a), Some(b)) => Some(a.min(b)),
            (a, b) => a.or(b),
        }
    }

    /// Runs anything already due, completes a pending autosave without
    /// waiting, then writes unsaved changes. Returns false if that write
    /// failed.
    pub fn shutdown(&mut self) -> bool {
        self.tick();
        if self.autosave.is_pending() {
            tracing::debug!("Completing pending autosave on shutdown");
            self.autosave.flush_now(&mut self.notebook, &self.auth);
        }
        self.notebook.flush()
    }
}
