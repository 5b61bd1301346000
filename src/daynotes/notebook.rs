//! # Note Collection Engine
//!
//! [`Notebook`] owns the date-partitioned note collection and the current
//! selection. It is the only code that mutates either; everything else goes
//! through its operations.
//!
//! ## Invariants
//!
//! - A day key exists only while it holds at least one note.
//! - Note ids are unique within a day.
//! - After [`Notebook::load`] and after every mutating operation, today has at
//!   least one note. This is restored by [`Notebook::ensure_today_note`] rather
//!   than guaranteed by construction.
//! - The selection points at an existing note, except when a caller explicitly
//!   selects an unknown id (reads then see empty content).
//!
//! ## Persistence
//!
//! Mutations apply to memory immediately. Writing them out is deferred behind
//! a debounce timer keyed on the notebook, so a burst of edits produces one
//! write. The write serializes whatever the state is when the timer fires,
//! never a copy captured at scheduling time. Store failures are logged and
//! leave the notebook dirty; the next mutation re-arms the timer.
//!
//! Timers only fire from [`Notebook::tick`], which also watches for the date
//! rolling over. Callers drive it from their event loop.

use crate::clock::Clock;
use crate::config::NotesConfig;
use crate::error::{NotesError, Result};
use crate::ids::generate_id;
use crate::model::{
    Collection, Note, Selection, Snapshot, TitlePolicy, derive_title, normalize_title,
};
use crate::persistence::Persistence;
use crate::scheduler::Scheduler;
use crate::store::KeyValueStore;
use chrono::{DateTime, Duration, NaiveDate, Utc};

/// Change notifications, delivered synchronously before the mutating call returns.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NotebookEvent {
    /// Sent by [`Notebook::load`]. [`Notebook::open`] loads before anyone can
    /// subscribe, so listeners that want it use `new`, `subscribe`, then `load`.
    Loaded { days: usize },
    NoteCreated { date: NaiveDate, id: String },
    NoteDeleted { date: NaiveDate, id: String },
    DayRemoved { date: NaiveDate },
    SelectionChanged(Selection),
    ContentChanged { date: NaiveDate, id: String },
    TitleChanged { date: NaiveDate, id: String },
    Persisted,
    PersistFailed,
}

pub type Listener = Box<dyn FnMut(&NotebookEvent)>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
enum Timer {
    Persist,
}

pub struct Notebook<S: KeyValueStore, C: Clock> {
    notes: Collection,
    selection: Selection,
    persistence: Persistence<S>,
    clock: C,
    timers: Scheduler<Timer>,
    save_debounce: Duration,
    title_policy: TitlePolicy,
    dirty: bool,
    last_today: NaiveDate,
    listeners: Vec<Listener>,
}

impl<S: KeyValueStore, C: Clock> Notebook<S, C> {
    /// An empty notebook selecting today. Call [`Notebook::load`] to hydrate it.
    pub fn new(persistence: Persistence<S>, clock: C, config: &NotesConfig) -> Self {
        let today = clock.today();
        Self {
            notes: Collection::new(),
            selection: Selection::new(today),
            persistence,
            clock,
            timers: Scheduler::new(),
            save_debounce: config.save_debounce(),
            title_policy: config.title_policy,
            dirty: false,
            last_today: today,
            listeners: Vec::new(),
        }
    }

    /// [`Notebook::new`] followed by [`Notebook::load`]. Listeners added
    /// afterwards miss the load events.
    pub fn open(persistence: Persistence<S>, clock: C, config: &NotesConfig) -> Self {
        let mut notebook = Self::new(persistence, clock, config);
        notebook.load();
        notebook
    }

    pub fn subscribe(&mut self, listener: impl FnMut(&NotebookEvent) + 'static) {
        self.listeners.push(Box::new(listener));
    }

    // --- Lifecycle ---

    /// Replaces in-memory state with the persisted snapshot.
    ///
    /// Read or parse failures are logged and leave an empty collection; the
    /// notebook stays usable either way. A stored note id is only adopted if
    /// that note exists on the stored day, since the keys are written
    /// independently and can disagree after a crash.
    pub fn load(&mut self) {
        let now = self.clock.now();
        let today = self.clock.today();

        match self.persistence.load_snapshot(now) {
            Ok(snapshot) => {
                let date = snapshot.selected_date.unwrap_or(today);
                let note_id = snapshot
                    .selected_note_id
                    .filter(|id| find(&snapshot.notes, date, id).is_some());
                self.notes = snapshot.notes;
                self.selection = Selection { date, note_id };
                tracing::info!(days = self.notes.len(), "Loaded notes");
            }
            Err(e) => {
                tracing::error!("Failed to load notes, starting fresh: {}", e);
                self.notes = Collection::new();
                self.selection = Selection::new(today);
            }
        }

        self.last_today = today;
        self.emit(NotebookEvent::Loaded {
            days: self.notes.len(),
        });
        self.ensure_today_note();
    }

    /// Makes sure today has a note, and that something is selected.
    pub fn ensure_today_note(&mut self) {
        let today = self.clock.today();
        let has_notes = self.notes.get(&today).is_some_and(|day| !day.is_empty());
        if !has_notes {
            self.create_note(today);
            return;
        }
        // A selection on any day is kept; a dangling one is replaced.
        if self.current_note().is_some() {
            return;
        }

        let latest = self
            .notes
            .get(&today)
            .and_then(|day| most_recently_updated(day))
            .map(|n| n.id.clone());
        if let Some(id) = latest {
            self.selection = Selection {
                date: today,
                note_id: Some(id),
            };
            self.emit(NotebookEvent::SelectionChanged(self.selection.clone()));
        }
    }

    // --- Mutations ---

    /// Prepends a fresh note to `date`, selects it and returns its id.
    pub fn create_note(&mut self, date: NaiveDate) -> String {
        let now = self.clock.now();
        let bucket = self.notes.entry(date).or_default();
        let mut id = generate_id(now);
        while bucket.iter().any(|n| n.id == id) {
            id = generate_id(now);
        }
        bucket.insert(0, Note::new(id.clone(), now));

        self.selection = Selection {
            date,
            note_id: Some(id.clone()),
        };
        tracing::debug!(%date, id = %id, "Created note");
        self.emit(NotebookEvent::NoteCreated {
            date,
            id: id.clone(),
        });
        self.emit(NotebookEvent::SelectionChanged(self.selection.clone()));
        self.schedule_save();
        id
    }

    /// Selects `date`, and either the given note or the day's first one.
    ///
    /// A day with no notes gets a new one. The given id is not checked.
    pub fn select_note(&mut self, date: NaiveDate, note_id: Option<&str>) {
        self.selection.date = date;
        match note_id {
            Some(id) => self.selection.note_id = Some(id.to_string()),
            None => {
                let first = self.day(date).first().map(|n| n.id.clone());
                match first {
                    Some(id) => self.selection.note_id = Some(id),
                    None => {
                        self.create_note(date);
                        return;
                    }
                }
            }
        }
        self.emit(NotebookEvent::SelectionChanged(self.selection.clone()));
        self.schedule_save();
    }

    /// Replaces the selected note's content. Returns false when nothing is selected.
    pub fn set_current_content(&mut self, value: &str) -> bool {
        let now = self.clock.now();
        let policy = self.title_policy;
        let Some(note) = self.current_note_mut() else {
            tracing::debug!("No selected note; ignoring content write");
            return false;
        };

        note.content = value.to_string();
        note.updated_at = now;
        if policy == TitlePolicy::FirstLine {
            note.title = derive_title(&note.content);
        }

        let (date, id) = (self.selection.date, note_id(&self.selection));
        self.emit(NotebookEvent::ContentChanged { date, id });
        self.schedule_save();
        true
    }

    /// Sets the selected note's title; blank becomes the placeholder.
    ///
    /// Rejected when titles are derived from content. With nothing selected
    /// this is a no-op.
    pub fn set_current_title(&mut self, title: &str) -> Result<()> {
        if self.title_policy == TitlePolicy::FirstLine {
            return Err(NotesError::TitlePolicy);
        }
        let now = self.clock.now();
        let Some(note) = self.current_note_mut() else {
            return Ok(());
        };

        note.title = normalize_title(title);
        note.updated_at = now;

        let (date, id) = (self.selection.date, note_id(&self.selection));
        self.emit(NotebookEvent::TitleChanged { date, id });
        self.schedule_save();
        Ok(())
    }

    /// Removes a note. Returns false if it was not there.
    ///
    /// If the note was selected, selection moves to the day's new first note,
    /// or to a fresh note when the day was today, or else to today.
    pub fn delete_note(&mut self, date: NaiveDate, note_id: &str) -> bool {
        let today = self.clock.today();
        let Some(bucket) = self.notes.get_mut(&date) else {
            return false;
        };
        let Some(pos) = bucket.iter().position(|n| n.id == note_id) else {
            return false;
        };

        bucket.remove(pos);
        let next_first = bucket.first().map(|n| n.id.clone());
        if bucket.is_empty() {
            self.notes.remove(&date);
        }
        tracing::debug!(%date, id = note_id, "Deleted note");
        self.emit(NotebookEvent::NoteDeleted {
            date,
            id: note_id.to_string(),
        });
        if next_first.is_none() {
            self.emit(NotebookEvent::DayRemoved { date });
        }

        if self.selection.is(date, note_id) {
            match next_first {
                Some(id) => {
                    self.selection.note_id = Some(id);
                    self.emit(NotebookEvent::SelectionChanged(self.selection.clone()));
                }
                None if date == today => {
                    self.create_note(date);
                }
                None => self.select_note(today, None),
            }
        }

        self.ensure_today_note();
        self.schedule_save();
        true
    }

    // --- Timers ---

    /// Runs the rollover check and any timers that are due.
    pub fn tick(&mut self) {
        self.check_rollover();
        let now = self.clock.now();
        for timer in self.timers.drain_due(now) {
            match timer {
                Timer::Persist => {
                    if self.dirty {
                        self.persist();
                    }
                }
            }
        }
    }

    /// Writes pending changes now and cancels the debounce. Returns false if the write failed.
    pub fn flush(&mut self) -> bool {
        self.timers.cancel(&Timer::Persist);
        if !self.dirty {
            return true;
        }
        self.persist()
    }

    /// When the next timer wants [`Notebook::tick`] to run.
    pub fn next_deadline(&mut self) -> Option<DateTime<Utc>> {
        self.timers.next_deadline()
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    fn check_rollover(&mut self) {
        let today = self.clock.today();
        if today == self.last_today {
            return;
        }
        let previous = std::mem::replace(&mut self.last_today, today);
        if today < previous {
            tracing::warn!(%previous, %today, "Clock moved backwards; not switching days");
            return;
        }
        if self.selection.date < today {
            tracing::info!(%today, "Date rolled over; switching to today");
            self.select_note(today, None);
        }
    }

    fn schedule_save(&mut self) {
        self.dirty = true;
        let deadline = self
            .timers
            .schedule_after(Timer::Persist, self.save_debounce, self.clock.now());
        tracing::debug!(%deadline, "Save scheduled");
    }

    fn persist(&mut self) -> bool {
        match self.persistence.save_snapshot(&self.snapshot()) {
            Ok(()) => {
                self.dirty = false;
                self.emit(NotebookEvent::Persisted);
                true
            }
            Err(e) => {
                tracing::error!("Failed to save notes: {}", e);
                self.emit(NotebookEvent::PersistFailed);
                false
            }
        }
    }

    fn emit(&mut self, event: NotebookEvent) {
        for listener in self.listeners.iter_mut() {
            listener(&event);
        }
    }

    // --- Reads ---

    pub fn notes(&self) -> &Collection {
        &self.notes
    }

    pub fn day(&self, date: NaiveDate) -> &[Note] {
        self.notes.get(&date).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Days that have notes, newest first.
    pub fn days(&self) -> Vec<NaiveDate> {
        self.notes.keys().rev().copied().collect()
    }

    pub fn selection(&self) -> &Selection {
        &self.selection
    }

    pub fn current_note(&self) -> Option<&Note> {
        let id = self.selection.note_id.as_deref()?;
        find(&self.notes, self.selection.date, id)
    }

    /// Empty when the selection does not resolve to a note.
    pub fn current_content(&self) -> &str {
        self.current_note().map(|n| n.content.as_str()).unwrap_or("")
    }

    pub fn current_title(&self) -> &str {
        self.current_note().map(|n| n.title.as_str()).unwrap_or("")
    }

    pub fn title_policy(&self) -> TitlePolicy {
        self.title_policy
    }

    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            notes: self.notes.clone(),
            selected_date: Some(self.selection.date),
            selected_note_id: self.selection.note_id.clone(),
        }
    }

    pub fn today(&self) -> NaiveDate {
        self.clock.today()
    }

    pub fn clock(&self) -> &C {
        &self.clock
    }

    pub fn persistence(&self) -> &Persistence<S> {
        &self.persistence
    }

    fn current_note_mut(&mut self) -> Option<&mut Note> {
        let id = self.selection.note_id.as_deref()?;
        self.notes
            .get_mut(&self.selection.date)?
            .iter_mut()
            .find(|n| n.id == id)
    }
}

fn find<'a>(notes: &'a Collection, date: NaiveDate, id: &str) -> Option<&'a Note> {
    notes.get(&date)?.iter().find(|n| n.id == id)
}

fn note_id(selection: &Selection) -> String {
    selection.note_id.clone().unwrap_or_default()
}

/// Latest `updated_at`; on ties the earliest in bucket order wins.
fn most_recently_updated(notes: &[Note]) -> Option<&Note> {
    notes
        .iter()
        .reduce(|best, n| if n.updated_at > best.updated_at { n } else { best })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;
    use crate::dates::parse_day;
    use crate::model::PLACEHOLDER_TITLE;
    use crate::persistence::DAILY_NOTES_KEY;
    use crate::store::memory::MemoryStore;
    use crate::store::memory::fixtures::StoreFixture;
    use std::cell::RefCell;
    use std::rc::Rc;

    type TestNotebook = Notebook<MemoryStore, ManualClock>;

    fn day(s: &str) -> NaiveDate {
        parse_day(s).unwrap()
    }

    fn open_with(store: MemoryStore, today: &str, config: &NotesConfig) -> (ManualClock, TestNotebook) {
        let clock = ManualClock::at_day(day(today));
        let notebook = Notebook::open(Persistence::new(store), clock.clone(), config);
        (clock, notebook)
    }

    fn open(store: MemoryStore, today: &str) -> (ManualClock, TestNotebook) {
        open_with(store, today, &NotesConfig::default())
    }

    fn assert_invariants(notebook: &TestNotebook) {
        for (date, notes) in notebook.notes() {
            assert!(!notes.is_empty(), "empty bucket for {}", date);
            let mut ids: Vec<&str> = notes.iter().map(|n| n.id.as_str()).collect();
            ids.sort();
            ids.dedup();
            assert_eq!(ids.len(), notes.len(), "duplicate ids on {}", date);
        }
        assert!(!notebook.day(notebook.today()).is_empty());
    }

    // --- load / ensure_today_note ---

    #[test]
    fn fresh_store_bootstraps_today() {
        let (_clock, notebook) = open(MemoryStore::new(), "2025-06-06");

        let today = notebook.day(day("2025-06-06"));
        assert_eq!(today.len(), 1);
        assert_eq!(today[0].title, PLACEHOLDER_TITLE);
        assert_eq!(today[0].content, "");
        assert_eq!(notebook.selection().note_id.as_deref(), Some(today[0].id.as_str()));
        assert_invariants(&notebook);
    }

    #[test]
    fn load_failure_starts_fresh() {
        let store = MemoryStore::new();
        store.set(DAILY_NOTES_KEY, "{{{").unwrap();

        let (_clock, notebook) = open(store, "2025-06-06");
        assert_eq!(notebook.days(), vec![day("2025-06-06")]);
        assert_invariants(&notebook);
    }

    #[test]
    fn load_read_error_starts_fresh() {
        let store = MemoryStore::new();
        store.set_simulate_read_error(true);
        let (_clock, notebook) = open(store, "2025-06-06");
        assert_eq!(notebook.notes().len(), 1);
    }

    #[test]
    fn load_restores_valid_selection() {
        let store = StoreFixture::new()
            .with_note("2025-06-05", "a", "alpha", "2025-06-05T10:00:00Z")
            .with_note("2025-06-05", "b", "beta", "2025-06-05T09:00:00Z")
            .with_note("2025-06-06", "t", "today", "2025-06-06T08:00:00Z")
            .with_selection("2025-06-05", "b")
            .build();

        let (_clock, notebook) = open(store, "2025-06-06");
        assert_eq!(notebook.selection().date, day("2025-06-05"));
        assert_eq!(notebook.current_content(), "beta");
    }

    #[test]
    fn load_drops_dangling_selected_id_and_picks_latest_today() {
        let store = StoreFixture::new()
            .with_note("2025-06-06", "older", "1", "2025-06-06T08:00:00Z")
            .with_note("2025-06-06", "newer", "2", "2025-06-06T11:00:00Z")
            .with_selection("2025-06-06", "ghost")
            .build();

        let (_clock, notebook) = open(store, "2025-06-06");
        assert_eq!(notebook.selection().note_id.as_deref(), Some("newer"));
        assert_eq!(notebook.day(day("2025-06-06")).len(), 2);
    }

    #[test]
    fn ensure_today_tie_break_keeps_bucket_order() {
        let store = StoreFixture::new()
            .with_note("2025-06-06", "first", "", "2025-06-06T08:00:00Z")
            .with_note("2025-06-06", "second", "", "2025-06-06T08:00:00Z")
            .with_note("2025-06-06", "third", "", "2025-06-06T07:00:00Z")
            .build();

        let (_clock, notebook) = open(store, "2025-06-06");
        assert_eq!(notebook.selection().note_id.as_deref(), Some("first"));
        let order: Vec<&str> = notebook
            .day(day("2025-06-06"))
            .iter()
            .map(|n| n.id.as_str())
            .collect();
        assert_eq!(order, vec!["first", "second", "third"]);
    }

    #[test]
    fn ensure_today_note_is_idempotent() {
        let (_clock, mut notebook) = open(MemoryStore::new(), "2025-06-06");
        let before = notebook.snapshot();
        notebook.ensure_today_note();
        notebook.ensure_today_note();
        assert_eq!(notebook.snapshot(), before);
    }

    #[test]
    fn legacy_note_without_title_is_migrated() {
        let store = StoreFixture::new()
            .with_raw_note(
                "2025-06-06",
                serde_json::json!({
                    "id": "legacy",
                    "content": "hi",
                    "createdAt": "2025-06-06T08:00:00Z",
                    "updatedAt": "2025-06-06T08:00:00Z"
                }),
            )
            .build();

        let (_clock, notebook) = open(store, "2025-06-06");
        assert_eq!(notebook.current_title(), PLACEHOLDER_TITLE);
    }

    // --- create / select ---

    #[test]
    fn create_note_prepends_and_selects() {
        let (clock, mut notebook) = open(MemoryStore::new(), "2025-06-06");
        let original = notebook.selection().note_id.clone().unwrap();

        clock.advance_ms(5);
        let id = notebook.create_note(day("2025-06-06"));

        let bucket = notebook.day(day("2025-06-06"));
        assert_eq!(bucket.len(), 2);
        assert_eq!(bucket[0].id, id);
        assert_eq!(bucket[1].id, original);
        assert_eq!(bucket[0].created_at, bucket[0].updated_at);
        assert!(notebook.selection().is(day("2025-06-06"), &id));
    }

    #[test]
    fn select_day_without_id_picks_first_note() {
        let (_clock, mut notebook) = open(MemoryStore::new(), "2025-06-06");
        let past = day("2025-06-01");
        let older = notebook.create_note(past);
        let newer = notebook.create_note(past);
        notebook.select_note(day("2025-06-06"), None);

        notebook.select_note(past, None);
        assert!(notebook.selection().is(past, &newer));
        assert_ne!(older, newer);
    }

    #[test]
    fn select_empty_day_creates_note() {
        let (_clock, mut notebook) = open(MemoryStore::new(), "2025-06-06");
        notebook.select_note(day("2025-05-01"), None);

        assert_eq!(notebook.day(day("2025-05-01")).len(), 1);
        assert_eq!(notebook.selection().date, day("2025-05-01"));
        assert!(notebook.current_note().is_some());
    }

    #[test]
    fn selecting_unknown_id_reads_empty() {
        let (_clock, mut notebook) = open(MemoryStore::new(), "2025-06-06");
        notebook.select_note(day("2025-06-06"), Some("nope"));

        assert_eq!(notebook.current_content(), "");
        assert!(!notebook.set_current_content("lost"));
        assert!(notebook.set_current_title("lost").is_ok());
        assert!(notebook.notes().values().flatten().all(|n| n.content.is_empty()));
    }

    #[test]
    fn ensure_today_note_repairs_dangling_selection() {
        let (_clock, mut notebook) = open(MemoryStore::new(), "2025-06-06");
        let today_id = notebook.selection().note_id.clone().unwrap();
        notebook.select_note(day("2025-06-06"), Some("ghost"));

        notebook.ensure_today_note();
        assert_eq!(
            notebook.selection(),
            &Selection {
                date: day("2025-06-06"),
                note_id: Some(today_id),
            }
        );
        assert!(notebook.current_note().is_some());
    }

    #[test]
    fn ensure_today_note_keeps_valid_past_selection() {
        let store = StoreFixture::new()
            .with_note("2025-06-01", "old", "then", "2025-06-01T09:00:00Z")
            .with_note("2025-06-06", "now", "", "2025-06-06T09:00:00Z")
            .with_selection("2025-06-01", "old")
            .build();
        let (_clock, mut notebook) = open(store, "2025-06-06");

        notebook.ensure_today_note();
        assert!(notebook.selection().is(day("2025-06-01"), "old"));
    }

    // --- content / title ---

    #[test]
    fn content_write_updates_timestamp_but_not_manual_title() {
        let (clock, mut notebook) = open(MemoryStore::new(), "2025-06-06");
        clock.advance_ms(1500);
        assert!(notebook.set_current_content("Buy milk\nand eggs"));

        let note = notebook.current_note().unwrap();
        assert_eq!(note.content, "Buy milk\nand eggs");
        assert_eq!(note.title, PLACEHOLDER_TITLE);
        assert!(note.updated_at > note.created_at);
    }

    #[test]
    fn first_line_policy_derives_title() {
        let config = NotesConfig {
            title_policy: TitlePolicy::FirstLine,
            ..NotesConfig::default()
        };
        let (clock, mut notebook) = open_with(MemoryStore::new(), "2025-06-06", &config);
        notebook.create_note(day("2025-06-06"));
        clock.advance_ms(10);
        notebook.set_current_content("Buy milk\nand eggs");

        let note = notebook.current_note().unwrap();
        assert_eq!(note.title, "Buy milk");
        assert!(note.updated_at > note.created_at);

        notebook.set_current_content("");
        assert_eq!(notebook.current_title(), PLACEHOLDER_TITLE);
    }

    #[test]
    fn first_line_policy_rejects_manual_titles() {
        let config = NotesConfig {
            title_policy: TitlePolicy::FirstLine,
            ..NotesConfig::default()
        };
        let (_clock, mut notebook) = open_with(MemoryStore::new(), "2025-06-06", &config);
        notebook.set_current_content("Derived");

        let err = notebook.set_current_title("Manual").unwrap_err();
        assert!(matches!(err, NotesError::TitlePolicy));
        assert_eq!(notebook.current_title(), "Derived");
    }

    #[test]
    fn manual_title_blank_becomes_placeholder() {
        let (clock, mut notebook) = open(MemoryStore::new(), "2025-06-06");
        notebook.set_current_title("Standup").unwrap();
        assert_eq!(notebook.current_title(), "Standup");

        clock.advance_ms(10);
        notebook.set_current_title("   ").unwrap();
        let note = notebook.current_note().unwrap();
        assert_eq!(note.title, PLACEHOLDER_TITLE);
        assert!(note.updated_at > note.created_at);
    }

    // --- delete ---

    #[test]
    fn delete_selected_moves_to_next_in_day() {
        let store = StoreFixture::new()
            .with_note("2025-06-05", "A", "a", "2025-06-05T10:00:00Z")
            .with_note("2025-06-05", "B", "b", "2025-06-05T09:00:00Z")
            .with_selection("2025-06-05", "A")
            .build();
        let (_clock, mut notebook) = open(store, "2025-06-06");

        assert!(notebook.delete_note(day("2025-06-05"), "A"));
        assert_eq!(notebook.selection().note_id.as_deref(), Some("B"));
        assert_eq!(notebook.day(day("2025-06-05")).len(), 1);
        assert_invariants(&notebook);
    }

    #[test]
    fn delete_last_note_of_past_day_removes_day_and_goes_to_today() {
        let store = StoreFixture::new()
            .with_note("2025-06-05", "A", "a", "2025-06-05T10:00:00Z")
            .with_selection("2025-06-05", "A")
            .build();
        let (_clock, mut notebook) = open(store, "2025-06-06");

        assert!(notebook.delete_note(day("2025-06-05"), "A"));
        assert!(!notebook.notes().contains_key(&day("2025-06-05")));
        assert_eq!(notebook.selection().date, day("2025-06-06"));
        let today_first = &notebook.day(day("2025-06-06"))[0];
        assert_eq!(notebook.selection().note_id.as_deref(), Some(today_first.id.as_str()));
        assert_invariants(&notebook);
    }

    #[test]
    fn delete_last_note_of_today_creates_replacement() {
        let (_clock, mut notebook) = open(MemoryStore::new(), "2025-06-06");
        let only = notebook.selection().note_id.clone().unwrap();

        assert!(notebook.delete_note(day("2025-06-06"), &only));
        let bucket = notebook.day(day("2025-06-06"));
        assert_eq!(bucket.len(), 1);
        assert_ne!(bucket[0].id, only);
        assert!(notebook.selection().is(day("2025-06-06"), &bucket[0].id));
    }

    #[test]
    fn delete_unselected_last_note_of_today_restores_today() {
        let (_clock, mut notebook) = open(MemoryStore::new(), "2025-06-06");
        let only = notebook.selection().note_id.clone().unwrap();
        notebook.select_note(day("2025-06-01"), None);

        assert!(notebook.delete_note(day("2025-06-06"), &only));
        let bucket = notebook.day(day("2025-06-06"));
        assert_eq!(bucket.len(), 1);
        assert_ne!(bucket[0].id, only);
        // The replacement note is created, and therefore selected, like any other.
        assert!(notebook.selection().is(day("2025-06-06"), &bucket[0].id));
        assert_eq!(notebook.day(day("2025-06-01")).len(), 1);
        assert_invariants(&notebook);
    }

    #[test]
    fn delete_missing_note_is_noop() {
        let (_clock, mut notebook) = open(MemoryStore::new(), "2025-06-06");
        let before = notebook.snapshot();
        assert!(!notebook.delete_note(day("2025-06-06"), "nope"));
        assert!(!notebook.delete_note(day("2024-01-01"), "nope"));
        assert_eq!(notebook.snapshot(), before);
    }

    // --- persistence ---

    #[test]
    fn edits_within_debounce_collapse_to_one_write() {
        let store = MemoryStore::new();
        let (clock, mut notebook) = open(store.clone(), "2025-06-06");
        notebook.flush();
        let writes_before = store.write_count(DAILY_NOTES_KEY);

        for i in 1..=5 {
            notebook.set_current_content(&format!("draft {}", i));
            clock.advance_ms(200);
            notebook.tick();
        }
        assert_eq!(store.write_count(DAILY_NOTES_KEY), writes_before);

        clock.advance_ms(1000);
        notebook.tick();
        assert_eq!(store.write_count(DAILY_NOTES_KEY), writes_before + 1);
        assert!(store.raw(DAILY_NOTES_KEY).unwrap().contains("draft 5"));
        assert!(!notebook.is_dirty());
    }

    #[test]
    fn write_reflects_state_at_fire_time() {
        let store = MemoryStore::new();
        let (clock, mut notebook) = open(store.clone(), "2025-06-06");
        notebook.set_current_content("first");
        let first = notebook.selection().note_id.clone().unwrap();
        notebook.create_note(day("2025-06-06"));
        notebook.delete_note(day("2025-06-06"), &first);

        clock.advance_ms(1000);
        notebook.tick();

        let reloaded = Persistence::new(store).load_snapshot(clock.now()).unwrap();
        assert_eq!(reloaded.notes[&day("2025-06-06")].len(), 1);
        assert_eq!(reloaded.selected_note_id, notebook.selection().note_id);
    }

    #[test]
    fn save_then_load_round_trips() {
        let store = MemoryStore::new();
        let (_clock, mut notebook) = open(store.clone(), "2025-06-06");
        notebook.set_current_title("Plans").unwrap();
        notebook.set_current_content("ship it");
        notebook.create_note(day("2025-06-04"));
        notebook.set_current_content("older day");
        assert!(notebook.flush());

        let (_clock2, reloaded) = open(store, "2025-06-06");
        assert_eq!(reloaded.notes(), notebook.notes());
        assert_eq!(reloaded.selection(), notebook.selection());
    }

    #[test]
    fn write_failure_keeps_memory_and_retries_on_next_edit() {
        let store = MemoryStore::new();
        let (clock, mut notebook) = open(store.clone(), "2025-06-06");
        notebook.flush();

        store.set_simulate_write_error(true);
        notebook.set_current_content("precious");
        clock.advance_ms(1000);
        notebook.tick();
        assert!(notebook.is_dirty());
        assert_eq!(notebook.current_content(), "precious");

        store.set_simulate_write_error(false);
        clock.advance_ms(5000);
        notebook.tick();
        assert!(!store.raw(DAILY_NOTES_KEY).unwrap().contains("precious"));

        notebook.set_current_content("precious!");
        clock.advance_ms(1000);
        notebook.tick();
        assert!(store.raw(DAILY_NOTES_KEY).unwrap().contains("precious!"));
        assert!(!notebook.is_dirty());
    }

    #[test]
    fn flush_cancels_pending_write() {
        let store = MemoryStore::new();
        let (clock, mut notebook) = open(store.clone(), "2025-06-06");
        notebook.set_current_content("now");
        assert!(notebook.flush());
        let writes = store.write_count(DAILY_NOTES_KEY);

        clock.advance_ms(2000);
        notebook.tick();
        assert_eq!(store.write_count(DAILY_NOTES_KEY), writes);
        assert_eq!(notebook.next_deadline(), None);
    }

    // --- rollover ---

    #[test]
    fn rollover_switches_to_new_day() {
        let (clock, mut notebook) = open(MemoryStore::new(), "2025-06-06");
        clock.advance(Duration::days(1));
        notebook.tick();

        assert_eq!(notebook.selection().date, day("2025-06-07"));
        assert_eq!(notebook.day(day("2025-06-07")).len(), 1);
        assert_eq!(notebook.day(day("2025-06-06")).len(), 1);
    }

    #[test]
    fn rollover_ignores_same_day_and_backwards_clock() {
        let (clock, mut notebook) = open(MemoryStore::new(), "2025-06-06");
        let before = notebook.selection().clone();

        clock.advance(Duration::hours(1));
        notebook.tick();
        assert_eq!(notebook.selection(), &before);

        clock.advance(Duration::days(-3));
        notebook.tick();
        assert_eq!(notebook.selection(), &before);
        assert!(!notebook.notes().contains_key(&day("2025-06-03")));
    }

    #[test]
    fn rollover_leaves_future_selection_alone() {
        let (clock, mut notebook) = open(MemoryStore::new(), "2025-06-06");
        notebook.select_note(day("2025-06-10"), None);
        let before = notebook.selection().clone();

        clock.advance(Duration::days(1));
        notebook.tick();
        assert_eq!(notebook.selection(), &before);
    }

    // --- notifications ---

    #[test]
    fn listeners_see_events_in_order() {
        let (_clock, mut notebook) = open(MemoryStore::new(), "2025-06-06");
        let seen: Rc<RefCell<Vec<NotebookEvent>>> = Rc::default();
        let sink = seen.clone();
        notebook.subscribe(move |e| sink.borrow_mut().push(e.clone()));

        let id = notebook.create_note(day("2025-06-06"));
        notebook.set_current_content("x");
        notebook.flush();

        let events = seen.borrow();
        assert_eq!(
            events[0],
            NotebookEvent::NoteCreated {
                date: day("2025-06-06"),
                id: id.clone()
            }
        );
        assert!(matches!(events[1], NotebookEvent::SelectionChanged(_)));
        assert_eq!(
            events[2],
            NotebookEvent::ContentChanged {
                date: day("2025-06-06"),
                id
            }
        );
        assert_eq!(events[3], NotebookEvent::Persisted);
    }

    #[test]
    fn subscribing_before_load_sees_loaded() {
        let store = StoreFixture::new()
            .with_note("2025-06-01", "a", "", "2025-06-01T09:00:00Z")
            .build();
        let clock = ManualClock::at_day(day("2025-06-06"));
        let mut notebook =
            Notebook::new(Persistence::new(store), clock, &NotesConfig::default());
        let seen: Rc<RefCell<Vec<NotebookEvent>>> = Rc::default();
        let sink = seen.clone();
        notebook.subscribe(move |e| sink.borrow_mut().push(e.clone()));

        notebook.load();

        let events = seen.borrow();
        assert_eq!(events[0], NotebookEvent::Loaded { days: 1 });
        assert!(matches!(
            events[1],
            NotebookEvent::NoteCreated { date, .. } if date == day("2025-06-06")
        ));
    }
}
