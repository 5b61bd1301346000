use super::KeyValueStore;
use crate::error::{NotesError, Result};
use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::rc::Rc;

/// In-memory storage for testing and development.
/// Does NOT persist data.
///
/// Clones share the same entries, so a test can hand one copy to a notebook
/// and inspect (or reload from) another.
#[derive(Clone, Default)]
pub struct MemoryStore {
    entries: Rc<RefCell<HashMap<String, String>>>,
    writes: Rc<RefCell<HashMap<String, usize>>>,
    simulate_read_error: Rc<Cell<bool>>,
    simulate_write_error: Rc<Cell<bool>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Enable read error simulation for testing error handling.
    pub fn set_simulate_read_error(&self, simulate: bool) {
        self.simulate_read_error.set(simulate);
    }

    /// Enable write error simulation for testing error handling.
    pub fn set_simulate_write_error(&self, simulate: bool) {
        self.simulate_write_error.set(simulate);
    }

    /// Number of successful `set` calls for `key`.
    pub fn write_count(&self, key: &str) -> usize {
        self.writes.borrow().get(key).copied().unwrap_or(0)
    }

    /// Raw value, bypassing error simulation.
    pub fn raw(&self, key: &str) -> Option<String> {
        self.entries.borrow().get(key).cloned()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.borrow().is_empty()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        if self.simulate_read_error.get() {
            return Err(NotesError::Store("Simulated read error".to_string()));
        }
        Ok(self.entries.borrow().get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        if self.simulate_write_error.get() {
            return Err(NotesError::Store("Simulated write error".to_string()));
        }
        self.entries
            .borrow_mut()
            .insert(key.to_string(), value.to_string());
        *self.writes.borrow_mut().entry(key.to_string()).or_insert(0) += 1;
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<()> {
        if self.simulate_write_error.get() {
            return Err(NotesError::Store("Simulated write error".to_string()));
        }
        self.entries.borrow_mut().remove(key);
        Ok(())
    }
}

// --- Test Fixtures ---

#[cfg(any(test, feature = "test_utils"))]
pub mod fixtures {
    use super::*;
    use crate::model::Note;
    use chrono::{DateTime, Utc};
    use serde_json::{Map, Value, json};

    /// Builds a store pre-populated with a persisted snapshot.
    pub struct StoreFixture {
        pub store: MemoryStore,
        days: Map<String, Value>,
    }

    impl Default for StoreFixture {
        fn default() -> Self {
            Self::new()
        }
    }

    impl StoreFixture {
        pub fn new() -> Self {
            Self {
                store: MemoryStore::new(),
                days: Map::new(),
            }
        }

        /// Appends a note to `date`'s bucket (buckets are newest-first, so call in display order).
        pub fn with_note(mut self, date: &str, id: &str, content: &str, updated_at: &str) -> Self {
            let updated: DateTime<Utc> = updated_at.parse().unwrap();
            let mut note = Note::new(id.to_string(), updated);
            note.content = content.to_string();
            self.push(date, serde_json::to_value(note).unwrap());
            self
        }

        /// Appends an arbitrary JSON value as a note, e.g. a legacy record.
        pub fn with_raw_note(mut self, date: &str, note: Value) -> Self {
            self.push(date, note);
            self
        }

        pub fn with_selection(self, date: &str, note_id: &str) -> Self {
            self.store.set("selectedDate", date).unwrap();
            self.store.set("selectedNoteId", note_id).unwrap();
            self
        }

        pub fn build(self) -> MemoryStore {
            if !self.days.is_empty() {
                let notes = Value::Object(self.days).to_string();
                self.store.set("dailyNotes", &notes).unwrap();
            }
            self.store
        }

        fn push(&mut self, date: &str, note: Value) {
            let bucket = self
                .days
                .entry(date.to_string())
                .or_insert_with(|| json!([]));
            if let Value::Array(items) = bucket {
                items.push(note);
            }
        }
    }
}
