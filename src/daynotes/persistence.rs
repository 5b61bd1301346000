//! # Persistence Adapter
//!
//! Translates between the in-memory [`Snapshot`] and the flat key layout in a
//! [`KeyValueStore`]:
//!
//! | key              | value                                          |
//! |------------------|------------------------------------------------|
//! | `dailyNotes`     | JSON object, `"YYYY-MM-DD"` → array of notes    |
//! | `selectedDate`   | plain `YYYY-MM-DD`                             |
//! | `selectedNoteId` | plain id, empty string for none                |
//! | `selectedTheme`  | plain theme name                               |
//!
//! Every key can carry a namespace prefix.
//!
//! Reading is lenient. Stored data may have been written by older versions or
//! left half-written, so anything that can be salvaged is: bad day keys and
//! non-object notes are skipped, a note missing its `title` gets the
//! placeholder, missing ids and timestamps are filled in, duplicate ids inside
//! a day keep the first occurrence and empty days are dropped. Only a value
//! that is not JSON at all makes [`Persistence::load_snapshot`] fail.

use crate::dates::{day_string, parse_day};
use crate::error::Result;
use crate::ids::generate_id;
use crate::model::{Collection, Note, PLACEHOLDER_TITLE, Snapshot};
use crate::store::KeyValueStore;
use chrono::{DateTime, Utc};
use serde::Deserialize;
use serde_json::Value;
use std::collections::BTreeMap;

pub const DAILY_NOTES_KEY: &str = "dailyNotes";
pub const SELECTED_DATE_KEY: &str = "selectedDate";
pub const SELECTED_NOTE_ID_KEY: &str = "selectedNoteId";
pub const SELECTED_THEME_KEY: &str = "selectedTheme";
/// Written by early versions that stored a single note per day.
const LEGACY_CURRENT_NOTE_KEY: &str = "currentNote";

pub struct Persistence<S: KeyValueStore> {
    store: S,
    prefix: String,
}

impl<S: KeyValueStore> Persistence<S> {
    pub fn new(store: S) -> Self {
        Self {
            store,
            prefix: String::new(),
        }
    }

    pub fn with_prefix(mut self, prefix: &str) -> Self {
        self.prefix = prefix.to_string();
        self
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    fn key(&self, name: &str) -> String {
        format!("{}{}", self.prefix, name)
    }

    /// Reads the persisted snapshot. `now` stamps notes that lack timestamps.
    pub fn load_snapshot(&self, now: DateTime<Utc>) -> Result<Snapshot> {
        let notes = match self.store.get(&self.key(DAILY_NOTES_KEY))? {
            Some(raw) if !raw.trim().is_empty() => decode_collection(&raw, now)?,
            _ => Collection::new(),
        };

        let selected_date = self
            .store
            .get(&self.key(SELECTED_DATE_KEY))?
            .filter(|s| !s.trim().is_empty())
            .and_then(|s| match parse_day(&s) {
                Ok(date) => Some(date),
                Err(e) => {
                    tracing::warn!("Ignoring stored selected date: {}", e);
                    None
                }
            });

        let selected_note_id = self
            .store
            .get(&self.key(SELECTED_NOTE_ID_KEY))?
            .filter(|id| !id.is_empty());

        tracing::debug!(
            days = notes.len(),
            "Loaded snapshot (selected {:?} / {:?})",
            selected_date,
            selected_note_id
        );

        Ok(Snapshot {
            notes,
            selected_date,
            selected_note_id,
        })
    }

    /// Writes the snapshot as three independent keys.
    pub fn save_snapshot(&self, snapshot: &Snapshot) -> Result<()> {
        let days: BTreeMap<String, &Vec<Note>> = snapshot
            .notes
            .iter()
            .map(|(date, notes)| (day_string(*date), notes))
            .collect();
        let encoded = serde_json::to_string(&days)?;

        self.store.set(&self.key(DAILY_NOTES_KEY), &encoded)?;
        match snapshot.selected_date {
            Some(date) => self
                .store
                .set(&self.key(SELECTED_DATE_KEY), &day_string(date))?,
            None => self.store.remove(&self.key(SELECTED_DATE_KEY))?,
        }
        self.store.set(
            &self.key(SELECTED_NOTE_ID_KEY),
            snapshot.selected_note_id.as_deref().unwrap_or(""),
        )?;

        tracing::debug!(days = days.len(), bytes = encoded.len(), "Saved snapshot");
        Ok(())
    }

    pub fn load_theme(&self) -> Result<Option<String>> {
        Ok(self
            .store
            .get(&self.key(SELECTED_THEME_KEY))?
            .map(|t| t.trim().to_string())
            .filter(|t| !t.is_empty()))
    }

    pub fn save_theme(&self, theme: &str) -> Result<()> {
        self.store.set(&self.key(SELECTED_THEME_KEY), theme)
    }

    /// Removes every key daynotes has ever written.
    pub fn clear(&self) -> Result<()> {
        for name in [
            DAILY_NOTES_KEY,
            SELECTED_DATE_KEY,
            SELECTED_NOTE_ID_KEY,
            SELECTED_THEME_KEY,
            LEGACY_CURRENT_NOTE_KEY,
        ] {
            self.store.remove(&self.key(name))?;
        }
        tracing::info!("Storage cleared");
        Ok(())
    }
}

/// Shape of a note as it may appear on disk: every field optional.
#[derive(Deserialize, Default)]
#[serde(default, rename_all = "camelCase")]
struct StoredNote {
    id: Option<Value>,
    title: Option<String>,
    content: Option<String>,
    created_at: Option<String>,
    updated_at: Option<String>,
}

fn decode_collection(raw: &str, now: DateTime<Utc>) -> Result<Collection> {
    let value: Value = serde_json::from_str(raw)?;
    let Value::Object(days) = value else {
        tracing::warn!("Stored notes are not an object; starting with an empty collection");
        return Ok(Collection::new());
    };

    let mut collection = Collection::new();
    for (key, notes) in days {
        let date = match parse_day(&key) {
            Ok(date) => date,
            Err(e) => {
                tracing::warn!("Skipping stored day: {}", e);
                continue;
            }
        };
        let Value::Array(items) = notes else {
            tracing::warn!("Skipping stored day {}: notes are not a list", key);
            continue;
        };

        let mut bucket: Vec<Note> = Vec::with_capacity(items.len());
        for item in items {
            let Some(note) = decode_note(item, now) else {
                tracing::warn!("Skipping unreadable note on {}", key);
                continue;
            };
            if bucket.iter().any(|n| n.id == note.id) {
                tracing::warn!("Dropping duplicate note {} on {}", note.id, key);
                continue;
            }
            bucket.push(note);
        }

        if !bucket.is_empty() {
            collection.insert(date, bucket);
        }
    }
    Ok(collection)
}

fn decode_note(value: Value, now: DateTime<Utc>) -> Option<Note> {
    if !value.is_object() {
        return None;
    }
    let stored: StoredNote = serde_json::from_value(value).ok()?;

    let id = match stored.id {
        Some(Value::String(s)) if !s.is_empty() => s,
        Some(Value::Number(n)) => n.to_string(),
        _ => generate_id(now),
    };
    let title = stored
        .title
        .filter(|t| !t.is_empty())
        .unwrap_or_else(|| PLACEHOLDER_TITLE.to_string());
    let updated_at = stored.updated_at.as_deref().and_then(parse_timestamp);
    let created_at = stored
        .created_at
        .as_deref()
        .and_then(parse_timestamp)
        .or(updated_at)
        .unwrap_or(now);

    Some(Note {
        id,
        title,
        content: stored.content.unwrap_or_default(),
        created_at,
        updated_at: updated_at.unwrap_or(created_at),
    })
}

fn parse_timestamp(s: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(s)
        .ok()
        .map(|dt| dt.with_timezone(&Utc))
}
