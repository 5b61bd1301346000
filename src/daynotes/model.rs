use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Title given to notes that have nothing better to show.
pub const PLACEHOLDER_TITLE: &str = "Untitled Note";

const MAX_TITLE_CHARS: usize = 60;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Note {
    pub id: String,
    pub title: String,
    pub content: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Note {
    pub fn new(id: String, now: DateTime<Utc>) -> Self {
        Self {
            id,
            title: PLACEHOLDER_TITLE.to_string(),
            content: String::new(),
            created_at: now,
            updated_at: now,
        }
    }
}

/// Notes partitioned by calendar day. Each bucket is newest-first and never empty.
pub type Collection = BTreeMap<NaiveDate, Vec<Note>>;

/// The (day, note) pair currently being viewed or edited.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Selection {
    pub date: NaiveDate,
    pub note_id: Option<String>,
}

impl Selection {
    pub fn new(date: NaiveDate) -> Self {
        Self {
            date,
            note_id: None,
        }
    }

    pub fn is(&self, date: NaiveDate, note_id: &str) -> bool {
        self.date == date && self.note_id.as_deref() == Some(note_id)
    }
}

/// What gets written to and read back from the key-value store.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Snapshot {
    pub notes: Collection,
    pub selected_date: Option<NaiveDate>,
    pub selected_note_id: Option<String>,
}

/// How a note's title is maintained. Only one policy is active per notebook.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TitlePolicy {
    /// Titles are set explicitly; content edits never touch them.
    #[default]
    Manual,
    /// Titles follow the first line of content on every edit.
    FirstLine,
}

impl std::fmt::Display for TitlePolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TitlePolicy::Manual => write!(f, "manual"),
            TitlePolicy::FirstLine => write!(f, "first-line"),
        }
    }
}

impl std::str::FromStr for TitlePolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "manual" => Ok(TitlePolicy::Manual),
            "first-line" => Ok(TitlePolicy::FirstLine),
            other => Err(format!(
                "unknown title policy '{}' (expected manual or first-line)",
                other
            )),
        }
    }
}

/// A user-supplied title, or the placeholder when it is blank.
pub fn normalize_title(title: &str) -> String {
    let trimmed = title.trim();
    if trimmed.is_empty() {
        PLACEHOLDER_TITLE.to_string()
    } else {
        trimmed.to_string()
    }
}

/// Derives a title from the first non-blank line of `content`.
///
/// Leading Markdown heading markers are dropped and long lines are cut to
/// 60 characters, the last one being an ellipsis.
pub fn derive_title(content: &str) -> String {
    let Some(line) = content.lines().map(str::trim).find(|l| !l.is_empty()) else {
        return PLACEHOLDER_TITLE.to_string();
    };

    let clean = line.trim_start_matches('#').trim();
    if clean.is_empty() {
        return PLACEHOLDER_TITLE.to_string();
    }

    if clean.chars().count() > MAX_TITLE_CHARS {
        let truncated: String = clean.chars().take(MAX_TITLE_CHARS - 1).collect();
        format!("{}…", truncated)
    } else {
        clean.to_string()
    }
}
