//! # Storage Layer
//!
//! Everything daynotes persists goes through the [`KeyValueStore`] trait: a
//! flat, string-keyed, string-valued store with single-key writes and no
//! transactions. This mirrors the browser-style local storage the data format
//! was designed for, and keeps the engine ignorant of where bytes end up.
//!
//! ## Implementations
//!
//! - [`fs::FileStore`]: Production storage, one file per key in the data dir.
//!   Writes go to a temp file first and are renamed into place.
//! - [`memory::MemoryStore`]: In-memory storage for testing. Counts writes and
//!   can simulate read/write failures.
//!
//! ## Storage Format
//!
//! For `FileStore`:
//! ```text
//! <data dir>/
//! ├── dailyNotes          # JSON object: "YYYY-MM-DD" -> [note, ...]
//! ├── selectedDate        # plain "YYYY-MM-DD"
//! ├── selectedNoteId      # plain id, empty for none
//! ├── selectedTheme       # plain theme name
//! └── config.json         # configuration (not a store key)
//! ```
//!
//! There is no atomicity across keys: a crash between two writes can leave
//! `dailyNotes` and `selectedNoteId` disagreeing, and readers must cope.

use crate::error::Result;

pub mod fs;
pub mod memory;

/// Abstract interface for the persistent key-value store.
///
/// Methods take `&self`; implementations use interior mutability where they
/// need it, since daynotes is single-threaded.
pub trait KeyValueStore {
    /// Read a value. `Ok(None)` when the key has never been written.
    fn get(&self, key: &str) -> Result<Option<String>>;

    /// Write a value, replacing any previous one.
    fn set(&self, key: &str, value: &str) -> Result<()>;

    /// Remove a key. Removing a missing key is not an error.
    fn remove(&self, key: &str) -> Result<()>;
}

/// Whether `key` can be stored by every implementation. Keys become file
/// names in [`fs::FileStore`], so only `[A-Za-z0-9._-]` is allowed and a
/// leading `.` is rejected.
pub fn is_valid_key(key: &str) -> bool {
    !key.is_empty() && is_valid_key_fragment(key)
}

/// Like [`is_valid_key`], but an empty string passes. Used for key prefixes.
pub fn is_valid_key_fragment(fragment: &str) -> bool {
    !fragment.starts_with('.')
        && fragment
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.'))
}
