//! # Daynotes Architecture
//!
//! Daynotes is a **UI-agnostic daily notes library**. Notes are filed under the
//! calendar day they belong to; today always has at least one. The bundled
//! CLI is one client of the library, not the library itself.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │  CLI Layer (cli/, wired by main.rs)                         │
//! │  - Parses arguments, formats output, handles terminal I/O   │
//! │  - The ONLY place that knows about stdout/stderr/exit codes │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │  Session (session.rs)                                       │
//! │  - Application state, constructed once and passed down     │
//! │  - Notebook + Autosave + Auth + Theme                       │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │  Engine (notebook.rs, autosave.rs, scheduler.rs)            │
//! │  - Owns the date-partitioned collection and the selection   │
//! │  - Debounced persistence and autosave, driven by tick()     │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │  Storage Layer (persistence.rs, store/)                     │
//! │  - JSON snapshot over an abstract KeyValueStore             │
//! │  - FileStore (production), MemoryStore (testing)            │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Time
//!
//! Nothing sleeps and nothing spawns. Every component reads time from a
//! [`clock::Clock`] and exposes `tick()` plus `next_deadline()`; the host
//! decides when to call them. Tests use [`clock::ManualClock`] and step
//! through debounce windows exactly.
//!
//! ## Errors
//!
//! Storage failures inside the engine are logged through `tracing` and
//! contained: in-memory state stays authoritative and the next mutation
//! retries the write. Errors that are the caller's to handle (bad dates,
//! unknown themes, title edits under the first-line policy) come back as
//! [`error::NotesError`].
//!
//! ## Module Overview
//!
//! - [`notebook`]: The note collection engine
//! - [`autosave`]: Edit debounce, save status, remote sync
//! - [`scheduler`]: Keyed cancel-and-replace timers
//! - [`session`]: Application state wiring the pieces together
//! - [`persistence`]: Snapshot encoding and legacy migration
//! - [`store`]: Key-value storage abstraction and implementations
//! - [`model`]: Core data types (`Note`, `Selection`, `Snapshot`)
//! - [`config`]: Configuration management
//! - [`dates`], [`ids`], [`clock`]: Small utilities
//! - [`auth`], [`theme`], [`snippets`]: Supporting features
//! - [`error`]: Error types
//! - `cli`: Argument parsing and printing for the binary (not part of the lib API)

pub mod auth;
pub mod autosave;
pub mod clock;
pub mod config;
pub mod dates;
pub mod error;
pub mod ids;
pub mod model;
pub mod notebook;
pub mod persistence;
pub mod scheduler;
pub mod session;
pub mod snippets;
pub mod store;
pub mod theme;
