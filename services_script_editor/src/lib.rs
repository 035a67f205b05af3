//! # Script Editor Service
//!
//! Hosts a screenplay editing session on top of `script_core`.
//!
//! ## Philosophy
//!
//! - **Explicit sessions**: Every open script is a `ScriptSession` value; no globals
//! - **Injected time**: Autosave debouncing takes `Instant`s from the caller
//! - **Injected storage**: Autosave goes through the `ScriptStore` trait
//! - **No partial loads**: A rejected file leaves the open script untouched
//!
//! ## Non-Goals
//!
//! This is NOT:
//! - A renderer; hosts draw pages from `script_core` layout data
//! - A PDF or DOC writer; `export_lines`/`plan_print` feed one
//! - A collaborative or multi-document editor
//!
//! ## Design
//!
//! - Scripts are stored as `.szaarc` JSON containers
//! - Edits restart the autosave window; a due autosave writes the container
//!   to the store under the configured key
//! - Title and dirty-state changes are queued as `SessionEvent`s for the host

pub mod autosave;
pub mod config;
pub mod container;
pub mod session;
pub mod store;

pub use autosave::{AutosaveDebouncer, DEFAULT_AUTOSAVE_DELAY};
pub use config::{ConfigError, EditorConfig, DEFAULT_STORAGE_KEY};
pub use container::{ContainerError, ContainerLine, ScriptContainer, FORMAT_SENTINEL};
pub use session::{ScriptSession, SessionError, SessionEvent, SessionResult};
pub use store::{FileStore, MemoryStore, ScriptStore, StoreError};
