#![no_std]

//! # Script Core
//!
//! Screenplay classification, layout and editing logic shared by every host.
//!
//! ## Philosophy
//!
//! - **No_std compatible**: Uses alloc but not std
//! - **Deterministic**: Same input trace => same document, cursor and pages
//! - **Analytic layout**: Page breaks are computed from wrap estimates, never
//!   measured from rendered geometry
//! - **Mechanism over policy**: Core decides what a line is and where it falls,
//!   hosts decide how it is drawn and stored
//!
//! ## Design
//!
//! The core provides:
//! - `classify`: free text to screenplay element type
//! - `wrap`: monospace word-wrap estimation
//! - `layout`: page partitioning under a fixed page budget
//! - `export`: styled, positioned rows for a PDF/DOC writer
//! - `ScriptEditorCore`: line sequence, cursor, pages and navigation
//! - `EditorSnapshot`: deterministic state for parity testing

extern crate alloc;

pub mod buffer;
pub mod classify;
pub mod editor;
pub mod element;
pub mod export;
pub mod key;
pub mod layout;
pub mod navigation;
pub mod snapshot;
pub mod wrap;

pub use buffer::{Position, ScriptBuffer};
pub use classify::{classify, classify_live};
pub use editor::{CoreOutcome, ScriptEditorCore};
pub use element::{ElementType, ScriptLine};
pub use export::{export_lines, plan_print, ExportLine, FontStyle, PrintPage, PrintRow};
pub use key::Key;
pub use layout::{paginate, LayoutMetrics, Page, Pagination};
pub use snapshot::EditorSnapshot;
pub use wrap::{estimate_wrapped_line_count, wrap_text};
