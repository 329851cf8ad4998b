//! Incremental member search.
//!
//! # Responsibility
//! - Rank members by name/title match against a typed query.
//! - Highlight matches safely for HTML display.
//! - Debounce keystrokes and drive keyboard navigation of results.
//!
//! # Invariants
//! - A blank query is "suppressed", never "no matches".
//! - Queries match literally; regex metacharacters carry no meaning.

pub mod cursor;
pub mod debounce;
pub mod matcher;

pub use cursor::{CursorAction, ResultCursor, SearchKey};
pub use debounce::{DebounceInput, Debouncer};
pub use matcher::{highlight, highlight_spans, search, HighlightSpan, SearchOutcome};
