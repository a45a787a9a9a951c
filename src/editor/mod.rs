//! Editor buffer for the document being written.
//!
//! Provides a rope-backed text buffer with cursor and selection
//! management, plus the Markdown formatting commands.

mod buffer;
mod format;

pub use buffer::{Cursor, Direction, EditorBuffer};
pub use format::Format;
