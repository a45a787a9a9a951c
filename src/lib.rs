// Only allow lints that are either transitive-dependency noise or
// genuinely opinionated style choices that don't indicate real issues.
#![allow(
    // Transitive dependency version mismatches we can't control
    clippy::multiple_crate_versions,
    // module_name_repetitions is pure style preference (e.g. preview::PreviewError)
    clippy::module_name_repetitions
)]

//! # Livemark
//!
//! A Markdown editor core with a live HTML preview.
//!
//! Livemark keeps a rendered preview in step with the document being edited:
//! - Rope-backed editor buffer with Markdown formatting commands
//! - Debounced render pipeline publishing to any preview surface
//! - Task-list items (`- [x] done`) rendered as checkbox glyphs
//! - Dark, light and blue preview themes
//! - Reciprocal scroll synchronization between editor and preview
//!
//! ## Architecture
//!
//! Everything runs on the host's thread. The host reports text changes to the
//! [`preview::PreviewPipeline`] and polls it with the current time; once the
//! quiet period passes the pipeline converts the text and publishes a page.
//!
//! ## Modules
//!
//! - [`document`]: Markdown to HTML conversion and the task-list rewriter
//! - [`preview`]: Debounced render pipeline and scroll sync
//! - [`theme`]: Preview themes and stylesheet lookup
//! - [`editor`]: Text buffer and formatting commands
//! - [`session`]: The open document and its file
//! - [`workspace`]: Markdown file tree of a working folder
//! - [`config`]: Persisted settings
//! - [`watcher`]: File watching
//! - [`app`]: Headless host

pub mod app;
pub mod config;
pub mod document;
pub mod editor;
pub mod preview;
pub mod session;
pub mod theme;
pub mod watcher;
pub mod workspace;

/// Re-export commonly used types
pub mod prelude {
    pub use crate::document::{Convert, MarkdownConverter, to_html};
    pub use crate::editor::{EditorBuffer, Format};
    pub use crate::preview::{DocumentSource, PreviewPipeline, PreviewSurface, RenderOutcome};
    pub use crate::session::Session;
    pub use crate::theme::{Stylesheets, Theme};
}
