//! Markdown to HTML conversion.
//!
//! This module handles:
//! - Parsing markdown with comrak using the editor's fixed extension set
//! - Running the ordered list of AST transforms (task lists)
//! - Wrapping the HTML fragment into a styled preview page

mod page;
mod tasklist;

use std::panic::{self, AssertUnwindSafe};

use comrak::nodes::AstNode;
use comrak::{Arena, Options, format_html, parse_document};
use thiserror::Error;

pub use page::{plain_text_page, wrap_page};
pub use tasklist::{
    CHECKED_GLYPH, TASK_ITEM_CLASS, TaskListRewriter, TaskMarker, UNCHECKED_GLYPH, item_html,
};
pub(crate) use tasklist::escape_html;

/// Errors raised while converting markdown to HTML.
#[derive(Debug, Error)]
pub enum RenderError {
    #[error("failed to format HTML: {0}")]
    Format(#[from] std::io::Error),

    #[error("formatter produced invalid UTF-8: {0}")]
    Utf8(#[from] std::string::FromUtf8Error),

    #[error("markdown converter panicked: {0}")]
    Panicked(String),
}

/// A post-parse step that rewrites the document tree in place.
pub trait AstTransform {
    /// Short name used in logs.
    fn name(&self) -> &'static str;

    fn apply<'a>(&self, root: &'a AstNode<'a>);
}

/// Anything that turns markdown source into an HTML fragment.
pub trait Convert {
    /// # Errors
    /// Returns a [`RenderError`] when the source cannot be converted.
    fn convert(&self, source: &str) -> Result<String, RenderError>;
}

/// Markdown converter with the fixed extension set and transform list.
pub struct MarkdownConverter {
    transforms: Vec<Box<dyn AstTransform>>,
}

impl MarkdownConverter {
    /// Converter with the editor's standard transforms (task lists).
    pub fn new() -> Self {
        Self::with_transforms(vec![Box::new(TaskListRewriter)])
    }

    /// Converter with an explicit, ordered transform list.
    pub fn with_transforms(transforms: Vec<Box<dyn AstTransform>>) -> Self {
        Self { transforms }
    }

    /// Names of the transforms in the order they run.
    pub fn transform_names(&self) -> Vec<&'static str> {
        self.transforms.iter().map(|t| t.name()).collect()
    }

    fn convert_inner(&self, source: &str) -> Result<String, RenderError> {
        let arena = Arena::new();
        let mut options = Options::default();
        configure(&mut options);
        let root = parse_document(&arena, source, &options);

        for transform in &self.transforms {
            transform.apply(root);
        }

        let mut html = Vec::new();
        format_html(root, &options, &mut html)?;
        Ok(String::from_utf8(html)?)
    }
}

impl Default for MarkdownConverter {
    fn default() -> Self {
        Self::new()
    }
}

impl Convert for MarkdownConverter {
    fn convert(&self, source: &str) -> Result<String, RenderError> {
        // Parser panics surface as RenderError::Panicked.
        panic::catch_unwind(AssertUnwindSafe(|| self.convert_inner(source)))
            .unwrap_or_else(|payload| Err(RenderError::Panicked(panic_message(&*payload))))
    }
}

impl std::fmt::Debug for MarkdownConverter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MarkdownConverter")
            .field("transforms", &self.transform_names())
            .finish()
    }
}

/// Convert markdown to an HTML fragment with the standard converter.
///
/// # Example
///
/// ```
/// let html = livemark::document::to_html("- [x] Done").unwrap();
/// assert!(html.contains("☑ Done"));
/// ```
///
/// # Errors
/// Returns a [`RenderError`] when conversion fails.
pub fn to_html(source: &str) -> Result<String, RenderError> {
    MarkdownConverter::new().convert(source)
}

fn configure(options: &mut Options) {
    // "extra": tables, footnotes, definition lists (fenced code is core)
    options.extension.table = true;
    options.extension.footnotes = true;
    options.extension.description_lists = true;

    // ~~del~~, ~sub~ and ^sup^
    options.extension.strikethrough = true;
    options.extension.subscript = true;
    options.extension.superscript = true;

    // Task lists are handled by TaskListRewriter.
    options.extension.tasklist = false;

    // Newlines become <br />
    options.render.hardbreaks = true;
    // Raw HTML passes through; rewritten task items rely on it.
    options.render.unsafe_ = true;
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    payload
        .downcast_ref::<&str>()
        .map(|s| (*s).to_string())
        .or_else(|| payload.downcast_ref::<String>().cloned())
        .unwrap_or_else(|| "unknown panic".to_string())
}
