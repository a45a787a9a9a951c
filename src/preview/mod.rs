//! Live preview pipeline.
//!
//! Text changes arm a [`RenderDebouncer`]; once the quiet period passes the
//! pipeline converts the current buffer, wraps it in a themed page and
//! publishes it to a [`PreviewSurface`]. Everything runs on the caller's
//! thread; the host drives it by polling with the current time.

mod debounce;
mod scroll;
mod surface;

use std::path::{Path, PathBuf};
use std::time::Instant;

use thiserror::Error;

use crate::document::{Convert, MarkdownConverter, RenderError, plain_text_page, wrap_page};
use crate::theme::{Stylesheets, Theme};

pub use debounce::{DEFAULT_DEBOUNCE_MS, RenderDebouncer};
pub use scroll::{ScrollBar, ScrollSync, scaled_position};
pub use surface::{HtmlFileSurface, base_href, insert_base_href};

/// Errors the host has to handle when publishing a preview.
#[derive(Debug, Error)]
pub enum PreviewError {
    #[error("failed to publish preview: {0}")]
    Publish(#[from] std::io::Error),
}

/// Something that displays the rendered page.
pub trait PreviewSurface {
    /// Directory against which relative links and images resolve.
    fn set_base_path(&mut self, base: &Path);

    /// Replace the displayed page.
    ///
    /// # Errors
    /// Returns an I/O error if the page cannot be shown or written.
    fn set_html(&mut self, html: &str) -> std::io::Result<()>;
}

/// The editor side of the pipeline.
pub trait DocumentSource {
    /// Full current text.
    fn current_text(&self) -> String;

    /// Path of the open file, if the document has one.
    fn current_path(&self) -> Option<&Path>;
}

/// What happened during a render.
#[derive(Debug)]
pub enum RenderOutcome {
    /// The page reflects the current text.
    Rendered,
    /// Conversion failed; the previous page (or a plain-text page) was
    /// published instead.
    Recovered(RenderError),
}

impl RenderOutcome {
    pub const fn is_recovered(&self) -> bool {
        matches!(self, Self::Recovered(_))
    }
}

/// Debounced markdown to HTML preview.
#[derive(Debug)]
pub struct PreviewPipeline<C = MarkdownConverter> {
    converter: C,
    stylesheets: Stylesheets,
    theme: Theme,
    debouncer: RenderDebouncer,
    last_good_fragment: Option<String>,
    render_count: u64,
}

impl PreviewPipeline<MarkdownConverter> {
    /// Pipeline with the standard converter.
    pub fn new(stylesheets: Stylesheets, theme: Theme, debounce_ms: u64) -> Self {
        Self::with_converter(MarkdownConverter::new(), stylesheets, theme, debounce_ms)
    }
}

impl<C: Convert> PreviewPipeline<C> {
    pub fn with_converter(
        converter: C,
        stylesheets: Stylesheets,
        theme: Theme,
        debounce_ms: u64,
    ) -> Self {
        Self {
            converter,
            stylesheets,
            theme,
            debouncer: RenderDebouncer::new(debounce_ms),
            last_good_fragment: None,
            render_count: 0,
        }
    }

    pub const fn theme(&self) -> &Theme {
        &self.theme
    }

    /// Change the theme. Takes effect on the next render.
    pub fn set_theme(&mut self, theme: Theme) {
        self.theme = theme;
    }

    /// Advance to the next theme in the cycle and return it.
    pub fn cycle_theme(&mut self) -> &Theme {
        self.theme = self.theme.next();
        &self.theme
    }

    /// Number of renders performed so far.
    pub const fn render_count(&self) -> u64 {
        self.render_count
    }

    pub const fn is_pending(&self) -> bool {
        self.debouncer.is_pending()
    }

    /// Record a text change, restarting the quiet period.
    pub fn text_changed(&mut self, now_ms: u64) {
        self.debouncer.queue(now_ms);
        tracing::trace!(now_ms, "preview render queued");
    }

    /// Milliseconds until the pending render is due, if one is pending.
    pub fn time_until_due(&self, now_ms: u64) -> Option<u64> {
        self.debouncer
            .deadline()
            .map(|deadline| deadline.saturating_sub(now_ms))
    }

    /// Render if the quiet period has elapsed. Reads the document at fire
    /// time, so edits made while pending are included.
    ///
    /// # Errors
    /// Returns [`PreviewError`] if the surface rejects the page.
    pub fn poll(
        &mut self,
        now_ms: u64,
        document: &dyn DocumentSource,
        surface: &mut dyn PreviewSurface,
    ) -> Result<Option<RenderOutcome>, PreviewError> {
        if !self.debouncer.take_ready(now_ms) {
            return Ok(None);
        }
        self.render_now(document, surface).map(Some)
    }

    /// Render and publish immediately, bypassing the debouncer.
    ///
    /// # Errors
    /// Returns [`PreviewError`] if the surface rejects the page.
    pub fn render_now(
        &mut self,
        document: &dyn DocumentSource,
        surface: &mut dyn PreviewSurface,
    ) -> Result<RenderOutcome, PreviewError> {
        let start = Instant::now();
        let text = document.current_text();
        let css = self.stylesheets.css_for(&self.theme);

        let (page, outcome) = match self.converter.convert(&text) {
            Ok(fragment) => {
                let page = wrap_page(&fragment, &css);
                self.last_good_fragment = Some(fragment);
                (page, RenderOutcome::Rendered)
            }
            Err(err) => {
                tracing::warn!(%err, "markdown conversion failed, keeping previous preview");
                let page = self.last_good_fragment.as_ref().map_or_else(
                    || plain_text_page(&text, &css),
                    |fragment| wrap_page(fragment, &css),
                );
                (page, RenderOutcome::Recovered(err))
            }
        };

        let base = base_path(document.current_path());
        surface.set_base_path(&base);
        surface.set_html(&page)?;
        self.render_count += 1;

        tracing::debug!(
            render = self.render_count,
            theme = %self.theme,
            bytes = page.len(),
            elapsed_ms = start.elapsed().as_secs_f64() * 1000.0,
            "preview published"
        );
        Ok(outcome)
    }
}

/// Directory for resolving relative references: the open file's directory,
/// else the working directory.
pub fn base_path(current_file: Option<&Path>) -> PathBuf {
    if let Some(dir) = current_file.and_then(Path::parent) {
        if !dir.as_os_str().is_empty() {
            return dir.to_path_buf();
        }
    }
    std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."))
}
