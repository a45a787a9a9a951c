//! Headless host: renders a document to HTML and, in watch mode, keeps the
//! page current as the file changes on disk.
//!
//! - [`App`]: configuration, built with the `with_*` methods
//! - [`App::run`]: initial render, then the watch loop when enabled

mod event_loop;

use std::path::PathBuf;

use anyhow::{Context, Result};

use crate::preview::DEFAULT_DEBOUNCE_MS;
use crate::session::Session;
use crate::theme::{Stylesheets, Theme, ThemeDir};

/// Host application for one document.
#[derive(Debug, Clone)]
pub struct App {
    file_path: Option<PathBuf>,
    output: Option<PathBuf>,
    watch_enabled: bool,
    theme: Theme,
    themes_dir: Option<PathBuf>,
    debounce_ms: u64,
    render_limit: Option<u64>,
}

impl App {
    /// Create an application for `file_path`, or an untitled document.
    pub fn new(file_path: Option<PathBuf>) -> Self {
        Self {
            file_path,
            output: None,
            watch_enabled: false,
            theme: Theme::default(),
            themes_dir: None,
            debounce_ms: DEFAULT_DEBOUNCE_MS,
            render_limit: None,
        }
    }

    /// Write the page to `path` instead of stdout.
    pub fn with_output(mut self, path: Option<PathBuf>) -> Self {
        self.output = path;
        self
    }

    /// Enable or disable file watching.
    pub const fn with_watch(mut self, enabled: bool) -> Self {
        self.watch_enabled = enabled;
        self
    }

    pub fn with_theme(mut self, theme: Theme) -> Self {
        self.theme = theme;
        self
    }

    /// Read stylesheets from a directory instead of the bundled set.
    pub fn with_themes_dir(mut self, dir: Option<PathBuf>) -> Self {
        self.themes_dir = dir;
        self
    }

    pub const fn with_debounce_ms(mut self, delay_ms: u64) -> Self {
        self.debounce_ms = delay_ms;
        self
    }

    /// Stop watching once this many pages have been published.
    #[doc(hidden)]
    pub const fn with_render_limit(mut self, limit: Option<u64>) -> Self {
        self.render_limit = limit;
        self
    }

    fn stylesheets(&self) -> Stylesheets {
        self.themes_dir
            .as_ref()
            .map_or_else(Stylesheets::bundled, |dir| Stylesheets::new(ThemeDir::new(dir)))
    }

    fn open_session(&self) -> Result<Session> {
        match &self.file_path {
            Some(path) => Session::from_file(path)
                .with_context(|| format!("Failed to open {}", path.display())),
            None => Ok(Session::untitled()),
        }
    }
}
