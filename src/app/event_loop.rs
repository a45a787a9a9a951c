use std::path::Path;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};

use crate::app::App;
use crate::preview::{HtmlFileSurface, PreviewPipeline, RenderOutcome};
use crate::session::Session;
use crate::watcher::FileWatcher;

/// Longest wait for file events while no render is pending.
const IDLE_WAIT: Duration = Duration::from_millis(250);

impl App {
    /// Render once, then keep re-rendering on file changes if watching.
    ///
    /// # Errors
    ///
    /// Returns an error if the document cannot be opened, the page cannot be
    /// written, or the file watcher cannot be started.
    pub fn run(&self) -> Result<()> {
        let mut session = self.open_session()?;
        let mut pipeline = PreviewPipeline::new(
            self.stylesheets(),
            self.theme.clone(),
            self.debounce_ms,
        );
        let mut surface = self
            .output
            .as_ref()
            .map_or_else(HtmlFileSurface::stdout, HtmlFileSurface::to_file);

        let outcome = pipeline
            .render_now(&session, &mut surface)
            .context("Failed to publish preview")?;
        log_outcome(&outcome, &pipeline);

        if !self.watch_enabled {
            return Ok(());
        }

        let path = session
            .path()
            .map(Path::to_path_buf)
            .context("--watch needs a file to watch")?;
        let watcher = FileWatcher::new(&path)
            .with_context(|| format!("Failed to watch {}", path.display()))?;
        tracing::info!(
            file = %path.display(),
            delay_ms = self.debounce_ms,
            "watching for changes"
        );

        self.watch_loop(&mut session, &mut pipeline, &mut surface, &watcher)
    }

    fn watch_loop(
        &self,
        session: &mut Session,
        pipeline: &mut PreviewPipeline,
        surface: &mut HtmlFileSurface,
        watcher: &FileWatcher,
    ) -> Result<()> {
        let start = Instant::now();
        let now_ms = || u64::try_from(start.elapsed().as_millis()).unwrap_or(u64::MAX);

        loop {
            if self
                .render_limit
                .is_some_and(|limit| pipeline.render_count() >= limit)
            {
                return Ok(());
            }

            let wait = pipeline
                .time_until_due(now_ms())
                .map_or(IDLE_WAIT, Duration::from_millis);

            if watcher.wait_changed(wait) {
                match session.reload() {
                    Ok(true) => pipeline.text_changed(now_ms()),
                    Ok(false) => tracing::trace!("change event without new text"),
                    // Saving by rename briefly removes the file.
                    Err(err) => tracing::warn!(%err, "reload failed, keeping current text"),
                }
            }

            if let Some(outcome) = pipeline
                .poll(now_ms(), &*session, surface)
                .context("Failed to publish preview")?
            {
                log_outcome(&outcome, pipeline);
            }
        }
    }
}

fn log_outcome(outcome: &RenderOutcome, pipeline: &PreviewPipeline) {
    match outcome {
        RenderOutcome::Rendered => {
            tracing::debug!(render = pipeline.render_count(), "preview up to date");
        }
        RenderOutcome::Recovered(err) => {
            tracing::debug!(render = pipeline.render_count(), %err, "preview kept from last good render");
        }
    }
}
