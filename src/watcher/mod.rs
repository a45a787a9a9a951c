//! File watching for the headless host.
//!
//! Uses notify crate for cross-platform file system events. The watcher only
//! reports that the file changed; quiet-period handling belongs to the
//! preview pipeline.
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::sync::mpsc::{self, Receiver, RecvTimeoutError};
use std::time::Duration;

use notify::event::AccessKind;
use notify::{Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher};

/// Watches a single file and reports raw change notifications.
pub struct FileWatcher {
    _watcher: RecommendedWatcher,
    rx: Receiver<notify::Result<Event>>,
    watch_root: PathBuf,
    target_path: PathBuf,
    target_name: Option<OsString>,
}

impl FileWatcher {
    /// Create a watcher for `path`.
    ///
    /// # Errors
    /// Returns an error if the file watcher cannot be created or the path cannot be watched.
    pub fn new(path: impl AsRef<Path>) -> notify::Result<Self> {
        // Canonicalize so event paths from the OS (which are always absolute
        // and canonical) match our stored paths.
        let target_path = path
            .as_ref()
            .canonicalize()
            .unwrap_or_else(|_| path.as_ref().to_path_buf());
        let target_name = target_path.file_name().map(std::ffi::OsStr::to_os_string);
        let watch_root = watch_root_for(&target_path);

        let (tx, rx) = mpsc::channel();
        let mut watcher = notify::recommended_watcher(move |res| {
            let _ = tx.send(res);
        })?;
        // Watch the directory: editors that save by rename replace the inode.
        watcher.watch(&watch_root, RecursiveMode::NonRecursive)?;
        tracing::debug!(
            target = %target_path.display(),
            root = %watch_root.display(),
            "watching file"
        );

        Ok(Self {
            _watcher: watcher,
            rx,
            watch_root,
            target_path,
            target_name,
        })
    }

    /// The canonical path of the file being watched.
    pub fn target_path(&self) -> &Path {
        &self.target_path
    }

    /// Drain queued events; true if any concerned the file.
    pub fn take_changed(&self) -> bool {
        let mut changed = false;
        while let Ok(event) = self.rx.try_recv() {
            changed |= self.note(event);
        }
        changed
    }

    /// Block up to `timeout` for a relevant change, then drain the rest of
    /// the queue. Returns false on timeout or if the watcher shut down.
    pub fn wait_changed(&self, timeout: Duration) -> bool {
        match self.rx.recv_timeout(timeout) {
            Ok(event) => {
                let first = self.note(event);
                self.take_changed() || first
            }
            Err(RecvTimeoutError::Timeout) => false,
            Err(RecvTimeoutError::Disconnected) => {
                tracing::warn!("file watcher disconnected");
                false
            }
        }
    }

    fn note(&self, event: notify::Result<Event>) -> bool {
        match event {
            Ok(ev) if self.is_relevant(&ev) => {
                tracing::debug!(kind = ?ev.kind, "watched file changed");
                true
            }
            Ok(ev) => {
                tracing::trace!(kind = ?ev.kind, paths = ?ev.paths, "ignoring event");
                false
            }
            Err(err) => {
                tracing::warn!(%err, "file watcher error");
                false
            }
        }
    }

    fn is_relevant(&self, event: &Event) -> bool {
        if matches!(
            event.kind,
            EventKind::Access(AccessKind::Open(_) | AccessKind::Read)
        ) {
            return false;
        }
        event.paths.iter().any(|path| {
            path == &self.watch_root
                || path == &self.target_path
                || self
                    .target_name
                    .as_ref()
                    .is_some_and(|name| path.file_name().is_some_and(|f| f == name))
        })
    }
}

impl std::fmt::Debug for FileWatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FileWatcher")
            .field("target_path", &self.target_path)
            .field("watch_root", &self.watch_root)
            .finish_non_exhaustive()
    }
}

fn watch_root_for(path: &Path) -> PathBuf {
    path.parent()
        .filter(|p| !p.as_os_str().is_empty())
        .map_or_else(|| PathBuf::from("."), Path::to_path_buf)
}
