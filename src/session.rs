//! The open document: editor buffer plus the file it belongs to.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::editor::EditorBuffer;
use crate::preview::DocumentSource;
use crate::workspace::ensure_md_extension;

/// Name shown for a document that has never been saved.
pub const UNTITLED: &str = "Untitled";

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("document has no file yet; use save as")]
    Untitled,
    #[error("failed to read {}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to write {}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// A single editing session.
#[derive(Debug, Default)]
pub struct Session {
    buffer: EditorBuffer,
    path: Option<PathBuf>,
}

impl Session {
    /// Empty, untitled document.
    pub fn untitled() -> Self {
        Self::default()
    }

    /// Session for an existing file.
    ///
    /// # Errors
    /// Returns [`SessionError::Read`] if the file cannot be read.
    pub fn from_file(path: impl Into<PathBuf>) -> Result<Self, SessionError> {
        let mut session = Self::untitled();
        session.open(path)?;
        Ok(session)
    }

    pub const fn buffer(&self) -> &EditorBuffer {
        &self.buffer
    }

    pub const fn buffer_mut(&mut self) -> &mut EditorBuffer {
        &mut self.buffer
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    pub const fn is_modified(&self) -> bool {
        self.buffer.is_dirty()
    }

    /// Load `path` into the buffer. The buffer is untouched if the read
    /// fails.
    ///
    /// # Errors
    /// Returns [`SessionError::Read`] if the file cannot be read.
    pub fn open(&mut self, path: impl Into<PathBuf>) -> Result<(), SessionError> {
        let path = path.into();
        let text = read(&path)?;
        self.buffer.set_text(&text);
        tracing::debug!(path = %path.display(), bytes = text.len(), "opened document");
        self.path = Some(path);
        Ok(())
    }

    /// Re-read the current file from disk. Returns whether the text
    /// changed; always `false` for an untitled document.
    ///
    /// # Errors
    /// Returns [`SessionError::Read`] if the file cannot be read.
    pub fn reload(&mut self) -> Result<bool, SessionError> {
        let Some(path) = self.path.as_deref() else {
            return Ok(false);
        };
        let text = read(path)?;
        if text == self.buffer.text() {
            return Ok(false);
        }
        self.buffer.set_text(&text);
        Ok(true)
    }

    /// Write the buffer to its file and mark it clean.
    ///
    /// # Errors
    /// Returns [`SessionError::Untitled`] if the document has no file, or
    /// [`SessionError::Write`] if writing fails.
    pub fn save(&mut self) -> Result<&Path, SessionError> {
        let path = self.path.as_deref().ok_or(SessionError::Untitled)?;
        fs::write(path, self.buffer.text()).map_err(|source| SessionError::Write {
            path: path.to_path_buf(),
            source,
        })?;
        self.buffer.mark_clean();
        tracing::debug!(path = %path.display(), "saved document");
        Ok(path)
    }

    /// Save under a new name, appending `.md` when missing.
    ///
    /// # Errors
    /// Returns [`SessionError::Write`] if writing fails; the session then
    /// already points at the new path.
    pub fn save_as(&mut self, path: impl AsRef<Path>) -> Result<&Path, SessionError> {
        self.path = Some(ensure_md_extension(path.as_ref()));
        self.save()
    }

    /// Start over with an empty untitled document.
    pub fn new_document(&mut self) {
        self.buffer.set_text("");
        self.path = None;
    }

    /// Switch to a freshly created, empty file.
    pub fn adopt_new_file(&mut self, path: impl Into<PathBuf>) {
        self.buffer.set_text("");
        self.path = Some(path.into());
    }

    /// Reset to untitled if `deleted` is the open file. Returns whether the
    /// session was reset.
    pub fn forget_if_deleted(&mut self, deleted: &Path) -> bool {
        if self.path.as_deref() != Some(deleted) {
            return false;
        }
        self.new_document();
        true
    }

    /// File name, or "Untitled".
    pub fn display_name(&self) -> String {
        self.path
            .as_deref()
            .and_then(Path::file_name)
            .map_or_else(|| UNTITLED.to_string(), |n| n.to_string_lossy().into_owned())
    }

    /// Tab label: the display name with `*` while modified.
    pub fn tab_label(&self) -> String {
        let mut label = self.display_name();
        if self.is_modified() {
            label.push('*');
        }
        label
    }

    /// Window title: `livemark - <name>` with `*` while modified.
    pub fn title(&self) -> String {
        format!("livemark - {}", self.tab_label())
    }

    /// Directory a save dialog should start in: the open file's folder,
    /// else `fallback` (typically the last working folder).
    pub fn initial_dir<'a>(&'a self, fallback: Option<&'a Path>) -> Option<&'a Path> {
        self.path
            .as_deref()
            .and_then(Path::parent)
            .filter(|p| !p.as_os_str().is_empty())
            .or(fallback)
    }
}

impl DocumentSource for Session {
    fn current_text(&self) -> String {
        self.buffer.text()
    }

    fn current_path(&self) -> Option<&Path> {
        self.path.as_deref()
    }
}

fn read(path: &Path) -> Result<String, SessionError> {
    fs::read_to_string(path).map_err(|source| SessionError::Read {
        path: path.to_path_buf(),
        source,
    })
}
