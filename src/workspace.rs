//! Markdown file tree of a working folder.

use std::fmt;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// A directory or Markdown file in the workspace tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TreeEntry {
    pub name: String,
    pub path: PathBuf,
    pub is_dir: bool,
    /// Sorted by name; always empty for files.
    pub children: Vec<Self>,
}

impl TreeEntry {
    /// Number of Markdown files below this entry.
    pub fn file_count(&self) -> usize {
        if self.is_dir {
            self.children.iter().map(Self::file_count).sum()
        } else {
            1
        }
    }

    /// Find the entry for `path`.
    pub fn find(&self, path: &Path) -> Option<&Self> {
        if self.path == path {
            return Some(self);
        }
        self.children.iter().find_map(|child| child.find(path))
    }

    fn write_indented(&self, f: &mut fmt::Formatter<'_>, depth: usize) -> fmt::Result {
        let slash = if self.is_dir { "/" } else { "" };
        writeln!(f, "{:indent$}{}{slash}", "", self.name, indent = depth * 2)?;
        for child in &self.children {
            child.write_indented(f, depth + 1)?;
        }
        Ok(())
    }
}

impl fmt::Display for TreeEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.write_indented(f, 0)
    }
}

/// Scan `root` recursively, keeping directories and `.md` files.
///
/// Subdirectories that cannot be read appear without children.
///
/// # Errors
/// Returns an I/O error if `root` itself cannot be read.
pub fn scan(root: &Path) -> io::Result<TreeEntry> {
    let children = scan_dir(root)?;
    let name = root.file_name().map_or_else(
        || root.to_string_lossy().into_owned(),
        |n| n.to_string_lossy().into_owned(),
    );
    tracing::debug!(root = %root.display(), entries = children.len(), "scanned workspace");
    Ok(TreeEntry {
        name,
        path: root.to_path_buf(),
        is_dir: true,
        children,
    })
}

fn scan_dir(dir: &Path) -> io::Result<Vec<TreeEntry>> {
    let mut entries = Vec::new();
    for entry in fs::read_dir(dir)? {
        let entry = entry?;
        let name = entry.file_name().to_string_lossy().into_owned();
        let path = entry.path();
        if entry.file_type()?.is_dir() {
            let children = scan_dir(&path).unwrap_or_else(|err| {
                tracing::warn!(path = %path.display(), %err, "skipping unreadable directory");
                Vec::new()
            });
            entries.push(TreeEntry {
                name,
                path,
                is_dir: true,
                children,
            });
        } else if is_markdown(&path) {
            entries.push(TreeEntry {
                name,
                path,
                is_dir: false,
                children: Vec::new(),
            });
        }
    }
    entries.sort_by(|a, b| a.name.cmp(&b.name));
    Ok(entries)
}

/// Whether the file name of `path` ends in `.md`, ignoring case.
///
/// A bare `.md` counts, although `Path` sees no extension there.
pub fn is_markdown(path: &Path) -> bool {
    path.file_name()
        .is_some_and(|name| name.to_string_lossy().to_ascii_lowercase().ends_with(".md"))
}

/// Append `.md` unless the name already ends with it (any case).
pub fn ensure_md_extension(path: &Path) -> PathBuf {
    if is_markdown(path) {
        return path.to_path_buf();
    }
    let mut name = path.as_os_str().to_os_string();
    name.push(".md");
    PathBuf::from(name)
}

/// Directory for a new file: the selected directory, the selected file's
/// directory, or the workspace root when nothing is selected. `None` when
/// there is no working folder.
pub fn new_file_dir(selected: Option<&Path>, root: Option<&Path>) -> Option<PathBuf> {
    match selected {
        Some(path) if path.is_dir() => Some(path.to_path_buf()),
        Some(path) => path.parent().map(Path::to_path_buf),
        None => root.map(Path::to_path_buf),
    }
}

/// Create (or truncate) an empty Markdown file, appending `.md` when
/// missing. Returns the path written.
///
/// # Errors
/// Returns an I/O error if the file cannot be written.
pub fn create_file(path: &Path) -> io::Result<PathBuf> {
    let path = ensure_md_extension(path);
    fs::write(&path, "")?;
    tracing::debug!(path = %path.display(), "created file");
    Ok(path)
}

/// Delete a file. Directories are refused.
///
/// # Errors
/// Returns `InvalidInput` for anything that is not a regular file, or the
/// underlying I/O error.
pub fn delete_file(path: &Path) -> io::Result<()> {
    if !path.is_file() {
        return Err(io::Error::new(
            io::ErrorKind::InvalidInput,
            format!("{} is not a file", path.display()),
        ));
    }
    fs::remove_file(path)?;
    tracing::debug!(path = %path.display(), "deleted file");
    Ok(())
}
