//! Preview surface that writes the page to a file or stdout.

use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use percent_encoding::{AsciiSet, CONTROLS, utf8_percent_encode};

use super::PreviewSurface;

// Characters that would end or corrupt a path inside a `file://` URL.
// `/` and `:` stay literal so separators and drive letters survive.
const PATH: &AsciiSet = &CONTROLS
    .add(b' ')
    .add(b'"')
    .add(b'#')
    .add(b'%')
    .add(b'<')
    .add(b'>')
    .add(b'?')
    .add(b'`')
    .add(b'{')
    .add(b'}');

/// Writes each published page out in full, with a `<base href>` pointing
/// at the base path so relative links and images keep resolving.
#[derive(Debug, Default)]
pub struct HtmlFileSurface {
    output: Option<PathBuf>,
    base: Option<PathBuf>,
    writes: u64,
}

impl HtmlFileSurface {
    /// Surface writing to `path`, replacing the file on every publish.
    pub fn to_file(path: impl Into<PathBuf>) -> Self {
        Self {
            output: Some(path.into()),
            ..Self::default()
        }
    }

    /// Surface writing to stdout.
    pub fn stdout() -> Self {
        Self::default()
    }

    pub fn output(&self) -> Option<&Path> {
        self.output.as_deref()
    }

    pub const fn writes(&self) -> u64 {
        self.writes
    }

    fn write_page(&self, page: &str) -> io::Result<()> {
        match &self.output {
            Some(path) => {
                // Replace atomically: sibling temp file, then rename.
                let tmp = path.with_extension("html.tmp");
                fs::write(&tmp, page)?;
                fs::rename(&tmp, path)
            }
            None => {
                let mut out = io::stdout().lock();
                out.write_all(page.as_bytes())?;
                out.flush()
            }
        }
    }
}

impl PreviewSurface for HtmlFileSurface {
    fn set_base_path(&mut self, base: &Path) {
        self.base = Some(base.to_path_buf());
    }

    fn set_html(&mut self, html: &str) -> io::Result<()> {
        let page = match &self.base {
            Some(base) => insert_base_href(html, &base_href(base)),
            None => html.to_string(),
        };
        self.write_page(&page)?;
        self.writes += 1;
        tracing::debug!(output = ?self.output, bytes = page.len(), "page written");
        Ok(())
    }
}

/// `file://` URL for a directory, with the trailing slash a base URL needs.
pub fn base_href(dir: &Path) -> String {
    let mut path = dir.to_string_lossy().replace('\\', "/");
    if !path.starts_with('/') {
        path.insert(0, '/');
    }
    if !path.ends_with('/') {
        path.push('/');
    }
    format!("file://{}", utf8_percent_encode(&path, PATH))
}

/// Insert `<base href="...">` right after `<head>`; pages without a head
/// are returned unchanged.
pub fn insert_base_href(html: &str, href: &str) -> String {
    match html.find("<head>") {
        Some(pos) => {
            let at = pos + "<head>".len();
            format!("{}\n<base href=\"{href}\">{}", &html[..at], &html[at..])
        }
        None => html.to_string(),
    }
}
