//! Preview themes and their stylesheets.
//!
//! A theme selects one stylesheet through a fixed table. Stylesheets come
//! from a [`StyleSource`]; when the mapped sheet is missing the default
//! sheet is used, and when that is missing too the preview renders without
//! styling.

use std::collections::HashMap;
use std::convert::Infallible;
use std::fmt;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Stylesheet used when a theme has no mapping or its sheet is missing.
pub const DEFAULT_STYLESHEET: &str = "markdown_style.css";

/// Preview theme selection.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Theme {
    #[default]
    Dark,
    Light,
    Blue,
    /// A key with no entry in the stylesheet table.
    Other(String),
}

impl Theme {
    /// Themes in cycling order.
    pub const CYCLE: [Self; 3] = [Self::Dark, Self::Light, Self::Blue];

    /// Persisted key of the theme.
    pub fn key(&self) -> &str {
        match self {
            Self::Dark => "dark",
            Self::Light => "light",
            Self::Blue => "blue",
            Self::Other(key) => key,
        }
    }

    /// Stylesheet mapped to this theme, if any.
    pub const fn stylesheet(&self) -> Option<&'static str> {
        match self {
            Self::Dark => Some("markdown_style_dark.css"),
            Self::Light => Some("markdown_style_light.css"),
            Self::Blue => Some("markdown_style_blue.css"),
            Self::Other(_) => None,
        }
    }

    /// The theme after this one; unknown themes restart the cycle.
    pub fn next(&self) -> Self {
        match self {
            Self::Dark => Self::Light,
            Self::Light => Self::Blue,
            Self::Blue | Self::Other(_) => Self::Dark,
        }
    }
}

impl From<String> for Theme {
    fn from(key: String) -> Self {
        match key.to_ascii_lowercase().as_str() {
            // Older settings files stored the theme as a Qt stylesheet name.
            "dark" | "dark_theme.qss" => Self::Dark,
            "light" | "light_theme.qss" => Self::Light,
            "blue" | "blue_theme.qss" => Self::Blue,
            _ => Self::Other(key),
        }
    }
}

impl From<Theme> for String {
    fn from(theme: Theme) -> Self {
        theme.key().to_string()
    }
}

impl FromStr for Theme {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self::from(s.to_string()))
    }
}

impl fmt::Display for Theme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

/// Where stylesheet text comes from.
pub trait StyleSource {
    /// Contents of the named stylesheet, or `None` if it is missing.
    fn read(&self, name: &str) -> Option<String>;
}

/// Stylesheets compiled into the binary.
#[derive(Debug, Default, Clone, Copy)]
pub struct BundledStyles;

impl StyleSource for BundledStyles {
    fn read(&self, name: &str) -> Option<String> {
        let css = match name {
            "markdown_style.css" => include_str!("../assets/themes/markdown_style.css"),
            "markdown_style_dark.css" => include_str!("../assets/themes/markdown_style_dark.css"),
            "markdown_style_light.css" => {
                include_str!("../assets/themes/markdown_style_light.css")
            }
            "markdown_style_blue.css" => include_str!("../assets/themes/markdown_style_blue.css"),
            _ => return None,
        };
        Some(css.to_string())
    }
}

/// Stylesheets read from a directory on disk.
#[derive(Debug, Clone)]
pub struct ThemeDir {
    root: PathBuf,
}

impl ThemeDir {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }
}

impl StyleSource for ThemeDir {
    fn read(&self, name: &str) -> Option<String> {
        let path = self.root.join(name);
        match fs::read_to_string(&path) {
            Ok(css) => Some(css),
            Err(err) if err.kind() == ErrorKind::NotFound => None,
            Err(err) => {
                tracing::warn!(path = %path.display(), %err, "unreadable stylesheet, treating as missing");
                None
            }
        }
    }
}

impl StyleSource for HashMap<String, String> {
    fn read(&self, name: &str) -> Option<String> {
        self.get(name).cloned()
    }
}

/// Resolves the CSS for a theme through the fallback chain.
pub struct Stylesheets {
    source: Box<dyn StyleSource>,
}

impl Stylesheets {
    pub fn new(source: impl StyleSource + 'static) -> Self {
        Self {
            source: Box::new(source),
        }
    }

    /// Bundled stylesheets.
    pub fn bundled() -> Self {
        Self::new(BundledStyles)
    }

    /// CSS for `theme`: mapped sheet, else default sheet, else empty.
    pub fn css_for(&self, theme: &Theme) -> String {
        theme
            .stylesheet()
            .and_then(|name| self.source.read(name))
            .or_else(|| {
                tracing::debug!(theme = %theme, "using default stylesheet");
                self.source.read(DEFAULT_STYLESHEET)
            })
            .unwrap_or_default()
    }
}

impl Default for Stylesheets {
    fn default() -> Self {
        Self::bundled()
    }
}

impl fmt::Debug for Stylesheets {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Stylesheets").finish_non_exhaustive()
    }
}
