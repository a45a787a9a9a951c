//! Markdown formatting commands.

use super::{Direction, EditorBuffer};

/// Formatting applied at the cursor or around the selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    Bold,
    Italic,
    Code,
    /// ATX heading, level clamped to 1..=6.
    Heading(u8),
    Quote,
    Link,
    Image,
}

impl Format {
    /// Markers placed around a selection, or around an empty span when
    /// nothing is selected.
    const fn wrapping(self) -> Option<(&'static str, &'static str)> {
        match self {
            Self::Bold => Some(("**", "**")),
            Self::Italic => Some(("*", "*")),
            Self::Code => Some(("`", "`")),
            Self::Link => Some(("[", "](url)")),
            Self::Heading(_) | Self::Quote | Self::Image => None,
        }
    }
}

const IMAGE_TEMPLATE: &str = "![](image_path)";

impl EditorBuffer {
    /// Apply a formatting command.
    ///
    /// Inline formats wrap the selection and leave the cursor after the
    /// closing marker; with no selection they insert empty markers and put
    /// the cursor between them. Headings and quotes prefix the cursor's
    /// line. Images replace the selection with a template and place the
    /// cursor inside its alt text.
    pub fn apply_format(&mut self, format: Format) {
        if let Some((open, close)) = format.wrapping() {
            match self.selected_text() {
                Some(selected) => self.insert_str(&format!("{open}{selected}{close}")),
                None => {
                    self.insert_str(&format!("{open}{close}"));
                    self.step_left(close.chars().count());
                }
            }
            return;
        }

        match format {
            Format::Heading(level) => {
                let hashes = "#".repeat(usize::from(level.clamp(1, 6)));
                self.prefix_line(&format!("{hashes} "));
            }
            Format::Quote => self.prefix_line("> "),
            Format::Image => {
                self.insert_str(IMAGE_TEMPLATE);
                self.step_left(IMAGE_TEMPLATE.len() - 2);
            }
            Format::Bold | Format::Italic | Format::Code | Format::Link => {}
        }
    }

    fn prefix_line(&mut self, prefix: &str) {
        self.move_home();
        self.insert_str(prefix);
    }

    fn step_left(&mut self, chars: usize) {
        for _ in 0..chars {
            self.move_cursor(Direction::Left);
        }
    }
}
