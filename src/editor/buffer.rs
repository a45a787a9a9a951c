use std::ops::Range;
use std::path::Path;

use ropey::Rope;

use crate::preview::DocumentSource;

/// Cursor position in the editor buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Cursor {
    /// Zero-based line index.
    pub line: usize,
    /// Zero-based column (byte offset within the line).
    pub col: usize,
    /// Remembered column for vertical movement (sticky column).
    col_memory: usize,
}

impl Cursor {
    /// Create a cursor at line 0, column 0.
    pub const fn new() -> Self {
        Self {
            line: 0,
            col: 0,
            col_memory: 0,
        }
    }

    /// Create a cursor at a specific position.
    pub const fn at(line: usize, col: usize) -> Self {
        Self {
            line,
            col,
            col_memory: col,
        }
    }

    const fn set_col(&mut self, col: usize) {
        self.col = col;
        self.col_memory = col;
    }

    const fn key(self) -> (usize, usize) {
        (self.line, self.col)
    }
}

impl Default for Cursor {
    fn default() -> Self {
        Self::new()
    }
}

/// Direction for cursor movement.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
}

/// A text buffer backed by a rope data structure.
///
/// Tracks a cursor, an optional selection anchor, whether the text differs
/// from what was last loaded or saved, and a revision number that every
/// mutation bumps. Typing while a selection exists replaces the selection.
pub struct EditorBuffer {
    rope: Rope,
    cursor: Cursor,
    anchor: Option<Cursor>,
    dirty: bool,
    revision: u64,
}

impl EditorBuffer {
    /// Create a new buffer from a string.
    pub fn from_text(text: &str) -> Self {
        Self {
            rope: Rope::from_str(text),
            cursor: Cursor::new(),
            anchor: None,
            dirty: false,
            revision: 0,
        }
    }

    /// Create an empty buffer.
    pub fn empty() -> Self {
        Self::from_text("")
    }

    /// Replace the whole text, as when a file is opened. The buffer is
    /// clean afterwards and the cursor returns to the origin.
    pub fn set_text(&mut self, text: &str) {
        self.rope = Rope::from_str(text);
        self.cursor = Cursor::new();
        self.anchor = None;
        self.dirty = false;
        self.revision += 1;
    }

    /// The current cursor position.
    pub const fn cursor(&self) -> Cursor {
        self.cursor
    }

    /// Whether the buffer has been modified since creation or last save.
    pub const fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Mark the buffer as clean (e.g., after saving).
    pub const fn mark_clean(&mut self) {
        self.dirty = false;
    }

    /// Counter bumped by every change to the text.
    pub const fn revision(&self) -> u64 {
        self.revision
    }

    /// Total number of lines in the buffer.
    pub fn line_count(&self) -> usize {
        self.rope.len_lines()
    }

    /// Get the content of a line (without trailing newline).
    pub fn line_at(&self, line_idx: usize) -> Option<String> {
        if line_idx >= self.rope.len_lines() {
            return None;
        }
        let s = self.rope.line(line_idx).to_string();
        Some(s.trim_end_matches('\n').trim_end_matches('\r').to_string())
    }

    /// Length of a line in bytes (without trailing newline).
    pub fn line_len(&self, line_idx: usize) -> usize {
        self.line_at(line_idx).map_or(0, |s| s.len())
    }

    /// The full text content of the buffer.
    pub fn text(&self) -> String {
        self.rope.to_string()
    }

    // --- Selection ---

    /// Select from `(start_line, start_col)` to `(end_line, end_col)`; the
    /// cursor ends up at the end position.
    pub fn select(&mut self, start: (usize, usize), end: (usize, usize)) {
        self.move_to(start.0, start.1);
        let anchor = self.cursor;
        self.move_to(end.0, end.1);
        self.anchor = (anchor != self.cursor).then_some(anchor);
    }

    /// Select the whole buffer.
    pub fn select_all(&mut self) {
        let last = self.line_count().saturating_sub(1);
        self.select((0, 0), (last, self.line_len(last)));
    }

    pub const fn clear_selection(&mut self) {
        self.anchor = None;
    }

    pub fn has_selection(&self) -> bool {
        self.selection_range().is_some()
    }

    /// Selected text, if any.
    pub fn selected_text(&self) -> Option<String> {
        self.selection_range()
            .map(|range| self.rope.slice(range).to_string())
    }

    /// Char range of the selection, ordered.
    fn selection_range(&self) -> Option<Range<usize>> {
        let anchor = self.anchor?;
        let (a, b) = if anchor.key() <= self.cursor.key() {
            (anchor, self.cursor)
        } else {
            (self.cursor, anchor)
        };
        let range = self.char_idx_of(a)..self.char_idx_of(b);
        (!range.is_empty()).then_some(range)
    }

    /// Remove the selection, returning the removed text.
    pub fn delete_selection(&mut self) -> Option<String> {
        let range = self.selection_range()?;
        Some(self.delete_range(range))
    }

    /// Remove a char range, leaving the cursor at its start.
    pub fn delete_range(&mut self, range: Range<usize>) -> String {
        let end = range.end.min(self.rope.len_chars());
        let start = range.start.min(end);
        let removed = self.rope.slice(start..end).to_string();
        self.anchor = None;
        if start < end {
            self.rope.remove(start..end);
            self.touch();
        }
        self.cursor = self.cursor_at_char(start);
        removed
    }

    // --- Editing ---

    /// Insert a character at the cursor position.
    pub fn insert_char(&mut self, ch: char) {
        let mut utf8 = [0; 4];
        self.insert_str(ch.encode_utf8(&mut utf8));
    }

    /// Insert a string at the cursor position, replacing the selection.
    pub fn insert_str(&mut self, s: &str) {
        self.delete_selection();
        if s.is_empty() {
            return;
        }
        let char_idx = self.cursor_char_idx();
        self.rope.insert(char_idx, s);
        self.cursor = self.cursor_at_char(char_idx + s.chars().count());
        self.touch();
    }

    /// Split the current line at the cursor (Enter key).
    pub fn split_line(&mut self) {
        self.insert_char('\n');
    }

    /// Delete the selection or the character before the cursor (Backspace).
    ///
    /// Returns `true` if anything was deleted.
    pub fn delete_back(&mut self) -> bool {
        if self.delete_selection().is_some() {
            return true;
        }
        let char_idx = self.cursor_char_idx();
        if char_idx == 0 {
            return false;
        }
        self.delete_range(char_idx - 1..char_idx);
        true
    }

    /// Delete the selection or the character at the cursor (Delete key).
    ///
    /// Returns `true` if anything was deleted.
    pub fn delete_forward(&mut self) -> bool {
        if self.delete_selection().is_some() {
            return true;
        }
        let char_idx = self.cursor_char_idx();
        if char_idx >= self.rope.len_chars() {
            return false;
        }
        self.delete_range(char_idx..char_idx + 1);
        true
    }

    // --- Movement (clears the selection) ---

    /// Move the cursor in the given direction.
    pub fn move_cursor(&mut self, direction: Direction) {
        self.anchor = None;
        match direction {
            Direction::Left => self.move_left(),
            Direction::Right => self.move_right(),
            Direction::Up => self.move_up(),
            Direction::Down => self.move_down(),
        }
    }

    /// Move cursor to the beginning of the line (Home).
    pub const fn move_home(&mut self) {
        self.anchor = None;
        self.cursor.set_col(0);
    }

    /// Move cursor to the end of the line (End).
    pub fn move_end(&mut self) {
        self.anchor = None;
        let len = self.line_len(self.cursor.line);
        self.cursor.set_col(len);
    }

    /// Move cursor to a specific line and column, clamped to the text.
    pub fn move_to(&mut self, line: usize, col: usize) {
        self.anchor = None;
        let max_line = self.line_count().saturating_sub(1);
        self.cursor.line = line.min(max_line);
        let max_col = self.line_len(self.cursor.line);
        self.cursor.set_col(col.min(max_col));
    }

    /// Move cursor to the start of the buffer (Ctrl+Home).
    pub const fn move_to_start(&mut self) {
        self.anchor = None;
        self.cursor.line = 0;
        self.cursor.set_col(0);
    }

    /// Move cursor to the end of the buffer (Ctrl+End).
    pub fn move_to_end(&mut self) {
        let last_line = self.line_count().saturating_sub(1);
        self.move_to(last_line, usize::MAX);
    }

    // --- Private helpers ---

    const fn touch(&mut self) {
        self.dirty = true;
        self.revision += 1;
    }

    fn cursor_char_idx(&self) -> usize {
        self.char_idx_of(self.cursor)
    }

    /// Convert a line/byte-column position to a ropey char index.
    fn char_idx_of(&self, cursor: Cursor) -> usize {
        let line_start = self.rope.line_to_char(cursor.line);
        let line = self.rope.line(cursor.line);
        let byte_col = cursor.col.min(line.len_bytes());
        line_start + line.byte_to_char(byte_col)
    }

    fn cursor_at_char(&self, char_idx: usize) -> Cursor {
        let char_idx = char_idx.min(self.rope.len_chars());
        let line = self.rope.char_to_line(char_idx);
        let offset = char_idx - self.rope.line_to_char(line);
        let col = self.rope.line(line).slice(..offset).len_bytes();
        Cursor::at(line, col)
    }

    fn move_left(&mut self) {
        let char_idx = self.cursor_char_idx();
        if char_idx > 0 {
            self.cursor = self.cursor_at_char(char_idx - 1);
            // Stepping back over "\r\n" lands between the two.
            let len = self.line_len(self.cursor.line);
            if self.cursor.col > len {
                self.cursor.set_col(len);
            }
        }
    }

    fn move_right(&mut self) {
        let line_len = self.line_len(self.cursor.line);
        if self.cursor.col < line_len {
            let line = self.line_at(self.cursor.line).unwrap_or_default();
            let next_char_len = line[self.cursor.col..]
                .chars()
                .next()
                .map_or(1, char::len_utf8);
            self.cursor.set_col(self.cursor.col + next_char_len);
        } else if self.cursor.line + 1 < self.line_count() {
            self.cursor.line += 1;
            self.cursor.set_col(0);
        }
    }

    fn move_up(&mut self) {
        if self.cursor.line > 0 {
            self.cursor.line -= 1;
            let max_col = self.line_len(self.cursor.line);
            self.cursor.col = self.cursor.col_memory.min(max_col);
        }
    }

    fn move_down(&mut self) {
        if self.cursor.line + 1 < self.line_count() {
            self.cursor.line += 1;
            let max_col = self.line_len(self.cursor.line);
            self.cursor.col = self.cursor.col_memory.min(max_col);
        }
    }
}

impl Default for EditorBuffer {
    fn default() -> Self {
        Self::empty()
    }
}

impl DocumentSource for EditorBuffer {
    fn current_text(&self) -> String {
        self.text()
    }

    fn current_path(&self) -> Option<&Path> {
        None
    }
}

impl std::fmt::Debug for EditorBuffer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EditorBuffer")
            .field(
                "rope",
                &format_args!("Rope({} lines)", self.rope.len_lines()),
            )
            .field("cursor", &self.cursor)
            .field("anchor", &self.anchor)
            .field("dirty", &self.dirty)
            .field("revision", &self.revision)
            .finish()
    }
}
