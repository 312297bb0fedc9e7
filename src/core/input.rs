//! Editable text field with a char-boundary-safe cursor.

use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

/// Contents of one input field plus the cursor (a byte offset that always
/// sits on a char boundary).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TextInput {
    text: String,
    cursor: usize,
}

impl TextInput {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    /// Field value with surrounding whitespace removed.
    pub fn trimmed(&self) -> &str {
        self.text.trim()
    }

    pub fn is_blank(&self) -> bool {
        self.trimmed().is_empty()
    }

    pub fn set_text(&mut self, text: impl Into<String>) {
        self.text = text.into();
        self.cursor = self.text.len();
    }

    pub fn clear(&mut self) {
        self.text.clear();
        self.cursor = 0;
    }

    pub fn insert_char(&mut self, c: char) {
        self.text.insert(self.cursor, c);
        self.cursor += c.len_utf8();
    }

    pub fn insert_str(&mut self, s: &str) {
        // Normalize pasted CRLF so line math stays simple.
        let normalized = s.replace("\r\n", "\n").replace('\r', "\n");
        self.text.insert_str(self.cursor, &normalized);
        self.cursor += normalized.len();
    }

    pub fn insert_newline(&mut self) {
        self.insert_char('\n');
    }

    pub fn delete_char(&mut self) {
        if let Some(prev) = self.prev_boundary() {
            self.text.replace_range(prev..self.cursor, "");
            self.cursor = prev;
        }
    }

    pub fn delete_char_forward(&mut self) {
        if let Some(next) = self.next_boundary() {
            self.text.replace_range(self.cursor..next, "");
        }
    }

    pub fn move_cursor_left(&mut self) {
        if let Some(prev) = self.prev_boundary() {
            self.cursor = prev;
        }
    }

    pub fn move_cursor_right(&mut self) {
        if let Some(next) = self.next_boundary() {
            self.cursor = next;
        }
    }

    /// Move to the start of the current line.
    pub fn move_cursor_start(&mut self) {
        self.cursor = self.line_start();
    }

    /// Move to the previous line, keeping the display column where it fits.
    pub fn move_cursor_up(&mut self) {
        let start = self.line_start();
        if start == 0 {
            return;
        }
        let (_, col) = self.cursor_row_col();
        let prev_end = start - 1;
        let prev_start = self.text[..prev_end].rfind('\n').map_or(0, |pos| pos + 1);
        self.cursor = column_offset(&self.text, prev_start, prev_end, col);
    }

    /// Move to the next line, keeping the display column where it fits.
    pub fn move_cursor_down(&mut self) {
        let Some(newline) = self.text[self.cursor..].find('\n') else {
            return;
        };
        let (_, col) = self.cursor_row_col();
        let next_start = self.cursor + newline + 1;
        let next_end = self.text[next_start..]
            .find('\n')
            .map_or(self.text.len(), |pos| next_start + pos);
        self.cursor = column_offset(&self.text, next_start, next_end, col);
    }

    /// Move to the end of the current line.
    pub fn move_cursor_end(&mut self) {
        self.cursor = self.text[self.cursor..]
            .find('\n')
            .map_or(self.text.len(), |pos| self.cursor + pos);
    }

    /// Cursor position as `(row, display column)`.
    pub fn cursor_row_col(&self) -> (usize, usize) {
        let before = &self.text[..self.cursor];
        let row = before.matches('\n').count();
        let line_start = before.rfind('\n').map_or(0, |pos| pos + 1);
        let col = UnicodeWidthStr::width(&before[line_start..]);
        (row, col)
    }

    pub fn line_count(&self) -> usize {
        self.text.split('\n').count()
    }

    fn line_start(&self) -> usize {
        self.text[..self.cursor].rfind('\n').map_or(0, |pos| pos + 1)
    }

    fn prev_boundary(&self) -> Option<usize> {
        self.text[..self.cursor]
            .char_indices()
            .next_back()
            .map(|(idx, _)| idx)
    }

    fn next_boundary(&self) -> Option<usize> {
        self.text[self.cursor..]
            .chars()
            .next()
            .map(|c| self.cursor + c.len_utf8())
    }
}

/// Byte offset within `text[start..end]` at display column `col`, or the
/// line end when the line is shorter.
fn column_offset(text: &str, start: usize, end: usize, col: usize) -> usize {
    let mut width = 0;
    for (idx, c) in text[start..end].char_indices() {
        let char_width = UnicodeWidthChar::width(c).unwrap_or(0);
        if width + char_width > col {
            return start + idx;
        }
        width += char_width;
    }
    end
}
