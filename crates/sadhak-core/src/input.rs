//! Single-line text input the user types prompts into.

use unicode_width::UnicodeWidthChar;

/// Source of the text a submission reads.
///
/// The dispatcher only needs to read the current text and clear it once a
/// submission is accepted.
pub trait InputField {
    fn value(&self) -> &str;
    fn clear(&mut self);
}

/// Convert a character index to a byte index for UTF-8 safe string operations
fn char_to_byte_index(s: &str, char_idx: usize) -> usize {
    s.char_indices()
        .nth(char_idx)
        .map(|(i, _)| i)
        .unwrap_or(s.len())
}

fn char_width(c: char) -> usize {
    c.width().unwrap_or(0)
}

/// Editable line with a character-based cursor
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InputLine {
    text: String,
    cursor: usize,
}

impl InputLine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Cursor position in characters, not bytes
    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    pub fn insert(&mut self, c: char) {
        let byte_pos = char_to_byte_index(&self.text, self.cursor);
        self.text.insert(byte_pos, c);
        self.cursor += 1;
    }

    pub fn insert_str(&mut self, s: &str) {
        for c in s.chars() {
            self.insert(c);
        }
    }

    pub fn backspace(&mut self) {
        if self.cursor > 0 {
            self.cursor -= 1;
            let byte_pos = char_to_byte_index(&self.text, self.cursor);
            self.text.remove(byte_pos);
        }
    }

    pub fn delete(&mut self) {
        if self.cursor < self.char_count() {
            let byte_pos = char_to_byte_index(&self.text, self.cursor);
            self.text.remove(byte_pos);
        }
    }

    pub fn move_left(&mut self) {
        self.cursor = self.cursor.saturating_sub(1);
    }

    pub fn move_right(&mut self) {
        self.cursor = (self.cursor + 1).min(self.char_count());
    }

    pub fn move_home(&mut self) {
        self.cursor = 0;
    }

    pub fn move_end(&mut self) {
        self.cursor = self.char_count();
    }

    /// The slice of text that fits in `width` terminal columns with the cursor
    /// visible, and the cursor's column within that slice.
    ///
    /// Columns are display widths, so wide characters take two.
    pub fn visible(&self, width: usize) -> (String, usize) {
        if width == 0 {
            return (String::new(), 0);
        }

        let chars: Vec<char> = self.text.chars().collect();

        // Walk back from the cursor, keeping one column free for the cursor itself
        let mut start = self.cursor;
        let mut cursor_col = 0;
        while start > 0 {
            let w = char_width(chars[start - 1]);
            if cursor_col + w >= width {
                break;
            }
            cursor_col += w;
            start -= 1;
        }

        let mut used = 0;
        let text = chars[start..]
            .iter()
            .take_while(|c| {
                used += char_width(**c);
                used <= width
            })
            .collect();

        (text, cursor_col)
    }

    fn char_count(&self) -> usize {
        self.text.chars().count()
    }
}

impl InputField for InputLine {
    fn value(&self) -> &str {
        &self.text
    }

    fn clear(&mut self) {
        self.text.clear();
        self.cursor = 0;
    }
}
