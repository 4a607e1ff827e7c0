/// Single-line input used by the search box, date prompts and form fields.
///
/// The cursor counts characters, not bytes.
#[derive(Debug, Clone, Default)]
pub struct TextBuffer {
    text: String,
    cursor: usize,
}

impl TextBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn as_str(&self) -> &str {
        &self.text
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn clear(&mut self) {
        self.text.clear();
        self.cursor = 0;
    }

    pub fn set<T: Into<String>>(&mut self, value: T) {
        self.text = value.into().replace(['\n', '\r'], " ");
        self.cursor = self.len();
    }

    pub fn insert_char(&mut self, ch: char) {
        if ch.is_control() {
            return;
        }
        let at = self.byte_offset(self.cursor);
        self.text.insert(at, ch);
        self.cursor += 1;
    }

    pub fn backspace(&mut self) {
        if self.cursor == 0 {
            return;
        }
        self.cursor -= 1;
        let at = self.byte_offset(self.cursor);
        self.text.remove(at);
    }

    pub fn delete_char(&mut self) {
        if self.cursor >= self.len() {
            return;
        }
        let at = self.byte_offset(self.cursor);
        self.text.remove(at);
    }

    pub fn move_left(&mut self) {
        self.cursor = self.cursor.saturating_sub(1);
    }

    pub fn move_right(&mut self) {
        self.cursor = (self.cursor + 1).min(self.len());
    }

    pub fn move_home(&mut self) {
        self.cursor = 0;
    }

    pub fn move_end(&mut self) {
        self.cursor = self.len();
    }

    /// Text before and after the cursor, for drawing a caret between them.
    pub fn split_at_cursor(&self) -> (&str, &str) {
        self.text.split_at(self.byte_offset(self.cursor))
    }

    fn len(&self) -> usize {
        self.text.chars().count()
    }

    fn byte_offset(&self, chars: usize) -> usize {
        self.text
            .char_indices()
            .nth(chars)
            .map(|(idx, _)| idx)
            .unwrap_or(self.text.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn set_places_cursor_at_end() {
        let mut buffer = TextBuffer::new();
        buffer.set("1007");

        assert_eq!(buffer.as_str(), "1007");
        assert_eq!(buffer.cursor(), 4);
    }

    #[test]
    fn edits_respect_multibyte_characters() {
        let mut buffer = TextBuffer::new();
        buffer.set("Café");
        buffer.move_left();
        buffer.insert_char('x');
        assert_eq!(buffer.as_str(), "Cafxé");

        buffer.delete_char();
        buffer.backspace();
        assert_eq!(buffer.as_str(), "Caf");
        assert_eq!(buffer.split_at_cursor(), ("Caf", ""));
    }

    #[test]
    fn newlines_are_flattened() {
        let mut buffer = TextBuffer::new();
        buffer.set("line one\nline two");
        buffer.insert_char('\n');
        assert_eq!(buffer.as_str(), "line one line two");
    }

    #[test]
    fn cursor_stays_in_bounds() {
        let mut buffer = TextBuffer::new();
        buffer.move_left();
        buffer.set("ab");
        buffer.move_right();
        buffer.move_home();
        buffer.move_left();
        assert_eq!(buffer.cursor(), 0);
        buffer.move_end();
        assert_eq!(buffer.split_at_cursor(), ("ab", ""));
    }
}
