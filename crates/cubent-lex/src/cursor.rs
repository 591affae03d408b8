//! Byte cursor over source text with zero-based line/column tracking.
//!
//! Cubent identifiers, keywords, and punctuation are ASCII-only (spec
//! §4.1), but string literal bodies and comments may contain arbitrary
//! UTF-8, so every step advances by one Unicode scalar value rather than
//! one byte.

/// A cursor position snapshot, for lookahead that needs to rewind.
#[derive(Debug, Clone, Copy)]
pub struct CursorSnapshot {
    pub position: usize,
    pub line: u32,
    pub column: u32,
}

pub struct Cursor<'a> {
    source: &'a str,
    position: usize,
    line: u32,
    column: u32,
}

impl<'a> Cursor<'a> {
    pub fn new(source: &'a str) -> Self {
        Cursor { source, position: 0, line: 0, column: 0 }
    }

    pub fn is_at_end(&self) -> bool {
        self.position >= self.source.len()
    }

    /// The current character, or `'\0'` at end of input.
    pub fn current_char(&self) -> char {
        self.source[self.position..].chars().next().unwrap_or('\0')
    }

    pub fn position(&self) -> usize {
        self.position
    }

    pub fn line(&self) -> u32 {
        self.line
    }

    pub fn column(&self) -> u32 {
        self.column
    }

    /// The text consumed since byte offset `start`, up to the current
    /// position. Used to recover a lexeme's body without accumulating it
    /// character by character.
    pub fn slice_from(&self, start: usize) -> &'a str {
        &self.source[start..self.position]
    }

    /// Consumes the current character, updating line/column.
    pub fn advance(&mut self) -> Option<char> {
        let c = self.source[self.position..].chars().next()?;
        self.position += c.len_utf8();
        if c == '\n' {
            self.line += 1;
            self.column = 0;
        } else {
            self.column += 1;
        }
        Some(c)
    }

    /// Consumes the current character only if it equals `expected`.
    pub fn match_char(&mut self, expected: char) -> bool {
        if self.current_char() == expected {
            self.advance();
            true
        } else {
            false
        }
    }

    pub fn snapshot(&self) -> CursorSnapshot {
        CursorSnapshot { position: self.position, line: self.line, column: self.column }
    }

    pub fn restore(&mut self, snapshot: CursorSnapshot) {
        self.position = snapshot.position;
        self.line = snapshot.line;
        self.column = snapshot.column;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn advance_tracks_newlines() {
        let mut cursor = Cursor::new("ab\ncd");
        for _ in 0..3 {
            cursor.advance();
        }
        assert_eq!(cursor.line(), 1);
        assert_eq!(cursor.column(), 0);
    }

    #[test]
    fn slice_from_captures_consumed_text() {
        let mut cursor = Cursor::new("abcdef");
        let start = cursor.position();
        cursor.advance();
        cursor.advance();
        cursor.advance();
        assert_eq!(cursor.slice_from(start), "abc");
    }

    #[test]
    fn snapshot_restore_roundtrips() {
        let mut cursor = Cursor::new("abcdef");
        cursor.advance();
        cursor.advance();
        let snap = cursor.snapshot();
        cursor.advance();
        cursor.restore(snap);
        assert_eq!(cursor.position(), 2);
    }

    #[test]
    fn handles_multibyte_utf8() {
        let mut cursor = Cursor::new("'é'");
        cursor.advance();
        assert_eq!(cursor.current_char(), 'é');
        cursor.advance();
        assert_eq!(cursor.current_char(), '\'');
    }

    #[test]
    fn end_of_input_reports_nul() {
        let cursor = Cursor::new("");
        assert!(cursor.is_at_end());
        assert_eq!(cursor.current_char(), '\0');
    }
}
