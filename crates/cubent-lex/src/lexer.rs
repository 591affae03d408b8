//! The scanner: spec §4.1, with exact numeric/string semantics ported from
//! `original_source/src/lexer.py`.

use cubent_util::Position;

use crate::cursor::Cursor;
use crate::token::{Lexeme, LexemeKind, KEYWORDS, TYPE_NAMES};

pub struct Lexer<'a> {
    cursor: Cursor<'a>,
}

impl<'a> Lexer<'a> {
    pub fn new(source: &'a str) -> Self {
        Lexer { cursor: Cursor::new(source) }
    }

    fn position(&self) -> Position {
        Position::new(self.cursor.position() as u32, self.cursor.line(), self.cursor.column())
    }

    fn skip_whitespace(&mut self) {
        while self.cursor.current_char().is_whitespace() {
            self.cursor.advance();
        }
    }

    /// Idempotent one-token lookahead.
    pub fn peek(&mut self) -> Lexeme {
        let snapshot = self.cursor.snapshot();
        let lexeme = self.next();
        self.cursor.restore(snapshot);
        lexeme
    }

    /// Consumes and returns the next lexeme. Returns `Eof` forever once the
    /// input is exhausted.
    pub fn next(&mut self) -> Lexeme {
        self.skip_whitespace();

        let ch = self.cursor.current_char();
        if ch == '\0' && self.cursor.is_at_end() {
            return Lexeme::new(LexemeKind::Eof, self.position(), "");
        }

        if ch == '/' {
            let snapshot = self.cursor.snapshot();
            self.cursor.advance();
            match self.cursor.current_char() {
                '/' => {
                    self.cursor.advance();
                    while !self.cursor.is_at_end() && !matches!(self.cursor.current_char(), '\r' | '\n') {
                        self.cursor.advance();
                    }
                    return self.next();
                }
                '*' => {
                    self.cursor.advance();
                    while !self.cursor.is_at_end() {
                        let c = self.cursor.current_char();
                        self.cursor.advance();
                        if c == '*' && self.cursor.current_char() == '/' {
                            self.cursor.advance();
                            break;
                        }
                    }
                    return self.next();
                }
                _ => {
                    self.cursor.restore(snapshot);
                }
            }
        }

        if ch == '=' {
            let position = self.position();
            self.cursor.advance();
            if self.cursor.match_char('=') {
                return Lexeme::new(LexemeKind::Punctuation, position, "==");
            }
            return Lexeme::new(LexemeKind::Punctuation, position, "=");
        }

        if ch.is_ascii_digit() || ch == '.' {
            return self.read_number();
        }

        if ch == '"' || ch == '\'' {
            return self.read_string();
        }

        if ch.is_alphabetic() {
            return self.read_identifier();
        }

        let position = self.position();
        self.cursor.advance();
        Lexeme::new(LexemeKind::Punctuation, position, ch.to_string())
    }

    fn read_number(&mut self) -> Lexeme {
        let position = self.position();
        let mut body = String::new();

        while self.cursor.current_char().is_ascii_digit() {
            body.push(self.cursor.current_char());
            self.cursor.advance();
        }

        if self.cursor.current_char() == '.' {
            body.push('.');
            self.cursor.advance();
            while self.cursor.current_char().is_ascii_digit() {
                body.push(self.cursor.current_char());
                self.cursor.advance();
            }
        }

        let has_fraction = body.contains('.');
        let suffix = self.cursor.current_char().to_ascii_lowercase();

        match suffix {
            'b' => {
                let ok = !has_fraction && body.parse::<i64>().map(|v| v + 128 <= 255).unwrap_or(false);
                if !ok {
                    return Lexeme::new(LexemeKind::Invalid, position, body);
                }
                body.push(self.cursor.current_char());
                self.cursor.advance();
                Lexeme::new(LexemeKind::Byte, position, body)
            }
            's' => {
                let ok = !has_fraction && body.parse::<i64>().map(|v| v + 32768 <= 65535).unwrap_or(false);
                if !ok {
                    return Lexeme::new(LexemeKind::Invalid, position, body);
                }
                body.push(self.cursor.current_char());
                self.cursor.advance();
                Lexeme::new(LexemeKind::Short, position, body)
            }
            'l' => {
                let ok = !has_fraction
                    && body
                        .parse::<i128>()
                        .map(|v| v + 9_223_372_036_854_775_808i128 <= 18_446_744_073_709_551_615i128)
                        .unwrap_or(false);
                if !ok {
                    return Lexeme::new(LexemeKind::Invalid, position, body);
                }
                body.push(self.cursor.current_char());
                self.cursor.advance();
                Lexeme::new(LexemeKind::Long, position, body)
            }
            'f' => {
                let ok = body.parse::<f64>().map(|v| v + 3.4e38 <= 6.8e38).unwrap_or(false);
                if !ok {
                    return Lexeme::new(LexemeKind::Invalid, position, body);
                }
                body.push(self.cursor.current_char());
                self.cursor.advance();
                Lexeme::new(LexemeKind::Float, position, body)
            }
            'd' => {
                body.push(self.cursor.current_char());
                self.cursor.advance();
                Lexeme::new(LexemeKind::Double, position, body)
            }
            _ => {
                if has_fraction {
                    Lexeme::new(LexemeKind::Double, position, body)
                } else if body.parse::<i64>().map(|v| v + 2_147_483_648 <= 4_294_967_295).unwrap_or(false) {
                    Lexeme::new(LexemeKind::Int, position, body)
                } else {
                    Lexeme::new(LexemeKind::Invalid, position, body)
                }
            }
        }
    }

    fn read_string(&mut self) -> Lexeme {
        let position = self.position();
        let delimiter = self.cursor.current_char();
        let mut body = String::new();
        body.push(delimiter);
        self.cursor.advance();

        loop {
            let ch = self.cursor.current_char();
            if ch == delimiter {
                break;
            }
            if matches!(ch, '\r' | '\n' | '\0') && self.cursor.is_at_end() {
                return Lexeme::new(LexemeKind::Invalid, position, body);
            }
            if matches!(ch, '\r' | '\n') {
                return Lexeme::new(LexemeKind::Invalid, position, body);
            }
            self.cursor.advance();
            body.push(ch);
            if ch == '\\' {
                let escaped = self.cursor.current_char();
                if matches!(escaped, '\\' | '"' | '\'') {
                    self.cursor.advance();
                    body.push(escaped);
                } else {
                    return Lexeme::new(LexemeKind::Invalid, position, body);
                }
            }
        }

        body.push(delimiter);
        self.cursor.advance();
        Lexeme::new(LexemeKind::String, position, body)
    }

    fn read_identifier(&mut self) -> Lexeme {
        let position = self.position();
        let start = self.cursor.position();
        while self.cursor.current_char().is_ascii_alphanumeric() {
            self.cursor.advance();
        }
        let body = self.cursor.slice_from(start).to_string();

        let kind = if KEYWORDS.contains(&body.as_str()) {
            LexemeKind::Keyword
        } else if TYPE_NAMES.contains(&body.as_str()) {
            LexemeKind::TypeName
        } else if body == "true" || body == "false" {
            LexemeKind::Boolean
        } else {
            LexemeKind::Identifier
        };

        Lexeme::new(kind, position, body)
    }
}
