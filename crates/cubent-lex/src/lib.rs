//! Lexical analysis for Cubent source files (spec §4.1).
//!
//! [`Lexer`] is a byte-offset-tracked scanner with one-token lookahead
//! (`peek`/`next`); it never fails outright — invalid numeric or string
//! literals come back as [`token::LexemeKind::Invalid`] lexemes so the
//! Parser can report a well-positioned error at the point of use, matching
//! `original_source/src/lexer.py`'s design exactly.

mod cursor;
mod lexer;
mod token;

pub use cursor::{Cursor, CursorSnapshot};
pub use lexer::Lexer;
pub use token::{Lexeme, LexemeKind, KEYWORDS, TYPE_NAMES};
