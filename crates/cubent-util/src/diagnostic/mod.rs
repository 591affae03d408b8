//! Diagnostic collection and caret-format rendering.
//!
//! [`Handler`] is the single place diagnostics accumulate. The Lexer,
//! Parser, and Emitter each hold a `&mut Handler` and report through it
//! rather than formatting messages themselves; only the driver renders the
//! final user-visible caret diagnostic (spec §7), using a [`SourceMap`] to
//! fetch the offending line.

mod level;

pub use level::Level;

use std::cell::RefCell;

use crate::error::CompileError;
use crate::span::{FileId, Position, Span, SourceMap};

/// A single diagnostic: a level, a message, and the span it applies to.
#[derive(Debug, Clone)]
pub struct Diagnostic {
    pub level: Level,
    pub message: String,
    pub span: Span,
}

impl Diagnostic {
    pub fn error(message: impl Into<String>, span: Span) -> Self {
        Diagnostic { level: Level::Error, message: message.into(), span }
    }

    pub fn warning(message: impl Into<String>, span: Span) -> Self {
        Diagnostic { level: Level::Warning, message: message.into(), span }
    }
}

/// Collects diagnostics produced over the course of a compile.
#[derive(Default)]
pub struct Handler {
    diagnostics: RefCell<Vec<Diagnostic>>,
}

impl Handler {
    pub fn new() -> Self {
        Handler { diagnostics: RefCell::new(Vec::new()) }
    }

    pub fn emit_diagnostic(&self, diagnostic: Diagnostic) {
        self.diagnostics.borrow_mut().push(diagnostic);
    }

    pub fn error(&self, message: impl Into<String>, span: Span) {
        self.emit_diagnostic(Diagnostic::error(message, span));
    }

    /// Records a [`CompileError`] as an error-level diagnostic. This is how
    /// the Lexer, Parser, and Emitter report everything — constructing the
    /// specific taxonomy variant (spec §7) at the call site means the kind
    /// of failure survives as far as `CompileError::span`/`Display`, even
    /// though `render` still shows every error the same way.
    pub fn report(&self, error: CompileError) {
        let span = error.span().unwrap_or_else(|| Span::point(FileId::DUMMY, Position::new(0, 0, 0)));
        self.emit_diagnostic(Diagnostic::error(error.to_string(), span));
    }

    pub fn has_errors(&self) -> bool {
        self.diagnostics.borrow().iter().any(|d| d.level == Level::Error)
    }

    pub fn error_count(&self) -> usize {
        self.diagnostics.borrow().iter().filter(|d| d.level == Level::Error).count()
    }

    pub fn diagnostics(&self) -> Vec<Diagnostic> {
        self.diagnostics.borrow().clone()
    }

    pub fn clear(&self) {
        self.diagnostics.borrow_mut().clear();
    }

    /// Renders every collected diagnostic in spec §7's caret format:
    /// ```text
    /// Error at line L, column C in file '<path>': <msg>
    ///     <offending source line, trimmed>
    ///          ^
    /// ```
    pub fn render(&self, sources: &SourceMap) -> String {
        let mut out = String::new();
        for diag in self.diagnostics.borrow().iter() {
            let path = sources.path(diag.span.file).map(|p| p.display().to_string()).unwrap_or_default();
            out.push_str(&format!(
                "{} at {} in file '{}': {}\n",
                diag.level, diag.span.start, path, diag.message
            ));
            if let Some(line) = sources.line(diag.span.file, diag.span.start.line) {
                let trimmed = line.trim_start();
                let trim_amount = line.len() - trimmed.len();
                out.push_str("    ");
                out.push_str(trimmed);
                out.push('\n');
                let column = diag.span.start.column as usize;
                let caret_offset = column.saturating_sub(trim_amount);
                out.push_str(&" ".repeat(4 + caret_offset));
                out.push_str("^\n");
            }
        }
        out
    }
}
