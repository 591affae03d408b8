//! Shared infrastructure for the Cubent compiler: source positions and
//! spans, diagnostic collection, and the user-facing error taxonomy.
//!
//! Nothing in this crate knows about Cubent syntax or semantics — it is
//! the foundation `cubent-lex`, `cubent-par`, `cubent-emit`, and
//! `cubent-drv` all build on, the same role `faxc-util` plays for the
//! teacher's pipeline.

pub mod diagnostic;
pub mod error;
pub mod span;

pub use diagnostic::{Diagnostic, Handler, Level};
pub use error::{CompileError, CompileResult};
pub use span::{FileId, Position, Span};
