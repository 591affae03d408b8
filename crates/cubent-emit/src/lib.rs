//! Type-check-and-lower pass (spec §4.3, §4.4): consumes the IR and tables
//! `cubent-par` builds and produces the text of every `.mcfunction` file the
//! datapack needs, user functions and `DO_IF` helpers alike.

mod emitter;
mod helper;
mod scope;

pub use emitter::{EmitOutput, Emitter, EmittedFunction, InternalFunction};
pub use helper::HelperNamer;
pub use scope::{ScopeId, ScopeTree};
