//! The IR opcode union, function descriptors, and the tables the Parser
//! builds (spec §3). `Command` is a tagged union with one variant per
//! opcode carrying only its own operands, per spec §9's design note —
//! `original_source/src/compiler.py`'s `Command` dataclass instead wraps
//! every opcode in a single `Operation` tag plus a loose `data: list`.

use cubent_util::Span;
use indexmap::IndexMap;

use crate::types::CubentType;

#[derive(Debug, Clone, PartialEq)]
pub enum Literal {
    Boolean(bool),
    Byte(i8),
    Short(i16),
    Int(i32),
    Long(i64),
    Float(f32),
    Double(f64),
    Str(String),
}

#[derive(Debug, Clone)]
pub enum Command {
    Load { span: Span, ty: CubentType, literal: Literal },
    DeclareVar { span: Span, name: String },
    GetVar { span: Span, name: String },
    SetVar { span: Span, name: String },
    GetProp { span: Span, name: String },
    SetProp { span: Span, name: String },
    Call { span: Span, path: Vec<String>, argc: usize },
    GetArg { span: Span, index: usize },
    DoIf { span: Span, block: Vec<Command> },
    Add { span: Span },
    Sub { span: Span },
    Mul { span: Span },
    Div { span: Span },
    Eq { span: Span },
    Neq { span: Span },
    Or { span: Span },
    And { span: Span },
}

impl Command {
    pub fn span(&self) -> Span {
        match self {
            Command::Load { span, .. }
            | Command::DeclareVar { span, .. }
            | Command::GetVar { span, .. }
            | Command::SetVar { span, .. }
            | Command::GetProp { span, .. }
            | Command::SetProp { span, .. }
            | Command::Call { span, .. }
            | Command::GetArg { span, .. }
            | Command::DoIf { span, .. }
            | Command::Add { span }
            | Command::Sub { span }
            | Command::Mul { span }
            | Command::Div { span }
            | Command::Eq { span }
            | Command::Neq { span }
            | Command::Or { span }
            | Command::And { span } => *span,
        }
    }
}

pub type Parameters = Vec<(String, CubentType)>;

/// A declared function: either a Cubent-language function with an IR body,
/// or an `mcfunction` binding to an engine-provided location (spec §3).
#[derive(Debug, Clone)]
pub enum Function {
    User {
        qualified_path: Vec<String>,
        parameters: Parameters,
        return_type: CubentType,
        body: Vec<Command>,
    },
    External {
        qualified_path: Vec<String>,
        parameters: Parameters,
        return_type: CubentType,
        engine_location: String,
    },
}

impl Function {
    pub fn qualified_path(&self) -> &[String] {
        match self {
            Function::User { qualified_path, .. } => qualified_path,
            Function::External { qualified_path, .. } => qualified_path,
        }
    }

    pub fn parameters(&self) -> &Parameters {
        match self {
            Function::User { parameters, .. } => parameters,
            Function::External { parameters, .. } => parameters,
        }
    }

    pub fn return_type(&self) -> CubentType {
        match self {
            Function::User { return_type, .. } => *return_type,
            Function::External { return_type, .. } => *return_type,
        }
    }
}

pub fn join_path(path: &[String]) -> String {
    path.join(".")
}

/// Maps qualified paths to their `Function` descriptor. Declaration order
/// is preserved (`IndexMap`) so output-directory assembly and diagnostics
/// are deterministic across runs on the same input.
#[derive(Debug, Default)]
pub struct FunctionTable {
    functions: IndexMap<String, Function>,
}

impl FunctionTable {
    pub fn new() -> Self {
        FunctionTable { functions: IndexMap::new() }
    }

    /// Registers a function. Returns `false` if the qualified path is
    /// already taken (spec §3: "second declaration is an error").
    pub fn declare(&mut self, function: Function) -> bool {
        let key = join_path(function.qualified_path());
        if self.functions.contains_key(&key) {
            return false;
        }
        self.functions.insert(key, function);
        true
    }

    pub fn get(&self, path: &[String]) -> Option<&Function> {
        self.functions.get(&join_path(path))
    }

    pub fn iter(&self) -> impl Iterator<Item = &Function> {
        self.functions.values()
    }

    pub fn len(&self) -> usize {
        self.functions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.functions.is_empty()
    }
}

/// Per-file mapping from import alias to qualified path (spec §3).
#[derive(Debug, Default)]
pub struct ImportMap {
    aliases: IndexMap<String, Vec<String>>,
}

impl ImportMap {
    pub fn new() -> Self {
        ImportMap { aliases: IndexMap::new() }
    }

    pub fn declare(&mut self, alias: String, path: Vec<String>) -> bool {
        if self.aliases.contains_key(&alias) {
            return false;
        }
        self.aliases.insert(alias, path);
        true
    }

    pub fn resolve(&self, alias: &str) -> Option<&[String]> {
        self.aliases.get(alias).map(|p| p.as_slice())
    }

    pub fn contains(&self, alias: &str) -> bool {
        self.aliases.contains_key(alias)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cubent_util::{FileId, Position};

    fn span() -> Span {
        Span::point(FileId(0), Position::new(0, 0, 0))
    }

    #[test]
    fn function_table_rejects_duplicate_path() {
        let mut table = FunctionTable::new();
        let f = Function::User {
            qualified_path: vec!["n".into(), "f".into()],
            parameters: vec![],
            return_type: CubentType::Void,
            body: vec![],
        };
        assert!(table.declare(f.clone()));
        assert!(!table.declare(f));
    }

    #[test]
    fn function_table_looks_up_by_path() {
        let mut table = FunctionTable::new();
        table.declare(Function::User {
            qualified_path: vec!["n".into(), "f".into()],
            parameters: vec![],
            return_type: CubentType::Void,
            body: vec![],
        });
        assert!(table.get(&["n".to_string(), "f".to_string()]).is_some());
        assert!(table.get(&["n".to_string(), "g".to_string()]).is_none());
    }

    #[test]
    fn import_map_rejects_duplicate_alias() {
        let mut imports = ImportMap::new();
        assert!(imports.declare("a".into(), vec!["n".into(), "a".into()]));
        assert!(!imports.declare("a".into(), vec!["n".into(), "b".into()]));
    }

    #[test]
    fn command_span_accessor() {
        let cmd = Command::GetVar { span: span(), name: "x".into() };
        assert_eq!(cmd.span(), span());
    }
}
