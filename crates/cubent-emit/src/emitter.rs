//! Type-check-and-lower pass: walks IR, type-checks it against the live
//! [`ScopeTree`] and [`FunctionTable`], and emits `.mcfunction` text (spec
//! §4.3, §4.4). Every generated command line is ported verbatim from
//! `original_source/src/compiler.py::write_commands` /
//! `write_type_conversion` / `write_internal_function`.

use std::fmt::Write as _;

use cubent_par::{Command, CubentType, Function, FunctionTable, Literal, Parameters};
use cubent_util::{CompileError, Handler, Span};

use crate::helper::HelperNamer;
use crate::scope::{ScopeId, ScopeTree};

const STORAGE: &str = "cubent:storage";
const SCOREBOARD: &str = "cubent.scoreboard";

/// One user-defined function's generated `.mcfunction` text.
pub struct EmittedFunction {
    pub qualified_path: Vec<String>,
    pub text: String,
}

/// A helper function synthesized for a `DO_IF` block, written under the
/// reserved internal functions directory (spec §4.4).
pub struct InternalFunction {
    pub name: String,
    pub text: String,
}

pub struct EmitOutput {
    pub functions: Vec<EmittedFunction>,
    pub internal_functions: Vec<InternalFunction>,
}

type EResult<T> = Result<T, ()>;

pub struct Emitter<'a> {
    build_uuid: String,
    functions: &'a FunctionTable,
    handler: &'a Handler,
    namer: HelperNamer,
    internal: Vec<InternalFunction>,
}

impl<'a> Emitter<'a> {
    pub fn new(build_uuid: impl Into<String>, functions: &'a FunctionTable, handler: &'a Handler) -> Self {
        let build_uuid = build_uuid.into();
        let namer = HelperNamer::seeded(&build_uuid);
        Emitter { build_uuid, functions, handler, namer, internal: Vec::new() }
    }

    /// Type-checks and emits every `Function::User` in the table. External
    /// (`mcfunction`) declarations produce no generated file of their own —
    /// they only ever appear as a `CALL` target.
    pub fn emit_all(mut self) -> EResult<EmitOutput> {
        let mut functions = Vec::new();
        for function in self.functions.iter() {
            if let Function::User { qualified_path, parameters, body, .. } = function {
                let (mut tree, root) = ScopeTree::new();
                let text = self.write_commands(qualified_path, body, parameters, &mut tree, root)?;
                functions.push(EmittedFunction { qualified_path: qualified_path.clone(), text });
            }
        }
        Ok(EmitOutput { functions, internal_functions: self.internal })
    }

    fn function_storage(&self, path: &[String]) -> String {
        let namespace = path[..path.len() - 1].join(".");
        format!("{}.{}:{}", self.build_uuid, namespace, path.last().expect("qualified path is non-empty"))
    }

    /// Undefined variable/function/property and duplicate-declaration
    /// failures (spec §7 ScopeError).
    fn scope_error<T>(&self, span: Span, message: impl Into<String>) -> EResult<T> {
        self.handler.report(CompileError::Scope { span, message: message.into() });
        Err(())
    }

    /// Incompatible-operand, bad-assignment, and non-convertible-argument
    /// failures (spec §7 TypeError).
    fn type_error<T>(&self, span: Span, message: impl Into<String>) -> EResult<T> {
        self.handler.report(CompileError::Type { span, message: message.into() });
        Err(())
    }

    fn format_literal(ty: CubentType, literal: &Literal) -> String {
        match literal {
            Literal::Boolean(v) => if *v { "true".to_string() } else { "false".to_string() },
            Literal::Byte(v) => format!("{v}B"),
            Literal::Short(v) => format!("{v}S"),
            Literal::Int(v) => v.to_string(),
            Literal::Long(v) => format!("{v}L"),
            Literal::Float(v) => format!("{v}F"),
            Literal::Double(v) => v.to_string(),
            Literal::Str(s) => {
                let escaped = s.replace('\\', "\\\\");
                let single = escaped.find('\'');
                let double = escaped.find('"');
                let use_double = match single {
                    None => false,
                    Some(sp) => match double {
                        None => true,
                        Some(dp) => sp > dp,
                    },
                };
                let _ = ty;
                if use_double {
                    format!("\"{}\"", escaped.replace('"', "\\\""))
                } else {
                    format!("'{}'", escaped.replace('\'', "\\'"))
                }
            }
        }
    }

    fn write_commands(
        &mut self,
        path: &[String],
        commands: &[Command],
        parameters: &Parameters,
        tree: &mut ScopeTree,
        scope: ScopeId,
    ) -> EResult<String> {
        let fs = self.function_storage(path);
        let mut out = String::new();
        let mut stack: Vec<CubentType> = Vec::new();

        let _ = write!(
            out,
            "scoreboard objectives add {SCOREBOARD} dummy\n\
             data modify storage {fs} Stack set value []\n\
             execute unless data storage {fs} Variables run data modify storage {fs} Variables set value {{}}\n"
        );

        for command in commands {
            match command {
                Command::Load { span: _, ty, literal } => {
                    stack.push(*ty);
                    let raw = Self::format_literal(*ty, literal);
                    let _ = write!(out, "data modify storage {fs} Stack append value {{Value:{raw}}}\n");
                }

                Command::DeclareVar { span, name } => {
                    let ty = stack.pop().expect("Parser only emits DECLARE_VAR after its initializer");
                    if !tree.declare(scope, name, ty) {
                        return self.scope_error(*span, format!("Can't declare existing variable '{name}'"));
                    }
                    // DECLARE_VAR folds into SET_VAR's write so the first
                    // assignment actually lands in storage (spec §9).
                    let _ = write!(
                        out,
                        "data modify storage {fs} Variables.{name} set from storage {fs} Stack[-1]\n\
                         data remove storage {fs} Stack[-1]\n"
                    );
                }

                Command::SetVar { span, name } => {
                    let object_type = stack.pop().expect("Parser only emits SET_VAR after its rhs");
                    let Some(variable_type) = tree.resolve(scope, name) else {
                        return self.scope_error(*span, format!("Undefined variable '{name}'"));
                    };
                    if variable_type != object_type {
                        return self
                            .type_error(*span, format!("Can't put {object_type} object to {variable_type} variable '{name}'"));
                    }
                    let _ = write!(
                        out,
                        "data modify storage {fs} Variables.{name} set from storage {fs} Stack[-1]\n\
                         data remove storage {fs} Stack[-1]\n"
                    );
                }

                Command::GetVar { span, name } => {
                    let Some(variable_type) = tree.resolve(scope, name) else {
                        return self.scope_error(*span, format!("Undefined variable '{name}'"));
                    };
                    stack.push(variable_type);
                    let _ = write!(out, "data modify storage {fs} Stack append from storage {fs} Variables.{name}\n");
                }

                // No CubentType ever declares properties (spec §4.3's property
                // table is empty for every built-in type), so both GET_PROP
                // and SET_PROP are permanently unreachable success paths.
                Command::GetProp { span, name } => {
                    stack.pop();
                    return self.scope_error(*span, format!("Undefined property '{name}' of object"));
                }
                Command::SetProp { span, name } => {
                    let object_type = stack.pop().expect("Parser only emits SET_PROP after a container chain");
                    let _ = object_type;
                    return self.scope_error(*span, format!("Undefined property '{name}' of object"));
                }

                Command::GetArg { span, index } => {
                    let Some(ty) = parameters.get(*index).map(|(_, t)| *t) else {
                        return self.scope_error(*span, format!("Undefined argument index {index}"));
                    };
                    stack.push(ty);
                    let _ = write!(out, "data modify storage {fs} Stack append from storage {STORAGE} Arguments[{index}]\n");
                }

                Command::Call { span, path: target_path, argc } => {
                    let Some(target) = self.functions.get(target_path) else {
                        return self.scope_error(*span, format!("Undefined function '{}'", target_path.join(".")));
                    };
                    let target_parameters = target.parameters().clone();
                    let return_type = target.return_type();
                    if target_parameters.len() != *argc {
                        return self.type_error(
                            *span,
                            format!(
                                "Function '{}' expects {} argument(s), got {argc}",
                                target_path.join("."),
                                target_parameters.len()
                            ),
                        );
                    }

                    let _ = write!(out, "data modify storage {STORAGE} Arguments set value []\n");

                    for (parameter_name, parameter_type) in &target_parameters {
                        let argument_type = stack.pop().expect("CALL's argc matches the operand count");
                        self.write_type_conversion(argument_type, *parameter_type, &fs, &mut out).ok_or(())
                            .map_err(|_| {
                                self.handler.report(CompileError::Type {
                                    span: *span,
                                    message: format!(
                                        "Expected argument '{parameter_name}' of type {parameter_type}, but got {argument_type}"
                                    ),
                                });
                            })?;
                        let _ = write!(
                            out,
                            "data modify storage {STORAGE} Arguments append from storage {fs} Stack[-1]\n\
                             data remove storage {fs} Stack[-1]\n"
                        );
                    }

                    match target {
                        Function::User { qualified_path, .. } => {
                            let namespace = qualified_path[..qualified_path.len() - 1].join(".");
                            let name = qualified_path.last().unwrap();
                            let _ = write!(out, "function {namespace}:{name}\n");
                        }
                        Function::External { engine_location, .. } => {
                            let _ = write!(out, "function {engine_location}\n");
                        }
                    }

                    if return_type != CubentType::Void {
                        stack.push(return_type);
                        let _ = write!(
                            out,
                            "data modify storage {fs} Stack append from storage {STORAGE} Result\n"
                        );
                    }
                }

                Command::DoIf { span, block } => {
                    let object_type = stack.pop().expect("Parser only emits DO_IF after its condition");
                    self.write_type_conversion(object_type, CubentType::Boolean, &fs, &mut out).ok_or(()).map_err(|_| {
                        self.handler.report(CompileError::Type { span: *span, message: format!("Can't convert {object_type} to Boolean") });
                    })?;

                    let child_scope = tree.child(scope);
                    let name = self.namer.next();
                    let text = self.write_commands(path, block, parameters, tree, child_scope)?;
                    self.internal.push(InternalFunction { name: name.clone(), text });
                    let internal_location = format!("{}:{}", self.build_uuid, name);

                    let _ = write!(
                        out,
                        "execute store result score 1 {SCOREBOARD} run data get storage {fs} Stack[-1].Value\n\
                         data remove storage {fs} Stack[-1]\n\
                         execute if score 1 {SCOREBOARD} matches 1 run function {internal_location}\n"
                    );
                }

                Command::Add { span } | Command::Sub { span } | Command::Mul { span } | Command::Div { span } => {
                    let second_type = stack.pop().expect("binops always run after both operands");
                    let first_type = stack.pop().expect("binops always run after both operands");

                    if !first_type.is_integral() || !second_type.is_integral() {
                        let verb = match command {
                            Command::Add { .. } => "add",
                            Command::Sub { .. } => "subtract",
                            Command::Mul { .. } => "multiply",
                            Command::Div { .. } => "divide",
                            _ => unreachable!(),
                        };
                        return self.type_error(*span, format!("Can't {verb} {second_type} and {first_type}"));
                    }

                    stack.push(CubentType::Int);

                    let op = match command {
                        Command::Add { .. } => "+=",
                        Command::Sub { .. } => "-=",
                        Command::Mul { .. } => "*=",
                        Command::Div { .. } => "/=",
                        _ => unreachable!(),
                    };
                    let first_name = first_type.name().to_lowercase();
                    let _ = write!(
                        out,
                        "execute store result score 1 {SCOREBOARD} run data get storage {fs} Stack[-1].Value\n\
                         data remove storage {fs} Stack[-1]\n\
                         execute store result score 2 {SCOREBOARD} run data get storage {fs} Stack[-1].Value\n\
                         data remove storage {fs} Stack[-1]\n\
                         scoreboard players operation 1 {SCOREBOARD} {op} 2 {SCOREBOARD}\n\
                         data modify storage {fs} Stack append value {{}}\n\
                         execute store result storage {fs} Stack[-1].Value {first_name} 1.0 run scoreboard players get 1 {SCOREBOARD}\n"
                    );
                }

                Command::Eq { .. } | Command::Neq { .. } => {
                    stack.pop();
                    stack.pop();
                    stack.push(CubentType::Boolean);

                    // Inverted data-move success flag: a successful move
                    // means the two values differed, so EQ treats "success"
                    // as false and NEQ treats it as true.
                    let (eq_branch, neq_branch) =
                        if matches!(command, Command::Eq { .. }) { ("0", "1") } else { ("1", "0") };
                    let _ = write!(
                        out,
                        "execute store success score 1 {SCOREBOARD} run data modify storage {fs} Stack[-1] set from storage {fs} Stack[-2]\n\
                         data remove storage {fs} Stack[-1]\n\
                         execute if score 1 {SCOREBOARD} matches {eq_branch} run data modify storage {fs} Stack[-1].Value set value true\n\
                         execute if score 1 {SCOREBOARD} matches {neq_branch} run data modify storage {fs} Stack[-1].Value set value false\n"
                    );
                }

                Command::Or { .. } | Command::And { .. } => {
                    stack.pop();
                    stack.pop();
                    stack.push(CubentType::Boolean);

                    let op = if matches!(command, Command::Or { .. }) { "+=" } else { "*=" };
                    let _ = write!(
                        out,
                        "execute store result score 1 {SCOREBOARD} run data get storage {fs} Stack[-1].Value\n\
                         data remove storage {fs} Stack[-1]\n\
                         execute store result score 2 {SCOREBOARD} run data get storage {fs} Stack[-1].Value\n\
                         data remove storage {fs} Stack[-1]\n\
                         scoreboard players operation 1 {SCOREBOARD} {op} 2 {SCOREBOARD}\n\
                         data modify storage {fs} Stack append value {{}}\n\
                         execute if score 1 {SCOREBOARD} matches 1.. run data modify storage {fs} Stack[-1].Value set value true\n\
                         execute if score 1 {SCOREBOARD} matches ..0 run data modify storage {fs} Stack[-1].Value set value false\n"
                    );
                }
            }
        }

        Ok(out)
    }

    /// Emits a conversion of `Stack[-1]` from `current` to `target`.
    /// Returns `None` when no conversion exists (spec §4.3's table).
    fn write_type_conversion(&self, current: CubentType, target: CubentType, fs: &str, out: &mut String) -> Option<()> {
        if current == target || current == CubentType::Any || target == CubentType::Any {
            return Some(());
        }

        let source_is_numericish = current.is_numeric() || current == CubentType::Boolean;
        if source_is_numericish && target.is_numeric() {
            let target_name = target.name().to_lowercase();
            let _ = write!(out, "execute store result storage {fs} Stack[-1].Value {target_name} 1.0 run data get storage {fs} Stack[-1].Value\n");
            return Some(());
        }
        if source_is_numericish && target == CubentType::Boolean {
            let _ = write!(
                out,
                "execute store result score 1 {SCOREBOARD} run data get storage {fs} Stack[-1].Value\n\
                 execute if score 1 {SCOREBOARD} matches 1.. run data modify storage {fs} Stack[-1].Value set value true\n\
                 execute if score 1 {SCOREBOARD} matches ..0 run data modify storage {fs} Stack[-1].Value set value false\n"
            );
            return Some(());
        }

        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cubent_par::{FunctionTable, Parser};
    use cubent_util::FileId;

    fn emit(source: &str) -> (EmitOutput, bool) {
        let handler = Handler::new();
        let mut functions = FunctionTable::new();
        {
            let mut parser = Parser::new(source, FileId(0), &handler);
            parser.parse_file(&mut functions).unwrap();
        }
        assert!(!handler.has_errors(), "parse errors: {:?}", handler.diagnostics());

        let emitter = Emitter::new("buildid", &functions, &handler);
        match emitter.emit_all() {
            Ok(output) => (output, handler.has_errors()),
            Err(()) => (EmitOutput { functions: vec![], internal_functions: vec![] }, true),
        }
    }

    #[test]
    fn hello_world_emits_prologue_and_add_and_set_var() {
        let (output, had_errors) =
            emit("namespace demo { function main(): Void { var x = 1 + 2; } }");
        assert!(!had_errors);
        assert_eq!(output.functions.len(), 1);
        let text = &output.functions[0].text;
        assert!(text.contains("scoreboard objectives add cubent.scoreboard dummy"));
        assert!(text.contains("Stack append value {Value:1}"));
        assert!(text.contains("scoreboard players operation 1 cubent.scoreboard += 2 cubent.scoreboard"));
        assert!(text.contains("Variables.x set from storage"));
    }

    #[test]
    fn undefined_variable_is_a_scope_error() {
        let handler = Handler::new();
        let mut functions = FunctionTable::new();
        {
            let mut parser = Parser::new("namespace n { function f(): Void { x = 1; } }", FileId(0), &handler);
            let _ = parser.parse_file(&mut functions);
        }
        let emitter = Emitter::new("buildid", &functions, &handler);
        let _ = emitter.emit_all();
        assert!(handler.has_errors());
        assert!(handler.diagnostics()[0].message.contains("Undefined variable"));
    }

    #[test]
    fn assigning_wrong_type_is_a_type_error() {
        let handler = Handler::new();
        let mut functions = FunctionTable::new();
        {
            let mut parser = Parser::new(
                "namespace n { function f(): Void { var x = 1; x = \"s\"; } }",
                FileId(0),
                &handler,
            );
            let _ = parser.parse_file(&mut functions);
        }
        let emitter = Emitter::new("buildid", &functions, &handler);
        let _ = emitter.emit_all();
        assert!(handler.has_errors());
        assert!(handler.diagnostics()[0].message.contains("Can't put"));
    }

    #[test]
    fn do_if_produces_an_internal_helper_function() {
        let (output, had_errors) =
            emit("namespace n { function f(): Void { if (true) { var x = 1; } } }");
        assert!(!had_errors);
        assert_eq!(output.internal_functions.len(), 1);
        assert!(output.functions[0].text.contains("run function buildid:"));
    }

    #[test]
    fn property_access_always_errors() {
        let (_, had_errors) = emit("namespace n { function f(): Void { a.b = 1; } }");
        assert!(had_errors);
    }

    #[test]
    fn call_to_undeclared_function_is_an_error() {
        let (_, had_errors) = emit(
            "namespace n { import n.missing as m; function f(): Void { m(); } }",
        );
        assert!(had_errors);
    }

    #[test]
    fn nested_if_variable_does_not_leak_to_outer_scope() {
        let (_, had_errors) = emit(
            "namespace n { function f(): Void { if (true) { var y = 1; } y = 2; } }",
        );
        assert!(had_errors);
    }
}
