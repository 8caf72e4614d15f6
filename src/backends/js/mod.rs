//! JavaScript backend.
//!
//! Lowers a validated tree into prototype-based JavaScript that runs on top of the
//! `py_builtins` runtime library. The emitter itself holds only configuration:
//! every piece of mutable state (scope frames, the class registry, the temporary
//! counter) lives in a `LoweringContext` passed explicitly to each lowering call,
//! so independent modules can be lowered in parallel with separate contexts.

mod js_class;
pub mod js_emission;
mod js_expr;
mod js_function;
pub mod js_runtime;
mod js_statement;

#[cfg(test)]
mod tests {
    mod js_class_tests;
    mod js_expr_tests;
    mod js_function_tests;
    mod js_statement_tests;
    mod js_support;
    mod js_syntax_tests;
}

use crate::backends::js::js_emission::assemble;
use crate::compiler_frontend::class_linearizer::ClassRegistry;
use crate::compiler_frontend::compiler_errors::CompilerError;
use crate::compiler_frontend::ir::ir_nodes::Node;
use crate::compiler_frontend::ir::ir_schema::NodeKind;
use crate::compiler_frontend::scope_tracker::ScopeTracker;
use crate::return_unsupported_error;
use serde::Deserialize;

/// Configuration for JS lowering.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct JsLoweringConfig {
    /// Emit human-readable formatting.
    pub pretty: bool,

    /// Emit source location comments.
    pub emit_locations: bool,
}

impl Default for JsLoweringConfig {
    fn default() -> Self {
        JsLoweringConfig {
            pretty: true,
            emit_locations: false,
        }
    }
}

/// Result of lowering a tree to JavaScript.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JsModule {
    /// Complete JS source code.
    pub source: String,

    /// Every class compiled, in definition order, with its resolution order.
    pub class_orders: Vec<(String, Vec<String>)>,
}

pub fn lower_module_to_js(
    root: &Node,
    config: &JsLoweringConfig,
) -> Result<JsModule, CompilerError> {
    let emitter = JsEmitter::new(config);
    let mut context = LoweringContext::new();
    let source = emitter.lower_root(&mut context, root)?;

    Ok(JsModule {
        source,
        class_orders: context.class_orders,
    })
}

/// Mutable state of one compilation unit.
#[derive(Debug, Default)]
pub(crate) struct LoweringContext {
    pub(crate) scopes: ScopeTracker,
    pub(crate) classes: ClassRegistry,
    pub(crate) class_orders: Vec<(String, Vec<String>)>,
    temp_counter: usize,
}

impl LoweringContext {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Name a read of `name` is emitted under.
    /// A user binding shadows the runtime builtin of the same name.
    pub(crate) fn resolve_name(&self, name: &str) -> String {
        if self.scopes.is_visible(name) {
            declared_identifier(name)
        } else {
            js_name(name)
        }
    }

    /// Unique temporary name of the form `__<purpose>_<n>`.
    pub(crate) fn next_temp(&mut self, purpose: &str) -> String {
        let temp = format!("__{}_{}", purpose, self.temp_counter);
        self.temp_counter += 1;
        temp
    }
}

/// The definition a node is lowered inside of.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub(crate) struct Enclosing<'a> {
    pub(crate) class_name: Option<&'a str>,
}

impl<'a> Enclosing<'a> {
    pub(crate) fn module() -> Self {
        Enclosing { class_name: None }
    }

    pub(crate) fn class(class_name: &'a str) -> Self {
        Enclosing {
            class_name: Some(class_name),
        }
    }
}

pub(crate) struct JsEmitter<'a> {
    pub(crate) config: &'a JsLoweringConfig,
}

impl<'a> JsEmitter<'a> {
    pub(crate) fn new(config: &'a JsLoweringConfig) -> Self {
        Self { config }
    }

    fn lower_root(
        &self,
        context: &mut LoweringContext,
        root: &Node,
    ) -> Result<String, CompilerError> {
        match root.kind() {
            NodeKind::Module | NodeKind::Interactive => {
                let lines = self.lower_block(context, Enclosing::module(), root.list("body")?)?;
                Ok(assemble(&lines, self.config.pretty))
            }

            NodeKind::Expression => {
                self.lower_expr(context, Enclosing::module(), root.node("body")?)
            }

            other => return_unsupported_error!(
                other,
                "not a compilation root, expected Module, Interactive or Expression",
                root.position()
            ),
        }
    }
}

/// Name an unbound read is emitted under.
/// Runtime-supplied names resolve against the runtime namespace.
fn js_name(name: &str) -> String {
    match js_runtime::builtin_name(name) {
        Some(builtin) => builtin,
        None => declared_identifier(name),
    }
}

/// Name of something the generated code declares itself (functions, classes, parameters).
pub(crate) fn declared_identifier(name: &str) -> String {
    if name == js_runtime::RUNTIME_NAMESPACE {
        return js_runtime::SHADOWED_NAMESPACE.to_owned();
    }

    let identifier = sanitize_identifier(name);

    if is_js_reserved(&identifier) {
        format!("_{}", identifier)
    } else {
        identifier
    }
}

fn sanitize_identifier(raw: &str) -> String {
    let mut result = String::new();

    for (index, ch) in raw.chars().enumerate() {
        let is_valid = if index == 0 {
            ch == '_' || ch == '$' || ch.is_ascii_alphabetic()
        } else {
            ch == '_' || ch == '$' || ch.is_ascii_alphanumeric()
        };

        if is_valid {
            result.push(ch);
        } else {
            result.push('_');
        }
    }

    if result.is_empty() {
        "_value".to_owned()
    } else if result
        .chars()
        .next()
        .is_some_and(|first| first.is_ascii_digit())
    {
        format!("_{}", result)
    } else {
        result
    }
}

fn is_js_reserved(name: &str) -> bool {
    matches!(
        name,
        "break"
            | "case"
            | "catch"
            | "class"
            | "const"
            | "continue"
            | "debugger"
            | "default"
            | "delete"
            | "do"
            | "else"
            | "export"
            | "extends"
            | "finally"
            | "for"
            | "function"
            | "if"
            | "import"
            | "in"
            | "instanceof"
            | "new"
            | "return"
            | "super"
            | "switch"
            | "this"
            | "throw"
            | "try"
            | "typeof"
            | "var"
            | "void"
            | "while"
            | "with"
            | "yield"
            | "enum"
            | "implements"
            | "interface"
            | "let"
            | "package"
            | "private"
            | "protected"
            | "public"
            | "static"
            | "await"
            | "undefined"
            | "null"
            | "true"
            | "false"
            | "NaN"
            | "Infinity"
            | "eval"
            | "arguments"
    )
}
