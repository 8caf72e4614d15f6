use crate::backends::js::js_emission::JsLines;
use crate::backends::js::js_expr::{combine_binary, native_binary_operator};
use crate::backends::js::js_runtime::{
    assertion_error, del_item, get_item, iteration_exhausted, print_call, set_item,
    to_iterator, truthy,
};
use crate::backends::js::{Enclosing, JsEmitter, LoweringContext, declared_identifier};
use crate::codegen_log;
use crate::compiler_frontend::compiler_errors::CompilerError;
use crate::compiler_frontend::ir::ir_nodes::{Field, Node, Scalar};
use crate::compiler_frontend::ir::ir_schema::NodeKind;
use crate::compiler_frontend::scope_tracker::Binding;
use crate::{return_schema_error, return_unsupported_error};

impl<'a> JsEmitter<'a> {
    pub(crate) fn lower_block(
        &self,
        context: &mut LoweringContext,
        enclosing: Enclosing<'_>,
        body: &[Node],
    ) -> Result<JsLines, CompilerError> {
        let mut lines = JsLines::new();

        for statement in body {
            if self.config.emit_locations {
                if let Some(position) = statement.position() {
                    lines.line(format!("// line {}", position.line));
                }
            }

            lines.extend(self.lower_statement(context, enclosing, statement)?);
        }

        Ok(lines)
    }

    pub(crate) fn lower_statement(
        &self,
        context: &mut LoweringContext,
        enclosing: Enclosing<'_>,
        statement: &Node,
    ) -> Result<JsLines, CompilerError> {
        codegen_log!(Blue "Lowering {}", statement.kind().name());

        self.lower_statement_kind(context, enclosing, statement)
            .map_err(|error| error.with_position(statement.position()))
    }

    fn lower_statement_kind(
        &self,
        context: &mut LoweringContext,
        enclosing: Enclosing<'_>,
        statement: &Node,
    ) -> Result<JsLines, CompilerError> {
        match statement.kind() {
            NodeKind::FunctionDef => self.lower_function_def(context, enclosing, statement),

            NodeKind::ClassDef => self.lower_class_def(context, statement),

            NodeKind::Return => match statement.opt_node("value")? {
                Some(value) => {
                    let value = self.lower_expr(context, enclosing, value)?;
                    Ok(JsLines::single(format!("return {};", value)))
                }
                None => Ok(JsLines::single("return;")),
            },

            NodeKind::Assign => self.lower_assign(context, enclosing, statement),

            NodeKind::AugAssign => self.lower_aug_assign(context, enclosing, statement),

            NodeKind::Delete => {
                let mut lines = JsLines::new();
                for target in statement.list("targets")? {
                    lines.extend(self.lower_delete_target(context, enclosing, target)?);
                }
                Ok(lines)
            }

            NodeKind::Print => {
                if !statement.is_null("dest")? {
                    return_unsupported_error!(
                        NodeKind::Print,
                        "redirected print (>>) is not supported"
                    );
                }

                if matches!(
                    statement.field("nl")?,
                    Field::Scalar(Scalar::Bool(false)) | Field::Scalar(Scalar::Int(0))
                ) {
                    return_unsupported_error!(
                        NodeKind::Print,
                        "print with a trailing comma is not supported"
                    );
                }

                let values = self.lower_exprs(context, enclosing, statement.list("values")?)?;
                Ok(JsLines::single(print_call(&values)))
            }

            NodeKind::For => self.lower_for(context, enclosing, statement),

            NodeKind::While => self.lower_while(context, enclosing, statement),

            NodeKind::If => self.lower_if(context, enclosing, statement),

            NodeKind::Raise => {
                let Some(exception) = statement.opt_node("type")? else {
                    return_unsupported_error!(NodeKind::Raise, "bare re-raise is not supported");
                };

                if !statement.is_null("inst")? || !statement.is_null("tback")? {
                    return_unsupported_error!(
                        NodeKind::Raise,
                        "only the single-argument form 'raise E' is supported"
                    );
                }

                let exception = self.lower_expr(context, enclosing, exception)?;
                Ok(JsLines::single(format!("throw {};", exception)))
            }

            NodeKind::Assert => {
                let test = self.lower_expr(context, enclosing, statement.node("test")?)?;
                let message = match statement.opt_node("msg")? {
                    Some(message) => Some(self.lower_expr(context, enclosing, message)?),
                    None => None,
                };

                let mut lines = JsLines::single(format!("if (!({})) {{", truthy(&test)));
                lines.nested(JsLines::single(format!(
                    "throw {};",
                    assertion_error(message.as_deref())
                )));
                lines.line("}");
                Ok(lines)
            }

            NodeKind::Global => {
                context.scopes.declare_global(statement.names("names")?);
                Ok(JsLines::new())
            }

            NodeKind::Expr => {
                let value = self.lower_expr(context, enclosing, statement.node("value")?)?;
                Ok(JsLines::single(format!("{};", value)))
            }

            NodeKind::Pass => Ok(JsLines::single("/* pass */")),
            NodeKind::Break => Ok(JsLines::single("break;")),
            NodeKind::Continue => Ok(JsLines::single("continue;")),

            NodeKind::With
            | NodeKind::TryExcept
            | NodeKind::TryFinally
            | NodeKind::Import
            | NodeKind::ImportFrom
            | NodeKind::Exec => return_unsupported_error!(
                statement.kind(),
                "this statement is explicitly rejected by the JavaScript backend"
            ),

            other => return_unsupported_error!(other, "no statement lowering rule exists"),
        }
    }

    fn lower_assign(
        &self,
        context: &mut LoweringContext,
        enclosing: Enclosing<'_>,
        statement: &Node,
    ) -> Result<JsLines, CompilerError> {
        let targets = statement.list("targets")?;
        let value = self.lower_expr(context, enclosing, statement.node("value")?)?;

        match targets {
            [] => return_schema_error!("Assignment has no targets"),

            [target] => self.bind_target(context, enclosing, target, value),

            // a = b = value evaluates value once
            _ => {
                let temp = context.next_temp("assign");
                let mut lines = JsLines::single(format!("var {} = {};", temp, value));
                for target in targets {
                    lines.extend(self.bind_target(context, enclosing, target, temp.to_owned())?);
                }
                Ok(lines)
            }
        }
    }

    /// Binds an already lowered value to one assignment target.
    pub(crate) fn bind_target(
        &self,
        context: &mut LoweringContext,
        enclosing: Enclosing<'_>,
        target: &Node,
        value: String,
    ) -> Result<JsLines, CompilerError> {
        match target.kind() {
            NodeKind::Name => {
                let id = target.str("id")?;
                let binding = context.scopes.bind(id);
                Ok(JsLines::single(format!(
                    "{}{} = {};",
                    binding.prefix(),
                    declared_identifier(id),
                    value
                )))
            }

            NodeKind::Attribute => {
                let object = self.lower_receiver(context, enclosing, target.node("value")?)?;
                Ok(JsLines::single(format!(
                    "{}.{} = {};",
                    object,
                    target.str("attr")?,
                    value
                )))
            }

            NodeKind::Subscript => {
                let container = self.lower_receiver(context, enclosing, target.node("value")?)?;
                let key = self.lower_expr(context, enclosing, target.node("slice")?)?;
                Ok(JsLines::single(format!(
                    "{};",
                    set_item(&container, &key, &value)
                )))
            }

            NodeKind::Tuple | NodeKind::List => {
                let temp = context.next_temp("unpack");
                let mut lines = JsLines::single(format!("var {} = {};", temp, value));

                for (position, element) in target.list("elts")?.iter().enumerate() {
                    let extracted = get_item(&temp, &position.to_string());
                    lines.extend(self.bind_target(context, enclosing, element, extracted)?);
                }

                Ok(lines)
            }

            other => return_unsupported_error!(
                other,
                "cannot be used as an assignment target",
                target.position()
            ),
        }
    }

    fn lower_aug_assign(
        &self,
        context: &mut LoweringContext,
        enclosing: Enclosing<'_>,
        statement: &Node,
    ) -> Result<JsLines, CompilerError> {
        let operator = statement.str("op")?;
        let target = statement.node("target")?;
        let value = self.lower_expr(context, enclosing, statement.node("value")?)?;

        match target.kind() {
            NodeKind::Name => {
                let name = context.resolve_name(target.str("id")?);
                Ok(JsLines::single(update_in_place(&name, operator, &value)?))
            }

            NodeKind::Attribute => {
                let object = self.lower_receiver(context, enclosing, target.node("value")?)?;
                let attribute = target.str("attr")?;

                if native_binary_operator(operator).is_some() {
                    let place = format!("{}.{}", object, attribute);
                    return Ok(JsLines::single(update_in_place(&place, operator, &value)?));
                }

                // The object is evaluated once even though the place is read and written
                let temp = context.next_temp("target");
                let place = format!("{}.{}", temp, attribute);
                let mut lines = JsLines::single(format!("var {} = {};", temp, object));
                lines.line(update_in_place(&place, operator, &value)?);
                Ok(lines)
            }

            NodeKind::Subscript => {
                let container = self.lower_receiver(context, enclosing, target.node("value")?)?;
                let key = self.lower_expr(context, enclosing, target.node("slice")?)?;

                let container_temp = context.next_temp("target");
                let key_temp = context.next_temp("key");
                let current = get_item(&container_temp, &key_temp);
                let updated = combine_binary(operator, &current, &value)?;

                let mut lines =
                    JsLines::single(format!("var {} = {};", container_temp, container));
                lines.line(format!("var {} = {};", key_temp, key));
                lines.line(format!(
                    "{};",
                    set_item(&container_temp, &key_temp, &updated)
                ));
                Ok(lines)
            }

            other => return_unsupported_error!(
                other,
                "cannot be the target of an augmented assignment",
                target.position()
            ),
        }
    }

    fn lower_delete_target(
        &self,
        context: &mut LoweringContext,
        enclosing: Enclosing<'_>,
        target: &Node,
    ) -> Result<JsLines, CompilerError> {
        match target.kind() {
            NodeKind::Name => Ok(JsLines::single(format!(
                "{} = undefined;",
                context.resolve_name(target.str("id")?)
            ))),

            NodeKind::Attribute => {
                let object = self.lower_receiver(context, enclosing, target.node("value")?)?;
                Ok(JsLines::single(format!(
                    "delete {}.{};",
                    object,
                    target.str("attr")?
                )))
            }

            NodeKind::Subscript => {
                let container = self.lower_receiver(context, enclosing, target.node("value")?)?;
                let key = self.lower_expr(context, enclosing, target.node("slice")?)?;
                Ok(JsLines::single(format!("{};", del_item(&container, &key))))
            }

            NodeKind::Tuple | NodeKind::List => {
                let mut lines = JsLines::new();
                for element in target.list("elts")? {
                    lines.extend(self.lower_delete_target(context, enclosing, element)?);
                }
                Ok(lines)
            }

            other => return_unsupported_error!(other, "cannot be deleted", target.position()),
        }
    }

    fn lower_if(
        &self,
        context: &mut LoweringContext,
        enclosing: Enclosing<'_>,
        statement: &Node,
    ) -> Result<JsLines, CompilerError> {
        let condition = self.lower_expr(context, enclosing, statement.node("cond")?)?;
        let mut lines = JsLines::single(format!("if ({}) {{", truthy(&condition)));
        lines.nested(self.lower_block(context, enclosing, statement.list("body")?)?);

        let mut orelse = statement.list("orelse")?;
        loop {
            match orelse {
                [] => break,

                // elif chains flatten into else-if
                [branch] if branch.kind() == NodeKind::If => {
                    let condition = self
                        .lower_expr(context, enclosing, branch.node("cond")?)
                        .map_err(|error| error.with_position(branch.position()))?;
                    lines.line(format!("}} else if ({}) {{", truthy(&condition)));
                    lines.nested(self.lower_block(context, enclosing, branch.list("body")?)?);
                    orelse = branch.list("orelse")?;
                }

                _ => {
                    lines.line("} else {");
                    lines.nested(self.lower_block(context, enclosing, orelse)?);
                    break;
                }
            }
        }

        lines.line("}");
        Ok(lines)
    }

    fn lower_while(
        &self,
        context: &mut LoweringContext,
        enclosing: Enclosing<'_>,
        statement: &Node,
    ) -> Result<JsLines, CompilerError> {
        let condition = self.lower_expr(context, enclosing, statement.node("cond")?)?;
        let orelse = statement.list("orelse")?;

        if orelse.is_empty() {
            let mut lines = JsLines::single(format!("while ({}) {{", truthy(&condition)));
            lines.nested(self.lower_block(context, enclosing, statement.list("body")?)?);
            lines.line("}");
            return Ok(lines);
        }

        let completed = context.next_temp("else");

        let mut exit = JsLines::single(format!("{} = true;", completed));
        exit.line("break;");

        let mut body = JsLines::single(format!("if (!({})) {{", truthy(&condition)));
        body.nested(exit);
        body.line("}");
        body.extend(self.lower_block(context, enclosing, statement.list("body")?)?);

        let mut lines = JsLines::single(format!("var {} = false;", completed));
        lines.line("while (true) {");
        lines.nested(body);
        lines.line("}");
        lines.extend(self.lower_loop_else(context, enclosing, &completed, orelse)?);
        Ok(lines)
    }

    fn lower_for(
        &self,
        context: &mut LoweringContext,
        enclosing: Enclosing<'_>,
        statement: &Node,
    ) -> Result<JsLines, CompilerError> {
        let target = statement.node("target")?;
        if target.kind() != NodeKind::Name {
            return_unsupported_error!(
                NodeKind::For,
                "tuple-decomposition loop targets are not supported",
                target.position()
            );
        }

        let iterable = self.lower_expr(context, enclosing, statement.node("iter")?)?;
        let orelse = statement.list("orelse")?;

        let completed = if orelse.is_empty() {
            None
        } else {
            Some(context.next_temp("else"))
        };

        let iteration = IteratorLoop::begin(context, target.str("id")?, &iterable);
        let body = self.lower_block(context, enclosing, statement.list("body")?)?;

        let mut lines = JsLines::new();
        if let Some(completed) = &completed {
            lines.line(format!("var {} = false;", completed));
        }
        lines.extend(iteration.finish(completed.as_deref(), body));

        if let Some(completed) = &completed {
            lines.extend(self.lower_loop_else(context, enclosing, completed, orelse)?);
        }

        Ok(lines)
    }

    /// The `else` clause of a loop, run only when the loop ended without `break`.
    fn lower_loop_else(
        &self,
        context: &mut LoweringContext,
        enclosing: Enclosing<'_>,
        completed: &str,
        orelse: &[Node],
    ) -> Result<JsLines, CompilerError> {
        let mut lines = JsLines::single(format!("if ({}) {{", completed));
        lines.nested(self.lower_block(context, enclosing, orelse)?);
        lines.line("}");
        Ok(lines)
    }
}

/// Explicit iterator protocol shared by `for` loops and comprehensions.
///
/// The iterator is requested inside a guarded attempt; the runtime's StopIteration
/// ends the loop normally and any other exception propagates.
pub(crate) struct IteratorLoop {
    iterator: String,
    exception: String,
    target: String,
    prelude: JsLines,
}

impl IteratorLoop {
    /// Allocates the loop temporaries and binds the target in the current frame.
    /// Must run before the loop body is lowered so the body sees the target as bound.
    pub(crate) fn begin(context: &mut LoweringContext, target_id: &str, iterable: &str) -> Self {
        let iterator = context.next_temp("iter");
        let exception = context.next_temp("exc");
        let target = declared_identifier(target_id);

        let mut prelude = JsLines::single(format!(
            "var {} = {};",
            iterator,
            to_iterator(iterable)
        ));

        if context.scopes.bind(target_id) == Binding::Declare {
            prelude.line(format!("var {};", target));
        }

        IteratorLoop {
            iterator,
            exception,
            target,
            prelude,
        }
    }

    /// `completed` is set to true when the iterator is exhausted.
    pub(crate) fn finish(self, completed: Option<&str>, body: JsLines) -> JsLines {
        let mut exhausted = JsLines::new();
        if let Some(completed) = completed {
            exhausted.line(format!("{} = true;", completed));
        }
        exhausted.line("break;");

        let mut handler = JsLines::single(format!(
            "if ({}) {{",
            iteration_exhausted(&self.exception)
        ));
        handler.nested(exhausted);
        handler.line("} else {");
        handler.nested(JsLines::single(format!("throw {};", self.exception)));
        handler.line("}");

        let mut step = JsLines::single("try {");
        step.nested(JsLines::single(format!(
            "{} = {}.next();",
            self.target, self.iterator
        )));
        step.line(format!("}} catch ({}) {{", self.exception));
        step.nested(handler);
        step.line("}");
        step.extend(body);

        let mut lines = self.prelude;
        lines.line("while (true) {");
        lines.nested(step);
        lines.line("}");
        lines
    }
}

fn update_in_place(place: &str, operator: &str, value: &str) -> Result<String, CompilerError> {
    match native_binary_operator(operator) {
        Some(native) => Ok(format!("{} {}= {};", place, native, value)),
        None => Ok(format!(
            "{} = {};",
            place,
            combine_binary(operator, place, value)?
        )),
    }
}
