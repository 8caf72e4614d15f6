use crate::backends::js::js_class::implementation_name;
use crate::backends::js::js_emission::JsLines;
use crate::backends::js::{Enclosing, JsEmitter, LoweringContext, declared_identifier};
use crate::compiler_frontend::compiler_errors::CompilerError;
use crate::compiler_frontend::ir::ir_nodes::Node;
use crate::compiler_frontend::ir::ir_schema::NodeKind;
use crate::{return_schema_error, return_unsupported_error};

/// Marks a function as written for the JavaScript target. Accepted and otherwise ignored.
pub(crate) const INLINE_TARGET_DECORATOR: &str = "JavaScript";

/// Marks a method as callable on the class without an instance.
pub(crate) const STATIC_MEMBER_DECORATOR: &str = "staticmethod";

/// Parameters of a function or lambda, with defaults already lowered.
struct LoweredParameters<'n> {
    names: Vec<&'n str>,
    defaults: Vec<(&'n str, String)>,
}

impl<'n> LoweredParameters<'n> {
    /// Substitutions applied only when the caller left the argument out.
    fn default_substitutions(&self) -> JsLines {
        let mut lines = JsLines::new();

        for (name, value) in &self.defaults {
            let name = declared_identifier(name);
            lines.line(format!("if (typeof {} === \"undefined\") {{", name));
            lines.nested(JsLines::single(format!("{} = {};", name, value)));
            lines.line("}");
        }

        lines
    }
}

impl<'a> JsEmitter<'a> {
    pub(crate) fn lower_function_def(
        &self,
        context: &mut LoweringContext,
        enclosing: Enclosing<'_>,
        definition: &Node,
    ) -> Result<JsLines, CompilerError> {
        let name = definition.str("name")?;
        let is_static = read_decorators(definition, enclosing)?;
        let parameters = self.read_parameters(
            context,
            enclosing,
            NodeKind::FunctionDef,
            definition.node("params")?,
        )?;

        let Some(class_name) = enclosing.class_name else {
            context.scopes.bind(name);

            let mut lines = JsLines::single(format!(
                "function {}({}) {{",
                declared_identifier(name),
                join_parameters(&parameters.names)
            ));
            lines.nested(self.lower_function_body(context, &parameters, None, definition)?);
            lines.line("}");
            return Ok(lines);
        };

        let implementation = implementation_name(class_name);

        let (receiver, emitted) = if is_static {
            (None, parameters.names.as_slice())
        } else {
            match parameters.names.split_first() {
                Some((receiver, rest)) => (Some(*receiver), rest),
                None => return Err(CompilerError::missing_receiver(class_name, name)),
            }
        };

        let mut lines = JsLines::single(format!(
            "{}.prototype.{} = function({}) {{",
            implementation,
            name,
            join_parameters(emitted)
        ));
        lines.nested(self.lower_function_body(context, &parameters, receiver, definition)?);
        lines.line("};");

        if is_static {
            lines.line(format!(
                "{}.{} = {}.prototype.{};",
                declared_identifier(class_name),
                name,
                implementation,
                name
            ));
        }

        Ok(lines)
    }

    pub(crate) fn lower_lambda(
        &self,
        context: &mut LoweringContext,
        enclosing: Enclosing<'_>,
        lambda: &Node,
    ) -> Result<String, CompilerError> {
        let parameters =
            self.read_parameters(context, enclosing, NodeKind::Lambda, lambda.node("params")?)?;

        context
            .scopes
            .enter_function(parameters.names.iter().copied());
        let body = self.lower_expr(context, Enclosing::module(), lambda.node("body")?);
        context.scopes.exit_function()?;

        let mut lines = JsLines::single(format!(
            "(function({}) {{",
            join_parameters(&parameters.names)
        ));
        lines.nested(parameters.default_substitutions());
        lines.nested(JsLines::single(format!("return {};", body?)));
        lines.line("})");

        Ok(lines.into_single_line())
    }

    /// Lowers a body inside its own scope frame seeded with the parameters.
    /// The frame is popped even when lowering the body fails.
    fn lower_function_body(
        &self,
        context: &mut LoweringContext,
        parameters: &LoweredParameters<'_>,
        receiver: Option<&str>,
        definition: &Node,
    ) -> Result<JsLines, CompilerError> {
        let statements = definition.list("body")?;
        context
            .scopes
            .enter_function(parameters.names.iter().copied());

        let mut lines = JsLines::new();
        if let Some(receiver) = receiver {
            lines.line(format!("var {} = this;", declared_identifier(receiver)));
        }
        lines.extend(parameters.default_substitutions());

        let body = self.lower_block(context, Enclosing::module(), statements);
        context.scopes.exit_function()?;

        lines.extend(body?);
        Ok(lines)
    }

    /// Defaults are lowered in the defining scope, before the function's own frame exists.
    fn read_parameters<'n>(
        &self,
        context: &mut LoweringContext,
        enclosing: Enclosing<'_>,
        owner: NodeKind,
        parameters: &'n Node,
    ) -> Result<LoweredParameters<'n>, CompilerError> {
        if !parameters.is_null("vararg")? {
            return_unsupported_error!(owner, "star arguments (*args) are not supported");
        }

        if !parameters.is_null("kwarg")? {
            return_unsupported_error!(owner, "keyword arguments (**kwargs) are not supported");
        }

        let args = parameters.list("args")?;
        let defaults = parameters.list("defaults")?;

        if defaults.len() > args.len() {
            return_schema_error!(format!(
                "Parameters declare {} defaults for only {} arguments",
                defaults.len(),
                args.len()
            ));
        }

        let mut names = Vec::with_capacity(args.len());
        for arg in args {
            if arg.kind() != NodeKind::Name {
                return_unsupported_error!(
                    owner,
                    "tuples in argument lists are not supported",
                    arg.position()
                );
            }
            names.push(arg.str("id")?);
        }

        // Defaults align to the trailing arguments
        let first_defaulted = names.len() - defaults.len();
        let mut lowered = Vec::with_capacity(defaults.len());
        for (name, default) in names[first_defaulted..].iter().zip(defaults) {
            lowered.push((*name, self.lower_expr(context, enclosing, default)?));
        }

        Ok(LoweredParameters {
            names,
            defaults: lowered,
        })
    }
}

/// Returns whether the definition is a static member.
pub(crate) fn read_decorators(
    definition: &Node,
    enclosing: Enclosing<'_>,
) -> Result<bool, CompilerError> {
    let mut is_static = false;

    for decorator in definition.list("decorators")? {
        let marker = match decorator.kind() {
            NodeKind::Name => decorator.str("id")?,
            _ => "",
        };

        match marker {
            INLINE_TARGET_DECORATOR => {}
            STATIC_MEMBER_DECORATOR if enclosing.class_name.is_some() => is_static = true,
            STATIC_MEMBER_DECORATOR => return_unsupported_error!(
                NodeKind::FunctionDef,
                "staticmethod is only allowed on methods",
                decorator.position()
            ),
            _ => return_unsupported_error!(
                NodeKind::FunctionDef,
                "decorators other than JavaScript and staticmethod are not supported",
                decorator.position()
            ),
        }
    }

    Ok(is_static)
}

fn join_parameters(names: &[&str]) -> String {
    names
        .iter()
        .map(|name| declared_identifier(name))
        .collect::<Vec<_>>()
        .join(", ")
}
