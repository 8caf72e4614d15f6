use crate::backends::js::js_emission::JsLines;
use crate::backends::js::js_runtime::{
    contains, dict_literal, get_item, list_literal, slice_descriptor, string_literal,
    structural_eq, truthy, tuple_literal,
};
use crate::backends::js::js_statement::IteratorLoop;
use crate::backends::js::{Enclosing, JsEmitter, LoweringContext};
use crate::compiler_frontend::compiler_errors::CompilerError;
use crate::compiler_frontend::ir::ir_nodes::{Node, Scalar};
use crate::compiler_frontend::ir::ir_schema::NodeKind;
use crate::{return_schema_error, return_unsupported_error};

impl<'a> JsEmitter<'a> {
    pub(crate) fn lower_expr(
        &self,
        context: &mut LoweringContext,
        enclosing: Enclosing<'_>,
        expression: &Node,
    ) -> Result<String, CompilerError> {
        self.lower_expr_kind(context, enclosing, expression)
            .map_err(|error| error.with_position(expression.position()))
    }

    fn lower_expr_kind(
        &self,
        context: &mut LoweringContext,
        enclosing: Enclosing<'_>,
        expression: &Node,
    ) -> Result<String, CompilerError> {
        match expression.kind() {
            NodeKind::Name => Ok(context.resolve_name(expression.str("id")?)),

            NodeKind::Num => lower_number(expression.scalar("n")?),

            NodeKind::Str => Ok(string_literal(&escape_js_string(expression.str("s")?))),

            NodeKind::BoolOp => {
                let operator = match expression.str("op")? {
                    "And" => "&&",
                    "Or" => "||",
                    other => return_unsupported_error!(
                        NodeKind::BoolOp,
                        format!("unknown boolean operator '{}'", other)
                    ),
                };

                let values = self.lower_exprs(context, enclosing, expression.list("values")?)?;
                Ok(values
                    .iter()
                    .map(|value| format!("({})", value))
                    .collect::<Vec<_>>()
                    .join(operator))
            }

            NodeKind::BinOp => {
                let left = self.lower_expr(context, enclosing, expression.node("left")?)?;
                let right = self.lower_expr(context, enclosing, expression.node("right")?)?;
                combine_binary(expression.str("op")?, &left, &right)
            }

            NodeKind::UnaryOp => {
                let operator = match expression.str("op")? {
                    "Invert" => "~",
                    "Not" => "!",
                    "UAdd" => "+",
                    "USub" => "-",
                    other => return_unsupported_error!(
                        NodeKind::UnaryOp,
                        format!("unknown unary operator '{}'", other)
                    ),
                };

                let operand = self.lower_expr(context, enclosing, expression.node("operand")?)?;
                Ok(format!("{}({})", operator, operand))
            }

            NodeKind::IfExp => {
                let test = self.lower_expr(context, enclosing, expression.node("test")?)?;
                let body = self.lower_expr(context, enclosing, expression.node("body")?)?;
                let orelse = self.lower_expr(context, enclosing, expression.node("orelse")?)?;
                Ok(format!("({} ? ({}) : ({}))", truthy(&test), body, orelse))
            }

            NodeKind::Compare => self.lower_compare(context, enclosing, expression),

            NodeKind::Call => self.lower_call(context, enclosing, expression),

            NodeKind::Attribute => {
                let value = self.lower_receiver(context, enclosing, expression.node("value")?)?;
                Ok(format!("{}.{}", value, expression.str("attr")?))
            }

            NodeKind::Subscript => {
                let value = self.lower_receiver(context, enclosing, expression.node("value")?)?;
                let key = self.lower_expr(context, enclosing, expression.node("slice")?)?;
                Ok(get_item(&value, &key))
            }

            NodeKind::Index => self.lower_expr(context, enclosing, expression.node("value")?),

            NodeKind::Slice => {
                let mut bounds = Vec::with_capacity(3);
                for field in ["lower", "upper", "step"] {
                    let bound = match expression.opt_node(field)? {
                        Some(bound) => Some(self.lower_expr(context, enclosing, bound)?),
                        None => None,
                    };
                    bounds.push(bound);
                }

                let step = bounds.pop().flatten();
                let upper = bounds.pop().flatten();
                let lower = bounds.pop().flatten();
                Ok(slice_descriptor(lower, upper, step))
            }

            NodeKind::List => {
                let elements = self.lower_exprs(context, enclosing, expression.list("elts")?)?;
                Ok(list_literal(&elements))
            }

            NodeKind::Tuple => {
                let elements = self.lower_exprs(context, enclosing, expression.list("elts")?)?;
                Ok(tuple_literal(&elements))
            }

            NodeKind::Dict => {
                let keys = expression.list("keys")?;
                let values = expression.list("values")?;
                if keys.len() != values.len() {
                    return_schema_error!(format!(
                        "Dict has {} keys but {} values",
                        keys.len(),
                        values.len()
                    ));
                }

                let mut entries = Vec::with_capacity(keys.len());
                for (key, value) in keys.iter().zip(values) {
                    let key = self.lower_expr(context, enclosing, key)?;
                    let value = self.lower_expr(context, enclosing, value)?;
                    entries.push((key, value));
                }

                Ok(dict_literal(&entries))
            }

            NodeKind::Lambda => self.lower_lambda(context, enclosing, expression),

            NodeKind::ListComp => self.lower_list_comp(context, enclosing, expression),

            NodeKind::GeneratorExp | NodeKind::Yield | NodeKind::Repr => {
                return_unsupported_error!(
                    expression.kind(),
                    "this expression is explicitly rejected by the JavaScript backend"
                )
            }

            other => return_unsupported_error!(other, "no expression lowering rule exists"),
        }
    }

    pub(crate) fn lower_exprs(
        &self,
        context: &mut LoweringContext,
        enclosing: Enclosing<'_>,
        expressions: &[Node],
    ) -> Result<Vec<String>, CompilerError> {
        expressions
            .iter()
            .map(|expression| self.lower_expr(context, enclosing, expression))
            .collect()
    }

    /// Lowers the object of a member access, subscript or call.
    /// Operator expressions are grouped so the access applies to the whole value.
    pub(crate) fn lower_receiver(
        &self,
        context: &mut LoweringContext,
        enclosing: Enclosing<'_>,
        expression: &Node,
    ) -> Result<String, CompilerError> {
        let lowered = self.lower_expr(context, enclosing, expression)?;
        let loose = matches!(
            expression.kind(),
            NodeKind::BinOp
                | NodeKind::BoolOp
                | NodeKind::UnaryOp
                | NodeKind::Compare
                | NodeKind::Num
        );

        Ok(grouped(lowered, loose))
    }

    fn lower_compare(
        &self,
        context: &mut LoweringContext,
        enclosing: Enclosing<'_>,
        expression: &Node,
    ) -> Result<String, CompilerError> {
        let operators = expression.names("ops")?;
        let comparators = expression.list("comparators")?;

        let ([operator], [comparator]) = (operators.as_slice(), comparators) else {
            return_unsupported_error!(
                NodeKind::Compare,
                "chained comparisons are not supported, compare one pair at a time"
            );
        };

        let left_operand = expression.node("left")?;
        let left = self.lower_expr(context, enclosing, left_operand)?;

        let native = match *operator {
            "Eq" | "NotEq" => {
                let right = self.lower_expr(context, enclosing, comparator)?;
                let equal = structural_eq(&left, &right);
                return Ok(if *operator == "Eq" { equal } else { format!("!({})", equal) });
            }
            "In" | "NotIn" => {
                let container = self.lower_receiver(context, enclosing, comparator)?;
                let member = contains(&container, &left);
                return Ok(if *operator == "In" { member } else { format!("!({})", member) });
            }
            "Is" => "===",
            "IsNot" => "!==",
            "Lt" => "<",
            "LtE" => "<=",
            "Gt" => ">",
            "GtE" => ">=",
            other => return_unsupported_error!(
                NodeKind::Compare,
                format!("unknown comparison operator '{}'", other)
            ),
        };

        let right = self.lower_expr(context, enclosing, comparator)?;
        Ok(format!(
            "{} {} {}",
            grouped(left, binds_below_comparison(left_operand)),
            native,
            grouped(right, binds_below_comparison(comparator))
        ))
    }

    fn lower_call(
        &self,
        context: &mut LoweringContext,
        enclosing: Enclosing<'_>,
        expression: &Node,
    ) -> Result<String, CompilerError> {
        if !expression.is_null("starargs")? || !expression.is_null("kwargs")? {
            return_unsupported_error!(
                NodeKind::Call,
                "star-args and star-kwargs calls are not supported"
            );
        }

        let function = self.lower_receiver(context, enclosing, expression.node("func")?)?;
        let args = self.lower_exprs(context, enclosing, expression.list("args")?)?;
        let keywords = expression.list("keywords")?;

        if keywords.is_empty() {
            return Ok(format!("{}({})", function, args.join(", ")));
        }

        let mut pairs = Vec::with_capacity(keywords.len());
        for keyword in keywords {
            let value = self.lower_expr(context, enclosing, keyword.node("value")?)?;
            pairs.push(format!("{}: {}", keyword.str("arg")?, value));
        }

        Ok(format!(
            "{}.args([{}], {{{}}})",
            function,
            args.join(", "),
            pairs.join(", ")
        ))
    }

    /// Lowers to an immediately invoked function that fills a runtime list
    /// through the same iterator protocol as a `for` loop.
    fn lower_list_comp(
        &self,
        context: &mut LoweringContext,
        enclosing: Enclosing<'_>,
        expression: &Node,
    ) -> Result<String, CompilerError> {
        let generators = expression.list("generators")?;
        if generators.is_empty() {
            return_schema_error!("List comprehension has no generators");
        }

        context.scopes.enter_function(std::iter::empty());
        let body = self.comprehension_body(context, enclosing, expression, generators);
        context.scopes.exit_function()?;

        let mut lines = JsLines::single("(function() {");
        lines.nested(body?);
        lines.line("})()");
        Ok(lines.into_single_line())
    }

    fn comprehension_body(
        &self,
        context: &mut LoweringContext,
        enclosing: Enclosing<'_>,
        expression: &Node,
        generators: &[Node],
    ) -> Result<JsLines, CompilerError> {
        let accumulator = context.next_temp("comp");

        let mut body = JsLines::single(format!("var {} = {};", accumulator, list_literal(&[])));
        body.extend(self.comprehension_loops(
            context,
            enclosing,
            generators,
            expression.node("elt")?,
            &accumulator,
        )?);
        body.line(format!("return {};", accumulator));

        Ok(body)
    }

    fn comprehension_loops(
        &self,
        context: &mut LoweringContext,
        enclosing: Enclosing<'_>,
        generators: &[Node],
        element: &Node,
        accumulator: &str,
    ) -> Result<JsLines, CompilerError> {
        let Some((generator, rest)) = generators.split_first() else {
            let value = self.lower_expr(context, enclosing, element)?;
            return Ok(JsLines::single(format!("{}.append({});", accumulator, value)));
        };

        let target = generator.node("target")?;
        if target.kind() != NodeKind::Name {
            return_unsupported_error!(
                NodeKind::ListComp,
                "tuple-decomposition comprehension targets are not supported",
                generator.position()
            );
        }

        let iterable = self.lower_expr(context, enclosing, generator.node("iter")?)?;
        let iteration = IteratorLoop::begin(context, target.str("id")?, &iterable);

        let mut body = JsLines::new();
        for condition in generator.list("ifs")? {
            let condition = self.lower_expr(context, enclosing, condition)?;
            body.line(format!("if (!({})) {{", truthy(&condition)));
            body.nested(JsLines::single("continue;"));
            body.line("}");
        }
        body.extend(self.comprehension_loops(context, enclosing, rest, element, accumulator)?);

        Ok(iteration.finish(None, body))
    }
}

fn grouped(lowered: String, needed: bool) -> String {
    if needed {
        format!("({})", lowered)
    } else {
        lowered
    }
}

/// Bitwise operators and `&&`/`||` bind more loosely than a JS comparison.
fn binds_below_comparison(operand: &Node) -> bool {
    matches!(
        operand.kind(),
        NodeKind::BinOp | NodeKind::BoolOp | NodeKind::Compare
    )
}

fn lower_number(value: &Scalar) -> Result<String, CompilerError> {
    match value {
        Scalar::Int(value) => Ok(value.to_string()),

        Scalar::Float(value) => {
            if value.is_nan() {
                Ok("NaN".to_owned())
            } else if value.is_infinite() {
                if value.is_sign_positive() {
                    Ok("Infinity".to_owned())
                } else {
                    Ok("-Infinity".to_owned())
                }
            } else {
                Ok(format!("{:?}", value))
            }
        }

        other => return_schema_error!(format!("Num literal must hold a number, found {}", other)),
    }
}

/// Binary operators map to native operators except `**` and `//`,
/// which go through the math library.
pub(crate) fn combine_binary(
    operator: &str,
    left: &str,
    right: &str,
) -> Result<String, CompilerError> {
    match operator {
        "Pow" => Ok(format!("Math.pow({}, {})", left, right)),
        "FloorDiv" => Ok(format!("Math.floor(({})/({}))", left, right)),
        other => match native_binary_operator(other) {
            Some(native) => Ok(format!("({}){}({})", left, native, right)),
            None => return_unsupported_error!(
                NodeKind::BinOp,
                format!("unknown binary operator '{}'", other)
            ),
        },
    }
}

pub(crate) fn native_binary_operator(operator: &str) -> Option<&'static str> {
    match operator {
        "Add" => Some("+"),
        "Sub" => Some("-"),
        "Mult" => Some("*"),
        "Div" => Some("/"),
        "Mod" => Some("%"),
        "LShift" => Some("<<"),
        "RShift" => Some(">>"),
        "BitOr" => Some("|"),
        "BitXor" => Some("^"),
        "BitAnd" => Some("&"),
        _ => None,
    }
}

pub(crate) fn escape_js_string(value: &str) -> String {
    let mut escaped = String::from("\"");

    for ch in value.chars() {
        match ch {
            '\\' => escaped.push_str("\\\\"),
            '"' => escaped.push_str("\\\""),
            '\n' => escaped.push_str("\\n"),
            '\r' => escaped.push_str("\\r"),
            '\t' => escaped.push_str("\\t"),
            // `\0` followed by a digit would read as an octal escape
            '\0' => escaped.push_str("\\x00"),
            control if control.is_control() || matches!(control, '\u{2028}' | '\u{2029}') => {
                escaped.push_str(&format!("\\u{:04X}", control as u32));
            }
            normal => escaped.push(normal),
        }
    }

    escaped.push('"');
    escaped
}
