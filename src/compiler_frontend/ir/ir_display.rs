//! Diagnostic tree printer. Not used by code generation.

use crate::compiler_frontend::ir::ir_nodes::{Field, Node, Scalar};
use std::fmt::{Display, Formatter, Result as FmtResult};

const INDENT: &str = "  ";

impl Display for Scalar {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            Scalar::Str(value) => write!(f, "{:?}", value),
            Scalar::Int(value) => write!(f, "{}", value),
            Scalar::Float(value) => write!(f, "{:?}", value),
            Scalar::Bool(value) => write!(f, "{}", value),
        }
    }
}

impl Display for Node {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        write_node(f, self, 0)
    }
}

fn write_node(f: &mut Formatter<'_>, node: &Node, depth: usize) -> FmtResult {
    write!(f, "{}:", node.kind().name())?;

    if let Some(position) = node.position() {
        write!(f, " @{}:{}", position.line, position.column)?;
    }

    let field_indent = INDENT.repeat(depth + 1);

    for (name, value) in node.fields() {
        write!(f, "\n{}{}", field_indent, name)?;

        match value {
            Field::Null => write!(f, " = null")?,
            Field::Scalar(scalar) => write!(f, " = {}", scalar)?,
            Field::Node(child) => {
                write!(f, " = ")?;
                write_node(f, child, depth + 1)?;
            }
            Field::Names(names) => write!(f, " = [{}]", names.join(", "))?,
            Field::List(children) => {
                if children.is_empty() {
                    write!(f, " []")?;
                    continue;
                }

                write!(f, " [")?;
                let child_indent = INDENT.repeat(depth + 2);
                for child in children {
                    write!(f, "\n{}", child_indent)?;
                    write_node(f, child, depth + 2)?;
                }
                write!(f, "\n{}]", field_indent)?;
            }
        }
    }

    Ok(())
}
