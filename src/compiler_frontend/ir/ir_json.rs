//! Loads a tree from the front-end's JSON document.
//!
//! Each node is a JSON object with a `"kind"` key and one key per field.
//! `lineno` and `col_offset` are read as the node's source position rather than as fields.

use crate::compiler_frontend::compiler_errors::CompilerError;
use crate::compiler_frontend::ir::ir_nodes::{Field, Node, Scalar, SourcePosition};
use crate::compiler_frontend::ir::ir_schema::NodeKind;
use crate::return_schema_error;
use serde_json::{Map, Value};

const KIND_KEY: &str = "kind";
const LINE_KEY: &str = "lineno";
const COLUMN_KEY: &str = "col_offset";

pub fn parse_tree(source: &str) -> Result<Node, CompilerError> {
    let document: Value = serde_json::from_str(source).map_err(|error| {
        CompilerError::syntax_error(
            format!("Malformed tree document: {}", error),
            Some(SourcePosition {
                line: error.line(),
                column: error.column(),
            }),
        )
    })?;

    node_from_json(&document)
}

pub fn node_from_json(value: &Value) -> Result<Node, CompilerError> {
    let Value::Object(object) = value else {
        return_schema_error!(format!("Expected a node object, found {}", describe(value)));
    };

    let Some(kind_name) = object.get(KIND_KEY).and_then(Value::as_str) else {
        return_schema_error!("Node object is missing its \"kind\" string");
    };

    let Some(kind) = NodeKind::from_name(kind_name) else {
        return_schema_error!(format!("Unknown node kind '{}'", kind_name));
    };

    let position = read_position(object);

    let mut fields = Vec::with_capacity(object.len());
    for (key, value) in object {
        if key == KIND_KEY || key == LINE_KEY || key == COLUMN_KEY {
            continue;
        }

        let field = field_from_json(value).map_err(|error| error.with_position(position))?;
        fields.push((key.as_str(), field));
    }

    Node::construct(kind, fields)
        .map(|node| node.at(position))
        .map_err(|error| error.with_position(position))
}

fn field_from_json(value: &Value) -> Result<Field, CompilerError> {
    match value {
        Value::Null => Ok(Field::Null),
        Value::Bool(value) => Ok(Field::Scalar(Scalar::Bool(*value))),
        Value::Number(number) => match number.as_i64() {
            Some(integer) => Ok(Field::Scalar(Scalar::Int(integer))),
            None => match number.as_f64() {
                Some(float) => Ok(Field::Scalar(Scalar::Float(float))),
                None => return_schema_error!(format!("Number {} is out of range", number)),
            },
        },
        Value::String(value) => Ok(Field::Scalar(Scalar::Str(value.to_owned()))),
        Value::Object(_) => Ok(Field::Node(Box::new(node_from_json(value)?))),
        Value::Array(items) => {
            if !items.is_empty() && items.iter().all(Value::is_string) {
                let names = items
                    .iter()
                    .filter_map(Value::as_str)
                    .map(str::to_owned)
                    .collect();
                return Ok(Field::Names(names));
            }

            let nodes = items
                .iter()
                .map(node_from_json)
                .collect::<Result<Vec<_>, _>>()?;
            Ok(Field::List(nodes))
        }
    }
}

fn read_position(object: &Map<String, Value>) -> Option<SourcePosition> {
    let line = object.get(LINE_KEY).and_then(Value::as_u64)?;
    let column = object
        .get(COLUMN_KEY)
        .and_then(Value::as_u64)
        .unwrap_or_default();

    Some(SourcePosition {
        line: line as usize,
        column: column as usize,
    })
}

fn describe(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
