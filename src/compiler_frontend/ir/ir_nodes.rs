//! Tree nodes
//!
//! A `Node` is a tagged value whose live fields are exactly the fields its kind declares.
//! Construction validates the field set against the kind's schema and fills defaults,
//! so no field is ever "missing" once a node exists. Nodes are immutable after construction.

use crate::compiler_frontend::compiler_errors::CompilerError;
use crate::compiler_frontend::ir::ir_schema::{FieldDefault, NodeKind};
use crate::return_schema_error;

/// Position of the source construct a node was produced from (1-based line, 0-based column).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SourcePosition {
    pub line: usize,
    pub column: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Scalar {
    Str(String),
    Int(i64),
    Float(f64),
    Bool(bool),
}

#[derive(Debug, Clone, PartialEq)]
pub enum Field {
    Null,
    Scalar(Scalar),
    Node(Box<Node>),
    List(Vec<Node>),
    Names(Vec<String>),
}

impl Field {
    fn shape(&self) -> &'static str {
        match self {
            Field::Null => "null",
            Field::Scalar(_) => "a scalar",
            Field::Node(_) => "a node",
            Field::List(_) => "a node sequence",
            Field::Names(_) => "a name sequence",
        }
    }
}

impl From<&str> for Field {
    fn from(value: &str) -> Self {
        Field::Scalar(Scalar::Str(value.to_owned()))
    }
}

impl From<String> for Field {
    fn from(value: String) -> Self {
        Field::Scalar(Scalar::Str(value))
    }
}

impl From<i64> for Field {
    fn from(value: i64) -> Self {
        Field::Scalar(Scalar::Int(value))
    }
}

impl From<f64> for Field {
    fn from(value: f64) -> Self {
        Field::Scalar(Scalar::Float(value))
    }
}

impl From<bool> for Field {
    fn from(value: bool) -> Self {
        Field::Scalar(Scalar::Bool(value))
    }
}

impl From<Node> for Field {
    fn from(value: Node) -> Self {
        Field::Node(Box::new(value))
    }
}

impl From<Option<Node>> for Field {
    fn from(value: Option<Node>) -> Self {
        match value {
            Some(node) => Field::Node(Box::new(node)),
            None => Field::Null,
        }
    }
}

impl From<Vec<Node>> for Field {
    fn from(value: Vec<Node>) -> Self {
        Field::List(value)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Node {
    kind: NodeKind,
    // One slot per declared field, in schema order
    fields: Vec<Field>,
    position: Option<SourcePosition>,
}

impl Node {
    /// Builds a node, rejecting unknown or duplicated field names and
    /// requiring every field that has no default.
    pub fn construct<S, I>(kind: NodeKind, fields: I) -> Result<Node, CompilerError>
    where
        S: AsRef<str>,
        I: IntoIterator<Item = (S, Field)>,
    {
        let schema = kind.fields();
        let mut slots: Vec<Option<Field>> = vec![None; schema.len()];

        for (name, value) in fields {
            let name = name.as_ref();
            let Some((index, _)) = kind.field_spec(name) else {
                return_schema_error!(format!(
                    "Node '{}' does not take field '{}'",
                    kind.name(),
                    name
                ));
            };

            if slots[index].is_some() {
                return_schema_error!(format!(
                    "Node '{}' was given field '{}' more than once",
                    kind.name(),
                    name
                ));
            }

            slots[index] = Some(value);
        }

        let mut resolved = Vec::with_capacity(schema.len());
        for (spec, slot) in schema.iter().zip(slots) {
            let value = match (slot, spec.default) {
                (Some(value), _) => value,
                (None, FieldDefault::EmptyList) => Field::List(Vec::new()),
                (None, FieldDefault::Null) => Field::Null,
                (None, FieldDefault::Required) => {
                    return_schema_error!(format!(
                        "Node '{}' requires field '{}'",
                        kind.name(),
                        spec.name
                    ));
                }
            };
            resolved.push(value);
        }

        Ok(Node {
            kind,
            fields: resolved,
            position: None,
        })
    }

    pub fn at(mut self, position: Option<SourcePosition>) -> Self {
        self.position = position;
        self
    }

    pub fn kind(&self) -> NodeKind {
        self.kind
    }

    pub fn position(&self) -> Option<SourcePosition> {
        self.position
    }

    /// Declared fields paired with their current values, in schema order.
    pub fn fields(&self) -> impl Iterator<Item = (&'static str, &Field)> {
        self.kind
            .fields()
            .iter()
            .map(|spec| spec.name)
            .zip(self.fields.iter())
    }

    pub fn field(&self, name: &str) -> Result<&Field, CompilerError> {
        match self.kind.field_spec(name) {
            Some((index, _)) => Ok(&self.fields[index]),
            None => Err(CompilerError::schema_error(format!(
                "Node '{}' has no field '{}'",
                self.kind.name(),
                name
            ))
            .with_position(self.position)),
        }
    }

    pub fn node(&self, name: &str) -> Result<&Node, CompilerError> {
        match self.field(name)? {
            Field::Node(node) => Ok(node),
            other => Err(self.shape_error(name, "a node", other)),
        }
    }

    pub fn opt_node(&self, name: &str) -> Result<Option<&Node>, CompilerError> {
        match self.field(name)? {
            Field::Null => Ok(None),
            Field::Node(node) => Ok(Some(node)),
            other => Err(self.shape_error(name, "a node or null", other)),
        }
    }

    pub fn list(&self, name: &str) -> Result<&[Node], CompilerError> {
        match self.field(name)? {
            Field::List(nodes) => Ok(nodes),
            other => Err(self.shape_error(name, "a node sequence", other)),
        }
    }

    pub fn scalar(&self, name: &str) -> Result<&Scalar, CompilerError> {
        match self.field(name)? {
            Field::Scalar(scalar) => Ok(scalar),
            other => Err(self.shape_error(name, "a scalar", other)),
        }
    }

    pub fn str(&self, name: &str) -> Result<&str, CompilerError> {
        match self.field(name)? {
            Field::Scalar(Scalar::Str(value)) => Ok(value),
            other => Err(self.shape_error(name, "a string", other)),
        }
    }

    pub fn opt_str(&self, name: &str) -> Result<Option<&str>, CompilerError> {
        match self.field(name)? {
            Field::Null => Ok(None),
            Field::Scalar(Scalar::Str(value)) => Ok(Some(value)),
            other => Err(self.shape_error(name, "a string or null", other)),
        }
    }

    /// An empty node sequence reads as an empty name list, since the two are
    /// indistinguishable in the input document.
    pub fn names(&self, name: &str) -> Result<Vec<&str>, CompilerError> {
        match self.field(name)? {
            Field::Names(names) => Ok(names.iter().map(String::as_str).collect()),
            Field::List(nodes) if nodes.is_empty() => Ok(Vec::new()),
            other => Err(self.shape_error(name, "a name sequence", other)),
        }
    }

    pub fn is_null(&self, name: &str) -> Result<bool, CompilerError> {
        Ok(matches!(self.field(name)?, Field::Null))
    }

    fn shape_error(&self, name: &str, expected: &str, found: &Field) -> CompilerError {
        CompilerError::schema_error(format!(
            "Field '{}' of '{}' should hold {}, found {}",
            name,
            self.kind.name(),
            expected,
            found.shape()
        ))
        .with_position(self.position)
    }
}
