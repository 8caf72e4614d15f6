//! Node kinds and their field schemas.
//!
//! Every kind declares a fixed, ordered set of fields. A field is either required
//! or defaults to an empty sequence or a null reference when the front-end omits it.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldDefault {
    Required,
    EmptyList,
    Null,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldSpec {
    pub name: &'static str,
    pub default: FieldDefault,
}

macro_rules! define_node_kinds {
    ($($kind:ident { $($field:literal : $default:ident),* $(,)? }),* $(,)?) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        pub enum NodeKind {
            $($kind),*
        }

        impl NodeKind {
            pub const ALL: &'static [NodeKind] = &[$(NodeKind::$kind),*];

            pub fn name(self) -> &'static str {
                match self {
                    $(NodeKind::$kind => stringify!($kind)),*
                }
            }

            pub fn from_name(name: &str) -> Option<NodeKind> {
                match name {
                    $(stringify!($kind) => Some(NodeKind::$kind),)*
                    _ => None,
                }
            }

            /// The declared fields of this kind, in declaration order.
            pub fn fields(self) -> &'static [FieldSpec] {
                match self {
                    $(NodeKind::$kind => &[
                        $(FieldSpec { name: $field, default: FieldDefault::$default }),*
                    ]),*
                }
            }
        }
    };
}

define_node_kinds! {
    // Roots
    Module { "body": Required },
    Interactive { "body": Required },
    Expression { "body": Required },

    // Statements
    FunctionDef { "name": Required, "params": Required, "body": Required, "decorators": EmptyList },
    ClassDef { "name": Required, "bases": EmptyList, "body": Required, "decorators": EmptyList },
    Return { "value": Null },
    Delete { "targets": Required },
    Assign { "targets": Required, "value": Required },
    AugAssign { "target": Required, "op": Required, "value": Required },
    Print { "dest": Null, "values": EmptyList, "nl": Null },
    For { "target": Required, "iter": Required, "body": Required, "orelse": EmptyList },
    While { "cond": Required, "body": Required, "orelse": EmptyList },
    If { "cond": Required, "body": Required, "orelse": EmptyList },
    With { "context_expr": Required, "optional_vars": Null, "body": Required },
    Raise { "type": Null, "inst": Null, "tback": Null },
    TryExcept { "body": Required, "handlers": EmptyList, "orelse": EmptyList },
    TryFinally { "body": Required, "finalbody": Required },
    ExceptHandler { "type": Null, "name": Null, "body": Required },
    Assert { "test": Required, "msg": Null },
    Import { "names": Required },
    ImportFrom { "module": Required, "names": Required, "level": Null },
    Alias { "name": Required, "asname": Null },
    Exec { "body": Required, "globals": Null, "locals": Null },
    Global { "names": Required },
    Expr { "value": Required },
    Pass {},
    Break {},
    Continue {},

    // Expressions
    BoolOp { "op": Required, "values": Required },
    BinOp { "left": Required, "op": Required, "right": Required },
    UnaryOp { "op": Required, "operand": Required },
    Lambda { "params": Required, "body": Required },
    IfExp { "test": Required, "body": Required, "orelse": Required },
    Dict { "keys": EmptyList, "values": EmptyList },
    ListComp { "elt": Required, "generators": Required },
    GeneratorExp { "elt": Required, "generators": Required },
    Yield { "value": Null },
    Compare { "left": Required, "ops": Required, "comparators": Required },
    Call { "func": Required, "args": EmptyList, "keywords": EmptyList, "starargs": Null, "kwargs": Null },
    Repr { "value": Required },
    Num { "n": Required },
    Str { "s": Required },
    Attribute { "value": Required, "attr": Required, "ctx": Null },
    Subscript { "value": Required, "slice": Required, "ctx": Null },
    Name { "id": Required, "ctx": Null },
    List { "elts": EmptyList, "ctx": Null },
    Tuple { "elts": EmptyList, "ctx": Null },
    Slice { "lower": Null, "upper": Null, "step": Null },
    Index { "value": Required },

    // Helpers
    Parameters { "args": EmptyList, "vararg": Null, "kwarg": Null, "defaults": EmptyList },
    Keyword { "arg": Required, "value": Required },
    Comprehension { "target": Required, "iter": Required, "ifs": EmptyList },
}

impl NodeKind {
    pub fn field_spec(self, name: &str) -> Option<(usize, &'static FieldSpec)> {
        self.fields()
            .iter()
            .enumerate()
            .find(|(_, spec)| spec.name == name)
    }
}
