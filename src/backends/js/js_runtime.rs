//! Names and helper calls supplied by the runtime support library.
//!
//! Generated code never relies on native truthiness, equality or iteration.
//! Every such site goes through one of the helpers below.

/// Namespace object the runtime library exposes its helpers on.
pub const RUNTIME_NAMESPACE: &str = "py_builtins";

/// A user binding named like the runtime namespace is renamed so it cannot shadow it.
pub const SHADOWED_NAMESPACE: &str = "___py_hard_to_collide";

/// Names resolved against the runtime namespace rather than the local scope.
const RUNTIME_NAMES: &[&str] = &[
    "NotImplementedError",
    "ZeroDivisionError",
    "AssertionError",
    "AttributeError",
    "RuntimeError",
    "ImportError",
    "TypeError",
    "ValueError",
    "NameError",
    "IndexError",
    "KeyError",
    "StopIteration",
    "_int",
    "_float",
    "max",
    "min",
    "sum",
    "print",
];

pub fn is_runtime_name(name: &str) -> bool {
    RUNTIME_NAMES.contains(&name)
}

/// Maps a source-level name to the name the runtime knows it by.
/// Returns `None` for ordinary user names.
pub fn builtin_name(name: &str) -> Option<String> {
    let renamed = match name {
        "True" => return Some("true".to_owned()),
        "False" => return Some("false".to_owned()),
        "None" => return Some("null".to_owned()),
        RUNTIME_NAMESPACE => return Some(SHADOWED_NAMESPACE.to_owned()),
        "int" => "_int",
        "float" => "_float",
        other => other,
    };

    if is_runtime_name(renamed) {
        Some(format!("{}.{}", RUNTIME_NAMESPACE, renamed))
    } else {
        None
    }
}

pub fn truthy(expression: &str) -> String {
    format!("{}.bool({})", RUNTIME_NAMESPACE, expression)
}

pub fn structural_eq(left: &str, right: &str) -> String {
    format!("{}.eq({}, {})", RUNTIME_NAMESPACE, left, right)
}

pub fn print_call(values: &[String]) -> String {
    format!("{}.print({});", RUNTIME_NAMESPACE, values.join(", "))
}

/// The signal that ends iteration without an error.
pub fn iteration_exhausted(exception: &str) -> String {
    format!(
        "isinstance({}, {}.StopIteration)",
        exception, RUNTIME_NAMESPACE
    )
}

pub fn assertion_error(message: Option<&str>) -> String {
    format!(
        "{}.AssertionError({})",
        RUNTIME_NAMESPACE,
        message.unwrap_or_default()
    )
}

pub fn to_iterator(iterable: &str) -> String {
    format!("iter({})", iterable)
}

pub fn string_literal(escaped: &str) -> String {
    format!("str({})", escaped)
}

pub fn list_literal(items: &[String]) -> String {
    format!("list([{}])", items.join(", "))
}

pub fn tuple_literal(items: &[String]) -> String {
    format!("tuple([{}])", items.join(", "))
}

/// Entries are kept as an ordered sequence of pairs so insertion order and
/// non-primitive keys survive.
pub fn dict_literal(entries: &[(String, String)]) -> String {
    let pairs = entries
        .iter()
        .map(|(key, value)| tuple_literal(&[key.to_owned(), value.to_owned()]))
        .collect::<Vec<_>>();

    format!("dict({})", tuple_literal(&pairs))
}

pub fn get_item(container: &str, key: &str) -> String {
    format!("{}.__getitem__({})", container, key)
}

pub fn set_item(container: &str, key: &str, value: &str) -> String {
    format!("{}.__setitem__({}, {})", container, key, value)
}

pub fn del_item(container: &str, key: &str) -> String {
    format!("{}.__delitem__({})", container, key)
}

pub fn contains(container: &str, needle: &str) -> String {
    format!("{}.__contains__({})", container, needle)
}

/// Slice descriptor built positionally from the bounds that are present.
/// An absent leading bound is filled with `null` whenever a later bound follows it.
pub fn slice_descriptor(
    lower: Option<String>,
    upper: Option<String>,
    step: Option<String>,
) -> String {
    let null = || "null".to_owned();

    let args = match (lower, upper, step) {
        (None, None, None) => vec![null()],
        (None, Some(upper), None) => vec![null(), upper],
        (Some(lower), None, None) => vec![lower, null()],
        (Some(lower), Some(upper), None) => vec![lower, upper],
        (lower, upper, Some(step)) => vec![
            lower.unwrap_or_else(null),
            upper.unwrap_or_else(null),
            step,
        ],
    };

    format!("slice({})", args.join(", "))
}
