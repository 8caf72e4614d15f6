use crate::compiler_frontend::compiler_errors::ErrorType;
use crate::compiler_frontend::ir::ir_nodes::{Field, Node, Scalar, SourcePosition};
use crate::compiler_frontend::ir::ir_schema::{FieldDefault, NodeKind};
use crate::compiler_frontend::ir::tests::ir_test_support::{assign, module, name, num, store};

#[test]
fn construct_fills_defaults_for_omitted_fields() {
    let node = Node::construct(
        NodeKind::If,
        vec![("cond", Field::from(name("x"))), ("body", Field::List(vec![]))],
    )
    .expect("If with cond and body should build");

    assert!(node.list("orelse").expect("orelse").is_empty());
}

#[test]
fn construct_defaults_optional_nodes_to_null() {
    let node = Node::construct(NodeKind::Return, Vec::<(&str, Field)>::new())
        .expect("Return has no required fields");

    assert!(node.opt_node("value").expect("value").is_none());
    assert!(node.is_null("value").expect("value"));
}

#[test]
fn construct_rejects_unknown_field() {
    let error = Node::construct(NodeKind::Name, vec![("id", "x".into()), ("colour", "red".into())])
        .expect_err("unknown field should fail");

    assert_eq!(error.error_type, ErrorType::Schema);
    assert!(error.msg.contains("colour"));
}

#[test]
fn construct_rejects_missing_required_field() {
    let error = Node::construct(NodeKind::Assign, vec![("value", Field::from(num(1)))])
        .expect_err("missing targets should fail");

    assert_eq!(error.error_type, ErrorType::Schema);
    assert!(error.msg.contains("targets"));
}

#[test]
fn construct_rejects_duplicate_field() {
    let error = Node::construct(NodeKind::Name, vec![("id", "x".into()), ("id", "y".into())])
        .expect_err("duplicate field should fail");

    assert_eq!(error.error_type, ErrorType::Schema);
}

#[test]
fn fields_follow_schema_order_regardless_of_input_order() {
    let node = Node::construct(
        NodeKind::Name,
        vec![("ctx", Field::from("Store")), ("id", Field::from("x"))],
    )
    .expect("Name should build");

    let names = node.fields().map(|(name, _)| name).collect::<Vec<_>>();
    assert_eq!(names, vec!["id", "ctx"]);
}

#[test]
fn accessors_report_shape_mismatches_as_schema_errors() {
    let node = assign(store("x"), num(1));

    let error = node.str("value").expect_err("value is a node");
    assert_eq!(error.error_type, ErrorType::Schema);

    let error = node.list("value").expect_err("value is a node");
    assert_eq!(error.error_type, ErrorType::Schema);

    let error = node.field("lvalue").expect_err("no such field");
    assert_eq!(error.error_type, ErrorType::Schema);
}

#[test]
fn names_reads_empty_sequence_as_empty() {
    let node = Node::construct(NodeKind::Global, vec![("names", Field::List(vec![]))])
        .expect("Global should build");

    assert!(node.names("names").expect("names").is_empty());
}

#[test]
fn every_kind_has_unique_field_names() {
    for kind in NodeKind::ALL {
        let fields = kind.fields();
        for (index, spec) in fields.iter().enumerate() {
            assert!(
                fields[index + 1..].iter().all(|other| other.name != spec.name),
                "{} declares '{}' twice",
                kind.name(),
                spec.name
            );
        }
        assert_eq!(NodeKind::from_name(kind.name()), Some(*kind));
    }
}

#[test]
fn kinds_without_required_fields_build_empty() {
    for kind in NodeKind::ALL {
        if kind
            .fields()
            .iter()
            .all(|spec| spec.default != FieldDefault::Required)
        {
            Node::construct(*kind, Vec::<(&str, Field)>::new())
                .unwrap_or_else(|error| panic!("{} should build empty: {}", kind.name(), error));
        }
    }
}

#[test]
fn tree_printer_renders_nested_fields() {
    let tree = module(vec![assign(store("x"), num(1))]).at(Some(SourcePosition {
        line: 1,
        column: 0,
    }));

    let rendered = tree.to_string();
    let expected = [
        "Module: @1:0",
        "  body [",
        "    Assign:",
        "      targets [",
        "        Name:",
        "          id = \"x\"",
        "          ctx = \"Store\"",
        "      ]",
        "      value = Num:",
        "        n = 1",
        "  ]",
    ]
    .join("\n");

    assert_eq!(rendered, expected);
}

#[test]
fn scalar_display_keeps_float_precision() {
    assert_eq!(Scalar::Float(1.0).to_string(), "1.0");
    assert_eq!(Scalar::Int(-3).to_string(), "-3");
}
