use super::js_support::{
    assert_contains, assert_valid_js, at_line, lower_expression, lower_expression_error,
    occurrences,
};
use crate::compiler_frontend::compiler_errors::ErrorType;
use crate::compiler_frontend::ir::ir_nodes::Field;
use crate::compiler_frontend::ir::ir_schema::NodeKind;
use crate::compiler_frontend::ir::tests::ir_test_support::*;

#[test]
fn names_map_onto_runtime_and_safe_identifiers() {
    assert_eq!(lower_expression(name("True")), "true");
    assert_eq!(lower_expression(name("None")), "null");
    assert_eq!(lower_expression(name("int")), "py_builtins._int");
    assert_eq!(lower_expression(name("ValueError")), "py_builtins.ValueError");
    assert_eq!(lower_expression(name("py_builtins")), "___py_hard_to_collide");
    assert_eq!(lower_expression(name("function")), "_function");
    assert_eq!(lower_expression(name("total")), "total");
}

#[test]
fn literals_go_through_runtime_constructors() {
    assert_eq!(lower_expression(num(3)), "3");
    assert_eq!(lower_expression(float(1.5)), "1.5");
    assert_eq!(
        lower_expression(string("say \"hi\"\n")),
        r#"str("say \"hi\"\n")"#
    );
    assert_eq!(lower_expression(list(vec![num(1), num(2)])), "list([1, 2])");
    assert_eq!(lower_expression(tuple(vec![])), "tuple([])");
    assert_eq!(
        lower_expression(dict(vec![string("a")], vec![num(1)])),
        r#"dict(tuple([tuple([str("a"), 1])]))"#
    );
}

#[test]
fn dict_with_mismatched_keys_and_values_is_a_schema_error() {
    let error = lower_expression_error(dict(vec![string("a"), string("b")], vec![num(1)]));
    assert_eq!(error.error_type, ErrorType::Schema);
}

#[test]
fn arithmetic_uses_native_operators_except_power_and_floor_division() {
    assert_eq!(lower_expression(binop(name("a"), "Add", num(1))), "(a)+(1)");
    assert_eq!(lower_expression(binop(name("a"), "Mod", num(2))), "(a)%(2)");
    assert_eq!(
        lower_expression(binop(name("a"), "Pow", num(2))),
        "Math.pow(a, 2)"
    );
    assert_eq!(
        lower_expression(binop(name("a"), "FloorDiv", num(2))),
        "Math.floor((a)/(2))"
    );
    assert_eq!(lower_expression(unary("Not", name("x"))), "!(x)");
    assert_eq!(lower_expression(unary("USub", num(4))), "-(4)");
}

#[test]
fn operator_results_are_grouped_before_member_access() {
    let sum = || binop(name("a"), "Add", name("b"));
    let either = || boolop("Or", vec![name("a"), name("b")]);

    assert_eq!(
        lower_expression(call(attr(sum(), "upper"), vec![])),
        "((a)+(b)).upper()"
    );
    assert_eq!(
        lower_expression(subscript(either(), index(num(0)))),
        "((a)||(b)).__getitem__(0)"
    );
    assert_eq!(
        lower_expression(attr(unary("USub", name("x")), "real")),
        "(-(x)).real"
    );
    assert_eq!(
        lower_expression(call(either(), vec![name("x")])),
        "((a)||(b))(x)"
    );
    assert_eq!(lower_expression(attr(num(5), "real")), "(5).real");
    assert_eq!(
        lower_expression(attr(compare(name("a"), "Lt", name("b")), "real")),
        "(a < b).real"
    );
}

#[test]
fn comparison_operands_keep_their_grouping() {
    assert_eq!(
        lower_expression(compare(
            name("x"),
            "Lt",
            boolop("Or", vec![name("a"), name("b")])
        )),
        "x < ((a)||(b))"
    );
    assert_eq!(
        lower_expression(compare(
            binop(name("a"), "BitOr", name("b")),
            "GtE",
            name("c")
        )),
        "((a)|(b)) >= c"
    );
    assert_eq!(
        lower_expression(compare(
            compare(name("a"), "Lt", name("b")),
            "Is",
            name("t")
        )),
        "(a < b) === t"
    );
    assert_eq!(
        lower_expression(compare(
            name("a"),
            "In",
            binop(name("b"), "Add", name("c"))
        )),
        "((b)+(c)).__contains__(a)"
    );
    assert_eq!(lower_expression(compare(name("x"), "Gt", num(-1))), "x > -1");
}

#[test]
fn string_escapes_never_form_octal_sequences() {
    assert_eq!(lower_expression(string("\u{0}1")), r#"str("\x001")"#);
    assert_eq!(
        lower_expression(string("a\u{2028}b\u{2029}")),
        r#"str("a\u2028b\u2029")"#
    );
    assert_eq!(lower_expression(string("\u{1}")), r#"str("\u0001")"#);

    assert_valid_js(&format!("var s = {};", lower_expression(string("\u{0}1"))));
}

#[test]
fn boolean_operators_join_every_operand() {
    assert_eq!(
        lower_expression(boolop("And", vec![name("a"), name("b"), name("c")])),
        "(a)&&(b)&&(c)"
    );
    assert_eq!(
        lower_expression(boolop("Or", vec![name("a"), name("b")])),
        "(a)||(b)"
    );
}

#[test]
fn equality_and_membership_go_through_runtime_helpers() {
    assert_eq!(
        lower_expression(compare(name("a"), "Eq", name("b"))),
        "py_builtins.eq(a, b)"
    );
    assert_eq!(
        lower_expression(compare(name("a"), "NotEq", name("b"))),
        "!(py_builtins.eq(a, b))"
    );
    assert_eq!(
        lower_expression(compare(name("a"), "In", name("b"))),
        "b.__contains__(a)"
    );
    assert_eq!(
        lower_expression(compare(name("a"), "NotIn", name("b"))),
        "!(b.__contains__(a))"
    );
    assert_eq!(lower_expression(compare(name("a"), "Is", name("b"))), "a === b");
    assert_eq!(lower_expression(compare(name("a"), "LtE", num(3))), "a <= 3");
}

#[test]
fn chained_comparisons_are_rejected() {
    let chained = node(
        NodeKind::Compare,
        vec![
            ("left", name("a").into()),
            ("ops", Field::Names(vec!["Lt".to_owned(), "Lt".to_owned()])),
            ("comparators", vec![name("b"), name("c")].into()),
        ],
    );

    let error = lower_expression_error(chained);
    assert_eq!(error.error_type, ErrorType::Unsupported);
    assert!(error.msg.starts_with("Compare:"), "{}", error.msg);
}

#[test]
fn conditional_expression_coerces_its_test() {
    let conditional = node(
        NodeKind::IfExp,
        vec![
            ("test", name("c").into()),
            ("body", name("a").into()),
            ("orelse", name("b").into()),
        ],
    );

    assert_eq!(
        lower_expression(conditional),
        "(py_builtins.bool(c) ? (a) : (b))"
    );
}

#[test]
fn calls_pass_keywords_through_the_args_helper() {
    assert_eq!(
        lower_expression(call(name("f"), vec![name("a"), num(1)])),
        "f(a, 1)"
    );
    assert_eq!(
        lower_expression(call_kw(name("f"), vec![name("a")], vec![("k", num(1))])),
        "f.args([a], {k: 1})"
    );
    assert_eq!(
        lower_expression(call(attr(name("o"), "m"), vec![])),
        "o.m()"
    );
}

#[test]
fn star_arguments_in_calls_are_rejected() {
    let star_call = node(
        NodeKind::Call,
        vec![("func", name("f").into()), ("starargs", name("rest").into())],
    );

    let error = lower_expression_error(star_call);
    assert_eq!(error.error_type, ErrorType::Unsupported);
}

#[test]
fn subscripts_use_explicit_item_access() {
    assert_eq!(
        lower_expression(subscript(name("x"), index(num(0)))),
        "x.__getitem__(0)"
    );
    assert_eq!(
        lower_expression(subscript(name("x"), slice(Some(num(1)), None, None))),
        "x.__getitem__(slice(1, null))"
    );
    assert_eq!(
        lower_expression(subscript(name("x"), slice(None, Some(num(2)), None))),
        "x.__getitem__(slice(null, 2))"
    );
    assert_eq!(
        lower_expression(subscript(name("x"), slice(None, None, Some(num(-1))))),
        "x.__getitem__(slice(null, null, -1))"
    );
    assert_eq!(
        lower_expression(subscript(name("x"), slice(None, None, None))),
        "x.__getitem__(slice(null))"
    );
}

#[test]
fn lambda_applies_defaults_only_when_the_argument_is_absent() {
    let adder = lambda(
        params(&["x", "y"], vec![num(2)]),
        binop(name("x"), "Add", name("y")),
    );

    assert_eq!(
        lower_expression(adder),
        r#"(function(x, y) { if (typeof y === "undefined") { y = 2; } return (x)+(y); })"#
    );
}

#[test]
fn list_comprehension_is_an_immediately_invoked_iterator_loop() {
    let comprehension = list_comp(
        binop(name("x"), "Mult", num(2)),
        vec![comprehension(store("x"), name("xs"), vec![name("x")])],
    );

    let js = lower_expression(comprehension);

    assert!(js.starts_with("(function() { var __comp_0 = list([]);"), "{}", js);
    assert!(js.ends_with("return __comp_0; })()"), "{}", js);
    assert_contains(&js, "var __iter_1 = iter(xs); var x;");
    assert_contains(&js, "x = __iter_1.next();");
    assert_contains(&js, "isinstance(__exc_2, py_builtins.StopIteration)");
    assert_contains(&js, "if (!(py_builtins.bool(x))) { continue; }");
    assert_contains(&js, "__comp_0.append((x)*(2));");
    assert!(!js.contains('\n'));
}

#[test]
fn nested_comprehension_loops_run_innermost_last() {
    let pairs = list_comp(
        tuple(vec![name("a"), name("b")]),
        vec![
            comprehension(store("a"), name("xs"), vec![]),
            comprehension(store("b"), name("ys"), vec![]),
        ],
    );

    let js = lower_expression(pairs);

    assert_eq!(occurrences(&js, "while (true) {"), 2);
    let outer = js.find("iter(xs)").expect("outer loop present");
    let inner = js.find("iter(ys)").expect("inner loop present");
    assert!(outer < inner);
}

#[test]
fn comprehension_with_tuple_target_is_rejected() {
    let comprehension = list_comp(
        name("a"),
        vec![comprehension(
            tuple(vec![store("a"), store("b")]),
            name("pairs"),
            vec![],
        )],
    );

    let error = lower_expression_error(comprehension);
    assert_eq!(error.error_type, ErrorType::Unsupported);
}

#[test]
fn generator_expressions_and_repr_are_rejected() {
    let generator = node(
        NodeKind::GeneratorExp,
        vec![
            ("elt", name("x").into()),
            (
                "generators",
                vec![comprehension(store("x"), name("xs"), vec![])].into(),
            ),
        ],
    );
    let repr = node(NodeKind::Repr, vec![("value", name("x").into())]);

    for expression in [generator, repr] {
        let error = lower_expression_error(expression);
        assert_eq!(error.error_type, ErrorType::Unsupported);
    }
}

#[test]
fn errors_carry_the_position_of_the_failing_node() {
    let rejected = node(NodeKind::Repr, vec![("value", name("x").into())]).at(at_line(7));
    let wrapped = call(name("f"), vec![rejected]);

    let error = lower_expression_error(wrapped);
    assert_eq!(error.location.position, at_line(7));
}
