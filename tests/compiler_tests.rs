use oxc_allocator::Allocator;
use oxc_parser::Parser;
use oxc_span::SourceType;
use pyjs::backends::js::JsLoweringConfig;
use pyjs::build_system::build::compile_source;
use std::fs;
use std::path::Path;

/// Strict-mode parse errors of a generated script.
fn js_syntax_errors(source: &str) -> Vec<String> {
    let strict = format!("\"use strict\";\n{}", source);
    let allocator = Allocator::default();
    let parsed = Parser::new(&allocator, &strict, SourceType::cjs()).parse();

    let mut errors = parsed
        .errors
        .iter()
        .map(|error| format!("{:?}", error))
        .collect::<Vec<_>>();
    if parsed.panicked && errors.is_empty() {
        errors.push(String::from("parser gave up"));
    }
    errors
}

#[test]
fn test_all_cases_in_folder() {
    let cases_dir = Path::new(env!("CARGO_MANIFEST_DIR")).join("tests/cases");
    let config = JsLoweringConfig::default();
    let mut errors = Vec::new();
    let mut checked = 0;

    let mut entries = fs::read_dir(&cases_dir)
        .expect("cases folder should exist")
        .map(|entry| entry.expect("case entry should be readable").path())
        .collect::<Vec<_>>();
    entries.sort();

    for path in entries {
        if path.extension().and_then(|s| s.to_str()) != Some("json") {
            continue;
        }

        let source = fs::read_to_string(&path).expect("case should be readable");
        let expected_path = path.with_extension("js");
        let expected = fs::read_to_string(&expected_path)
            .unwrap_or_else(|_| panic!("missing expected output {}", expected_path.display()));

        checked += 1;
        match compile_source(&path, &source, &config) {
            Ok(module) => {
                let syntax_errors = js_syntax_errors(&module.source);
                if !syntax_errors.is_empty() {
                    errors.push(format!(
                        "{}: output does not parse\n{}",
                        path.display(),
                        syntax_errors.join("\n")
                    ));
                }

                if module.source != expected.trim_end() {
                    errors.push(format!(
                        "{}: output differs\n--- got ---\n{}\n--- expected ---\n{}",
                        path.display(),
                        module.source,
                        expected.trim_end()
                    ));
                }
            }
            Err(e) => errors.push(format!("{}: {}", path.display(), e)),
        }
    }

    assert!(checked > 0, "no cases found in {}", cases_dir.display());

    if !errors.is_empty() {
        panic!("Some cases failed:\n{}", errors.join("\n\n"));
    }
}

#[test]
fn class_orders_are_reported_in_definition_order() {
    let path = Path::new(env!("CARGO_MANIFEST_DIR")).join("tests/cases/classes.json");
    let source = fs::read_to_string(&path).expect("case should be readable");

    let module =
        compile_source(&path, &source, &JsLoweringConfig::default()).expect("case should compile");

    assert_eq!(
        module.class_orders,
        vec![
            (
                "Animal".to_owned(),
                vec!["Animal".to_owned(), "object".to_owned()]
            ),
            (
                "Dog".to_owned(),
                vec!["Dog".to_owned(), "Animal".to_owned(), "object".to_owned()]
            ),
        ]
    );
}
