use crate::compiler_frontend::class_linearizer::{
    ClassMember, ClassRecord, ClassRegistry, InheritedMember, MemberKind, ROOT_CLASS,
};
use crate::compiler_frontend::compiler_errors::ErrorType;
use proptest::prelude::*;

fn record(name: &str, bases: &[&str], members: Vec<ClassMember>) -> ClassRecord {
    ClassRecord {
        name: name.to_owned(),
        bases: bases.iter().map(|base| base.to_string()).collect(),
        members,
    }
}

fn registry_with(classes: Vec<ClassRecord>) -> ClassRegistry {
    let mut registry = ClassRegistry::new();
    for class in classes {
        registry
            .register(class)
            .expect("test class should register");
    }
    registry
}

fn diamond() -> ClassRegistry {
    registry_with(vec![
        record("A", &["object"], vec![ClassMember::method("greet", false)]),
        record("B", &["A"], vec![ClassMember::attribute("colour")]),
        record("C", &["A"], vec![ClassMember::method("greet", false)]),
        record("D", &["B", "C"], vec![]),
    ])
}

#[test]
fn diamond_linearizes_depth_first_with_shared_base_last() {
    let order = diamond().linearize("D").expect("diamond has a valid order");
    assert_eq!(order, vec!["D", "B", "C", "A", "object"]);
}

#[test]
fn root_linearizes_to_itself() {
    let order = ClassRegistry::new()
        .linearize(ROOT_CLASS)
        .expect("root always linearizes");
    assert_eq!(order, vec![ROOT_CLASS]);
}

#[test]
fn class_without_bases_derives_from_root() {
    let registry = registry_with(vec![record("Plain", &[], vec![])]);

    assert_eq!(
        registry.get("Plain").expect("registered").bases,
        vec![ROOT_CLASS.to_owned()]
    );
    assert_eq!(
        registry.linearize("Plain").expect("valid"),
        vec!["Plain", "object"]
    );
}

#[test]
fn conflicting_base_orders_report_the_cycle() {
    let registry = registry_with(vec![
        record("A", &["object"], vec![]),
        record("B", &["object"], vec![]),
        record("X", &["A", "B"], vec![]),
        record("Y", &["B", "A"], vec![]),
        record("Z", &["X", "Y"], vec![]),
    ]);

    let error = registry.linearize("Z").expect_err("Z has no consistent order");

    assert!(matches!(error.error_type, ErrorType::Linearization { .. }));
    assert_eq!(
        error.cycle().expect("cycle is carried"),
        &["A".to_owned(), "B".to_owned()]
    );
    assert!(error.msg.contains("A < B < A"));
}

#[test]
fn base_listed_before_its_own_subclass_is_rejected() {
    let registry = registry_with(vec![
        record("A", &["object"], vec![]),
        record("B", &["A"], vec![]),
        record("C", &["A", "B"], vec![]),
    ]);

    let error = registry.linearize("C").expect_err("A must come after B");
    assert!(matches!(error.error_type, ErrorType::Linearization { .. }));
}

#[test]
fn unregistered_base_is_an_undefined_base_error() {
    let mut registry = ClassRegistry::new();
    let error = registry
        .register(record("Child", &["Parent"], vec![]))
        .expect_err("Parent was never defined");

    assert_eq!(error.error_type, ErrorType::UndefinedBase);
    assert!(error.msg.contains("Parent"));
    assert!(!registry.contains("Child"));
}

#[test]
fn class_redefined_on_top_of_itself_is_a_cycle() {
    let registry = registry_with(vec![
        record("A", &["object"], vec![]),
        record("A", &["A"], vec![]),
    ]);

    let error = registry.linearize("A").expect_err("A inherits from itself");
    assert_eq!(error.cycle(), Some(&["A".to_owned()][..]));
}

#[test]
fn inherited_members_follow_the_resolution_order() {
    let inherited = diamond().inherited_members("D").expect("valid order");

    assert_eq!(
        inherited,
        vec![
            InheritedMember {
                name: "colour".to_owned(),
                owner: "B".to_owned(),
                kind: MemberKind::Attribute,
            },
            InheritedMember {
                name: "greet".to_owned(),
                owner: "C".to_owned(),
                kind: MemberKind::Method { is_static: false },
            },
        ]
    );
}

#[test]
fn own_members_shadow_inherited_ones() {
    let registry = registry_with(vec![
        record(
            "Base",
            &[],
            vec![
                ClassMember::method("run", false),
                ClassMember::method("make", true),
            ],
        ),
        record("Child", &["Base"], vec![ClassMember::method("run", false)]),
    ]);

    let inherited = registry.inherited_members("Child").expect("valid order");

    assert_eq!(inherited.len(), 1);
    assert_eq!(inherited[0].name, "make");
    assert_eq!(inherited[0].kind, MemberKind::Method { is_static: true });
}

// Builds a random acyclic hierarchy where class i may only inherit from classes before it.
fn arbitrary_hierarchy() -> impl Strategy<Value = Vec<Vec<usize>>> {
    (1usize..8).prop_flat_map(|count| {
        (0..count)
            .map(|index| {
                proptest::sample::subsequence((0..index).collect::<Vec<_>>(), 0..=index.min(3))
            })
            .collect::<Vec<_>>()
    })
}

proptest! {
    #[test]
    fn successful_orders_are_well_formed(hierarchy in arbitrary_hierarchy()) {
        let mut registry = ClassRegistry::new();
        for (index, bases) in hierarchy.iter().enumerate() {
            let base_names = bases.iter().map(|base| format!("K{}", base)).collect::<Vec<_>>();
            let base_refs = base_names.iter().map(String::as_str).collect::<Vec<_>>();
            registry
                .register(record(&format!("K{}", index), &base_refs, vec![]))
                .expect("bases are always registered first");
        }

        for index in 0..hierarchy.len() {
            let name = format!("K{}", index);
            let Ok(order) = registry.linearize(&name) else {
                continue;
            };

            prop_assert_eq!(order.first(), Some(&name));
            prop_assert_eq!(order.last().map(String::as_str), Some(ROOT_CLASS));

            let mut distinct = order.clone();
            distinct.sort();
            distinct.dedup();
            prop_assert_eq!(distinct.len(), order.len());

            // Direct bases keep their declared relative order
            let positions = hierarchy[index]
                .iter()
                .map(|base| order.iter().position(|entry| *entry == format!("K{}", base)))
                .collect::<Option<Vec<_>>>();
            let positions = positions.expect("every base appears in the order");
            prop_assert!(positions.windows(2).all(|pair| pair[0] < pair[1]));
        }
    }
}
