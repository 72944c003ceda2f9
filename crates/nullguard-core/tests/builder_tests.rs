use nullguard_core::{
    ir_persist,
    verify::verify_unit,
    visitor::{count_implicit_not_null, Visitor},
    CompilationUnit, FunctionBuilder, IrType, MemberAccess, Node, StatementOrigin, UnitBuilder,
};

fn component_unit() -> CompilationUnit {
    UnitBuilder::new("components.nir")
        .function(
            FunctionBuilder::new("demo.sum")
                .param("p", IrType::nullable("Pair"))
                .returns(IrType::int())
                .body(vec![
                    Node::val(
                        "a",
                        IrType::int(),
                        MemberAccess::call("component1", IrType::int())
                            .with_extension(Node::implicit_not_null(
                                IrType::named("Pair"),
                                Node::var("p"),
                            ))
                            .with_origin(StatementOrigin::ComponentN(1))
                            .into(),
                    ),
                    Node::val(
                        "b",
                        IrType::int(),
                        MemberAccess::call("component2", IrType::int())
                            .with_extension(Node::implicit_not_null(
                                IrType::named("Pair"),
                                Node::var("p"),
                            ))
                            .with_origin(StatementOrigin::ComponentN(2))
                            .into(),
                    ),
                    Node::ret(
                        MemberAccess::call("Int.plus", IrType::int())
                            .with_dispatch(Node::var("a"))
                            .with_argument(Node::var("b"))
                            .into(),
                    ),
                ])
                .build(),
        )
        .build()
}

#[test]
fn test_unit_construction() {
    let unit = component_unit();

    assert_eq!(unit.len(), 1);
    let function = unit.get_function("demo.sum").unwrap();
    assert_eq!(function.param("p").unwrap().ty, IrType::nullable("Pair"));
    assert_eq!(count_implicit_not_null(function.body.as_ref().unwrap()), 2);
    assert!(verify_unit(&unit).is_ok());
}

#[test]
fn test_json_roundtrip_preserves_tree() {
    let unit = component_unit();
    let json = serde_json::to_string(&unit).unwrap();
    let restored: CompilationUnit = serde_json::from_str(&json).unwrap();

    assert_eq!(restored, unit);
    assert_eq!(
        ir_persist::fingerprint_unit(&restored),
        ir_persist::fingerprint_unit(&unit)
    );
}

#[test]
fn test_unknown_origin_rejected_on_load() {
    let unit = component_unit();
    let json = serde_json::to_string(&unit)
        .unwrap()
        .replace("COMPONENT_2", "COMPONENT_0");

    assert!(serde_json::from_str::<CompilationUnit>(&json).is_err());
}

#[test]
fn test_visitor_over_whole_unit() {
    struct Calls(usize);

    impl Visitor for Calls {
        fn visit_member_access(&mut self, access: &MemberAccess) {
            self.0 += 1;
            nullguard_core::visitor::walk_member_access(self, access);
        }
    }

    let mut calls = Calls(0);
    calls.visit_unit(&component_unit());
    assert_eq!(calls.0, 3);
}
