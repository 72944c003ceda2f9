use crate::builder::FunctionBuilder;
use crate::node::{Literal, MemberAccess, Node};
use crate::origin::StatementOrigin;
use crate::types::IrType;
use crate::unit::CompilationUnit;
use crate::visitor::{
    count_implicit_not_null, count_nodes, walk_member_access, walk_node_mut, Visitor, VisitorMut,
};

fn destructuring_body() -> Node {
    Node::block(vec![
        Node::val("tmp", IrType::named("Pair"), Node::var("p")),
        Node::val(
            "a",
            IrType::int(),
            MemberAccess::call("Pair.component1", IrType::int())
                .with_dispatch(Node::implicit_not_null(
                    IrType::named("Pair"),
                    Node::var("tmp"),
                ))
                .with_origin(StatementOrigin::ComponentN(1))
                .into(),
        ),
        Node::ret(
            MemberAccess::call("Int.plus", IrType::int())
                .with_dispatch(Node::var("a"))
                .with_extension(Node::var("b"))
                .with_arguments([Node::var("c"), Node::var("d")])
                .into(),
        ),
    ])
}

struct RefCollector {
    names: Vec<String>,
}

impl Visitor for RefCollector {
    fn visit_node(&mut self, node: &Node) {
        if let Node::VariableRef(var) = node {
            self.names.push(var.name.clone());
        }
        crate::visitor::walk_node(self, node);
    }
}

#[test]
fn test_visits_children_in_evaluation_order() {
    let mut collector = RefCollector { names: Vec::new() };
    collector.visit_node(&destructuring_body());

    assert_eq!(collector.names, vec!["p", "tmp", "a", "b", "c", "d"]);
}

#[test]
fn test_every_node_visited_once() {
    // block, val tmp, p, val a, call, typeop, tmp, return, call, a, b, c, d
    assert_eq!(count_nodes(&destructuring_body()), 13);
    assert_eq!(count_implicit_not_null(&destructuring_body()), 1);
}

#[test]
fn test_member_access_hook_sees_nested_calls() {
    struct CallNames(Vec<String>);

    impl Visitor for CallNames {
        fn visit_member_access(&mut self, access: &MemberAccess) {
            walk_member_access(self, access);
            self.0.push(access.callee.name.clone());
        }
    }

    let nested: Node = MemberAccess::call("outer", IrType::unit())
        .with_dispatch(MemberAccess::call("inner", IrType::named("A")).into())
        .into();

    let mut names = CallNames(Vec::new());
    names.visit_node(&nested);
    assert_eq!(names.0, vec!["inner", "outer"]);
}

#[test]
fn test_mutating_visitor_replaces_slots() {
    struct NullToZero;

    impl VisitorMut for NullToZero {
        fn visit_node_mut(&mut self, node: &mut Node) {
            if matches!(node, Node::Literal(Literal::Null)) {
                *node = Node::int(0);
            }
            walk_node_mut(self, node);
        }
    }

    let mut unit = CompilationUnit::new("visit.nir");
    unit.add_function(
        FunctionBuilder::new("f")
            .body(vec![Node::if_else(
                Node::bool(true),
                Node::ret(Node::null()),
                Node::ret(Node::int(1)),
            )])
            .build(),
    );

    NullToZero.visit_unit_mut(&mut unit);

    let expected = Node::block(vec![Node::if_else(
        Node::bool(true),
        Node::ret(Node::int(0)),
        Node::ret(Node::int(1)),
    )]);
    assert_eq!(unit.get_function("f").unwrap().body, Some(expected));
}

#[test]
fn test_functions_without_body_are_skipped() {
    let mut unit = CompilationUnit::new("visit.nir");
    unit.add_function(FunctionBuilder::new("external").build());

    let mut collector = RefCollector { names: Vec::new() };
    collector.visit_unit(&unit);
    assert!(collector.names.is_empty());
}
