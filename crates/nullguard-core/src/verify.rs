/*! Fail-fast precondition checks on incoming IR.
 *
 * Lowering assumes fully resolved trees. Anything that slips through malformed could make a pass
 * drop a guard it must keep, so compilation stops at the first violation instead of skipping the
 * offending node.
 */

use crate::function::Function;
use crate::node::{Block, Node, SetVariable, TypeOperatorWrap};
use crate::origin::TypeOperator;
use crate::unit::CompilationUnit;
use crate::visitor::{self, Visitor};
use crate::{IrError, Result};
use std::collections::HashSet;

pub fn verify_unit(unit: &CompilationUnit) -> Result<()> {
    for (key, function) in &unit.declarations {
        if key != &function.name {
            return Err(IrError::Malformed {
                function: function.name.clone(),
                message: format!("declared under mismatched key `{}`", key),
            });
        }
        verify_function(function)?;
    }
    Ok(())
}

pub fn verify_function(function: &Function) -> Result<()> {
    let mut params = HashSet::new();
    for param in &function.params {
        if !params.insert(param.name.as_str()) {
            return Err(IrError::Malformed {
                function: function.name.clone(),
                message: format!("duplicate parameter `{}`", param.name),
            });
        }
    }

    let mut verifier = Verifier {
        scopes: vec![function.params.iter().map(|p| p.name.clone()).collect()],
        violation: None,
    };
    verifier.visit_function(function);

    match verifier.violation {
        Some(message) => Err(IrError::Malformed {
            function: function.name.clone(),
            message,
        }),
        None => Ok(()),
    }
}

struct Verifier {
    scopes: Vec<HashSet<String>>,
    violation: Option<String>,
}

impl Verifier {
    fn report(&mut self, message: String) {
        if self.violation.is_none() {
            self.violation = Some(message);
        }
    }

    fn is_declared(&self, name: &str) -> bool {
        self.scopes.iter().rev().any(|scope| scope.contains(name))
    }

    fn declare(&mut self, name: &str) {
        if let Some(scope) = self.scopes.last_mut() {
            scope.insert(name.to_string());
        }
    }
}

impl Visitor for Verifier {
    fn visit_node(&mut self, node: &Node) {
        if self.violation.is_some() {
            return;
        }
        if let Node::VariableRef(var) = node {
            if !self.is_declared(&var.name) {
                self.report(format!("unresolved variable `{}`", var.name));
            }
        }
        visitor::walk_node(self, node);
    }

    fn visit_set_variable(&mut self, set: &SetVariable) {
        if !self.is_declared(&set.name) {
            self.report(format!("assignment to undeclared variable `{}`", set.name));
        }
        visitor::walk_set_variable(self, set);
    }

    fn visit_type_operator(&mut self, wrap: &TypeOperatorWrap) {
        if wrap.operator == TypeOperator::ImplicitNotNull && wrap.type_operand.nullable {
            self.report(format!(
                "{} asserts into nullable type `{}`",
                wrap.operator, wrap.type_operand
            ));
        }
        visitor::walk_type_operator(self, wrap);
    }

    // Locals are in scope only for later statements of the block that directly holds them.
    fn visit_block(&mut self, block: &Block) {
        self.scopes.push(HashSet::new());
        for statement in &block.statements {
            self.visit_node(statement);
            if let Node::Variable(variable) = statement {
                self.declare(&variable.name);
            }
        }
        self.scopes.pop();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::FunctionBuilder;
    use crate::node::MemberAccess;
    use crate::types::IrType;

    fn unit_with(function: Function) -> CompilationUnit {
        let mut unit = CompilationUnit::new("verify.nir");
        unit.add_function(function);
        unit
    }

    #[test]
    fn test_well_formed_function() {
        let function = FunctionBuilder::new("f")
            .param("p", IrType::nullable("Pair"))
            .body(vec![
                Node::val(
                    "a",
                    IrType::int(),
                    MemberAccess::call("Pair.component1", IrType::int())
                        .with_dispatch(Node::implicit_not_null(
                            IrType::named("Pair"),
                            Node::var("p"),
                        ))
                        .into(),
                ),
                Node::set("a", Node::int(2)),
                Node::ret(Node::var("a")),
            ])
            .build();

        assert!(verify_unit(&unit_with(function)).is_ok());
    }

    #[test]
    fn test_unresolved_variable() {
        let function = FunctionBuilder::new("f")
            .body(vec![Node::ret(Node::var("missing"))])
            .build();

        let err = verify_unit(&unit_with(function)).unwrap_err();
        assert!(err.to_string().contains("unresolved variable `missing`"));
    }

    #[test]
    fn test_local_not_visible_outside_block() {
        let function = FunctionBuilder::new("f")
            .body(vec![
                Node::block(vec![Node::val("inner", IrType::int(), Node::int(1))]),
                Node::ret(Node::var("inner")),
            ])
            .build();

        assert!(verify_function(&function).is_err());
    }

    #[test]
    fn test_branch_local_not_visible_after_if() {
        let function = FunctionBuilder::new("f")
            .param("flag", IrType::boolean())
            .body(vec![
                Node::if_else(
                    Node::var("flag"),
                    Node::val("x", IrType::int(), Node::int(1)),
                    Node::int(0),
                ),
                Node::ret(Node::var("x")),
            ])
            .build();

        let err = verify_function(&function).unwrap_err();
        assert!(err.to_string().contains("unresolved variable `x`"));
    }

    #[test]
    fn test_argument_local_not_visible_after_call() {
        let function = FunctionBuilder::new("f")
            .body(vec![
                MemberAccess::call("consume", IrType::unit())
                    .with_argument(Node::val("y", IrType::int(), Node::int(1)))
                    .into(),
                Node::set("y", Node::int(2)),
            ])
            .build();

        let err = verify_function(&function).unwrap_err();
        assert!(err.to_string().contains("undeclared variable `y`"));
    }

    #[test]
    fn test_block_local_visible_to_later_statements() {
        let function = FunctionBuilder::new("f")
            .param("flag", IrType::boolean())
            .body(vec![Node::if_else(
                Node::var("flag"),
                Node::block(vec![
                    Node::val("x", IrType::int(), Node::int(1)),
                    Node::ret(Node::var("x")),
                ]),
                Node::int(0),
            )])
            .build();

        assert!(verify_function(&function).is_ok());
    }

    #[test]
    fn test_variable_cannot_reference_itself() {
        let function = FunctionBuilder::new("f")
            .body(vec![Node::val("x", IrType::int(), Node::var("x"))])
            .build();

        assert!(verify_function(&function).is_err());
    }

    #[test]
    fn test_not_null_into_nullable_type() {
        let function = FunctionBuilder::new("f")
            .param("p", IrType::nullable("Pair"))
            .body(vec![Node::implicit_not_null(
                IrType::nullable("Pair"),
                Node::var("p"),
            )])
            .build();

        let err = verify_function(&function).unwrap_err();
        assert!(matches!(err, IrError::Malformed { .. }));
    }

    #[test]
    fn test_assignment_to_undeclared() {
        let function = FunctionBuilder::new("f")
            .body(vec![Node::set("y", Node::int(1))])
            .build();

        assert!(verify_function(&function).is_err());
    }

    #[test]
    fn test_duplicate_parameters() {
        let function = FunctionBuilder::new("f")
            .param("p", IrType::int())
            .param("p", IrType::int())
            .build();

        assert!(verify_function(&function).is_err());
    }

    #[test]
    fn test_mismatched_declaration_key() {
        let mut unit = CompilationUnit::new("verify.nir");
        unit.declarations
            .insert("g".to_string(), FunctionBuilder::new("f").build());

        assert!(verify_unit(&unit).is_err());
    }
}
