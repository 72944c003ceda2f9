/*! Depth-first traversal over the expression tree.
 *
 * `Visitor` walks a shared borrow of the IR, `VisitorMut` a unique one. Every `visit_*` hook
 * defaults to the matching `walk_*` function, which recurses into each child exactly once in
 * evaluation order. A pass overrides only the hooks for the node kinds it rewrites and calls the
 * walk function itself to decide whether children are handled before or after the rewrite.
 */

use crate::function::Function;
use crate::node::{
    Block, If, MemberAccess, Node, Return, SetVariable, TypeOperatorWrap, Variable,
};
use crate::unit::CompilationUnit;

pub trait Visitor: Sized {
    fn visit_unit(&mut self, unit: &CompilationUnit) {
        walk_unit(self, unit);
    }

    fn visit_function(&mut self, function: &Function) {
        walk_function(self, function);
    }

    fn visit_node(&mut self, node: &Node) {
        walk_node(self, node);
    }

    fn visit_variable(&mut self, variable: &Variable) {
        walk_variable(self, variable);
    }

    fn visit_set_variable(&mut self, set: &SetVariable) {
        walk_set_variable(self, set);
    }

    fn visit_member_access(&mut self, access: &MemberAccess) {
        walk_member_access(self, access);
    }

    fn visit_type_operator(&mut self, wrap: &TypeOperatorWrap) {
        walk_type_operator(self, wrap);
    }

    fn visit_block(&mut self, block: &Block) {
        walk_block(self, block);
    }

    fn visit_if(&mut self, if_node: &If) {
        walk_if(self, if_node);
    }

    fn visit_return(&mut self, ret: &Return) {
        walk_return(self, ret);
    }
}

pub fn walk_unit<V: Visitor>(visitor: &mut V, unit: &CompilationUnit) {
    for function in unit.functions() {
        visitor.visit_function(function);
    }
}

pub fn walk_function<V: Visitor>(visitor: &mut V, function: &Function) {
    if let Some(body) = &function.body {
        visitor.visit_node(body);
    }
}

pub fn walk_node<V: Visitor>(visitor: &mut V, node: &Node) {
    match node {
        Node::Literal(_) | Node::VariableRef(_) => {}
        Node::Variable(variable) => visitor.visit_variable(variable),
        Node::SetVariable(set) => visitor.visit_set_variable(set),
        Node::MemberAccess(access) => visitor.visit_member_access(access),
        Node::TypeOperator(wrap) => visitor.visit_type_operator(wrap),
        Node::Block(block) => visitor.visit_block(block),
        Node::If(if_node) => visitor.visit_if(if_node),
        Node::Return(ret) => visitor.visit_return(ret),
    }
}

pub fn walk_variable<V: Visitor>(visitor: &mut V, variable: &Variable) {
    if let Some(initializer) = &variable.initializer {
        visitor.visit_node(initializer);
    }
}

pub fn walk_set_variable<V: Visitor>(visitor: &mut V, set: &SetVariable) {
    visitor.visit_node(&set.value);
}

pub fn walk_member_access<V: Visitor>(visitor: &mut V, access: &MemberAccess) {
    if let Some(receiver) = &access.dispatch_receiver {
        visitor.visit_node(receiver);
    }
    if let Some(receiver) = &access.extension_receiver {
        visitor.visit_node(receiver);
    }
    for argument in &access.arguments {
        visitor.visit_node(argument);
    }
}

pub fn walk_type_operator<V: Visitor>(visitor: &mut V, wrap: &TypeOperatorWrap) {
    visitor.visit_node(&wrap.argument);
}

pub fn walk_block<V: Visitor>(visitor: &mut V, block: &Block) {
    for statement in &block.statements {
        visitor.visit_node(statement);
    }
}

pub fn walk_if<V: Visitor>(visitor: &mut V, if_node: &If) {
    visitor.visit_node(&if_node.condition);
    visitor.visit_node(&if_node.then_branch);
    visitor.visit_node(&if_node.else_branch);
}

pub fn walk_return<V: Visitor>(visitor: &mut V, ret: &Return) {
    visitor.visit_node(&ret.value);
}

pub trait VisitorMut: Sized {
    fn visit_unit_mut(&mut self, unit: &mut CompilationUnit) {
        walk_unit_mut(self, unit);
    }

    fn visit_function_mut(&mut self, function: &mut Function) {
        walk_function_mut(self, function);
    }

    fn visit_node_mut(&mut self, node: &mut Node) {
        walk_node_mut(self, node);
    }

    fn visit_variable_mut(&mut self, variable: &mut Variable) {
        walk_variable_mut(self, variable);
    }

    fn visit_set_variable_mut(&mut self, set: &mut SetVariable) {
        walk_set_variable_mut(self, set);
    }

    fn visit_member_access_mut(&mut self, access: &mut MemberAccess) {
        walk_member_access_mut(self, access);
    }

    fn visit_type_operator_mut(&mut self, wrap: &mut TypeOperatorWrap) {
        walk_type_operator_mut(self, wrap);
    }

    fn visit_block_mut(&mut self, block: &mut Block) {
        walk_block_mut(self, block);
    }

    fn visit_if_mut(&mut self, if_node: &mut If) {
        walk_if_mut(self, if_node);
    }

    fn visit_return_mut(&mut self, ret: &mut Return) {
        walk_return_mut(self, ret);
    }
}

pub fn walk_unit_mut<V: VisitorMut>(visitor: &mut V, unit: &mut CompilationUnit) {
    for function in unit.functions_mut() {
        visitor.visit_function_mut(function);
    }
}

pub fn walk_function_mut<V: VisitorMut>(visitor: &mut V, function: &mut Function) {
    if let Some(body) = &mut function.body {
        visitor.visit_node_mut(body);
    }
}

pub fn walk_node_mut<V: VisitorMut>(visitor: &mut V, node: &mut Node) {
    match node {
        Node::Literal(_) | Node::VariableRef(_) => {}
        Node::Variable(variable) => visitor.visit_variable_mut(variable),
        Node::SetVariable(set) => visitor.visit_set_variable_mut(set),
        Node::MemberAccess(access) => visitor.visit_member_access_mut(access),
        Node::TypeOperator(wrap) => visitor.visit_type_operator_mut(wrap),
        Node::Block(block) => visitor.visit_block_mut(block),
        Node::If(if_node) => visitor.visit_if_mut(if_node),
        Node::Return(ret) => visitor.visit_return_mut(ret),
    }
}

pub fn walk_variable_mut<V: VisitorMut>(visitor: &mut V, variable: &mut Variable) {
    if let Some(initializer) = &mut variable.initializer {
        visitor.visit_node_mut(initializer);
    }
}

pub fn walk_set_variable_mut<V: VisitorMut>(visitor: &mut V, set: &mut SetVariable) {
    visitor.visit_node_mut(&mut set.value);
}

pub fn walk_member_access_mut<V: VisitorMut>(visitor: &mut V, access: &mut MemberAccess) {
    if let Some(receiver) = &mut access.dispatch_receiver {
        visitor.visit_node_mut(receiver);
    }
    if let Some(receiver) = &mut access.extension_receiver {
        visitor.visit_node_mut(receiver);
    }
    for argument in &mut access.arguments {
        visitor.visit_node_mut(argument);
    }
}

pub fn walk_type_operator_mut<V: VisitorMut>(visitor: &mut V, wrap: &mut TypeOperatorWrap) {
    visitor.visit_node_mut(&mut wrap.argument);
}

pub fn walk_block_mut<V: VisitorMut>(visitor: &mut V, block: &mut Block) {
    for statement in &mut block.statements {
        visitor.visit_node_mut(statement);
    }
}

pub fn walk_if_mut<V: VisitorMut>(visitor: &mut V, if_node: &mut If) {
    visitor.visit_node_mut(&mut if_node.condition);
    visitor.visit_node_mut(&mut if_node.then_branch);
    visitor.visit_node_mut(&mut if_node.else_branch);
}

pub fn walk_return_mut<V: VisitorMut>(visitor: &mut V, ret: &mut Return) {
    visitor.visit_node_mut(&mut ret.value);
}

/// Counts every node reachable from the visited roots.
#[derive(Debug, Default)]
pub struct NodeCounter {
    pub count: usize,
}

impl Visitor for NodeCounter {
    fn visit_node(&mut self, node: &Node) {
        self.count += 1;
        walk_node(self, node);
    }
}

pub fn count_nodes(node: &Node) -> usize {
    let mut counter = NodeCounter::default();
    counter.visit_node(node);
    counter.count
}

/// Number of `IMPLICIT_NOTNULL` wraps reachable from `node`.
pub fn count_implicit_not_null(node: &Node) -> usize {
    struct Counter(usize);

    impl Visitor for Counter {
        fn visit_node(&mut self, node: &Node) {
            if node.is_implicit_not_null() {
                self.0 += 1;
            }
            walk_node(self, node);
        }
    }

    let mut counter = Counter(0);
    counter.visit_node(node);
    counter.0
}
