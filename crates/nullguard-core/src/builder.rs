/*! Fluent construction of functions and compilation units.
 *
 * Tests and front-ends assemble IR by hand far more often than they deserialize it. These builders
 * keep parameter lists, return types and bodies together so a declaration reads top to bottom.
 */

use crate::function::{Function, Parameter};
use crate::node::Node;
use crate::types::IrType;
use crate::unit::CompilationUnit;

pub struct FunctionBuilder {
    function: Function,
}

impl FunctionBuilder {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            function: Function::new(name, IrType::unit()),
        }
    }

    pub fn param(&mut self, name: impl Into<String>, ty: IrType) -> &mut Self {
        self.function.params.push(Parameter::new(name, ty));
        self
    }

    pub fn returns(&mut self, ty: IrType) -> &mut Self {
        self.function.return_type = ty;
        self
    }

    /// Sets the body to a block holding `statements`.
    pub fn body(&mut self, statements: Vec<Node>) -> &mut Self {
        self.function.body = Some(Node::block(statements));
        self
    }

    pub fn body_node(&mut self, body: Node) -> &mut Self {
        self.function.body = Some(body);
        self
    }

    pub fn build(&mut self) -> Function {
        self.function.clone()
    }
}

pub struct UnitBuilder {
    unit: CompilationUnit,
}

impl UnitBuilder {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            unit: CompilationUnit::new(name),
        }
    }

    pub fn function(&mut self, function: Function) -> &mut Self {
        self.unit.add_function(function);
        self
    }

    pub fn build(&mut self) -> CompilationUnit {
        self.unit.clone()
    }
}
