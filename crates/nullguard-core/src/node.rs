use crate::origin::{StatementOrigin, TypeOperator};
use crate::types::IrType;
use num_bigint::BigInt;
use serde::{Deserialize, Serialize};

/// Expression and statement tree of a function body.
///
/// Every node owns its children, so a parent can replace a child slot without
/// touching anything else in the tree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Node {
    Literal(Literal),
    VariableRef(VariableRef),
    Variable(Variable),
    SetVariable(SetVariable),
    MemberAccess(MemberAccess),
    TypeOperator(TypeOperatorWrap),
    Block(Block),
    If(If),
    Return(Return),
}

impl Node {
    pub fn null() -> Self {
        Node::Literal(Literal::Null)
    }

    pub fn bool(value: bool) -> Self {
        Node::Literal(Literal::Bool(value))
    }

    pub fn int(value: impl Into<BigInt>) -> Self {
        Node::Literal(Literal::Int(value.into()))
    }

    pub fn string(value: impl Into<String>) -> Self {
        Node::Literal(Literal::String(value.into()))
    }

    pub fn var(name: impl Into<String>) -> Self {
        Node::VariableRef(VariableRef { name: name.into() })
    }

    pub fn val(name: impl Into<String>, ty: IrType, initializer: Node) -> Self {
        Node::Variable(Variable {
            name: name.into(),
            ty,
            initializer: Some(Box::new(initializer)),
        })
    }

    pub fn set(name: impl Into<String>, value: Node) -> Self {
        Node::SetVariable(SetVariable {
            name: name.into(),
            value: Box::new(value),
        })
    }

    pub fn block(statements: Vec<Node>) -> Self {
        Node::Block(Block { statements })
    }

    pub fn if_else(condition: Node, then_branch: Node, else_branch: Node) -> Self {
        Node::If(If {
            condition: Box::new(condition),
            then_branch: Box::new(then_branch),
            else_branch: Box::new(else_branch),
        })
    }

    pub fn ret(value: Node) -> Self {
        Node::Return(Return {
            value: Box::new(value),
        })
    }

    pub fn type_operator(operator: TypeOperator, type_operand: IrType, argument: Node) -> Self {
        Node::TypeOperator(TypeOperatorWrap {
            operator,
            type_operand,
            argument: Box::new(argument),
        })
    }

    /// Wraps `argument` in a compiler-inserted not-null assertion.
    pub fn implicit_not_null(type_operand: IrType, argument: Node) -> Self {
        Self::type_operator(TypeOperator::ImplicitNotNull, type_operand, argument)
    }

    pub fn is_implicit_not_null(&self) -> bool {
        matches!(
            self,
            Node::TypeOperator(TypeOperatorWrap {
                operator: TypeOperator::ImplicitNotNull,
                ..
            })
        )
    }

    pub fn as_member_access(&self) -> Option<&MemberAccess> {
        match self {
            Node::MemberAccess(access) => Some(access),
            _ => None,
        }
    }

    pub fn as_member_access_mut(&mut self) -> Option<&mut MemberAccess> {
        match self {
            Node::MemberAccess(access) => Some(access),
            _ => None,
        }
    }

    pub fn kind(&self) -> NodeKind {
        match self {
            Node::Literal(_) => NodeKind::Literal,
            Node::VariableRef(_) => NodeKind::VariableRef,
            Node::Variable(_) => NodeKind::Variable,
            Node::SetVariable(_) => NodeKind::SetVariable,
            Node::MemberAccess(_) => NodeKind::MemberAccess,
            Node::TypeOperator(_) => NodeKind::TypeOperator,
            Node::Block(_) => NodeKind::Block,
            Node::If(_) => NodeKind::If,
            Node::Return(_) => NodeKind::Return,
        }
    }
}

impl From<MemberAccess> for Node {
    fn from(access: MemberAccess) -> Self {
        Node::MemberAccess(access)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeKind {
    Literal,
    VariableRef,
    Variable,
    SetVariable,
    MemberAccess,
    TypeOperator,
    Block,
    If,
    Return,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Literal {
    Null,
    Bool(bool),
    Int(BigInt),
    String(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VariableRef {
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Variable {
    pub name: String,
    pub ty: IrType,
    pub initializer: Option<Box<Node>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SetVariable {
    pub name: String,
    pub value: Box<Node>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CalleeKind {
    Function,
    PropertyGetter,
    Constructor,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Callee {
    /// Fully qualified member name, e.g. `Pair.component1`.
    pub name: String,
    pub kind: CalleeKind,
}

/// Call, property access or constructor invocation.
///
/// Children evaluate in slot order: dispatch receiver, extension receiver, then
/// the value arguments left to right.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MemberAccess {
    pub callee: Callee,
    pub dispatch_receiver: Option<Box<Node>>,
    pub extension_receiver: Option<Box<Node>>,
    pub arguments: Vec<Node>,
    pub origin: Option<StatementOrigin>,
    pub ty: IrType,
}

impl MemberAccess {
    pub fn call(name: impl Into<String>, ty: IrType) -> Self {
        Self::new(name, CalleeKind::Function, ty)
    }

    pub fn new(name: impl Into<String>, kind: CalleeKind, ty: IrType) -> Self {
        Self {
            callee: Callee {
                name: name.into(),
                kind,
            },
            dispatch_receiver: None,
            extension_receiver: None,
            arguments: Vec::new(),
            origin: None,
            ty,
        }
    }

    pub fn with_dispatch(mut self, receiver: Node) -> Self {
        self.dispatch_receiver = Some(Box::new(receiver));
        self
    }

    pub fn with_extension(mut self, receiver: Node) -> Self {
        self.extension_receiver = Some(Box::new(receiver));
        self
    }

    pub fn with_argument(mut self, argument: Node) -> Self {
        self.arguments.push(argument);
        self
    }

    pub fn with_arguments(mut self, arguments: impl IntoIterator<Item = Node>) -> Self {
        self.arguments.extend(arguments);
        self
    }

    pub fn with_origin(mut self, origin: StatementOrigin) -> Self {
        self.origin = Some(origin);
        self
    }

    pub fn is_ordinary_call(&self) -> bool {
        self.origin.is_none()
    }
}

/// Type operator applied to exactly one argument.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TypeOperatorWrap {
    pub operator: TypeOperator,
    pub type_operand: IrType,
    pub argument: Box<Node>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Block {
    pub statements: Vec<Node>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct If {
    pub condition: Box<Node>,
    pub then_branch: Box<Node>,
    pub else_branch: Box<Node>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Return {
    pub value: Box<Node>,
}
