use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Surface construct that produced a statement or call.
///
/// A member access with no origin is an ordinary call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum StatementOrigin {
    GetProperty,
    GetLocalProperty,
    Invoke,
    EqEq,
    ExclEq,
    Plus,
    Minus,
    PlusEq,
    ForLoopIterator,
    ForLoopHasNext,
    ForLoopNext,
    SafeCall,
    Elvis,
    DestructuringDeclaration,
    /// `componentN()` call synthesized for a destructuring declaration, 1-based.
    ComponentN(u32),
}

impl StatementOrigin {
    /// Calls whose receiver null check is performed by the call mechanism itself
    /// only from the unified null-check compatibility level onwards.
    pub fn is_special_operator_call(&self) -> bool {
        matches!(self, StatementOrigin::ComponentN(_))
    }

    fn tag(&self) -> &'static str {
        match self {
            StatementOrigin::GetProperty => "GET_PROPERTY",
            StatementOrigin::GetLocalProperty => "GET_LOCAL_PROPERTY",
            StatementOrigin::Invoke => "INVOKE",
            StatementOrigin::EqEq => "EQEQ",
            StatementOrigin::ExclEq => "EXCLEQ",
            StatementOrigin::Plus => "PLUS",
            StatementOrigin::Minus => "MINUS",
            StatementOrigin::PlusEq => "PLUSEQ",
            StatementOrigin::ForLoopIterator => "FOR_LOOP_ITERATOR",
            StatementOrigin::ForLoopHasNext => "FOR_LOOP_HAS_NEXT",
            StatementOrigin::ForLoopNext => "FOR_LOOP_NEXT",
            StatementOrigin::SafeCall => "SAFE_CALL",
            StatementOrigin::Elvis => "ELVIS",
            StatementOrigin::DestructuringDeclaration => "DESTRUCTURING_DECLARATION",
            StatementOrigin::ComponentN(_) => "COMPONENT",
        }
    }
}

impl fmt::Display for StatementOrigin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StatementOrigin::ComponentN(index) => write!(f, "COMPONENT_{}", index),
            other => f.write_str(other.tag()),
        }
    }
}

impl FromStr for StatementOrigin {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if let Some(index) = s.strip_prefix("COMPONENT_") {
            return match index.parse::<u32>() {
                Ok(n) if n >= 1 => Ok(StatementOrigin::ComponentN(n)),
                _ => Err(format!("invalid component index in origin `{}`", s)),
            };
        }

        let origin = match s {
            "GET_PROPERTY" => StatementOrigin::GetProperty,
            "GET_LOCAL_PROPERTY" => StatementOrigin::GetLocalProperty,
            "INVOKE" => StatementOrigin::Invoke,
            "EQEQ" => StatementOrigin::EqEq,
            "EXCLEQ" => StatementOrigin::ExclEq,
            "PLUS" => StatementOrigin::Plus,
            "MINUS" => StatementOrigin::Minus,
            "PLUSEQ" => StatementOrigin::PlusEq,
            "FOR_LOOP_ITERATOR" => StatementOrigin::ForLoopIterator,
            "FOR_LOOP_HAS_NEXT" => StatementOrigin::ForLoopHasNext,
            "FOR_LOOP_NEXT" => StatementOrigin::ForLoopNext,
            "SAFE_CALL" => StatementOrigin::SafeCall,
            "ELVIS" => StatementOrigin::Elvis,
            "DESTRUCTURING_DECLARATION" => StatementOrigin::DestructuringDeclaration,
            _ => return Err(format!("unknown statement origin `{}`", s)),
        };
        Ok(origin)
    }
}

impl TryFrom<String> for StatementOrigin {
    type Error = String;

    fn try_from(tag: String) -> Result<Self, Self::Error> {
        tag.parse()
    }
}

impl From<StatementOrigin> for String {
    fn from(origin: StatementOrigin) -> String {
        origin.to_string()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum TypeOperator {
    Cast,
    ImplicitCast,
    /// Compiler-inserted assertion that the argument is not null.
    ImplicitNotNull,
    SafeCast,
    InstanceOf,
    NotInstanceOf,
    ImplicitCoercionToUnit,
}

impl TypeOperator {
    pub const ALL: [TypeOperator; 7] = [
        TypeOperator::Cast,
        TypeOperator::ImplicitCast,
        TypeOperator::ImplicitNotNull,
        TypeOperator::SafeCast,
        TypeOperator::InstanceOf,
        TypeOperator::NotInstanceOf,
        TypeOperator::ImplicitCoercionToUnit,
    ];

    pub fn tag(&self) -> &'static str {
        match self {
            TypeOperator::Cast => "CAST",
            TypeOperator::ImplicitCast => "IMPLICIT_CAST",
            TypeOperator::ImplicitNotNull => "IMPLICIT_NOTNULL",
            TypeOperator::SafeCast => "SAFE_CAST",
            TypeOperator::InstanceOf => "INSTANCEOF",
            TypeOperator::NotInstanceOf => "NOT_INSTANCEOF",
            TypeOperator::ImplicitCoercionToUnit => "IMPLICIT_COERCION_TO_UNIT",
        }
    }
}

impl fmt::Display for TypeOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

impl FromStr for TypeOperator {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        TypeOperator::ALL
            .iter()
            .copied()
            .find(|op| op.tag() == s)
            .ok_or_else(|| format!("unknown type operator `{}`", s))
    }
}

impl TryFrom<String> for TypeOperator {
    type Error = String;

    fn try_from(tag: String) -> Result<Self, Self::Error> {
        tag.parse()
    }
}

impl From<TypeOperator> for String {
    fn from(operator: TypeOperator) -> String {
        operator.tag().to_string()
    }
}
