/*! Core expression-tree IR for null-check lowering.
 *
 * Earlier compilation stages hand over function bodies as owned trees in which every
 * compiler-inserted nullability guard is an explicit node. This crate provides the node model,
 * the visitors passes are written against, the compilation settings they read, and the pass
 * manager that drives them over a compilation unit.
 */

pub mod builder;
pub mod format;
pub mod function;
pub mod ir_persist;
pub mod node;
pub mod origin;
pub mod pass;
pub mod settings;
pub mod types;
pub mod unit;
pub mod verify;
pub mod visitor;

pub use builder::{FunctionBuilder, UnitBuilder};
pub use function::{Function, Parameter};
pub use node::{
    Block, Callee, CalleeKind, If, Literal, MemberAccess, Node, NodeKind, Return, SetVariable,
    TypeOperatorWrap, Variable, VariableRef,
};
pub use origin::{StatementOrigin, TypeOperator};
pub use pass::{Pass, PassManager, PassStatistics};
pub use settings::{CompatibilityLevel, CompilationContext, CompilerSettings, NullCheckPolicy};
pub use types::IrType;
pub use unit::CompilationUnit;
pub use visitor::{Visitor, VisitorMut};

use thiserror::Error;

#[derive(Error, Debug)]
pub enum IrError {
    #[error("Malformed IR in {function}: {message}")]
    Malformed { function: String, message: String },
    #[error("Configuration error: {0}")]
    Config(String),
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, IrError>;

#[cfg(test)]
mod tests;
