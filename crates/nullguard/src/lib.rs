/*! Single entry point for nullguard.
 *
 * Re-exports the IR model, the text parser and the lowering so a host pipeline can read units,
 * lower them under its compiler settings and hand the result on with one dependency.
 */

pub use nullguard_core as core;
pub use nullguard_lower as lower;
pub use nullguard_parser as parser;

pub use nullguard_core::{
    format::{format_function, format_unit},
    CompatibilityLevel, CompilationContext, CompilationUnit, CompilerSettings, Function, IrError,
    IrType, MemberAccess, Node, NullCheckPolicy, StatementOrigin, TypeOperator,
};

pub use nullguard_lower::{lower_unit, ArgumentNullabilityAssertionsLowering, ElisionStats};

pub use nullguard_parser::{parse_file, parse_unit};
