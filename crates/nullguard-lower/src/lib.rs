/*! Lowering of compiler-inserted nullability assertions.
 *
 * Earlier stages wrap receivers in `IMPLICIT_NOTNULL` type operators whenever a nullable value is
 * used where a non-null one is required. On a dispatch receiver the call itself already fails on
 * null, so the wrap is redundant. Extension receivers only lose their wrap in the narrow case the
 * selected [`ElisionPolicy`] allows.
 */

pub mod lowering;
pub mod phase;
pub mod policy;

pub use lowering::{ArgumentNullabilityAssertionsLowering, ElisionStats};
pub use phase::{pass_manager, Phase, ARGUMENT_NULLABILITY_ASSERTIONS, LOWERING_PHASES};
pub use policy::{policy_for, DispatchOnlyPolicy, ElisionPolicy, ReceiverSlot, VersionGatedPolicy};

use anyhow::Result;
use nullguard_core::{CompilationContext, CompilationUnit};

/// Runs every lowering phase over `unit` under `context`.
///
/// Fails before touching the unit when `verify_ir` is set and the IR is malformed.
pub fn lower_unit(unit: &mut CompilationUnit, context: &CompilationContext) -> Result<()> {
    let mut manager = pass_manager(LOWERING_PHASES, context);
    manager.run_all(unit, context)
}
