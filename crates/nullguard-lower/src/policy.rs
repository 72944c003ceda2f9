/*! Rules deciding which implicit not-null assertions on receivers are redundant.
 *
 * A policy is only consulted for a receiver slot that currently holds an `IMPLICIT_NOTNULL` wrap.
 * It never inspects or changes the tree itself, so the walker and the rules can be tested apart.
 *
 * Known limitation: dropping a dispatch-receiver assertion relies on the call itself throwing on a
 * null receiver. A few built-in members of array-like classes (their `iterator()` among them) are
 * not compiled as real calls on the receiver and therefore do not throw. Neither policy detects
 * those callees.
 */

use nullguard_core::{CompatibilityLevel, MemberAccess, NullCheckPolicy};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ReceiverSlot {
    Dispatch,
    Extension,
}

impl fmt::Display for ReceiverSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReceiverSlot::Dispatch => f.write_str("dispatch"),
            ReceiverSlot::Extension => f.write_str("extension"),
        }
    }
}

pub trait ElisionPolicy: Send + Sync {
    fn name(&self) -> &'static str;

    /// Whether the `IMPLICIT_NOTNULL` wrap held in `slot` of `access` can be removed.
    fn should_drop(
        &self,
        slot: ReceiverSlot,
        access: &MemberAccess,
        level: CompatibilityLevel,
    ) -> bool;
}

/// Dispatch receivers always; extension receivers of destructuring component calls
/// below [`CompatibilityLevel::UNIFIED_NULL_CHECKS`].
#[derive(Debug, Clone, Copy, Default)]
pub struct VersionGatedPolicy;

impl ElisionPolicy for VersionGatedPolicy {
    fn name(&self) -> &'static str {
        "version-gated"
    }

    fn should_drop(
        &self,
        slot: ReceiverSlot,
        access: &MemberAccess,
        level: CompatibilityLevel,
    ) -> bool {
        match slot {
            ReceiverSlot::Dispatch => true,
            ReceiverSlot::Extension => {
                !level.has_unified_null_checks()
                    && access
                        .origin
                        .is_some_and(|origin| origin.is_special_operator_call())
            }
        }
    }
}

/// Dispatch receivers only, regardless of level or origin.
#[derive(Debug, Clone, Copy, Default)]
pub struct DispatchOnlyPolicy;

impl ElisionPolicy for DispatchOnlyPolicy {
    fn name(&self) -> &'static str {
        "dispatch-only"
    }

    fn should_drop(
        &self,
        slot: ReceiverSlot,
        _access: &MemberAccess,
        _level: CompatibilityLevel,
    ) -> bool {
        slot == ReceiverSlot::Dispatch
    }
}

pub fn policy_for(kind: NullCheckPolicy) -> Box<dyn ElisionPolicy> {
    match kind {
        NullCheckPolicy::VersionGated => Box::new(VersionGatedPolicy),
        NullCheckPolicy::DispatchOnly => Box::new(DispatchOnlyPolicy),
    }
}
