use crate::policy::{policy_for, ElisionPolicy, ReceiverSlot};
use anyhow::Result;
use nullguard_core::format::format_function;
use nullguard_core::visitor::{walk_function_mut, walk_member_access_mut, VisitorMut};
use nullguard_core::{
    CompatibilityLevel, CompilationContext, CompilationUnit, Function, MemberAccess, Node, Pass,
};
use std::any::Any;
use std::ops::{Add, AddAssign};

/// Counts of receiver assertions seen by one lowering run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ElisionStats {
    pub dispatch_dropped: usize,
    pub dispatch_kept: usize,
    pub extension_dropped: usize,
    pub extension_kept: usize,
}

impl ElisionStats {
    pub fn dropped(&self) -> usize {
        self.dispatch_dropped + self.extension_dropped
    }

    pub fn kept(&self) -> usize {
        self.dispatch_kept + self.extension_kept
    }

    fn record(&mut self, slot: ReceiverSlot, dropped: bool) {
        let counter = match (slot, dropped) {
            (ReceiverSlot::Dispatch, true) => &mut self.dispatch_dropped,
            (ReceiverSlot::Dispatch, false) => &mut self.dispatch_kept,
            (ReceiverSlot::Extension, true) => &mut self.extension_dropped,
            (ReceiverSlot::Extension, false) => &mut self.extension_kept,
        };
        *counter += 1;
    }
}

impl Add for ElisionStats {
    type Output = ElisionStats;

    fn add(self, other: ElisionStats) -> ElisionStats {
        ElisionStats {
            dispatch_dropped: self.dispatch_dropped + other.dispatch_dropped,
            dispatch_kept: self.dispatch_kept + other.dispatch_kept,
            extension_dropped: self.extension_dropped + other.extension_dropped,
            extension_kept: self.extension_kept + other.extension_kept,
        }
    }
}

impl AddAssign for ElisionStats {
    fn add_assign(&mut self, other: ElisionStats) {
        *self = *self + other;
    }
}

/// Removes `IMPLICIT_NOTNULL` wraps from member-access receivers where the
/// configured policy finds the check redundant.
///
/// The policy and compatibility level are captured at construction; the pass keeps no
/// other state between function bodies apart from the statistics of its last run.
pub struct ArgumentNullabilityAssertionsLowering {
    policy: Box<dyn ElisionPolicy>,
    level: CompatibilityLevel,
    dump_functions: bool,
    last_stats: ElisionStats,
}

impl ArgumentNullabilityAssertionsLowering {
    pub fn new(context: &CompilationContext) -> Self {
        Self {
            policy: policy_for(context.settings.null_check_policy),
            level: context.api_version(),
            dump_functions: context.settings.dump_functions,
            last_stats: ElisionStats::default(),
        }
    }

    pub fn with_policy(policy: Box<dyn ElisionPolicy>, level: CompatibilityLevel) -> Self {
        Self {
            policy,
            level,
            dump_functions: false,
            last_stats: ElisionStats::default(),
        }
    }

    pub fn policy_name(&self) -> &'static str {
        self.policy.name()
    }

    pub fn level(&self) -> CompatibilityLevel {
        self.level
    }

    pub fn last_stats(&self) -> ElisionStats {
        self.last_stats
    }

    /// Lowers every function body of `unit` once, in declaration order.
    pub fn lower_unit(&self, unit: &mut CompilationUnit) -> ElisionStats {
        let mut walker = self.walker();
        walker.visit_unit_mut(unit);
        walker.stats
    }

    pub fn lower_function(&self, function: &mut Function) -> ElisionStats {
        let mut walker = self.walker();
        walker.visit_function_mut(function);
        walker.stats
    }

    /// Lowers a single expression tree.
    pub fn lower(&self, body: &mut Node) -> ElisionStats {
        let mut walker = self.walker();
        walker.visit_node_mut(body);
        walker.stats
    }

    pub fn run(&self, mut unit: CompilationUnit) -> CompilationUnit {
        self.lower_unit(&mut unit);
        unit
    }

    fn walker(&self) -> Walker<'_> {
        Walker {
            policy: self.policy.as_ref(),
            level: self.level,
            dump_functions: self.dump_functions,
            stats: ElisionStats::default(),
        }
    }
}

impl Pass for ArgumentNullabilityAssertionsLowering {
    fn name(&self) -> &'static str {
        "argument-nullability-assertions"
    }

    fn description(&self) -> &'static str {
        "Transform nullability assertions on arguments so that they conform to the compiler settings"
    }

    fn run_on_unit(&mut self, unit: &mut CompilationUnit, _context: &CompilationContext) -> Result<()> {
        let stats = self.lower_unit(unit);
        tracing::debug!(
            unit = %unit.name,
            policy = self.policy.name(),
            level = %self.level,
            dropped = stats.dropped(),
            kept = stats.kept(),
            "lowered nullability assertions"
        );
        self.last_stats = stats;
        Ok(())
    }

    fn modifies_ir(&self) -> bool {
        true
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

struct Walker<'a> {
    policy: &'a dyn ElisionPolicy,
    level: CompatibilityLevel,
    dump_functions: bool,
    stats: ElisionStats,
}

impl Walker<'_> {
    fn rewrite_slot(&mut self, access: &mut MemberAccess, slot: ReceiverSlot) {
        let holds_assertion = receiver(access, slot)
            .as_deref()
            .is_some_and(Node::is_implicit_not_null);
        if !holds_assertion {
            return;
        }

        let dropped = self.policy.should_drop(slot, access, self.level);
        if dropped {
            replace_with_argument(receiver_mut(access, slot));
        }

        tracing::trace!(
            callee = %access.callee.name,
            slot = %slot,
            dropped,
            "implicit not-null on receiver"
        );
        self.stats.record(slot, dropped);
    }
}

impl VisitorMut for Walker<'_> {
    fn visit_function_mut(&mut self, function: &mut Function) {
        if function.has_body()
            && (self.dump_functions || tracing::enabled!(tracing::Level::TRACE))
        {
            tracing::debug!(function = %function.name, "\n{}", format_function(function));
        }
        walk_function_mut(self, function);
    }

    fn visit_member_access_mut(&mut self, access: &mut MemberAccess) {
        walk_member_access_mut(self, access);

        self.rewrite_slot(access, ReceiverSlot::Dispatch);
        self.rewrite_slot(access, ReceiverSlot::Extension);
    }
}

fn receiver(access: &MemberAccess, slot: ReceiverSlot) -> &Option<Box<Node>> {
    match slot {
        ReceiverSlot::Dispatch => &access.dispatch_receiver,
        ReceiverSlot::Extension => &access.extension_receiver,
    }
}

fn receiver_mut(access: &mut MemberAccess, slot: ReceiverSlot) -> &mut Option<Box<Node>> {
    match slot {
        ReceiverSlot::Dispatch => &mut access.dispatch_receiver,
        ReceiverSlot::Extension => &mut access.extension_receiver,
    }
}

/// Replaces a type-operator wrap in `slot` by its argument.
fn replace_with_argument(slot: &mut Option<Box<Node>>) {
    if let Some(node) = slot.take() {
        *slot = Some(match *node {
            Node::TypeOperator(wrap) => wrap.argument,
            other => Box::new(other),
        });
    }
}
