use crate::lowering::ArgumentNullabilityAssertionsLowering;
use nullguard_core::{CompilationContext, Pass, PassManager};

/// A named lowering step and the factory that builds its pass for one compilation.
#[derive(Clone, Copy)]
pub struct Phase {
    pub name: &'static str,
    pub description: &'static str,
    pub create: fn(&CompilationContext) -> Box<dyn Pass>,
}

impl Phase {
    pub fn create_pass(&self, context: &CompilationContext) -> Box<dyn Pass> {
        (self.create)(context)
    }
}

impl std::fmt::Debug for Phase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Phase")
            .field("name", &self.name)
            .field("description", &self.description)
            .finish()
    }
}

pub const ARGUMENT_NULLABILITY_ASSERTIONS: Phase = Phase {
    name: "Nullability assertions on arguments",
    description:
        "Transform nullability assertions on arguments so that they conform to the compiler settings",
    create: create_argument_nullability_assertions,
};

/// Phases in the order they run.
pub const LOWERING_PHASES: &[Phase] = &[ARGUMENT_NULLABILITY_ASSERTIONS];

fn create_argument_nullability_assertions(context: &CompilationContext) -> Box<dyn Pass> {
    Box::new(ArgumentNullabilityAssertionsLowering::new(context))
}

/// Builds a [`PassManager`] holding one pass per phase, in order.
pub fn pass_manager(phases: &[Phase], context: &CompilationContext) -> PassManager {
    let mut manager = PassManager::new();
    for phase in phases {
        tracing::trace!(phase = phase.name, "registering phase");
        manager.register_boxed(phase.create_pass(context));
    }
    manager
}
