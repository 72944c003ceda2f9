use crate::settings::CompilationContext;
use crate::unit::CompilationUnit;
use crate::verify::verify_unit;
use anyhow::Result;
use std::time::{Duration, Instant};

pub trait Pass: Send + Sync {
    fn name(&self) -> &'static str;

    fn description(&self) -> &'static str {
        "No description provided"
    }

    fn run_on_unit(&mut self, unit: &mut CompilationUnit, context: &CompilationContext)
        -> Result<()>;

    fn modifies_ir(&self) -> bool {
        false
    }

    fn as_any(&self) -> &dyn std::any::Any;

    fn as_any_mut(&mut self) -> &mut dyn std::any::Any;
}

#[derive(Debug, Clone)]
pub struct PassStatistics {
    pub name: String,
    pub unit: String,
    pub duration: Duration,
}

pub struct PassManager {
    passes: Vec<Box<dyn Pass>>,
    statistics: Vec<PassStatistics>,
    collect_stats: bool,
}

impl PassManager {
    pub fn new() -> Self {
        Self {
            passes: Vec::new(),
            statistics: Vec::new(),
            collect_stats: false,
        }
    }

    pub fn enable_statistics(&mut self) {
        self.collect_stats = true;
    }

    pub fn register_pass<P: Pass + 'static>(&mut self, pass: P) {
        self.passes.push(Box::new(pass));
    }

    pub fn register_boxed(&mut self, pass: Box<dyn Pass>) {
        self.passes.push(pass);
    }

    pub fn pass_names(&self) -> Vec<&'static str> {
        self.passes.iter().map(|p| p.name()).collect()
    }

    /// Runs every registered pass over `unit`, in registration order.
    ///
    /// With `verify_ir` set the unit is checked first and nothing runs on malformed IR.
    pub fn run_all(&mut self, unit: &mut CompilationUnit, context: &CompilationContext) -> Result<()> {
        if context.settings.verify_ir {
            verify_unit(unit)?;
        }

        for pass in &mut self.passes {
            let start = if self.collect_stats {
                Some(Instant::now())
            } else {
                None
            };

            tracing::debug!(pass = pass.name(), unit = %unit.name, "running pass");
            pass.run_on_unit(unit, context)?;

            if let Some(start) = start {
                self.statistics.push(PassStatistics {
                    name: pass.name().to_string(),
                    unit: unit.name.clone(),
                    duration: start.elapsed(),
                });
            }
        }

        Ok(())
    }

    pub fn statistics(&self) -> &[PassStatistics] {
        &self.statistics
    }

    pub fn get_pass_mut<P: Pass + 'static>(&mut self) -> Option<&mut P> {
        self.passes
            .iter_mut()
            .find_map(|p| p.as_any_mut().downcast_mut::<P>())
    }

    pub fn get_pass<P: Pass + 'static>(&self) -> Option<&P> {
        self.passes
            .iter()
            .find_map(|p| p.as_any().downcast_ref::<P>())
    }
}

impl Default for PassManager {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::FunctionBuilder;
    use crate::node::Node;

    struct RenamePass {
        runs: usize,
    }

    impl Pass for RenamePass {
        fn name(&self) -> &'static str {
            "rename"
        }

        fn run_on_unit(&mut self, unit: &mut CompilationUnit, _: &CompilationContext) -> Result<()> {
            self.runs += 1;
            unit.name = format!("{}.renamed", unit.name);
            Ok(())
        }

        fn modifies_ir(&self) -> bool {
            true
        }

        fn as_any(&self) -> &dyn std::any::Any {
            self
        }

        fn as_any_mut(&mut self) -> &mut dyn std::any::Any {
            self
        }
    }

    #[test]
    fn test_pass_registration() {
        let mut manager = PassManager::new();
        manager.register_pass(RenamePass { runs: 0 });
        assert_eq!(manager.pass_names(), vec!["rename"]);
        assert!(manager.get_pass::<RenamePass>().is_some());
    }

    #[test]
    fn test_run_all_collects_statistics() {
        let mut manager = PassManager::new();
        manager.enable_statistics();
        manager.register_pass(RenamePass { runs: 0 });

        let mut unit = CompilationUnit::new("a.nir");
        manager
            .run_all(&mut unit, &CompilationContext::default())
            .unwrap();

        assert_eq!(unit.name, "a.nir.renamed");
        assert_eq!(manager.statistics().len(), 1);
        assert_eq!(manager.statistics()[0].unit, "a.nir.renamed");
        assert_eq!(manager.get_pass::<RenamePass>().unwrap().runs, 1);
    }

    #[test]
    fn test_malformed_unit_stops_before_passes() {
        let mut manager = PassManager::new();
        manager.register_pass(RenamePass { runs: 0 });

        let mut unit = CompilationUnit::new("bad.nir");
        unit.add_function(
            FunctionBuilder::new("f")
                .body(vec![Node::ret(Node::var("ghost"))])
                .build(),
        );

        let result = manager.run_all(&mut unit, &CompilationContext::default());
        assert!(result.is_err());
        assert_eq!(manager.get_pass::<RenamePass>().unwrap().runs, 0);
        assert_eq!(unit.name, "bad.nir");
    }
}
