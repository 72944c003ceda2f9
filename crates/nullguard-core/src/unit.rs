use crate::function::Function;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// One source file worth of lowered declarations.
///
/// Declarations are keyed by their qualified name and keep insertion order, which
/// is the order every pass visits them in.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompilationUnit {
    pub name: String,
    pub declarations: IndexMap<String, Function>,
}

impl CompilationUnit {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            declarations: IndexMap::new(),
        }
    }

    /// Adds `function`, returning the declaration it replaced if the name was taken.
    pub fn add_function(&mut self, function: Function) -> Option<Function> {
        self.declarations.insert(function.name.clone(), function)
    }

    pub fn get_function(&self, name: &str) -> Option<&Function> {
        self.declarations.get(name)
    }

    pub fn get_function_mut(&mut self, name: &str) -> Option<&mut Function> {
        self.declarations.get_mut(name)
    }

    pub fn functions(&self) -> impl Iterator<Item = &Function> {
        self.declarations.values()
    }

    pub fn functions_mut(&mut self) -> impl Iterator<Item = &mut Function> {
        self.declarations.values_mut()
    }

    pub fn len(&self) -> usize {
        self.declarations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.declarations.is_empty()
    }
}
