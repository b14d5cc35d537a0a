// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 assetflow contributors

//! Registry validation
//!
//! Checks the task table and the watch bindings before anything runs.

use crate::assets::glob_base;
use crate::errors::AssetflowError;
use crate::pipeline::{TaskGraph, TaskRegistry};

/// Registry validator
pub struct RegistryValidator;

impl RegistryValidator {
    /// Validate a registry
    pub fn validate(registry: &TaskRegistry) -> ValidationResult {
        let mut result = ValidationResult::new();

        if registry.is_empty() {
            result.add_error("No tasks registered");
        }

        match TaskGraph::build(registry) {
            Ok(_) => {}
            Err(e @ AssetflowError::CircularDependency { .. })
            | Err(e @ AssetflowError::UnknownDependency { .. }) => {
                result.add_error(&e.to_string());
            }
            Err(e) => {
                result.add_error(&format!("Dependency graph error: {}", e));
            }
        }

        for task in registry.tasks() {
            if task.action.is_none() && task.dependencies.is_empty() {
                result.add_warning(&format!("Task '{}' has no action and no dependencies", task.name));
            }
        }

        Self::validate_bindings(registry, &mut result);

        result
    }

    fn validate_bindings(registry: &TaskRegistry, result: &mut ValidationResult) {
        for binding in registry.bindings() {
            let watched = glob_base(binding.pattern());

            for name in binding.tasks() {
                let Some(task) = registry.get(name) else {
                    result.add_error(
                        &AssetflowError::UnknownWatchTask {
                            pattern: binding.pattern().to_string(),
                            task: name.clone(),
                        }
                        .to_string(),
                    );
                    continue;
                };

                // A task writing into the tree it is triggered by retriggers itself
                let Some(ref action) = task.action else {
                    continue;
                };
                for dest in action.destinations() {
                    if dest.starts_with(&watched) || watched.starts_with(&dest) {
                        result.add_warning(&format!(
                            "Task '{}' writes to '{}', which overlaps the watched pattern '{}'",
                            name,
                            dest.display(),
                            binding.pattern()
                        ));
                    }
                }
            }
        }
    }
}

/// Validation result
#[derive(Debug, Default)]
pub struct ValidationResult {
    pub errors: Vec<String>,
    pub warnings: Vec<String>,
}

impl ValidationResult {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_error(&mut self, message: &str) {
        self.errors.push(message.to_string());
    }

    pub fn add_warning(&mut self, message: &str) {
        self.warnings.push(message.to_string());
    }

    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn has_warnings(&self) -> bool {
        !self.warnings.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assets::{AssetPipeline, Destination};
    use crate::pipeline::{action_fn, Task, TaskAction, TaskReport};

    fn noop() -> impl TaskAction {
        action_fn(|_| async { Ok::<_, AssetflowError>(TaskReport::default()) })
    }

    #[test]
    fn test_empty_registry() {
        let result = RegistryValidator::validate(&TaskRegistry::new());
        assert!(!result.is_valid());
        assert!(result.errors[0].contains("No tasks"));
    }

    #[test]
    fn test_cycle_is_an_error() {
        let mut registry = TaskRegistry::new();
        registry.register(Task::new("a").series(["b"])).unwrap();
        registry.register(Task::new("b").series(["a"])).unwrap();

        let result = RegistryValidator::validate(&registry);
        assert!(!result.is_valid());
        assert!(result.errors[0].contains("Circular dependency"));
    }

    #[test]
    fn test_binding_to_unknown_task() {
        let mut registry = TaskRegistry::new();
        registry.register_action("copy-html", noop()).unwrap();
        registry.watch("src/*.html", ["copy-html", "nope"]).unwrap();

        let result = RegistryValidator::validate(&registry);
        assert_eq!(result.errors.len(), 1);
        assert!(result.errors[0].contains("'nope'"));
    }

    #[test]
    fn test_feedback_loop_is_a_warning() {
        let mut registry = TaskRegistry::new();
        registry
            .register_action(
                "webp",
                AssetPipeline::from_glob("src/assets/img/**/*.*")
                    .dest(Destination::multi(["src/assets/img", "dist/assets/img"])),
            )
            .unwrap();
        registry.watch("src/assets/img/**/*.*", ["webp"]).unwrap();

        let result = RegistryValidator::validate(&registry);
        assert!(result.is_valid());
        assert!(result.has_warnings());
        assert!(result.warnings[0].contains("src/assets/img"));
    }

    #[test]
    fn test_empty_task_warning() {
        let mut registry = TaskRegistry::new();
        registry.register(Task::new("placeholder")).unwrap();

        let result = RegistryValidator::validate(&registry);
        assert!(result.is_valid());
        assert_eq!(result.warnings.len(), 1);
    }
}
