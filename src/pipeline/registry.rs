// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 assetflow contributors

//! Task registry
//!
//! The registry is built once at startup and then handed to the runner. It
//! holds the task table and the watch bindings.

use std::collections::HashMap;
use std::sync::Arc;

use super::{Composition, ReservedName, Task, TaskAction, TaskName};
use crate::errors::{AssetflowError, AssetflowResult};
use crate::watch::{WatchBinding, WatchSet};

/// Registered tasks, in registration order
#[derive(Default)]
pub struct TaskRegistry {
    tasks: Vec<Arc<Task>>,
    index: HashMap<TaskName, usize>,
    bindings: Vec<WatchBinding>,
}

impl TaskRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a task
    ///
    /// Reserved names are rejected. Dependencies of a concurrent task must
    /// already be registered; a sequential task's dependencies are checked
    /// when it is invoked. Registering an existing name replaces the task.
    pub fn register(&mut self, task: Task) -> AssetflowResult<()> {
        if ReservedName::from_name(&task.name).is_some() {
            return Err(AssetflowError::ReservedTaskName {
                name: task.name,
                reserved: ReservedName::joined(),
            });
        }

        if task.composition == Composition::Concurrent {
            if let Some(missing) = task.dependencies.iter().find(|d| !self.contains(d)) {
                return Err(AssetflowError::UnknownDependency {
                    task: task.name.clone(),
                    dependency: missing.clone(),
                });
            }
        }

        match self.index.get(&task.name) {
            Some(&idx) => {
                tracing::warn!("Task '{}' registered twice, replacing it", task.name);
                self.tasks[idx] = Arc::new(task);
            }
            None => {
                self.index.insert(task.name.clone(), self.tasks.len());
                self.tasks.push(Arc::new(task));
            }
        }

        Ok(())
    }

    /// Register a leaf task from a name and an action
    pub fn register_action(
        &mut self,
        name: impl Into<TaskName>,
        action: impl TaskAction + 'static,
    ) -> AssetflowResult<()> {
        self.register(Task::new(name).action(action))
    }

    /// Bind a glob pattern to one or more tasks
    pub fn watch<I, S>(&mut self, pattern: &str, tasks: I) -> AssetflowResult<()>
    where
        I: IntoIterator<Item = S>,
        S: Into<TaskName>,
    {
        let binding = WatchBinding::new(pattern, tasks.into_iter().map(Into::into).collect())?;
        self.bindings.push(binding);
        Ok(())
    }

    /// Look up a task
    pub fn get(&self, name: &str) -> Option<Arc<Task>> {
        self.index.get(name).map(|&idx| Arc::clone(&self.tasks[idx]))
    }

    /// Whether a task is registered
    pub fn contains(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    /// Tasks in registration order
    pub fn tasks(&self) -> impl Iterator<Item = &Task> {
        self.tasks.iter().map(|t| t.as_ref())
    }

    /// Task names in registration order
    pub fn names(&self) -> Vec<&str> {
        self.tasks.iter().map(|t| t.name.as_str()).collect()
    }

    /// Number of tasks
    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    /// Whether no task is registered
    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    /// Watch bindings in registration order
    pub fn bindings(&self) -> &[WatchBinding] {
        &self.bindings
    }

    /// Compiled watch bindings
    pub fn watch_set(&self) -> WatchSet {
        WatchSet::new(self.bindings.clone())
    }
}
