// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 assetflow contributors

//! Task definition structures

use async_trait::async_trait;
use std::fmt;
use std::future::Future;
use std::path::PathBuf;
use std::sync::Arc;

use super::TaskContext;
use crate::assets::WrittenFile;
use crate::errors::AssetflowResult;

/// Task identifier
pub type TaskName = String;

/// How a task's dependencies are run relative to each other
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Composition {
    /// One after another, in listed order, each waiting for the previous one
    #[default]
    Sequential,
    /// All at once, joined before the task's own action starts
    Concurrent,
}

impl fmt::Display for Composition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Sequential => write!(f, "series"),
            Self::Concurrent => write!(f, "parallel"),
        }
    }
}

/// Names the runner handles itself; they can't be registered as tasks
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReservedName {
    /// Print the task table
    List,
    /// Print the dependency graph
    Graph,
    /// Print usage
    Help,
}

impl ReservedName {
    /// Every reserved name
    pub const ALL: [ReservedName; 3] = [Self::List, Self::Graph, Self::Help];

    /// Look up a reserved name
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|r| r.as_str() == name)
    }

    /// The reserved string
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::List => "list",
            Self::Graph => "graph",
            Self::Help => "help",
        }
    }

    /// Comma separated list for messages
    pub fn joined() -> String {
        Self::ALL
            .iter()
            .map(|r| r.as_str())
            .collect::<Vec<_>>()
            .join(", ")
    }
}

impl fmt::Display for ReservedName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What connected browsers should do after the task wrote something
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ReloadPolicy {
    /// Nothing
    #[default]
    None,
    /// Reload the page
    Reload,
    /// Swap the written stylesheets in place
    Inject,
}

/// What a task invocation produced
#[derive(Debug, Clone, Default)]
pub struct TaskReport {
    /// Files created or replaced
    pub outputs: Vec<WrittenFile>,
    /// Outputs that already had the produced contents
    pub unchanged: usize,
    /// Sources skipped as up to date
    pub skipped: usize,
}

impl TaskReport {
    /// Fold another report into this one
    pub fn merge(&mut self, other: TaskReport) {
        self.outputs.extend(other.outputs);
        self.unchanged += other.unchanged;
        self.skipped += other.skipped;
    }

    /// Whether the invocation wrote anything
    pub fn wrote_files(&self) -> bool {
        !self.outputs.is_empty()
    }

    /// Short human summary, e.g. "3 written, 1 up to date"
    pub fn summary(&self) -> String {
        let mut parts = Vec::new();
        if !self.outputs.is_empty() {
            parts.push(format!("{} written", self.outputs.len()));
        }
        if self.unchanged > 0 {
            parts.push(format!("{} unchanged", self.unchanged));
        }
        if self.skipped > 0 {
            parts.push(format!("{} up to date", self.skipped));
        }
        parts.join(", ")
    }
}

/// The side-effecting body of a task
#[async_trait]
pub trait TaskAction: Send + Sync {
    /// Run the action once
    async fn run(&self, ctx: &TaskContext) -> AssetflowResult<TaskReport>;

    /// Directories (relative to the project root) the action writes to
    fn destinations(&self) -> Vec<PathBuf> {
        Vec::new()
    }

    /// Glob patterns the action reads
    fn sources(&self) -> Vec<String> {
        Vec::new()
    }
}

/// Task action backed by an async closure
pub struct FnAction<F> {
    f: F,
}

/// Wrap an async closure as a [`TaskAction`]
pub fn action_fn<F, Fut>(f: F) -> FnAction<F>
where
    F: Fn(TaskContext) -> Fut + Send + Sync,
    Fut: Future<Output = AssetflowResult<TaskReport>> + Send,
{
    FnAction { f }
}

#[async_trait]
impl<F, Fut> TaskAction for FnAction<F>
where
    F: Fn(TaskContext) -> Fut + Send + Sync,
    Fut: Future<Output = AssetflowResult<TaskReport>> + Send,
{
    async fn run(&self, ctx: &TaskContext) -> AssetflowResult<TaskReport> {
        (self.f)(ctx.clone()).await
    }
}

/// A named unit of build work
#[derive(Clone)]
pub struct Task {
    /// Unique task name
    pub name: TaskName,
    /// One-line description for `assetflow list`
    pub description: Option<String>,
    /// Action run after the dependencies completed
    pub action: Option<Arc<dyn TaskAction>>,
    /// Tasks that must complete first
    pub dependencies: Vec<TaskName>,
    /// How the dependencies run relative to each other
    pub composition: Composition,
    /// Browser signal after a successful run
    pub reload: ReloadPolicy,
}

impl Task {
    /// A task without action or dependencies
    pub fn new(name: impl Into<TaskName>) -> Self {
        Self {
            name: name.into(),
            description: None,
            action: None,
            dependencies: Vec::new(),
            composition: Composition::Sequential,
            reload: ReloadPolicy::None,
        }
    }

    /// Set the action
    pub fn action(mut self, action: impl TaskAction + 'static) -> Self {
        self.action = Some(Arc::new(action));
        self
    }

    /// Run `tasks` one after another before the action
    pub fn series<I, S>(mut self, tasks: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<TaskName>,
    {
        self.dependencies = tasks.into_iter().map(Into::into).collect();
        self.composition = Composition::Sequential;
        self
    }

    /// Run `tasks` concurrently before the action
    pub fn parallel<I, S>(mut self, tasks: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<TaskName>,
    {
        self.dependencies = tasks.into_iter().map(Into::into).collect();
        self.composition = Composition::Concurrent;
        self
    }

    /// Set the description
    pub fn describe(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Set the reload policy
    pub fn reload(mut self, policy: ReloadPolicy) -> Self {
        self.reload = policy;
        self
    }

    /// Whether the task only composes other tasks
    pub fn is_composite(&self) -> bool {
        self.action.is_none()
    }
}

impl fmt::Debug for Task {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Task")
            .field("name", &self.name)
            .field("dependencies", &self.dependencies)
            .field("composition", &self.composition)
            .field("reload", &self.reload)
            .field("has_action", &self.action.is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reserved_names() {
        assert_eq!(ReservedName::from_name("list"), Some(ReservedName::List));
        assert_eq!(ReservedName::from_name("graph"), Some(ReservedName::Graph));
        assert_eq!(ReservedName::from_name("build"), None);
        assert_eq!(ReservedName::joined(), "list, graph, help");
    }

    #[test]
    fn test_builder_sets_composition() {
        let task = Task::new("build").parallel(["a", "b"]);
        assert_eq!(task.composition, Composition::Concurrent);
        assert_eq!(task.dependencies, vec!["a", "b"]);
        assert!(task.is_composite());

        let task = Task::new("chain").series(["a"]);
        assert_eq!(task.composition, Composition::Sequential);
    }

    #[test]
    fn test_report_summary() {
        let mut report = TaskReport {
            outputs: vec![],
            unchanged: 1,
            skipped: 0,
        };
        report.merge(TaskReport {
            outputs: vec![WrittenFile {
                path: PathBuf::from("dist/a.css"),
                hash: "abc".into(),
            }],
            unchanged: 0,
            skipped: 2,
        });

        assert!(report.wrote_files());
        assert_eq!(report.summary(), "1 written, 1 unchanged, 2 up to date");
    }
}
