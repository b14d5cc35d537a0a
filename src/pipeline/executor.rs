// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 assetflow contributors

//! Task runner
//!
//! Every top-level invocation opens a session. Inside a session each task
//! runs at most once: a task reached through several dependency paths is
//! awaited by all of them but executed a single time.

use colored::Colorize;
use futures::future::{join_all, BoxFuture};
use futures::FutureExt;
use std::collections::HashMap;
use std::future::Future;
use std::path::{Path, PathBuf};
use std::pin::Pin;
use std::sync::{Arc, Mutex, PoisonError};
use std::task::{Context, Poll};
use std::time::Instant;
use tokio::sync::OnceCell;
use tokio::task::JoinHandle;

use super::{Composition, ReloadPolicy, Task, TaskGraph, TaskName, TaskRegistry, TaskReport};
use crate::errors::{AssetflowError, AssetflowResult};
use crate::server::{InjectedAsset, LiveReload, ReloadEvent};
use crate::utils::print_item_failures;

type Outcome = Result<TaskReport, Arc<AssetflowError>>;

/// Per-invocation memo of task outcomes
#[derive(Default)]
struct Session {
    cells: Mutex<HashMap<TaskName, Arc<OnceCell<Outcome>>>>,
}

impl Session {
    fn cell(&self, name: &str) -> Arc<OnceCell<Outcome>> {
        let mut cells = self.cells.lock().unwrap_or_else(PoisonError::into_inner);
        Arc::clone(cells.entry(name.to_string()).or_default())
    }
}

struct RunnerInner {
    registry: TaskRegistry,
    root: PathBuf,
    live_reload: LiveReload,
}

/// Runs tasks from a frozen registry
#[derive(Clone)]
pub struct TaskRunner {
    inner: Arc<RunnerInner>,
}

impl TaskRunner {
    /// Create a runner for the project at `root`
    pub fn new(registry: TaskRegistry, root: impl Into<PathBuf>) -> Self {
        Self {
            inner: Arc::new(RunnerInner {
                registry,
                root: root.into(),
                live_reload: LiveReload::new(),
            }),
        }
    }

    pub fn registry(&self) -> &TaskRegistry {
        &self.inner.registry
    }

    pub fn root(&self) -> &Path {
        &self.inner.root
    }

    /// Channel the runner signals after tasks wrote files
    pub fn live_reload(&self) -> &LiveReload {
        &self.inner.live_reload
    }

    /// Run a task and its dependencies in a fresh session
    pub async fn run(&self, name: &str) -> AssetflowResult<TaskReport> {
        TaskGraph::for_task(&self.inner.registry, name)?;

        let session = Arc::new(Session::default());
        let outcome = self.execute(name.to_string(), Arc::clone(&session)).await;
        drop(session);

        outcome.map_err(|e| unshare(name, e))
    }

    /// Start a task in the background
    pub fn spawn(&self, name: &str) -> TaskHandle {
        let runner = self.clone();
        let task = name.to_string();
        let inner = tokio::spawn(async move { runner.run(&task).await });

        TaskHandle {
            name: name.to_string(),
            inner,
        }
    }

    fn execute(&self, name: TaskName, session: Arc<Session>) -> BoxFuture<'static, Outcome> {
        let runner = self.clone();
        async move {
            let cell = session.cell(&name);
            cell.get_or_init(|| runner.invoke(name.clone(), Arc::clone(&session)))
                .await
                .clone()
        }
        .boxed()
    }

    fn invoke(self, name: TaskName, session: Arc<Session>) -> BoxFuture<'static, Outcome> {
        async move {
            let Some(task) = self.inner.registry.get(&name) else {
                return Err(Arc::new(AssetflowError::UnknownTask { task: name.clone() }));
            };

            if let Err(e) = self.run_dependencies(&task, &session).await {
                return Err(e);
            }

            let Some(action) = task.action.clone() else {
                return Ok(TaskReport::default());
            };

            println!("  {} {}", "→".blue(), name);
            let start = Instant::now();
            let ctx = TaskContext {
                task: name.clone(),
                runner: self.clone(),
                session,
            };

            match action.run(&ctx).await {
                Ok(report) => {
                    let summary = report.summary();
                    println!(
                        "  {} {} {}({:.2}s)",
                        "✓".green(),
                        name.bold(),
                        if summary.is_empty() {
                            String::new()
                        } else {
                            format!("{} ", summary).dimmed().to_string()
                        },
                        start.elapsed().as_secs_f64()
                    );
                    self.signal_reload(&task, &report);
                    Ok(report)
                }
                Err(e) => {
                    println!("  {} {} failed: {}", "✗".red(), name.bold(), e);
                    print_item_failures(&e);
                    Err(Arc::new(e))
                }
            }
        }
        .boxed()
    }

    async fn run_dependencies(&self, task: &Task, session: &Arc<Session>) -> Result<(), Arc<AssetflowError>> {
        let failed = match task.composition {
            Composition::Sequential => {
                let mut failed = None;
                for dep in &task.dependencies {
                    if self.execute(dep.clone(), Arc::clone(session)).await.is_err() {
                        failed = Some(dep.clone());
                        break;
                    }
                }
                failed
            }
            Composition::Concurrent => {
                let outcomes = join_all(
                    task.dependencies
                        .iter()
                        .map(|dep| self.execute(dep.clone(), Arc::clone(session))),
                )
                .await;

                task.dependencies
                    .iter()
                    .zip(outcomes)
                    .find(|(_, outcome)| outcome.is_err())
                    .map(|(dep, _)| dep.clone())
            }
        };

        match failed {
            Some(dependency) => Err(Arc::new(AssetflowError::DependencyFailed {
                task: task.name.clone(),
                dependency,
            })),
            None => Ok(()),
        }
    }

    fn signal_reload(&self, task: &Task, report: &TaskReport) {
        if !report.wrote_files() {
            return;
        }

        let event = match task.reload {
            ReloadPolicy::None => return,
            ReloadPolicy::Reload => ReloadEvent::Reload,
            ReloadPolicy::Inject => ReloadEvent::Inject {
                assets: report
                    .outputs
                    .iter()
                    .map(|file| InjectedAsset {
                        name: file
                            .path
                            .file_name()
                            .map(|n| n.to_string_lossy().into_owned())
                            .unwrap_or_default(),
                        revision: file.revision().to_string(),
                    })
                    .collect(),
            },
        };

        self.inner.live_reload.notify(event);
    }
}

/// Recover the owned error once the session released its copy
fn unshare(task: &str, error: Arc<AssetflowError>) -> AssetflowError {
    Arc::try_unwrap(error).unwrap_or_else(|shared| AssetflowError::TaskFailed {
        task: task.to_string(),
        reason: shared.to_string(),
    })
}

/// What an action sees while it runs
#[derive(Clone)]
pub struct TaskContext {
    task: TaskName,
    runner: TaskRunner,
    session: Arc<Session>,
}

impl TaskContext {
    /// Name of the running task
    pub fn task(&self) -> &str {
        &self.task
    }

    /// Project root
    pub fn root(&self) -> &Path {
        self.runner.root()
    }

    pub fn runner(&self) -> &TaskRunner {
        &self.runner
    }

    /// Run another task inside the current session
    ///
    /// A task that already ran in this session is not run again; its
    /// earlier outcome is returned.
    pub async fn run_in_session(&self, name: &str) -> AssetflowResult<TaskReport> {
        TaskGraph::for_task(self.runner.registry(), name)?;

        self.runner
            .execute(name.to_string(), Arc::clone(&self.session))
            .await
            .map_err(|e| unshare(name, e))
    }
}

/// Completion handle of a spawned task
pub struct TaskHandle {
    name: TaskName,
    inner: JoinHandle<AssetflowResult<TaskReport>>,
}

impl TaskHandle {
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Stop the task at its next await point
    pub fn abort(&self) {
        self.inner.abort();
    }
}

impl Future for TaskHandle {
    type Output = AssetflowResult<TaskReport>;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        match Pin::new(&mut self.inner).poll(cx) {
            Poll::Ready(Ok(result)) => Poll::Ready(result),
            Poll::Ready(Err(e)) => Poll::Ready(Err(AssetflowError::TaskFailed {
                task: self.name.clone(),
                reason: e.to_string(),
            })),
            Poll::Pending => Poll::Pending,
        }
    }
}
