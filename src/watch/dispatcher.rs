// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 assetflow contributors

//! Watch-triggered task runs
//!
//! A task is never run twice at the same time from watch mode. A trigger
//! that arrives while the task runs is remembered, and the task runs once
//! more after the current run; further triggers in that window coalesce.

use colored::Colorize;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};
use tokio::task::JoinHandle;

use crate::errors::AssetflowError;
use crate::pipeline::{TaskName, TaskRunner};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Slot {
    Running,
    Pending,
}

/// Starts watch-triggered runs
#[derive(Clone)]
pub struct Dispatcher {
    runner: TaskRunner,
    slots: Arc<Mutex<HashMap<TaskName, Slot>>>,
}

impl Dispatcher {
    pub fn new(runner: TaskRunner) -> Self {
        Self {
            runner,
            slots: Arc::default(),
        }
    }

    /// Trigger a run of `task`
    ///
    /// Returns the handle of the spawned run loop, or `None` when the task
    /// was already running and the trigger got queued.
    pub fn trigger(&self, task: &str) -> Option<JoinHandle<()>> {
        {
            let mut slots = self.slots.lock().unwrap_or_else(PoisonError::into_inner);
            match slots.get(task) {
                Some(_) => {
                    tracing::debug!("{} is running, queueing another run", task);
                    slots.insert(task.to_string(), Slot::Pending);
                    return None;
                }
                None => {
                    slots.insert(task.to_string(), Slot::Running);
                }
            }
        }

        let this = self.clone();
        let task = task.to_string();
        Some(tokio::spawn(async move { this.run_loop(task).await }))
    }

    async fn run_loop(&self, task: TaskName) {
        loop {
            if let Err(e) = self.runner.run(&task).await {
                report_failure(&task, &e);
            }

            let mut slots = self.slots.lock().unwrap_or_else(PoisonError::into_inner);
            match slots.get(&task) {
                Some(Slot::Pending) => {
                    slots.insert(task.clone(), Slot::Running);
                }
                _ => {
                    slots.remove(&task);
                    return;
                }
            }
        }
    }
}

// The watcher keeps going after a failed run; failed items were already
// listed by the runner
fn report_failure(task: &str, error: &AssetflowError) {
    eprintln!("{} {}: {}", "✗".red(), task.bold(), error);
    eprintln!("  {}", "Waiting for changes...".dimmed());
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::{action_fn, TaskRegistry, TaskReport};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;
    use tokio::sync::Notify;

    fn counting_runner(count: Arc<AtomicUsize>, gate: Arc<Notify>) -> TaskRunner {
        let mut registry = TaskRegistry::new();
        registry
            .register_action(
                "build-sass",
                action_fn(move |_| {
                    let count = Arc::clone(&count);
                    let gate = Arc::clone(&gate);
                    async move {
                        count.fetch_add(1, Ordering::SeqCst);
                        gate.notified().await;
                        Ok::<_, AssetflowError>(TaskReport::default())
                    }
                }),
            )
            .unwrap();
        TaskRunner::new(registry, ".")
    }

    #[tokio::test]
    async fn test_single_trigger_runs_once() {
        let count = Arc::new(AtomicUsize::new(0));
        let gate = Arc::new(Notify::new());
        let dispatcher = Dispatcher::new(counting_runner(Arc::clone(&count), Arc::clone(&gate)));

        let handle = dispatcher.trigger("build-sass").unwrap();
        gate.notify_one();
        handle.await.unwrap();

        assert_eq!(count.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_triggers_while_running_coalesce() {
        let count = Arc::new(AtomicUsize::new(0));
        let gate = Arc::new(Notify::new());
        let dispatcher = Dispatcher::new(counting_runner(Arc::clone(&count), Arc::clone(&gate)));

        let handle = dispatcher.trigger("build-sass").unwrap();
        while count.load(Ordering::SeqCst) == 0 {
            tokio::time::sleep(Duration::from_millis(5)).await;
        }

        assert!(dispatcher.trigger("build-sass").is_none());
        assert!(dispatcher.trigger("build-sass").is_none());
        assert!(dispatcher.trigger("build-sass").is_none());

        // Release the first run, then the single queued rerun
        gate.notify_one();
        while count.load(Ordering::SeqCst) < 2 {
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
        gate.notify_one();
        handle.await.unwrap();

        assert_eq!(count.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_failed_run_releases_slot() {
        let mut registry = TaskRegistry::new();
        registry
            .register_action(
                "broken",
                action_fn(|ctx| async move {
                    Err::<TaskReport, _>(AssetflowError::TaskFailed {
                        task: ctx.task().to_string(),
                        reason: "boom".into(),
                    })
                }),
            )
            .unwrap();
        let dispatcher = Dispatcher::new(TaskRunner::new(registry, "."));

        dispatcher.trigger("broken").unwrap().await.unwrap();
        assert!(dispatcher.trigger("broken").is_some());
    }
}
