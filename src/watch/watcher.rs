// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 assetflow contributors

//! Filesystem watcher

use colored::Colorize;
use notify::{RecursiveMode, Watcher};
use notify_debouncer_mini::{new_debouncer, DebounceEventResult, DebouncedEvent};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tokio::sync::mpsc;

use super::{Dispatcher, WatchSet};
use crate::errors::{AssetflowError, AssetflowResult};
use crate::pipeline::TaskRunner;

/// Watch the project root and trigger bound tasks until the process stops
pub async fn watch(runner: TaskRunner, set: WatchSet, debounce: Duration) -> AssetflowResult<()> {
    let root = runner
        .root()
        .canonicalize()
        .map_err(|e| AssetflowError::Watch {
            message: format!("cannot resolve {}: {}", runner.root().display(), e),
        })?;

    // notify calls the handler on its own thread
    let (tx, mut rx) = mpsc::unbounded_channel::<Vec<DebouncedEvent>>();
    let mut debouncer = new_debouncer(debounce, move |res: DebounceEventResult| match res {
        Ok(events) => {
            let _ = tx.send(events);
        }
        Err(e) => tracing::warn!("File watch error: {}", e),
    })
    .map_err(|e| AssetflowError::Watch {
        message: format!("failed to create file watcher: {}", e),
    })?;

    debouncer
        .watcher()
        .watch(&root, RecursiveMode::Recursive)
        .map_err(|e| AssetflowError::Watch {
            message: format!("failed to start watching: {}", e),
        })?;

    println!(
        "{} {} (debounce: {}ms)",
        "Watching".bold(),
        root.display(),
        debounce.as_millis()
    );
    println!("Press {} to exit.", "Ctrl+C".cyan());

    let dispatcher = Dispatcher::new(runner);

    while let Some(events) = rx.recv().await {
        let changed = changed_paths(&root, events.iter().map(|e| e.path.as_path()));
        let tasks = set.tasks_for(&changed);
        if tasks.is_empty() {
            continue;
        }

        println!();
        println!("{}: {} file(s) changed", "Change detected".yellow(), changed.len());
        for path in &changed {
            tracing::debug!("changed: {}", path.display());
        }

        for task in &tasks {
            dispatcher.trigger(task);
        }
    }

    drop(debouncer);
    Ok(())
}

/// Existing paths of a batch, relative to `root`
///
/// Deleted paths produce no output, so they trigger nothing.
fn changed_paths<'a>(root: &Path, paths: impl Iterator<Item = &'a Path>) -> Vec<PathBuf> {
    let mut changed: Vec<PathBuf> = Vec::new();

    for path in paths {
        if !path.exists() || path.is_dir() {
            continue;
        }
        let Ok(relative) = path.strip_prefix(root) else {
            tracing::debug!("ignoring {} outside of {}", path.display(), root.display());
            continue;
        };
        if !changed.iter().any(|p| p == relative) {
            changed.push(relative.to_path_buf());
        }
    }

    changed
}
