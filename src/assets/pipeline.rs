// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 assetflow contributors

//! Asset stream as a task action

use async_trait::async_trait;
use std::path::{Path, PathBuf};

use super::{ChangedFilter, Destination, FileSet, WriteStatus};
use crate::errors::{AssetflowError, AssetflowResult};
use crate::pipeline::{TaskAction, TaskContext, TaskReport};
use crate::stages::Stage;

/// Source → stages → destination
pub struct AssetPipeline {
    source: FileSet,
    changed: Option<ChangedFilter>,
    stages: Vec<Box<dyn Stage>>,
    destination: Option<Destination>,
}

impl AssetPipeline {
    /// Start a stream from a glob pattern relative to the project root
    pub fn from_glob(pattern: impl Into<String>) -> Self {
        Self {
            source: FileSet::new(pattern),
            changed: None,
            stages: Vec::new(),
            destination: None,
        }
    }

    /// Skip sources whose output is already up to date
    pub fn skip_unchanged(mut self, filter: ChangedFilter) -> Self {
        self.changed = Some(filter);
        self
    }

    /// Append a stage
    pub fn pipe(mut self, stage: impl Stage + 'static) -> Self {
        self.stages.push(Box::new(stage));
        self
    }

    /// Set the destination
    pub fn dest(mut self, destination: Destination) -> Self {
        self.destination = Some(destination);
        self
    }

    /// The source file set
    pub fn source(&self) -> &FileSet {
        &self.source
    }

    /// Names of the stages, in order
    pub fn stage_names(&self) -> Vec<&str> {
        self.stages.iter().map(|s| s.name()).collect()
    }

    /// Run the stream for `task` below `root`
    pub async fn process(&self, task: &str, root: &Path) -> AssetflowResult<TaskReport> {
        let mut report = TaskReport::default();

        let mut paths = self.source.enumerate(root)?;
        if let Some(ref filter) = self.changed {
            let mut stale = Vec::with_capacity(paths.len());
            for path in paths {
                let relative = self.source.relative_path(root, &path);
                if filter.is_stale(root, &path, &relative)? {
                    stale.push(path);
                } else {
                    report.skipped += 1;
                }
            }
            paths = stale;
        }

        let mut assets = self.source.read_paths(root, paths).await?;
        let total = assets.len();
        tracing::debug!("{}: {} source file(s), {} up to date", task, total, report.skipped);

        let mut failures = Vec::new();
        for stage in &self.stages {
            assets = stage.process(assets, &mut failures).await?;
        }

        if let Some(ref destination) = self.destination {
            for asset in &assets {
                // Outputs must end up newer than their sources
                let statuses = if self.changed.is_some() {
                    destination.write_touching(root, asset).await?
                } else {
                    destination.write(root, asset).await?
                };
                for status in statuses {
                    match status {
                        WriteStatus::Written(file) => report.outputs.push(file),
                        WriteStatus::Unchanged(_) => report.unchanged += 1,
                    }
                }
            }
        }

        if !failures.is_empty() {
            return Err(AssetflowError::ItemsFailed {
                task: task.to_string(),
                total,
                failures,
            });
        }

        Ok(report)
    }
}

#[async_trait]
impl TaskAction for AssetPipeline {
    async fn run(&self, ctx: &TaskContext) -> AssetflowResult<TaskReport> {
        self.process(ctx.task(), ctx.root()).await
    }

    fn destinations(&self) -> Vec<PathBuf> {
        self.destination
            .as_ref()
            .map(|d| d.dirs().to_vec())
            .unwrap_or_default()
    }

    fn sources(&self) -> Vec<String> {
        vec![self.source.pattern().to_string()]
    }
}
