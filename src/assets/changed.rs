// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 assetflow contributors

//! Unchanged-skip policy
//!
//! A source is reprocessed only when its output does not exist yet or the
//! source was modified after the output. Comparison uses modification times,
//! never contents.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use crate::errors::{AssetflowError, AssetflowResult};

/// Drops sources whose output in `dest` is already up to date
#[derive(Debug, Clone)]
pub struct ChangedFilter {
    dest: PathBuf,
    extension: Option<String>,
}

impl ChangedFilter {
    /// Compare against outputs below `dest` (relative to the project root)
    pub fn new(dest: impl Into<PathBuf>) -> Self {
        Self {
            dest: dest.into(),
            extension: None,
        }
    }

    /// Outputs carry this extension instead of the source's
    pub fn with_extension(mut self, extension: impl Into<String>) -> Self {
        self.extension = Some(extension.into());
        self
    }

    /// Output path for a source with the given relative path
    pub fn destination_for(&self, root: &Path, relative: &Path) -> PathBuf {
        let mut target = root.join(&self.dest).join(relative);
        if let Some(ref ext) = self.extension {
            target.set_extension(ext);
        }
        target
    }

    /// Whether `source` needs to be processed again
    pub fn is_stale(&self, root: &Path, source: &Path, relative: &Path) -> AssetflowResult<bool> {
        let target = self.destination_for(root, relative);

        let target_meta = match std::fs::metadata(&target) {
            Ok(meta) => meta,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(true),
            Err(e) => {
                return Err(AssetflowError::FileReadError {
                    path: target,
                    error: e.to_string(),
                })
            }
        };

        let source_meta = std::fs::metadata(source).map_err(|e| AssetflowError::FileReadError {
            path: source.to_path_buf(),
            error: e.to_string(),
        })?;

        let source_time = source_meta.modified()?;
        let target_time = target_meta.modified()?;

        Ok(source_time > target_time)
    }
}
