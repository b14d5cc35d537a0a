// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 assetflow contributors

//! Destination writer
//!
//! Writes assets below one or more destination directories. A file whose
//! current contents already hash to the new contents is left untouched, so
//! its modification time does not move and no reload is signalled for it.
//!
//! Streams that skip up-to-date sources by modification time write with
//! [`Destination::write_touching`]: an identical output still gets a fresh
//! mtime, otherwise it would look stale against its touched source forever.

use std::path::{Path, PathBuf};
use std::time::SystemTime;

use super::Asset;
use crate::errors::{AssetflowError, AssetflowResult};

/// A file produced by a task
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WrittenFile {
    /// Absolute path of the file
    pub path: PathBuf,
    /// BLAKE3 hash of the contents (hex)
    pub hash: String,
}

impl WrittenFile {
    /// Short revision string for cache busting
    pub fn revision(&self) -> &str {
        &self.hash[..self.hash.len().min(10)]
    }
}

/// Outcome of writing one asset to one directory
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WriteStatus {
    /// File was created or replaced
    Written(WrittenFile),
    /// File already had these contents
    Unchanged(PathBuf),
}

/// One or more destination directories, relative to the project root
#[derive(Debug, Clone)]
pub struct Destination {
    dirs: Vec<PathBuf>,
}

impl Destination {
    /// Single destination directory
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dirs: vec![dir.into()],
        }
    }

    /// Write every asset to each of `dirs`
    pub fn multi<I, P>(dirs: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<PathBuf>,
    {
        Self {
            dirs: dirs.into_iter().map(Into::into).collect(),
        }
    }

    /// Destination directories
    pub fn dirs(&self) -> &[PathBuf] {
        &self.dirs
    }

    /// Write an asset to every destination directory
    pub async fn write(&self, root: &Path, asset: &Asset) -> AssetflowResult<Vec<WriteStatus>> {
        self.write_with(root, asset, false).await
    }

    /// Like [`write`](Self::write), but outputs left unchanged get their
    /// modification time bumped to now
    pub async fn write_touching(&self, root: &Path, asset: &Asset) -> AssetflowResult<Vec<WriteStatus>> {
        self.write_with(root, asset, true).await
    }

    async fn write_with(
        &self,
        root: &Path,
        asset: &Asset,
        touch: bool,
    ) -> AssetflowResult<Vec<WriteStatus>> {
        let hash = blake3::hash(&asset.contents);
        let mut statuses = Vec::with_capacity(self.dirs.len());

        for dir in &self.dirs {
            let target = root.join(dir).join(&asset.relative);

            if Self::has_contents(&target, &hash).await {
                tracing::debug!("{} unchanged", target.display());
                if touch {
                    touch_file(&target).await?;
                }
                statuses.push(WriteStatus::Unchanged(target));
                continue;
            }

            if let Some(parent) = target.parent() {
                tokio::fs::create_dir_all(parent)
                    .await
                    .map_err(|e| AssetflowError::FileWriteError {
                        path: parent.to_path_buf(),
                        error: e.to_string(),
                    })?;
            }

            tokio::fs::write(&target, &asset.contents)
                .await
                .map_err(|e| AssetflowError::FileWriteError {
                    path: target.clone(),
                    error: e.to_string(),
                })?;

            tracing::debug!("wrote {}", target.display());
            statuses.push(WriteStatus::Written(WrittenFile {
                path: target,
                hash: hash.to_hex().to_string(),
            }));
        }

        Ok(statuses)
    }

    async fn has_contents(target: &Path, hash: &blake3::Hash) -> bool {
        match tokio::fs::read(target).await {
            Ok(existing) => blake3::hash(&existing) == *hash,
            Err(_) => false,
        }
    }
}

async fn touch_file(path: &Path) -> AssetflowResult<()> {
    let file = tokio::fs::OpenOptions::new()
        .write(true)
        .open(path)
        .await
        .map_err(|e| AssetflowError::FileWriteError {
            path: path.to_path_buf(),
            error: e.to_string(),
        })?
        .into_std()
        .await;

    file.set_modified(SystemTime::now())
        .map_err(|e| AssetflowError::FileWriteError {
            path: path.to_path_buf(),
            error: e.to_string(),
        })
}
