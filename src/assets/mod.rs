// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 assetflow contributors

//! Asset streams
//!
//! An asset stream reads a [`FileSet`], optionally drops sources whose output
//! is already up to date ([`ChangedFilter`]), pushes the remaining assets
//! through a list of stages and hands the results to a [`Destination`].

mod changed;
mod dest;
mod fileset;
mod pipeline;

pub use changed::ChangedFilter;
pub use dest::{Destination, WriteStatus, WrittenFile};
pub use fileset::{glob_base, FileSet};
pub use pipeline::AssetPipeline;

use std::path::{Path, PathBuf};

/// A file in flight between the source tree and the destination tree
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Asset {
    /// Path the asset was read from
    pub source: PathBuf,
    /// Output path relative to the destination directory
    pub relative: PathBuf,
    /// Current contents
    pub contents: Vec<u8>,
}

impl Asset {
    /// Create a new asset
    pub fn new(source: impl Into<PathBuf>, relative: impl Into<PathBuf>, contents: Vec<u8>) -> Self {
        Self {
            source: source.into(),
            relative: relative.into(),
            contents,
        }
    }

    /// Lowercased extension of the output path
    pub fn extension(&self) -> Option<String> {
        self.relative
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_ascii_lowercase())
    }

    /// File stem of the output path
    pub fn stem(&self) -> String {
        self.relative
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default()
    }

    /// Contents as UTF-8 text
    pub fn text(&self) -> Result<&str, String> {
        std::str::from_utf8(&self.contents).map_err(|e| format!("not valid UTF-8: {}", e))
    }

    /// Replace the contents
    pub fn with_contents(mut self, contents: impl Into<Vec<u8>>) -> Self {
        self.contents = contents.into();
        self
    }

    /// Replace the extension of the output path
    pub fn with_extension(mut self, extension: &str) -> Self {
        self.relative.set_extension(extension);
        self
    }

    /// Replace the output path
    pub fn with_relative(mut self, relative: impl AsRef<Path>) -> Self {
        self.relative = relative.as_ref().to_path_buf();
        self
    }
}
