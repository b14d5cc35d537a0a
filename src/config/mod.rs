// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 assetflow contributors

//! Project configuration
//!
//! Reads the optional `.assetflow.yaml` file at the project root. Every field
//! has a default, so a project that follows the standard layout needs no file
//! at all.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::errors::{AssetflowError, AssetflowResult};

/// Default configuration file name
pub const CONFIG_FILE: &str = ".assetflow.yaml";

/// Project configuration from .assetflow.yaml
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProjectConfig {
    /// Source tree root
    #[serde(default = "default_src")]
    pub src: PathBuf,

    /// Destination tree root
    #[serde(default = "default_dist")]
    pub dist: PathBuf,

    /// Dev server settings
    #[serde(default)]
    pub server: ServerConfig,

    /// Watch mode settings
    #[serde(default)]
    pub watch: WatchConfig,

    /// External JS bundler settings
    #[serde(default)]
    pub bundler: BundlerConfig,

    /// Raster image settings
    #[serde(default)]
    pub images: ImageConfig,
}

fn default_src() -> PathBuf {
    PathBuf::from("src")
}

fn default_dist() -> PathBuf {
    PathBuf::from("dist")
}

impl Default for ProjectConfig {
    fn default() -> Self {
        Self {
            src: default_src(),
            dist: default_dist(),
            server: ServerConfig::default(),
            watch: WatchConfig::default(),
            bundler: BundlerConfig::default(),
            images: ImageConfig::default(),
        }
    }
}

impl ProjectConfig {
    /// Load configuration, falling back to defaults when the file is absent
    pub fn load(path: &Path) -> AssetflowResult<Self> {
        if !path.exists() {
            tracing::debug!("No {} found, using defaults", path.display());
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path).map_err(|e| AssetflowError::FileReadError {
            path: path.to_path_buf(),
            error: e.to_string(),
        })?;

        Self::from_yaml(&content).map_err(|e| AssetflowError::InvalidConfig {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })
    }

    /// Parse configuration from a YAML string
    pub fn from_yaml(yaml: &str) -> AssetflowResult<Self> {
        // An empty document deserializes to unit, not to a mapping
        if yaml.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_yaml::from_str(yaml).map_err(Into::into)
    }

    /// Glob pattern (with `/` separators) below the source root
    pub fn src_glob(&self, pattern: &str) -> String {
        join_pattern(&self.src, pattern)
    }

    /// Directory below the source root
    pub fn src_dir(&self, sub: &str) -> PathBuf {
        if sub.is_empty() {
            self.src.clone()
        } else {
            self.src.join(sub)
        }
    }

    /// Directory below the destination root
    pub fn dist_dir(&self, sub: &str) -> PathBuf {
        if sub.is_empty() {
            self.dist.clone()
        } else {
            self.dist.join(sub)
        }
    }
}

fn join_pattern(base: &Path, pattern: &str) -> String {
    let base = base.to_string_lossy().replace('\\', "/");
    let base = base.trim_end_matches('/');
    if base.is_empty() || base == "." {
        pattern.to_string()
    } else {
        format!("{}/{}", base, pattern)
    }
}

/// Dev server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Listening port
    #[serde(default = "default_port")]
    pub port: u16,

    /// Show an in-page toast when the client connects or reloads
    #[serde(default = "default_true")]
    pub notify: bool,
}

fn default_port() -> u16 {
    4000
}

fn default_true() -> bool {
    true
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: default_port(),
            notify: true,
        }
    }
}

/// Watch mode configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WatchConfig {
    /// Debounce delay in milliseconds
    #[serde(default = "default_debounce")]
    pub debounce_ms: u64,
}

fn default_debounce() -> u64 {
    300
}

impl Default for WatchConfig {
    fn default() -> Self {
        Self {
            debounce_ms: default_debounce(),
        }
    }
}

/// External JS bundler configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BundlerConfig {
    /// Bundler executable (looked up on PATH)
    #[serde(default = "default_bundler")]
    pub program: String,

    /// Language target passed to the bundler
    #[serde(default = "default_target")]
    pub target: String,

    /// Output file name inside the destination root
    #[serde(default = "default_bundle_name")]
    pub output: String,
}

fn default_bundler() -> String {
    "esbuild".to_string()
}

fn default_target() -> String {
    "es2015".to_string()
}

fn default_bundle_name() -> String {
    "script.js".to_string()
}

impl Default for BundlerConfig {
    fn default() -> Self {
        Self {
            program: default_bundler(),
            target: default_target(),
            output: default_bundle_name(),
        }
    }
}

/// Raster image configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImageConfig {
    /// JPEG quality for `imagemin`
    #[serde(default = "default_jpeg_quality")]
    pub jpeg_quality: u8,

    /// JPEG quality for `iconsmin`
    #[serde(default = "default_icon_quality")]
    pub icon_jpeg_quality: u8,
}

fn default_jpeg_quality() -> u8 {
    80
}

fn default_icon_quality() -> u8 {
    90
}

impl Default for ImageConfig {
    fn default() -> Self {
        Self {
            jpeg_quality: default_jpeg_quality(),
            icon_jpeg_quality: default_icon_quality(),
        }
    }
}
