// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 assetflow contributors

//! # assetflow - front-end asset flow runner
//!
//! `assetflow` builds the front-end of a website from a `src/` tree into a
//! `dist/` tree and keeps it fresh while you work.
//!
//! ## Features
//!
//! - **Task graph** - named tasks composed in series or in parallel, each
//!   run at most once per invocation
//! - **Asset streams** - glob, transform, write; one bad file does not stop
//!   the others
//! - **Transforms** - Sass, CSS prefixing and minification, HTML
//!   minification, JS bundling, image and SVG optimization, sprites
//! - **Watch mode** - debounced file watching with per-task rerun queueing
//! - **Live reload** - dev server that reloads pages and swaps stylesheets
//!
//! ## Quick Start
//!
//! ```bash
//! # Build, serve and watch
//! assetflow
//!
//! # One-shot production build
//! assetflow prod
//!
//! # Show the task table
//! assetflow list
//! ```

pub mod assets;
pub mod cli;
pub mod config;
pub mod errors;
pub mod pipeline;
pub mod server;
pub mod stages;
pub mod tasks;
pub mod utils;
pub mod watch;

// Re-export commonly used types
pub use assets::{Asset, AssetPipeline, Destination, FileSet};
pub use config::ProjectConfig;
pub use errors::{AssetflowError, AssetflowResult};
pub use pipeline::{Task, TaskRegistry, TaskReport, TaskRunner};
pub use stages::Stage;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
