// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 assetflow contributors

//! Error types
//!
//! Errors fall into three families: configuration errors (detected when the
//! task table is registered or validated, fatal at startup), per-item
//! transform errors (collected while a stream runs, the rest of the stream
//! still completes), and I/O or tool errors (fatal to the task that hit them).

use miette::Diagnostic;
use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

/// Result type for assetflow operations
pub type AssetflowResult<T> = Result<T, AssetflowError>;

/// A single asset that a stage could not process
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ItemFailure {
    /// Stage that rejected the item
    pub stage: String,
    /// Source file of the item
    pub path: PathBuf,
    /// Message reported by the underlying library
    pub message: String,
}

impl fmt::Display for ItemFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}: {}", self.stage, self.path.display(), self.message)
    }
}

/// Main error type for assetflow
#[derive(Error, Debug, Diagnostic)]
pub enum AssetflowError {
    // ─────────────────────────────────────────────────────────────────────────
    // Configuration Errors
    // ─────────────────────────────────────────────────────────────────────────
    #[error("Task name '{name}' is reserved by the runner")]
    #[diagnostic(
        code(assetflow::reserved_name),
        help("Reserved names: {reserved}. Pick another name for your task.")
    )]
    ReservedTaskName { name: String, reserved: String },

    #[error("Task '{task}' not found")]
    #[diagnostic(
        code(assetflow::unknown_task),
        help("Run 'assetflow list' to see the registered tasks")
    )]
    UnknownTask { task: String },

    #[error("Task '{task}' depends on unknown task '{dependency}'")]
    #[diagnostic(
        code(assetflow::unknown_dependency),
        help("Register '{dependency}' before '{task}', or fix the dependency name")
    )]
    UnknownDependency { task: String, dependency: String },

    #[error("Circular dependency detected: {}", .tasks.join(" -> "))]
    #[diagnostic(
        code(assetflow::circular_dependency),
        help("Review the task dependencies to remove the cycle ('assetflow graph' prints them)")
    )]
    CircularDependency { tasks: Vec<String> },

    #[error("Watch binding '{pattern}' refers to unknown task '{task}'")]
    #[diagnostic(code(assetflow::unknown_watch_task))]
    UnknownWatchTask { pattern: String, task: String },

    #[error("Invalid configuration in '{path}': {reason}")]
    #[diagnostic(code(assetflow::invalid_config))]
    InvalidConfig { path: PathBuf, reason: String },

    // ─────────────────────────────────────────────────────────────────────────
    // Execution Errors
    // ─────────────────────────────────────────────────────────────────────────
    #[error("Task '{task}' failed: {reason}")]
    #[diagnostic(code(assetflow::task_failed))]
    TaskFailed { task: String, reason: String },

    #[error("Task '{task}' did not run because '{dependency}' failed")]
    #[diagnostic(code(assetflow::dependency_failed))]
    DependencyFailed { task: String, dependency: String },

    #[error("{} of {} item(s) failed in task '{}'", .failures.len(), .total, .task)]
    #[diagnostic(
        code(assetflow::items_failed),
        help("The remaining items were written. Fix the reported files and run the task again.")
    )]
    ItemsFailed {
        task: String,
        total: usize,
        failures: Vec<ItemFailure>,
    },

    #[error("Stage '{stage}' failed on '{path}': {message}")]
    #[diagnostic(code(assetflow::stage_failed))]
    StageFailed {
        stage: String,
        path: PathBuf,
        message: String,
    },

    // ─────────────────────────────────────────────────────────────────────────
    // Tool Errors
    // ─────────────────────────────────────────────────────────────────────────
    #[error("Tool '{tool}' not found")]
    #[diagnostic(code(assetflow::tool_not_found), help("{suggestion}"))]
    ToolNotFound { tool: String, suggestion: String },

    #[error("Tool '{tool}' execution failed: {error}")]
    #[diagnostic(code(assetflow::tool_execution_failed))]
    ToolExecutionFailed {
        tool: String,
        error: String,
        #[help]
        help: Option<String>,
    },

    // ─────────────────────────────────────────────────────────────────────────
    // File Errors
    // ─────────────────────────────────────────────────────────────────────────
    #[error("Source directory not found: {path}")]
    #[diagnostic(
        code(assetflow::source_missing),
        help("Check the project layout, or run from the project root with -C")
    )]
    SourceMissing { path: PathBuf },

    #[error("Failed to read file '{path}': {error}")]
    #[diagnostic(code(assetflow::file_read_error))]
    FileReadError { path: PathBuf, error: String },

    #[error("Failed to write file '{path}': {error}")]
    #[diagnostic(code(assetflow::file_write_error))]
    FileWriteError { path: PathBuf, error: String },

    #[error("Glob pattern error: {message}")]
    #[diagnostic(code(assetflow::glob_error))]
    GlobPattern { message: String },

    // ─────────────────────────────────────────────────────────────────────────
    // Watch / Server Errors
    // ─────────────────────────────────────────────────────────────────────────
    #[error("File watcher error: {message}")]
    #[diagnostic(code(assetflow::watch_error))]
    Watch { message: String },

    #[error("Dev server error: {message}")]
    #[diagnostic(code(assetflow::server_error))]
    Server { message: String },

    // ─────────────────────────────────────────────────────────────────────────
    // IO/System Errors
    // ─────────────────────────────────────────────────────────────────────────
    #[error("IO error: {message}")]
    #[diagnostic(code(assetflow::io_error))]
    Io { message: String },

    #[error("YAML parsing error: {message}")]
    #[diagnostic(code(assetflow::yaml_error))]
    Yaml { message: String },
}

impl From<std::io::Error> for AssetflowError {
    fn from(e: std::io::Error) -> Self {
        Self::Io { message: e.to_string() }
    }
}

impl From<serde_yaml::Error> for AssetflowError {
    fn from(e: serde_yaml::Error) -> Self {
        Self::Yaml { message: e.to_string() }
    }
}

impl From<glob::PatternError> for AssetflowError {
    fn from(e: glob::PatternError) -> Self {
        Self::GlobPattern { message: e.to_string() }
    }
}

impl From<globset::Error> for AssetflowError {
    fn from(e: globset::Error) -> Self {
        Self::GlobPattern { message: e.to_string() }
    }
}

impl AssetflowError {
    /// Create a tool not found error with installation suggestion
    pub fn tool_not_found(tool: &str) -> Self {
        let suggestion = match tool {
            "esbuild" => {
                "Install esbuild: 'npm install -g esbuild' or https://esbuild.github.io/getting-started/"
                    .to_string()
            }
            _ => format!("Install {} and ensure it's in your PATH", tool),
        };

        Self::ToolNotFound {
            tool: tool.to_string(),
            suggestion,
        }
    }

    /// Whether this error was raised while building or validating the task table
    pub fn is_configuration(&self) -> bool {
        matches!(
            self,
            Self::ReservedTaskName { .. }
                | Self::UnknownTask { .. }
                | Self::UnknownDependency { .. }
                | Self::CircularDependency { .. }
                | Self::UnknownWatchTask { .. }
                | Self::InvalidConfig { .. }
                | Self::GlobPattern { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_items_failed_message_counts_failures() {
        let err = AssetflowError::ItemsFailed {
            task: "build-sass".into(),
            total: 3,
            failures: vec![ItemFailure {
                stage: "sass".into(),
                path: PathBuf::from("src/broken.scss"),
                message: "expected \"}\"".into(),
            }],
        };

        assert_eq!(err.to_string(), "1 of 3 item(s) failed in task 'build-sass'");
    }

    #[test]
    fn test_cycle_message_lists_tasks() {
        let err = AssetflowError::CircularDependency {
            tasks: vec!["a".into(), "b".into(), "a".into()],
        };
        assert!(err.to_string().contains("a -> b -> a"));
        assert!(err.is_configuration());
    }

    #[test]
    fn test_tool_not_found_suggests_install() {
        match AssetflowError::tool_not_found("esbuild") {
            AssetflowError::ToolNotFound { suggestion, .. } => {
                assert!(suggestion.contains("npm install -g esbuild"))
            }
            other => panic!("unexpected error: {other}"),
        }
    }
}
