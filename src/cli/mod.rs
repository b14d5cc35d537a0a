// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 assetflow contributors

//! CLI definitions and handlers
//!
//! assetflow takes a single task name. `list`, `graph` and `help` are
//! answered by the runner itself and can never be registered as tasks.

pub mod graph;
pub mod list;
pub mod run;

use clap::Parser;
use std::path::PathBuf;

use crate::config::CONFIG_FILE;

/// Front-end asset flow runner
#[derive(Parser, Debug)]
#[clap(
    name = "assetflow",
    version,
    about = "Front-end asset flow runner: Sass, JS bundling, images and SVG with live reload",
    long_about = None,
    after_help = "Examples:\n\
        assetflow                       Build, serve and watch (task 'default')\n\
        assetflow build                 Build html, js and sass once\n\
        assetflow prod                  Production css and js\n\
        assetflow list                  Show every registered task\n\
        assetflow graph                 Print the task graph as Mermaid"
)]
pub struct Cli {
    /// Task to run
    #[clap(default_value = "default")]
    pub task: String,

    /// Enable verbose output
    #[clap(short, long, global = true)]
    pub verbose: bool,

    /// Change to directory before executing
    #[clap(short = 'C', long, global = true, value_name = "DIR")]
    pub directory: Option<PathBuf>,

    /// Project configuration file, relative to the project root
    #[clap(short, long, default_value = CONFIG_FILE, value_name = "FILE")]
    pub config: PathBuf,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_default_task() {
        let cli = Cli::parse_from(["assetflow"]);
        assert_eq!(cli.task, "default");
        assert_eq!(cli.config, PathBuf::from(CONFIG_FILE));
        assert!(!cli.verbose);
    }

    #[test]
    fn test_task_and_flags() {
        let cli = Cli::parse_from(["assetflow", "build-sass", "-v", "-C", "site"]);
        assert_eq!(cli.task, "build-sass");
        assert!(cli.verbose);
        assert_eq!(cli.directory, Some(PathBuf::from("site")));
    }
}
