// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 assetflow contributors

//! Run a task, or answer one of the reserved names

use clap::CommandFactory;
use colored::Colorize;
use miette::Result;
use std::path::{Path, PathBuf};
use std::time::Instant;

use super::{graph, list, Cli};
use crate::config::ProjectConfig;
use crate::pipeline::{RegistryValidator, ReservedName, TaskRegistry, TaskRunner};
use crate::tasks::register_builtin;
use crate::utils::{format_duration, print_error, print_section, print_warning};

/// Run the requested task
pub async fn run(task: String, config_path: PathBuf, verbose: bool) -> Result<()> {
    let root = std::env::current_dir()
        .map_err(|e| miette::miette!("Failed to get current directory: {}", e))?;

    let registry = load_registry(&root, &config_path, verbose)?;

    match ReservedName::from_name(&task) {
        Some(ReservedName::List) => return list::run(&registry),
        Some(ReservedName::Graph) => return graph::run(&registry, verbose),
        Some(ReservedName::Help) => {
            return Cli::command()
                .print_help()
                .map_err(|e| miette::miette!("Failed to print help: {}", e));
        }
        None => {}
    }

    println!("{} {}", "Running".bold(), task.cyan());
    let start = Instant::now();
    let runner = TaskRunner::new(registry, root);

    match runner.run(&task).await {
        Ok(_) => {
            println!(
                "{} '{}' after {}",
                "Finished".green().bold(),
                task,
                format_duration(start.elapsed())
            );
            Ok(())
        }
        Err(e) => {
            eprintln!(
                "{} '{}' after {}",
                "Failed".red().bold(),
                task,
                format_duration(start.elapsed())
            );
            Err(e.into())
        }
    }
}

/// Load the project configuration and register the builtin task table
///
/// Validation errors are fatal; warnings are only shown with `--verbose`.
pub fn load_registry(root: &Path, config_path: &Path, verbose: bool) -> Result<TaskRegistry> {
    let config = ProjectConfig::load(&root.join(config_path))?;
    tracing::debug!(
        "Sources in '{}', output to '{}'",
        config.src.display(),
        config.dist.display()
    );

    let mut registry = TaskRegistry::new();
    register_builtin(&mut registry, &config)?;

    let validation = RegistryValidator::validate(&registry);

    if verbose && validation.has_warnings() {
        print_section("Warnings");
        for warning in &validation.warnings {
            print_warning(warning);
        }
        println!();
    }

    if !validation.is_valid() {
        print_section("Errors");
        for error in &validation.errors {
            print_error(error);
        }
        return Err(miette::miette!(
            "Task table is invalid ({} error(s))",
            validation.errors.len()
        ));
    }

    Ok(registry)
}
