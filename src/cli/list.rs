// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 assetflow contributors

//! `assetflow list` - show registered tasks and watch bindings

use colored::Colorize;
use miette::Result;

use crate::pipeline::{ReservedName, TaskRegistry};
use crate::utils::print_header;

/// Print the task table
pub fn run(registry: &TaskRegistry) -> Result<()> {
    print_header("Tasks");
    print!("{}", render_tasks(registry));

    if !registry.bindings().is_empty() {
        println!();
        println!("{}:", "Watched".bold());
        print!("{}", render_bindings(registry));
    }

    println!();
    println!(
        "{} {}",
        "Reserved:".dimmed(),
        ReservedName::joined().dimmed()
    );
    Ok(())
}

fn render_tasks(registry: &TaskRegistry) -> String {
    let width = registry.names().iter().map(|n| n.len()).max().unwrap_or(0);
    let mut out = String::new();

    for task in registry.tasks() {
        out.push_str(&format!("  {:width$}", task.name, width = width));
        if let Some(description) = &task.description {
            out.push_str(&format!("  {}", description));
        }
        if !task.dependencies.is_empty() {
            out.push_str(&format!(
                " ({}: {})",
                task.composition,
                task.dependencies.join(", ")
            ));
        }
        out.push('\n');
    }

    out
}

fn render_bindings(registry: &TaskRegistry) -> String {
    registry
        .bindings()
        .iter()
        .map(|b| format!("  {} -> {}\n", b.pattern(), b.tasks().join(", ")))
        .collect()
}
