// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 assetflow contributors

//! Terminal output helpers
//!
//! Shared by the CLI and the watch loop so task output looks the same
//! whether a task runs once or on a file change.

use colored::Colorize;
use std::time::Duration;

use crate::errors::AssetflowError;

/// Print a styled header
pub fn print_header(title: &str) {
    println!("{}", title.bold());
    println!("{}", "═".repeat(title.len().max(40)));
}

/// Print a styled section
pub fn print_section(title: &str) {
    println!();
    println!("{}:", title.bold());
}

/// Print an error cross
pub fn print_error(msg: &str) {
    eprintln!("  {} {}", "✗".red(), msg);
}

/// Print a warning
pub fn print_warning(msg: &str) {
    println!("  {} {}", "⚠".yellow(), msg);
}

/// Print the failed items carried by an error, one per line
pub fn print_item_failures(error: &AssetflowError) {
    if let AssetflowError::ItemsFailed { failures, .. } = error {
        for failure in failures {
            eprintln!("    {}", failure.to_string().dimmed());
        }
    }
}

/// Human readable duration: `850ms`, `2.31s`, `1m 04s`
pub fn format_duration(elapsed: Duration) -> String {
    let millis = elapsed.as_millis();
    if millis < 1000 {
        format!("{}ms", millis)
    } else if millis < 60_000 {
        format!("{:.2}s", elapsed.as_secs_f64())
    } else {
        let secs = elapsed.as_secs();
        format!("{}m {:02}s", secs / 60, secs % 60)
    }
}
