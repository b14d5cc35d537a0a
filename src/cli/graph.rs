// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 assetflow contributors

//! `assetflow graph` - print the task graph as a Mermaid flowchart

use miette::Result;

use crate::pipeline::{TaskGraph, TaskRegistry};
use crate::utils::print_section;

/// Print the graph; `verbose` adds the execution order
pub fn run(registry: &TaskRegistry, verbose: bool) -> Result<()> {
    let graph = TaskGraph::build(registry)?;

    print!("{}", graph.to_mermaid());

    if verbose {
        print_section("Execution order");
        print!("{}", graph.to_text(registry)?);
    }

    Ok(())
}
