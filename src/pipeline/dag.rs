// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 assetflow contributors

//! DAG (Directed Acyclic Graph) of task dependencies
//!
//! Built from the registry, either for the whole table or for the closure of
//! one task. Building fails on unknown dependencies and on cycles.

use petgraph::algo::{tarjan_scc, toposort};
use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::Direction;
use std::collections::HashMap;

use super::{Composition, TaskName, TaskRegistry};
use crate::errors::{AssetflowError, AssetflowResult};

/// Dependency graph; edges point from a dependency to its dependent
#[derive(Debug)]
pub struct TaskGraph {
    graph: DiGraph<TaskName, Composition>,
    name_to_index: HashMap<TaskName, NodeIndex>,
}

impl TaskGraph {
    fn empty() -> Self {
        Self {
            graph: DiGraph::new(),
            name_to_index: HashMap::new(),
        }
    }

    /// Graph of every registered task
    pub fn build(registry: &TaskRegistry) -> AssetflowResult<Self> {
        let names: Vec<TaskName> = registry.names().into_iter().map(String::from).collect();
        Self::from_names(registry, names)
    }

    /// Graph of `root` and everything it transitively depends on
    pub fn for_task(registry: &TaskRegistry, root: &str) -> AssetflowResult<Self> {
        if !registry.contains(root) {
            return Err(AssetflowError::UnknownTask {
                task: root.to_string(),
            });
        }

        let mut reachable = vec![root.to_string()];
        let mut stack = vec![root.to_string()];

        while let Some(name) = stack.pop() {
            let Some(task) = registry.get(&name) else {
                continue;
            };
            for dep in &task.dependencies {
                if !registry.contains(dep) {
                    return Err(AssetflowError::UnknownDependency {
                        task: name.clone(),
                        dependency: dep.clone(),
                    });
                }
                if !reachable.contains(dep) {
                    reachable.push(dep.clone());
                    stack.push(dep.clone());
                }
            }
        }

        Self::from_names(registry, reachable)
    }

    fn from_names(registry: &TaskRegistry, names: Vec<TaskName>) -> AssetflowResult<Self> {
        let mut dag = Self::empty();

        for name in &names {
            let node = dag.graph.add_node(name.clone());
            dag.name_to_index.insert(name.clone(), node);
        }

        for name in &names {
            let Some(task) = registry.get(name) else {
                continue;
            };
            let task_node = dag.name_to_index[name];

            for dep in &task.dependencies {
                let dep_node = dag.name_to_index.get(dep).ok_or_else(|| {
                    AssetflowError::UnknownDependency {
                        task: name.clone(),
                        dependency: dep.clone(),
                    }
                })?;

                if !dag.graph.contains_edge(*dep_node, task_node) {
                    dag.graph.add_edge(*dep_node, task_node, task.composition);
                }
            }
        }

        dag.validate_acyclic()?;
        Ok(dag)
    }

    fn validate_acyclic(&self) -> AssetflowResult<()> {
        match toposort(&self.graph, None) {
            Ok(_) => Ok(()),
            Err(cycle) => Err(AssetflowError::CircularDependency {
                tasks: self.cycle_members(cycle.node_id()),
            }),
        }
    }

    /// Names of the strongly connected component containing `start`,
    /// closed with the first name again (`a -> b -> a`)
    fn cycle_members(&self, start: NodeIndex) -> Vec<String> {
        let component = tarjan_scc(&self.graph)
            .into_iter()
            .find(|scc| scc.contains(&start))
            .unwrap_or_else(|| vec![start]);

        let mut names: Vec<String> = component
            .iter()
            .rev()
            .map(|n| self.graph[*n].clone())
            .collect();
        if let Some(first) = names.first().cloned() {
            names.push(first);
        }
        names
    }

    /// Task names with every dependency before its dependents
    pub fn topological_order(&self) -> AssetflowResult<Vec<TaskName>> {
        toposort(&self.graph, None)
            .map(|nodes| nodes.into_iter().map(|n| self.graph[n].clone()).collect())
            .map_err(|cycle| AssetflowError::CircularDependency {
                tasks: self.cycle_members(cycle.node_id()),
            })
    }

    /// Direct dependencies of a task
    pub fn dependencies(&self, name: &str) -> Option<Vec<TaskName>> {
        let node = self.name_to_index.get(name)?;
        let mut deps: Vec<TaskName> = self
            .graph
            .neighbors_directed(*node, Direction::Incoming)
            .map(|n| self.graph[n].clone())
            .collect();
        deps.sort();
        Some(deps)
    }

    /// Whether `task` depends (directly or transitively) on `other`
    pub fn depends_on(&self, task: &str, other: &str) -> bool {
        let (Some(a), Some(b)) = (self.name_to_index.get(task), self.name_to_index.get(other)) else {
            return false;
        };
        petgraph::algo::has_path_connecting(&self.graph, *b, *a, None)
    }

    /// Number of tasks in the graph
    pub fn len(&self) -> usize {
        self.graph.node_count()
    }

    /// Whether the graph has no task
    pub fn is_empty(&self) -> bool {
        self.graph.node_count() == 0
    }

    /// Mermaid flowchart; dotted edges are parallel dependencies
    pub fn to_mermaid(&self) -> String {
        let mut out = String::from("graph TD\n");

        for node in self.graph.node_indices() {
            let name = &self.graph[node];
            out.push_str(&format!("    {}[\"{}\"]\n", mermaid_id(name), name));
        }

        for edge in self.graph.edge_indices() {
            let Some((from, to)) = self.graph.edge_endpoints(edge) else {
                continue;
            };
            let arrow = match self.graph[edge] {
                Composition::Sequential => "-->",
                Composition::Concurrent => "-.->",
            };
            out.push_str(&format!(
                "    {} {} {}\n",
                mermaid_id(&self.graph[from]),
                arrow,
                mermaid_id(&self.graph[to])
            ));
        }

        out
    }

    /// Plain text execution order
    pub fn to_text(&self, registry: &TaskRegistry) -> AssetflowResult<String> {
        let order = self.topological_order()?;
        let mut out = String::new();

        for (i, name) in order.iter().enumerate() {
            out.push_str(&format!("{}. {}", i + 1, name));

            if let Some(task) = registry.get(name) {
                if !task.dependencies.is_empty() {
                    out.push_str(&format!(
                        " [{}: {}]",
                        task.composition,
                        task.dependencies.join(", ")
                    ));
                }
            }

            out.push('\n');
        }

        Ok(out)
    }
}

fn mermaid_id(name: &str) -> String {
    name.chars()
        .map(|c| if c.is_ascii_alphanumeric() { c } else { '_' })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::Task;

    fn registry(tasks: Vec<Task>) -> TaskRegistry {
        let mut registry = TaskRegistry::new();
        for task in tasks {
            registry.register(task).unwrap();
        }
        registry
    }

    #[test]
    fn test_linear_order() {
        let registry = registry(vec![
            Task::new("c").series(["b"]),
            Task::new("b").series(["a"]),
            Task::new("a"),
        ]);

        let dag = TaskGraph::build(&registry).unwrap();
        assert_eq!(dag.topological_order().unwrap(), vec!["a", "b", "c"]);
        assert!(dag.depends_on("c", "a"));
        assert!(!dag.depends_on("a", "c"));
    }

    #[test]
    fn test_diamond_order() {
        let registry = registry(vec![
            Task::new("a"),
            Task::new("b").series(["a"]),
            Task::new("c").series(["a"]),
            Task::new("d").parallel(["b", "c"]),
        ]);

        let order = TaskGraph::build(&registry).unwrap().topological_order().unwrap();
        assert_eq!(order[0], "a");
        assert_eq!(order[3], "d");
    }

    #[test]
    fn test_cycle_detected() {
        let registry = registry(vec![Task::new("a").series(["b"]), Task::new("b").series(["a"])]);

        match TaskGraph::build(&registry) {
            Err(AssetflowError::CircularDependency { tasks }) => {
                assert_eq!(tasks.len(), 3);
                assert_eq!(tasks.first(), tasks.last());
            }
            other => panic!("expected a cycle, got {:?}", other.map(|g| g.len())),
        }
    }

    #[test]
    fn test_for_task_reports_missing_sequential_dependency() {
        let registry = registry(vec![Task::new("release").series(["build"])]);

        let err = TaskGraph::for_task(&registry, "release").unwrap_err();
        assert!(matches!(
            err,
            AssetflowError::UnknownDependency { ref dependency, .. } if dependency == "build"
        ));
    }

    #[test]
    fn test_for_task_only_contains_closure() {
        let registry = registry(vec![
            Task::new("a"),
            Task::new("b").series(["a"]),
            Task::new("unrelated"),
        ]);

        let dag = TaskGraph::for_task(&registry, "b").unwrap();
        assert_eq!(dag.len(), 2);
        assert_eq!(dag.dependencies("b").unwrap(), vec!["a"]);
    }

    #[test]
    fn test_unknown_root() {
        let registry = registry(vec![Task::new("a")]);
        assert!(matches!(
            TaskGraph::for_task(&registry, "nope"),
            Err(AssetflowError::UnknownTask { .. })
        ));
    }

    #[test]
    fn test_mermaid_output() {
        let registry = registry(vec![
            Task::new("copy-html"),
            Task::new("build").parallel(["copy-html"]),
        ]);

        let mermaid = TaskGraph::build(&registry).unwrap().to_mermaid();
        assert!(mermaid.contains("graph TD"));
        assert!(mermaid.contains("copy_html[\"copy-html\"]"));
        assert!(mermaid.contains("copy_html -.-> build"));
    }

    #[test]
    fn test_text_output() {
        let registry = registry(vec![
            Task::new("a"),
            Task::new("b").parallel(["a"]),
        ]);

        let text = TaskGraph::build(&registry).unwrap().to_text(&registry).unwrap();
        assert_eq!(text, "1. a\n2. b [parallel: a]\n");
    }
}
