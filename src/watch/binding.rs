// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 assetflow contributors

//! Glob to task bindings

use globset::{GlobBuilder, GlobMatcher};
use std::fmt;
use std::path::Path;

use crate::errors::AssetflowResult;
use crate::pipeline::TaskName;

/// A glob pattern and the tasks a matching change triggers
#[derive(Clone)]
pub struct WatchBinding {
    pattern: String,
    matcher: GlobMatcher,
    tasks: Vec<TaskName>,
}

impl fmt::Debug for WatchBinding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WatchBinding")
            .field("pattern", &self.pattern)
            .field("tasks", &self.tasks)
            .finish_non_exhaustive()
    }
}

impl WatchBinding {
    /// Compile a binding; `*` does not cross directory separators
    pub fn new(pattern: &str, tasks: Vec<TaskName>) -> AssetflowResult<Self> {
        let pattern = pattern.strip_prefix("./").unwrap_or(pattern).to_string();
        let matcher = GlobBuilder::new(&pattern)
            .literal_separator(true)
            .build()?
            .compile_matcher();

        Ok(Self {
            pattern,
            matcher,
            tasks,
        })
    }

    pub fn pattern(&self) -> &str {
        &self.pattern
    }

    pub fn tasks(&self) -> &[TaskName] {
        &self.tasks
    }

    /// Whether a path relative to the project root matches
    pub fn matches(&self, relative: &Path) -> bool {
        self.matcher.is_match(relative)
    }
}

/// All bindings of a project
#[derive(Debug, Clone, Default)]
pub struct WatchSet {
    bindings: Vec<WatchBinding>,
}

impl WatchSet {
    pub fn new(bindings: Vec<WatchBinding>) -> Self {
        Self { bindings }
    }

    pub fn bindings(&self) -> &[WatchBinding] {
        &self.bindings
    }

    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }

    /// Tasks triggered by a batch of changed paths
    ///
    /// Each task appears once, in binding order, however many paths of the
    /// batch matched it.
    pub fn tasks_for<P: AsRef<Path>>(&self, paths: &[P]) -> Vec<TaskName> {
        let mut triggered: Vec<TaskName> = Vec::new();

        for binding in &self.bindings {
            if !paths.iter().any(|p| binding.matches(p.as_ref())) {
                continue;
            }
            for task in &binding.tasks {
                if !triggered.contains(task) {
                    triggered.push(task.clone());
                }
            }
        }

        triggered
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn set() -> WatchSet {
        WatchSet::new(vec![
            WatchBinding::new("src/*.html", vec!["copy-html".into()]).unwrap(),
            WatchBinding::new("src/assets/img/**/*.*", vec!["imagemin".into(), "webp".into()]).unwrap(),
            WatchBinding::new("./src/assets/sass/**/*.scss", vec!["build-sass".into()]).unwrap(),
        ])
    }

    #[test]
    fn test_star_does_not_cross_directories() {
        let binding = WatchBinding::new("src/*.html", vec![]).unwrap();
        assert!(binding.matches(Path::new("src/index.html")));
        assert!(!binding.matches(Path::new("src/partials/nav.html")));
    }

    #[test]
    fn test_globstar_matches_nested() {
        let set = set();
        assert_eq!(
            set.tasks_for(&["src/assets/img/photos/a.jpg"]),
            vec!["imagemin", "webp"]
        );
        assert_eq!(set.tasks_for(&["src/assets/sass/global/_vars.scss"]), vec!["build-sass"]);
    }

    #[test]
    fn test_batch_triggers_each_task_once() {
        let set = set();
        let tasks = set.tasks_for(&[
            "src/index.html",
            "src/about.html",
            "src/assets/img/a.png",
            "src/assets/img/b.png",
        ]);
        assert_eq!(tasks, vec!["copy-html", "imagemin", "webp"]);
    }

    #[test]
    fn test_unmatched_paths() {
        let empty: Vec<String> = set().tasks_for(&["README.md"]);
        assert!(empty.is_empty());
    }

    #[test]
    fn test_leading_dot_slash_stripped() {
        assert_eq!(set().bindings()[2].pattern(), "src/assets/sass/**/*.scss");
    }
}
