// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 assetflow contributors

//! Glob-selected source files

use std::path::{Path, PathBuf};

use super::Asset;
use crate::errors::{AssetflowError, AssetflowResult};

/// Files matched by a glob pattern, relative to the project root
#[derive(Debug, Clone)]
pub struct FileSet {
    pattern: String,
    base: PathBuf,
}

impl FileSet {
    /// Create a file set from a `/`-separated glob pattern
    pub fn new(pattern: impl Into<String>) -> Self {
        let pattern = pattern.into();
        let pattern = pattern.trim_start_matches("./").to_string();
        let base = glob_base(&pattern);
        Self { pattern, base }
    }

    /// The glob pattern
    pub fn pattern(&self) -> &str {
        &self.pattern
    }

    /// Directory that output paths are computed relative to
    pub fn base(&self) -> &Path {
        &self.base
    }

    /// Resolve the pattern below `root`, sorted for stable output
    ///
    /// A missing base directory is an error; an existing directory with no
    /// matching file is an empty set.
    pub fn enumerate(&self, root: &Path) -> AssetflowResult<Vec<PathBuf>> {
        let base = root.join(&self.base);
        if !base.is_dir() {
            return Err(AssetflowError::SourceMissing { path: base });
        }

        let full_pattern = if Path::new(&self.pattern).is_absolute() {
            self.pattern.clone()
        } else {
            root.join(&self.pattern).to_string_lossy().to_string()
        };

        let mut files: Vec<PathBuf> = glob::glob(&full_pattern)?
            .filter_map(Result::ok)
            .filter(|p| p.is_file())
            .collect();
        files.sort();

        Ok(files)
    }

    /// Read every matched file into an [`Asset`]
    pub async fn read(&self, root: &Path) -> AssetflowResult<Vec<Asset>> {
        let paths = self.enumerate(root)?;
        self.read_paths(root, paths).await
    }

    /// Read the given paths (which must lie below the base) into assets
    pub async fn read_paths(&self, root: &Path, paths: Vec<PathBuf>) -> AssetflowResult<Vec<Asset>> {
        let base = root.join(&self.base);
        let mut assets = Vec::with_capacity(paths.len());

        for path in paths {
            let contents = tokio::fs::read(&path)
                .await
                .map_err(|e| AssetflowError::FileReadError {
                    path: path.clone(),
                    error: e.to_string(),
                })?;
            let relative = self.relative_to_base(&base, &path);
            assets.push(Asset::new(path, relative, contents));
        }

        Ok(assets)
    }

    /// Output path of `path` relative to the base directory
    pub fn relative_path(&self, root: &Path, path: &Path) -> PathBuf {
        self.relative_to_base(&root.join(&self.base), path)
    }

    fn relative_to_base(&self, base: &Path, path: &Path) -> PathBuf {
        path.strip_prefix(base)
            .map(Path::to_path_buf)
            .unwrap_or_else(|_| path.file_name().map(PathBuf::from).unwrap_or_default())
    }
}

/// Non-magic prefix of a glob pattern
///
/// The last component is never part of the base, so a plain file path has
/// its parent directory as base.
pub fn glob_base(pattern: &str) -> PathBuf {
    let components: Vec<&str> = pattern.split('/').collect();
    let mut base = PathBuf::new();

    for (i, component) in components.iter().enumerate() {
        if i + 1 == components.len() || is_magic(component) {
            break;
        }
        if component.is_empty() && i == 0 {
            base.push("/");
            continue;
        }
        base.push(component);
    }

    base
}

fn is_magic(component: &str) -> bool {
    component.contains(['*', '?', '[', '{'])
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_glob_base() {
        assert_eq!(glob_base("src/*.html"), PathBuf::from("src"));
        assert_eq!(glob_base("src/assets/img/**/*.*"), PathBuf::from("src/assets/img"));
        assert_eq!(
            glob_base("src/assets/sass/style.scss"),
            PathBuf::from("src/assets/sass")
        );
        assert_eq!(glob_base("*.html"), PathBuf::new());
    }

    #[test]
    fn test_leading_dot_slash_is_dropped() {
        let set = FileSet::new("./src/*.html");
        assert_eq!(set.pattern(), "src/*.html");
        assert_eq!(set.base(), Path::new("src"));
    }

    #[test]
    fn test_enumerate_sorted_and_relative() {
        let temp = TempDir::new().unwrap();
        let img = temp.path().join("src/img");
        std::fs::create_dir_all(img.join("nested")).unwrap();
        std::fs::write(img.join("b.png"), b"b").unwrap();
        std::fs::write(img.join("a.png"), b"a").unwrap();
        std::fs::write(img.join("nested/c.jpg"), b"c").unwrap();

        let set = FileSet::new("src/img/**/*.*");
        let files = set.enumerate(temp.path()).unwrap();
        assert_eq!(files.len(), 3);

        let relative: Vec<_> = files
            .iter()
            .map(|f| set.relative_path(temp.path(), f))
            .collect();
        assert_eq!(
            relative,
            vec![
                PathBuf::from("a.png"),
                PathBuf::from("b.png"),
                PathBuf::from("nested/c.jpg")
            ]
        );
    }

    #[test]
    fn test_missing_base_is_error() {
        let temp = TempDir::new().unwrap();
        let set = FileSet::new("src/*.html");
        let err = set.enumerate(temp.path()).unwrap_err();
        assert!(matches!(err, AssetflowError::SourceMissing { .. }));
    }

    #[test]
    fn test_no_match_is_empty() {
        let temp = TempDir::new().unwrap();
        std::fs::create_dir_all(temp.path().join("src")).unwrap();
        let set = FileSet::new("src/*.html");
        assert!(set.enumerate(temp.path()).unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_read_assets() {
        let temp = TempDir::new().unwrap();
        std::fs::create_dir_all(temp.path().join("src")).unwrap();
        std::fs::write(temp.path().join("src/index.html"), "<p>hi</p>").unwrap();

        let assets = FileSet::new("src/*.html").read(temp.path()).await.unwrap();
        assert_eq!(assets.len(), 1);
        assert_eq!(assets[0].relative, PathBuf::from("index.html"));
        assert_eq!(assets[0].contents, b"<p>hi</p>");
    }
}
