// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 assetflow contributors

//! JavaScript bundling through an external bundler
//!
//! The bundler is invoked once per entry with the esbuild command line and
//! must write the bundle to stdout.

use async_trait::async_trait;
use std::path::Path;
use tokio::process::Command;

use super::Stage;
use crate::assets::Asset;
use crate::errors::{AssetflowError, AssetflowResult, ItemFailure};

/// Bundle flavour
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BundleMode {
    /// Readable output with an inline source map
    Development,
    /// Minified output
    Production,
}

/// Bundle each entry into a single script
#[derive(Debug, Clone)]
pub struct Bundle {
    program: String,
    target: String,
    mode: BundleMode,
    output: String,
}

impl Bundle {
    pub fn new(program: impl Into<String>, mode: BundleMode) -> Self {
        Self {
            program: program.into(),
            target: "es2015".to_string(),
            mode,
            output: "script.js".to_string(),
        }
    }

    /// Language level of the output
    pub fn target(mut self, target: impl Into<String>) -> Self {
        self.target = target.into();
        self
    }

    /// Output file name
    pub fn output(mut self, output: impl Into<String>) -> Self {
        self.output = output.into();
        self
    }

    fn args(&self, entry: &Path) -> Vec<String> {
        let mut args = vec![
            entry.display().to_string(),
            "--bundle".to_string(),
            "--format=iife".to_string(),
            format!("--target={}", self.target),
        ];
        match self.mode {
            BundleMode::Development => args.push("--sourcemap=inline".to_string()),
            BundleMode::Production => args.push("--minify".to_string()),
        }
        args
    }

    async fn bundle_entry(&self, program: &Path, entry: Asset) -> AssetflowResult<Asset> {
        let output = Command::new(program)
            .args(self.args(&entry.source))
            .kill_on_drop(true)
            .output()
            .await
            .map_err(|e| AssetflowError::ToolExecutionFailed {
                tool: self.program.clone(),
                error: e.to_string(),
                help: None,
            })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
            return Err(AssetflowError::ToolExecutionFailed {
                tool: self.program.clone(),
                error: if stderr.is_empty() {
                    format!("exited with {}", output.status)
                } else {
                    stderr
                },
                help: Some(format!("Bundling {} failed", entry.source.display())),
            });
        }

        Ok(Asset::new(entry.source, &self.output, output.stdout))
    }
}

#[async_trait]
impl Stage for Bundle {
    fn name(&self) -> &str {
        "bundle"
    }

    async fn process(
        &self,
        assets: Vec<Asset>,
        _failures: &mut Vec<ItemFailure>,
    ) -> AssetflowResult<Vec<Asset>> {
        if assets.is_empty() {
            return Ok(assets);
        }

        let program =
            which::which(&self.program).map_err(|_| AssetflowError::tool_not_found(&self.program))?;
        tracing::debug!("Bundling with {}", program.display());

        let mut bundles = Vec::with_capacity(assets.len());
        for entry in assets {
            bundles.push(self.bundle_entry(&program, entry).await?);
        }
        Ok(bundles)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mode_flags() {
        let dev = Bundle::new("esbuild", BundleMode::Development).args(Path::new("main.js"));
        assert_eq!(
            dev,
            vec!["main.js", "--bundle", "--format=iife", "--target=es2015", "--sourcemap=inline"]
        );

        let prod = Bundle::new("esbuild", BundleMode::Production)
            .target("es2020")
            .args(Path::new("main.js"));
        assert!(prod.contains(&"--minify".to_string()));
        assert!(prod.contains(&"--target=es2020".to_string()));
    }

    #[tokio::test]
    async fn test_missing_bundler() {
        let bundle = Bundle::new("assetflow-no-such-bundler", BundleMode::Development);
        let entry = Asset::new("src/assets/js/main.js", "main.js", b"1".to_vec());

        let err = bundle.process(vec![entry], &mut Vec::new()).await.unwrap_err();
        assert!(matches!(err, AssetflowError::ToolNotFound { .. }));
    }

    #[tokio::test]
    async fn test_no_entries_needs_no_bundler() {
        let bundle = Bundle::new("assetflow-no-such-bundler", BundleMode::Development);
        assert!(bundle.process(vec![], &mut Vec::new()).await.unwrap().is_empty());
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_stdout_becomes_output() {
        use std::os::unix::fs::PermissionsExt;
        use tempfile::TempDir;

        let temp = TempDir::new().unwrap();
        let fake = temp.path().join("fake-bundler");
        std::fs::write(&fake, "#!/bin/sh\ncat \"$1\"\n").unwrap();
        std::fs::set_permissions(&fake, std::fs::Permissions::from_mode(0o755)).unwrap();

        let main = temp.path().join("main.js");
        std::fs::write(&main, "console.log(1);").unwrap();

        let bundle = Bundle::new(fake.display().to_string(), BundleMode::Production);
        let out = bundle
            .process(vec![Asset::new(&main, "main.js", vec![])], &mut Vec::new())
            .await
            .unwrap();

        assert_eq!(out.len(), 1);
        assert_eq!(out[0].relative, std::path::PathBuf::from("script.js"));
        assert_eq!(out[0].contents, b"console.log(1);");
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_failing_bundler_reports_stderr() {
        use std::os::unix::fs::PermissionsExt;
        use tempfile::TempDir;

        let temp = TempDir::new().unwrap();
        let fake = temp.path().join("fake-bundler");
        std::fs::write(&fake, "#!/bin/sh\necho 'main.js:1:4: ERROR: Expected \";\"' >&2\nexit 1\n").unwrap();
        std::fs::set_permissions(&fake, std::fs::Permissions::from_mode(0o755)).unwrap();

        let bundle = Bundle::new(fake.display().to_string(), BundleMode::Development);
        let err = bundle
            .process(vec![Asset::new("main.js", "main.js", vec![])], &mut Vec::new())
            .await
            .unwrap_err();

        match err {
            AssetflowError::ToolExecutionFailed { error, .. } => assert!(error.contains("Expected")),
            other => panic!("unexpected error: {other}"),
        }
    }
}
