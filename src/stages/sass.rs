// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 assetflow contributors

//! Sass compilation

use super::ItemTransform;
use crate::assets::Asset;

/// Compile `.scss` entries to CSS
///
/// Partials (`_name.scss`) are only meant to be imported and produce no
/// output of their own. Imports resolve relative to the entry's directory.
#[derive(Clone, Default)]
pub struct SassCompile {
    compressed: bool,
}

impl SassCompile {
    pub fn new() -> Self {
        Self::default()
    }

    /// Emit compressed CSS
    pub fn compressed(mut self) -> Self {
        self.compressed = true;
        self
    }
}

impl ItemTransform for SassCompile {
    const NAME: &'static str = "sass";

    fn transform(&self, asset: Asset) -> Result<Option<Asset>, String> {
        if asset.stem().starts_with('_') {
            return Ok(None);
        }

        let source = asset.text()?.to_string();
        let parent = asset
            .source
            .parent()
            .map(|p| p.to_path_buf())
            .unwrap_or_default();

        let style = if self.compressed {
            grass::OutputStyle::Compressed
        } else {
            grass::OutputStyle::Expanded
        };
        let options = grass::Options::default().load_path(&parent).style(style);

        let css = grass::from_string(source, &options).map_err(|e| e.to_string())?;
        Ok(Some(asset.with_contents(css).with_extension("css")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn scss(dir: &std::path::Path, name: &str, body: &str) -> Asset {
        let path = dir.join(name);
        std::fs::write(&path, body).unwrap();
        Asset::new(path, name, body.as_bytes().to_vec())
    }

    #[test]
    fn test_compiles_with_partial_import() {
        let temp = TempDir::new().unwrap();
        scss(temp.path(), "_vars.scss", "$accent: #ff0000;");
        let entry = scss(
            temp.path(),
            "style.scss",
            "@import 'vars';\n.btn { color: $accent; .icon { width: 1px; } }",
        );

        let out = SassCompile::new().transform(entry).unwrap().unwrap();
        let css = String::from_utf8(out.contents).unwrap();

        assert_eq!(out.relative, std::path::PathBuf::from("style.css"));
        assert!(css.contains(".btn .icon"));
        assert!(css.contains("#ff0000") || css.contains("red"));
    }

    #[test]
    fn test_partials_produce_nothing() {
        let temp = TempDir::new().unwrap();
        let partial = scss(temp.path(), "_mixins.scss", "@mixin a { color: red; }");
        assert!(SassCompile::new().transform(partial).unwrap().is_none());
    }

    #[test]
    fn test_syntax_error_is_reported() {
        let temp = TempDir::new().unwrap();
        let broken = scss(temp.path(), "broken.scss", ".a { color: red;");

        let err = SassCompile::new().transform(broken).unwrap_err();
        assert!(!err.is_empty());
    }

    #[test]
    fn test_compressed_output() {
        let temp = TempDir::new().unwrap();
        let entry = scss(temp.path(), "style.scss", ".a {\n  .b { margin: 0; }\n}\n");

        let out = SassCompile::new().compressed().transform(entry).unwrap().unwrap();
        let css = String::from_utf8(out.contents).unwrap();
        assert_eq!(css.trim(), ".a .b{margin:0}");
    }
}
