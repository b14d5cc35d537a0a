// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 assetflow contributors

//! HTML minification

use minify_html::{minify, Cfg};

use super::ItemTransform;
use crate::assets::Asset;

/// Collapse whitespace and drop comments
///
/// Closing tags, the doctype and `<html>`/`<head>` openers are kept so the
/// output stays valid for hand-written templates.
#[derive(Clone)]
pub struct HtmlMinify {
    cfg: Cfg,
}

impl Default for HtmlMinify {
    fn default() -> Self {
        let mut cfg = Cfg::new();
        cfg.keep_closing_tags = true;
        cfg.keep_html_and_head_opening_tags = true;
        cfg.do_not_minify_doctype = true;
        cfg.ensure_spec_compliant_unquoted_attribute_values = true;
        Self { cfg }
    }
}

impl ItemTransform for HtmlMinify {
    const NAME: &'static str = "html-minify";

    fn transform(&self, asset: Asset) -> Result<Option<Asset>, String> {
        let minified = minify(&asset.contents, &self.cfg);
        Ok(Some(asset.with_contents(minified)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_collapses_whitespace_and_comments() {
        let html = "<!DOCTYPE html>\n<html>\n  <head>\n    <title>Hi</title>\n  </head>\n  <body>\n    <!-- nav -->\n    <p>Hello   world</p>\n  </body>\n</html>\n";
        let asset = Asset::new("src/index.html", "index.html", html.as_bytes().to_vec());

        let out = HtmlMinify::default().transform(asset).unwrap().unwrap();
        let text = String::from_utf8(out.contents).unwrap();

        assert!(text.starts_with("<!DOCTYPE html>"));
        assert!(!text.contains("nav"));
        assert!(!text.contains("\n  "));
        assert!(text.contains("<p>Hello world</p>"));
        assert_eq!(out.relative, std::path::PathBuf::from("index.html"));
    }
}
