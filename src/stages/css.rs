// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 assetflow contributors

//! CSS prefixing and minification

use lightningcss::stylesheet::{MinifyOptions, ParserOptions, PrinterOptions, StyleSheet};
use lightningcss::targets::{Browsers, Targets};

use super::ItemTransform;
use crate::assets::Asset;

/// Browser versions the output must support
#[derive(Debug, Clone, Copy)]
struct BrowserTargets(Browsers);

// lightningcss encodes versions as major << 16 | minor << 8 | patch
const fn version(major: u32) -> Option<u32> {
    Some(major << 16)
}

impl Default for BrowserTargets {
    /// Roughly browserslist `defaults`
    fn default() -> Self {
        Self(Browsers {
            chrome: version(90),
            edge: version(90),
            firefox: version(88),
            safari: version(12),
            ios_saf: version(12),
            samsung: version(12),
            opera: version(76),
            ..Browsers::default()
        })
    }
}

impl BrowserTargets {
    fn targets(&self) -> Targets {
        Targets::from(self.0)
    }
}

/// Add vendor prefixes for the targets and minify
#[derive(Clone, Default)]
pub struct CssOptimize {
    browsers: BrowserTargets,
}

impl ItemTransform for CssOptimize {
    const NAME: &'static str = "css-optimize";

    fn transform(&self, asset: Asset) -> Result<Option<Asset>, String> {
        let source = asset.text()?.to_string();
        let targets = self.browsers.targets();

        let mut sheet = StyleSheet::parse(
            &source,
            ParserOptions {
                filename: asset.relative.display().to_string(),
                ..ParserOptions::default()
            },
        )
        .map_err(|e| e.to_string())?;

        sheet
            .minify(MinifyOptions {
                targets,
                ..MinifyOptions::default()
            })
            .map_err(|e| e.to_string())?;

        let css = sheet
            .to_css(PrinterOptions {
                minify: true,
                targets,
                ..PrinterOptions::default()
            })
            .map_err(|e| e.to_string())?;

        Ok(Some(asset.with_contents(css.code)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn optimize(css: &str) -> Result<String, String> {
        let asset = Asset::new("dist/style.css", "style.css", css.as_bytes().to_vec());
        CssOptimize::default()
            .transform(asset)
            .map(|out| String::from_utf8(out.unwrap().contents).unwrap())
    }

    #[test]
    fn test_prefixes_for_old_safari() {
        let css = optimize(".a { user-select: none; }").unwrap();
        assert!(css.contains("-webkit-user-select:none"));
        assert!(css.contains("user-select:none"));
    }

    #[test]
    fn test_minifies() {
        let css = optimize(".a {\n  color: #ff0000;\n  margin: 0px 0px 0px 0px;\n}\n").unwrap();
        assert_eq!(css, ".a{color:red;margin:0}");
    }
}
