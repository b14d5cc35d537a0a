// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 assetflow contributors

//! SVG minification, sprites and CSS custom properties

use async_trait::async_trait;
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use once_cell::sync::Lazy;
use regex::{Captures, Regex};
use std::path::Path;

use super::{ItemTransform, Stage};
use crate::assets::Asset;
use crate::errors::{AssetflowError, AssetflowResult, ItemFailure};

static COMMENT: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?s)<!--.*?-->").unwrap());
static PROLOG: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?s)<\?xml.*?\?>|<!DOCTYPE[^>\[]*(\[[^\]]*\])?\s*>").unwrap());
static BETWEEN_TAGS: Lazy<Regex> = Lazy::new(|| Regex::new(r">\s+<").unwrap());
static SVG_ROOT: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?s)<svg\b([^>]*)>(.*)</svg\s*>").unwrap());
static VIEW_BOX: Lazy<Regex> = Lazy::new(|| Regex::new(r#"\bviewBox\s*=\s*["']([^"']*)["']"#).unwrap());
static WIDTH: Lazy<Regex> = Lazy::new(|| Regex::new(r#"(?:^|\s)width\s*=\s*["']([\d.]+)(px)?["']"#).unwrap());
static HEIGHT: Lazy<Regex> = Lazy::new(|| Regex::new(r#"(?:^|\s)height\s*=\s*["']([\d.]+)(px)?["']"#).unwrap());

const CONTAINERS: [&str; 9] = [
    "g", "defs", "symbol", "marker", "clipPath", "mask", "pattern", "a", "switch",
];

// One matcher per tag: the regex crate has no backreferences
static EMPTY_CONTAINERS: Lazy<Vec<Regex>> = Lazy::new(|| {
    CONTAINERS
        .iter()
        .map(|tag| {
            Regex::new(&format!(
                r"<{tag}(?P<attrs>\s[^>]*?)?/>|<{tag}(?P<attrs2>\s[^>]*)?>\s*</{tag}\s*>"
            ))
            .unwrap()
        })
        .collect()
});

/// Remove comments, the XML prolog, empty containers and inter-tag whitespace
///
/// Containers carrying an `id` stay, they may be referenced elsewhere.
#[derive(Debug, Clone, Default)]
pub struct SvgMinify;

impl SvgMinify {
    fn minify(text: &str) -> String {
        let mut svg = COMMENT.replace_all(text, "").into_owned();
        svg = PROLOG.replace_all(&svg, "").into_owned();

        // Removing a child can empty its parent
        loop {
            let mut next = svg.clone();
            for re in EMPTY_CONTAINERS.iter() {
                next = re
                    .replace_all(&next, |caps: &Captures| {
                        let attrs = caps
                            .name("attrs")
                            .or_else(|| caps.name("attrs2"))
                            .map(|m| m.as_str())
                            .unwrap_or("");
                        if attrs.contains("id=") {
                            caps[0].to_string()
                        } else {
                            String::new()
                        }
                    })
                    .into_owned();
            }
            if next == svg {
                break;
            }
            svg = next;
        }

        BETWEEN_TAGS.replace_all(&svg, "><").trim().to_string()
    }
}

impl ItemTransform for SvgMinify {
    const NAME: &'static str = "svgmin";

    fn transform(&self, asset: Asset) -> Result<Option<Asset>, String> {
        let svg = Self::minify(asset.text()?);
        Ok(Some(asset.with_contents(svg)))
    }
}

/// Identifier derived from the path below the source base: `social/x.svg` → `social--x`
fn symbol_id(relative: &Path, separator: &str) -> String {
    relative
        .with_extension("")
        .components()
        .map(|c| c.as_os_str().to_string_lossy().into_owned())
        .collect::<Vec<_>>()
        .join(separator)
}

fn view_box(attrs: &str) -> Option<String> {
    if let Some(caps) = VIEW_BOX.captures(attrs) {
        return Some(caps[1].to_string());
    }
    let width = WIDTH.captures(attrs)?;
    let height = HEIGHT.captures(attrs)?;
    Some(format!("0 0 {} {}", &width[1], &height[1]))
}

/// Stack-mode sprite: every input becomes a nested `<svg id=..>` shown
/// through the `:target` selector (`sprite.svg#icon`)
#[derive(Debug, Clone)]
pub struct SvgSprite {
    filename: String,
}

impl Default for SvgSprite {
    fn default() -> Self {
        Self {
            filename: "sprite.svg".to_string(),
        }
    }
}

impl SvgSprite {
    fn build(&self, mut assets: Vec<Asset>) -> AssetflowResult<Option<Asset>> {
        if assets.is_empty() {
            return Ok(None);
        }
        assets.sort_by(|a, b| a.relative.cmp(&b.relative));

        let mut sprite = String::from(concat!(
            r#"<?xml version="1.0" encoding="utf-8"?>"#,
            r#"<svg xmlns="http://www.w3.org/2000/svg" xmlns:xlink="http://www.w3.org/1999/xlink">"#,
            "<style>:root>svg{display:none}:root>svg:target{display:block}</style>"
        ));

        for asset in &assets {
            let fail = |message: &str| AssetflowError::StageFailed {
                stage: "svg-sprite".to_string(),
                path: asset.source.clone(),
                message: message.to_string(),
            };

            let text = asset.text().map_err(|e| fail(e.as_str()))?;
            let caps = SVG_ROOT.captures(text).ok_or_else(|| fail("no <svg> root element"))?;

            let id = symbol_id(&asset.relative, "--");
            sprite.push_str(&format!("<svg id=\"{}\"", id));
            if let Some(vb) = view_box(&caps[1]) {
                sprite.push_str(&format!(" viewBox=\"{}\"", vb));
            }
            sprite.push('>');
            sprite.push_str(caps[2].trim());
            sprite.push_str("</svg>");
        }
        sprite.push_str("</svg>");

        let source = assets[0].source.parent().map(Path::to_path_buf).unwrap_or_default();
        Ok(Some(Asset::new(source, &self.filename, sprite.into_bytes())))
    }
}

#[async_trait]
impl Stage for SvgSprite {
    fn name(&self) -> &str {
        "svg-sprite"
    }

    async fn process(
        &self,
        assets: Vec<Asset>,
        _failures: &mut Vec<ItemFailure>,
    ) -> AssetflowResult<Vec<Asset>> {
        Ok(self.build(assets)?.into_iter().collect())
    }
}

/// SCSS partial exposing every input as a base64 data URI custom property
///
/// ```scss
/// :root {
///   --svg__arrow: url("data:image/svg+xml;base64,...");
/// }
/// ```
#[derive(Debug, Clone)]
pub struct SvgCss {
    filename: String,
    prefix: String,
    add_size: bool,
}

impl Default for SvgCss {
    fn default() -> Self {
        Self {
            filename: "__svg.scss".to_string(),
            prefix: "--svg__".to_string(),
            add_size: false,
        }
    }
}

impl SvgCss {
    /// Also emit `-width` and `-height` properties when the SVG declares them
    pub fn with_size(mut self) -> Self {
        self.add_size = true;
        self
    }

    fn build(&self, mut assets: Vec<Asset>) -> Option<Asset> {
        if assets.is_empty() {
            return None;
        }
        assets.sort_by(|a, b| a.relative.cmp(&b.relative));

        let mut scss = String::from(":root {\n");
        for asset in &assets {
            let name = format!("{}{}", self.prefix, symbol_id(&asset.relative, "-"));
            scss.push_str(&format!(
                "  {}: url(\"data:image/svg+xml;base64,{}\");\n",
                name,
                STANDARD.encode(&asset.contents)
            ));

            if self.add_size {
                let text = String::from_utf8_lossy(&asset.contents);
                let root_attrs = SVG_ROOT.captures(&text).map(|c| c[1].to_string()).unwrap_or_default();
                if let (Some(w), Some(h)) = (WIDTH.captures(&root_attrs), HEIGHT.captures(&root_attrs)) {
                    scss.push_str(&format!("  {}-width: {}px;\n", name, &w[1]));
                    scss.push_str(&format!("  {}-height: {}px;\n", name, &h[1]));
                }
            }
        }
        scss.push_str("}\n");

        let source = assets[0].source.parent().map(Path::to_path_buf).unwrap_or_default();
        Some(Asset::new(source, &self.filename, scss.into_bytes()))
    }
}

#[async_trait]
impl Stage for SvgCss {
    fn name(&self) -> &str {
        "svg-css"
    }

    async fn process(
        &self,
        assets: Vec<Asset>,
        _failures: &mut Vec<ItemFailure>,
    ) -> AssetflowResult<Vec<Asset>> {
        Ok(self.build(assets).into_iter().collect())
    }
}
