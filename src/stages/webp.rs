// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 assetflow contributors

//! WebP conversion

use image::{DynamicImage, ImageFormat};
use std::io::Cursor;

use super::ItemTransform;
use crate::assets::Asset;

/// Convert PNG and JPEG files to lossless WebP; other files are dropped
#[derive(Debug, Clone, Default)]
pub struct WebpConvert;

impl ItemTransform for WebpConvert {
    const NAME: &'static str = "webp";

    fn transform(&self, asset: Asset) -> Result<Option<Asset>, String> {
        let format = match asset.extension().as_deref() {
            Some("png") => ImageFormat::Png,
            Some("jpg") | Some("jpeg") => ImageFormat::Jpeg,
            _ => return Ok(None),
        };

        let img = image::load_from_memory_with_format(&asset.contents, format).map_err(|e| e.to_string())?;

        // The WebP encoder only takes 8-bit RGB(A)
        let img = DynamicImage::ImageRgba8(img.to_rgba8());
        let mut buf = Cursor::new(Vec::new());
        img.write_to(&mut buf, ImageFormat::WebP)
            .map_err(|e| e.to_string())?;

        Ok(Some(asset.with_contents(buf.into_inner()).with_extension("webp")))
    }
}
