// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 assetflow contributors

//! Raster image recompression

use image::codecs::jpeg::JpegEncoder;
use image::codecs::png::{CompressionType, FilterType, PngEncoder};
use image::{DynamicImage, ImageFormat};

use super::{ItemTransform, SvgMinify};
use crate::assets::Asset;

/// Recompress JPEG and PNG files, minify SVG, pass anything else through
///
/// A re-encoded raster only replaces the original when it is smaller.
#[derive(Debug, Clone)]
pub struct ImageMin {
    jpeg_quality: u8,
}

impl Default for ImageMin {
    fn default() -> Self {
        Self { jpeg_quality: 80 }
    }
}

impl ImageMin {
    pub fn new(jpeg_quality: u8) -> Self {
        Self {
            jpeg_quality: jpeg_quality.clamp(1, 100),
        }
    }

    fn recompress(&self, asset: Asset, format: ImageFormat) -> Result<Option<Asset>, String> {
        let img = image::load_from_memory_with_format(&asset.contents, format).map_err(|e| e.to_string())?;
        let encoded = self.encode(&img, format).map_err(|e| e.to_string())?;

        if encoded.len() < asset.contents.len() {
            tracing::debug!(
                "{}: {} -> {} bytes",
                asset.relative.display(),
                asset.contents.len(),
                encoded.len()
            );
            Ok(Some(asset.with_contents(encoded)))
        } else {
            Ok(Some(asset))
        }
    }

    fn encode(&self, img: &DynamicImage, format: ImageFormat) -> image::ImageResult<Vec<u8>> {
        let mut buf = Vec::new();
        match format {
            ImageFormat::Jpeg => {
                // JPEG has no alpha channel
                let rgb = DynamicImage::ImageRgb8(img.to_rgb8());
                rgb.write_with_encoder(JpegEncoder::new_with_quality(&mut buf, self.jpeg_quality))?;
            }
            _ => {
                let encoder =
                    PngEncoder::new_with_quality(&mut buf, CompressionType::Best, FilterType::Adaptive);
                img.write_with_encoder(encoder)?;
            }
        }
        Ok(buf)
    }
}

impl ItemTransform for ImageMin {
    const NAME: &'static str = "imagemin";

    fn transform(&self, asset: Asset) -> Result<Option<Asset>, String> {
        match asset.extension().as_deref() {
            Some("jpg") | Some("jpeg") => self.recompress(asset, ImageFormat::Jpeg),
            Some("png") => self.recompress(asset, ImageFormat::Png),
            Some("svg") => SvgMinify.transform(asset),
            _ => Ok(Some(asset)),
        }
    }
}
