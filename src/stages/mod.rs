// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 assetflow contributors

//! Pipeline stages
//!
//! A stage turns the assets of one stream into new assets. Stages that work
//! on one file at a time implement [`ItemTransform`] and get per-item failure
//! isolation: a file the library rejects is reported and dropped while the
//! others continue. Stages that merge many files into one (sprites, bundles)
//! implement [`Stage`] directly and fail as a whole.

mod bundle;
mod css;
mod html;
mod image;
mod sass;
mod svg;
mod webp;

pub use self::image::ImageMin;
pub use bundle::{Bundle, BundleMode};
pub use css::CssOptimize;
pub use html::HtmlMinify;
pub use sass::SassCompile;
pub use svg::{SvgCss, SvgMinify, SvgSprite};
pub use webp::WebpConvert;

use async_trait::async_trait;
use std::path::PathBuf;

use crate::assets::Asset;
use crate::errors::{AssetflowError, AssetflowResult, ItemFailure};

/// A transform step inside an asset stream
#[async_trait]
pub trait Stage: Send + Sync {
    /// Stage name used in logs and error reports
    fn name(&self) -> &str;

    /// Process a batch of assets
    ///
    /// Items that fail on their own are pushed to `failures`; an `Err` aborts
    /// the whole stream.
    async fn process(
        &self,
        assets: Vec<Asset>,
        failures: &mut Vec<ItemFailure>,
    ) -> AssetflowResult<Vec<Asset>>;
}

/// A pure transform applied to each asset independently
///
/// Returning `Ok(None)` drops the asset from the stream without an error.
pub trait ItemTransform: Clone + Send + Sync + 'static {
    /// Stage name
    const NAME: &'static str;

    /// Transform a single asset
    fn transform(&self, asset: Asset) -> Result<Option<Asset>, String>;
}

#[async_trait]
impl<T: ItemTransform> Stage for T {
    fn name(&self) -> &str {
        T::NAME
    }

    async fn process(
        &self,
        assets: Vec<Asset>,
        failures: &mut Vec<ItemFailure>,
    ) -> AssetflowResult<Vec<Asset>> {
        let stage = self.clone();

        // Codec work is CPU bound; keep it off the async workers
        let (kept, failed) = tokio::task::spawn_blocking(move || transform_each(&stage, assets))
            .await
            .map_err(|e| AssetflowError::StageFailed {
                stage: T::NAME.to_string(),
                path: PathBuf::new(),
                message: e.to_string(),
            })?;

        failures.extend(failed);
        Ok(kept)
    }
}

fn transform_each<T: ItemTransform>(stage: &T, assets: Vec<Asset>) -> (Vec<Asset>, Vec<ItemFailure>) {
    let mut kept = Vec::with_capacity(assets.len());
    let mut failed = Vec::new();

    for asset in assets {
        let source = asset.source.clone();
        match stage.transform(asset) {
            Ok(Some(out)) => kept.push(out),
            Ok(None) => tracing::debug!("{}: skipped {}", T::NAME, source.display()),
            Err(message) => {
                tracing::error!("{}: {}: {}", T::NAME, source.display(), message);
                failed.push(ItemFailure {
                    stage: T::NAME.to_string(),
                    path: source,
                    message,
                });
            }
        }
    }

    (kept, failed)
}
