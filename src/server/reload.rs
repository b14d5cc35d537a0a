// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 assetflow contributors

//! Live reload signalling

use serde::Serialize;
use tokio::sync::broadcast;

/// A stylesheet to swap in place
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InjectedAsset {
    /// File name of the written output, e.g. `style.css`
    pub name: String,
    /// Content revision used as cache buster
    pub revision: String,
}

/// Message pushed to connected browsers
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ReloadEvent {
    /// Reload the whole page
    Reload,
    /// Re-fetch the listed stylesheets without reloading
    Inject { assets: Vec<InjectedAsset> },
}

/// Fan-out channel between the task runner and the dev server
#[derive(Debug, Clone)]
pub struct LiveReload {
    tx: broadcast::Sender<ReloadEvent>,
}

impl Default for LiveReload {
    fn default() -> Self {
        Self::new()
    }
}

impl LiveReload {
    pub fn new() -> Self {
        let (tx, _) = broadcast::channel(32);
        Self { tx }
    }

    /// New receiver for events sent after this call
    pub fn subscribe(&self) -> broadcast::Receiver<ReloadEvent> {
        self.tx.subscribe()
    }

    /// Broadcast an event; a no-op while nobody listens
    pub fn notify(&self, event: ReloadEvent) {
        let listeners = self.tx.receiver_count();
        if self.tx.send(event).is_ok() {
            tracing::debug!("Reload signal sent to {} listener(s)", listeners);
        }
    }
}
