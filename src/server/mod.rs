// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 assetflow contributors

//! Development server
//!
//! Serves the destination tree over HTTP and pushes reload signals to the
//! connected pages over a websocket.

mod http;
mod reload;
mod websocket;

pub use http::{inject_script_tag, DevServer, CLIENT_PATH, LIVERELOAD_PATH};
pub use reload::{InjectedAsset, LiveReload, ReloadEvent};
