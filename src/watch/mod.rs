// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 assetflow contributors

//! Watch mode
//!
//! Glob bindings map changed source paths to tasks. The watcher collects
//! filesystem events into debounced batches, and every task matched by a
//! batch is triggered once through the [`Dispatcher`].

mod binding;
mod dispatcher;
mod watcher;

pub use binding::{WatchBinding, WatchSet};
pub use dispatcher::Dispatcher;
pub use watcher::watch;
