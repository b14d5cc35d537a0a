// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 assetflow contributors

//! Task definitions and execution
//!
//! Tasks are registered once into a [`TaskRegistry`], checked by the
//! [`RegistryValidator`] and then run by a [`TaskRunner`]. Composite tasks
//! run their dependencies in series or in parallel before their own action.

mod dag;
mod definition;
mod executor;
mod registry;
mod validation;

pub use dag::TaskGraph;
pub use definition::*;
pub use executor::{TaskContext, TaskHandle, TaskRunner};
pub use registry::TaskRegistry;
pub use validation::{RegistryValidator, ValidationResult};
