// SPDX-FileCopyrightText: 2026 Plugsite Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Core library for the Plugsite repository builder.
//!
//! This crate provides the data model shared by every stage of the
//! repository synthesis pipeline, the single error type propagated up to
//! the binary, and the [`CatalogSource`] trait the catalog client and test
//! doubles implement.

pub mod error;
pub mod traits;
pub mod types;

// Re-export key items at crate root for ergonomic imports.
pub use error::{ErrorKind, PlugsiteError};
pub use traits::CatalogSource;
pub use types::{
    EntryOrigin, LocalPluginDescriptor, PluginId, PluginRecord, RemoteRelease,
    ResolvedPluginEntry, SelectedRelease, VendorInfo,
};
