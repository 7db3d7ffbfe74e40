// SPDX-FileCopyrightText: 2026 Plugsite Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Read-only access to a remote plugin catalog.

use async_trait::async_trait;

use crate::error::PlugsiteError;
use crate::types::{PluginId, PluginRecord, RemoteRelease};

/// A source of plugin metadata and release listings.
///
/// The HTTP catalog client is the production implementation; tests use
/// in-memory doubles.
#[async_trait]
pub trait CatalogSource: Send + Sync {
    /// Fetches the plugin-detail record for `id`.
    async fn fetch_plugin_metadata(&self, id: &PluginId) -> Result<PluginRecord, PlugsiteError>;

    /// Fetches the release listing for `id`.
    ///
    /// Implementations must return `NoReleasesFound` instead of an empty list.
    async fn fetch_release_list(&self, id: &PluginId) -> Result<Vec<RemoteRelease>, PlugsiteError>;

    /// Absolute URL an artifact file name is downloaded from.
    fn download_url(&self, file: &str) -> String;
}
