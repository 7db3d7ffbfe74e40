// SPDX-FileCopyrightText: 2026 Plugsite Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! In-memory catalog for deterministic builder tests.
//!
//! `MockCatalog` implements `CatalogSource` from pre-registered records and
//! counts every call, so tests can assert that a build made no catalog
//! requests at all.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use plugsite_core::{CatalogSource, PluginId, PluginRecord, PlugsiteError, RemoteRelease};

/// A catalog that answers from memory.
///
/// Unknown ids fail with `CatalogUnavailable`, as an unreachable catalog
/// would.
#[derive(Debug, Default)]
pub struct MockCatalog {
    records: HashMap<PluginId, PluginRecord>,
    releases: HashMap<PluginId, Vec<RemoteRelease>>,
    download_base: String,
    metadata_calls: AtomicUsize,
    release_calls: AtomicUsize,
}

impl MockCatalog {
    /// Create an empty catalog whose artifacts live under `download_base`.
    pub fn new(download_base: impl Into<String>) -> Self {
        Self {
            download_base: download_base.into(),
            ..Default::default()
        }
    }

    /// Register a plugin under `id` with its release listing.
    pub fn with_plugin(
        mut self,
        id: &str,
        record: PluginRecord,
        releases: Vec<RemoteRelease>,
    ) -> Self {
        self.records.insert(PluginId::from(id), record);
        self.releases.insert(PluginId::from(id), releases);
        self
    }

    /// Number of `fetch_plugin_metadata` calls so far.
    pub fn metadata_calls(&self) -> usize {
        self.metadata_calls.load(Ordering::SeqCst)
    }

    /// Number of `fetch_release_list` calls so far.
    pub fn release_calls(&self) -> usize {
        self.release_calls.load(Ordering::SeqCst)
    }

    /// Total catalog calls of either kind.
    pub fn total_calls(&self) -> usize {
        self.metadata_calls() + self.release_calls()
    }

    fn unavailable(&self, id: &PluginId, what: &str) -> PlugsiteError {
        PlugsiteError::CatalogUnavailable {
            plugin_id: id.clone(),
            url: format!("mock://catalog/{id}/{what}"),
            source: None,
        }
    }
}

#[async_trait]
impl CatalogSource for MockCatalog {
    async fn fetch_plugin_metadata(&self, id: &PluginId) -> Result<PluginRecord, PlugsiteError> {
        self.metadata_calls.fetch_add(1, Ordering::SeqCst);
        self.records
            .get(id)
            .cloned()
            .ok_or_else(|| self.unavailable(id, "metadata"))
    }

    async fn fetch_release_list(&self, id: &PluginId) -> Result<Vec<RemoteRelease>, PlugsiteError> {
        self.release_calls.fetch_add(1, Ordering::SeqCst);
        let releases = self
            .releases
            .get(id)
            .cloned()
            .ok_or_else(|| self.unavailable(id, "updates"))?;
        if releases.is_empty() {
            return Err(PlugsiteError::NoReleasesFound {
                plugin_id: id.clone(),
            });
        }
        Ok(releases)
    }

    fn download_url(&self, file: &str) -> String {
        format!("{}/{}", self.download_base.trim_end_matches('/'), file)
    }
}
