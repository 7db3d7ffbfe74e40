// SPDX-FileCopyrightText: 2026 Plugsite Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! HTTP client for the plugin marketplace catalog.
//!
//! Provides [`CatalogClient`], which fetches plugin-detail records and
//! release listings. Requests are never retried: a transport failure is
//! returned immediately and aborts the build upstream.

use std::time::Duration;

use async_trait::async_trait;
use plugsite_config::model::CatalogConfig;
use plugsite_core::{CatalogSource, PluginId, PluginRecord, PlugsiteError, RemoteRelease};
use serde::de::DeserializeOwned;
use tracing::debug;

/// Number of releases requested per listing.
pub const RELEASE_PAGE_SIZE: u32 = 8;

/// Base URLs of the three catalog endpoints.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogEndpoints {
    /// `{plugins_url}/{id}` returns the plugin-detail record.
    pub plugins_url: String,
    /// `{releases_url}/{id}/updates` returns the release listing.
    pub releases_url: String,
    /// `{download_url}/{file}` returns artifact bytes.
    pub download_url: String,
}

impl CatalogEndpoints {
    /// Points every endpoint at one base URL (mock servers, mirrors).
    pub fn single_base(base: &str) -> Self {
        let base = base.trim_end_matches('/').to_string();
        Self {
            plugins_url: base.clone(),
            releases_url: base.clone(),
            download_url: format!("{base}/files"),
        }
    }
}

impl From<&CatalogConfig> for CatalogEndpoints {
    fn from(config: &CatalogConfig) -> Self {
        Self {
            plugins_url: config.plugins_url.clone(),
            releases_url: config.releases_url.clone(),
            download_url: config.download_url.clone(),
        }
    }
}

/// HTTP client for catalog metadata.
#[derive(Debug, Clone)]
pub struct CatalogClient {
    client: reqwest::Client,
    endpoints: CatalogEndpoints,
}

impl CatalogClient {
    /// Creates a catalog client whose requests time out after `timeout`.
    pub fn new(endpoints: CatalogEndpoints, timeout: Duration) -> Result<Self, PlugsiteError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(concat!("plugsite/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| PlugsiteError::Internal(format!("failed to build HTTP client: {e}")))?;

        Ok(Self { client, endpoints })
    }

    /// Creates a catalog client from the `catalog` config section.
    pub fn from_config(config: &CatalogConfig) -> Result<Self, PlugsiteError> {
        Self::new(
            CatalogEndpoints::from(config),
            Duration::from_secs(config.timeout_secs),
        )
    }

    /// Returns the configured endpoints.
    pub fn endpoints(&self) -> &CatalogEndpoints {
        &self.endpoints
    }

    /// URL of the plugin-detail record for `id`.
    pub fn plugin_url(&self, id: &PluginId) -> String {
        format!("{}/{id}", self.endpoints.plugins_url.trim_end_matches('/'))
    }

    /// URL of the release listing for `id`: default channel, one page.
    pub fn releases_url(&self, id: &PluginId) -> String {
        format!(
            "{}/{id}/updates?channel=&size={RELEASE_PAGE_SIZE}",
            self.endpoints.releases_url.trim_end_matches('/')
        )
    }

    /// GETs `url` and decodes the JSON body into `T`.
    async fn get_json<T: DeserializeOwned>(
        &self,
        plugin_id: &PluginId,
        url: &str,
    ) -> Result<T, PlugsiteError> {
        let unavailable = |source: Box<dyn std::error::Error + Send + Sync>| {
            PlugsiteError::CatalogUnavailable {
                plugin_id: plugin_id.clone(),
                url: url.to_string(),
                source: Some(source),
            }
        };

        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| unavailable(Box::new(e)))?;

        let status = response.status();
        debug!(plugin_id = %plugin_id, url, status = %status, "catalog response received");

        if !status.is_success() {
            return Err(unavailable(format!("HTTP {status}").into()));
        }

        let body = response
            .bytes()
            .await
            .map_err(|e| unavailable(Box::new(e)))?;

        serde_json::from_slice(&body).map_err(|e| PlugsiteError::MalformedResponse {
            plugin_id: plugin_id.clone(),
            url: url.to_string(),
            source: Box::new(e),
        })
    }
}

#[async_trait]
impl CatalogSource for CatalogClient {
    async fn fetch_plugin_metadata(&self, id: &PluginId) -> Result<PluginRecord, PlugsiteError> {
        let url = self.plugin_url(id);
        self.get_json(id, &url).await
    }

    async fn fetch_release_list(&self, id: &PluginId) -> Result<Vec<RemoteRelease>, PlugsiteError> {
        let url = self.releases_url(id);
        let releases: Vec<RemoteRelease> = self.get_json(id, &url).await?;
        if releases.is_empty() {
            return Err(PlugsiteError::NoReleasesFound {
                plugin_id: id.clone(),
            });
        }
        debug!(plugin_id = %id, count = releases.len(), "release listing decoded");
        Ok(releases)
    }

    fn download_url(&self, file: &str) -> String {
        format!(
            "{}/{}",
            self.endpoints.download_url.trim_end_matches('/'),
            file.trim_start_matches('/')
        )
    }
}
