// SPDX-FileCopyrightText: 2026 Plugsite Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration model structs for Plugsite.
//!
//! Keys are camelCase so existing `config.yaml` files keep working. All
//! structs use `#[serde(deny_unknown_fields)]` to reject unrecognized keys
//! at startup.

use std::path::PathBuf;

use plugsite_core::LocalPluginDescriptor;
use serde::{Deserialize, Deserializer, Serialize};

/// Top-level Plugsite configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct PlugsiteConfig {
    /// Public base URL IDE clients reach the repository at. Artifact URLs
    /// in the manifest are built from it.
    #[serde(default = "default_server_url")]
    pub server_url: String,

    /// Address the static server binds to.
    #[serde(default = "default_bind_ip")]
    pub bind_ip: String,

    /// Port the static server listens on. Accepts `3000` or `"3000"`.
    #[serde(default = "default_port", deserialize_with = "port_from_str_or_int")]
    pub port: u16,

    /// Output directory for the build and root directory for the server.
    #[serde(default = "default_dir")]
    pub dir: PathBuf,

    /// Logging level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Catalog plugin identifiers to mirror.
    #[serde(default)]
    pub plugins: Vec<String>,

    /// Plugin archives supplied from the local filesystem.
    #[serde(default)]
    pub local_plugins: Vec<LocalPluginDescriptor>,

    /// Upstream catalog endpoints and timeouts.
    #[serde(default)]
    pub catalog: CatalogConfig,

    /// Build behavior.
    #[serde(default)]
    pub build: BuildConfig,
}

impl Default for PlugsiteConfig {
    fn default() -> Self {
        Self {
            server_url: default_server_url(),
            bind_ip: default_bind_ip(),
            port: default_port(),
            dir: default_dir(),
            log_level: default_log_level(),
            plugins: Vec::new(),
            local_plugins: Vec::new(),
            catalog: CatalogConfig::default(),
            build: BuildConfig::default(),
        }
    }
}

impl PlugsiteConfig {
    /// True when neither catalog nor local plugins are configured.
    pub fn has_no_plugins(&self) -> bool {
        self.plugins.is_empty() && self.local_plugins.is_empty()
    }
}

fn default_server_url() -> String {
    "http://localhost:3000".to_string()
}

fn default_bind_ip() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    3000
}

fn default_dir() -> PathBuf {
    PathBuf::from("out")
}

fn default_log_level() -> String {
    "info".to_string()
}

/// Upstream catalog configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct CatalogConfig {
    /// Base of the plugin-detail endpoint (`{pluginsUrl}/{id}`).
    #[serde(default = "default_api_url")]
    pub plugins_url: String,

    /// Base of the release-listing endpoint (`{releasesUrl}/{id}/updates`).
    #[serde(default = "default_api_url")]
    pub releases_url: String,

    /// Base URL artifact files are downloaded from.
    #[serde(default = "default_download_url")]
    pub download_url: String,

    /// Timeout for metadata requests, in seconds.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Timeout for a whole artifact download, in seconds.
    #[serde(default = "default_download_timeout_secs")]
    pub download_timeout_secs: u64,
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            plugins_url: default_api_url(),
            releases_url: default_api_url(),
            download_url: default_download_url(),
            timeout_secs: default_timeout_secs(),
            download_timeout_secs: default_download_timeout_secs(),
        }
    }
}

fn default_api_url() -> String {
    "https://plugins.jetbrains.com/api/plugins".to_string()
}

fn default_download_url() -> String {
    "https://plugins.jetbrains.com/files".to_string()
}

fn default_timeout_secs() -> u64 {
    2
}

fn default_download_timeout_secs() -> u64 {
    300
}

/// Build behavior configuration.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct BuildConfig {
    /// Skip plugins that fail instead of aborting the whole build.
    #[serde(default)]
    pub keep_going: bool,
}

/// Accepts the port either as an integer or as a numeric string.
fn port_from_str_or_int<'de, D>(deserializer: D) -> Result<u16, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum PortRepr {
        Number(u16),
        Text(String),
    }

    match PortRepr::deserialize(deserializer)? {
        PortRepr::Number(port) => Ok(port),
        PortRepr::Text(text) => text.trim().parse::<u16>().map_err(|e| {
            serde::de::Error::custom(format!("invalid port `{text}`: {e}"))
        }),
    }
}
