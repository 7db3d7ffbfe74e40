// SPDX-FileCopyrightText: 2026 Plugsite Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration loader using Figment for layered config merging.
//!
//! Merge order (later overrides earlier): compiled defaults, the config file
//! (YAML or TOML, picked by extension), then `PLUGSITE_*` environment
//! variables.

#![allow(clippy::result_large_err)] // figment::Error is external and cannot be boxed without wrapper

use std::path::Path;

use figment::{
    providers::{Env, Format, Serialized, Toml, Yaml},
    Figment,
};

use crate::model::PlugsiteConfig;

/// Default config file name, looked up in the working directory.
pub const DEFAULT_CONFIG_FILE: &str = "config.yaml";

/// Syntax of a configuration file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigFormat {
    Yaml,
    Toml,
}

impl ConfigFormat {
    /// Picks the format from the file extension. Anything that is not
    /// `.toml` is read as YAML.
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|e| e.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("toml") => ConfigFormat::Toml,
            _ => ConfigFormat::Yaml,
        }
    }
}

/// Load configuration from a string only (no environment overrides).
///
/// Used for testing and explicit configuration.
pub fn load_config_from_str(
    content: &str,
    format: ConfigFormat,
) -> Result<PlugsiteConfig, figment::Error> {
    base_figment(content, format).extract()
}

/// Load configuration from already-read file content with env var overrides.
pub fn load_config_with_env(
    content: &str,
    format: ConfigFormat,
) -> Result<PlugsiteConfig, figment::Error> {
    build_figment(content, format).extract()
}

/// Build the Figment used for config loading (exposed for diagnostic use).
///
/// Returns the Figment before extraction so callers can inspect metadata.
pub fn build_figment(content: &str, format: ConfigFormat) -> Figment {
    base_figment(content, format).merge(env_provider())
}

fn base_figment(content: &str, format: ConfigFormat) -> Figment {
    let figment = Figment::new().merge(Serialized::defaults(PlugsiteConfig::default()));
    match format {
        ConfigFormat::Yaml => figment.merge(Yaml::string(content)),
        ConfigFormat::Toml => figment.merge(Toml::string(content)),
    }
}

/// Create the environment variable provider.
///
/// Uses `Env::map()` rather than `Env::split("_")` because keys are
/// camelCase: `PLUGSITE_SERVER_URL` must map to `serverUrl` and
/// `PLUGSITE_CATALOG_TIMEOUT_SECS` to `catalog.timeoutSecs`. Figment
/// lowercases mapped keys by default, which would turn `serverUrl` back
/// into `serverurl`, so lowercasing happens before the mapping instead.
fn env_provider() -> Env {
    Env::prefixed("PLUGSITE_")
        .map(|key| env_key_to_config_key(&key.as_str().to_ascii_lowercase()).into())
        .lowercase(false)
}

/// Maps a lowercased, prefix-stripped env var name to a config key path.
pub fn env_key_to_config_key(key: &str) -> String {
    for section in ["catalog", "build"] {
        if let Some(rest) = key.strip_prefix(section).and_then(|r| r.strip_prefix('_')) {
            return format!("{section}.{}", snake_to_camel(rest));
        }
    }
    snake_to_camel(key)
}

fn snake_to_camel(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut upper_next = false;
    for c in s.chars() {
        if c == '_' {
            upper_next = true;
        } else if upper_next {
            out.extend(c.to_uppercase());
            upper_next = false;
        } else {
            out.push(c);
        }
    }
    out
}
