// SPDX-FileCopyrightText: 2026 Plugsite Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Data model shared by the catalog client, fetcher, merger and renderer.

use std::borrow::Borrow;
use std::fmt;
use std::path::PathBuf;

use serde::{Deserialize, Deserializer, Serialize};
use strum::Display;

use crate::error::PlugsiteError;

/// Unique key of a plugin within a repository (the IDE's `xmlId`).
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PluginId(pub String);

impl PluginId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PluginId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for PluginId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for PluginId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl Borrow<str> for PluginId {
    fn borrow(&self) -> &str {
        &self.0
    }
}

/// Catalog metadata for one plugin, as returned by the plugin-detail endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct PluginRecord {
    /// Numeric catalog id.
    pub id: u64,
    /// Display name.
    #[serde(default, deserialize_with = "null_as_empty")]
    pub name: String,
    /// The identifier IDE clients key plugins by.
    #[serde(rename = "xmlId")]
    pub xml_id: String,
    /// Marketplace description (HTML).
    #[serde(default, deserialize_with = "null_as_empty")]
    pub description: String,
}

/// One published version of a plugin, as returned by the release-listing endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct RemoteRelease {
    /// Numeric release (update) id.
    pub id: u64,
    pub version: String,
    /// Minimum IDE build.
    #[serde(default, deserialize_with = "null_as_empty")]
    pub since: String,
    /// Maximum IDE build.
    #[serde(default, deserialize_with = "null_as_empty")]
    pub until: String,
    /// Artifact path relative to the catalog's download base.
    pub file: String,
}

/// Operator-supplied plugin archive that bypasses the catalog.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct LocalPluginDescriptor {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub version: String,
    #[serde(default)]
    pub since: String,
    #[serde(default)]
    pub until: String,
    /// Path to the archive on the local filesystem.
    #[serde(default)]
    pub file: PathBuf,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub vendor: String,
    #[serde(default)]
    pub vendor_email: String,
    #[serde(default)]
    pub vendor_url: String,
    #[serde(default)]
    pub description: String,
}

impl LocalPluginDescriptor {
    /// File name the archive is published under, i.e. the last path component of `file`.
    pub fn artifact_file_name(&self) -> Option<String> {
        self.file
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
    }
}

/// Vendor block rendered into the manifest.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VendorInfo {
    pub name: String,
    pub email: String,
    pub url: String,
}

impl VendorInfo {
    /// Returns `None` when every field is empty.
    pub fn from_parts(name: &str, email: &str, url: &str) -> Option<Self> {
        if name.is_empty() && email.is_empty() && url.is_empty() {
            return None;
        }
        Some(Self {
            name: name.to_string(),
            email: email.to_string(),
            url: url.to_string(),
        })
    }
}

/// The release chosen to represent a plugin in the built repository.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelectedRelease {
    pub version: String,
    pub since: String,
    pub until: String,
    /// Artifact file name under the repository's download directory.
    pub file: String,
    /// Catalog release id; `None` for local plugins.
    pub release_id: Option<u64>,
}

/// Where a resolved entry came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, Serialize, Deserialize)]
#[strum(serialize_all = "lowercase")]
pub enum EntryOrigin {
    Remote,
    Local,
}

/// A plugin as it will appear in the manifest.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolvedPluginEntry {
    pub id: PluginId,
    pub name: Option<String>,
    pub description: Option<String>,
    pub vendor: Option<VendorInfo>,
    pub release: SelectedRelease,
    pub origin: EntryOrigin,
}

impl ResolvedPluginEntry {
    /// Builds an entry from catalog metadata and the release picked for it.
    ///
    /// The entry is keyed by the record's `xmlId`, not by the numeric id or
    /// the identifier the operator configured.
    pub fn from_remote(record: &PluginRecord, release: &RemoteRelease) -> Self {
        Self {
            id: PluginId(record.xml_id.clone()),
            name: non_empty(&record.name),
            description: non_empty(&record.description),
            vendor: None,
            release: SelectedRelease {
                version: release.version.clone(),
                since: release.since.clone(),
                until: release.until.clone(),
                file: release.file.clone(),
                release_id: Some(release.id),
            },
            origin: EntryOrigin::Remote,
        }
    }

    /// Builds an entry directly from an operator-supplied descriptor.
    pub fn from_local(descriptor: &LocalPluginDescriptor) -> Result<Self, PlugsiteError> {
        let file = descriptor.artifact_file_name().ok_or_else(|| {
            PlugsiteError::Config(format!(
                "local plugin `{}`: file `{}` has no file name",
                descriptor.id,
                descriptor.file.display()
            ))
        })?;

        Ok(Self {
            id: PluginId(descriptor.id.clone()),
            name: non_empty(&descriptor.name),
            description: non_empty(&descriptor.description),
            vendor: VendorInfo::from_parts(
                &descriptor.vendor,
                &descriptor.vendor_email,
                &descriptor.vendor_url,
            ),
            release: SelectedRelease {
                version: descriptor.version.clone(),
                since: descriptor.since.clone(),
                until: descriptor.until.clone(),
                file,
                release_id: None,
            },
            origin: EntryOrigin::Local,
        })
    }
}

fn non_empty(s: &str) -> Option<String> {
    if s.is_empty() {
        None
    } else {
        Some(s.to_string())
    }
}

/// Deserializes a JSON `null` string as the empty string.
fn null_as_empty<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}
