// SPDX-FileCopyrightText: 2026 Plugsite Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Combining remote and local plugins into one collection.
//!
//! The collection is keyed by [`PluginId`] and holds at most one entry per
//! id. Iteration is in id order.

use std::collections::BTreeMap;

use plugsite_core::{EntryOrigin, PluginId, ResolvedPluginEntry};
use tracing::{info, warn};

/// Deduplicated set of plugins that will be published.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MergedCollection {
    entries: BTreeMap<PluginId, ResolvedPluginEntry>,
    overridden: Vec<PluginId>,
}

impl MergedCollection {
    pub fn get(&self, id: &str) -> Option<&ResolvedPluginEntry> {
        self.entries.get(id)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries in ascending id order.
    pub fn iter(&self) -> impl Iterator<Item = &ResolvedPluginEntry> {
        self.entries.values()
    }

    /// Ids whose remote entry was replaced by a local one.
    pub fn overridden(&self) -> &[PluginId] {
        &self.overridden
    }
}

/// Merges remote and local entries; a local entry replaces any remote entry
/// with the same id.
///
/// Entries sharing an id within one side collapse to the last one. Only a
/// local entry replacing a remote one counts as an override; overrides are
/// logged and recorded, never treated as an error.
pub fn local_wins(
    remote: Vec<ResolvedPluginEntry>,
    local: Vec<ResolvedPluginEntry>,
) -> MergedCollection {
    let mut entries = BTreeMap::new();
    for entry in remote {
        entries.insert(entry.id.clone(), entry);
    }

    let mut overridden = Vec::new();
    for entry in local {
        let id = entry.id.clone();
        match entries.insert(id.clone(), entry) {
            Some(previous) if previous.origin == EntryOrigin::Remote => {
                info!(
                    plugin_id = %id,
                    remote_version = %previous.release.version,
                    "local plugin overrides catalog release"
                );
                overridden.push(id);
            }
            Some(previous) => {
                warn!(
                    plugin_id = %id,
                    replaced_version = %previous.release.version,
                    "duplicate local plugin id, keeping the later entry"
                );
            }
            None => {}
        }
    }

    MergedCollection {
        entries,
        overridden,
    }
}
