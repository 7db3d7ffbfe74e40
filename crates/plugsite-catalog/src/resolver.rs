// SPDX-FileCopyrightText: 2026 Plugsite Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Release selection.
//!
//! The published release is the one with the greatest version string under
//! plain lexicographic (byte-wise) comparison. This is not semantic version
//! ordering: `"10.0"` sorts below `"2.0"`. Existing repositories depend on
//! this ordering, so it must not change silently.

use plugsite_core::{PluginId, PlugsiteError, RemoteRelease};

/// Returns the release with the lexicographically greatest version.
///
/// Among equal version strings the first one in `releases` wins. An empty
/// slice is `NoReleasesFound`.
pub fn resolve_latest<'a>(
    plugin_id: &PluginId,
    releases: &'a [RemoteRelease],
) -> Result<&'a RemoteRelease, PlugsiteError> {
    releases
        .iter()
        .reduce(|best, candidate| {
            if candidate.version > best.version {
                candidate
            } else {
                best
            }
        })
        .ok_or_else(|| PlugsiteError::NoReleasesFound {
            plugin_id: plugin_id.clone(),
        })
}
