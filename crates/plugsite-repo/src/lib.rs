// SPDX-FileCopyrightText: 2026 Plugsite Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Repository synthesis for Plugsite.
//!
//! Turns a list of remote plugin ids and local plugin descriptors into an
//! on-disk update repository: artifacts under `files/` and a single
//! `updatePlugins.xml` manifest at the root.

pub mod builder;
pub mod fetcher;
pub mod manifest;
pub mod merge;

pub use builder::{BuildReport, BuildRequest, RepositoryBuilder};
pub use fetcher::{ArtifactFetcher, FetchOutcome};
pub use manifest::{DOWNLOAD_DIR, MANIFEST_FILE_NAME};
pub use merge::MergedCollection;
