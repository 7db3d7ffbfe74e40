// SPDX-FileCopyrightText: 2026 Plugsite Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Error types for the Plugsite repository builder.

use std::path::PathBuf;

use strum::{AsRefStr, Display};
use thiserror::Error;

use crate::types::PluginId;

/// The primary error type returned by every stage of the build pipeline.
///
/// Nothing below the binary recovers from these; the orchestrator either
/// aborts on the first one or, in keep-going mode, records it per plugin.
#[derive(Debug, Error)]
pub enum PlugsiteError {
    /// The configuration file could not be read at all.
    #[error("cannot read configuration file {}: {source}", .path.display())]
    ConfigUnreadable {
        path: PathBuf,
        source: std::io::Error,
    },

    /// Configuration content is invalid (bad values, nothing to build).
    #[error("configuration error: {0}")]
    Config(String),

    /// The catalog could not be reached, timed out, or answered with an error status.
    #[error("catalog unavailable for plugin {plugin_id} ({url}){}", source_suffix(.source))]
    CatalogUnavailable {
        plugin_id: PluginId,
        url: String,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// The catalog answered but the body did not match the expected schema.
    #[error("malformed catalog response for plugin {plugin_id} ({url}): {source}")]
    MalformedResponse {
        plugin_id: PluginId,
        url: String,
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// The release listing for a plugin was empty.
    #[error("no releases found for plugin {plugin_id}")]
    NoReleasesFound { plugin_id: PluginId },

    /// An artifact could not be downloaded or written to its destination.
    #[error("failed to fetch {url} into {}: {message}", .path.display())]
    DownloadFailed {
        url: String,
        path: PathBuf,
        message: String,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// A local plugin archive does not exist or is not readable.
    #[error("local plugin artifact {} is missing or unreadable: {source}", .path.display())]
    LocalArtifactMissing {
        path: PathBuf,
        source: std::io::Error,
    },

    /// The output directory already holds a manifest from a previous build.
    #[error("manifest {} already exists; build into a clean output directory", .path.display())]
    ManifestAlreadyExists { path: PathBuf },

    /// The manifest could not be written.
    #[error("failed to write manifest {}: {source}", .path.display())]
    ManifestWriteFailed {
        path: PathBuf,
        source: std::io::Error,
    },

    /// The static file server failed to bind or crashed.
    #[error("server error: {message}")]
    Server {
        message: String,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Internal or unexpected errors.
    #[error("internal error: {0}")]
    Internal(String),
}

fn source_suffix(source: &Option<Box<dyn std::error::Error + Send + Sync>>) -> String {
    match source {
        Some(e) => format!(": {e}"),
        None => String::new(),
    }
}

/// Stable, machine-readable classification of a [`PlugsiteError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, AsRefStr)]
#[strum(serialize_all = "snake_case")]
pub enum ErrorKind {
    ConfigUnreadable,
    Config,
    CatalogUnavailable,
    MalformedResponse,
    NoReleasesFound,
    DownloadFailed,
    LocalArtifactMissing,
    ManifestAlreadyExists,
    ManifestWriteFailed,
    Server,
    Internal,
}

impl ErrorKind {
    /// Process exit status reported for this kind of failure.
    pub fn exit_code(self) -> u8 {
        match self {
            ErrorKind::ConfigUnreadable | ErrorKind::Config => 2,
            ErrorKind::CatalogUnavailable => 10,
            ErrorKind::MalformedResponse => 11,
            ErrorKind::NoReleasesFound => 12,
            ErrorKind::DownloadFailed => 13,
            ErrorKind::LocalArtifactMissing => 14,
            ErrorKind::ManifestAlreadyExists => 20,
            ErrorKind::ManifestWriteFailed => 21,
            ErrorKind::Server => 30,
            ErrorKind::Internal => 70,
        }
    }
}

impl PlugsiteError {
    /// Returns the classification of this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            PlugsiteError::ConfigUnreadable { .. } => ErrorKind::ConfigUnreadable,
            PlugsiteError::Config(_) => ErrorKind::Config,
            PlugsiteError::CatalogUnavailable { .. } => ErrorKind::CatalogUnavailable,
            PlugsiteError::MalformedResponse { .. } => ErrorKind::MalformedResponse,
            PlugsiteError::NoReleasesFound { .. } => ErrorKind::NoReleasesFound,
            PlugsiteError::DownloadFailed { .. } => ErrorKind::DownloadFailed,
            PlugsiteError::LocalArtifactMissing { .. } => ErrorKind::LocalArtifactMissing,
            PlugsiteError::ManifestAlreadyExists { .. } => ErrorKind::ManifestAlreadyExists,
            PlugsiteError::ManifestWriteFailed { .. } => ErrorKind::ManifestWriteFailed,
            PlugsiteError::Server { .. } => ErrorKind::Server,
            PlugsiteError::Internal(_) => ErrorKind::Internal,
        }
    }

    /// Shorthand for `self.kind().exit_code()`.
    pub fn exit_code(&self) -> u8 {
        self.kind().exit_code()
    }
}
