// SPDX-FileCopyrightText: 2026 Plugsite Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Artifact materialization.
//!
//! Remote artifacts are downloaded once: an existing destination file is
//! trusted and never re-fetched. Local artifacts are copied on every build
//! so edits to the source archive always reach the repository.

use std::path::{Path, PathBuf};
use std::time::Duration;

use futures::StreamExt;
use plugsite_config::model::CatalogConfig;
use plugsite_core::PlugsiteError;
use tokio::io::AsyncWriteExt;
use tracing::{debug, info, warn};

/// Result of [`ArtifactFetcher::fetch_remote`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchOutcome {
    /// The destination already existed; no request was made.
    AlreadyPresent,
    /// The artifact was downloaded and `bytes` were written.
    Downloaded { bytes: u64 },
}

/// Downloads and copies plugin archives into the repository tree.
#[derive(Debug, Clone)]
pub struct ArtifactFetcher {
    client: reqwest::Client,
}

impl ArtifactFetcher {
    /// Creates a fetcher whose downloads time out after `timeout`.
    pub fn new(timeout: Duration) -> Result<Self, PlugsiteError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(concat!("plugsite/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| PlugsiteError::Internal(format!("failed to build HTTP client: {e}")))?;
        Ok(Self { client })
    }

    pub fn from_config(config: &CatalogConfig) -> Result<Self, PlugsiteError> {
        Self::new(Duration::from_secs(config.download_timeout_secs))
    }

    /// Ensures `dest` holds the artifact served at `url`.
    ///
    /// Returns [`FetchOutcome::AlreadyPresent`] without touching the network
    /// when `dest` exists. Otherwise the body is streamed into a hidden
    /// `.{name}.part` sibling and renamed onto `dest` once complete, so a
    /// failed transfer never leaves a truncated artifact behind.
    pub async fn fetch_remote(&self, dest: &Path, url: &str) -> Result<FetchOutcome, PlugsiteError> {
        let exists = tokio::fs::try_exists(dest)
            .await
            .map_err(|e| download_failed(url, dest, "cannot check destination", e))?;
        if exists {
            debug!(path = %dest.display(), url, "artifact already present, skipping download");
            return Ok(FetchOutcome::AlreadyPresent);
        }

        create_parent_dirs(dest, url).await?;

        let part = part_path(dest);
        match self.download_to(&part, dest, url).await {
            Ok(bytes) => {
                tokio::fs::rename(&part, dest)
                    .await
                    .map_err(|e| download_failed(url, dest, "rename into place failed", e))?;
                info!(path = %dest.display(), url, bytes, "artifact downloaded");
                Ok(FetchOutcome::Downloaded { bytes })
            }
            Err(e) => {
                if let Err(cleanup) = tokio::fs::remove_file(&part).await
                    && cleanup.kind() != std::io::ErrorKind::NotFound
                {
                    warn!(path = %part.display(), error = %cleanup, "failed to remove partial download");
                }
                Err(e)
            }
        }
    }

    /// Streams `url` into `part`, returning the number of bytes written.
    /// Errors name `dest`, the path the operator cares about.
    async fn download_to(&self, part: &Path, dest: &Path, url: &str) -> Result<u64, PlugsiteError> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| download_failed(url, dest, "request failed", e))?;

        let status = response.status();
        debug!(url, status = %status, "download response received");
        if !status.is_success() {
            return Err(PlugsiteError::DownloadFailed {
                url: url.to_string(),
                path: dest.to_path_buf(),
                message: format!("HTTP {status}"),
                source: None,
            });
        }

        let mut file = tokio::fs::File::create(part)
            .await
            .map_err(|e| download_failed(url, dest, "cannot create file", e))?;

        let mut bytes = 0u64;
        let mut stream = response.bytes_stream();
        while let Some(chunk) = stream.next().await {
            let chunk = chunk.map_err(|e| download_failed(url, dest, "transfer interrupted", e))?;
            file.write_all(&chunk)
                .await
                .map_err(|e| download_failed(url, dest, "write failed", e))?;
            bytes += chunk.len() as u64;
        }

        file.flush()
            .await
            .map_err(|e| download_failed(url, dest, "flush failed", e))?;

        Ok(bytes)
    }

    /// Copies the local archive at `source` to `dest`, overwriting any
    /// existing file. Returns the number of bytes copied.
    pub async fn copy_local(&self, dest: &Path, source: &Path) -> Result<u64, PlugsiteError> {
        let mut reader = tokio::fs::File::open(source).await.map_err(|e| {
            PlugsiteError::LocalArtifactMissing {
                path: source.to_path_buf(),
                source: e,
            }
        })?;

        let origin = source.display().to_string();
        create_parent_dirs(dest, &origin).await?;

        let mut writer = tokio::fs::File::create(dest)
            .await
            .map_err(|e| download_failed(&origin, dest, "cannot create file", e))?;

        let bytes = tokio::io::copy(&mut reader, &mut writer)
            .await
            .map_err(|e| download_failed(&origin, dest, "copy failed", e))?;
        writer
            .flush()
            .await
            .map_err(|e| download_failed(&origin, dest, "flush failed", e))?;

        info!(path = %dest.display(), source = %origin, bytes, "local artifact copied");
        Ok(bytes)
    }
}

async fn create_parent_dirs(dest: &Path, origin: &str) -> Result<(), PlugsiteError> {
    if let Some(parent) = dest.parent()
        && !parent.as_os_str().is_empty()
    {
        tokio::fs::create_dir_all(parent)
            .await
            .map_err(|e| download_failed(origin, dest, "cannot create directory", e))?;
    }
    Ok(())
}

/// `dir/name` becomes `dir/.name.part`.
fn part_path(dest: &Path) -> PathBuf {
    let name = dest
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    dest.with_file_name(format!(".{name}.part"))
}

fn download_failed(
    url: &str,
    path: &Path,
    message: &str,
    source: impl std::error::Error + Send + Sync + 'static,
) -> PlugsiteError {
    PlugsiteError::DownloadFailed {
        url: url.to_string(),
        path: path.to_path_buf(),
        message: format!("{message}: {source}"),
        source: Some(Box::new(source)),
    }
}
