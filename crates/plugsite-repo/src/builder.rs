// SPDX-FileCopyrightText: 2026 Plugsite Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! End-to-end repository build.
//!
//! [`RepositoryBuilder::build`] resolves every remote plugin, materializes
//! all artifacts under `files/`, merges remote and local entries and writes
//! `updatePlugins.xml`. Plugins are processed one at a time in input order.
//! The manifest is written last and only whole.

use std::collections::HashMap;
use std::io::Write as _;
use std::path::{Component, Path, PathBuf};

use plugsite_catalog::resolve_latest;
use plugsite_config::PlugsiteConfig;
use plugsite_core::{
    CatalogSource, LocalPluginDescriptor, PluginId, PlugsiteError, ResolvedPluginEntry,
};
use tracing::{debug, info, warn};

use crate::fetcher::{ArtifactFetcher, FetchOutcome};
use crate::manifest::{self, DOWNLOAD_DIR, MANIFEST_FILE_NAME};
use crate::merge;

/// Inputs of one build.
#[derive(Debug, Clone)]
pub struct BuildRequest {
    /// Public base URL written into artifact URLs.
    pub server_url: String,
    pub remote_ids: Vec<PluginId>,
    pub local_plugins: Vec<LocalPluginDescriptor>,
    pub output_dir: PathBuf,
    /// Record per-plugin failures and continue instead of aborting.
    pub keep_going: bool,
}

impl BuildRequest {
    pub fn from_config(config: &PlugsiteConfig) -> Self {
        Self {
            server_url: config.server_url.clone(),
            remote_ids: config
                .plugins
                .iter()
                .map(|id| PluginId::from(id.as_str()))
                .collect(),
            local_plugins: config.local_plugins.clone(),
            output_dir: config.dir.clone(),
            keep_going: config.build.keep_going,
        }
    }
}

/// Summary of a finished build.
#[derive(Debug)]
pub struct BuildReport {
    pub manifest_path: PathBuf,
    /// Entries in the manifest.
    pub plugins: usize,
    /// Remote artifacts transferred in this build.
    pub downloaded: usize,
    /// Remote artifacts already on disk.
    pub reused: usize,
    /// Local artifacts copied.
    pub copied: usize,
    /// Remote plugins replaced by a local plugin with the same id.
    pub overridden: Vec<PluginId>,
    /// Plugins skipped in keep-going mode.
    pub failures: Vec<(PluginId, PlugsiteError)>,
}

impl BuildReport {
    /// True when some plugins were skipped.
    pub fn is_partial(&self) -> bool {
        !self.failures.is_empty()
    }
}

/// Result of processing one remote plugin.
#[derive(Debug)]
pub struct RemoteOutcome {
    pub entry: ResolvedPluginEntry,
    /// Where the artifact lives on disk.
    pub path: PathBuf,
    pub fetch: FetchOutcome,
}

/// Builds an update repository from a catalog and local archives.
pub struct RepositoryBuilder<C> {
    catalog: C,
    fetcher: ArtifactFetcher,
}

impl<C: CatalogSource> RepositoryBuilder<C> {
    pub fn new(catalog: C, fetcher: ArtifactFetcher) -> Self {
        Self { catalog, fetcher }
    }

    pub fn catalog(&self) -> &C {
        &self.catalog
    }

    /// Runs the build described by `request`.
    ///
    /// Fails with `ManifestAlreadyExists` before any network or file work if
    /// the output directory already holds a manifest. Without `keep_going`
    /// the first failing plugin aborts the build and no manifest is written.
    pub async fn build(&self, request: &BuildRequest) -> Result<BuildReport, PlugsiteError> {
        let manifest_path = request.output_dir.join(MANIFEST_FILE_NAME);
        let exists = tokio::fs::try_exists(&manifest_path).await.map_err(|source| {
            PlugsiteError::ManifestWriteFailed {
                path: manifest_path.clone(),
                source,
            }
        })?;
        if exists {
            return Err(PlugsiteError::ManifestAlreadyExists {
                path: manifest_path,
            });
        }

        if request.remote_ids.is_empty() && request.local_plugins.is_empty() {
            return Err(PlugsiteError::Config("no plugins configured".to_string()));
        }

        let files_dir = request.output_dir.join(DOWNLOAD_DIR);
        info!(
            output_dir = %request.output_dir.display(),
            remote = request.remote_ids.len(),
            local = request.local_plugins.len(),
            "building plugin repository"
        );

        let mut failures = Vec::new();
        let mut claims = PathClaims::default();
        let mut remote_entries = Vec::with_capacity(request.remote_ids.len());
        let (mut downloaded, mut reused) = (0, 0);

        for id in &request.remote_ids {
            let processed = self
                .process_remote(id, &files_dir)
                .await
                .and_then(|outcome| {
                    claims.claim(&outcome.path, &outcome.entry.id, &outcome.entry.release.file)?;
                    Ok(outcome)
                });
            match processed {
                Ok(outcome) => {
                    match outcome.fetch {
                        FetchOutcome::Downloaded { .. } => downloaded += 1,
                        FetchOutcome::AlreadyPresent => reused += 1,
                    }
                    remote_entries.push(outcome.entry);
                }
                Err(err) => record_failure(request.keep_going, id.clone(), err, &mut failures)?,
            }
        }

        let mut local_entries = Vec::with_capacity(request.local_plugins.len());
        for descriptor in &request.local_plugins {
            match self.process_local(descriptor, &files_dir, &mut claims).await {
                Ok(entry) => local_entries.push(entry),
                Err(err) => {
                    let id = PluginId::from(descriptor.id.as_str());
                    record_failure(request.keep_going, id, err, &mut failures)?;
                }
            }
        }
        let copied = local_entries.len();

        if remote_entries.is_empty() && local_entries.is_empty() {
            if let Some((_, first)) = failures.into_iter().next() {
                return Err(first);
            }
            return Err(PlugsiteError::Internal(
                "build produced no plugins and no failures".to_string(),
            ));
        }

        let merged = merge::local_wins(remote_entries, local_entries);
        let xml = manifest::render(&merged, &request.server_url, DOWNLOAD_DIR);
        write_manifest(&manifest_path, xml).await?;

        let report = BuildReport {
            manifest_path,
            plugins: merged.len(),
            downloaded,
            reused,
            copied,
            overridden: merged.overridden().to_vec(),
            failures,
        };

        info!(
            manifest = %report.manifest_path.display(),
            plugins = report.plugins,
            downloaded = report.downloaded,
            reused = report.reused,
            copied = report.copied,
            failed = report.failures.len(),
            "repository written"
        );
        Ok(report)
    }

    /// Resolves the newest release of `id` and makes sure its artifact is on disk.
    pub async fn process_remote(
        &self,
        id: &PluginId,
        files_dir: &Path,
    ) -> Result<RemoteOutcome, PlugsiteError> {
        let record = self.catalog.fetch_plugin_metadata(id).await?;
        let releases = self.catalog.fetch_release_list(id).await?;
        let release = resolve_latest(id, &releases)?;
        debug!(
            plugin_id = %id,
            xml_id = %record.xml_id,
            version = %release.version,
            candidates = releases.len(),
            "release selected"
        );

        let url = self.catalog.download_url(&release.file);
        let dest = artifact_path(files_dir, &release.file, &url)?;
        let fetch = self.fetcher.fetch_remote(&dest, &url).await?;

        Ok(RemoteOutcome {
            entry: ResolvedPluginEntry::from_remote(&record, release),
            path: dest,
            fetch,
        })
    }

    /// Copies a local archive into the repository and builds its entry.
    /// The destination is claimed before the copy so another plugin's
    /// artifact is never overwritten.
    async fn process_local(
        &self,
        descriptor: &LocalPluginDescriptor,
        files_dir: &Path,
        claims: &mut PathClaims,
    ) -> Result<ResolvedPluginEntry, PlugsiteError> {
        let entry = ResolvedPluginEntry::from_local(descriptor)?;
        let dest = files_dir.join(&entry.release.file);
        claims.claim(&dest, &entry.id, &descriptor.file.display().to_string())?;
        self.fetcher.copy_local(&dest, &descriptor.file).await?;
        Ok(entry)
    }
}

/// Artifact paths written in this build and the plugin that owns each.
#[derive(Debug, Default)]
struct PathClaims(HashMap<PathBuf, PluginId>);

impl PathClaims {
    /// Records `path` for `id`. A path may be claimed again by the same id
    /// (a local plugin replacing its remote counterpart), never by another.
    fn claim(&mut self, path: &Path, id: &PluginId, origin: &str) -> Result<(), PlugsiteError> {
        match self.0.get(path) {
            Some(owner) if owner != id => Err(PlugsiteError::DownloadFailed {
                url: origin.to_string(),
                path: path.to_path_buf(),
                message: format!(
                    "plugin `{id}` would overwrite the artifact of plugin `{owner}`"
                ),
                source: None,
            }),
            Some(_) => Ok(()),
            None => {
                self.0.insert(path.to_path_buf(), id.clone());
                Ok(())
            }
        }
    }
}

fn record_failure(
    keep_going: bool,
    id: PluginId,
    err: PlugsiteError,
    failures: &mut Vec<(PluginId, PlugsiteError)>,
) -> Result<(), PlugsiteError> {
    if !keep_going {
        return Err(err);
    }
    warn!(plugin_id = %id, error = %err, "plugin skipped");
    failures.push((id, err));
    Ok(())
}

/// Maps a catalog artifact path onto the download directory, refusing
/// paths that would land outside it.
fn artifact_path(files_dir: &Path, file: &str, url: &str) -> Result<PathBuf, PlugsiteError> {
    let relative = Path::new(file.trim_start_matches('/'));
    let escapes = relative
        .components()
        .any(|c| !matches!(c, Component::Normal(_) | Component::CurDir));
    if escapes || relative.as_os_str().is_empty() {
        return Err(PlugsiteError::DownloadFailed {
            url: url.to_string(),
            path: files_dir.join(relative),
            message: format!("artifact path `{file}` is not inside the download directory"),
            source: None,
        });
    }
    Ok(files_dir.join(relative))
}

/// Writes the manifest through a temp file in the same directory and links
/// it into place without replacing an existing file.
async fn write_manifest(path: &Path, content: String) -> Result<(), PlugsiteError> {
    let path = path.to_path_buf();
    tokio::task::spawn_blocking(move || persist_manifest(&path, content.as_bytes()))
        .await
        .map_err(|e| PlugsiteError::Internal(format!("manifest writer task failed: {e}")))?
}

fn persist_manifest(path: &Path, content: &[u8]) -> Result<(), PlugsiteError> {
    let write_failed = |source: std::io::Error| PlugsiteError::ManifestWriteFailed {
        path: path.to_path_buf(),
        source,
    };

    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    std::fs::create_dir_all(dir).map_err(write_failed)?;

    let mut tmp = tempfile::NamedTempFile::new_in(dir).map_err(write_failed)?;
    tmp.write_all(content).map_err(write_failed)?;
    tmp.as_file().sync_all().map_err(write_failed)?;

    tmp.persist_noclobber(path).map_err(|e| {
        if e.error.kind() == std::io::ErrorKind::AlreadyExists {
            PlugsiteError::ManifestAlreadyExists {
                path: path.to_path_buf(),
            }
        } else {
            write_failed(e.error)
        }
    })?;
    Ok(())
}
