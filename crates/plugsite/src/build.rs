// SPDX-FileCopyrightText: 2026 Plugsite Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `plugsite --build`: write the repository into the configured directory.

use plugsite_catalog::CatalogClient;
use plugsite_config::PlugsiteConfig;
use plugsite_core::PlugsiteError;
use plugsite_repo::{ArtifactFetcher, BuildReport, BuildRequest, RepositoryBuilder};
use tracing::{info, warn};

use crate::Outcome;

/// Runs a build, racing it against Ctrl-C.
///
/// A cancelled build never writes the manifest; artifacts downloaded so far
/// stay on disk and are reused by the next build.
pub async fn run(config: &PlugsiteConfig) -> Result<Outcome, PlugsiteError> {
    if config.has_no_plugins() {
        return Err(PlugsiteError::Config(
            "no plugins configured: set `plugins` or `localPlugins`".to_string(),
        ));
    }

    let catalog = CatalogClient::from_config(&config.catalog)?;
    let fetcher = ArtifactFetcher::from_config(&config.catalog)?;
    let builder = RepositoryBuilder::new(catalog, fetcher);
    let request = BuildRequest::from_config(config);

    tokio::select! {
        result = builder.build(&request) => {
            let report = result?;
            Ok(summarize(&report))
        }
        Ok(()) = tokio::signal::ctrl_c() => {
            warn!("build cancelled, manifest not written");
            Ok(Outcome::Cancelled)
        }
    }
}

fn summarize(report: &BuildReport) -> Outcome {
    for id in &report.overridden {
        info!(plugin_id = %id, "published local build instead of catalog release");
    }

    if report.is_partial() {
        for (id, err) in &report.failures {
            warn!(plugin_id = %id, kind = %err.kind(), error = %err, "plugin not published");
        }
        warn!(
            manifest = %report.manifest_path.display(),
            failed = report.failures.len(),
            "repository written with missing plugins"
        );
        Outcome::Partial
    } else {
        info!(manifest = %report.manifest_path.display(), "done");
        Outcome::Completed
    }
}
