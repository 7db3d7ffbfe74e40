// SPDX-FileCopyrightText: 2026 Plugsite Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `plugsite --serve`: serve the configured directory until Ctrl-C.

use plugsite_config::PlugsiteConfig;
use plugsite_core::PlugsiteError;
use plugsite_server::ServerConfig;
use tokio_util::sync::CancellationToken;

use crate::Outcome;

pub async fn run(config: &PlugsiteConfig) -> Result<Outcome, PlugsiteError> {
    let cancel = CancellationToken::new();

    let signal = cancel.clone();
    tokio::spawn(async move {
        match tokio::signal::ctrl_c().await {
            Ok(()) => {
                tracing::info!("shutdown signal received");
                signal.cancel();
            }
            Err(e) => tracing::warn!(error = %e, "cannot listen for Ctrl-C"),
        }
    });

    plugsite_server::serve(&ServerConfig::from_config(config), cancel).await?;
    Ok(Outcome::Completed)
}
