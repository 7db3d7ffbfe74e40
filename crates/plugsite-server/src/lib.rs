// SPDX-FileCopyrightText: 2026 Plugsite Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Static file server for a built update repository.
//!
//! Serves the output directory read-only and byte-for-byte. There is no
//! directory listing; a directory request is answered with its
//! `index.html` if one exists.

use std::path::{Path, PathBuf};

use axum::Router;
use plugsite_config::PlugsiteConfig;
use plugsite_core::PlugsiteError;
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

/// Where and what to serve.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Address to bind.
    pub bind_ip: String,
    /// Port to bind.
    pub port: u16,
    /// Directory served at `/`.
    pub root: PathBuf,
}

impl ServerConfig {
    pub fn from_config(config: &PlugsiteConfig) -> Self {
        Self {
            bind_ip: config.bind_ip.clone(),
            port: config.port,
            root: config.dir.clone(),
        }
    }

    fn addr(&self) -> String {
        if self.bind_ip.contains(':') {
            format!("[{}]:{}", self.bind_ip, self.port)
        } else {
            format!("{}:{}", self.bind_ip, self.port)
        }
    }
}

/// Router serving `root` with request tracing.
pub fn router(root: &Path) -> Router {
    Router::new()
        .fallback_service(ServeDir::new(root))
        .layer(TraceLayer::new_for_http())
}

/// Bind the configured address and serve until `cancel` fires.
pub async fn serve(config: &ServerConfig, cancel: CancellationToken) -> Result<(), PlugsiteError> {
    check_root(&config.root).await?;

    let addr = config.addr();
    let listener = TcpListener::bind(&addr)
        .await
        .map_err(|e| PlugsiteError::Server {
            message: format!("failed to bind {addr}: {e}"),
            source: Some(Box::new(e)),
        })?;

    serve_on(listener, &config.root, cancel).await
}

/// Serve `root` on an already bound listener until `cancel` fires.
pub async fn serve_on(
    listener: TcpListener,
    root: &Path,
    cancel: CancellationToken,
) -> Result<(), PlugsiteError> {
    check_root(root).await?;

    let local = listener
        .local_addr()
        .map(|a| a.to_string())
        .unwrap_or_else(|_| "<unknown>".to_string());
    tracing::info!(addr = %local, root = %root.display(), "serving plugin repository");

    axum::serve(listener, router(root))
        .with_graceful_shutdown(cancel.cancelled_owned())
        .await
        .map_err(|e| PlugsiteError::Server {
            message: format!("server error: {e}"),
            source: Some(Box::new(e)),
        })?;

    tracing::info!("server stopped");
    Ok(())
}

async fn check_root(root: &Path) -> Result<(), PlugsiteError> {
    match tokio::fs::metadata(root).await {
        Ok(meta) if meta.is_dir() => Ok(()),
        Ok(_) => Err(PlugsiteError::Server {
            message: format!("{} is not a directory", root.display()),
            source: None,
        }),
        Err(e) => Err(PlugsiteError::Server {
            message: format!("cannot serve {}: {e}", root.display()),
            source: Some(Box::new(e)),
        }),
    }
}
