// SPDX-FileCopyrightText: 2026 Plugsite Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration system for Plugsite.
//!
//! Provides YAML/TOML configuration parsing with strict validation
//! (`deny_unknown_fields`), `PLUGSITE_*` environment variable overrides, and
//! miette diagnostic rendering with typo suggestions.
//!
//! # Usage
//!
//! ```no_run
//! use std::path::Path;
//!
//! let config = plugsite_config::load_and_validate(Path::new("config.yaml"))
//!     .expect("config errors");
//! println!("Serving {} on port {}", config.dir.display(), config.port);
//! ```

pub mod diagnostic;
pub mod loader;
pub mod model;
pub mod validation;

use std::path::Path;

pub use diagnostic::{render_errors, ConfigError};
pub use loader::{load_config_from_str, load_config_with_env, ConfigFormat, DEFAULT_CONFIG_FILE};
pub use model::PlugsiteConfig;

/// Read the config file at `path`, layer env overrides, and validate.
///
/// Unlike optional Figment file providers, a missing or unreadable file is
/// an error here: the operator named it explicitly (or relies on the
/// `config.yaml` default).
pub fn load_and_validate(path: &Path) -> Result<PlugsiteConfig, Vec<ConfigError>> {
    let content = std::fs::read_to_string(path).map_err(|source| {
        vec![ConfigError::Unreadable {
            path: path.to_path_buf(),
            source,
        }]
    })?;

    let format = ConfigFormat::from_path(path);
    tracing::debug!(path = %path.display(), ?format, "loading configuration");

    match loader::load_config_with_env(&content, format) {
        Ok(config) => {
            validation::validate_config(&config)?;
            Ok(config)
        }
        Err(err) => {
            let name = path.display().to_string();
            Err(diagnostic::figment_to_config_errors(err, Some((&name, &content))))
        }
    }
}

/// Load configuration from a string and validate it.
///
/// Useful for testing and explicit configuration.
pub fn load_and_validate_str(
    content: &str,
    format: ConfigFormat,
) -> Result<PlugsiteConfig, Vec<ConfigError>> {
    match loader::load_config_from_str(content, format) {
        Ok(config) => {
            validation::validate_config(&config)?;
            Ok(config)
        }
        Err(err) => Err(diagnostic::figment_to_config_errors(
            err,
            Some(("<inline>", content)),
        )),
    }
}
