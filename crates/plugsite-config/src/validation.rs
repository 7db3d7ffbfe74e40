// SPDX-FileCopyrightText: 2026 Plugsite Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Semantic checks that run after deserialization.

use std::collections::{HashMap, HashSet};
use std::net::IpAddr;

use crate::diagnostic::ConfigError;
use crate::model::PlugsiteConfig;

/// Checks every semantic constraint and reports all violations at once.
pub fn validate_config(config: &PlugsiteConfig) -> Result<(), Vec<ConfigError>> {
    let mut problems: Vec<String> = Vec::new();

    for (key, value) in [
        ("serverUrl", &config.server_url),
        ("catalog.pluginsUrl", &config.catalog.plugins_url),
        ("catalog.releasesUrl", &config.catalog.releases_url),
        ("catalog.downloadUrl", &config.catalog.download_url),
    ] {
        problems.extend(http_url_problem(key, value));
    }

    problems.extend(bind_ip_problem(config.bind_ip.trim()));

    if config.port == 0 {
        problems.push("port must be between 1 and 65535".to_string());
    }
    if config.dir.as_os_str().is_empty() {
        problems.push("dir must not be empty".to_string());
    }
    if config.catalog.timeout_secs == 0 {
        problems.push("catalog.timeoutSecs must be greater than 0".to_string());
    }
    if config.catalog.download_timeout_secs == 0 {
        problems.push("catalog.downloadTimeoutSecs must be greater than 0".to_string());
    }

    for (i, id) in config.plugins.iter().enumerate() {
        if id.trim().is_empty() {
            problems.push(format!("plugins[{i}] must not be empty"));
        }
    }

    let mut seen_ids = HashSet::new();
    let mut seen_files: HashMap<String, &str> = HashMap::new();
    for (i, plugin) in config.local_plugins.iter().enumerate() {
        if plugin.id.trim().is_empty() {
            problems.push(format!("localPlugins[{i}].id must not be empty"));
        } else if !seen_ids.insert(plugin.id.as_str()) {
            problems.push(format!("duplicate local plugin id `{}` in localPlugins", plugin.id));
        }
        if plugin.version.trim().is_empty() {
            problems.push(format!("localPlugins[{i}].version must not be empty"));
        }
        match plugin.artifact_file_name() {
            None => problems.push(format!(
                "localPlugins[{i}].file must name an archive file, got `{}`",
                plugin.file.display()
            )),
            // Local archives are published flat under files/, keyed by name.
            Some(name) => {
                if let Some(other) = seen_files.insert(name.clone(), plugin.id.as_str()) {
                    problems.push(format!(
                        "localPlugins[{i}].file `{name}` is also published by local plugin `{other}`"
                    ));
                }
            }
        }
    }

    if problems.is_empty() {
        Ok(())
    } else {
        Err(problems
            .into_iter()
            .map(|message| ConfigError::Validation { message })
            .collect())
    }
}

fn http_url_problem(key: &str, value: &str) -> Option<String> {
    let value = value.trim();
    if value.is_empty() {
        Some(format!("{key} must not be empty"))
    } else if !(value.starts_with("http://") || value.starts_with("https://")) {
        Some(format!("{key} `{value}` must be an http:// or https:// URL"))
    } else {
        None
    }
}

/// Accepts IP literals and plain hostnames.
fn bind_ip_problem(addr: &str) -> Option<String> {
    if addr.is_empty() {
        return Some("bindIp must not be empty".to_string());
    }
    let hostname_like = addr
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | ':'));
    if addr.parse::<IpAddr>().is_ok() || hostname_like {
        None
    } else {
        Some(format!("bindIp `{addr}` is not a valid IP address or hostname"))
    }
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use plugsite_core::LocalPluginDescriptor;

    use super::*;

    fn local(id: &str, file: &str) -> LocalPluginDescriptor {
        LocalPluginDescriptor {
            id: id.to_string(),
            version: "1.0".to_string(),
            file: PathBuf::from(file),
            ..Default::default()
        }
    }

    fn has_message(errors: &[ConfigError], needle: &str) -> bool {
        errors
            .iter()
            .any(|e| matches!(e, ConfigError::Validation { message } if message.contains(needle)))
    }

    #[test]
    fn default_config_validates() {
        let config = PlugsiteConfig::default();
        assert!(validate_config(&config).is_ok());
    }

    #[test]
    fn empty_server_url_fails_validation() {
        let mut config = PlugsiteConfig::default();
        config.server_url = "".to_string();
        let errors = validate_config(&config).unwrap_err();
        assert!(has_message(&errors, "serverUrl"));
    }

    #[test]
    fn non_http_catalog_url_fails_validation() {
        let mut config = PlugsiteConfig::default();
        config.catalog.download_url = "ftp://mirror/files".to_string();
        let errors = validate_config(&config).unwrap_err();
        assert!(has_message(&errors, "catalog.downloadUrl"));
    }

    #[test]
    fn port_zero_fails_validation() {
        let mut config = PlugsiteConfig::default();
        config.port = 0;
        let errors = validate_config(&config).unwrap_err();
        assert!(has_message(&errors, "port"));
    }

    #[test]
    fn bad_bind_ip_fails_validation() {
        let mut config = PlugsiteConfig::default();
        config.bind_ip = "not an ip!".to_string();
        let errors = validate_config(&config).unwrap_err();
        assert!(has_message(&errors, "bindIp"));
    }

    #[test]
    fn zero_timeouts_fail_validation() {
        let mut config = PlugsiteConfig::default();
        config.catalog.timeout_secs = 0;
        config.catalog.download_timeout_secs = 0;
        let errors = validate_config(&config).unwrap_err();
        assert_eq!(errors.len(), 2);
    }

    #[test]
    fn local_plugin_without_id_or_file_fails_validation() {
        let mut config = PlugsiteConfig::default();
        config.local_plugins = vec![local("", "..")];
        let errors = validate_config(&config).unwrap_err();
        assert!(has_message(&errors, "localPlugins[0].id"));
        assert!(has_message(&errors, "localPlugins[0].file"));
    }

    #[test]
    fn duplicate_local_ids_fail_validation() {
        let mut config = PlugsiteConfig::default();
        config.local_plugins = vec![local("a", "a.jar"), local("a", "b.jar")];
        let errors = validate_config(&config).unwrap_err();
        assert!(has_message(&errors, "duplicate local plugin id `a`"));
    }

    #[test]
    fn local_plugins_sharing_a_file_name_fail_validation() {
        let mut config = PlugsiteConfig::default();
        config.local_plugins = vec![local("com.a", "a/plugin.jar"), local("com.b", "b/plugin.jar")];
        let errors = validate_config(&config).unwrap_err();
        assert_eq!(errors.len(), 1);
        assert!(has_message(&errors, "`plugin.jar` is also published by local plugin `com.a`"));
    }

    #[test]
    fn blank_remote_id_fails_validation() {
        let mut config = PlugsiteConfig::default();
        config.plugins = vec!["42".to_string(), " ".to_string()];
        let errors = validate_config(&config).unwrap_err();
        assert!(has_message(&errors, "plugins[1]"));
    }

    #[test]
    fn local_plugins_deny_unknown_fields() {
        let toml_str = r#"
[[localPlugins]]
id = "a"
file = "a.jar"
vendorMail = "typo@example.com"
"#;
        assert!(toml::from_str::<PlugsiteConfig>(toml_str).is_err());
    }

    #[test]
    fn valid_custom_config_passes() {
        let mut config = PlugsiteConfig::default();
        config.server_url = "https://plugins.internal.example".to_string();
        config.bind_ip = "127.0.0.1".to_string();
        config.plugins = vec!["42".to_string()];
        config.local_plugins = vec![local("local.foo", "./foo.jar")];
        assert!(validate_config(&config).is_ok());
    }
}
