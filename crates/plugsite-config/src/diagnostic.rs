// SPDX-FileCopyrightText: 2026 Plugsite Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration diagnostics.
//!
//! Figment extraction errors become miette reports. Unknown keys carry a
//! label pointing into the file and a "did you mean" hint picked by
//! Jaro-Winkler similarity.

#![allow(unused_assignments)] // miette's Diagnostic derive generates code triggering this lint

use std::path::PathBuf;

use miette::{Diagnostic, NamedSource, SourceSpan};
use plugsite_core::ErrorKind;
use thiserror::Error;

/// Similarity a known key needs before it is offered as a correction.
const SUGGESTION_THRESHOLD: f64 = 0.75;

/// One problem found while loading or validating the configuration.
#[derive(Debug, Error, Diagnostic)]
pub enum ConfigError {
    /// The configuration file could not be read.
    #[error("cannot read configuration file `{}`: {source}", .path.display())]
    #[diagnostic(
        code(plugsite::config::unreadable),
        help("create the file or pass another one with --config <path>")
    )]
    Unreadable {
        path: PathBuf,
        source: std::io::Error,
    },

    /// A key that no config struct declares.
    #[error("unknown configuration key `{key}`")]
    #[diagnostic(
        code(plugsite::config::unknown_key),
        help("{}", format_unknown_key_help(suggestion.as_deref(), valid_keys))
    )]
    UnknownKey {
        key: String,
        /// Closest declared key, if any is similar enough.
        suggestion: Option<String>,
        /// Declared keys of the enclosing section, comma separated.
        valid_keys: String,
        #[label("this key is not recognized")]
        span: Option<SourceSpan>,
        #[source_code]
        src: Option<NamedSource<String>>,
    },

    /// A value of the wrong type, e.g. `port: [80]`.
    #[error("invalid type for key `{key}`: {detail}")]
    #[diagnostic(code(plugsite::config::invalid_type), help("expected {expected}"))]
    InvalidType {
        key: String,
        detail: String,
        expected: String,
    },

    #[error("missing required key `{key}`")]
    #[diagnostic(code(plugsite::config::missing_key))]
    MissingKey { key: String },

    /// A well-typed value that fails a semantic check.
    #[error("validation error: {message}")]
    #[diagnostic(code(plugsite::config::validation))]
    Validation { message: String },

    #[error("configuration error: {0}")]
    #[diagnostic(code(plugsite::config::other))]
    Other(String),
}

impl ConfigError {
    /// Pipeline error classification of this diagnostic.
    pub fn kind(&self) -> ErrorKind {
        match self {
            ConfigError::Unreadable { .. } => ErrorKind::ConfigUnreadable,
            _ => ErrorKind::Config,
        }
    }
}

fn format_unknown_key_help(suggestion: Option<&str>, valid_keys: &str) -> String {
    match suggestion {
        Some(s) => format!("did you mean `{s}`? known keys: {valid_keys}"),
        None => format!("known keys: {valid_keys}"),
    }
}

/// Splits a figment error into one `ConfigError` per underlying problem.
///
/// `source` is `(file name, file content)`; with it, unknown keys are
/// labelled in place.
pub fn figment_to_config_errors(
    err: figment::Error,
    source: Option<(&str, &str)>,
) -> Vec<ConfigError> {
    use figment::error::Kind;

    err.into_iter()
        .map(|error| {
            let key_path: Vec<String> = error.path.iter().map(|s| s.to_string()).collect();
            match &error.kind {
                Kind::UnknownField(field, expected) => {
                    let (span, src) = locate_key(source, &key_path, field);
                    ConfigError::UnknownKey {
                        key: field.clone(),
                        suggestion: suggest_key(field, expected),
                        valid_keys: expected.join(", "),
                        span,
                        src,
                    }
                }
                Kind::MissingField(field) => ConfigError::MissingKey {
                    key: field.to_string(),
                },
                Kind::InvalidType(actual, expected) => ConfigError::InvalidType {
                    key: key_path.join("."),
                    detail: format!("found {actual}, expected {expected}"),
                    expected: expected.clone(),
                },
                _ => ConfigError::Other(error.to_string()),
            }
        })
        .collect()
}

/// Label span and named source for `field`, when the source text is known
/// and the key can be found in it.
fn locate_key(
    source: Option<(&str, &str)>,
    key_path: &[String],
    field: &str,
) -> (Option<SourceSpan>, Option<NamedSource<String>>) {
    let Some((name, content)) = source else {
        return (None, None);
    };
    match find_key_offset(content, key_path, field) {
        Some(offset) => (
            Some(SourceSpan::new(offset.into(), field.len())),
            Some(NamedSource::new(name, content.to_string())),
        ),
        None => (None, None),
    }
}

/// Byte offset of `field` in YAML or TOML `content`.
///
/// With a non-empty `path` the search starts after the section header
/// (`[catalog]` in TOML, `catalog:` in YAML). List items (`- id: x`) are
/// matched on the key after the dash.
pub fn find_key_offset(content: &str, path: &[String], field: &str) -> Option<usize> {
    let start = match path.first() {
        None => 0,
        Some(section) => section_body_start(content, section)?,
    };

    let mut offset = start;
    for line in content[start..].split_inclusive('\n') {
        let body = line.trim_start();
        let key = body.strip_prefix("- ").unwrap_or(body);
        if key
            .strip_prefix(field)
            .is_some_and(|rest| rest.starts_with([' ', '=', ':', '\t']))
        {
            return Some(offset + line.len() - key.len());
        }
        offset += line.len();
    }
    None
}

fn section_body_start(content: &str, section: &str) -> Option<usize> {
    [format!("[{section}]"), format!("{section}:")]
        .iter()
        .find_map(|header| content.find(header.as_str()).map(|pos| pos + header.len()))
}

/// Closest valid key by Jaro-Winkler similarity, if any clears the threshold.
pub fn suggest_key(unknown: &str, valid_keys: &[&str]) -> Option<String> {
    valid_keys
        .iter()
        .map(|key| (strsim::jaro_winkler(unknown, key), *key))
        .filter(|(score, _)| *score > SUGGESTION_THRESHOLD)
        .max_by(|a, b| a.0.total_cmp(&b.0))
        .map(|(_, key)| key.to_string())
}

/// Prints each error to stderr as a miette graphical report.
pub fn render_errors(errors: &[ConfigError]) {
    use miette::GraphicalReportHandler;

    let handler = GraphicalReportHandler::new();
    for error in errors {
        let mut buf = String::new();
        let diagnostic: &dyn Diagnostic = error;
        if handler.render_report(&mut buf, diagnostic).is_ok() {
            eprint!("{buf}");
        } else {
            eprintln!("Error: {error}");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn suggest_server_url_for_typo() {
        let valid = &["serverUrl", "bindIp", "port", "dir"];
        assert_eq!(suggest_key("serverURL", valid), Some("serverUrl".to_string()));
    }

    #[test]
    fn suggest_local_plugins_for_typo() {
        let valid = &["plugins", "localPlugins", "catalog"];
        assert_eq!(
            suggest_key("localPlugin", valid),
            Some("localPlugins".to_string())
        );
    }

    #[test]
    fn no_suggestion_for_distant_typo() {
        let valid = &["serverUrl", "bindIp", "port"];
        assert_eq!(suggest_key("zzzzzz", valid), None);
    }

    #[test]
    fn find_key_offset_in_yaml_section() {
        let content = "dir: out\ncatalog:\n  timout: 5\n";
        let path = vec!["catalog".to_string()];
        let o = find_key_offset(content, &path, "timout").unwrap();
        assert_eq!(&content[o..o + 6], "timout");
    }

    #[test]
    fn find_key_offset_in_toml_section() {
        let content = "dir = \"out\"\n[catalog]\ntimout = 5\n";
        let path = vec!["catalog".to_string()];
        let o = find_key_offset(content, &path, "timout").unwrap();
        assert_eq!(&content[o..o + 6], "timout");
    }

    #[test]
    fn find_top_level_key_offset() {
        let content = "serverUrl: http://x\nprot: 80\n";
        let o = find_key_offset(content, &[], "prot").unwrap();
        assert_eq!(&content[o..o + 4], "prot");
    }

    #[test]
    fn find_key_offset_in_yaml_list_item() {
        let content = "localPlugins:\n  - vendorMail: a@b.c\n    id: x\n";
        let path = vec!["localPlugins".to_string(), "0".to_string()];
        let o = find_key_offset(content, &path, "vendorMail").unwrap();
        assert_eq!(&content[o..o + 10], "vendorMail");
    }

    #[test]
    fn unknown_section_key_is_not_located() {
        let content = "dir: out\n";
        assert_eq!(find_key_offset(content, &["catalog".to_string()], "x"), None);
    }

    #[test]
    fn unreadable_maps_to_config_unreadable_kind() {
        let err = ConfigError::Unreadable {
            path: PathBuf::from("missing.yaml"),
            source: std::io::Error::from(std::io::ErrorKind::NotFound),
        };
        assert_eq!(err.kind(), ErrorKind::ConfigUnreadable);
        assert_eq!(
            ConfigError::Validation { message: "x".into() }.kind(),
            ErrorKind::Config
        );
    }
}
