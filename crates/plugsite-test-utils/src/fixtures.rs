// SPDX-FileCopyrightText: 2026 Plugsite Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Catalog fixtures.
//!
//! [`CatalogFixture`] runs a wiremock server laid out like the marketplace
//! with every endpoint on one base URL: `/{id}` for metadata,
//! `/{id}/updates` for releases and `/files/{file}` for archives.

use plugsite_core::{PluginRecord, RemoteRelease};
use serde_json::{json, Value};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// A catalog metadata record.
pub fn plugin_record(id: u64, xml_id: &str, name: &str) -> PluginRecord {
    PluginRecord {
        id,
        name: name.to_string(),
        xml_id: xml_id.to_string(),
        description: format!("<p>{name} description</p>"),
    }
}

/// A release compatible with builds 203 through 241.*.
pub fn remote_release(id: u64, version: &str, file: &str) -> RemoteRelease {
    RemoteRelease {
        id,
        version: version.to_string(),
        since: "203".to_string(),
        until: "241.*".to_string(),
        file: file.to_string(),
    }
}

/// Metadata JSON as the marketplace returns it, extra fields included.
pub fn plugin_record_json(record: &PluginRecord) -> Value {
    json!({
        "id": record.id,
        "name": record.name,
        "xmlId": record.xml_id,
        "description": record.description,
        "downloads": 12345,
        "vendor": {"name": "ignored"}
    })
}

/// Release listing JSON.
pub fn releases_json(releases: &[RemoteRelease]) -> Value {
    Value::Array(
        releases
            .iter()
            .map(|r| {
                json!({
                    "id": r.id,
                    "version": r.version,
                    "since": r.since,
                    "until": r.until,
                    "file": r.file,
                    "channel": ""
                })
            })
            .collect(),
    )
}

/// A fake marketplace backed by wiremock.
///
/// Expectations set through `expected` arguments are verified when the
/// fixture is dropped.
pub struct CatalogFixture {
    server: MockServer,
}

impl CatalogFixture {
    pub async fn start() -> Self {
        Self {
            server: MockServer::start().await,
        }
    }

    /// Base URL serving all catalog endpoints.
    pub fn base_url(&self) -> String {
        self.server.uri()
    }

    /// Base URL for artifact downloads.
    pub fn download_url(&self) -> String {
        format!("{}/files", self.server.uri())
    }

    pub fn server(&self) -> &MockServer {
        &self.server
    }

    /// Serve metadata and releases for `id`.
    pub async fn mount_plugin(&self, id: &str, record: &PluginRecord, releases: &[RemoteRelease]) {
        Mock::given(method("GET"))
            .and(path(format!("/{id}")))
            .respond_with(ResponseTemplate::new(200).set_body_json(plugin_record_json(record)))
            .mount(&self.server)
            .await;

        Mock::given(method("GET"))
            .and(path(format!("/{id}/updates")))
            .respond_with(ResponseTemplate::new(200).set_body_json(releases_json(releases)))
            .mount(&self.server)
            .await;
    }

    /// Answer every request for `id` with `status`.
    pub async fn mount_failing_plugin(&self, id: &str, status: u16) {
        Mock::given(method("GET"))
            .and(path(format!("/{id}")))
            .respond_with(ResponseTemplate::new(status))
            .mount(&self.server)
            .await;
    }

    /// Serve `body` at `/files/{file}`, expecting exactly `expected` downloads.
    pub async fn mount_artifact(&self, file: &str, body: &[u8], expected: u64) {
        Mock::given(method("GET"))
            .and(path(format!("/files/{file}")))
            .respond_with(ResponseTemplate::new(200).set_body_bytes(body.to_vec()))
            .expect(expected)
            .mount(&self.server)
            .await;
    }

    /// Fail the test if the fixture receives any request at all.
    pub async fn expect_no_requests(&self) {
        Mock::given(wiremock::matchers::any())
            .respond_with(ResponseTemplate::new(500))
            .expect(0)
            .mount(&self.server)
            .await;
    }
}
