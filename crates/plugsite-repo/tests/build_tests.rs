// SPDX-FileCopyrightText: 2026 Plugsite Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Integration tests for repository builds against a fake marketplace.

use std::path::Path;
use std::time::Duration;

use plugsite_catalog::{CatalogClient, CatalogEndpoints};
use plugsite_core::{ErrorKind, LocalPluginDescriptor, PluginId};
use plugsite_repo::{ArtifactFetcher, BuildRequest, RepositoryBuilder, MANIFEST_FILE_NAME};
use plugsite_test_utils::fixtures::{plugin_record, remote_release};
use plugsite_test_utils::{CatalogFixture, MockCatalog};

fn fetcher() -> ArtifactFetcher {
    ArtifactFetcher::new(Duration::from_secs(5)).unwrap()
}

fn http_builder(fixture: &CatalogFixture) -> RepositoryBuilder<CatalogClient> {
    let client = CatalogClient::new(
        CatalogEndpoints::single_base(&fixture.base_url()),
        Duration::from_secs(2),
    )
    .unwrap();
    RepositoryBuilder::new(client, fetcher())
}

fn request(output_dir: &Path, remote: &[&str], local: Vec<LocalPluginDescriptor>) -> BuildRequest {
    BuildRequest {
        server_url: "http://repo.internal:3000/".to_string(),
        remote_ids: remote.iter().map(|id| PluginId::from(*id)).collect(),
        local_plugins: local,
        output_dir: output_dir.to_path_buf(),
        keep_going: false,
    }
}

fn local_foo(file: &Path) -> LocalPluginDescriptor {
    LocalPluginDescriptor {
        id: "local.foo".to_string(),
        version: "1.0".to_string(),
        since: "203".to_string(),
        until: "241.*".to_string(),
        file: file.to_path_buf(),
        name: "Foo".to_string(),
        vendor: "Acme".to_string(),
        vendor_email: "dev@acme.example".to_string(),
        vendor_url: "https://acme.example".to_string(),
        description: "Local build of foo".to_string(),
    }
}

/// Remote "42" with two releases plus one local plugin produces both
/// artifacts and a manifest keyed by xmlId and local id.
#[tokio::test]
async fn remote_and_local_plugins_build_full_repository() {
    let fixture = CatalogFixture::start().await;
    fixture
        .mount_plugin(
            "42",
            &plugin_record(42, "com.acme.remote", "Remote"),
            &[
                remote_release(1, "1.0", "42/1/remote-1.0.zip"),
                remote_release(2, "1.5", "42/2/remote-1.5.zip"),
            ],
        )
        .await;
    fixture.mount_artifact("42/2/remote-1.5.zip", b"remote-1.5", 1).await;
    fixture.mount_artifact("42/1/remote-1.0.zip", b"remote-1.0", 0).await;

    let work = tempfile::tempdir().unwrap();
    let jar = work.path().join("foo.jar");
    std::fs::write(&jar, b"local-jar").unwrap();
    let out = work.path().join("out");

    let report = http_builder(&fixture)
        .build(&request(&out, &["42"], vec![local_foo(&jar)]))
        .await
        .unwrap();

    assert_eq!(report.plugins, 2);
    assert_eq!(report.downloaded, 1);
    assert_eq!(report.copied, 1);
    assert!(!report.is_partial());
    assert_eq!(report.manifest_path, out.join(MANIFEST_FILE_NAME));

    assert_eq!(std::fs::read(out.join("files/42/2/remote-1.5.zip")).unwrap(), b"remote-1.5");
    assert_eq!(std::fs::read(out.join("files/foo.jar")).unwrap(), b"local-jar");

    let xml = std::fs::read_to_string(out.join(MANIFEST_FILE_NAME)).unwrap();
    assert_eq!(xml.matches("<plugin ").count(), 2);
    assert!(xml.contains(
        "<plugin id=\"com.acme.remote\" url=\"http://repo.internal:3000/files/42/2/remote-1.5.zip\" version=\"1.5\">"
    ));
    assert!(xml.contains(
        "<plugin id=\"local.foo\" url=\"http://repo.internal:3000/files/foo.jar\" version=\"1.0\">"
    ));
    assert!(xml.contains("<vendor email=\"dev@acme.example\" url=\"https://acme.example\"> Acme </vendor>"));
}

/// An existing manifest stops the build before any catalog traffic.
#[tokio::test]
async fn existing_manifest_fails_before_network() {
    let fixture = CatalogFixture::start().await;
    fixture.expect_no_requests().await;

    let out = tempfile::tempdir().unwrap();
    std::fs::write(out.path().join(MANIFEST_FILE_NAME), "<plugins/>").unwrap();

    let err = http_builder(&fixture)
        .build(&request(out.path(), &["42"], Vec::new()))
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::ManifestAlreadyExists);
    assert_eq!(
        std::fs::read_to_string(out.path().join(MANIFEST_FILE_NAME)).unwrap(),
        "<plugins/>"
    );
}

#[tokio::test]
async fn existing_manifest_checked_before_mock_catalog() {
    let catalog = MockCatalog::new("http://127.0.0.1:9/files");
    let out = tempfile::tempdir().unwrap();
    std::fs::write(out.path().join(MANIFEST_FILE_NAME), "").unwrap();

    let builder = RepositoryBuilder::new(catalog, fetcher());
    let err = builder
        .build(&request(out.path(), &["42"], Vec::new()))
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::ManifestAlreadyExists);
    assert_eq!(builder.catalog().total_calls(), 0);
}

/// An output directory that cannot be inspected is reported, not treated as empty.
#[tokio::test]
async fn uninspectable_output_dir_fails_before_catalog() {
    let work = tempfile::tempdir().unwrap();
    let out = work.path().join("out");
    std::fs::write(&out, b"a file, not a directory").unwrap();

    let builder = RepositoryBuilder::new(MockCatalog::new("http://127.0.0.1:9/files"), fetcher());
    let err = builder
        .build(&request(&out, &["42"], Vec::new()))
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::ManifestWriteFailed);
    assert_eq!(builder.catalog().total_calls(), 0);
}

#[tokio::test]
async fn empty_plugin_lists_are_a_config_error() {
    let builder = RepositoryBuilder::new(MockCatalog::new("http://127.0.0.1:9/files"), fetcher());
    let out = tempfile::tempdir().unwrap();

    let err = builder
        .build(&request(out.path(), &[], Vec::new()))
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Config);
    assert!(!out.path().join(MANIFEST_FILE_NAME).exists());
}

/// Fail-fast: the second plugin is never requested and no manifest appears.
#[tokio::test]
async fn first_failure_aborts_without_manifest() {
    let fixture = CatalogFixture::start().await;
    let catalog = MockCatalog::new(fixture.download_url()).with_plugin(
        "2",
        plugin_record(2, "com.acme.two", "Two"),
        vec![remote_release(20, "1.0", "2/20/two.zip")],
    );
    let out = tempfile::tempdir().unwrap();

    let builder = RepositoryBuilder::new(catalog, fetcher());
    let err = builder
        .build(&request(out.path(), &["1", "2"], Vec::new()))
        .await
        .unwrap_err();

    assert_eq!(err.kind(), ErrorKind::CatalogUnavailable);
    assert_eq!(builder.catalog().metadata_calls(), 1);
    assert!(!out.path().join(MANIFEST_FILE_NAME).exists());
}

/// Keep-going records the failure and publishes the remaining plugins.
#[tokio::test]
async fn keep_going_writes_manifest_for_successes() {
    let fixture = CatalogFixture::start().await;
    fixture.mount_artifact("2/20/two.zip", b"two", 1).await;
    let catalog = MockCatalog::new(fixture.download_url()).with_plugin(
        "2",
        plugin_record(2, "com.acme.two", "Two"),
        vec![remote_release(20, "1.0", "2/20/two.zip")],
    );
    let out = tempfile::tempdir().unwrap();
    let mut req = request(out.path(), &["1", "2"], Vec::new());
    req.keep_going = true;

    let report = RepositoryBuilder::new(catalog, fetcher())
        .build(&req)
        .await
        .unwrap();

    assert!(report.is_partial());
    assert_eq!(report.failures.len(), 1);
    assert_eq!(report.failures[0].0, PluginId::from("1"));
    assert_eq!(report.failures[0].1.kind(), ErrorKind::CatalogUnavailable);
    assert_eq!(report.plugins, 1);

    let xml = std::fs::read_to_string(out.path().join(MANIFEST_FILE_NAME)).unwrap();
    assert!(xml.contains("id=\"com.acme.two\""));
}

#[tokio::test]
async fn keep_going_with_every_plugin_failing_returns_first_error() {
    let catalog = MockCatalog::new("http://127.0.0.1:9/files");
    let out = tempfile::tempdir().unwrap();
    let mut req = request(
        out.path(),
        &["1"],
        vec![local_foo(&out.path().join("missing.jar"))],
    );
    req.keep_going = true;

    let err = RepositoryBuilder::new(catalog, fetcher())
        .build(&req)
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::CatalogUnavailable);
    assert!(!out.path().join(MANIFEST_FILE_NAME).exists());
}

/// A local plugin with the same id as a remote one replaces it.
#[tokio::test]
async fn local_plugin_overrides_remote_plugin() {
    let fixture = CatalogFixture::start().await;
    fixture.mount_artifact("42/2/remote.zip", b"remote", 1).await;
    let catalog = MockCatalog::new(fixture.download_url()).with_plugin(
        "42",
        plugin_record(42, "local.foo", "Remote Foo"),
        vec![remote_release(2, "2.0", "42/2/remote.zip")],
    );

    let work = tempfile::tempdir().unwrap();
    let jar = work.path().join("foo.jar");
    std::fs::write(&jar, b"jar").unwrap();
    let out = work.path().join("out");

    let report = RepositoryBuilder::new(catalog, fetcher())
        .build(&request(&out, &["42"], vec![local_foo(&jar)]))
        .await
        .unwrap();

    assert_eq!(report.plugins, 1);
    assert_eq!(report.overridden, vec![PluginId::from("local.foo")]);
    let xml = std::fs::read_to_string(out.join(MANIFEST_FILE_NAME)).unwrap();
    assert_eq!(xml.matches("<plugin ").count(), 1);
    assert!(xml.contains("url=\"http://repo.internal:3000/files/foo.jar\" version=\"1.0\""));
}

/// A second build into the same tree reuses downloads once the manifest is removed.
#[tokio::test]
async fn rebuild_reuses_downloaded_artifacts() {
    let fixture = CatalogFixture::start().await;
    fixture.mount_artifact("7/70/seven.zip", b"seven", 1).await;
    let catalog = MockCatalog::new(fixture.download_url()).with_plugin(
        "7",
        plugin_record(7, "com.acme.seven", "Seven"),
        vec![remote_release(70, "3.0", "7/70/seven.zip")],
    );
    let out = tempfile::tempdir().unwrap();
    let builder = RepositoryBuilder::new(catalog, fetcher());
    let req = request(out.path(), &["7"], Vec::new());

    let first = builder.build(&req).await.unwrap();
    assert_eq!(first.downloaded, 1);

    std::fs::remove_file(&first.manifest_path).unwrap();
    let second = builder.build(&req).await.unwrap();
    assert_eq!(second.downloaded, 0);
    assert_eq!(second.reused, 1);
}

#[tokio::test]
async fn missing_local_archive_fails_build() {
    let catalog = MockCatalog::new("http://127.0.0.1:9/files");
    let out = tempfile::tempdir().unwrap();

    let err = RepositoryBuilder::new(catalog, fetcher())
        .build(&request(
            out.path(),
            &[],
            vec![local_foo(&out.path().join("nope.jar"))],
        ))
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::LocalArtifactMissing);
    assert!(!out.path().join(MANIFEST_FILE_NAME).exists());
}

fn local_plugin(id: &str, file: &Path) -> LocalPluginDescriptor {
    LocalPluginDescriptor {
        id: id.to_string(),
        version: "1.0".to_string(),
        file: file.to_path_buf(),
        ..Default::default()
    }
}

/// Two local plugins whose archives share a file name cannot both be
/// published under files/.
#[tokio::test]
async fn local_plugins_with_same_file_name_collide() {
    let work = tempfile::tempdir().unwrap();
    for (sub, body) in [("a", "PLUGIN-A"), ("b", "PLUGIN-B")] {
        std::fs::create_dir_all(work.path().join(sub)).unwrap();
        std::fs::write(work.path().join(sub).join("plugin.jar"), body).unwrap();
    }
    let out = work.path().join("out");
    let req = request(
        &out,
        &[],
        vec![
            local_plugin("com.a", &work.path().join("a/plugin.jar")),
            local_plugin("com.b", &work.path().join("b/plugin.jar")),
        ],
    );

    let err = RepositoryBuilder::new(MockCatalog::new("http://127.0.0.1:9/files"), fetcher())
        .build(&req)
        .await
        .unwrap_err();

    assert_eq!(err.kind(), ErrorKind::DownloadFailed);
    assert!(err.to_string().contains("com.a"), "{err}");
    assert_eq!(std::fs::read_to_string(out.join("files/plugin.jar")).unwrap(), "PLUGIN-A");
    assert!(!out.join(MANIFEST_FILE_NAME).exists());
}

/// A local archive named like another plugin's top-level catalog file is
/// skipped in keep-going mode and the remote artifact stays intact.
#[tokio::test]
async fn local_archive_cannot_replace_remote_artifact_of_other_plugin() {
    let fixture = CatalogFixture::start().await;
    fixture.mount_artifact("plugin.jar", b"REMOTE", 1).await;
    let catalog = MockCatalog::new(fixture.download_url()).with_plugin(
        "5",
        plugin_record(5, "com.remote", "Remote"),
        vec![remote_release(50, "1.0", "plugin.jar")],
    );

    let work = tempfile::tempdir().unwrap();
    std::fs::write(work.path().join("plugin.jar"), b"LOCAL").unwrap();
    let out = work.path().join("out");
    let mut req = request(
        &out,
        &["5"],
        vec![local_plugin("com.local", &work.path().join("plugin.jar"))],
    );
    req.keep_going = true;

    let report = RepositoryBuilder::new(catalog, fetcher())
        .build(&req)
        .await
        .unwrap();

    assert_eq!(report.plugins, 1);
    assert_eq!(report.failures.len(), 1);
    assert_eq!(report.failures[0].0, PluginId::from("com.local"));
    assert_eq!(report.failures[0].1.kind(), ErrorKind::DownloadFailed);
    assert_eq!(std::fs::read(out.join("files/plugin.jar")).unwrap(), b"REMOTE");

    let xml = std::fs::read_to_string(out.join(MANIFEST_FILE_NAME)).unwrap();
    assert!(xml.contains("id=\"com.remote\""));
    assert!(!xml.contains("id=\"com.local\""));
}
