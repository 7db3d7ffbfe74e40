// SPDX-FileCopyrightText: 2026 Plugsite Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `updatePlugins.xml` rendering.
//!
//! The layout (tab indentation, padded vendor text and CDATA block) is what
//! IDE clients and existing deployments already consume, so output is
//! produced by hand rather than through a generic XML serializer.

use std::fmt::Write as _;

use plugsite_core::{ResolvedPluginEntry, VendorInfo};

use crate::merge::MergedCollection;

/// Manifest file name at the repository root.
pub const MANIFEST_FILE_NAME: &str = "updatePlugins.xml";

/// Sub-directory holding plugin archives.
pub const DOWNLOAD_DIR: &str = "files";

/// Renders the manifest for `entries`.
///
/// Each plugin's download URL is `{base_url}/{download_subdir}/{file}`; a
/// trailing `/` on `base_url` is dropped first.
pub fn render(entries: &MergedCollection, base_url: &str, download_subdir: &str) -> String {
    let base = base_url.trim_end_matches('/');
    let mut out = String::from("<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n<plugins>\n");
    for entry in entries.iter() {
        render_plugin(&mut out, entry, base, download_subdir);
    }
    out.push_str("</plugins>\n");
    out
}

fn render_plugin(out: &mut String, entry: &ResolvedPluginEntry, base: &str, subdir: &str) {
    let release = &entry.release;
    let url = format!("{base}/{subdir}/{}", release.file);

    // Writing into a String cannot fail.
    let _ = writeln!(
        out,
        "\t<plugin id=\"{}\" url=\"{}\" version=\"{}\">",
        escape(entry.id.as_str()),
        escape(&url),
        escape(&release.version)
    );

    if let Some(name) = &entry.name {
        let _ = writeln!(out, "\t\t<name>{}</name>", escape(name));
    }

    if let Some(vendor) = &entry.vendor {
        render_vendor(out, vendor);
    }

    if let Some(description) = &entry.description {
        let _ = writeln!(
            out,
            "\t\t<description><![CDATA[ {} ]]></description>",
            cdata_safe(description)
        );
    }

    let _ = writeln!(
        out,
        "\t\t<idea-version since-build=\"{}\" until-build=\"{}\" />",
        escape(&release.since),
        escape(&release.until)
    );
    out.push_str("\t</plugin>\n");
}

fn render_vendor(out: &mut String, vendor: &VendorInfo) {
    let _ = writeln!(
        out,
        "\t\t<vendor email=\"{}\" url=\"{}\"> {} </vendor>",
        escape(&vendor.email),
        escape(&vendor.url),
        escape(&vendor.name)
    );
}

/// Escapes `& < > "` for use in attribute values and element text.
fn escape(s: &str) -> String {
    let mut escaped = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

/// Splits any `]]>` so it cannot close the surrounding CDATA section.
fn cdata_safe(s: &str) -> String {
    s.replace("]]>", "]]]]><![CDATA[>")
}
