// SPDX-FileCopyrightText: 2026 Plugsite Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Remote plugin catalog access.
//!
//! [`CatalogClient`] talks to the marketplace's plugin-detail and
//! release-listing endpoints; [`resolve_latest`] picks the release that
//! gets published for each plugin.

pub mod client;
pub mod resolver;

pub use client::{CatalogClient, CatalogEndpoints, RELEASE_PAGE_SIZE};
pub use resolver::resolve_latest;
