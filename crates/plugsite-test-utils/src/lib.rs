// SPDX-FileCopyrightText: 2026 Plugsite Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Test utilities for Plugsite integration tests.
//!
//! Provides an in-memory catalog and canned catalog responses for fast,
//! deterministic tests without the public marketplace.
//!
//! # Components
//!
//! - [`MockCatalog`] - in-memory [`CatalogSource`](plugsite_core::CatalogSource) with call counters
//! - [`fixtures`] - catalog JSON bodies and wiremock mounts for a fake marketplace

pub mod fixtures;
pub mod mock_catalog;

pub use fixtures::CatalogFixture;
pub use mock_catalog::MockCatalog;
