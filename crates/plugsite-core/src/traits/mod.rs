// SPDX-FileCopyrightText: 2026 Plugsite Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Trait seams of the build pipeline.
//!
//! Traits use `#[async_trait]`; the builder is generic over its catalog so
//! tests can swap in an in-memory implementation.

pub mod catalog;

pub use catalog::CatalogSource;
