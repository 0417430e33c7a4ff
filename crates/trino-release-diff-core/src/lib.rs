//! # Trino Release Diff Core
//!
//! Shared, I/O-free logic for Trino Release Diff: data models, version
//! ordering, release-note extraction, connector classification, and the
//! store abstraction.
//!
//! This crate contains no tokio, sqlx, HTTP client, or filesystem
//! dependencies. Fetching, persistence, and serving live in the
//! `trino-release-diff` crate.

pub mod classify;
pub mod extract;
pub mod models;
pub mod store;
pub mod version;
