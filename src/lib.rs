//! # Trino Release Diff
//!
//! Compares two Trino releases by scraping the release notes of every
//! release in between, caching the aggregate, and attributing each change
//! to a connector.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────┐   ┌──────────────┐   ┌───────────┐
//! │ Release page │──▶│   Extract    │──▶│  SQLite   │
//! │  (per ver.)  │   │ + Classify   │   │  cache    │
//! └──────────────┘   └──────────────┘   └─────┬─────┘
//!                                             │
//!                         ┌───────────────────┤
//!                         ▼                   ▼
//!                    ┌──────────┐       ┌──────────┐
//!                    │   CLI    │       │   HTTP   │
//!                    │  (trd)   │       │  (JSON)  │
//!                    └──────────┘       └──────────┘
//! ```
//!
//! Parsing, classification, version arithmetic and the storage trait live
//! in the `trino-release-diff-core` crate. This crate adds the SQLite
//! backend, HTTP fetching, orchestration and the two front ends.
//!
//! ## Quick Start
//!
//! ```bash
//! trd init                  # create database, seed versions
//! trd compare 401 406       # breaking changes and new features
//! trd connector Hive        # recorded changes for one connector
//! trd serve                 # start HTTP server
//! ```
//!
//! ## Modules
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`config`] | TOML configuration parsing |
//! | [`logging`] | Tracing subscriber setup |
//! | [`db`] | Database connection |
//! | [`migrate`] | Schema migrations and version seeding |
//! | [`sqlite_store`] | SQLite implementation of the store trait |
//! | [`fetch`] | Release-note retrieval |
//! | [`compare`] | Comparison orchestration with caching |
//! | [`connectors`] | Connector attribution and lookups |
//! | [`commands`] | CLI subcommand handlers |
//! | [`server`] | JSON HTTP server |

pub mod commands;
pub mod compare;
pub mod config;
pub mod connectors;
pub mod db;
pub mod fetch;
pub mod logging;
pub mod migrate;
pub mod server;
pub mod sqlite_store;
