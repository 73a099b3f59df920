//! Squadboard - caching data access for a team-management dashboard.
//!
//! The crate centers on a read-through [`cache::Cache`] with per-category
//! TTLs, single-flight fetch deduplication, stale-while-revalidate, and
//! pattern-based invalidation, plus the [`service::DataService`] that
//! feeds it with remote reads and purges it on writes.

pub mod api;
pub mod cache;
pub mod config;
pub mod models;
pub mod service;
