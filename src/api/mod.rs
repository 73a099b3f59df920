//! REST client for the remote data store.
//!
//! This module provides the `ApiClient` used by the data service to fetch
//! team, roster, match, and expense data. The store's query semantics live
//! server-side; the client only shapes requests and decodes JSON.
//!
//! Requests authenticate with a bearer API key.

pub mod client;
pub mod error;

pub use client::ApiClient;
pub use error::ApiError;
