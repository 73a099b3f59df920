use std::sync::Arc;

use thiserror::Error;

/// Errors surfaced by the cache facade.
///
/// Clone-able so a single failed fetch can be fanned out to every caller
/// coalesced onto it.
#[derive(Debug, Clone, Error)]
pub enum CacheError {
    /// The supplied fetch closure failed. The original error travels
    /// unwrapped (shared through the Arc) so call sites can present
    /// domain-appropriate messages. Failures are never cached.
    #[error("{0}")]
    Fetch(Arc<anyhow::Error>),

    /// The in-flight fetch this caller was attached to was dropped before
    /// it settled. The next caller starts a fresh fetch.
    #[error("fetch for {key:?} was cancelled before it settled")]
    FetchCancelled { key: String },

    /// A value could not be serialized for storage.
    #[error("value for {key:?} could not be encoded: {reason}")]
    Encode {
        key: String,
        reason: Arc<serde_json::Error>,
    },

    /// A cached payload no longer decodes as the requested type.
    #[error("cached value for {key:?} could not be decoded: {reason}")]
    Decode {
        key: String,
        reason: Arc<serde_json::Error>,
    },
}

impl CacheError {
    pub(crate) fn fetch(error: anyhow::Error) -> Self {
        CacheError::Fetch(Arc::new(error))
    }

    pub(crate) fn decode(key: &str, error: serde_json::Error) -> Self {
        CacheError::Decode {
            key: key.to_string(),
            reason: Arc::new(error),
        }
    }
}
