//! The narrow capability the reconciliation engine needs from a DNS backend.
use async_trait::async_trait;
use thiserror::Error;

use crate::powerdns::types::{PdnsZone, ZonePatch};

#[derive(Debug, Error)]
pub enum BackendError {
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("API request failed with status {status}: {body}")]
    UnexpectedStatus { status: u16, body: String },

    #[error("failed to parse response: {0}")]
    Decode(#[from] serde_json::Error),
}

/// Zone lookup and mutation as seen by the engine.
///
/// Zone identifiers passed in are canonical (trailing dot).
#[async_trait]
pub trait ZoneBackend: Send + Sync {
    /// `Ok(None)` means the zone does not exist.
    async fn get_zone(&self, zone_id: &str) -> Result<Option<PdnsZone>, BackendError>;

    async fn create_zone(&self, zone: &PdnsZone) -> Result<PdnsZone, BackendError>;

    /// Applies every change in `patch` as one batch.
    async fn patch_zone(&self, zone_id: &str, patch: &ZonePatch) -> Result<(), BackendError>;
}
