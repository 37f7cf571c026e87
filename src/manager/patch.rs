//! Sends a zone's changes as one batched PATCH.
use async_trait::async_trait;
use tracing::debug;

use crate::backend::ZoneBackend;
use crate::error::ZoneError;
use crate::powerdns::types::{PdnsRrset, ZonePatch};

/// Asks the operator before anything is changed.
///
/// Must not block the calling task while waiting for an answer.
#[async_trait]
pub trait Confirm: Send + Sync {
    async fn confirm(&self, prompt: &str) -> bool;
}

/// A fixed answer, handy for tests and non-interactive callers.
#[async_trait]
impl Confirm for bool {
    async fn confirm(&self, _prompt: &str) -> bool {
        *self
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ApplyOptions {
    pub dry_run: bool,
    pub auto_confirm: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PatchOutcome {
    NoChanges,
    DryRun,
    Applied,
}

pub async fn send_patch(
    backend: &dyn ZoneBackend,
    zone_id: &str,
    ops: Vec<PdnsRrset>,
    opts: ApplyOptions,
    confirm: Option<&dyn Confirm>,
) -> Result<PatchOutcome, ZoneError> {
    if ops.is_empty() {
        return Ok(PatchOutcome::NoChanges);
    }

    debug!("  Applying {} RRset change(s)...", ops.len());
    if opts.dry_run {
        return Ok(PatchOutcome::DryRun);
    }

    if !opts.auto_confirm {
        if let Some(confirm) = confirm {
            let prompt = format!("Apply {} change(s) to {zone_id}?", ops.len());
            if !confirm.confirm(&prompt).await {
                return Err(ZoneError::Aborted);
            }
        }
    }

    let patch = ZonePatch { rrsets: ops };
    backend
        .patch_zone(zone_id, &patch)
        .await
        .map_err(ZoneError::Patch)?;

    Ok(PatchOutcome::Applied)
}
