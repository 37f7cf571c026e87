//! Reconciliation engine: fetch state, validate, diff, patch.
pub mod desired;
pub mod diff;
pub mod ownership;
pub mod patch;

use std::collections::HashMap;
use std::fmt;

use tracing::{Instrument, debug, error, info, info_span};

use crate::backend::ZoneBackend;
use crate::config::{Config, ZoneConfig, ZoneState, ZoneStates, canonical_zone_name};
use crate::error::{Error, ZoneError};
use crate::powerdns::types::PdnsZone;
use crate::report;
use crate::validation::validate;

use desired::{RrsetMap, build_desired, qualify_nameserver, rrset_key};
use diff::{diff, index_existing};
use ownership::is_managed;
pub use patch::{ApplyOptions, Confirm, PatchOutcome};

/// Counters for one run plus the zones that failed to apply.
#[derive(Debug, Default)]
pub struct ApplyResult {
    pub zones_created: usize,
    pub rrsets_created: usize,
    pub rrsets_updated: usize,
    pub rrsets_deleted: usize,
    pub errors: Vec<ZoneFailure>,
}

impl ApplyResult {
    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }

    /// At least one zone was skipped because the prompt was declined.
    pub fn was_aborted(&self) -> bool {
        self.errors.iter().any(|failure| failure.error.is_aborted())
    }
}

#[derive(Debug)]
pub struct ZoneFailure {
    pub zone: String,
    pub error: ZoneError,
}

impl fmt::Display for ZoneFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "zone {}: {}", self.zone, self.error)
    }
}

pub struct Manager<B> {
    backend: B,
    account_name: String,
    confirm: Option<Box<dyn Confirm>>,
}

impl<B: ZoneBackend> Manager<B> {
    pub fn new(backend: B, account_name: impl Into<String>) -> Self {
        Self {
            backend,
            account_name: account_name.into(),
            confirm: None,
        }
    }

    /// Ask `confirm` before each zone's patch unless auto-confirm is set.
    pub fn with_confirm(mut self, confirm: impl Confirm + 'static) -> Self {
        self.confirm = Some(Box::new(confirm));
        self
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn account_name(&self) -> &str {
        &self.account_name
    }

    /// One reconciliation pass.
    ///
    /// Every configured zone is fetched before anything is validated or
    /// changed; a fetch failure ends the run. Failures while applying a zone
    /// are collected in [`ApplyResult::errors`] and the next zone is processed.
    pub async fn apply(&self, config: &Config, opts: ApplyOptions) -> Result<ApplyResult, Error> {
        let span = info_span!("apply", dry_run = opts.dry_run);
        self.apply_inner(config, opts).instrument(span).await
    }

    async fn apply_inner(&self, config: &Config, opts: ApplyOptions) -> Result<ApplyResult, Error> {
        let (states, mut zones) = self.fetch_state(config).await?;

        info!("Validating configuration...");
        validate(config, &states)?;

        let mut result = ApplyResult::default();
        for (zone_name, zone) in &config.zones {
            let zone_id = canonical_zone_name(zone_name);
            let state = states.get(&zone_id).copied().unwrap_or_default();

            info!("Processing zone: {zone_name}");
            let existing = zones.remove(&zone_id);
            if let Err(err) = self
                .apply_zone(&zone_id, zone, state, existing, opts, &mut result)
                .await
            {
                error!(zone = %zone_name, "{err}");
                result.errors.push(ZoneFailure {
                    zone: zone_name.clone(),
                    error: err,
                });
            }
        }

        Ok(result)
    }

    async fn fetch_state(
        &self,
        config: &Config,
    ) -> Result<(ZoneStates, HashMap<String, PdnsZone>), Error> {
        info!("Fetching current state of {} zone(s)...", config.zones.len());

        let mut states = ZoneStates::new();
        let mut zones = HashMap::new();
        for zone_name in config.zones.keys() {
            let zone_id = canonical_zone_name(zone_name);
            info!("  Checking zone: {zone_id}");

            let zone = self
                .backend
                .get_zone(&zone_id)
                .await
                .map_err(|source| Error::Fetch {
                    zone: zone_name.clone(),
                    source,
                })?;

            match zone {
                Some(zone) => {
                    let state = ZoneState::from_zone(&zone, &self.account_name);
                    if state.is_managed {
                        info!("    Zone exists (managed)");
                    } else {
                        info!("    Zone exists (not managed, account={:?})", zone.account);
                    }
                    report::print_rrsets(
                        "Current managed records",
                        zone.rrsets
                            .iter()
                            .filter(|rrset| is_managed(rrset, &self.account_name)),
                    );
                    states.insert(zone_id.clone(), state);
                    zones.insert(zone_id, zone);
                }
                None => {
                    info!("    Zone does not exist");
                    states.insert(zone_id, ZoneState::absent());
                }
            }
        }

        Ok((states, zones))
    }

    async fn apply_zone(
        &self,
        zone_id: &str,
        zone: &ZoneConfig,
        state: ZoneState,
        existing_zone: Option<PdnsZone>,
        opts: ApplyOptions,
        result: &mut ApplyResult,
    ) -> Result<(), ZoneError> {
        let desired = build_desired(zone_id, zone, state)?;

        // A zone we create starts out with nothing of ours in it.
        let existing = if state.exists {
            index_existing(&existing_zone.map(|z| z.rrsets).unwrap_or_default())
        } else {
            self.create_zone(zone_id, zone, opts).await?;
            result.zones_created += 1;
            RrsetMap::new()
        };

        report::print_rrsets("Desired records from config", desired.values());
        debug!(
            "  Desired RRsets: {}, Existing RRsets: {}",
            desired.len(),
            existing.len()
        );

        // Without `nameservers` the apex NS set stays as last configured.
        let keep = if zone.nameservers.is_empty() {
            vec![rrset_key(zone_id, "NS")]
        } else {
            Vec::new()
        };
        let zone_diff = diff(&desired, &existing, &self.account_name, &keep);
        let counts = zone_diff.counts;
        let changes = zone_diff.ops.len();
        let outcome = patch::send_patch(
            &self.backend,
            zone_id,
            zone_diff.ops,
            opts,
            self.confirm.as_deref(),
        )
        .await?;
        match outcome {
            PatchOutcome::NoChanges => info!("  No changes for {zone_id}"),
            PatchOutcome::DryRun => info!("  [DRY RUN] {changes} change(s) not applied"),
            PatchOutcome::Applied => info!("  Applied {changes} change(s)"),
        }

        result.rrsets_created += counts.created;
        result.rrsets_updated += counts.updated;
        result.rrsets_deleted += counts.deleted;
        Ok(())
    }

    async fn create_zone(
        &self,
        zone_id: &str,
        zone: &ZoneConfig,
        opts: ApplyOptions,
    ) -> Result<(), ZoneError> {
        let kind = zone.kind()?;
        info!("  Creating zone: {zone_id} (kind={kind})");
        if opts.dry_run {
            return Ok(());
        }

        let body = PdnsZone {
            name: zone_id.to_string(),
            kind: kind.to_string(),
            account: self.account_name.clone(),
            nameservers: zone
                .nameservers
                .iter()
                .map(|ns| qualify_nameserver(ns, zone_id))
                .collect(),
            ..Default::default()
        };
        self.backend
            .create_zone(&body)
            .await
            .map_err(ZoneError::CreateZone)?;
        debug!("  Zone created successfully");
        Ok(())
    }
}
