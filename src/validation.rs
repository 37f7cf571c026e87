use std::collections::{HashMap, HashSet};
use std::fmt;

use regex::Regex;

use crate::config::{Config, ZoneConfig, ZoneStates, canonical_zone_name};
use crate::manager::desired::{build_fqdn, rrset_key};

/// Every violation found in one pass over the configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationReport {
    pub errors: Vec<String>,
}

impl ValidationReport {
    pub fn add(&mut self, msg: impl Into<String>) {
        self.errors.push(msg.into());
    }

    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }
}

impl fmt::Display for ValidationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "validation failed with {} error(s):\n  - {}",
            self.errors.len(),
            self.errors.join("\n  - ")
        )
    }
}

impl std::error::Error for ValidationReport {}

lazy_static::lazy_static! {
    /// Letters, digits, '-' and '_' per label; no leading/trailing '-'
    static ref LABEL_RE: Regex = Regex::new(r"^[A-Za-z0-9_]([A-Za-z0-9_-]*[A-Za-z0-9_])?$").unwrap();
    /// Record type mnemonic, e.g. A, AAAA, TYPE65534
    static ref RRTYPE_RE: Regex = Regex::new(r"^[A-Za-z][A-Za-z0-9]*$").unwrap();
}

/// Hostname, relative ("ns1") or absolute ("ns1.example.net.").
pub fn is_valid_hostname(name: &str) -> bool {
    let d = name.strip_suffix('.').unwrap_or(name);
    !d.is_empty()
        && d.len() <= 253
        && d.split('.')
            .all(|label| label.len() <= 63 && LABEL_RE.is_match(label))
}

/// Check `config` against the zone states gathered for this run.
///
/// Returns `Ok(())` only if no violation at all was found.
pub fn validate(config: &Config, existing: &ZoneStates) -> Result<(), ValidationReport> {
    let mut report = ValidationReport::default();
    let mut zone_ids: HashMap<String, &str> = HashMap::new();

    for (zone_name, zone) in &config.zones {
        if let Some(first) = zone_ids.insert(canonical_zone_name(zone_name), zone_name) {
            report.add(format!(
                "zone {zone_name:?}: duplicate zone definition (same zone as {first:?})"
            ));
        }
        validate_zone(zone_name, zone, existing, &mut report);
    }

    if report.has_errors() {
        Err(report)
    } else {
        Ok(())
    }
}

fn validate_zone(
    zone_name: &str,
    zone: &ZoneConfig,
    existing: &ZoneStates,
    report: &mut ValidationReport,
) {
    let state = existing
        .get(&canonical_zone_name(zone_name))
        .copied()
        .unwrap_or_default();

    if !state.exists && zone.nameservers.is_empty() {
        report.add(format!(
            "zone {zone_name:?}: nameservers are required when creating a new zone"
        ));
    }

    if state.exists && !state.is_managed {
        report.add(format!(
            "zone {zone_name:?}: zone exists but is not managed (account does not match)"
        ));
    }

    for (i, ns) in zone.nameservers.iter().enumerate() {
        if ns.is_empty() {
            report.add(format!("zone {zone_name:?}: nameserver[{i}] cannot be empty"));
        } else if !is_valid_hostname(ns) {
            report.add(format!(
                "zone {zone_name:?}: nameserver[{i}] {ns:?} is not a valid hostname"
            ));
        }
    }

    if let Err(err) = zone.kind() {
        report.add(format!("zone {zone_name:?}: {err}"));
    }

    validate_rrsets(zone_name, zone, report);
}

fn validate_rrsets(zone_name: &str, zone: &ZoneConfig, report: &mut ValidationReport) {
    let zone_id = canonical_zone_name(zone_name);
    let mut seen = HashSet::new();

    for (i, rrset) in zone.rrsets.iter().enumerate() {
        let id = format!(
            "zone {zone_name:?}, rrset[{i}] ({}/{})",
            rrset.name, rrset.rrtype
        );

        if rrset.rrtype.eq_ignore_ascii_case("NS") {
            report.add(format!(
                "{id}: NS records must be managed via 'nameservers' property, not in rrsets"
            ));
            continue;
        }
        if rrset.rrtype.eq_ignore_ascii_case("SOA") {
            report.add(format!(
                "{id}: SOA records are managed by PowerDNS and cannot be specified"
            ));
            continue;
        }

        if rrset.name.is_empty() {
            report.add(format!("{id}: name is required"));
        }
        if rrset.rrtype.is_empty() {
            report.add(format!("{id}: type is required"));
        } else if !RRTYPE_RE.is_match(&rrset.rrtype) {
            report.add(format!("{id}: invalid type {:?}", rrset.rrtype));
        }

        // "www", "www.example.com." and "WWW" all name the same owner
        if !seen.insert(rrset_key(&build_fqdn(&rrset.name, &zone_id), &rrset.rrtype)) {
            report.add(format!("{id}: duplicate RRset definition"));
        }

        let normalized = match rrset.normalize() {
            Ok(normalized) => normalized,
            Err(err) => {
                report.add(format!("{id}: {err}"));
                continue;
            }
        };

        if normalized.records.is_empty() {
            report.add(format!("{id}: at least one record is required"));
        }
        for (j, record) in normalized.records.iter().enumerate() {
            if record.content.is_empty() {
                report.add(format!("{id}, record[{j}]: content cannot be empty"));
            }
        }
    }
}
