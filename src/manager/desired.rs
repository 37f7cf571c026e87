//! Target record sets for a zone, computed from its configuration.
use std::collections::BTreeMap;

use tracing::warn;

use crate::config::{DEFAULT_TTL, ZoneConfig, ZoneState};
use crate::error::ConfigError;
use crate::powerdns::types::{PdnsRecord, PdnsRrset};

/// Record sets keyed by [`rrset_key`].
pub type RrsetMap = BTreeMap<String, PdnsRrset>;

/// `lowercase(name)/UPPERCASE(type)`
pub fn rrset_key(name: &str, rrtype: &str) -> String {
    format!(
        "{}/{}",
        name.to_ascii_lowercase(),
        rrtype.to_ascii_uppercase()
    )
}

/// Fully-qualified owner name for `name` inside `zone_id`.
pub fn build_fqdn(name: &str, zone_id: &str) -> String {
    if name == "@" {
        return zone_id.to_string();
    }
    if name.ends_with('.') {
        return name.to_string();
    }
    format!("{name}.{zone_id}")
}

/// Completes a relative nameserver host with the zone name.
pub fn qualify_nameserver(ns: &str, zone_id: &str) -> String {
    if ns.ends_with('.') {
        ns.to_string()
    } else {
        format!("{ns}.{zone_id}")
    }
}

/// TXT content as PowerDNS expects it: one or more quoted strings.
pub fn quote_txt(content: &str) -> String {
    if content.len() >= 2 && content.starts_with('"') && content.ends_with('"') {
        return content.to_string();
    }
    let escaped = content.replace('\\', "\\\\").replace('"', "\\\"");
    format!("\"{escaped}\"")
}

pub fn build_desired(
    zone_id: &str,
    zone: &ZoneConfig,
    state: ZoneState,
) -> Result<RrsetMap, ConfigError> {
    let mut desired = RrsetMap::new();

    // NS only where we own the zone (or are about to create it)
    if !zone.nameservers.is_empty() {
        if state.is_managed || !state.exists {
            let records = zone
                .nameservers
                .iter()
                .map(|ns| PdnsRecord {
                    content: qualify_nameserver(ns, zone_id),
                    disabled: false,
                })
                .collect();
            insert(&mut desired, rrset(zone_id.to_string(), "NS".into(), DEFAULT_TTL, records));
        } else {
            warn!(zone = zone_id, "skipping nameservers (zone is not managed)");
        }
    }

    for input in zone.normalized_rrsets_for(zone_id)? {
        let name = build_fqdn(&input.name, zone_id);
        let is_txt = input.rrtype == "TXT";
        let records = input
            .records
            .into_iter()
            .map(|record| PdnsRecord {
                content: if is_txt {
                    quote_txt(&record.content)
                } else {
                    record.content
                },
                disabled: record.disabled,
            })
            .collect();
        insert(&mut desired, rrset(name, input.rrtype, input.ttl, records));
    }

    Ok(desired)
}

fn rrset(name: String, rrtype: String, ttl: u32, records: Vec<PdnsRecord>) -> PdnsRrset {
    PdnsRrset {
        name,
        rrtype,
        ttl,
        changetype: None,
        records,
        comments: Vec::new(),
    }
}

fn insert(desired: &mut RrsetMap, rrset: PdnsRrset) {
    let key = rrset_key(&rrset.name, &rrset.rrtype);
    let previous = desired.insert(key, rrset);
    debug_assert!(previous.is_none(), "duplicate record set survived validation");
}
