//! In-memory stand-in for a PowerDNS server.
#![allow(dead_code)]

use std::collections::{BTreeMap, HashSet};
use std::sync::Mutex;

use async_trait::async_trait;
use pdns_zone_manager::backend::{BackendError, ZoneBackend};
use pdns_zone_manager::powerdns::types::{
    ChangeType, PdnsComment, PdnsRecord, PdnsRrset, PdnsZone, ZonePatch,
};

pub const ACCOUNT: &str = "zone-manager";

#[derive(Default)]
pub struct FakeBackend {
    pub zones: Mutex<BTreeMap<String, PdnsZone>>,
    pub created: Mutex<Vec<PdnsZone>>,
    pub patches: Mutex<Vec<(String, ZonePatch)>>,
    pub fail_get: HashSet<String>,
    pub fail_patch: HashSet<String>,
}

impl FakeBackend {
    pub fn with_zone(self, zone: PdnsZone) -> Self {
        self.zones.lock().unwrap().insert(zone.name.clone(), zone);
        self
    }

    pub fn zone(&self, name: &str) -> Option<PdnsZone> {
        self.zones.lock().unwrap().get(name).cloned()
    }

    pub fn created_count(&self) -> usize {
        self.created.lock().unwrap().len()
    }

    pub fn patch_count(&self) -> usize {
        self.patches.lock().unwrap().len()
    }

    pub fn last_patch(&self) -> Option<(String, ZonePatch)> {
        self.patches.lock().unwrap().last().cloned()
    }
}

#[async_trait]
impl ZoneBackend for FakeBackend {
    async fn get_zone(&self, zone_id: &str) -> Result<Option<PdnsZone>, BackendError> {
        if self.fail_get.contains(zone_id) {
            return Err(BackendError::UnexpectedStatus {
                status: 500,
                body: "boom".into(),
            });
        }
        Ok(self.zone(zone_id))
    }

    async fn create_zone(&self, zone: &PdnsZone) -> Result<PdnsZone, BackendError> {
        self.created.lock().unwrap().push(zone.clone());

        // Like PowerDNS: SOA plus NS from `nameservers`, neither carrying comments.
        let mut stored = zone.clone();
        stored.id = zone.name.clone();
        stored.nameservers = Vec::new();
        stored.rrsets = vec![
            rrset(&zone.name, "SOA", 3600, &["a.misconfigured.dns.server.invalid. hostmaster. 1 10800 3600 604800 3600"]),
            rrset(
                &zone.name,
                "NS",
                3600,
                &zone.nameservers.iter().map(String::as_str).collect::<Vec<_>>(),
            ),
        ];
        self.zones
            .lock()
            .unwrap()
            .insert(zone.name.clone(), stored.clone());
        Ok(stored)
    }

    async fn patch_zone(&self, zone_id: &str, patch: &ZonePatch) -> Result<(), BackendError> {
        if self.fail_patch.contains(zone_id) {
            return Err(BackendError::Api {
                status: 422,
                message: "RRset test.example.com. IN A: Conflicts with pre-existing RRset".into(),
            });
        }
        self.patches
            .lock()
            .unwrap()
            .push((zone_id.to_string(), patch.clone()));

        let mut zones = self.zones.lock().unwrap();
        let zone = zones.get_mut(zone_id).expect("patched zone exists");
        for op in &patch.rrsets {
            zone.rrsets
                .retain(|r| !(r.name.eq_ignore_ascii_case(&op.name) && r.rrtype == op.rrtype));
            if op.changetype == Some(ChangeType::Replace) {
                let mut stored = op.clone();
                stored.changetype = None;
                zone.rrsets.push(stored);
            }
        }
        Ok(())
    }
}

pub fn rrset(name: &str, rrtype: &str, ttl: u32, contents: &[&str]) -> PdnsRrset {
    PdnsRrset {
        name: name.into(),
        rrtype: rrtype.into(),
        ttl,
        changetype: None,
        records: contents
            .iter()
            .map(|content| PdnsRecord {
                content: content.to_string(),
                disabled: false,
            })
            .collect(),
        comments: Vec::new(),
    }
}

pub fn owned_by(mut rrset: PdnsRrset, account: &str) -> PdnsRrset {
    rrset.comments.push(PdnsComment {
        content: "Managed by zone-manager".into(),
        account: account.into(),
        modified_at: Some(1_700_000_000),
    });
    rrset
}

pub fn zone(name: &str, account: &str, rrsets: Vec<PdnsRrset>) -> PdnsZone {
    PdnsZone {
        id: name.into(),
        name: name.into(),
        kind: "Native".into(),
        account: account.into(),
        rrsets,
        ..Default::default()
    }
}
