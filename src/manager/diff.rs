//! Classifies desired vs. existing record sets into patch operations.
use tracing::{debug, info};

use super::desired::{RrsetMap, rrset_key};
use super::ownership::{is_managed, ownership_comment};
use crate::powerdns::types::{ChangeType, PdnsRrset};
use crate::report;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DiffCounts {
    pub created: usize,
    pub updated: usize,
    pub deleted: usize,
    pub skipped: usize,
    pub unchanged: usize,
}

/// Patch operations for one zone plus how they were classified.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ZoneDiff {
    pub ops: Vec<PdnsRrset>,
    pub counts: DiffCounts,
}

/// Index a zone's record sets by [`rrset_key`].
pub fn index_existing(rrsets: &[PdnsRrset]) -> RrsetMap {
    rrsets
        .iter()
        .map(|rrset| (rrset_key(&rrset.name, &rrset.rrtype), rrset.clone()))
        .collect()
}

/// TTL, record count, or the multiset of `(content, disabled)` differs.
///
/// Record order and comments are ignored.
pub fn needs_update(desired: &PdnsRrset, existing: &PdnsRrset) -> bool {
    if desired.ttl != existing.ttl || desired.records.len() != existing.records.len() {
        return true;
    }

    let fingerprint = |rrset: &PdnsRrset| {
        let mut entries: Vec<String> = rrset
            .records
            .iter()
            .map(|r| format!("{}|{}", r.content, r.disabled))
            .collect();
        entries.sort_unstable();
        entries
    };

    fingerprint(desired) != fingerprint(existing)
}

/// Managed record sets missing from `desired` are deleted unless their key
/// is listed in `keep`.
pub fn diff(
    desired: &RrsetMap,
    existing: &RrsetMap,
    account_name: &str,
    keep: &[String],
) -> ZoneDiff {
    let mut out = ZoneDiff::default();

    for (key, want) in desired {
        match existing.get(key) {
            None => {
                info!("  + Creating RRset: {} {}", want.name, want.rrtype);
                report::log_rrset_diff(None, Some(want));
                out.ops.push(replace_op(want, account_name));
                out.counts.created += 1;
            }
            Some(have) if is_managed(have, account_name) => {
                if needs_update(want, have) {
                    info!("  ~ Updating RRset: {} {}", want.name, want.rrtype);
                    report::log_rrset_diff(Some(have), Some(want));
                    out.ops.push(replace_op(want, account_name));
                    out.counts.updated += 1;
                } else {
                    debug!("  = RRset unchanged: {} {}", want.name, want.rrtype);
                    out.counts.unchanged += 1;
                }
            }
            Some(have) => {
                debug!("  - Skipping non-managed RRset: {} {}", have.name, have.rrtype);
                out.counts.skipped += 1;
            }
        }
    }

    for (key, have) in existing {
        if desired.contains_key(key) || !is_managed(have, account_name) {
            continue;
        }
        if keep.contains(key) {
            debug!("  = Keeping RRset: {} {}", have.name, have.rrtype);
            out.counts.unchanged += 1;
            continue;
        }
        info!("  - Deleting orphaned RRset: {} {}", have.name, have.rrtype);
        report::log_rrset_diff(Some(have), None);
        out.ops.push(delete_op(have));
        out.counts.deleted += 1;
    }

    out
}

fn replace_op(desired: &PdnsRrset, account_name: &str) -> PdnsRrset {
    PdnsRrset {
        name: desired.name.clone(),
        rrtype: desired.rrtype.clone(),
        ttl: desired.ttl,
        changetype: Some(ChangeType::Replace),
        records: desired.records.clone(),
        comments: vec![ownership_comment(account_name)],
    }
}

fn delete_op(existing: &PdnsRrset) -> PdnsRrset {
    PdnsRrset {
        name: existing.name.clone(),
        rrtype: existing.rrtype.clone(),
        ttl: 0,
        changetype: Some(ChangeType::Delete),
        records: Vec::new(),
        comments: Vec::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::powerdns::types::{PdnsComment, PdnsRecord};

    const ACCOUNT: &str = "zone-manager";

    fn rrset(name: &str, rrtype: &str, ttl: u32, records: &[(&str, bool)]) -> PdnsRrset {
        PdnsRrset {
            name: name.into(),
            rrtype: rrtype.into(),
            ttl,
            changetype: None,
            records: records
                .iter()
                .map(|(content, disabled)| PdnsRecord {
                    content: content.to_string(),
                    disabled: *disabled,
                })
                .collect(),
            comments: Vec::new(),
        }
    }

    fn owned(mut rrset: PdnsRrset, account: &str) -> PdnsRrset {
        rrset.comments.push(PdnsComment {
            content: "x".into(),
            account: account.into(),
            modified_at: None,
        });
        rrset
    }

    fn map(rrsets: Vec<PdnsRrset>) -> RrsetMap {
        index_existing(&rrsets)
    }

    #[test]
    fn update_trigger_matrix() {
        let existing = rrset("a.example.com.", "A", 300, &[("1.1.1.1", false)]);

        let ttl_changed = rrset("a.example.com.", "A", 600, &[("1.1.1.1", false)]);
        assert!(needs_update(&ttl_changed, &existing));

        let added = rrset("a.example.com.", "A", 300, &[("1.1.1.1", false), ("2.2.2.2", false)]);
        assert!(needs_update(&added, &existing));

        let identical = rrset("a.example.com.", "A", 300, &[("1.1.1.1", false)]);
        assert!(!needs_update(&identical, &existing));

        let flipped = rrset("a.example.com.", "A", 300, &[("1.1.1.1", true)]);
        assert!(needs_update(&flipped, &existing));
    }

    #[test]
    fn record_order_is_ignored() {
        let existing = rrset("a.example.com.", "A", 300, &[("1.1.1.1", false), ("2.2.2.2", false)]);
        let reordered = rrset("a.example.com.", "A", 300, &[("2.2.2.2", false), ("1.1.1.1", false)]);
        assert!(!needs_update(&reordered, &existing));
    }

    #[test]
    fn duplicates_with_different_flags_are_distinct() {
        let existing = rrset("a.example.com.", "A", 300, &[("1.1.1.1", false), ("1.1.1.1", false)]);
        let desired = rrset("a.example.com.", "A", 300, &[("1.1.1.1", false), ("1.1.1.1", true)]);
        assert!(needs_update(&desired, &existing));
    }

    #[test]
    fn classifies_create_update_skip_and_unchanged() {
        let desired = map(vec![
            rrset("new.example.com.", "A", 300, &[("192.0.2.1", false)]),
            rrset("mine.example.com.", "A", 600, &[("192.0.2.2", false)]),
            rrset("same.example.com.", "A", 300, &[("192.0.2.3", false)]),
            rrset("theirs.example.com.", "A", 300, &[("192.0.2.4", false)]),
        ]);
        let existing = map(vec![
            owned(rrset("mine.example.com.", "A", 300, &[("192.0.2.2", false)]), ACCOUNT),
            owned(rrset("same.example.com.", "A", 300, &[("192.0.2.3", false)]), ACCOUNT),
            owned(rrset("theirs.example.com.", "A", 300, &[("198.51.100.1", false)]), "alice"),
        ]);

        let result = diff(&desired, &existing, ACCOUNT, &[]);
        assert_eq!(
            result.counts,
            DiffCounts {
                created: 1,
                updated: 1,
                deleted: 0,
                skipped: 1,
                unchanged: 1,
            }
        );

        let names: Vec<_> = result.ops.iter().map(|op| op.name.as_str()).collect();
        assert_eq!(names, vec!["mine.example.com.", "new.example.com."]);
        for op in &result.ops {
            assert_eq!(op.changetype, Some(ChangeType::Replace));
            assert!(is_managed(op, ACCOUNT));
        }
    }

    #[test]
    fn orphan_cleanup_only_for_managed() {
        let existing = map(vec![
            owned(rrset("gone.example.com.", "A", 300, &[("192.0.2.1", false)]), ACCOUNT),
            rrset("manual.example.com.", "A", 300, &[("192.0.2.2", false)]),
        ]);

        let result = diff(&RrsetMap::new(), &existing, ACCOUNT, &[]);
        assert_eq!(result.counts.deleted, 1);
        assert_eq!(result.ops.len(), 1);
        assert_eq!(result.ops[0].name, "gone.example.com.");
        assert_eq!(result.ops[0].changetype, Some(ChangeType::Delete));
        assert!(result.ops[0].records.is_empty());
    }

    #[test]
    fn keys_match_case_insensitively() {
        let desired = map(vec![rrset("WWW.example.com.", "a", 300, &[("192.0.2.1", false)])]);
        let existing = map(vec![owned(
            rrset("www.example.com.", "A", 300, &[("192.0.2.1", false)]),
            ACCOUNT,
        )]);
        assert!(diff(&desired, &existing, ACCOUNT, &[]).ops.is_empty());
    }

    #[test]
    fn kept_keys_survive_orphan_cleanup() {
        let existing = map(vec![
            owned(rrset("example.com.", "NS", 300, &[("ns1.example.net.", false)]), ACCOUNT),
            owned(rrset("gone.example.com.", "A", 300, &[("192.0.2.1", false)]), ACCOUNT),
        ]);

        let keep = [rrset_key("example.com.", "NS")];
        let result = diff(&RrsetMap::new(), &existing, ACCOUNT, &keep);
        assert_eq!(result.counts.deleted, 1);
        assert_eq!(result.counts.unchanged, 1);
        assert_eq!(result.ops.len(), 1);
        assert_eq!(result.ops[0].name, "gone.example.com.");
    }
}
