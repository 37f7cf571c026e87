//! Human- and machine-readable views of records, diffs and run results.
use std::collections::BTreeMap;

use serde::Serialize;
use tracing::{debug, info};

use crate::manager::ApplyResult;
use crate::powerdns::types::{PdnsRecord, PdnsRrset};

const HEADERS: [&str; 5] = ["NAME", "TYPE", "TTL", "CONTENT", "STATUS"];
const DISABLED_SUFFIX: &str = " [disabled]";

pub fn format_record(record: &PdnsRecord) -> String {
    if record.disabled {
        format!("{}{DISABLED_SUFFIX}", record.content)
    } else {
        record.content.clone()
    }
}

/// One row per record, sorted by type then name.
pub fn record_rows<'a>(rrsets: impl IntoIterator<Item = &'a PdnsRrset>) -> Vec<[String; 5]> {
    let mut rows: Vec<[String; 5]> = rrsets
        .into_iter()
        .flat_map(|rrset| {
            rrset.records.iter().map(move |record| {
                [
                    rrset.name.clone(),
                    rrset.rrtype.clone(),
                    rrset.ttl.to_string(),
                    record.content.clone(),
                    if record.disabled { "disabled" } else { "" }.to_string(),
                ]
            })
        })
        .collect();
    rows.sort_by(|a, b| (&a[1], &a[0]).cmp(&(&b[1], &b[0])));
    rows
}

pub fn render_table(title: &str, rows: &[[String; 5]]) -> String {
    if rows.is_empty() {
        return format!("{title}: (none)");
    }

    let mut widths = HEADERS.map(str::len);
    for row in rows {
        for (width, cell) in widths.iter_mut().zip(row) {
            *width = (*width).max(cell.len());
        }
    }

    let line = |cells: &mut dyn Iterator<Item = &str>| {
        let mut out = String::from("  ");
        for (cell, width) in cells.zip(widths) {
            out.push_str(&format!("{cell:<w$}", w = width + 2));
        }
        out.trim_end().to_string()
    };

    let mut out = format!("{title}:\n");
    out.push_str(&line(&mut HEADERS.iter().copied()));
    for row in rows {
        out.push('\n');
        out.push_str(&line(&mut row.iter().map(String::as_str)));
    }
    out
}

pub fn print_rrsets<'a>(title: &str, rrsets: impl IntoIterator<Item = &'a PdnsRrset>) {
    info!("{}", render_table(title, &record_rows(rrsets)));
}

/// Per-record detail for a create (`existing` is `None`), delete (`desired`
/// is `None`) or update. Debug level only.
pub fn log_rrset_diff(existing: Option<&PdnsRrset>, desired: Option<&PdnsRrset>) {
    if !tracing::enabled!(tracing::Level::DEBUG) {
        return;
    }
    for line in diff_lines(existing, desired) {
        debug!("      {line}");
    }
}

pub fn diff_lines(existing: Option<&PdnsRrset>, desired: Option<&PdnsRrset>) -> Vec<String> {
    let mut lines = Vec::new();
    match (existing, desired) {
        (None, Some(new)) => {
            lines.push(format!("TTL: {}", new.ttl));
            lines.extend(new.records.iter().map(|r| format!("+ {}", format_record(r))));
        }
        (Some(old), None) => {
            lines.push(format!("TTL: {}", old.ttl));
            lines.extend(old.records.iter().map(|r| format!("- {}", format_record(r))));
        }
        (Some(old), Some(new)) => {
            if old.ttl != new.ttl {
                lines.push(format!("TTL: {} -> {}", old.ttl, new.ttl));
            } else {
                lines.push(format!("TTL: {}", new.ttl));
            }

            let before: BTreeMap<&str, &PdnsRecord> =
                old.records.iter().map(|r| (r.content.as_str(), r)).collect();
            let after: BTreeMap<&str, &PdnsRecord> =
                new.records.iter().map(|r| (r.content.as_str(), r)).collect();

            for (content, record) in &before {
                if !after.contains_key(content) {
                    lines.push(format!("- {}", format_record(record)));
                }
            }
            for (content, record) in &after {
                match before.get(content) {
                    None => lines.push(format!("+ {}", format_record(record))),
                    Some(prev) if prev.disabled != record.disabled => lines.push(format!(
                        "~ {} -> {}",
                        format_record(prev),
                        format_record(record)
                    )),
                    Some(_) => {}
                }
            }
        }
        (None, None) => {}
    }
    lines
}

/// Run summary as emitted with `--json`.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Summary {
    pub zones_created: usize,
    pub rrsets_created: usize,
    pub rrsets_updated: usize,
    pub rrsets_deleted: usize,
    pub errors: Vec<String>,
    pub dry_run: bool,
}

impl Summary {
    pub fn new(result: &ApplyResult, dry_run: bool) -> Self {
        Self {
            zones_created: result.zones_created,
            rrsets_created: result.rrsets_created,
            rrsets_updated: result.rrsets_updated,
            rrsets_deleted: result.rrsets_deleted,
            errors: result.errors.iter().map(ToString::to_string).collect(),
            dry_run,
        }
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }

    /// Counters block; errors are rendered separately by [`Summary::render_errors`].
    pub fn render_text(&self) -> String {
        let prefix = if self.dry_run { "[DRY RUN] " } else { "" };
        format!(
            "{prefix}Results:\n  Zones created:  {}\n  RRsets created: {}\n  RRsets updated: {}\n  RRsets deleted: {}",
            self.zones_created, self.rrsets_created, self.rrsets_updated, self.rrsets_deleted
        )
    }

    pub fn render_errors(&self) -> Option<String> {
        if self.errors.is_empty() {
            return None;
        }
        let mut out = String::from("Errors:");
        for err in &self.errors {
            out.push_str("\n  - ");
            out.push_str(err);
        }
        Some(out)
    }
}

/// First and last two characters of a secret.
pub fn mask_secret(secret: &str) -> String {
    let chars: Vec<char> = secret.chars().collect();
    if chars.len() <= 4 {
        return "****".to_string();
    }
    let head: String = chars[..2].iter().collect();
    let tail: String = chars[chars.len() - 2..].iter().collect();
    format!("{head}{}{tail}", "*".repeat(chars.len() - 4))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ZoneError;
    use crate::manager::ZoneFailure;

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

    #[test]
    fn rows_sorted_by_type_then_name() {
        let rrsets = [
            rrset("www.example.com.", "A", 300, &[("192.0.2.1", false)]),
            rrset("example.com.", "TXT", 60, &[("\"x\"", true)]),
            rrset("api.example.com.", "A", 300, &[("192.0.2.2", false)]),
        ];
        let rows = record_rows(&rrsets);
        let order: Vec<_> = rows.iter().map(|r| (r[1].as_str(), r[0].as_str())).collect();
        assert_eq!(
            order,
            vec![
                ("A", "api.example.com."),
                ("A", "www.example.com."),
                ("TXT", "example.com."),
            ]
        );
        assert_eq!(rows[2][4], "disabled");
    }

    #[test]
    fn table_aligns_columns() {
        let rows = record_rows(&[rrset("a.example.com.", "A", 300, &[("192.0.2.1", false)])]);
        let table = render_table("Desired", &rows);
        assert_eq!(
            table,
            "Desired:\n  NAME            TYPE  TTL  CONTENT    STATUS\n  a.example.com.  A     300  192.0.2.1"
        );
        assert_eq!(render_table("Empty", &[]), "Empty: (none)");
    }

    #[test]
    fn update_diff_shows_removed_added_and_flipped() {
        let old = rrset("a.", "A", 300, &[("1.1.1.1", false), ("2.2.2.2", false)]);
        let new = rrset("a.", "A", 600, &[("2.2.2.2", true), ("3.3.3.3", false)]);
        assert_eq!(
            diff_lines(Some(&old), Some(&new)),
            vec![
                "TTL: 300 -> 600",
                "- 1.1.1.1",
                "~ 2.2.2.2 -> 2.2.2.2 [disabled]",
                "+ 3.3.3.3",
            ]
        );
    }

    #[test]
    fn summary_json_shape() {
        let result = ApplyResult {
            zones_created: 1,
            rrsets_created: 2,
            errors: vec![ZoneFailure {
                zone: "example.com".into(),
                error: ZoneError::Aborted,
            }],
            ..Default::default()
        };
        let json: serde_json::Value =
            serde_json::from_str(&Summary::new(&result, true).to_json().unwrap()).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "zonesCreated": 1,
                "rrsetsCreated": 2,
                "rrsetsUpdated": 0,
                "rrsetsDeleted": 0,
                "errors": ["zone example.com: operation aborted by user"],
                "dryRun": true,
            })
        );
    }

    #[test]
    fn text_summary_marks_dry_run() {
        let summary = Summary::new(&ApplyResult::default(), true);
        assert!(summary.render_text().starts_with("[DRY RUN] Results:"));
        assert_eq!(summary.render_errors(), None);
    }

    #[test]
    fn masks_secrets() {
        assert_eq!(mask_secret("abc"), "****");
        assert_eq!(mask_secret("secretkey"), "se*****ey");
    }
}
