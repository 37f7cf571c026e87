use serde::ser::SerializeStruct;
use serde::{Deserialize, Serialize, Serializer};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PdnsZone {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub id: String, // "example.com."
    pub name: String, // "example.com."
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub zone_type: Option<String>, // "Zone"
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub kind: String, // "Native", etc.
    /// Ownership marker; a zone is managed when this equals our account name.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub account: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub nameservers: Vec<String>, // only meaningful on create
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub rrsets: Vec<PdnsRrset>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ChangeType {
    Replace,
    Delete,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct PdnsRrset {
    pub name: String, // "www.example.com."
    #[serde(rename = "type")]
    pub rrtype: String, // "A", "NS", ...
    #[serde(default)]
    pub ttl: u32,
    #[serde(default)]
    pub changetype: Option<ChangeType>, // only set when patching
    #[serde(default)]
    pub records: Vec<PdnsRecord>,
    #[serde(default)]
    pub comments: Vec<PdnsComment>,
}

// DELETE ops carry no ttl; every other rrset keeps it, including 0.
impl Serialize for PdnsRrset {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut state = serializer.serialize_struct("PdnsRrset", 6)?;
        state.serialize_field("name", &self.name)?;
        state.serialize_field("type", &self.rrtype)?;
        if self.changetype == Some(ChangeType::Delete) {
            state.skip_field("ttl")?;
        } else {
            state.serialize_field("ttl", &self.ttl)?;
        }
        match &self.changetype {
            Some(changetype) => state.serialize_field("changetype", changetype)?,
            None => state.skip_field("changetype")?,
        }
        if self.records.is_empty() {
            state.skip_field("records")?;
        } else {
            state.serialize_field("records", &self.records)?;
        }
        if self.comments.is_empty() {
            state.skip_field("comments")?;
        } else {
            state.serialize_field("comments", &self.comments)?;
        }
        state.end()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PdnsRecord {
    pub content: String, // "192.0.2.1" or "ns1.example.net."
    #[serde(default)]
    pub disabled: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PdnsComment {
    pub content: String,
    #[serde(default)]
    pub account: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub modified_at: Option<i64>,
}

/// Body of `PATCH /zones/{zone_id}`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ZonePatch {
    pub rrsets: Vec<PdnsRrset>,
}

/// Error body PowerDNS returns alongside non-2xx statuses.
#[derive(Debug, Deserialize)]
pub struct ApiErrorBody {
    pub error: String,
}
