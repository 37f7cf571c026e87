//! Declarative zone configuration loaded from YAML.
use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::path::Path;
use std::str::FromStr;

use serde::Deserialize;
use serde_yaml::Value;

use crate::error::ConfigError;
use crate::normalize::normalize_records;
use crate::powerdns::types::PdnsZone;

pub const DEFAULT_ACCOUNT_NAME: &str = "zone-manager";
pub const DEFAULT_TTL: u32 = 300;

/// Ownership account from `ACCOUNT_NAME`, falling back to [`DEFAULT_ACCOUNT_NAME`].
pub fn account_name_from_env() -> String {
    std::env::var("ACCOUNT_NAME")
        .ok()
        .filter(|name| !name.is_empty())
        .unwrap_or_else(|| DEFAULT_ACCOUNT_NAME.to_string())
}

/// Canonical zone name, always ending in a dot (e.g. example.com.).
pub fn canonical_zone_name(name: &str) -> String {
    if name.ends_with('.') {
        name.to_string()
    } else {
        format!("{name}.")
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub zones: BTreeMap<String, ZoneConfig>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ZoneConfig {
    /// Raw kind as written; checked by the validator.
    #[serde(default)]
    pub kind: Option<String>,
    #[serde(default)]
    pub nameservers: Vec<String>,
    #[serde(default)]
    pub rrsets: Vec<RrsetInput>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RrsetInput {
    #[serde(default)]
    pub name: String,
    #[serde(rename = "type", default)]
    pub rrtype: String,
    #[serde(default)]
    pub ttl: Option<u32>,
    /// String, record object, or a list mixing both.
    #[serde(default)]
    pub records: Value,
    #[serde(default)]
    pub comment: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NormalizedRrset {
    pub name: String,
    pub rrtype: String, // upper-case
    pub ttl: u32,
    pub comment: Option<String>,
    pub records: Vec<NormalizedRecord>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NormalizedRecord {
    pub content: String,
    pub disabled: bool,
    pub comment: Option<String>,
}

impl NormalizedRecord {
    pub fn new(content: String) -> Self {
        Self {
            content,
            disabled: false,
            comment: None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ZoneKind {
    #[default]
    Native,
    Master,
    Slave,
    Producer,
    Consumer,
}

impl ZoneKind {
    pub const ALL: [ZoneKind; 5] = [
        ZoneKind::Native,
        ZoneKind::Master,
        ZoneKind::Slave,
        ZoneKind::Producer,
        ZoneKind::Consumer,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            ZoneKind::Native => "Native",
            ZoneKind::Master => "Master",
            ZoneKind::Slave => "Slave",
            ZoneKind::Producer => "Producer",
            ZoneKind::Consumer => "Consumer",
        }
    }
}

impl fmt::Display for ZoneKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid kind {0:?}, must be one of: Native, Master, Slave, Producer, Consumer")]
pub struct UnknownZoneKind(pub String);

impl FromStr for ZoneKind {
    type Err = UnknownZoneKind;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ZoneKind::ALL
            .into_iter()
            .find(|kind| kind.as_str() == s)
            .ok_or_else(|| UnknownZoneKind(s.to_string()))
    }
}

/// Existence and ownership of a configured zone, captured once per run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ZoneState {
    pub exists: bool,
    pub is_managed: bool,
}

impl ZoneState {
    pub fn absent() -> Self {
        Self::default()
    }

    pub fn from_zone(zone: &PdnsZone, account_name: &str) -> Self {
        Self {
            exists: true,
            is_managed: zone.account == account_name,
        }
    }
}

/// Zone states keyed by canonical zone name.
pub type ZoneStates = HashMap<String, ZoneState>;

impl Config {
    pub fn load_from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let data = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_yaml_str(&data)
    }

    /// Parse and check that every `records:` value has a supported shape.
    pub fn from_yaml_str(data: &str) -> Result<Self, ConfigError> {
        let config: Config = serde_yaml::from_str(data)?;
        for (zone_name, zone) in &config.zones {
            zone.normalized_rrsets_for(zone_name)?;
        }
        Ok(config)
    }
}

impl ZoneConfig {
    /// Kind with the default applied. Only valid kinds survive validation.
    pub fn kind(&self) -> Result<ZoneKind, UnknownZoneKind> {
        match self.kind.as_deref() {
            None | Some("") => Ok(ZoneKind::default()),
            Some(kind) => kind.parse(),
        }
    }

    pub fn normalized_rrsets_for(&self, zone_name: &str) -> Result<Vec<NormalizedRrset>, ConfigError> {
        self.rrsets
            .iter()
            .enumerate()
            .map(|(index, input)| {
                input
                    .normalize()
                    .map_err(|source| ConfigError::InvalidRecordShape {
                        zone: zone_name.to_string(),
                        index,
                        name: input.name.clone(),
                        rrtype: input.rrtype.clone(),
                        source,
                    })
            })
            .collect()
    }
}

impl RrsetInput {
    pub fn normalize(&self) -> Result<NormalizedRrset, crate::error::RecordShapeError> {
        Ok(NormalizedRrset {
            name: self.name.clone(),
            rrtype: self.rrtype.to_ascii_uppercase(),
            ttl: self.ttl.unwrap_or(DEFAULT_TTL),
            comment: self.comment.clone(),
            records: normalize_records(&self.records)?,
        })
    }
}
