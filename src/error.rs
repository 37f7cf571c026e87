// src/error.rs
use std::path::PathBuf;

use thiserror::Error;

use crate::backend::BackendError;
use crate::config::UnknownZoneKind;
use crate::validation::ValidationReport;

/// A `records:` value that is neither a string, a record object, nor a list of those.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RecordShapeError {
    #[error("unsupported records type {0}")]
    Unsupported(&'static str),

    #[error("{field} must be a {expected}")]
    FieldType {
        field: &'static str,
        expected: &'static str,
    },

    #[error("record[{index}]: {source}")]
    Item {
        index: usize,
        source: Box<RecordShapeError>,
    },
}

impl RecordShapeError {
    pub(crate) fn at(self, index: usize) -> Self {
        RecordShapeError::Item {
            index,
            source: Box::new(self),
        }
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse YAML: {0}")]
    Parse(#[from] serde_yaml::Error),

    #[error("zone {zone:?}, rrset[{index}] ({name}/{rrtype}): {source}")]
    InvalidRecordShape {
        zone: String,
        index: usize,
        name: String,
        rrtype: String,
        source: RecordShapeError,
    },
}

/// Conditions that stop a whole run before any mutation happens.
#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Validation(#[from] ValidationReport),

    #[error("failed to check zone {zone}: {source}")]
    Fetch { zone: String, source: BackendError },
}

/// Failure of a single zone's apply step; other zones still run.
#[derive(Debug, Error)]
pub enum ZoneError {
    #[error("failed to create zone: {0}")]
    CreateZone(#[source] BackendError),

    #[error("failed to patch zone: {0}")]
    Patch(#[source] BackendError),

    #[error(transparent)]
    Desired(#[from] ConfigError),

    #[error(transparent)]
    InvalidKind(#[from] UnknownZoneKind),

    /// The confirmation prompt was declined; nothing was sent.
    #[error("operation aborted by user")]
    Aborted,
}

impl ZoneError {
    pub fn is_aborted(&self) -> bool {
        matches!(self, ZoneError::Aborted)
    }
}
