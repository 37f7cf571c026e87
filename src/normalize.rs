//! Turns the flexible `records:` syntax into a uniform record list.
//!
//! Accepted shapes:
//!
//! ```yaml
//! records: 192.0.2.1
//! records: [192.0.2.1, 192.0.2.2]
//! records: { content: 192.0.2.1, disabled: true }
//! records:
//!   - 192.0.2.1
//!   - content: 192.0.2.2
//!     comment: spare
//! ```
use serde_yaml::{Mapping, Value};

use crate::config::NormalizedRecord;
use crate::error::RecordShapeError;

/// Normalize a raw `records:` value. A missing value yields an empty list.
pub fn normalize_records(input: &Value) -> Result<Vec<NormalizedRecord>, RecordShapeError> {
    match input {
        Value::Null => Ok(Vec::new()),
        Value::String(content) => Ok(vec![NormalizedRecord::new(content.clone())]),
        Value::Sequence(items) => items
            .iter()
            .enumerate()
            .map(|(i, item)| normalize_item(item).map_err(|err| err.at(i)))
            .collect(),
        Value::Mapping(map) => Ok(vec![parse_record_map(map)?]),
        other => Err(RecordShapeError::Unsupported(kind_of(other))),
    }
}

fn normalize_item(item: &Value) -> Result<NormalizedRecord, RecordShapeError> {
    match item {
        Value::String(content) => Ok(NormalizedRecord::new(content.clone())),
        Value::Mapping(map) => parse_record_map(map),
        other => Err(RecordShapeError::Unsupported(kind_of(other))),
    }
}

fn parse_record_map(map: &Mapping) -> Result<NormalizedRecord, RecordShapeError> {
    let mut record = NormalizedRecord::new(String::new());

    if let Some(content) = map.get("content") {
        record.content = content
            .as_str()
            .ok_or(RecordShapeError::FieldType {
                field: "content",
                expected: "string",
            })?
            .to_string();
    }

    if let Some(disabled) = map.get("disabled") {
        record.disabled = disabled.as_bool().ok_or(RecordShapeError::FieldType {
            field: "disabled",
            expected: "boolean",
        })?;
    }

    if let Some(comment) = map.get("comment") {
        let comment = comment.as_str().ok_or(RecordShapeError::FieldType {
            field: "comment",
            expected: "string",
        })?;
        record.comment = Some(comment.to_string());
    }

    Ok(record)
}

fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Sequence(_) => "sequence",
        Value::Mapping(_) => "mapping",
        Value::Tagged(_) => "tagged value",
    }
}
