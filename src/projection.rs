//! Field projection
//!
//! Restricts records to a caller-chosen subset of fields. Valid names come
//! from a live sample record rather than a static schema, so new upstream
//! columns are selectable without code changes.

use serde_json::{Map, Value};

use crate::error::{Result, StatGateError};

/// Keys of `sample`, in the order the upstream sent them.
pub fn field_names(sample: &Value) -> Vec<String> {
    sample
        .as_object()
        .map(|m| m.keys().cloned().collect())
        .unwrap_or_default()
}

/// Check that every requested field exists on the sample record.
///
/// On failure the error lists every unknown name (in request order, without
/// duplicates) and the full set of valid names.
pub fn validate_field_names(fields: &[String], sample: &Value) -> Result<()> {
    let valid = field_names(sample);
    let mut unknown: Vec<String> = Vec::new();
    for field in fields {
        if !valid.iter().any(|v| v == field) && !unknown.contains(field) {
            unknown.push(field.clone());
        }
    }
    if unknown.is_empty() {
        Ok(())
    } else {
        Err(StatGateError::FieldSelection { unknown, valid })
    }
}

/// Project every record onto `fields`.
///
/// `None` or an empty list returns the records unchanged. Keys missing from an
/// individual record are skipped for that record; non-object records pass
/// through as they are.
pub fn select_fields(records: &[Value], fields: Option<&[String]>) -> Vec<Value> {
    match fields {
        None | Some([]) => records.to_vec(),
        Some(fields) => records.iter().map(|r| project(r, fields)).collect(),
    }
}

fn project(record: &Value, fields: &[String]) -> Value {
    let Some(obj) = record.as_object() else {
        return record.clone();
    };
    let mut out = Map::with_capacity(fields.len());
    for field in fields {
        if let Some(v) = obj.get(field) {
            out.insert(field.clone(), v.clone());
        }
    }
    Value::Object(out)
}
