use std::collections::{BTreeMap, BTreeSet};

use serde_json::Value;

use crate::error::{Result, StatGateError};

/// Dataset paths served when `STATGATE_ALLOWED_ENDPOINTS` is not set.
const DEFAULT_ENDPOINTS: &[&str] = &[
    "api/v1/schools/ccd/directory/2022",
    "api/v1/schools/ccd/enrollment/2022/grade-99",
    "api/v1/school-districts/ccd/directory/2022",
    "api/v1/school-districts/ccd/finance/2020",
    "api/v1/college-university/ipeds/directory/2022",
    "api/v1/college-university/ipeds/fall-enrollment/2022/undergraduate",
];

/// Query parameters owned by the pagination layer; callers may not set them as filters.
const RESERVED_FILTER_KEYS: &[&str] = &["page", "per_page", "limit", "offset"];

/// The set of upstream endpoint paths callers may query.
///
/// Paths are stored without leading or trailing slashes so that
/// `/api/v1/x/`, `api/v1/x` and `/api/v1/x` all name the same endpoint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EndpointAllowlist(BTreeSet<String>);

impl EndpointAllowlist {
    pub fn new<I, S>(endpoints: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self(
            endpoints
                .into_iter()
                .map(|e| canonical_path(e.as_ref()))
                .filter(|e| !e.is_empty())
                .collect(),
        )
    }

    /// Parse a comma-separated list, as found in the environment.
    pub fn parse(list: &str) -> Self {
        Self::new(list.split(','))
    }

    pub fn contains(&self, endpoint: &str) -> bool {
        self.0.contains(&canonical_path(endpoint))
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }

    /// Check membership, returning the canonical path on success.
    pub fn check(&self, endpoint: &str) -> Result<String> {
        let canonical = canonical_path(endpoint);
        if self.0.contains(&canonical) {
            Ok(canonical)
        } else {
            Err(StatGateError::EndpointNotAllowed {
                endpoint: endpoint.to_string(),
                allowed: self.0.iter().cloned().collect(),
            })
        }
    }
}

impl Default for EndpointAllowlist {
    fn default() -> Self {
        Self::new(DEFAULT_ENDPOINTS)
    }
}

/// Strip surrounding whitespace and slashes.
pub fn canonical_path(endpoint: &str) -> String {
    endpoint.trim().trim_matches('/').to_string()
}

/// Turn a canonical path into the upstream request path (the upstream wants a trailing slash).
pub fn request_path(canonical: &str) -> String {
    format!("/{canonical}/")
}

/// Convert JSON filter values into query-string values.
///
/// Strings pass through, numbers and booleans are stringified, and arrays of
/// scalars become comma-separated lists. Objects and nulls are rejected.
pub fn filter_values(raw: &BTreeMap<String, Value>) -> Result<BTreeMap<String, String>> {
    raw.iter()
        .map(|(key, value)| Ok((key.clone(), scalar_or_list(key, value)?)))
        .collect()
}

fn scalar_or_list(key: &str, value: &Value) -> Result<String> {
    match value {
        Value::String(s) => Ok(s.clone()),
        Value::Number(n) => Ok(n.to_string()),
        Value::Bool(b) => Ok(b.to_string()),
        Value::Array(items) if !items.is_empty() => items
            .iter()
            .map(|item| match item {
                Value::Array(_) | Value::Object(_) | Value::Null => Err(
                    StatGateError::InvalidFilter(format!("filter '{key}' has a nested value")),
                ),
                scalar => scalar_or_list(key, scalar),
            })
            .collect::<Result<Vec<_>>>()
            .map(|parts| parts.join(",")),
        _ => Err(StatGateError::InvalidFilter(format!(
            "filter '{key}' must be a string, number, boolean or list of those"
        ))),
    }
}

/// Validate filter shapes before they are forwarded upstream as query parameters.
pub fn validate_filters(filters: &BTreeMap<String, String>) -> Result<()> {
    for (key, value) in filters {
        if key.is_empty() || !key.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') {
            return Err(StatGateError::InvalidFilter(format!(
                "filter name '{key}' must contain only letters, digits and underscores"
            )));
        }
        if RESERVED_FILTER_KEYS.contains(&key.as_str()) {
            return Err(StatGateError::InvalidFilter(format!(
                "'{key}' is a pagination parameter, not a filter"
            )));
        }
        if value.trim().is_empty() {
            return Err(StatGateError::InvalidFilter(format!(
                "filter '{key}' has an empty value"
            )));
        }
        if value.chars().any(char::is_control) {
            return Err(StatGateError::InvalidFilter(format!(
                "filter '{key}' contains control characters"
            )));
        }
    }
    Ok(())
}
