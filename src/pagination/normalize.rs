//! Pagination normalizer
//!
//! Turns raw `page`/`offset`/`limit` input into a [`CanonicalWindow`].

use serde_json::Number;

use super::types::{CanonicalWindow, PageLimits, PaginationRequest};
use crate::error::{Result, StatGateError};

/// Validate caller pagination and derive the canonical window.
///
/// Rejects `page` together with `offset` regardless of whether the two agree,
/// any non-integral value, `page < 1`, `offset < 0`, and `limit` outside
/// `1..=max_limit`.
pub fn normalize(request: &PaginationRequest, limits: &PageLimits) -> Result<CanonicalWindow> {
    if request.page.is_some() && request.offset.is_some() {
        return Err(StatGateError::Pagination(
            "'page' and 'offset' are mutually exclusive; supply one or neither".to_string(),
        ));
    }

    let limit = match &request.limit {
        None => limits.default_limit,
        Some(n) => {
            let limit = integer("limit", n)?;
            if limit < 1 {
                return Err(StatGateError::Pagination(format!(
                    "'limit' must be at least 1, got {limit}"
                )));
            }
            let limit = limit as u64;
            if limit > limits.max_limit {
                return Err(StatGateError::Pagination(format!(
                    "'limit' must be at most {}, got {limit}",
                    limits.max_limit
                )));
            }
            limit
        }
    };

    if let Some(n) = &request.page {
        let page = integer("page", n)?;
        if page < 1 {
            return Err(StatGateError::Pagination(format!(
                "'page' must be at least 1, got {page}"
            )));
        }
        let page = page as u64;
        let offset = (page - 1).checked_mul(limit).ok_or_else(|| {
            StatGateError::Pagination(format!("'page' {page} is too large for limit {limit}"))
        })?;
        return Ok(CanonicalWindow {
            page,
            offset,
            limit,
        });
    }

    if let Some(n) = &request.offset {
        let offset = integer("offset", n)?;
        if offset < 0 {
            return Err(StatGateError::Pagination(format!(
                "'offset' must be non-negative, got {offset}"
            )));
        }
        let offset = offset as u64;
        return Ok(CanonicalWindow {
            page: offset / limit + 1,
            offset,
            limit,
        });
    }

    Ok(CanonicalWindow {
        page: 1,
        offset: 0,
        limit,
    })
}

/// Read a JSON number as an integer, accepting integral floats such as `3.0`.
fn integer(name: &str, n: &Number) -> Result<i64> {
    if let Some(i) = n.as_i64() {
        return Ok(i);
    }
    if n.is_u64() {
        return Err(StatGateError::Pagination(format!("'{name}' is too large: {n}")));
    }
    match n.as_f64() {
        Some(f) if f.is_finite() && f.fract() == 0.0 && f.abs() < i64::MAX as f64 => Ok(f as i64),
        _ => Err(StatGateError::Pagination(format!(
            "'{name}' must be an integer, got {n}"
        ))),
    }
}
