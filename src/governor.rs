//! Response governor
//!
//! Estimates the size of a serialized response in language-model tokens and
//! rejects it before it is sent if it would not fit the budget.

use crate::error::{Result, StatGateError};

/// Characters per token. Deliberately low so the estimate errs on the high side.
pub const CHARS_PER_TOKEN: usize = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TokenBudget {
    /// Responses estimated above this are rejected.
    pub max_tokens: usize,
    /// Responses estimated above this are logged as close to the limit.
    pub warn_tokens: usize,
}

impl Default for TokenBudget {
    fn default() -> Self {
        Self {
            max_tokens: 25_000,
            warn_tokens: 20_000,
        }
    }
}

impl TokenBudget {
    pub fn validate(&self) -> Result<()> {
        if self.max_tokens == 0 {
            return Err(StatGateError::Config("max tokens must be at least 1".to_string()));
        }
        if self.warn_tokens > self.max_tokens {
            return Err(StatGateError::Config(format!(
                "warn tokens {} exceeds max tokens {}",
                self.warn_tokens, self.max_tokens
            )));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TokenEstimate {
    pub character_count: usize,
    pub estimated_tokens: usize,
    pub exceeds_limit: bool,
}

/// Estimate tokens for `json`, without comparing against any budget.
pub fn estimate_tokens(json: &str) -> usize {
    json.chars().count().div_ceil(CHARS_PER_TOKEN)
}

/// Estimate `json` against `budget`.
pub fn measure(json: &str, budget: &TokenBudget) -> TokenEstimate {
    let estimated_tokens = estimate_tokens(json);
    TokenEstimate {
        character_count: json.chars().count(),
        estimated_tokens,
        exceeds_limit: estimated_tokens > budget.max_tokens,
    }
}

/// Reject `json` if it exceeds the budget.
///
/// `limit` is the page size that produced `json`; it is used to suggest a
/// smaller one. Must run on the exact string that will be sent.
pub fn enforce_budget(json: &str, budget: &TokenBudget, limit: Option<u64>) -> Result<TokenEstimate> {
    let estimate = measure(json, budget);
    if estimate.exceeds_limit {
        tracing::info!(
            estimated_tokens = estimate.estimated_tokens,
            max_tokens = budget.max_tokens,
            "rejecting oversized response"
        );
        return Err(StatGateError::TokenLimit {
            estimated_tokens: estimate.estimated_tokens,
            max_tokens: budget.max_tokens,
            suggestions: suggestions(estimate.estimated_tokens, budget.max_tokens, limit),
        });
    }
    if estimate.estimated_tokens > budget.warn_tokens {
        tracing::warn!(
            estimated_tokens = estimate.estimated_tokens,
            warn_tokens = budget.warn_tokens,
            max_tokens = budget.max_tokens,
            "response is close to the token limit"
        );
    }
    Ok(estimate)
}

fn suggestions(estimated: usize, max: usize, limit: Option<u64>) -> Vec<String> {
    let mut out = Vec::with_capacity(3);
    match limit {
        Some(limit) if limit > 1 => {
            // Scale the page down proportionally, leaving a little headroom.
            let scaled = (limit as u128 * max as u128 * 9 / (estimated as u128 * 10)).max(1);
            let suggested = (scaled as u64).min(limit - 1);
            out.push(format!(
                "Reduce 'limit' from {limit} to about {suggested} records per page."
            ));
        }
        _ => out.push("Reduce 'limit' to request fewer records per page.".to_string()),
    }
    out.push("Use 'fields' to return only the columns you need.".to_string());
    out.push("Add filters to narrow the result set.".to_string());
    out
}
