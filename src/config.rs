use std::str::FromStr;
use std::time::Duration;

use crate::endpoints::EndpointAllowlist;
use crate::error::{Result, StatGateError};
use crate::governor::TokenBudget;
use crate::pagination::PageLimits;

const DEFAULT_BASE_URL: &str = "https://educationdata.urban.org";
const DEFAULT_TIMEOUT_SECS: u64 = 60;

/// Server configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    /// Base URL of the upstream data API, without a trailing slash.
    pub base_url: String,
    /// Optional bearer token for the upstream.
    pub token: Option<String>,
    /// Per-request HTTP timeout.
    pub timeout: Duration,
    /// Upstream chunk size and caller page-size bounds.
    pub limits: PageLimits,
    /// Response size budget.
    pub budget: TokenBudget,
    /// Endpoint paths callers may query.
    pub allowed_endpoints: EndpointAllowlist,
}

impl Config {
    /// A config with defaults for everything but the base URL.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            token: None,
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            limits: PageLimits::default(),
            budget: TokenBudget::default(),
            allowed_endpoints: EndpointAllowlist::default(),
        }
    }

    pub fn with_limits(mut self, limits: PageLimits) -> Self {
        self.limits = limits;
        self
    }

    pub fn with_budget(mut self, budget: TokenBudget) -> Self {
        self.budget = budget;
        self
    }

    pub fn with_allowed_endpoints(mut self, allowed: EndpointAllowlist) -> Self {
        self.allowed_endpoints = allowed;
        self
    }

    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    /// Load configuration from environment variables (and a `.env` file if present).
    pub fn from_env() -> Result<Self> {
        let _ = dotenvy::dotenv(); // ignore missing .env
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build a config from an arbitrary variable source.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let base_url = lookup("STATGATE_BASE_URL")
            .filter(|s| !s.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string());
        let parsed = url::Url::parse(&base_url).map_err(|e| {
            StatGateError::Config(format!("STATGATE_BASE_URL '{base_url}' is not a valid URL: {e}"))
        })?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(StatGateError::Config(format!(
                "STATGATE_BASE_URL must use http or https, got '{}'",
                parsed.scheme()
            )));
        }

        let defaults = PageLimits::default();
        let limits = PageLimits {
            chunk_size: parse_var(&lookup, "STATGATE_CHUNK_SIZE", defaults.chunk_size)?,
            default_limit: parse_var(&lookup, "STATGATE_DEFAULT_LIMIT", defaults.default_limit)?,
            max_limit: parse_var(&lookup, "STATGATE_MAX_LIMIT", defaults.max_limit)?,
        };
        limits.validate()?;

        let defaults = TokenBudget::default();
        let budget = TokenBudget {
            max_tokens: parse_var(&lookup, "STATGATE_MAX_TOKENS", defaults.max_tokens)?,
            warn_tokens: parse_var(&lookup, "STATGATE_WARN_TOKENS", defaults.warn_tokens)?,
        };
        budget.validate()?;

        let allowed_endpoints = match lookup("STATGATE_ALLOWED_ENDPOINTS") {
            Some(list) => {
                let allow = EndpointAllowlist::parse(&list);
                if allow.is_empty() {
                    return Err(StatGateError::Config(
                        "STATGATE_ALLOWED_ENDPOINTS is set but lists no endpoints".to_string(),
                    ));
                }
                allow
            }
            None => EndpointAllowlist::default(),
        };

        let timeout_secs = parse_var(&lookup, "STATGATE_TIMEOUT_SECS", DEFAULT_TIMEOUT_SECS)?;

        Ok(Config {
            base_url: base_url.trim_end_matches('/').to_string(),
            token: lookup("STATGATE_API_TOKEN").filter(|t| !t.is_empty()),
            timeout: Duration::from_secs(timeout_secs),
            limits,
            budget,
            allowed_endpoints,
        })
    }
}

fn parse_var<F, T>(lookup: &F, key: &str, default: T) -> Result<T>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match lookup(key) {
        None => Ok(default),
        Some(raw) => raw.trim().parse::<T>().map_err(|e| {
            StatGateError::Config(format!("{key}='{raw}' is not a valid number: {e}"))
        }),
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use pretty_assertions::assert_eq;

    use super::*;

    fn lookup_from(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = Config::from_lookup(lookup_from(&[])).unwrap();
        assert_eq!(config.base_url, DEFAULT_BASE_URL);
        assert_eq!(config.limits, PageLimits::default());
        assert_eq!(config.budget, TokenBudget::default());
        assert!(config.token.is_none());
        assert_eq!(config.timeout, Duration::from_secs(60));
    }

    #[test]
    fn test_overrides() {
        let config = Config::from_lookup(lookup_from(&[
            ("STATGATE_BASE_URL", "http://localhost:8080/"),
            ("STATGATE_API_TOKEN", "secret"),
            ("STATGATE_CHUNK_SIZE", "500"),
            ("STATGATE_DEFAULT_LIMIT", "10"),
            ("STATGATE_MAX_LIMIT", "50"),
            ("STATGATE_MAX_TOKENS", "1000"),
            ("STATGATE_WARN_TOKENS", "800"),
            ("STATGATE_ALLOWED_ENDPOINTS", "a/b,c/d"),
        ]))
        .unwrap();
        assert_eq!(config.base_url, "http://localhost:8080");
        assert_eq!(config.token.as_deref(), Some("secret"));
        assert_eq!(config.limits.chunk_size, 500);
        assert_eq!(config.limits.default_limit, 10);
        assert_eq!(config.limits.max_limit, 50);
        assert_eq!(config.budget.max_tokens, 1000);
        assert_eq!(config.budget.warn_tokens, 800);
        assert!(config.allowed_endpoints.contains("c/d"));
    }

    #[test]
    fn test_rejects_bad_number() {
        let err = Config::from_lookup(lookup_from(&[("STATGATE_MAX_LIMIT", "lots")])).unwrap_err();
        assert!(matches!(err, StatGateError::Config(_)));
    }

    #[test]
    fn test_rejects_max_limit_above_chunk() {
        let err = Config::from_lookup(lookup_from(&[
            ("STATGATE_CHUNK_SIZE", "100"),
            ("STATGATE_MAX_LIMIT", "200"),
        ]))
        .unwrap_err();
        assert!(matches!(err, StatGateError::Config(_)));
    }

    #[test]
    fn test_rejects_warn_above_max() {
        let err = Config::from_lookup(lookup_from(&[
            ("STATGATE_MAX_TOKENS", "100"),
            ("STATGATE_WARN_TOKENS", "200"),
        ]))
        .unwrap_err();
        assert!(matches!(err, StatGateError::Config(_)));
    }

    #[test]
    fn test_rejects_non_http_url() {
        let err =
            Config::from_lookup(lookup_from(&[("STATGATE_BASE_URL", "ftp://example.com")]))
                .unwrap_err();
        assert!(matches!(err, StatGateError::Config(_)));
    }

    #[test]
    fn test_rejects_empty_allowlist() {
        let err = Config::from_lookup(lookup_from(&[("STATGATE_ALLOWED_ENDPOINTS", " , ")]))
            .unwrap_err();
        assert!(matches!(err, StatGateError::Config(_)));
    }
}
