use std::collections::BTreeMap;

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, AUTHORIZATION};

use crate::config::Config;
use crate::endpoints;
use crate::error::{Result, StatGateError};

use super::{StatClient, UpstreamChunk};

/// HTTP client wrapper for the upstream statistics REST API.
#[derive(Debug, Clone)]
pub struct HttpStatClient {
    http: reqwest::Client,
    base_url: String,
}

impl HttpStatClient {
    /// Create a new client from configuration.
    pub fn new(config: &Config) -> Result<Self> {
        let mut headers = HeaderMap::new();
        if let Some(token) = &config.token {
            headers.insert(
                AUTHORIZATION,
                HeaderValue::from_str(&format!("Bearer {token}"))
                    .map_err(|e| StatGateError::Api(format!("Invalid token header: {e}")))?,
            );
        }
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));

        let http = reqwest::Client::builder()
            .default_headers(headers)
            .user_agent("statgate-mcp")
            .timeout(config.timeout)
            .build()
            .map_err(|e| StatGateError::Api(format!("Failed to build HTTP client: {e}")))?;

        Ok(Self {
            http,
            base_url: config.base_url.clone(),
        })
    }

    /// Build the full URL for a canonical endpoint path.
    fn url(&self, endpoint: &str) -> String {
        format!("{}{}", self.base_url, endpoints::request_path(endpoint))
    }

    /// Handle a response: check status, deserialize the chunk.
    async fn handle_response(&self, resp: reqwest::Response) -> Result<UpstreamChunk> {
        let status = resp.status();
        if status == reqwest::StatusCode::UNAUTHORIZED
            || status == reqwest::StatusCode::FORBIDDEN
        {
            return Err(StatGateError::Auth);
        }
        if status == reqwest::StatusCode::NOT_FOUND {
            let url = resp.url().to_string();
            return Err(StatGateError::NotFound(url));
        }
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(StatGateError::Api(format!("HTTP {status}: {body}")));
        }
        let body = resp.text().await?;
        let chunk = serde_json::from_str::<UpstreamChunk>(&body)?;
        Ok(chunk)
    }
}

#[async_trait]
impl StatClient for HttpStatClient {
    async fn fetch_chunk(
        &self,
        endpoint: &str,
        filters: &BTreeMap<String, String>,
        api_page: u64,
        per_page: u64,
    ) -> Result<UpstreamChunk> {
        let mut query: Vec<(&str, String)> = filters
            .iter()
            .map(|(k, v)| (k.as_str(), v.clone()))
            .collect();
        query.push(("page", api_page.to_string()));
        query.push(("per_page", per_page.to_string()));

        tracing::debug!(endpoint, api_page, per_page, "fetching upstream chunk");
        let resp = self.http.get(self.url(endpoint)).query(&query).send().await?;
        self.handle_response(resp).await
    }
}
