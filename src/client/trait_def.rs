use std::collections::BTreeMap;
use std::fmt::Debug;

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::Value;

use crate::error::Result;

/// One upstream fetch: up to a chunk's worth of records plus the upstream's total row count.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct UpstreamChunk {
    #[serde(default)]
    pub results: Vec<Value>,
    #[serde(rename = "count", default)]
    pub total_count: Option<u64>,
}

impl UpstreamChunk {
    pub fn new(results: Vec<Value>, total_count: u64) -> Self {
        Self {
            results,
            total_count: Some(total_count),
        }
    }

    /// Reported total, falling back to the number of records in this chunk.
    pub fn total(&self) -> u64 {
        self.total_count.unwrap_or(self.results.len() as u64)
    }
}

/// Trait abstracting the upstream data source.
///
/// Implementations fetch exactly one chunk per call and never retry.
#[async_trait]
pub trait StatClient: Send + Sync + Debug {
    /// Fetch upstream page `api_page` (1-based) of `endpoint`, asking for `per_page` rows.
    async fn fetch_chunk(
        &self,
        endpoint: &str,
        filters: &BTreeMap<String, String>,
        api_page: u64,
        per_page: u64,
    ) -> Result<UpstreamChunk>;
}
