use std::collections::BTreeMap;

use rmcp::model::{CallToolResult, Content};
use schemars::JsonSchema;
use serde::Deserialize;
use serde_json::{Number, Value};

use crate::client::StatClient;
use crate::endpoints;
use crate::error::Result;
use crate::gateway::{DescribeRequest, Gateway};
use crate::pagination::PaginationRequest;

#[derive(Debug, Default, Deserialize, JsonSchema)]
pub struct DatasetDescribeParams {
    /// Dataset endpoint path, e.g. `api/v1/schools/ccd/directory/2022`.
    pub endpoint: String,
    /// Upstream filters by field name, applied before counting.
    pub filters: Option<BTreeMap<String, Value>>,
    /// Page size to compute `total_pages` with. Defaults to 20.
    pub limit: Option<Number>,
}

pub async fn dataset_describe<C: StatClient>(
    gateway: &Gateway<C>,
    params: DatasetDescribeParams,
) -> Result<CallToolResult> {
    let filters = match &params.filters {
        Some(raw) => endpoints::filter_values(raw)?,
        None => BTreeMap::new(),
    };
    let request = DescribeRequest {
        endpoint: params.endpoint,
        filters,
        pagination: PaginationRequest {
            limit: params.limit,
            ..Default::default()
        },
    };
    let summary = gateway.describe(&request).await?;

    Ok(CallToolResult::success(vec![Content::text(summary.body)]))
}
