use std::collections::BTreeMap;

use rmcp::model::{CallToolResult, Content};
use schemars::JsonSchema;
use serde::Deserialize;
use serde_json::{Number, Value};

use crate::client::StatClient;
use crate::endpoints;
use crate::error::Result;
use crate::gateway::{Gateway, QueryRequest};
use crate::pagination::PaginationRequest;

#[derive(Debug, Default, Deserialize, JsonSchema)]
pub struct DatasetQueryParams {
    /// Dataset endpoint path, e.g. `api/v1/schools/ccd/directory/2022`.
    pub endpoint: String,
    /// Upstream filters by field name, e.g. `{"fips": 6}`. Lists become comma-separated values.
    pub filters: Option<BTreeMap<String, Value>>,
    /// Page number (1-based). Cannot be combined with `offset`.
    pub page: Option<Number>,
    /// Zero-based record offset. Cannot be combined with `page`.
    pub offset: Option<Number>,
    /// Records per page. Defaults to 20; the configured maximum applies.
    pub limit: Option<Number>,
    /// Only return these fields of each record. Omit or pass [] for all fields.
    pub fields: Option<Vec<String>>,
}

impl DatasetQueryParams {
    pub fn into_request(self) -> Result<QueryRequest> {
        let filters = match &self.filters {
            Some(raw) => endpoints::filter_values(raw)?,
            None => BTreeMap::new(),
        };
        Ok(QueryRequest {
            endpoint: self.endpoint,
            filters,
            pagination: PaginationRequest {
                page: self.page,
                offset: self.offset,
                limit: self.limit,
            },
            fields: self.fields,
        })
    }
}

pub async fn dataset_query<C: StatClient>(
    gateway: &Gateway<C>,
    params: DatasetQueryParams,
) -> Result<CallToolResult> {
    let request = params.into_request()?;
    let page = gateway.query(&request).await?;
    tracing::debug!(
        endpoint = %request.endpoint,
        page_size = page.meta.page_size,
        estimated_tokens = page.estimate.estimated_tokens,
        "served page"
    );

    Ok(CallToolResult::success(vec![Content::text(page.body)]))
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::error::StatGateError;

    #[test]
    fn test_params_into_request() {
        let params: DatasetQueryParams = serde_json::from_value(json!({
            "endpoint": "api/v1/schools/ccd/directory/2022",
            "filters": {"fips": 6, "charter": "yes"},
            "offset": 40,
            "limit": 20,
            "fields": ["school_name"]
        }))
        .unwrap();
        let request = params.into_request().unwrap();
        assert_eq!(request.filters["fips"], "6");
        assert_eq!(request.filters["charter"], "yes");
        assert_eq!(request.pagination.offset, Some(Number::from(40)));
        assert!(request.pagination.page.is_none());
        assert_eq!(request.fields, Some(vec!["school_name".to_string()]));
    }

    #[test]
    fn test_fractional_page_survives_deserialization() {
        let params: DatasetQueryParams =
            serde_json::from_value(json!({"endpoint": "x", "page": 1.5})).unwrap();
        let request = params.into_request().unwrap();
        assert_eq!(request.pagination.page.and_then(|n| n.as_f64()), Some(1.5));
    }

    #[test]
    fn test_bad_filter_value_rejected() {
        let params: DatasetQueryParams =
            serde_json::from_value(json!({"endpoint": "x", "filters": {"a": null}})).unwrap();
        assert!(matches!(
            params.into_request(),
            Err(StatGateError::InvalidFilter(_))
        ));
    }
}
