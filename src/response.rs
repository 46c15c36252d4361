use serde::Serialize;
use serde_json::Value;

use crate::error::Result;
use crate::pagination::PaginationMetadata;

/// The caller-facing page: records plus navigation metadata.
#[derive(Debug, Serialize)]
pub struct PageResponse<'a> {
    pub results: &'a [Value],
    pub pagination: &'a PaginationMetadata,
}

/// What `dataset_describe` reports about an endpoint.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EndpointSummary {
    pub endpoint: String,
    pub total_count: u64,
    /// Page size the page counts below were computed with.
    pub page_size: u64,
    pub total_pages: u64,
    /// Selectable field names, in upstream order.
    pub fields: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sample: Option<Value>,
}

/// Serialize a page as compact JSON.
///
/// Compact output keeps the token estimate honest: whitespace costs tokens too.
pub fn render_page(results: &[Value], pagination: &PaginationMetadata) -> Result<String> {
    Ok(serde_json::to_string(&PageResponse {
        results,
        pagination,
    })?)
}

/// Serialize an endpoint summary as compact JSON.
pub fn render_summary(summary: &EndpointSummary) -> Result<String> {
    Ok(serde_json::to_string(summary)?)
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use serde_json::json;

    use super::*;
    use crate::pagination::calculate_metadata;

    #[test]
    fn test_render_page_shape() {
        let results = vec![json!({"name": "Lincoln High"})];
        let meta = calculate_metadata(1, 1, 20, 1);
        let body = render_page(&results, &meta).unwrap();
        let parsed: Value = serde_json::from_str(&body).unwrap();
        assert_eq!(
            parsed,
            json!({
                "results": [{"name": "Lincoln High"}],
                "pagination": {
                    "total_count": 1,
                    "current_page": 1,
                    "page_size": 1,
                    "total_pages": 1,
                    "has_more": false,
                    "next_page": null
                }
            })
        );
        assert!(!body.contains('\n'));
    }

    #[test]
    fn test_render_summary_omits_missing_sample() {
        let summary = EndpointSummary {
            endpoint: "a/b".to_string(),
            total_count: 0,
            page_size: 20,
            total_pages: 0,
            fields: vec![],
            sample: None,
        };
        let body = render_summary(&summary).unwrap();
        assert!(!body.contains("sample"));
    }
}
