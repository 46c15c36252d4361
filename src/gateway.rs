//! Request pipeline
//!
//! Runs one caller request end to end: allowlist and filter checks,
//! pagination normalization, chunk planning, upstream fetch, slicing,
//! field projection, metadata, and finally the token budget check on the
//! exact string that will be returned.

use std::collections::BTreeMap;

use serde_json::Value;

use crate::client::{StatClient, UpstreamChunk};
use crate::config::Config;
use crate::endpoints::{self, EndpointAllowlist};
use crate::error::Result;
use crate::governor::{self, TokenBudget, TokenEstimate};
use crate::pagination::{
    assemble_window, calculate_metadata, normalize, plan_window, PageLimits, PaginationMetadata,
    PaginationRequest, UpstreamPageRef,
};
use crate::projection;
use crate::response::{self, EndpointSummary};

/// A paginated query against one upstream endpoint.
#[derive(Debug, Clone, Default)]
pub struct QueryRequest {
    pub endpoint: String,
    pub filters: BTreeMap<String, String>,
    pub pagination: PaginationRequest,
    pub fields: Option<Vec<String>>,
}

/// A request for an endpoint's schema and size.
#[derive(Debug, Clone, Default)]
pub struct DescribeRequest {
    pub endpoint: String,
    pub filters: BTreeMap<String, String>,
    pub pagination: PaginationRequest,
}

/// A response body that has passed the token budget, plus what was measured.
#[derive(Debug, Clone)]
pub struct Governed<M> {
    pub body: String,
    pub estimate: TokenEstimate,
    pub meta: M,
}

#[derive(Debug, Clone)]
pub struct Gateway<C> {
    client: C,
    limits: PageLimits,
    budget: TokenBudget,
    allowed: EndpointAllowlist,
}

impl<C: StatClient> Gateway<C> {
    pub fn new(client: C, config: &Config) -> Self {
        Self {
            client,
            limits: config.limits,
            budget: config.budget,
            allowed: config.allowed_endpoints.clone(),
        }
    }

    pub fn limits(&self) -> &PageLimits {
        &self.limits
    }

    pub fn budget(&self) -> &TokenBudget {
        &self.budget
    }

    pub fn allowed_endpoints(&self) -> &EndpointAllowlist {
        &self.allowed
    }

    /// Serve one caller page.
    pub async fn query(&self, request: &QueryRequest) -> Result<Governed<PaginationMetadata>> {
        let endpoint = self.allowed.check(&request.endpoint)?;
        endpoints::validate_filters(&request.filters)?;
        let window = normalize(&request.pagination, &self.limits)?;

        let plan = plan_window(&window, self.limits.chunk_size);
        tracing::debug!(
            endpoint = %endpoint,
            page = window.page,
            offset = window.offset,
            limit = window.limit,
            chunks = plan.len(),
            "planned upstream fetch"
        );
        let fetched = self.fetch_plan(&endpoint, &request.filters, &plan).await?;

        let total_count = fetched.first().map(|(_, c)| c.total()).unwrap_or(0);
        let records = assemble_window(
            fetched
                .iter()
                .map(|(r, c)| (r.api_offset, c.results.as_slice())),
            &window,
        );

        let fields = request.fields.as_deref().filter(|f| !f.is_empty());
        if let Some(fields) = fields {
            let sample = self
                .sample_record(&endpoint, &request.filters, &fetched, total_count)
                .await?;
            match sample {
                Some(sample) => projection::validate_field_names(fields, &sample)?,
                None => tracing::debug!(
                    endpoint = %endpoint,
                    "upstream returned no records; skipping field validation"
                ),
            }
        }
        let results = projection::select_fields(&records, fields);

        let pagination = calculate_metadata(total_count, window.page, window.limit, results.len());
        let body = response::render_page(&results, &pagination)?;
        let estimate = governor::enforce_budget(&body, &self.budget, Some(window.limit))?;

        Ok(Governed {
            body,
            estimate,
            meta: pagination,
        })
    }

    /// Report field names, a sample record, and page counts for an endpoint.
    pub async fn describe(&self, request: &DescribeRequest) -> Result<Governed<EndpointSummary>> {
        let endpoint = self.allowed.check(&request.endpoint)?;
        endpoints::validate_filters(&request.filters)?;
        let window = normalize(&request.pagination, &self.limits)?;

        let chunk = self
            .client
            .fetch_chunk(&endpoint, &request.filters, 1, self.limits.chunk_size)
            .await?;
        let sample = chunk.results.first().cloned().unwrap_or(Value::Null);
        let total_count = chunk.total();
        let pagination = calculate_metadata(total_count, 1, window.limit, 0);

        let summary = EndpointSummary {
            endpoint,
            total_count,
            page_size: window.limit,
            total_pages: pagination.total_pages,
            fields: projection::field_names(&sample),
            sample: (!sample.is_null()).then_some(sample),
        };
        let body = response::render_summary(&summary)?;
        let estimate = governor::enforce_budget(&body, &self.budget, None)?;

        Ok(Governed {
            body,
            estimate,
            meta: summary,
        })
    }

    /// A record to validate field names against.
    ///
    /// Taken from the first fetched chunk when it has rows. A window past the
    /// end of a non-empty dataset lands on an empty chunk, so the first
    /// upstream chunk is fetched once for a sample instead.
    async fn sample_record(
        &self,
        endpoint: &str,
        filters: &BTreeMap<String, String>,
        fetched: &[(UpstreamPageRef, UpstreamChunk)],
        total_count: u64,
    ) -> Result<Option<Value>> {
        if let Some(sample) = fetched.first().and_then(|(_, c)| c.results.first()) {
            return Ok(Some(sample.clone()));
        }
        let already_fetched_first = fetched.first().is_some_and(|(r, _)| r.api_page == 1);
        if total_count == 0 || already_fetched_first {
            return Ok(None);
        }
        let chunk = self
            .client
            .fetch_chunk(endpoint, filters, 1, self.limits.chunk_size)
            .await?;
        tracing::debug!(
            records = chunk.results.len(),
            "fetched first upstream chunk for field validation"
        );
        Ok(chunk.results.into_iter().next())
    }

    /// Fetch planned chunks in order, stopping once the upstream has no more rows.
    async fn fetch_plan(
        &self,
        endpoint: &str,
        filters: &BTreeMap<String, String>,
        plan: &[UpstreamPageRef],
    ) -> Result<Vec<(UpstreamPageRef, UpstreamChunk)>> {
        let chunk_size = self.limits.chunk_size;
        let mut fetched: Vec<(UpstreamPageRef, UpstreamChunk)> = Vec::with_capacity(plan.len());
        for page_ref in plan {
            if let Some((prev_ref, prev)) = fetched.last() {
                let returned = prev.results.len() as u64;
                if returned < chunk_size || prev_ref.api_offset + returned >= prev.total() {
                    break;
                }
            }
            let chunk = self
                .client
                .fetch_chunk(endpoint, filters, page_ref.api_page, chunk_size)
                .await?;
            tracing::debug!(
                api_page = page_ref.api_page,
                records = chunk.results.len(),
                total_count = chunk.total(),
                "fetched upstream chunk"
            );
            fetched.push((*page_ref, chunk));
        }
        Ok(fetched)
    }
}
