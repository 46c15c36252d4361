use rmcp::handler::server::router::tool::ToolRouter;
use rmcp::handler::server::wrapper::Parameters;
use rmcp::model::*;
use rmcp::{tool, tool_handler, tool_router, ServerHandler};

use crate::client::HttpStatClient;
use crate::config::Config;
use crate::error::StatGateError;
use crate::gateway::Gateway;

// Tool parameter types
use crate::tools::describe::DatasetDescribeParams;
use crate::tools::query::DatasetQueryParams;

/// The statgate-mcp server. Holds the request pipeline and routes both tools.
#[derive(Debug, Clone)]
pub struct StatGateMcp {
    gateway: Gateway<HttpStatClient>,
    tool_router: ToolRouter<Self>,
}

/// Helper to convert our Result<CallToolResult> to the ErrorData variant.
fn map_err(r: crate::error::Result<CallToolResult>) -> Result<CallToolResult, ErrorData> {
    r.map_err(|e| {
        if !e.is_client_error() {
            tracing::error!(error = %e, "tool call failed");
        }
        ErrorData::from(e)
    })
}

#[tool_router]
impl StatGateMcp {
    pub fn new(config: Config) -> std::result::Result<Self, StatGateError> {
        let client = HttpStatClient::new(&config)?;
        Ok(Self {
            gateway: Gateway::new(client, &config),
            tool_router: Self::tool_router(),
        })
    }

    #[tool(description = "Use this when you need records from a statistical dataset endpoint. Returns JSON {results, pagination}. Page with either `page` or `offset` (not both) plus `limit`; follow `pagination.next_page` while `has_more` is true. Use `fields` to return only the columns you need and `filters` to narrow rows. Oversized responses are rejected with suggestions instead of being truncated.")]
    async fn dataset_query(&self, Parameters(p): Parameters<DatasetQueryParams>) -> Result<CallToolResult, ErrorData> {
        map_err(crate::tools::query::dataset_query(&self.gateway, p).await)
    }

    #[tool(description = "Use this when you need to learn what a dataset endpoint contains before querying it. Returns the selectable field names, one sample record, the total row count, and the number of pages at the given limit.")]
    async fn dataset_describe(&self, Parameters(p): Parameters<DatasetDescribeParams>) -> Result<CallToolResult, ErrorData> {
        map_err(crate::tools::describe::dataset_describe(&self.gateway, p).await)
    }
}

#[tool_handler]
impl ServerHandler for StatGateMcp {
    fn get_info(&self) -> ServerInfo {
        let limits = self.gateway.limits();
        let endpoints: Vec<&str> = self.gateway.allowed_endpoints().iter().collect();
        ServerInfo {
            protocol_version: ProtocolVersion::V_2024_11_05,
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            server_info: Implementation {
                name: "statgate-mcp".to_string(),
                version: env!("CARGO_PKG_VERSION").to_string(),
                title: None,
                description: None,
                icons: None,
                website_url: None,
            },
            instructions: Some(format!(
                "Paginated access to a statistical data API. Call dataset_describe first to see \
                 fields and row counts, then dataset_query page by page. Page size defaults to {} \
                 and may not exceed {}; each response must stay under {} estimated tokens. \
                 Available endpoints: {}.",
                limits.default_limit,
                limits.max_limit,
                self.gateway.budget().max_tokens,
                endpoints.join(", ")
            )),
        }
    }
}
