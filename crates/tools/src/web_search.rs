//! Web search tool backed by the Tavily search API.
//!
//! Returns a ranked list of results. The list is also attached as the
//! structured `results` payload, so each result surfaces individually as
//! retrieved evidence in the turn result.

use async_trait::async_trait;
use ragweed_core::error::ToolError;
use ragweed_core::tool::{Tool, ToolOutput};
use serde::{Deserialize, Serialize};
use tracing::debug;

const API_URL: &str = "https://api.tavily.com/search";

pub struct WebSearchTool {
    client: reqwest::Client,
    api_key: String,
    max_results: usize,
}

impl WebSearchTool {
    pub fn new(api_key: impl Into<String>, max_results: usize) -> Self {
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(30))
            .build()
            .expect("Failed to create HTTP client");
        Self {
            client,
            api_key: api_key.into(),
            max_results,
        }
    }
}

#[async_trait]
impl Tool for WebSearchTool {
    fn name(&self) -> &str {
        "web_search"
    }

    fn description(&self) -> &str {
        "Search the web for current information. Returns a list of relevant \
         results with titles, URLs, and content snippets."
    }

    fn parameters_schema(&self) -> serde_json::Value {
        serde_json::json!({
            "type": "object",
            "properties": {
                "query": {
                    "type": "string",
                    "description": "The search query"
                },
                "max_results": {
                    "type": "integer",
                    "description": "Number of results to return (default 3)",
                    "default": 3
                }
            },
            "required": ["query"]
        })
    }

    async fn invoke(
        &self,
        arguments: serde_json::Map<String, serde_json::Value>,
    ) -> Result<ToolOutput, ToolError> {
        let query = arguments
            .get("query")
            .and_then(|v| v.as_str())
            .ok_or_else(|| ToolError::InvalidArguments("Missing 'query' argument".into()))?;

        let max_results = arguments
            .get("max_results")
            .and_then(|v| v.as_u64())
            .map(|n| n.min(10) as usize)
            .unwrap_or(self.max_results);

        debug!(query, max_results, "Web search");

        let body = serde_json::json!({
            "api_key": self.api_key,
            "query": query,
            "max_results": max_results,
        });

        let response = self
            .client
            .post(API_URL)
            .header("Content-Type", "application/json")
            .json(&body)
            .send()
            .await
            .map_err(|e| ToolError::ExecutionFailed {
                tool_name: "web_search".into(),
                reason: e.to_string(),
            })?;

        if !response.status().is_success() {
            return Err(ToolError::ExecutionFailed {
                tool_name: "web_search".into(),
                reason: format!("API returned status {}", response.status()),
            });
        }

        let api_response: TavilyResponse =
            response
                .json()
                .await
                .map_err(|e| ToolError::ExecutionFailed {
                    tool_name: "web_search".into(),
                    reason: format!("Failed to parse response: {e}"),
                })?;

        Ok(to_output(api_response))
    }
}

/// Text for the model plus the structured `results` payload.
fn to_output(response: TavilyResponse) -> ToolOutput {
    let results = response.results;
    let text = serde_json::to_string_pretty(&results).unwrap_or_default();

    let mut structured = serde_json::Map::new();
    structured.insert(
        "results".into(),
        serde_json::to_value(&results).unwrap_or_default(),
    );

    ToolOutput {
        text,
        structured: Some(structured),
    }
}

#[derive(Debug, Deserialize)]
struct TavilyResponse {
    #[serde(default)]
    results: Vec<SearchResult>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct SearchResult {
    title: String,
    url: String,
    content: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    score: Option<f64>,
}
