//! Wikipedia search tool.
//!
//! Queries the MediaWiki search API for the top matching page and returns
//! its title plus a plain-text intro extract, truncated to the configured
//! character budget.

use crate::truncate_chars;
use async_trait::async_trait;
use ragweed_core::error::ToolError;
use ragweed_core::tool::{Tool, ToolOutput};
use serde::Deserialize;
use tracing::debug;

const API_URL: &str = "https://en.wikipedia.org/w/api.php";

pub struct WikipediaTool {
    client: reqwest::Client,
    max_chars: usize,
}

impl WikipediaTool {
    pub fn new(max_chars: usize) -> Self {
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(30))
            .build()
            .expect("Failed to create HTTP client");
        Self { client, max_chars }
    }
}

#[async_trait]
impl Tool for WikipediaTool {
    fn name(&self) -> &str {
        "wikipedia"
    }

    fn description(&self) -> &str {
        "Look up encyclopedic information on Wikipedia. Returns the title and \
         summary of the most relevant article."
    }

    fn parameters_schema(&self) -> serde_json::Value {
        serde_json::json!({
            "type": "object",
            "properties": {
                "query": {
                    "type": "string",
                    "description": "The topic to look up"
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

        debug!(query, "Wikipedia lookup");

        let response = self
            .client
            .get(API_URL)
            .query(&[
                ("action", "query"),
                ("format", "json"),
                ("prop", "extracts"),
                ("exintro", "1"),
                ("explaintext", "1"),
                ("generator", "search"),
                ("gsrsearch", query),
                ("gsrlimit", "1"),
            ])
            .send()
            .await
            .map_err(|e| ToolError::ExecutionFailed {
                tool_name: "wikipedia".into(),
                reason: e.to_string(),
            })?;

        if !response.status().is_success() {
            return Err(ToolError::ExecutionFailed {
                tool_name: "wikipedia".into(),
                reason: format!("API returned status {}", response.status()),
            });
        }

        let body: QueryResponse =
            response
                .json()
                .await
                .map_err(|e| ToolError::ExecutionFailed {
                    tool_name: "wikipedia".into(),
                    reason: format!("Failed to parse response: {e}"),
                })?;

        Ok(ToolOutput::text(format_page(&body, self.max_chars)))
    }
}

/// Render the top page as "Page: …\nSummary: …", or a no-result notice.
fn format_page(response: &QueryResponse, max_chars: usize) -> String {
    let page = response
        .query
        .as_ref()
        .and_then(|q| q.pages.values().min_by_key(|p| p.index.unwrap_or(u32::MAX)));

    match page {
        Some(page) => format!(
            "Page: {}\nSummary: {}",
            page.title,
            truncate_chars(page.extract.as_deref().unwrap_or(""), max_chars)
        ),
        None => "No good Wikipedia result found".into(),
    }
}

#[derive(Debug, Deserialize)]
struct QueryResponse {
    query: Option<QueryBody>,
}

#[derive(Debug, Deserialize)]
struct QueryBody {
    pages: std::collections::HashMap<String, Page>,
}

#[derive(Debug, Deserialize)]
struct Page {
    title: String,
    #[serde(default)]
    extract: Option<String>,
    #[serde(default)]
    index: Option<u32>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tool_definition() {
        let tool = WikipediaTool::new(200);
        let def = tool.to_definition();
        assert_eq!(def.name, "wikipedia");
        assert!(!def.description.is_empty());
    }

    #[tokio::test]
    async fn missing_query_returns_error() {
        let tool = WikipediaTool::new(200);
        let err = tool.invoke(serde_json::Map::new()).await.unwrap_err();
        assert!(matches!(err, ToolError::InvalidArguments(_)));
    }

    #[test]
    fn parse_and_format_search_result() {
        let data = r#"{
            "query": {
                "pages": {
                    "12345": {
                        "pageid": 12345,
                        "title": "Rust (programming language)",
                        "index": 1,
                        "extract": "Rust is a general-purpose programming language emphasizing performance and safety."
                    }
                }
            }
        }"#;
        let response: QueryResponse = serde_json::from_str(data).unwrap();
        let text = format_page(&response, 200);
        assert!(text.starts_with("Page: Rust (programming language)"));
        assert!(text.contains("Summary: Rust is a general-purpose"));
    }

    #[test]
    fn format_truncates_long_extract() {
        let data = r#"{
            "query": {
                "pages": {
                    "1": {"title": "Long", "index": 1, "extract": "abcdefghij"}
                }
            }
        }"#;
        let response: QueryResponse = serde_json::from_str(data).unwrap();
        let text = format_page(&response, 4);
        assert!(text.contains("Summary: abcd…"));
    }

    #[test]
    fn empty_query_body_reports_no_result() {
        let response: QueryResponse = serde_json::from_str("{}").unwrap();
        assert_eq!(format_page(&response, 200), "No good Wikipedia result found");
    }
}
