//! arXiv search tool.
//!
//! Queries the arXiv Atom export API for the top matching paper and
//! returns its publication date, title, and truncated abstract.

use crate::truncate_chars;
use async_trait::async_trait;
use ragweed_core::error::ToolError;
use ragweed_core::tool::{Tool, ToolOutput};
use tracing::debug;

const API_URL: &str = "http://export.arxiv.org/api/query";

pub struct ArxivTool {
    client: reqwest::Client,
    max_chars: usize,
}

impl ArxivTool {
    pub fn new(max_chars: usize) -> Self {
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(30))
            .build()
            .expect("Failed to create HTTP client");
        Self { client, max_chars }
    }
}

#[async_trait]
impl Tool for ArxivTool {
    fn name(&self) -> &str {
        "arxiv"
    }

    fn description(&self) -> &str {
        "Search arXiv for academic papers. Returns the publication date, \
         title, and abstract of the most relevant paper."
    }

    fn parameters_schema(&self) -> serde_json::Value {
        serde_json::json!({
            "type": "object",
            "properties": {
                "query": {
                    "type": "string",
                    "description": "The research topic or paper to search for"
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

        debug!(query, "arXiv search");

        let search_query = format!("all:{query}");
        let response = self
            .client
            .get(API_URL)
            .query(&[
                ("search_query", search_query.as_str()),
                ("start", "0"),
                ("max_results", "1"),
            ])
            .send()
            .await
            .map_err(|e| ToolError::ExecutionFailed {
                tool_name: "arxiv".into(),
                reason: e.to_string(),
            })?;

        if !response.status().is_success() {
            return Err(ToolError::ExecutionFailed {
                tool_name: "arxiv".into(),
                reason: format!("API returned status {}", response.status()),
            });
        }

        let feed = response
            .text()
            .await
            .map_err(|e| ToolError::ExecutionFailed {
                tool_name: "arxiv".into(),
                reason: e.to_string(),
            })?;

        Ok(ToolOutput::text(format_entry(&feed, self.max_chars)))
    }
}

/// Render the first feed entry, or a no-result notice.
fn format_entry(feed: &str, max_chars: usize) -> String {
    let Some(entry) = tag_content(feed, "entry") else {
        return "No good arXiv result found".into();
    };

    let title = tag_content(entry, "title")
        .map(normalize_whitespace)
        .unwrap_or_else(|| "(untitled)".into());
    let summary = tag_content(entry, "summary")
        .map(normalize_whitespace)
        .unwrap_or_default();
    let published = tag_content(entry, "published").unwrap_or("").trim();

    format!(
        "Published: {}\nTitle: {}\nSummary: {}",
        published,
        title,
        truncate_chars(&summary, max_chars)
    )
}

/// The text between the first `<tag…>` and `</tag>`. The Atom feed is
/// flat enough that tag scanning is sufficient here.
fn tag_content<'a>(xml: &'a str, tag: &str) -> Option<&'a str> {
    let open = format!("<{tag}");
    let close = format!("</{tag}>");

    let start = xml.find(&open)?;
    let body_start = start + xml[start..].find('>')? + 1;
    let body_end = body_start + xml[body_start..].find(&close)?;
    Some(&xml[body_start..body_end])
}

fn normalize_whitespace(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE_FEED: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<feed xmlns="http://www.w3.org/2005/Atom">
  <title type="html">ArXiv Query: search_query=all:attention</title>
  <entry>
    <id>http://arxiv.org/abs/1706.03762v7</id>
    <published>2017-06-12T17:57:34Z</published>
    <title>Attention Is All You Need</title>
    <summary>The dominant sequence transduction models are based on complex
      recurrent or convolutional neural networks.</summary>
    <author><name>Ashish Vaswani</name></author>
  </entry>
</feed>"#;

    #[test]
    fn tool_definition() {
        let tool = ArxivTool::new(200);
        let def = tool.to_definition();
        assert_eq!(def.name, "arxiv");
        assert!(def.parameters.to_string().contains("query"));
    }

    #[tokio::test]
    async fn missing_query_returns_error() {
        let tool = ArxivTool::new(200);
        let err = tool.invoke(serde_json::Map::new()).await.unwrap_err();
        assert!(matches!(err, ToolError::InvalidArguments(_)));
    }

    #[test]
    fn parse_and_format_feed_entry() {
        let text = format_entry(SAMPLE_FEED, 200);
        assert!(text.contains("Published: 2017-06-12T17:57:34Z"));
        assert!(text.contains("Title: Attention Is All You Need"));
        assert!(text.contains("Summary: The dominant sequence transduction"));
        // Multi-line summary collapses to single spaces
        assert!(!text.contains("\n      recurrent"));
    }

    #[test]
    fn format_respects_char_budget() {
        let text = format_entry(SAMPLE_FEED, 20);
        let summary = text.split("Summary: ").nth(1).unwrap();
        assert_eq!(summary.chars().count(), 21); // 20 + ellipsis
    }

    #[test]
    fn feed_without_entries_reports_no_result() {
        let feed = r#"<feed><title>empty</title></feed>"#;
        assert_eq!(format_entry(feed, 200), "No good arXiv result found");
    }

    #[test]
    fn tag_content_finds_first_match() {
        let xml = "<a><b>one</b><b>two</b></a>";
        assert_eq!(tag_content(xml, "b"), Some("one"));
        assert_eq!(tag_content(xml, "c"), None);
    }
}
