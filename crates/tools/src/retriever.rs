//! Document retrieval tool.
//!
//! Exposes the retrieval index to the model as a tool: given a query, it
//! returns the top-ranked chunks of ingested documents joined into one
//! text block, plus a structured `results` payload with one entry per
//! chunk.

use async_trait::async_trait;
use ragweed_core::error::ToolError;
use ragweed_core::retrieval::{Retriever, ScoredChunk};
use ragweed_core::tool::{Tool, ToolOutput};
use std::sync::Arc;
use tracing::debug;

pub struct VectorRetrieverTool {
    retriever: Arc<dyn Retriever>,
    top_k: usize,
}

impl VectorRetrieverTool {
    pub fn new(retriever: Arc<dyn Retriever>, top_k: usize) -> Self {
        Self { retriever, top_k }
    }
}

#[async_trait]
impl Tool for VectorRetrieverTool {
    fn name(&self) -> &str {
        "vector_retriever"
    }

    fn description(&self) -> &str {
        "Search and summarize uploaded documents such as PDFs or theses. \
         Returns the most relevant passages from the ingested material."
    }

    fn parameters_schema(&self) -> serde_json::Value {
        serde_json::json!({
            "type": "object",
            "properties": {
                "query": {
                    "type": "string",
                    "description": "What to look for in the ingested documents"
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

        debug!(query, "Vector retrieval");

        let chunks = self
            .retriever
            .retrieve(query, self.top_k)
            .await
            .map_err(|e| ToolError::ExecutionFailed {
                tool_name: "vector_retriever".into(),
                reason: e.to_string(),
            })?;

        Ok(to_output(&chunks))
    }
}

fn to_output(chunks: &[ScoredChunk]) -> ToolOutput {
    if chunks.is_empty() {
        return ToolOutput::text("Empty Response");
    }

    let text = chunks
        .iter()
        .map(|c| c.content.as_str())
        .collect::<Vec<_>>()
        .join("\n---\n");

    let mut structured = serde_json::Map::new();
    structured.insert(
        "results".into(),
        serde_json::to_value(chunks).unwrap_or_default(),
    );

    ToolOutput {
        text,
        structured: Some(structured),
    }
}
