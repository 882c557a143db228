//! Retriever trait — the interface to vector retrieval over ingested
//! documents.
//!
//! The agent core does not know how documents were chunked, embedded, or
//! stored; it only depends on `retrieve(query) -> ranked chunks`. The
//! in-memory index lives in its own crate.

use crate::error::RetrievalError;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// One retrieved chunk of document text, ranked by relevance.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoredChunk {
    /// The chunk text.
    pub content: String,

    /// Where the chunk came from (file name, URL), when known.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,

    /// Relevance score, higher is better.
    pub score: f32,
}

/// The retrieval capability the agent depends on.
#[async_trait]
pub trait Retriever: Send + Sync {
    /// The retriever name (e.g., "in_memory_index").
    fn name(&self) -> &str;

    /// Return up to `top_k` chunks ranked by relevance to `query`.
    async fn retrieve(
        &self,
        query: &str,
        top_k: usize,
    ) -> std::result::Result<Vec<ScoredChunk>, RetrievalError>;
}
