//! In-memory document index implementing the `Retriever` trait.

use crate::vector::cosine_similarity;
use async_trait::async_trait;
use ragweed_core::error::RetrievalError;
use ragweed_core::provider::{EmbeddingRequest, Provider};
use ragweed_core::retrieval::{Retriever, ScoredChunk};
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, warn};

/// One stored chunk of document text.
#[derive(Debug, Clone)]
struct IndexedChunk {
    content: String,
    source: Option<String>,
    embedding: Option<Vec<f32>>,
}

/// An in-memory retrieval index.
///
/// With an embedding provider bound, ingestion embeds each chunk and
/// queries rank by cosine similarity. Without one, ranking falls back to
/// keyword occurrence scoring, which keeps the retriever usable offline
/// and in tests.
pub struct InMemoryIndex {
    chunks: RwLock<Vec<IndexedChunk>>,
    embedder: Option<Arc<dyn Provider>>,
    embedding_model: String,
}

impl InMemoryIndex {
    /// Keyword-only index.
    pub fn new() -> Self {
        Self {
            chunks: RwLock::new(Vec::new()),
            embedder: None,
            embedding_model: String::new(),
        }
    }

    /// Bind an embedding provider and model for vector ranking.
    pub fn with_embedder(mut self, provider: Arc<dyn Provider>, model: impl Into<String>) -> Self {
        self.embedder = Some(provider);
        self.embedding_model = model.into();
        self
    }

    /// Ingest pre-split chunks. Returns the total chunk count afterwards.
    pub async fn ingest(
        &self,
        chunks: Vec<(String, Option<String>)>,
    ) -> Result<usize, RetrievalError> {
        if chunks.is_empty() {
            return Ok(0);
        }

        let embeddings = match &self.embedder {
            Some(provider) => {
                let inputs: Vec<String> = chunks.iter().map(|(c, _)| c.clone()).collect();
                let response = provider
                    .embed(EmbeddingRequest {
                        model: self.embedding_model.clone(),
                        inputs,
                    })
                    .await
                    .map_err(|e| RetrievalError::EmbeddingFailed(e.to_string()))?;

                if response.embeddings.len() != chunks.len() {
                    return Err(RetrievalError::EmbeddingFailed(format!(
                        "expected {} embeddings, got {}",
                        chunks.len(),
                        response.embeddings.len()
                    )));
                }
                response.embeddings.into_iter().map(Some).collect()
            }
            None => vec![None; chunks.len()],
        };

        let mut store = self.chunks.write().await;
        for ((content, source), embedding) in chunks.into_iter().zip(embeddings) {
            store.push(IndexedChunk {
                content,
                source,
                embedding,
            });
        }

        debug!(total = store.len(), "Index updated");
        Ok(store.len())
    }

    /// Number of stored chunks.
    pub async fn len(&self) -> usize {
        self.chunks.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.chunks.read().await.is_empty()
    }

    /// Keyword occurrence score, normalized by chunk length.
    fn keyword_score(content: &str, query: &str) -> f32 {
        let query = query.to_lowercase();
        if query.is_empty() {
            return 0.0;
        }
        let content_lower = content.to_lowercase();
        let occurrences = content_lower.matches(&query).count();
        occurrences as f32 / (content.len() as f32 / 100.0).max(1.0)
    }
}

impl Default for InMemoryIndex {
    fn default() -> Self {
        Self::new()
    }
}

/// Split plain text into paragraph chunks on blank lines.
pub fn split_paragraphs(text: &str) -> Vec<String> {
    text.split("\n\n")
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .map(str::to_string)
        .collect()
}

#[async_trait]
impl Retriever for InMemoryIndex {
    fn name(&self) -> &str {
        "in_memory_index"
    }

    async fn retrieve(
        &self,
        query: &str,
        top_k: usize,
    ) -> Result<Vec<ScoredChunk>, RetrievalError> {
        let chunks = self.chunks.read().await;
        if chunks.is_empty() {
            return Ok(Vec::new());
        }

        let mut results: Vec<ScoredChunk> = match &self.embedder {
            Some(provider) => {
                let response = provider
                    .embed(EmbeddingRequest {
                        model: self.embedding_model.clone(),
                        inputs: vec![query.to_string()],
                    })
                    .await
                    .map_err(|e| RetrievalError::EmbeddingFailed(e.to_string()))?;

                let query_embedding = response
                    .embeddings
                    .into_iter()
                    .next()
                    .ok_or_else(|| {
                        RetrievalError::EmbeddingFailed("no embedding returned for query".into())
                    })?;

                chunks
                    .iter()
                    .filter_map(|chunk| {
                        let embedding = chunk.embedding.as_ref()?;
                        Some(ScoredChunk {
                            content: chunk.content.clone(),
                            source: chunk.source.clone(),
                            score: cosine_similarity(embedding, &query_embedding),
                        })
                    })
                    .collect()
            }
            None => chunks
                .iter()
                .map(|chunk| ScoredChunk {
                    content: chunk.content.clone(),
                    source: chunk.source.clone(),
                    score: Self::keyword_score(&chunk.content, query),
                })
                .filter(|c| c.score > 0.0)
                .collect(),
        };

        results.sort_by(|a, b| {
            b.score
                .partial_cmp(&a.score)
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        results.truncate(top_k);

        if results.is_empty() {
            warn!(query, "No chunks retrieved");
        }
        Ok(results)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ragweed_core::error::ProviderError;
    use ragweed_core::provider::{ChatRequest, ChatResponse, EmbeddingResponse};

    /// Embeds each text as a tiny keyword-presence vector, so similarity
    /// ranking is deterministic in tests.
    struct StubEmbedder;

    #[async_trait]
    impl Provider for StubEmbedder {
        fn name(&self) -> &str {
            "stub"
        }

        async fn complete(&self, _request: ChatRequest) -> Result<ChatResponse, ProviderError> {
            Err(ProviderError::NotConfigured("completions unsupported".into()))
        }

        async fn embed(
            &self,
            request: EmbeddingRequest,
        ) -> Result<EmbeddingResponse, ProviderError> {
            let embeddings = request
                .inputs
                .iter()
                .map(|text| {
                    let t = text.to_lowercase();
                    vec![
                        t.contains("rust") as u8 as f32,
                        t.contains("python") as u8 as f32,
                        t.contains("ocaml") as u8 as f32,
                    ]
                })
                .collect();
            Ok(EmbeddingResponse {
                embeddings,
                model: request.model,
                usage: None,
            })
        }
    }

    #[tokio::test]
    async fn keyword_retrieval_ranks_matches() {
        let index = InMemoryIndex::new();
        index
            .ingest(vec![
                ("Rust enforces memory safety".into(), Some("a.md".into())),
                ("Python is dynamically typed".into(), Some("b.md".into())),
                ("Rust and Rust again: Rust".into(), Some("c.md".into())),
            ])
            .await
            .unwrap();

        let results = index.retrieve("rust", 10).await.unwrap();
        assert_eq!(results.len(), 2);
        // The chunk mentioning rust three times ranks first
        assert_eq!(results[0].source.as_deref(), Some("c.md"));
    }

    #[tokio::test]
    async fn keyword_retrieval_respects_top_k() {
        let index = InMemoryIndex::new();
        index
            .ingest(
                (0..5)
                    .map(|i| (format!("rust chunk {i}"), None))
                    .collect(),
            )
            .await
            .unwrap();

        let results = index.retrieve("rust", 2).await.unwrap();
        assert_eq!(results.len(), 2);
    }

    #[tokio::test]
    async fn empty_index_returns_nothing() {
        let index = InMemoryIndex::new();
        assert!(index.retrieve("anything", 5).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn vector_retrieval_ranks_by_similarity() {
        let index =
            InMemoryIndex::new().with_embedder(Arc::new(StubEmbedder), "stub-embeddings");
        index
            .ingest(vec![
                ("All about rust".into(), Some("rust.md".into())),
                ("All about python".into(), Some("python.md".into())),
            ])
            .await
            .unwrap();

        let results = index.retrieve("why rust", 10).await.unwrap();
        assert_eq!(results.len(), 2);
        assert_eq!(results[0].source.as_deref(), Some("rust.md"));
        assert!(results[0].score > results[1].score);
    }

    #[tokio::test]
    async fn ingest_counts_accumulate() {
        let index = InMemoryIndex::new();
        assert_eq!(index.ingest(vec![("one".into(), None)]).await.unwrap(), 1);
        assert_eq!(index.ingest(vec![("two".into(), None)]).await.unwrap(), 2);
        assert_eq!(index.len().await, 2);
    }

    #[test]
    fn split_paragraphs_trims_and_drops_blanks() {
        let text = "First paragraph.\n\n\n  Second one. \n\nThird.";
        let chunks = split_paragraphs(text);
        assert_eq!(chunks.len(), 3);
        assert_eq!(chunks[1], "Second one.");
    }
}
