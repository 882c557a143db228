//! Built-in tool implementations for ragweed.
//!
//! Tools give the model its reach beyond the conversation: encyclopedia
//! and academic search, general web search, and retrieval over ingested
//! documents. Each returns text for the model plus optional structured
//! data that surfaces as retrieved evidence in the turn result.

pub mod arxiv;
pub mod retriever;
pub mod web_search;
pub mod wikipedia;

use ragweed_core::retrieval::Retriever;
use ragweed_core::tool::ToolRegistry;
use std::sync::Arc;

/// Knobs for the default tool set.
pub struct RegistryOptions {
    /// Tavily API key; web search is skipped without one.
    pub tavily_api_key: Option<String>,

    /// Character budget for Wikipedia/arXiv summaries.
    pub summary_max_chars: usize,

    /// Result count for web search.
    pub search_max_results: usize,

    /// Chunks returned per retrieval query.
    pub retrieval_top_k: usize,
}

impl Default for RegistryOptions {
    fn default() -> Self {
        Self {
            tavily_api_key: None,
            summary_max_chars: 200,
            search_max_results: 3,
            retrieval_top_k: 5,
        }
    }
}

/// Create the default tool registry.
///
/// Wikipedia and arXiv search are always available. Web search requires a
/// Tavily key; the document retriever requires an index — both are
/// skipped, not stubbed, when unconfigured, so the model never sees a
/// tool it cannot actually use.
pub fn default_registry(
    options: RegistryOptions,
    retriever: Option<Arc<dyn Retriever>>,
) -> ToolRegistry {
    let mut registry = ToolRegistry::new();

    registry.register(Box::new(wikipedia::WikipediaTool::new(
        options.summary_max_chars,
    )));
    registry.register(Box::new(arxiv::ArxivTool::new(options.summary_max_chars)));

    if let Some(api_key) = options.tavily_api_key {
        registry.register(Box::new(web_search::WebSearchTool::new(
            api_key,
            options.search_max_results,
        )));
    } else {
        tracing::warn!("No Tavily API key configured, web_search tool disabled");
    }

    if let Some(retriever) = retriever {
        registry.register(Box::new(retriever::VectorRetrieverTool::new(
            retriever,
            options.retrieval_top_k,
        )));
    } else {
        tracing::warn!("No document index available, vector_retriever tool disabled");
    }

    registry
}

/// Truncate to a character budget without splitting a code point.
pub(crate) fn truncate_chars(s: &str, max_chars: usize) -> String {
    if s.chars().count() <= max_chars {
        s.to_string()
    } else {
        let mut out: String = s.chars().take(max_chars).collect();
        out.push('…');
        out
    }
}
