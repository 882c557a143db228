pub mod ask;
pub mod chat;
pub mod config_cmd;

use anyhow::Context;
use ragweed_agent::Agent;
use ragweed_config::AppConfig;
use ragweed_core::event::EventBus;
use ragweed_core::provider::Provider;
use ragweed_core::retrieval::Retriever;
use ragweed_providers::{ModelSpec, build_provider};
use ragweed_retrieval::InMemoryIndex;
use ragweed_retrieval::index::split_paragraphs;
use ragweed_sessions::InMemorySessionStore;
use ragweed_tools::{RegistryOptions, default_registry};
use std::path::PathBuf;
use std::sync::Arc;

/// Build the fully wired agent from config, ingesting any documents given
/// on the command line into the retrieval index first.
pub async fn build_agent(docs: &[PathBuf]) -> anyhow::Result<(Agent, AppConfig)> {
    let config = AppConfig::load().context("Failed to load config")?;

    let Some(api_key) = config.api_key.clone() else {
        eprintln!();
        eprintln!("  ERROR: No API key configured!");
        eprintln!();
        eprintln!("  Set one of these environment variables:");
        eprintln!("    OPENAI_API_KEY  = 'sk-...'   (for openai:* models)");
        eprintln!("    GROQ_API_KEY    = 'gsk-...'  (for groq:* models)");
        eprintln!("    RAGWEED_API_KEY = '...'      (generic)");
        eprintln!();
        eprintln!("  Or add it to your config file:");
        eprintln!("    {}", AppConfig::config_dir().join("config.toml").display());
        eprintln!();
        anyhow::bail!("No API key found. See above for setup instructions.");
    };

    let spec = ModelSpec::parse(&config.model).context("Invalid model spec")?;
    let provider: Arc<dyn Provider> = Arc::new(build_provider(&spec, &api_key));

    let event_bus = Arc::new(EventBus::default());

    // Retrieval index, populated from --docs files when given.
    let index = Arc::new(
        InMemoryIndex::new()
            .with_embedder(Arc::clone(&provider), config.retrieval.embedding_model.clone()),
    );
    for path in docs {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        let source = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned());
        let chunks = split_paragraphs(&text)
            .into_iter()
            .map(|c| (c, source.clone()))
            .collect::<Vec<_>>();
        let total = index
            .ingest(chunks)
            .await
            .with_context(|| format!("Failed to ingest {}", path.display()))?;
        tracing::info!(path = %path.display(), total, "Ingested document");
    }

    let retriever: Option<Arc<dyn Retriever>> = if index.is_empty().await {
        None
    } else {
        Some(index)
    };

    let tools = Arc::new(default_registry(
        RegistryOptions {
            tavily_api_key: config.tools.tavily_api_key.clone(),
            summary_max_chars: config.tools.summary_max_chars,
            search_max_results: config.tools.search_max_results,
            retrieval_top_k: config.retrieval.top_k,
        },
        retriever,
    ));

    let store = Arc::new(
        InMemorySessionStore::new(config.sessions.capacity, config.sessions.idle_ttl_minutes)
            .with_events(Arc::clone(&event_bus)),
    );

    let agent = Agent::new(
        provider,
        spec.model.clone(),
        config.temperature,
        tools,
        store,
        event_bus,
    )
    .with_max_tokens(config.max_tokens)
    .with_max_model_calls(config.agent.max_model_calls);

    Ok((agent, config))
}
