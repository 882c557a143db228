//! LLM provider implementations for ragweed.
//!
//! Both supported backends (OpenAI and Groq) expose the OpenAI
//! chat-completions wire format; they differ only in base URL and API key.
//! The backend is selected by a model spec string of the form
//! `"<backend>:<model>"`, e.g. `"openai:gpt-4o-mini"` or
//! `"groq:llama-3.1-8b-instant"`.

pub mod openai_compat;

pub use openai_compat::OpenAiCompatProvider;

use ragweed_core::error::ProviderError;

/// A parsed model spec: which backend to talk to and which model to ask for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelSpec {
    pub backend: String,
    pub model: String,
}

impl ModelSpec {
    /// Parse `"<backend>:<model>"`.
    pub fn parse(spec: &str) -> Result<Self, ProviderError> {
        match spec.split_once(':') {
            Some((backend, model)) if !backend.is_empty() && !model.is_empty() => Ok(Self {
                backend: backend.to_string(),
                model: model.to_string(),
            }),
            _ => Err(ProviderError::NotConfigured(format!(
                "model spec must be '<backend>:<model>', got '{spec}'"
            ))),
        }
    }
}

impl std::fmt::Display for ModelSpec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.backend, self.model)
    }
}

/// Build the provider for a model spec.
///
/// "groq" selects the Groq endpoint; any other backend name falls through
/// to OpenAI, matching how deployments have historically abbreviated it.
pub fn build_provider(spec: &ModelSpec, api_key: &str) -> OpenAiCompatProvider {
    match spec.backend.as_str() {
        "groq" => OpenAiCompatProvider::groq(api_key),
        _ => OpenAiCompatProvider::openai(api_key),
    }
}
