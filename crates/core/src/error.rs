//! Error types for the ragweed domain.
//!
//! Uses `thiserror` for ergonomic error definitions.
//! Each bounded context has its own error variant.

use thiserror::Error;

/// The top-level error type for all ragweed operations.
#[derive(Debug, Error)]
pub enum Error {
    // --- Turn errors (the agent loop) ---
    #[error("Turn error: {0}")]
    Turn(#[from] TurnError),

    // --- Provider errors ---
    #[error("Provider error: {0}")]
    Provider(#[from] ProviderError),

    // --- Tool errors ---
    #[error("Tool error: {0}")]
    Tool(#[from] ToolError),

    // --- Session errors ---
    #[error("Session error: {0}")]
    Session(#[from] SessionError),

    // --- Retrieval errors ---
    #[error("Retrieval error: {0}")]
    Retrieval(#[from] RetrievalError),

    // --- Configuration errors ---
    #[error("Configuration error: {message}")]
    Config { message: String },

    // --- Serialization ---
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    // --- Generic ---
    #[error("Internal error: {0}")]
    Internal(String),
}

/// Result type alias using our Error.
pub type Result<T> = std::result::Result<T, Error>;

// --- Bounded context errors ---

/// Failures of a single conversational turn.
///
/// None of these are retried or swallowed by the loop; every variant is
/// surfaced to the caller as-is, and a failed turn never leaves a partial
/// transcript in the session.
#[derive(Debug, Error)]
pub enum TurnError {
    /// The message filter admitted nothing — calling the model would be
    /// a precondition violation.
    #[error("no admissible messages in context after filtering")]
    EmptyContext,

    #[error("model invocation failed: {0}")]
    Model(#[from] ProviderError),

    /// The model requested a tool that is not in the registry. Aborts the
    /// whole turn, not just the one call.
    #[error("unknown tool requested: {0}")]
    UnknownTool(String),

    #[error("tool execution failed: {0}")]
    Tool(#[from] ToolError),

    /// The loop guard tripped: the model kept requesting tools past the
    /// configured number of model calls for one turn.
    #[error("turn exceeded the limit of {limit} model calls")]
    TurnLimitExceeded { limit: u32 },
}

#[derive(Debug, Clone, Error)]
pub enum ProviderError {
    #[error("API request failed: {message} (status: {status_code})")]
    ApiError { status_code: u16, message: String },

    #[error("Rate limited by provider, retry after {retry_after_secs}s")]
    RateLimited { retry_after_secs: u64 },

    #[error("Authentication failed: {0}")]
    AuthenticationFailed(String),

    #[error("Model not found: {0}")]
    ModelNotFound(String),

    #[error("Provider not configured: {0}")]
    NotConfigured(String),

    #[error("Request timed out: {0}")]
    Timeout(String),

    #[error("Network error: {0}")]
    Network(String),
}

#[derive(Debug, Error)]
pub enum ToolError {
    #[error("Tool not found: {0}")]
    NotFound(String),

    #[error("Invalid tool arguments: {0}")]
    InvalidArguments(String),

    #[error("Tool execution failed: {tool_name} — {reason}")]
    ExecutionFailed { tool_name: String, reason: String },

    #[error("Tool timed out: {tool_name} after {timeout_secs}s")]
    Timeout { tool_name: String, timeout_secs: u64 },
}

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("Storage error: {0}")]
    Storage(String),
}

#[derive(Debug, Error)]
pub enum RetrievalError {
    #[error("Embedding generation failed: {0}")]
    EmbeddingFailed(String),

    #[error("Index error: {0}")]
    Index(String),
}
