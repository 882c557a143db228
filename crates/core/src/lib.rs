//! # Ragweed Core
//!
//! Domain types, traits, and error definitions for the ragweed
//! retrieval-augmented conversational agent runtime. This crate has
//! **zero framework dependencies** — it defines the domain model that all
//! other crates implement against.
//!
//! ## Design Philosophy
//!
//! Every subsystem is defined as a trait here. Implementations live in their
//! respective crates. This enables:
//! - Swapping implementations via configuration
//! - Easy testing with mock/stub implementations
//! - Clean dependency graph (all crates depend inward on core)

pub mod error;
pub mod event;
pub mod message;
pub mod provider;
pub mod retrieval;
pub mod session;
pub mod tool;

// Re-export key types at crate root for ergonomics
pub use error::{Error, Result, TurnError};
pub use event::{DomainEvent, EventBus};
pub use message::{AssistantMessage, Message, ToolCall, ToolResultMessage, UserMessage};
pub use provider::{ChatRequest, ChatResponse, Provider, ToolDefinition};
pub use retrieval::{Retriever, ScoredChunk};
pub use session::{Session, SessionHandle, SessionId, SessionStore};
pub use tool::{Tool, ToolOutput, ToolRegistry};
