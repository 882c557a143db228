//! Document retrieval for ragweed.
//!
//! The agent core only depends on the `Retriever` trait from
//! `ragweed-core`; this crate provides the in-memory index behind it.
//! Chunks arrive pre-split (how documents get chunked is the ingestion
//! pipeline's business); the index ranks them by cosine similarity of
//! embeddings when an embedding provider is bound, or by keyword
//! occurrence otherwise.

pub mod index;
pub mod vector;

pub use index::InMemoryIndex;
pub use vector::cosine_similarity;
