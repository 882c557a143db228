//! Session store implementations for ragweed.

pub mod in_memory;

pub use in_memory::InMemorySessionStore;
