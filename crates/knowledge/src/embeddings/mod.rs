//! Embedding providers.
//!
//! Text goes in, a vector comes out. The gateway provider calls an
//! OpenAI-compatible `/v1/embeddings` endpoint; the mock provider hashes
//! words and character trigrams into a fixed-width vector for offline use.

pub mod provider;
pub mod providers;

pub use provider::{create_provider, EmbeddingProvider};
pub use providers::{GatewayEmbeddingProvider, MockProvider};
