//! Embedding provider implementations.

pub mod gateway;
pub mod mock;

pub use gateway::GatewayEmbeddingProvider;
pub use mock::MockProvider;
