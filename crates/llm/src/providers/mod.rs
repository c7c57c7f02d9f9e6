//! Chat provider implementations.

pub mod gateway;

pub use gateway::GatewayChatClient;
