//! Command handlers for the toolrag CLI.
//!
//! This module organizes all CLI commands into separate submodules.

pub mod agent;
pub mod ask;
pub mod ingest;
pub mod search;

// Re-export command types for convenience
pub use agent::AgentCommand;
pub use ask::AskCommand;
pub use ingest::IngestCommand;
pub use search::SearchCommand;
