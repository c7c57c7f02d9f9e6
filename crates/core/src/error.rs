//! Error types for toolrag.
//!
//! This module defines a unified error enum covering the retrieval core
//! (chunking, vector index, providers, tools) and the ambient layers
//! (configuration, I/O, serialization).

use thiserror::Error;

/// Unified error type for toolrag.
///
/// All fallible functions in the workspace return `Result<T, AppError>`.
/// Errors are represented and propagated, never swallowed: lower layers
/// either recover to a well-defined default or return one of these.
#[derive(Error, Debug)]
pub enum AppError {
    /// Rejected construction parameters (chunk size/overlap, duplicate tool
    /// names, unknown backends)
    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),

    /// Vector length disagrees with the index dimensionality
    #[error("Dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },

    /// Embedding or generation provider transport/parse failure
    #[error("Provider error: {0}")]
    Provider(String),

    /// The model requested a tool that is not registered
    #[error("Unknown tool: {0}")]
    UnknownTool(String),

    /// A tool-call argument payload could not be parsed as an object
    #[error("Malformed arguments for tool '{tool}': {message}")]
    MalformedToolArguments { tool: String, message: String },

    /// A tool failed while executing
    #[error("Tool error: {0}")]
    Tool(String),

    /// Configuration file and environment errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// I/O and filesystem errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Vector store and ingestion errors
    #[error("Knowledge error: {0}")]
    Knowledge(String),

    /// Serialization/deserialization errors
    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl AppError {
    /// Short machine-readable name of the error kind.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::InvalidConfiguration(_) => "invalid_configuration",
            Self::DimensionMismatch { .. } => "dimension_mismatch",
            Self::Provider(_) => "provider_error",
            Self::UnknownTool(_) => "unknown_tool",
            Self::MalformedToolArguments { .. } => "malformed_tool_arguments",
            Self::Tool(_) => "tool_error",
            Self::Config(_) => "config",
            Self::Io(_) => "io",
            Self::Knowledge(_) => "knowledge",
            Self::Serialization(_) => "serialization",
        }
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::Serialization(err.to_string())
    }
}

impl From<serde_yaml::Error> for AppError {
    fn from(err: serde_yaml::Error) -> Self {
        AppError::Serialization(err.to_string())
    }
}

/// Convenience type alias for Results with AppError.
pub type AppResult<T> = Result<T, AppError>;
