//! Provider factory.
//!
//! Builds the shared transport and chat client from the gateway section of
//! the application configuration.

use crate::client::ChatClient;
use crate::providers::GatewayChatClient;
use crate::transport::GatewayTransport;
use std::sync::Arc;
use toolrag_core::config::GatewayConfig;
use toolrag_core::{AppError, AppResult};

/// Base URL used when the configuration leaves it blank.
pub fn default_base_url(provider: &str) -> Option<&'static str> {
    match provider.to_lowercase().as_str() {
        "litellm" => Some("http://localhost:4000"),
        "openai" => Some("https://api.openai.com"),
        "ollama" => Some("http://localhost:11434"),
        _ => None,
    }
}

/// Create the HTTP transport for the configured gateway.
///
/// # Errors
/// Returns `AppError::InvalidConfiguration` if the provider is unknown or
/// requires an API key that was not supplied.
pub fn create_transport(
    gateway: &GatewayConfig,
    api_key: Option<String>,
) -> AppResult<GatewayTransport> {
    let provider = gateway.provider.to_lowercase();
    let fallback = default_base_url(&provider).ok_or_else(|| {
        AppError::InvalidConfiguration(format!("Unknown provider: {}", gateway.provider))
    })?;

    if provider == "openai" && api_key.is_none() {
        return Err(AppError::InvalidConfiguration(
            "OpenAI provider requires API key".to_string(),
        ));
    }

    let base_url = if gateway.base_url.trim().is_empty() {
        fallback.to_string()
    } else {
        gateway.base_url.clone()
    };

    GatewayTransport::new(base_url, api_key, gateway.timeout_secs)
}

/// Create a chat client for the configured gateway.
pub fn create_client(
    gateway: &GatewayConfig,
    api_key: Option<String>,
) -> AppResult<Arc<dyn ChatClient>> {
    let transport = create_transport(gateway, api_key)?;

    tracing::debug!(
        "Creating {} chat client at {}",
        gateway.provider,
        transport.base_url()
    );

    let client = GatewayChatClient::new(gateway.provider.to_lowercase(), transport)
        .with_chat_path(gateway.chat_path.clone());
    Ok(Arc::new(client))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn gateway(provider: &str, base_url: &str) -> GatewayConfig {
        GatewayConfig {
            provider: provider.to_string(),
            base_url: base_url.to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn test_create_litellm_client() {
        let client = create_client(&gateway("litellm", "http://localhost:4000"), None).unwrap();
        assert_eq!(client.provider_name(), "litellm");
    }

    #[test]
    fn test_blank_base_url_uses_provider_default() {
        let transport = create_transport(&gateway("ollama", ""), None).unwrap();
        assert_eq!(transport.base_url(), "http://localhost:11434");
    }

    #[test]
    fn test_openai_requires_api_key() {
        match create_client(&gateway("openai", ""), None) {
            Err(err) => assert!(err.to_string().contains("requires API key")),
            Ok(_) => panic!("Expected error for OpenAI without API key"),
        }
        assert!(create_client(&gateway("openai", ""), Some("sk-test".to_string())).is_ok());
    }

    #[test]
    fn test_unknown_provider() {
        match create_client(&gateway("unknown", "http://x"), None) {
            Err(AppError::InvalidConfiguration(msg)) => assert!(msg.contains("Unknown provider")),
            _ => panic!("Expected error for unknown provider"),
        }
    }
}
