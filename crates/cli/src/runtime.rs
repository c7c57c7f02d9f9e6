//! Builds the retrieval service, chat client and agent from configuration.

use crate::documents::load_documents;
use std::path::PathBuf;
use std::sync::Arc;
use toolrag_agent::{default_registry, ToolAugmentedAgent};
use toolrag_core::{config::AppConfig, AppResult};
use toolrag_knowledge::{build_service, RetrievalService};
use toolrag_llm::{create_client, ChatClient};

pub fn chat_client(config: &AppConfig) -> AppResult<Arc<dyn ChatClient>> {
    create_client(&config.gateway, config.resolve_api_key())
}

/// Retrieval service without generation, for commands that never call the
/// chat model.
///
/// Documents under `preload` are ingested first, which is how the
/// in-memory backend gets content for a single invocation.
pub async fn retrieval_service(
    config: &AppConfig,
    preload: &[PathBuf],
) -> AppResult<RetrievalService> {
    let service = build_service(config)?;

    if !preload.is_empty() {
        let documents = load_documents(preload)?;
        service.ingest(&documents).await?;
    }

    Ok(service)
}

/// Retrieval service with the configured chat client attached, for `ask`.
pub async fn answering_service(
    config: &AppConfig,
    preload: &[PathBuf],
) -> AppResult<RetrievalService> {
    let client = chat_client(config)?;
    Ok(retrieval_service(config, preload)
        .await?
        .with_generation(client, config.generation.clone()))
}

/// Agent with the built-in tools plus `searchKnowledge` over `retrieval`.
pub fn agent(
    config: &AppConfig,
    retrieval: Arc<RetrievalService>,
) -> AppResult<ToolAugmentedAgent> {
    let registry = default_registry(Some(retrieval))?;
    Ok(ToolAugmentedAgent::new(
        chat_client(config)?,
        Arc::new(registry),
        config.generation.clone(),
    ))
}
