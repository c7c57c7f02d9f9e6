//! Agent command handler.

use crate::runtime;
use clap::Args;
use std::path::PathBuf;
use std::sync::Arc;
use toolrag_core::{config::AppConfig, AppResult};

/// Run the tool-augmented agent
#[derive(Args, Debug)]
pub struct AgentCommand {
    /// Message for the agent
    pub message: String,

    /// Correlation id sent as x-request-id (default: random UUID)
    #[arg(long)]
    pub request_id: Option<String>,

    /// Chunk id retrieved beforehand, sent as x-rag-chunk-ids (repeatable)
    #[arg(long = "chunk-id")]
    pub chunk_ids: Vec<String>,

    /// Ingest these files or directories so searchKnowledge has content
    #[arg(long = "ingest")]
    pub preload: Vec<PathBuf>,

    /// Output the full response as JSON
    #[arg(long)]
    pub json: bool,
}

impl AgentCommand {
    pub async fn execute(&self, config: &AppConfig) -> AppResult<()> {
        tracing::info!("Executing agent command");

        let retrieval = Arc::new(runtime::retrieval_service(config, &self.preload).await?);
        let agent = runtime::agent(config, retrieval)?;

        let response = agent
            .run(&self.message, self.request_id.as_deref(), &self.chunk_ids)
            .await?;

        if self.json {
            println!("{}", serde_json::to_string_pretty(&response)?);
        } else {
            println!("{}", response.answer);
            tracing::info!(
                "Answered by {} in {}ms (request {})",
                response.model,
                response.latency_ms,
                response.request_id
            );
        }

        Ok(())
    }
}
