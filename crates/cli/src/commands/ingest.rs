//! Ingest command handler.

use crate::documents::load_documents;
use clap::Args;
use std::path::PathBuf;
use toolrag_core::{config::AppConfig, config::IndexBackend, AppError, AppResult};
use toolrag_knowledge::build_service;

/// Chunk, embed and store documents
#[derive(Args, Debug)]
pub struct IngestCommand {
    /// Files or directories to ingest
    #[arg(required = true)]
    pub paths: Vec<PathBuf>,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

impl IngestCommand {
    pub async fn execute(&self, config: &AppConfig) -> AppResult<()> {
        tracing::info!("Executing ingest command");

        if config.index.backend == IndexBackend::Memory {
            tracing::warn!("Index backend is 'memory'; ingested chunks are discarded on exit");
        }

        let documents = load_documents(&self.paths)?;
        if documents.is_empty() {
            return Err(AppError::Config(format!(
                "No documents found in {:?}",
                self.paths
            )));
        }

        let service = build_service(config)?;
        let stats = service.ingest(&documents).await?;

        if self.json {
            let output = serde_json::json!({
                "documentsIngested": stats.documents_ingested,
                "chunksStored": stats.chunks_stored,
                "durationSecs": stats.duration_secs,
            });
            println!("{}", serde_json::to_string_pretty(&output)?);
        } else {
            println!(
                "Ingested {} documents ({} chunks) in {:.2}s",
                stats.documents_ingested, stats.chunks_stored, stats.duration_secs
            );
        }

        Ok(())
    }
}
