//! Search command handler.

use crate::runtime;
use clap::Args;
use std::path::PathBuf;
use toolrag_core::{config::AppConfig, AppResult};

/// Return the chunks most similar to a query
#[derive(Args, Debug)]
pub struct SearchCommand {
    /// Query text
    pub query: String,

    /// Number of chunks to return (default: retrieval.topK)
    #[arg(short = 'k', long)]
    pub top_k: Option<usize>,

    /// Ingest these files or directories before searching
    #[arg(long = "ingest")]
    pub preload: Vec<PathBuf>,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

impl SearchCommand {
    pub async fn execute(&self, config: &AppConfig) -> AppResult<()> {
        tracing::info!("Executing search command");

        let top_k = match self.top_k {
            Some(k) if k > 0 => k,
            _ => config.retrieval.top_k,
        };

        let service = runtime::retrieval_service(config, &self.preload).await?;
        let results = service.retrieve(&self.query, top_k).await?;

        if self.json {
            let hits: Vec<serde_json::Value> = results
                .iter()
                .map(|hit| {
                    let chunk = &hit.record.payload;
                    serde_json::json!({
                        "score": hit.score,
                        "documentId": chunk.document_id,
                        "documentTitle": chunk.document_title,
                        "source": chunk.source,
                        "chunkIndex": chunk.chunk_index,
                        "text": chunk.text,
                    })
                })
                .collect();
            let output = serde_json::json!({
                "query": self.query,
                "topK": top_k,
                "results": hits,
            });
            println!("{}", serde_json::to_string_pretty(&output)?);
            return Ok(());
        }

        if results.is_empty() {
            println!("No results.");
            return Ok(());
        }

        for (rank, hit) in results.iter().enumerate() {
            let chunk = &hit.record.payload;
            println!(
                "{}. [{:.3}] {} ({})",
                rank + 1,
                hit.score,
                chunk.document_title,
                chunk.chunk_id
            );
            println!("   {}", chunk.text.replace('\n', "\n   "));
        }

        Ok(())
    }
}
