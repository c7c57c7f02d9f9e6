//! Ask command handler.
//!
//! Answers a question from the single best-matching chunk.

use crate::runtime;
use clap::Args;
use std::path::PathBuf;
use toolrag_core::{config::AppConfig, AppResult};

/// Answer a question from the best-matching chunk
#[derive(Args, Debug)]
pub struct AskCommand {
    /// The question to ask
    pub prompt: String,

    /// Ingest these files or directories before asking
    #[arg(long = "ingest")]
    pub preload: Vec<PathBuf>,
}

impl AskCommand {
    pub async fn execute(&self, config: &AppConfig) -> AppResult<()> {
        tracing::info!("Executing ask command");
        tracing::debug!("Ask command options: {:?}", self);

        let service = runtime::answering_service(config, &self.preload).await?;
        let answer = service.ask(&self.prompt).await?;

        println!("{}", answer);
        Ok(())
    }
}
