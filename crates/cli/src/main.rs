//! toolrag CLI
//!
//! Main entry point for the toolrag command-line tool.
//! Ingests documents into a vector index, searches it, answers questions
//! from retrieved context and runs the tool-augmented agent.

mod commands;
mod documents;
mod runtime;

use clap::{Parser, Subcommand};
use commands::{AgentCommand, AskCommand, IngestCommand, SearchCommand};
use std::path::PathBuf;
use toolrag_core::{config::AppConfig, logging, AppResult};

/// toolrag - retrieval and tool-calling over an OpenAI-compatible gateway
#[derive(Parser, Debug)]
#[command(name = "toolrag")]
#[command(about = "Retrieval and tool-calling over an OpenAI-compatible gateway", long_about = None)]
#[command(version)]
struct Cli {
    /// Path to workspace directory (default: current directory)
    #[arg(short, long, global = true, env = "TOOLRAG_WORKSPACE")]
    workspace: Option<PathBuf>,

    /// Path to config file
    #[arg(short, long, global = true, env = "TOOLRAG_CONFIG")]
    config: Option<PathBuf>,

    /// Log level (error, warn, info, debug, trace)
    #[arg(long, global = true, env = "RUST_LOG")]
    log_level: Option<String>,

    /// Enable verbose output (sets log level to debug)
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Disable colored output
    #[arg(long, global = true, env = "NO_COLOR")]
    no_color: bool,

    /// Gateway provider (litellm, openai, ollama)
    #[arg(short, long, global = true, env = "TOOLRAG_PROVIDER")]
    provider: Option<String>,

    /// Generation model identifier
    #[arg(short, long, global = true, env = "TOOLRAG_MODEL")]
    model: Option<String>,

    /// Vector index backend (memory, sqlite)
    #[arg(long, global = true, env = "TOOLRAG_INDEX")]
    index: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Chunk, embed and store documents
    Ingest(IngestCommand),

    /// Return the chunks most similar to a query
    Search(SearchCommand),

    /// Answer a question from the best-matching chunk
    Ask(AskCommand),

    /// Run the tool-augmented agent
    Agent(AgentCommand),
}

#[tokio::main]
async fn main() -> AppResult<()> {
    // Parse command-line arguments first (needed for logging config)
    let cli = Cli::parse();

    // Load configuration (defaults, config file, environment)
    let config = AppConfig::load_with(cli.workspace.clone(), cli.config.clone())?;

    // Apply CLI overrides
    let config = config.with_overrides(
        cli.workspace,
        cli.config,
        cli.provider,
        cli.model,
        cli.log_level,
        cli.verbose,
        cli.no_color,
    );
    let config = config.with_index_backend(cli.index.as_deref())?;

    logging::init_logging(config.log_level.as_deref(), config.no_color, config.log_format)?;

    tracing::info!("toolrag CLI starting");
    tracing::debug!("Workspace: {:?}", config.workspace);
    tracing::debug!("Provider: {}", config.gateway.provider);
    tracing::debug!("Model: {}", config.generation.model);

    config.validate()?;
    config.ensure_state_dir()?;

    let command_name = match &cli.command {
        Commands::Ingest(_) => "ingest",
        Commands::Search(_) => "search",
        Commands::Ask(_) => "ask",
        Commands::Agent(_) => "agent",
    };
    let _span = tracing::info_span!("command", name = command_name).entered();

    let result = match cli.command {
        Commands::Ingest(cmd) => cmd.execute(&config).await,
        Commands::Search(cmd) => cmd.execute(&config).await,
        Commands::Ask(cmd) => cmd.execute(&config).await,
        Commands::Agent(cmd) => cmd.execute(&config).await,
    };

    match &result {
        Ok(_) => tracing::info!("Command completed successfully"),
        Err(e) => tracing::error!(kind = e.kind(), "Command failed: {}", e),
    }

    result
}
