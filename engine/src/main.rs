// Adaptive RAG
// Main entry point for the adaptive-rag binary

use adaptive_rag::cli::{Cli, Command, ConfigAction, CorpusAction};
use adaptive_rag::config::Config;
use adaptive_rag::handlers::{
    handle_ask, handle_chat, handle_config_set_key, handle_config_show, handle_corpus_list,
    OutputFormat,
};
use adaptive_rag::telemetry::init_telemetry_with_level;
use clap::Parser;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Parse CLI arguments
    let cli = Cli::parse();

    // Load configuration (or use custom path if provided)
    let config = if let Some(config_path) = &cli.config {
        Config::load_from_path(config_path)?
    } else {
        Config::load_or_create()?
    };

    // --log wins over the config file; RUST_LOG wins over both
    let log_level = cli.log.as_deref().unwrap_or(&config.core.log_level);
    init_telemetry_with_level(log_level);

    let version = env!("CARGO_PKG_VERSION");
    let commit = env!("GIT_COMMIT_HASH");
    let timestamp = env!("BUILD_TIMESTAMP");

    tracing::info!("Adaptive RAG v{} ({} - {})", version, commit, timestamp);

    // Determine output format
    let format = if cli.json {
        OutputFormat::Json
    } else {
        OutputFormat::Text
    };

    // Handle commands
    match cli.command {
        Command::Ask { query, quiet } => {
            tracing::info!("Answering query: {}", query);
            handle_ask(query, quiet, &config, format).await
        }

        Command::Chat => {
            tracing::info!("Starting chat session");
            handle_chat(&config, format).await
        }

        Command::Corpus { action } => match action {
            CorpusAction::List => handle_corpus_list(&config, format).await,
        },

        Command::Config { action } => {
            tracing::info!("Config management: {:?}", action);
            match action {
                ConfigAction::Show => handle_config_show(&config, format).await,
                ConfigAction::SetKey => handle_config_set_key().await,
            }
        }
    }
}
