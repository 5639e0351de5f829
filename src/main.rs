use clap::Parser;
use std::sync::Arc;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

mod app;
mod assembler;
mod cli;
mod commands;
mod config;
mod core;
mod dispatch;
mod display;
mod functions;
mod history;
mod input;
mod providers;
mod session;
#[cfg(test)]
mod testing;

use crate::app::Application;
use crate::cli::Args;
use crate::commands::create_command_registry;
use crate::config::Config;
use crate::core::error::ReelError;
use crate::functions::{FunctionRegistry, MovieLookup, catalog::MovieCatalog};
use crate::providers::openai::OpenAIProvider;
use crate::session::ConversationSession;

fn init_logging(verbose: bool) -> Result<(), ReelError> {
    let default_level = if verbose { "reelchat=debug" } else { "reelchat=warn" };
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .try_init()
        .map_err(|e| ReelError::Config(format!("Failed to initialize tracing: {}", e)))
}

fn load_catalog(config: &Config) -> Result<MovieCatalog, ReelError> {
    match &config.catalog_path {
        Some(path) => MovieCatalog::load(path),
        None => Ok(MovieCatalog::sample()),
    }
}

async fn run() -> Result<(), ReelError> {
    let dotenv = dotenvy::dotenv();
    let args = Args::parse();
    init_logging(args.verbose)?;

    if let Err(e) = dotenv {
        tracing::debug!("No .env file loaded: {}", e);
    }

    let mut config = Config::load()?;
    config.merge_args(&args);
    config.validate()?;

    let provider = OpenAIProvider::with_endpoint(config.base_url().to_string(), config.api_key.clone());
    tracing::info!(endpoint = provider.endpoint(), model = %config.generation.model, "provider ready");

    let lookup: Arc<dyn MovieLookup> = Arc::new(load_catalog(&config)?);
    let registry = Arc::new(FunctionRegistry::with_lookup(lookup));

    let session = ConversationSession::new(
        Box::new(provider),
        registry,
        config.generation.clone(),
        config.request_timeout(),
    );

    Application::new(args, session, create_command_registry())
        .run()
        .await
}

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        display::display_error(&e.to_string());
        std::process::exit(1);
    }
}
