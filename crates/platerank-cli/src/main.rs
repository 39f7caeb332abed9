//! `platerank` command-line interface.
//!
//! Takes one free-text restaurant query, runs it through the agent
//! pipeline, and prints the answer.
//!
//! ```text
//! platerank "How good is Subway as a restaurant?"
//! ```
//!
//! Environment:
//! - `OPENAI_API_KEY`: API key for the provider (required)
//! - `PLATERANK_DATA`: review data file (default `restaurant-data.txt`)
//! - `PLATERANK_MODEL`: model name (default `gpt-4o-mini`)
//! - `PLATERANK_BASE_URL`: OpenAI-compatible endpoint override
//! - `RUST_LOG`: tracing filter (default `info`)

use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use platerank_core::ReviewStore;
use platerank_runtime::{ProviderRegistry, QueryAnswerer, QueryOrchestrator, RuntimeConfig};

const DEFAULT_DATA_FILE: &str = "restaurant-data.txt";

/// Answer a free-text question about a restaurant's reviews.
#[derive(Parser, Debug)]
#[command(name = "platerank", version, about)]
struct Cli {
    /// The query, e.g. "How good is Subway as a restaurant?"
    query: String,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    let data_file =
        std::env::var("PLATERANK_DATA").unwrap_or_else(|_| DEFAULT_DATA_FILE.to_string());
    let store = ReviewStore::from_file(&data_file)
        .with_context(|| format!("failed to load review data from '{data_file}'"))?;

    let model =
        std::env::var("PLATERANK_MODEL").unwrap_or_else(|_| "gpt-4o-mini".to_string());
    let mut provider_config = serde_json::json!({ "model": model.clone() });
    if let Ok(base_url) = std::env::var("PLATERANK_BASE_URL") {
        provider_config["base_url"] = serde_json::Value::String(base_url);
    }

    let registry = ProviderRegistry::with_defaults();
    registry
        .validate("openai", &provider_config)
        .context("provider configuration is invalid")?;
    let provider = registry
        .create("openai", &provider_config)
        .context("failed to create LLM provider")?;

    let orchestrator = QueryOrchestrator::builder()
        .provider(provider)
        .store(Arc::new(store))
        .config(RuntimeConfig::new(model))
        .build()?;

    let report = orchestrator.answer(&cli.query).await?;

    println!("{}", report.answer);
    tracing::info!(
        llm_calls = report.usage.llm_calls,
        total_tokens = report.usage.total_tokens,
        cache_hits = report.usage.cache_hits,
        "run complete"
    );

    Ok(())
}
