//! Strictly Clinic - Unified CLI
//!
//! Clinical diagnosis simulator with a terminal front end.

#![warn(missing_docs)]

use anyhow::Result;
use clap::Parser;
use std::path::PathBuf;
use strictly_clinic::cli::{Cli, Command};
use strictly_clinic::{
    CaseProvider, Clinic, ClinicConfig, LlmCaseProvider, LlmClient, OfflineProvider, TestCatalog,
    TestCategory, tui,
};
use tracing::{info, instrument, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    // Load .env file
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    match cli.command {
        Command::Play { config, offline } => run_play(config, offline).await,
        Command::Tests { category } => {
            list_tests(category.map(TestCategory::from));
            Ok(())
        }
        Command::Case { config, offline } => run_case(config, offline).await,
    }
}

/// Run the terminal simulator
async fn run_play(config_path: PathBuf, offline: bool) -> Result<()> {
    let config = ClinicConfig::load_or_default(&config_path)?;

    match llm_client(&config, offline) {
        Some(client) => {
            let clinic = Clinic::new(LlmCaseProvider::new(client), config.display_delay());
            tui::run_tui(clinic, config.log_file()).await
        }
        None => {
            let clinic = Clinic::new(OfflineProvider, config.display_delay());
            tui::run_tui(clinic, config.log_file()).await
        }
    }
}

/// Generate one case and print it as JSON
async fn run_case(config_path: PathBuf, offline: bool) -> Result<()> {
    initialize_tracing();

    let config = ClinicConfig::load_or_default(&config_path)?;
    let case = match llm_client(&config, offline) {
        Some(client) => LlmCaseProvider::new(client).generate_case().await,
        None => OfflineProvider.generate_case().await,
    };

    println!("{}", serde_json::to_string_pretty(&case)?);
    Ok(())
}

/// Print the test catalog as a table
fn list_tests(category: Option<TestCategory>) {
    println!("{:<16} {:<32} {:<10} {:>6}", "ID", "NAME", "CATEGORY", "COST");
    TestCatalog::all()
        .iter()
        .filter(|test| category.is_none_or(|c| test.category() == c))
        .for_each(|test| {
            println!(
                "{:<16} {:<32} {:<10} {:>6}",
                test.id(),
                test.name(),
                test.category(),
                format!("£{}", test.cost())
            );
        });
}

/// Builds the LLM client, or `None` when playing offline.
///
/// A missing API key falls back to offline play with a warning.
#[instrument(skip(config))]
fn llm_client(config: &ClinicConfig, offline: bool) -> Option<LlmClient> {
    if offline {
        info!("Offline mode requested");
        return None;
    }

    match config.create_llm_config() {
        Ok(llm_config) => Some(LlmClient::new(llm_config)),
        Err(e) => {
            warn!(error = %e, "LLM unavailable, playing offline");
            eprintln!("{} - playing with the offline patient", e.message);
            None
        }
    }
}

#[instrument]
fn initialize_tracing() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,strictly_clinic=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    info!("Tracing initialized");
}
