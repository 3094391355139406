//! Covid Dashboard - COVID-19 cases, deaths and vaccinations in the browser
//!
//! Loads a local SQLite snapshot once and serves:
//! - Global map of confirmed cases for a selection of countries
//! - Per-country time series of confirmed, deaths and doses administered
//! - Headline totals and the countries with the most cases

mod aggregation;
mod config;
mod db;
mod snapshot;
mod views;
mod web;

use anyhow::Result;
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

fn init_logging(level: &str) {
    // RUST_LOG wins over the configured level when set
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    // Use LOG_FORMAT=gcp for structured GCP Cloud Logging
    let log_format = std::env::var("LOG_FORMAT").unwrap_or_default();
    if log_format == "gcp" {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_stackdriver::layer())
            .init();
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).init();
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present (before any other initialization)
    let _ = dotenvy::dotenv();

    let config = config::Config::load()?;
    init_logging(&config.logging.level);

    info!("Starting Covid Dashboard...");
    info!("Configuration loaded");

    // Both tables are read once; a missing file or table stops startup here
    let db = db::Database::new(&config.database).await?;
    let snapshot = Arc::new(snapshot::Snapshot::load(db).await?);

    let state = Arc::new(web::AppState::new(snapshot, &config.dashboard)?);
    info!(
        "Totals: {} cases, {} deaths, {} doses administered",
        state.summary.total_cases, state.summary.total_deaths, state.summary.total_vaccinated
    );

    web::warm_cache(&state);

    web::start_server(&config, state).await?;

    Ok(())
}
