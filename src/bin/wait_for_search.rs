//! Blocks until the search engine answers a ping.
//!
//! Meant to run before functional tests or the API container starts.

use std::time::Duration;

use film_api::{
    config::Config,
    services::{wait_until_ready, ElasticFilmService},
};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = Config::from_env()?;
    let client = ElasticFilmService::new(config.elastic_url.clone(), config.films_index.clone());
    tracing::info!(url = %config.elastic_url, "Waiting for search engine");

    wait_until_ready(&client, Duration::from_millis(config.ping_interval_ms)).await;
    Ok(())
}
