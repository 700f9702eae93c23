use std::sync::Arc;

use film_api::{
    config::Config,
    routes::{create_router, AppState},
    services::ElasticFilmService,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("film_api=info,tower_http=info")),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::from_env()?;

    let film_service = ElasticFilmService::new(config.elastic_url.clone(), config.films_index.clone());
    let state = AppState::new(Arc::new(film_service));
    let app = create_router(state);

    let addr = config.bind_addr();
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!(
        addr = %addr,
        elastic_url = %config.elastic_url,
        index = %config.films_index,
        "Film API listening"
    );
    axum::serve(listener, app).await?;

    Ok(())
}
