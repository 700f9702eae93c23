use axum::{http::StatusCode, middleware, routing::get, Json, Router};
use serde_json::{json, Value};
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::trace::TraceLayer;
use utoipa::OpenApi;

use crate::{
    error::ErrorBody,
    middleware::request_id::{make_span_with_request_id, request_id_middleware},
    services::FilmService,
};

pub mod films;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub film_service: Arc<dyn FilmService>,
}

impl AppState {
    pub fn new(film_service: Arc<dyn FilmService>) -> Self {
        Self { film_service }
    }
}

/// Creates the application router with all routes
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .route("/api/openapi.json", get(openapi_json))
        .nest("/api/v1", api_routes())
        .layer(
            ServiceBuilder::new()
                .layer(middleware::from_fn(request_id_middleware))
                .layer(TraceLayer::new_for_http().make_span_with(make_span_with_request_id)),
        )
        .with_state(state)
}

/// API routes under /api/v1
fn api_routes() -> Router<AppState> {
    // a nested "/" only answers "/films"; the list is also served with the slash
    Router::new()
        .nest("/films", films::router())
        .route("/films/", get(films::list_films))
}

#[derive(OpenApi)]
#[openapi(
    info(title = "Film API", description = "Film search and lookup over the films index"),
    paths(
        films::search_films,
        films::same_films,
        films::list_films,
        films::film_details,
    ),
    components(schemas(
        films::FilmSummary,
        films::FilmDetail,
        films::GenreSummary,
        films::PersonSummary,
        ErrorBody,
    )),
    tags((name = "films", description = "Film search and details"))
)]
pub struct ApiDoc;

/// OpenAPI document for the film endpoints
async fn openapi_json() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}

/// Health check endpoint
async fn health_check() -> (StatusCode, Json<Value>) {
    (StatusCode::OK, Json(json!({ "status": "healthy" })))
}
