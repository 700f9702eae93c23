//! Film lookup abstraction
//!
//! Handlers only ever talk to `FilmService`. The production implementation is
//! backed by Elasticsearch; tests plug in mocks or fixed in-memory data.

use std::time::Duration;

use uuid::Uuid;

use crate::{error::AppResult, models::Film};

pub mod elastic;

pub use elastic::ElasticFilmService;

pub const DEFAULT_LIMIT: i64 = 50;
pub const DEFAULT_PAGE: i64 = 1;

/// Sort, page size and page number as received from the client.
///
/// Values are forwarded untouched; the backend decides what is acceptable.
#[derive(Debug, Clone, PartialEq)]
pub struct Pagination {
    pub sort: Option<String>,
    pub limit: i64,
    pub page: i64,
}

impl Default for Pagination {
    fn default() -> Self {
        Self {
            sort: None,
            limit: DEFAULT_LIMIT,
            page: DEFAULT_PAGE,
        }
    }
}

/// Parameters of a film search: free text, genre filter, or neither
#[derive(Debug, Clone, PartialEq, Default)]
pub struct FilmSearch {
    pub pagination: Pagination,
    pub query: Option<String>,
    pub genre: Option<Uuid>,
}

#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait FilmService: Send + Sync {
    /// Films matching the free-text query and/or genre filter.
    ///
    /// Errors reported by the backend come back as `AppError::SearchRejected`.
    async fn search(&self, params: &FilmSearch) -> AppResult<Vec<Film>>;

    /// Films similar to `film_id`.
    ///
    /// `None` when the film does not exist or nothing similar was found.
    async fn find_similar(
        &self,
        film_id: Uuid,
        pagination: &Pagination,
    ) -> AppResult<Option<Vec<Film>>>;

    async fn get_by_id(&self, film_id: Uuid) -> AppResult<Option<Film>>;

    /// Whether the backend answers at all
    async fn ping(&self) -> bool;

    /// Provider name for logging
    fn name(&self) -> &'static str;
}

/// Pings `service` every `interval` until it answers; returns the number of attempts.
pub async fn wait_until_ready(service: &dyn FilmService, interval: Duration) -> u64 {
    let mut attempts: u64 = 0;
    loop {
        attempts += 1;
        if service.ping().await {
            tracing::info!(provider = service.name(), attempts, "Search engine is up");
            return attempts;
        }
        tracing::info!(
            provider = service.name(),
            attempts,
            "Search engine not ready, retrying"
        );
        tokio::time::sleep(interval).await;
    }
}
