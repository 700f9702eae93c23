use axum::{
    extract::{Path, Query, State},
    routing::get,
    Json, Router,
};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;

use crate::{
    error::{AppError, AppResult, ErrorBody},
    models::{Film, GenreRef, PersonRef},
    services::{FilmSearch, Pagination, DEFAULT_LIMIT, DEFAULT_PAGE},
};

use super::AppState;

const SIMILAR_NOT_FOUND: &str = "film not exist or not results";
const FILM_NOT_FOUND: &str = "film not found";

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_films))
        .route("/search", get(search_films))
        .route("/same/:film_id", get(same_films))
        .route("/:film_id", get(film_details))
}

// Request/Response types

fn default_limit() -> i64 {
    DEFAULT_LIMIT
}

fn default_page() -> i64 {
    DEFAULT_PAGE
}

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct SearchParams {
    /// Field to sort by, `-` prefix for descending
    pub sort: Option<String>,
    /// Films per page (default 50)
    #[serde(default = "default_limit")]
    pub limit: i64,
    /// Page number, starting at 1
    #[serde(default = "default_page")]
    pub page: i64,
    /// Search phrase
    pub query: Option<String>,
}

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ListParams {
    /// Field to sort by, `-` prefix for descending
    pub sort: Option<String>,
    /// Films per page (default 50)
    #[serde(default = "default_limit")]
    pub limit: i64,
    /// Page number, starting at 1
    #[serde(default = "default_page")]
    pub page: i64,
    /// Genre uuid to filter by
    pub genre: Option<Uuid>,
}

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct PageParams {
    /// Field to sort by, `-` prefix for descending
    pub sort: Option<String>,
    /// Films per page (default 50)
    #[serde(default = "default_limit")]
    pub limit: i64,
    /// Page number, starting at 1
    #[serde(default = "default_page")]
    pub page: i64,
}

impl From<PageParams> for Pagination {
    fn from(params: PageParams) -> Self {
        Self {
            sort: params.sort,
            limit: params.limit,
            page: params.page,
        }
    }
}

impl From<SearchParams> for FilmSearch {
    fn from(params: SearchParams) -> Self {
        Self {
            pagination: Pagination {
                sort: params.sort,
                limit: params.limit,
                page: params.page,
            },
            query: params.query,
            genre: None,
        }
    }
}

impl From<ListParams> for FilmSearch {
    fn from(params: ListParams) -> Self {
        Self {
            pagination: Pagination {
                sort: params.sort,
                limit: params.limit,
                page: params.page,
            },
            query: None,
            genre: params.genre,
        }
    }
}

/// Short form used in lists
#[derive(Debug, Serialize, Deserialize, PartialEq, ToSchema)]
pub struct FilmSummary {
    pub uuid: Uuid,
    pub title: String,
    pub imdb_rating: Option<f64>,
}

impl From<&Film> for FilmSummary {
    fn from(film: &Film) -> Self {
        Self {
            uuid: film.id,
            title: film.title.clone(),
            imdb_rating: film.imdb_rating,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, PartialEq, ToSchema)]
pub struct GenreSummary {
    pub uuid: Uuid,
    pub name: String,
}

impl From<GenreRef> for GenreSummary {
    fn from(genre: GenreRef) -> Self {
        Self {
            uuid: genre.id,
            name: genre.name,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, PartialEq, ToSchema)]
pub struct PersonSummary {
    pub uuid: Uuid,
    pub full_name: String,
}

impl From<PersonRef> for PersonSummary {
    fn from(person: PersonRef) -> Self {
        Self {
            uuid: person.id,
            full_name: person.name,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, PartialEq, ToSchema)]
pub struct FilmDetail {
    pub uuid: Uuid,
    pub title: String,
    pub imdb_rating: Option<f64>,
    pub description: Option<String>,
    pub genre: Vec<GenreSummary>,
    pub actors: Vec<PersonSummary>,
    pub writers: Vec<PersonSummary>,
    pub director: Option<String>,
}

impl From<Film> for FilmDetail {
    fn from(film: Film) -> Self {
        Self {
            uuid: film.id,
            title: film.title,
            imdb_rating: film.imdb_rating,
            description: film.description,
            genre: film.genre.into_iter().map(GenreSummary::from).collect(),
            actors: film.actors.into_iter().map(PersonSummary::from).collect(),
            writers: film.writers.into_iter().map(PersonSummary::from).collect(),
            director: film.director,
        }
    }
}

fn summaries(films: &[Film]) -> Vec<FilmSummary> {
    films.iter().map(FilmSummary::from).collect()
}

// Handlers

/// Search films
///
/// Fuzzy search over film titles.
#[utoipa::path(
    get,
    path = "/api/v1/films/search",
    params(SearchParams),
    responses(
        (status = 200, description = "Matching films", body = [FilmSummary]),
        (status = 400, description = "Search engine rejected the request", body = ErrorBody),
    ),
    tag = "films"
)]
pub async fn search_films(
    State(state): State<AppState>,
    Query(params): Query<SearchParams>,
) -> AppResult<Json<Vec<FilmSummary>>> {
    let search = FilmSearch::from(params);
    tracing::info!(
        query = ?search.query,
        limit = search.pagination.limit,
        page = search.pagination.page,
        "Searching films"
    );

    let films = state.film_service.search(&search).await?;
    Ok(Json(summaries(&films)))
}

/// Similar films
///
/// Films sharing genres with `film_id`, never including `film_id` itself.
#[utoipa::path(
    get,
    path = "/api/v1/films/same/{film_id}",
    params(
        ("film_id" = Uuid, Path, description = "Film uuid"),
        PageParams,
    ),
    responses(
        (status = 200, description = "Similar films", body = [FilmSummary]),
        (status = 400, description = "Search engine rejected the request", body = ErrorBody),
        (status = 404, description = "Film does not exist or has no similar films", body = ErrorBody),
    ),
    tag = "films"
)]
pub async fn same_films(
    State(state): State<AppState>,
    Path(film_id): Path<Uuid>,
    Query(params): Query<PageParams>,
) -> AppResult<Json<Vec<FilmSummary>>> {
    let pagination = Pagination::from(params);
    tracing::info!(film_id = %film_id, "Looking up similar films");

    let films = state
        .film_service
        .find_similar(film_id, &pagination)
        .await?
        .ok_or_else(|| AppError::NotFound(SIMILAR_NOT_FOUND.to_string()))?;

    let same: Vec<FilmSummary> = films
        .iter()
        .filter(|film| film.id != film_id)
        .map(FilmSummary::from)
        .collect();
    Ok(Json(same))
}

/// Film list
///
/// Short information on several films, optionally restricted to one genre.
#[utoipa::path(
    get,
    path = "/api/v1/films/",
    params(ListParams),
    responses(
        (status = 200, description = "Films", body = [FilmSummary]),
        (status = 400, description = "Search engine rejected the request", body = ErrorBody),
    ),
    tag = "films"
)]
pub async fn list_films(
    State(state): State<AppState>,
    Query(params): Query<ListParams>,
) -> AppResult<Json<Vec<FilmSummary>>> {
    let search = FilmSearch::from(params);
    tracing::info!(
        genre = ?search.genre,
        limit = search.pagination.limit,
        page = search.pagination.page,
        "Listing films"
    );

    let films = state.film_service.search(&search).await?;
    Ok(Json(summaries(&films)))
}

/// Film details
///
/// Detailed information on a single film.
#[utoipa::path(
    get,
    path = "/api/v1/films/{film_id}",
    params(("film_id" = Uuid, Path, description = "Film uuid")),
    responses(
        (status = 200, description = "Film", body = FilmDetail),
        (status = 404, description = "Film not found", body = ErrorBody),
    ),
    tag = "films"
)]
pub async fn film_details(
    State(state): State<AppState>,
    Path(film_id): Path<Uuid>,
) -> AppResult<Json<FilmDetail>> {
    let film = state
        .film_service
        .get_by_id(film_id)
        .await?
        .ok_or_else(|| AppError::NotFound(FILM_NOT_FOUND.to_string()))?;

    Ok(Json(FilmDetail::from(film)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::routes::create_router;
    use crate::services::MockFilmService;
    use axum::http::StatusCode;
    use axum_test::TestServer;
    use serde_json::{json, Value};
    use std::sync::Arc;

    fn create_test_server(mock: MockFilmService) -> TestServer {
        let state = AppState::new(Arc::new(mock));
        TestServer::new(create_router(state)).unwrap()
    }

    fn rejection() -> AppError {
        AppError::SearchRejected(json!({
            "type": "illegal_argument_exception",
            "reason": "Result window is too large"
        }))
    }

    #[tokio::test]
    async fn test_search_applies_default_pagination() {
        let mut mock = MockFilmService::new();
        let id = Uuid::new_v4();
        mock.expect_search()
            .withf(|params| {
                params.query.as_deref() == Some("matrix")
                    && params.genre.is_none()
                    && params.pagination
                        == Pagination {
                            sort: None,
                            limit: 50,
                            page: 1,
                        }
            })
            .times(1)
            .returning(move |_| Ok(vec![Film::new(id, "The Matrix", Some(8.7))]));

        let server = create_test_server(mock);
        let response = server.get("/api/v1/films/search?query=matrix").await;

        response.assert_status_ok();
        let films: Vec<FilmSummary> = response.json();
        assert_eq!(
            films,
            vec![FilmSummary {
                uuid: id,
                title: "The Matrix".to_string(),
                imdb_rating: Some(8.7),
            }]
        );
    }

    #[tokio::test]
    async fn test_search_forwards_explicit_params_unvalidated() {
        let mut mock = MockFilmService::new();
        mock.expect_search()
            .withf(|params| {
                params.pagination.sort.as_deref() == Some("-imdb_rating")
                    && params.pagination.limit == -5
                    && params.pagination.page == 0
            })
            .times(1)
            .returning(|_| Ok(vec![]));

        let server = create_test_server(mock);
        let response = server
            .get("/api/v1/films/search?query=star&sort=-imdb_rating&limit=-5&page=0")
            .await;

        response.assert_status_ok();
        let films: Vec<FilmSummary> = response.json();
        assert!(films.is_empty());
    }

    #[tokio::test]
    async fn test_search_rejection_is_400_with_payload() {
        let mut mock = MockFilmService::new();
        mock.expect_search().returning(|_| Err(rejection()));

        let server = create_test_server(mock);
        let response = server.get("/api/v1/films/search?query=x").await;

        response.assert_status(StatusCode::BAD_REQUEST);
        let body: Value = response.json();
        assert_eq!(body["detail"]["reason"], "Result window is too large");
    }

    #[tokio::test]
    async fn test_list_filters_by_genre() {
        let genre = Uuid::new_v4();
        let mut mock = MockFilmService::new();
        mock.expect_search()
            .withf(move |params| params.genre == Some(genre) && params.query.is_none())
            .times(1)
            .returning(|_| {
                Ok(vec![
                    Film::new(Uuid::new_v4(), "Alien", Some(8.5)),
                    Film::new(Uuid::new_v4(), "Aliens", None),
                ])
            });

        let server = create_test_server(mock);
        let response = server
            .get("/api/v1/films")
            .add_query_param("genre", genre)
            .await;

        response.assert_status_ok();
        let films: Vec<Value> = response.json();
        assert_eq!(films.len(), 2);
        assert_eq!(films[1]["imdb_rating"], Value::Null);
    }

    #[tokio::test]
    async fn test_list_answers_with_trailing_slash() {
        let genre = Uuid::new_v4();
        let mut mock = MockFilmService::new();
        mock.expect_search()
            .withf(move |params| params.genre == Some(genre))
            .times(2)
            .returning(|_| Ok(vec![Film::new(Uuid::new_v4(), "Alien", Some(8.5))]));

        let server = create_test_server(mock);
        for url in ["/api/v1/films/", "/api/v1/films"] {
            let response = server.get(&format!("{}?genre={}", url, genre)).await;
            response.assert_status_ok();
            let films: Vec<FilmSummary> = response.json();
            assert_eq!(films.len(), 1);
        }
    }

    #[tokio::test]
    async fn test_list_rejection_is_400() {
        let mut mock = MockFilmService::new();
        mock.expect_search().returning(|_| Err(rejection()));

        let server = create_test_server(mock);
        let response = server.get("/api/v1/films?sort=nonexistent").await;

        response.assert_status(StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_list_with_malformed_genre_is_rejected_before_lookup() {
        let mut mock = MockFilmService::new();
        mock.expect_search().times(0);

        let server = create_test_server(mock);
        let response = server.get("/api/v1/films?genre=not-a-uuid").await;

        response.assert_status(StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_same_films_excludes_requested_film() {
        let film_id = Uuid::new_v4();
        let other = Uuid::new_v4();
        let mut mock = MockFilmService::new();
        mock.expect_find_similar()
            .withf(move |id, pagination| *id == film_id && pagination.limit == 50)
            .times(1)
            .returning(move |id, _| {
                Ok(Some(vec![
                    Film::new(id, "Matrix", Some(8.7)),
                    Film::new(other, "Dark City", Some(7.6)),
                ]))
            });

        let server = create_test_server(mock);
        let response = server.get(&format!("/api/v1/films/same/{}", film_id)).await;

        response.assert_status_ok();
        let films: Vec<FilmSummary> = response.json();
        assert_eq!(films.len(), 1);
        assert_eq!(films[0].uuid, other);
        assert!(films.iter().all(|f| f.uuid != film_id));
    }

    #[tokio::test]
    async fn test_same_films_with_only_itself_is_empty_list() {
        let film_id = Uuid::new_v4();
        let mut mock = MockFilmService::new();
        mock.expect_find_similar()
            .times(1)
            .returning(|id, _| Ok(Some(vec![Film::new(id, "Matrix", Some(8.7))])));

        let server = create_test_server(mock);
        let response = server.get(&format!("/api/v1/films/same/{}", film_id)).await;

        response.assert_status_ok();
        response.assert_json(&json!([]));
    }

    #[tokio::test]
    async fn test_same_films_missing_container_is_404() {
        let mut mock = MockFilmService::new();
        mock.expect_find_similar().returning(|_, _| Ok(None));

        let server = create_test_server(mock);
        let response = server
            .get(&format!("/api/v1/films/same/{}", Uuid::new_v4()))
            .await;

        response.assert_status(StatusCode::NOT_FOUND);
        response.assert_json(&json!({ "detail": "film not exist or not results" }));
    }

    #[tokio::test]
    async fn test_same_films_reported_errors_are_400() {
        let mut mock = MockFilmService::new();
        mock.expect_find_similar().returning(|_, _| Err(rejection()));

        let server = create_test_server(mock);
        let response = server
            .get(&format!("/api/v1/films/same/{}", Uuid::new_v4()))
            .await;

        response.assert_status(StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_film_details_maps_every_field() {
        let film_id = Uuid::new_v4();
        let genre_id = Uuid::new_v4();
        let actor_id = Uuid::new_v4();
        let writer_id = Uuid::new_v4();

        let mut mock = MockFilmService::new();
        mock.expect_get_by_id()
            .withf(move |id| *id == film_id)
            .times(1)
            .returning(move |id| {
                Ok(Some(Film {
                    id,
                    title: "Matrix".to_string(),
                    imdb_rating: Some(8.7),
                    description: Some("Wake up, Neo.".to_string()),
                    genre: vec![GenreRef {
                        id: genre_id,
                        name: "Sci-Fi".to_string(),
                    }],
                    actors: vec![PersonRef {
                        id: actor_id,
                        name: "Keanu Reeves".to_string(),
                    }],
                    writers: vec![PersonRef {
                        id: writer_id,
                        name: "Lilly Wachowski".to_string(),
                    }],
                    director: Some("Lana Wachowski".to_string()),
                }))
            });

        let server = create_test_server(mock);
        let response = server.get(&format!("/api/v1/films/{}", film_id)).await;

        response.assert_status_ok();
        response.assert_json(&json!({
            "uuid": film_id,
            "title": "Matrix",
            "imdb_rating": 8.7,
            "description": "Wake up, Neo.",
            "genre": [{ "uuid": genre_id, "name": "Sci-Fi" }],
            "actors": [{ "uuid": actor_id, "full_name": "Keanu Reeves" }],
            "writers": [{ "uuid": writer_id, "full_name": "Lilly Wachowski" }],
            "director": "Lana Wachowski"
        }));
    }

    #[tokio::test]
    async fn test_film_details_not_found() {
        let mut mock = MockFilmService::new();
        mock.expect_get_by_id().returning(|_| Ok(None));

        let server = create_test_server(mock);
        let response = server
            .get(&format!("/api/v1/films/{}", Uuid::new_v4()))
            .await;

        response.assert_status(StatusCode::NOT_FOUND);
        response.assert_json(&json!({ "detail": "film not found" }));
    }

    #[tokio::test]
    async fn test_backend_failure_is_500() {
        let mut mock = MockFilmService::new();
        mock.expect_get_by_id()
            .returning(|_| Err(AppError::ExternalApi("cluster red".to_string())));

        let server = create_test_server(mock);
        let response = server
            .get(&format!("/api/v1/films/{}", Uuid::new_v4()))
            .await;

        response.assert_status(StatusCode::INTERNAL_SERVER_ERROR);
    }
}
