/// Elasticsearch-backed film lookup
///
/// Talks to the cluster's REST API directly with reqwest:
/// 1. Search / list: POST /{index}/_search with a bool query built from the request
/// 2. By id: GET /{index}/_doc/{id}
/// 3. Similar: by id, then a search for films sharing at least one genre
use crate::{
    error::{AppError, AppResult},
    models::{Film, FilmDocument, SearchResponse},
    services::{FilmSearch, FilmService, Pagination},
};
use reqwest::{Client as HttpClient, Response, StatusCode};
use serde::Deserialize;
use serde_json::{json, Map, Value};
use uuid::Uuid;

#[derive(Clone)]
pub struct ElasticFilmService {
    http_client: HttpClient,
    api_url: String,
    index: String,
}

#[derive(Debug, Deserialize)]
struct GetDocumentResponse {
    #[serde(default)]
    found: bool,
    #[serde(rename = "_source")]
    source: Option<FilmDocument>,
}

impl ElasticFilmService {
    pub fn new(api_url: String, index: String) -> Self {
        Self {
            http_client: HttpClient::new(),
            api_url: api_url.trim_end_matches('/').to_string(),
            index,
        }
    }

    async fn run_search(&self, body: &Value) -> AppResult<Vec<Film>> {
        let url = format!("{}/{}/_search", self.api_url, self.index);
        let response = self.http_client.post(&url).json(body).send().await?;
        let response = Self::check_status(response).await?;

        let results: SearchResponse = response.json().await?;
        Ok(results.into_films())
    }

    /// Turns non-success responses into errors.
    ///
    /// 4xx means the engine rejected what we asked for and becomes
    /// `SearchRejected`; anything else is the engine's own failure.
    async fn check_status(response: Response) -> AppResult<Response> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        if status.is_client_error() {
            tracing::warn!(status = %status, "Search engine rejected request");
            return Err(AppError::SearchRejected(rejection_payload(&body)));
        }

        Err(AppError::ExternalApi(format!(
            "Elasticsearch returned status {}: {}",
            status, body
        )))
    }
}

#[async_trait::async_trait]
impl FilmService for ElasticFilmService {
    async fn search(&self, params: &FilmSearch) -> AppResult<Vec<Film>> {
        let body = build_search_body(params);
        let films = self.run_search(&body).await?;

        tracing::info!(
            query = ?params.query,
            genre = ?params.genre,
            results = films.len(),
            provider = self.name(),
            "Film search completed"
        );

        Ok(films)
    }

    async fn find_similar(
        &self,
        film_id: Uuid,
        pagination: &Pagination,
    ) -> AppResult<Option<Vec<Film>>> {
        let Some(film) = self.get_by_id(film_id).await? else {
            return Ok(None);
        };

        let genre_ids: Vec<Uuid> = film.genre.iter().map(|g| g.id).collect();
        let body = build_similar_body(&genre_ids, pagination);
        let films = self.run_search(&body).await?;

        tracing::info!(
            film_id = %film_id,
            genres = genre_ids.len(),
            results = films.len(),
            provider = self.name(),
            "Similar films lookup completed"
        );

        if films.is_empty() {
            return Ok(None);
        }
        Ok(Some(films))
    }

    async fn get_by_id(&self, film_id: Uuid) -> AppResult<Option<Film>> {
        let url = format!("{}/{}/_doc/{}", self.api_url, self.index, film_id);
        let response = self.http_client.get(&url).send().await?;

        if response.status() == StatusCode::NOT_FOUND {
            tracing::debug!(film_id = %film_id, "Film not in index");
            return Ok(None);
        }

        let response = Self::check_status(response).await?;
        let document: GetDocumentResponse = response.json().await?;

        if !document.found {
            return Ok(None);
        }
        Ok(document.source.map(Film::from))
    }

    async fn ping(&self) -> bool {
        match self.http_client.get(&self.api_url).send().await {
            Ok(response) => response.status().is_success(),
            Err(e) => {
                tracing::debug!(error = %e, "Ping failed");
                false
            }
        }
    }

    fn name(&self) -> &'static str {
        "elasticsearch"
    }
}

/// Offset of the first hit for a 1-based page number
fn page_offset(pagination: &Pagination) -> i64 {
    pagination
        .page
        .saturating_sub(1)
        .saturating_mul(pagination.limit)
}

/// `"field"` sorts ascending, `"-field"` descending
fn sort_clause(sort: &str) -> Value {
    match sort.strip_prefix('-') {
        Some(field) => json!([{ field: { "order": "desc" } }]),
        None => json!([{ sort: { "order": "asc" } }]),
    }
}

fn genre_filter(genre_id: Uuid) -> Value {
    json!({
        "nested": {
            "path": "genre",
            "query": { "term": { "genre.id": genre_id } }
        }
    })
}

fn paged_body(query: Value, pagination: &Pagination) -> Value {
    let mut body = Map::new();
    body.insert("from".to_string(), json!(page_offset(pagination)));
    body.insert("size".to_string(), json!(pagination.limit));
    body.insert("query".to_string(), query);
    if let Some(sort) = pagination.sort.as_deref().filter(|s| !s.is_empty()) {
        body.insert("sort".to_string(), sort_clause(sort));
    }
    Value::Object(body)
}

pub(crate) fn build_search_body(params: &FilmSearch) -> Value {
    let text = params.query.as_deref().filter(|q| !q.trim().is_empty());

    let query = match (text, params.genre) {
        (None, None) => json!({ "match_all": {} }),
        (text, genre) => {
            let must: Vec<Value> = text
                .map(|q| json!({ "match": { "title": { "query": q, "fuzziness": "AUTO" } } }))
                .into_iter()
                .collect();
            let filter: Vec<Value> = genre.map(genre_filter).into_iter().collect();
            json!({ "bool": { "must": must, "filter": filter } })
        }
    };

    paged_body(query, &params.pagination)
}

pub(crate) fn build_similar_body(genre_ids: &[Uuid], pagination: &Pagination) -> Value {
    let should: Vec<Value> = genre_ids.iter().copied().map(genre_filter).collect();
    let query = json!({
        "bool": {
            "should": should,
            "minimum_should_match": 1
        }
    });

    paged_body(query, pagination)
}

/// The engine's `error` object when present, otherwise the whole body
fn rejection_payload(body: &str) -> Value {
    match serde_json::from_str::<Value>(body) {
        Ok(mut value) => match value.get_mut("error").map(Value::take) {
            Some(error) => error,
            None => value,
        },
        Err(_) => Value::String(body.to_string()),
    }
}
