use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A film as the rest of the application sees it, whatever the backend returned
#[derive(Debug, Clone, PartialEq)]
pub struct Film {
    pub id: Uuid,
    pub title: String,
    pub imdb_rating: Option<f64>,
    pub description: Option<String>,
    pub genre: Vec<GenreRef>,
    pub actors: Vec<PersonRef>,
    pub writers: Vec<PersonRef>,
    pub director: Option<String>,
}

impl Film {
    /// Film with only the fields a summary needs
    pub fn new(id: Uuid, title: impl Into<String>, imdb_rating: Option<f64>) -> Self {
        Self {
            id,
            title: title.into(),
            imdb_rating,
            description: None,
            genre: Vec::new(),
            actors: Vec::new(),
            writers: Vec::new(),
            director: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenreRef {
    pub id: Uuid,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PersonRef {
    pub id: Uuid,
    pub name: String,
}

// ============================================================================
// Elasticsearch Types
// ============================================================================

/// `_source` of a document in the films index
#[derive(Debug, Clone, Deserialize)]
pub struct FilmDocument {
    pub id: Uuid,
    pub title: String,
    #[serde(default)]
    pub imdb_rating: Option<f64>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub genre: Vec<GenreRef>,
    #[serde(default)]
    pub actors: Vec<PersonRef>,
    #[serde(default)]
    pub writers: Vec<PersonRef>,
    #[serde(default)]
    pub director: Option<String>,
}

impl From<FilmDocument> for Film {
    fn from(doc: FilmDocument) -> Self {
        Film {
            id: doc.id,
            title: doc.title,
            imdb_rating: doc.imdb_rating,
            description: doc.description,
            genre: doc.genre,
            actors: doc.actors,
            writers: doc.writers,
            director: doc.director,
        }
    }
}

/// Single search hit
#[derive(Debug, Deserialize)]
pub struct Hit {
    #[serde(rename = "_source")]
    pub source: FilmDocument,
}

#[derive(Debug, Deserialize)]
pub struct SearchHits {
    #[serde(default)]
    pub hits: Vec<Hit>,
}

/// Body of a `_search` response, reduced to what we read
#[derive(Debug, Deserialize)]
pub struct SearchResponse {
    pub hits: SearchHits,
}

impl SearchResponse {
    pub fn into_films(self) -> Vec<Film> {
        self.hits
            .hits
            .into_iter()
            .map(|hit| Film::from(hit.source))
            .collect()
    }
}
