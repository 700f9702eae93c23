mod film;

pub use film::{Film, FilmDocument, GenreRef, Hit, PersonRef, SearchHits, SearchResponse};
