use serde::{Deserialize, Serialize};
use std::fmt::Display;

/// Opaque identifier of a movie in the remote metadata service
///
/// Artifacts may carry ids as JSON numbers or strings; both are kept verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "RawMovieId", into = "String")]
pub struct MovieId(String);

#[derive(Deserialize)]
#[serde(untagged)]
enum RawMovieId {
    Number(u64),
    Text(String),
}

impl From<RawMovieId> for MovieId {
    fn from(raw: RawMovieId) -> Self {
        match raw {
            RawMovieId::Number(n) => MovieId(n.to_string()),
            RawMovieId::Text(s) => MovieId(s),
        }
    }
}

impl From<MovieId> for String {
    fn from(id: MovieId) -> Self {
        id.0
    }
}

impl MovieId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for MovieId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A title known to the similarity store
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MovieRecord {
    #[serde(alias = "movie_id")]
    pub id: MovieId,
    pub title: String,
}

impl MovieRecord {
    pub fn new(id: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            id: MovieId::new(id),
            title: title.into(),
        }
    }
}

/// Artwork-related metadata for one movie
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ArtworkMetadata {
    /// Relative path on the image CDN, e.g. `/qJ2tW6WMUDux911r6m7haRef0WH.jpg`
    pub poster_path: Option<String>,
}

impl ArtworkMetadata {
    /// Returns the poster path if it is present and non-empty
    pub fn poster_path(&self) -> Option<&str> {
        self.poster_path.as_deref().filter(|p| !p.trim().is_empty())
    }
}

// ============================================================================
// TMDB API Types
// ============================================================================

/// Subset of the `GET /movie/{id}` response that this service reads
#[derive(Debug, Clone, Deserialize)]
pub struct TmdbMovieDetails {
    #[serde(default)]
    pub poster_path: Option<String>,
}

impl From<TmdbMovieDetails> for ArtworkMetadata {
    fn from(details: TmdbMovieDetails) -> Self {
        ArtworkMetadata {
            poster_path: details.poster_path,
        }
    }
}

// ============================================================================
// Recommendation Types
// ============================================================================

/// How a recommendation request was resolved
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecommendationStatus {
    Found,
    NotFound,
    Failed,
}

/// One recommended movie as rendered by the presentation layer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecommendedMovie {
    pub title: String,
    pub poster_url: String,
}

/// Response body for the recommendations endpoint
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecommendationResponse {
    pub query: String,
    pub status: RecommendationStatus,
    pub message: Option<String>,
    pub recommendations: Vec<RecommendedMovie>,
}
