use std::fs;
use std::path::Path;

use crate::{
    error::{AppError, AppResult},
    models::MovieRecord,
};

/// File name of the serialized movie list inside the artifact directory
pub const MOVIE_LIST_FILE: &str = "movie_list.json";
/// File name of the serialized similarity matrix inside the artifact directory
pub const SIMILARITY_FILE: &str = "similarity.json";

/// Precomputed titles and their pairwise similarity scores
///
/// Row and column `i` of the matrix both refer to `movies[i]`. The store is
/// loaded once at startup and shared read-only for the process lifetime.
#[derive(Debug)]
pub struct SimilarityStore {
    movies: Vec<MovieRecord>,
    similarity: Vec<Vec<f32>>,
}

impl SimilarityStore {
    /// Builds a store, rejecting a matrix that is not square over `movies`
    pub fn new(movies: Vec<MovieRecord>, similarity: Vec<Vec<f32>>) -> AppResult<Self> {
        if similarity.len() != movies.len() {
            return Err(AppError::Artifact(format!(
                "similarity matrix has {} rows but there are {} movies",
                similarity.len(),
                movies.len()
            )));
        }

        if let Some((row, values)) = similarity
            .iter()
            .enumerate()
            .find(|(_, values)| values.len() != movies.len())
        {
            return Err(AppError::Artifact(format!(
                "similarity row {} has {} columns, expected {}",
                row,
                values.len(),
                movies.len()
            )));
        }

        Ok(Self { movies, similarity })
    }

    /// Loads `movie_list.json` and `similarity.json` from `dir`
    pub fn load_from_dir(dir: &Path) -> AppResult<Self> {
        let movies: Vec<MovieRecord> = read_json(&dir.join(MOVIE_LIST_FILE))?;
        let similarity: Vec<Vec<f32>> = read_json(&dir.join(SIMILARITY_FILE))?;

        let store = Self::new(movies, similarity)?;

        tracing::info!(
            movies = store.len(),
            dir = %dir.display(),
            "Loaded similarity store"
        );

        Ok(store)
    }

    pub fn movies(&self) -> &[MovieRecord] {
        &self.movies
    }

    pub fn movie(&self, index: usize) -> Option<&MovieRecord> {
        self.movies.get(index)
    }

    /// Index of the first movie whose title matches exactly
    pub fn position_of(&self, title: &str) -> Option<usize> {
        self.movies.iter().position(|m| m.title == title)
    }

    pub fn row(&self, index: usize) -> Option<&[f32]> {
        self.similarity.get(index).map(Vec::as_slice)
    }

    pub fn len(&self) -> usize {
        self.movies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.movies.is_empty()
    }
}

fn read_json<T: serde::de::DeserializeOwned>(path: &Path) -> AppResult<T> {
    let raw = fs::read_to_string(path)
        .map_err(|e| AppError::Artifact(format!("failed to read {}: {}", path.display(), e)))?;

    serde_json::from_str(&raw)
        .map_err(|e| AppError::Artifact(format!("failed to parse {}: {}", path.display(), e)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn write_artifacts(movies: &str, similarity: &str) -> TempDir {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join(MOVIE_LIST_FILE), movies).unwrap();
        fs::write(dir.path().join(SIMILARITY_FILE), similarity).unwrap();
        dir
    }

    #[test]
    fn test_load_from_dir() {
        let dir = write_artifacts(
            r#"[{"movie_id": 19995, "title": "Avatar"}, {"movie_id": 27205, "title": "Inception"}]"#,
            "[[1.0, 0.4], [0.4, 1.0]]",
        );

        let store = SimilarityStore::load_from_dir(dir.path()).unwrap();
        assert_eq!(store.len(), 2);
        assert_eq!(store.position_of("Inception"), Some(1));
        assert_eq!(store.row(0), Some(&[1.0, 0.4][..]));
        assert_eq!(store.movie(0).unwrap().id.as_str(), "19995");
    }

    #[test]
    fn test_missing_artifact_is_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = SimilarityStore::load_from_dir(dir.path()).unwrap_err();
        assert!(matches!(err, AppError::Artifact(_)));
        assert!(err.to_string().contains(MOVIE_LIST_FILE));
    }

    #[test]
    fn test_corrupt_artifact_is_error() {
        let dir = write_artifacts(r#"[{"movie_id": 1, "title": "Up"}]"#, "not json");
        let err = SimilarityStore::load_from_dir(dir.path()).unwrap_err();
        assert!(err.to_string().contains(SIMILARITY_FILE));
    }

    #[test]
    fn test_row_count_mismatch_rejected() {
        let movies = vec![MovieRecord::new("1", "Up"), MovieRecord::new("2", "Cars")];
        assert!(SimilarityStore::new(movies, vec![vec![1.0, 0.0]]).is_err());
    }

    #[test]
    fn test_ragged_row_rejected() {
        let movies = vec![MovieRecord::new("1", "Up"), MovieRecord::new("2", "Cars")];
        let err = SimilarityStore::new(movies, vec![vec![1.0, 0.0], vec![0.0]]).unwrap_err();
        assert!(err.to_string().contains("row 1"));
    }

    #[test]
    fn test_first_duplicate_title_wins() {
        let movies = vec![
            MovieRecord::new("1", "Heat"),
            MovieRecord::new("2", "Heat"),
        ];
        let store = SimilarityStore::new(movies, vec![vec![1.0, 0.5], vec![0.5, 1.0]]).unwrap();
        assert_eq!(store.position_of("Heat"), Some(0));
    }

    #[test]
    fn test_title_match_is_exact() {
        let movies = vec![MovieRecord::new("1", "Up")];
        let store = SimilarityStore::new(movies, vec![vec![1.0]]).unwrap();
        assert_eq!(store.position_of("up"), None);
        assert_eq!(store.position_of("Up "), None);
    }
}
