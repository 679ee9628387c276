use std::sync::Arc;

use crate::{
    error::{AppError, AppResult},
    models::{MovieId, RecommendationStatus, RecommendedMovie},
    services::posters::{PosterFetcher, ProgressObserver},
    store::SimilarityStore,
};

/// Default number of neighbours returned per title
pub const DEFAULT_RECOMMENDATION_COUNT: usize = 5;

/// Titles and posters for one request, positionally aligned
#[derive(Debug, Clone, PartialEq)]
pub struct Recommendations {
    pub names: Vec<String>,
    pub posters: Vec<String>,
    pub status: RecommendationStatus,
    /// User-facing explanation when nothing was recommended
    pub message: Option<String>,
}

impl Recommendations {
    fn empty(status: RecommendationStatus, message: String) -> Self {
        Self {
            names: Vec::new(),
            posters: Vec::new(),
            status,
            message: Some(message),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    pub fn movies(&self) -> Vec<RecommendedMovie> {
        self.names
            .iter()
            .zip(&self.posters)
            .map(|(title, poster_url)| RecommendedMovie {
                title: title.clone(),
                poster_url: poster_url.clone(),
            })
            .collect()
    }
}

/// Ranks a similarity row and returns the `k` best neighbours of `query`
///
/// Sorting is stable, so equal scores keep ascending index order. The query
/// itself is always excluded, even when another title ties it at the top.
pub fn rank_neighbors(row: &[f32], query: usize, k: usize) -> Vec<usize> {
    let mut scored: Vec<(usize, f32)> = row.iter().copied().enumerate().collect();
    scored.sort_by(|a, b| b.1.total_cmp(&a.1));

    scored
        .into_iter()
        .map(|(index, _)| index)
        .filter(|&index| index != query)
        .take(k)
        .collect()
}

/// Turns a selected title into ranked recommendations with posters
pub struct RecommendationEngine {
    store: Arc<SimilarityStore>,
    fetcher: PosterFetcher,
    count: usize,
}

impl RecommendationEngine {
    pub fn new(store: Arc<SimilarityStore>, fetcher: PosterFetcher, count: usize) -> Self {
        Self {
            store,
            fetcher,
            count,
        }
    }

    pub fn store(&self) -> &SimilarityStore {
        &self.store
    }

    /// Recommends titles similar to `title`
    ///
    /// Never fails: an unknown title yields a `NotFound` outcome and any
    /// internal failure a `Failed` outcome, both with empty sequences.
    pub async fn recommend(&self, title: &str, observer: &dyn ProgressObserver) -> Recommendations {
        let Some(index) = self.store.position_of(title) else {
            tracing::info!(title = %title, "Selected title not in store");
            return Recommendations::empty(
                RecommendationStatus::NotFound,
                format!("Movie '{}' not found in the database", title),
            );
        };

        match self.recommend_from(index, observer).await {
            Ok(recommendations) => recommendations,
            Err(e) => {
                tracing::error!(title = %title, error = %e, "Recommendation failed");
                Recommendations::empty(
                    RecommendationStatus::Failed,
                    format!("An error occurred while getting recommendations: {}", e),
                )
            }
        }
    }

    async fn recommend_from(
        &self,
        index: usize,
        observer: &dyn ProgressObserver,
    ) -> AppResult<Recommendations> {
        let row = self
            .store
            .row(index)
            .ok_or_else(|| AppError::Internal(format!("no similarity row for index {}", index)))?;

        let neighbors = rank_neighbors(row, index, self.count);

        let mut ids: Vec<MovieId> = Vec::with_capacity(neighbors.len());
        let mut names = Vec::with_capacity(neighbors.len());
        for neighbor in neighbors {
            let movie = self.store.movie(neighbor).ok_or_else(|| {
                AppError::Internal(format!("no movie at index {}", neighbor))
            })?;
            ids.push(movie.id.clone());
            names.push(movie.title.clone());
        }

        let posters = self.fetcher.fetch_all(&ids, observer).await?;

        tracing::info!(
            query_index = index,
            recommended = names.len(),
            "Recommendations assembled"
        );

        Ok(Recommendations {
            names,
            posters,
            status: RecommendationStatus::Found,
            message: None,
        })
    }
}
