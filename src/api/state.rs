use std::sync::Arc;

use crate::{
    cache::TtlCache,
    config::Config,
    error::AppResult,
    http::{build_client, HttpClientConfig},
    models::{ArtworkMetadata, MovieId},
    services::{
        providers::{ArtworkProvider, TmdbProvider},
        PosterFetcher, PosterResolver, PosterSource, RecommendationEngine,
    },
    store::SimilarityStore,
};

/// Shared application state
///
/// Everything in here is built once at startup and shared read-only by handlers.
#[derive(Clone)]
pub struct AppState {
    pub engine: Arc<RecommendationEngine>,
}

impl AppState {
    /// Wires the engine from an already-built poster source
    pub fn new(
        store: Arc<SimilarityStore>,
        posters: Arc<dyn PosterSource>,
        concurrency: usize,
        recommendation_count: usize,
    ) -> Self {
        let fetcher = PosterFetcher::new(posters, concurrency);
        Self {
            engine: Arc::new(RecommendationEngine::new(
                store,
                fetcher,
                recommendation_count,
            )),
        }
    }

    /// Builds the production state: HTTP clients, TMDB provider, metadata cache
    ///
    /// Returns the metadata cache as well so the caller can run its janitor.
    pub fn from_config(
        config: &Config,
        store: Arc<SimilarityStore>,
    ) -> AppResult<(Self, TtlCache<MovieId, ArtworkMetadata>)> {
        let api_client = build_client(&HttpClientConfig::for_api(config.request_timeout()))?;
        let image_client = build_client(&HttpClientConfig::for_images(config.request_timeout()))?;

        let provider: Arc<dyn ArtworkProvider> = Arc::new(TmdbProvider::new(
            api_client,
            image_client,
            config.tmdb_api_token.clone(),
            config.tmdb_api_url.clone(),
        ));

        let cache = TtlCache::new(config.metadata_cache_ttl());
        let resolver = PosterResolver::new(provider, cache.clone(), config.tmdb_image_url.clone());

        let state = Self::new(
            store,
            Arc::new(resolver),
            config.poster_concurrency,
            config.recommendation_count,
        );

        Ok((state, cache))
    }
}
