use std::sync::Arc;

use crate::{
    cache::TtlCache,
    cached,
    error::AppResult,
    models::{ArtworkMetadata, MovieId},
    services::{posters::PosterSource, providers::ArtworkProvider},
};

/// Returned when the metadata service fails or knows no poster for the movie
pub const NO_POSTER_URL: &str = "https://via.placeholder.com/500x750?text=No+Poster+Available";

/// Returned when a poster path exists but neither size variant is renderable
pub const POSTER_NOT_FOUND_URL: &str =
    "https://via.placeholder.com/500x750?text=Movie+Poster+Not+Found";

/// Poster sizes published by the image CDN, in fallback order
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PosterSize {
    W500,
    W342,
}

impl PosterSize {
    pub const FALLBACK_ORDER: [PosterSize; 2] = [PosterSize::W500, PosterSize::W342];

    pub fn as_str(&self) -> &'static str {
        match self {
            PosterSize::W500 => "w500",
            PosterSize::W342 => "w342",
        }
    }
}

/// Resolves a movie id to a displayable poster URL
///
/// Resolution never fails: every error path ends in [`NO_POSTER_URL`] or
/// [`POSTER_NOT_FOUND_URL`], so one bad id cannot abort a batch.
#[derive(Clone)]
pub struct PosterResolver {
    provider: Arc<dyn ArtworkProvider>,
    cache: TtlCache<MovieId, ArtworkMetadata>,
    image_base_url: String,
}

impl PosterResolver {
    pub fn new(
        provider: Arc<dyn ArtworkProvider>,
        cache: TtlCache<MovieId, ArtworkMetadata>,
        image_base_url: String,
    ) -> Self {
        Self {
            provider,
            cache,
            image_base_url: image_base_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn cache(&self) -> &TtlCache<MovieId, ArtworkMetadata> {
        &self.cache
    }

    /// `{image_base}/{size}{poster_path}`
    pub fn poster_url(&self, size: PosterSize, poster_path: &str) -> String {
        format!("{}/{}{}", self.image_base_url, size.as_str(), poster_path)
    }

    async fn metadata(&self, movie_id: &MovieId) -> AppResult<ArtworkMetadata> {
        let provider = self.provider.clone();
        cached!(self.cache, movie_id.clone(), async move {
            provider.fetch_metadata(movie_id).await
        })
    }

    pub async fn resolve(&self, movie_id: &MovieId) -> String {
        let metadata = match self.metadata(movie_id).await {
            Ok(metadata) => metadata,
            Err(e) => {
                tracing::error!(
                    movie_id = %movie_id,
                    provider = self.provider.name(),
                    error = %e,
                    "Error fetching movie metadata"
                );
                return NO_POSTER_URL.to_string();
            }
        };

        let Some(poster_path) = metadata.poster_path() else {
            tracing::debug!(movie_id = %movie_id, "No poster path in metadata");
            return NO_POSTER_URL.to_string();
        };

        for size in PosterSize::FALLBACK_ORDER {
            let url = self.poster_url(size, poster_path);
            match self.provider.verify_image(&url).await {
                Ok(()) => return url,
                Err(e) => {
                    tracing::warn!(
                        movie_id = %movie_id,
                        url = %url,
                        error = %e,
                        "Poster failed verification"
                    );
                }
            }
        }

        POSTER_NOT_FOUND_URL.to_string()
    }
}

#[async_trait::async_trait]
impl PosterSource for PosterResolver {
    async fn resolve_poster(&self, movie_id: &MovieId) -> String {
        self.resolve(movie_id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AppError;
    use crate::services::providers::MockArtworkProvider;
    use mockall::predicate::eq;
    use std::time::Duration;

    const IMAGE_BASE: &str = "https://image.tmdb.org/t/p";

    fn resolver(provider: MockArtworkProvider) -> PosterResolver {
        PosterResolver::new(
            Arc::new(provider),
            TtlCache::new(Duration::from_secs(3600)),
            format!("{}/", IMAGE_BASE),
        )
    }

    fn with_name(mut provider: MockArtworkProvider) -> MockArtworkProvider {
        provider.expect_name().return_const("mock");
        provider
    }

    fn metadata(path: Option<&str>) -> ArtworkMetadata {
        ArtworkMetadata {
            poster_path: path.map(str::to_string),
        }
    }

    #[test]
    fn test_poster_url_format() {
        let resolver = resolver(MockArtworkProvider::new());
        assert_eq!(
            resolver.poster_url(PosterSize::W500, "/abc.jpg"),
            "https://image.tmdb.org/t/p/w500/abc.jpg"
        );
        assert_eq!(
            resolver.poster_url(PosterSize::W342, "/abc.jpg"),
            "https://image.tmdb.org/t/p/w342/abc.jpg"
        );
    }

    #[test]
    fn test_placeholders_are_distinct() {
        assert_ne!(NO_POSTER_URL, POSTER_NOT_FOUND_URL);
    }

    #[tokio::test]
    async fn test_network_error_returns_no_poster_placeholder() {
        let mut provider = with_name(MockArtworkProvider::new());
        provider
            .expect_fetch_metadata()
            .returning(|_| Err(AppError::ExternalApi("connection reset".to_string())));
        provider.expect_verify_image().never();

        let url = resolver(provider).resolve(&MovieId::new("1")).await;
        assert_eq!(url, NO_POSTER_URL);
    }

    #[tokio::test]
    async fn test_missing_poster_path_returns_no_poster_placeholder() {
        let mut provider = MockArtworkProvider::new();
        provider
            .expect_fetch_metadata()
            .returning(|_| Ok(metadata(None)));
        provider.expect_verify_image().never();

        let url = resolver(provider).resolve(&MovieId::new("1")).await;
        assert_eq!(url, NO_POSTER_URL);
    }

    #[tokio::test]
    async fn test_unreachable_image_returns_not_found_placeholder() {
        let mut provider = MockArtworkProvider::new();
        provider
            .expect_fetch_metadata()
            .returning(|_| Ok(metadata(Some("/gone.jpg"))));
        provider
            .expect_verify_image()
            .times(2)
            .returning(|_| Err(AppError::ExternalApi("HEAD returned 404".to_string())));

        let url = resolver(provider).resolve(&MovieId::new("1")).await;
        assert_eq!(url, POSTER_NOT_FOUND_URL);
    }

    #[tokio::test]
    async fn test_valid_image_returns_primary_url() {
        let mut provider = MockArtworkProvider::new();
        provider
            .expect_fetch_metadata()
            .returning(|_| Ok(metadata(Some("/avatar.jpg"))));
        provider
            .expect_verify_image()
            .with(eq("https://image.tmdb.org/t/p/w500/avatar.jpg"))
            .times(1)
            .returning(|_| Ok(()));

        let url = resolver(provider).resolve(&MovieId::new("19995")).await;
        assert_eq!(url, "https://image.tmdb.org/t/p/w500/avatar.jpg");
    }

    #[tokio::test]
    async fn test_falls_back_to_secondary_size() {
        let mut provider = with_name(MockArtworkProvider::new());
        provider
            .expect_fetch_metadata()
            .returning(|_| Ok(metadata(Some("/avatar.jpg"))));
        provider
            .expect_verify_image()
            .with(eq("https://image.tmdb.org/t/p/w500/avatar.jpg"))
            .returning(|_| Err(AppError::ExternalApi("decode failed".to_string())));
        provider
            .expect_verify_image()
            .with(eq("https://image.tmdb.org/t/p/w342/avatar.jpg"))
            .returning(|_| Ok(()));

        let url = resolver(provider).resolve(&MovieId::new("19995")).await;
        assert_eq!(url, "https://image.tmdb.org/t/p/w342/avatar.jpg");
    }

    #[tokio::test]
    async fn test_metadata_is_cached_between_calls() {
        let mut provider = MockArtworkProvider::new();
        provider
            .expect_fetch_metadata()
            .with(eq(MovieId::new("19995")))
            .times(1)
            .returning(|_| Ok(metadata(Some("/avatar.jpg"))));
        provider.expect_verify_image().returning(|_| Ok(()));

        let resolver = resolver(provider);
        resolver.resolve(&MovieId::new("19995")).await;
        resolver.resolve(&MovieId::new("19995")).await;

        assert_eq!(resolver.cache().len().await, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_metadata_refetched_after_ttl() {
        let mut provider = MockArtworkProvider::new();
        provider
            .expect_fetch_metadata()
            .with(eq(MovieId::new("27205")))
            .times(2)
            .returning(|_| Ok(metadata(Some("/inception.jpg"))));
        provider.expect_verify_image().returning(|_| Ok(()));

        let resolver = resolver(provider);
        let first = resolver.resolve(&MovieId::new("27205")).await;

        tokio::time::advance(Duration::from_secs(3601)).await;
        let second = resolver.resolve(&MovieId::new("27205")).await;

        assert_eq!(first, second);
        assert_eq!(first, "https://image.tmdb.org/t/p/w500/inception.jpg");
    }

    #[tokio::test]
    async fn test_failed_metadata_is_not_cached() {
        let mut provider = with_name(MockArtworkProvider::new());
        provider
            .expect_fetch_metadata()
            .times(2)
            .returning(|_| Err(AppError::ExternalApi("503".to_string())));

        let resolver = resolver(provider);
        resolver.resolve(&MovieId::new("7")).await;
        resolver.resolve(&MovieId::new("7")).await;

        assert!(resolver.cache().is_empty().await);
    }
}
