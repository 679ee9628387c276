//! TMDB (The Movie Database) provider
//!
//! Metadata comes from `GET {api_url}/movie/{id}` authenticated with a v4 read
//! access token. Posters live on a separate image CDN, which is fetched with its
//! own client so that relaxed certificate checks never apply to the API.

use reqwest::{header, StatusCode};

use crate::{
    error::{AppError, AppResult},
    http::HttpClient,
    models::{ArtworkMetadata, MovieId, TmdbMovieDetails},
    services::providers::ArtworkProvider,
};

#[derive(Clone)]
pub struct TmdbProvider {
    api_client: HttpClient,
    image_client: HttpClient,
    api_token: String,
    api_url: String,
}

impl TmdbProvider {
    pub fn new(
        api_client: HttpClient,
        image_client: HttpClient,
        api_token: String,
        api_url: String,
    ) -> Self {
        Self {
            api_client,
            image_client,
            api_token,
            api_url: api_url.trim_end_matches('/').to_string(),
        }
    }

    fn movie_url(&self, movie_id: &MovieId) -> String {
        format!("{}/movie/{}", self.api_url, movie_id)
    }
}

#[async_trait::async_trait]
impl ArtworkProvider for TmdbProvider {
    async fn fetch_metadata(&self, movie_id: &MovieId) -> AppResult<ArtworkMetadata> {
        let request = self
            .api_client
            .get(&self.movie_url(movie_id))
            .bearer_auth(&self.api_token)
            .header(header::ACCEPT, "application/json");

        let response = self.api_client.send(request).await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(AppError::ExternalApi(format!(
                "TMDB API returned status {} for movie {}: {}",
                status, movie_id, body
            )));
        }

        let details: TmdbMovieDetails = response.json().await?;

        tracing::debug!(
            movie_id = %movie_id,
            poster_path = ?details.poster_path,
            provider = "tmdb",
            "Movie metadata fetched"
        );

        Ok(details.into())
    }

    async fn verify_image(&self, url: &str) -> AppResult<()> {
        let head = self.image_client.send(self.image_client.head(url)).await?;
        if head.status() != StatusCode::OK {
            return Err(AppError::ExternalApi(format!(
                "HEAD {} returned status {}",
                url,
                head.status()
            )));
        }

        let response = self.image_client.send(self.image_client.get(url)).await?;
        if response.status() != StatusCode::OK {
            return Err(AppError::ExternalApi(format!(
                "GET {} returned status {}",
                url,
                response.status()
            )));
        }

        let bytes = response.bytes().await?;
        image::load_from_memory(&bytes)?;

        Ok(())
    }

    fn name(&self) -> &'static str {
        "tmdb"
    }
}
