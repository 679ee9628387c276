//! Artwork provider abstraction
//!
//! A provider answers two questions for the poster pipeline: what artwork does
//! the remote service know about for a movie, and is a given image URL actually
//! renderable. Keeping both behind one trait lets the resolver run against a
//! test double without any network.

use crate::{
    error::AppResult,
    models::{ArtworkMetadata, MovieId},
};

pub mod tmdb;

pub use tmdb::TmdbProvider;

#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait ArtworkProvider: Send + Sync {
    /// Fetch artwork metadata for a movie
    async fn fetch_metadata(&self, movie_id: &MovieId) -> AppResult<ArtworkMetadata>;

    /// Check that `url` exists and its body decodes as an image
    async fn verify_image(&self, url: &str) -> AppResult<()>;

    /// Provider name for logging and debugging
    fn name(&self) -> &'static str;
}
