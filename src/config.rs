use std::path::PathBuf;
use std::time::Duration;

use serde::Deserialize;

/// Application configuration loaded from environment variables
#[derive(Deserialize, Clone)]
pub struct Config {
    /// TMDB API read access token (bearer)
    #[serde(default)]
    pub tmdb_api_token: String,

    /// TMDB API base URL
    #[serde(default = "default_tmdb_api_url")]
    pub tmdb_api_url: String,

    /// TMDB image CDN base URL, without a size segment
    #[serde(default = "default_tmdb_image_url")]
    pub tmdb_image_url: String,

    /// Directory holding `movie_list.json` and `similarity.json`
    #[serde(default = "default_artifact_dir")]
    pub artifact_dir: PathBuf,

    /// Server host address
    #[serde(default = "default_host")]
    pub host: String,

    /// Server port
    #[serde(default = "default_port")]
    pub port: u16,

    #[serde(default = "default_metadata_cache_ttl_secs")]
    pub metadata_cache_ttl_secs: u64,

    /// Per-call timeout for metadata and image requests
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,

    /// Maximum number of posters resolved at the same time
    #[serde(default = "default_poster_concurrency")]
    pub poster_concurrency: usize,

    /// Number of recommendations returned per title
    #[serde(default = "default_recommendation_count")]
    pub recommendation_count: usize,
}

fn default_tmdb_api_url() -> String {
    "https://api.themoviedb.org/3".to_string()
}

fn default_tmdb_image_url() -> String {
    "https://image.tmdb.org/t/p".to_string()
}

fn default_artifact_dir() -> PathBuf {
    PathBuf::from(".")
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    3000
}

fn default_metadata_cache_ttl_secs() -> u64 {
    3600
}

fn default_request_timeout_secs() -> u64 {
    10
}

fn default_poster_concurrency() -> usize {
    5
}

fn default_recommendation_count() -> usize {
    5
}

// Keeps the bearer token out of logs.
impl std::fmt::Debug for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Config")
            .field("tmdb_api_token", &"<redacted>")
            .field("tmdb_api_url", &self.tmdb_api_url)
            .field("tmdb_image_url", &self.tmdb_image_url)
            .field("artifact_dir", &self.artifact_dir)
            .field("host", &self.host)
            .field("port", &self.port)
            .field("metadata_cache_ttl_secs", &self.metadata_cache_ttl_secs)
            .field("request_timeout_secs", &self.request_timeout_secs)
            .field("poster_concurrency", &self.poster_concurrency)
            .field("recommendation_count", &self.recommendation_count)
            .finish()
    }
}

impl Config {
    /// Load configuration from environment variables, reading `.env` first
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();
        Self::from_vars(std::env::vars())
    }

    /// Load configuration from an explicit set of variables
    pub fn from_vars<I>(vars: I) -> anyhow::Result<Self>
    where
        I: IntoIterator<Item = (String, String)>,
    {
        let config = envy::from_iter::<_, Config>(vars)
            .map_err(|e| anyhow::anyhow!("Failed to load config: {}", e))?;

        if config.tmdb_api_token.trim().is_empty() {
            anyhow::bail!(
                "TMDB API token not found. Create a .env file in the project root with:\n\
                 \n    TMDB_API_TOKEN=your_token_here\n\n\
                 or export TMDB_API_TOKEN before starting the server."
            );
        }
        if config.poster_concurrency == 0 {
            anyhow::bail!("POSTER_CONCURRENCY must be at least 1");
        }

        Ok(config)
    }

    pub fn metadata_cache_ttl(&self) -> Duration {
        Duration::from_secs(self.metadata_cache_ttl_secs)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}
