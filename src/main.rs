use std::sync::Arc;

use anyhow::Context;
use tracing_subscriber::EnvFilter;

use movie_recommender::{
    api::{create_router, AppState},
    cache::DEFAULT_PURGE_INTERVAL,
    config::Config,
    store::SimilarityStore,
};

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("movie_recommender=info,tower_http=info")),
        )
        .init();

    if let Err(e) = run().await {
        tracing::error!("{:#}", e);
        std::process::exit(1);
    }
}

async fn run() -> anyhow::Result<()> {
    // Startup failures below abort before anything is served.
    let config = Config::from_env()?;

    let store = SimilarityStore::load_from_dir(&config.artifact_dir).with_context(|| {
        format!(
            "Error loading model files from {}",
            config.artifact_dir.display()
        )
    })?;

    let (state, metadata_cache) = AppState::from_config(&config, Arc::new(store))
        .context("Failed to build application state")?;
    let janitor = metadata_cache.spawn_janitor(DEFAULT_PURGE_INTERVAL);

    let app = create_router(state);

    let addr = format!("{}:{}", config.host, config.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    tracing::info!(
        addr = %addr,
        cache_ttl_secs = config.metadata_cache_ttl_secs,
        poster_concurrency = config.poster_concurrency,
        "Server running"
    );

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    janitor.shutdown().await;
    tracing::info!("Server stopped");

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
}
