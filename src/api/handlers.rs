use axum::{
    extract::{Query, State},
    http::StatusCode,
    Extension, Json,
};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::{
    error::{AppError, AppResult},
    middleware::request_id::RequestId,
    models::{MovieRecord, RecommendationResponse},
};

use super::AppState;

// Request/Response types

#[derive(Debug, Deserialize)]
pub struct RecommendationQuery {
    pub title: String,
}

#[derive(Debug, Serialize)]
pub struct MovieResponse {
    pub id: String,
    pub title: String,
}

impl From<&MovieRecord> for MovieResponse {
    fn from(movie: &MovieRecord) -> Self {
        Self {
            id: movie.id.to_string(),
            title: movie.title.clone(),
        }
    }
}

// Handlers

/// Health check endpoint
pub async fn health_check() -> (StatusCode, Json<Value>) {
    (StatusCode::OK, Json(json!({ "status": "healthy" })))
}

/// All selectable titles, in store order
pub async fn list_movies(State(state): State<AppState>) -> Json<Vec<MovieResponse>> {
    let movies = state
        .engine
        .store()
        .movies()
        .iter()
        .map(MovieResponse::from)
        .collect();
    Json(movies)
}

/// Recommendations with posters for the selected title
pub async fn recommend(
    State(state): State<AppState>,
    Extension(request_id): Extension<RequestId>,
    Query(params): Query<RecommendationQuery>,
) -> AppResult<Json<RecommendationResponse>> {
    if params.title.trim().is_empty() {
        return Err(AppError::InvalidInput("title cannot be empty".to_string()));
    }

    tracing::info!(
        request_id = %request_id,
        title = %params.title,
        "Processing recommendation request"
    );

    let progress = |completed: usize, total: usize| {
        tracing::debug!(request_id = %request_id, completed, total, "Loading movie posters");
    };
    let recommendations = state.engine.recommend(&params.title, &progress).await;

    tracing::info!(
        request_id = %request_id,
        status = ?recommendations.status,
        count = recommendations.names.len(),
        "Recommendation request completed"
    );

    Ok(Json(RecommendationResponse {
        query: params.title,
        status: recommendations.status,
        recommendations: recommendations.movies(),
        message: recommendations.message,
    }))
}
