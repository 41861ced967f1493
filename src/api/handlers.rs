use axum::{
    extract::{Query, State},
    http::StatusCode,
    Extension, Json,
};
use serde::Deserialize;
use serde_json::{json, Value};

use super::AppState;
use crate::{
    error::{AppError, AppResult},
    middleware::RequestId,
    models::GraphResponse,
};

#[derive(Debug, Deserialize)]
pub struct GraphQuery {
    #[serde(default)]
    pub user_id: Option<String>,
    #[serde(default)]
    pub debug: Option<bool>,
}

/// Health check endpoint
pub async fn health_check() -> (StatusCode, Json<Value>) {
    (StatusCode::OK, Json(json!({ "status": "healthy" })))
}

/// Ranked event graph for one user
pub async fn get_graph_recommendations(
    State(state): State<AppState>,
    Extension(request_id): Extension<RequestId>,
    Query(query): Query<GraphQuery>,
) -> AppResult<Json<GraphResponse>> {
    let user_id = query
        .user_id
        .as_deref()
        .map(str::trim)
        .ok_or_else(|| AppError::InvalidInput("user_id is required".to_string()))?;
    if user_id.is_empty() {
        return Err(AppError::InvalidInput("user_id must not be empty".to_string()));
    }

    let debug_flag = query.debug.unwrap_or(false);
    tracing::info!(
        request_id = %request_id,
        user_id = %user_id,
        debug = debug_flag,
        "Processing graph recommendation request"
    );

    let response = state.recommendations.recommend(user_id, debug_flag).await;

    match &response {
        Ok(graph) => tracing::info!(
            request_id = %request_id,
            ranked = graph.scores.len(),
            "Graph recommendations completed"
        ),
        Err(e) => tracing::warn!(
            request_id = %request_id,
            error = %e,
            "Graph recommendations failed"
        ),
    }

    Ok(Json(response?))
}
