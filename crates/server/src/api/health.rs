use std::sync::Arc;

use axum::extract::State;
use axum::Json;
use serde::Serialize;

use crate::state::AppState;

#[derive(Serialize, utoipa::ToSchema)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
    pub index_ready: bool,
    pub chunk_count: usize,
    pub document_count: usize,
    pub embedder: String,
    pub llm_provider: String,
    pub ingesting: bool,
}

/// Service liveness and index status
#[utoipa::path(
    get,
    path = "/health",
    tag = "Health",
    responses((status = 200, description = "Service is up", body = HealthResponse))
)]
pub async fn health(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    let snapshot = state.index.current().await;
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
        index_ready: !snapshot.is_empty(),
        chunk_count: snapshot.chunk_count(),
        document_count: snapshot.manifest().documents.len(),
        embedder: snapshot.manifest().embedder.clone(),
        llm_provider: state.llm_provider.clone(),
        ingesting: state.ingestor.is_running(),
    })
}
