//! Full re-ingestion of the data directory.

use std::sync::Arc;

use airman_rag::{IngestFailure, IngestReport};
use axum::extract::State;
use axum::Json;
use serde::Serialize;
use tracing::info;

use crate::state::AppState;

use super::{api_error, ApiError, QueryErrorResponse};

#[derive(Serialize, utoipa::ToSchema)]
pub struct IngestResponse {
    pub documents_found: usize,
    pub documents_indexed: usize,
    pub chunks_indexed: usize,
    #[schema(value_type = Vec<Object>)]
    pub failures: Vec<IngestFailure>,
    pub elapsed_ms: u64,
}

impl From<IngestReport> for IngestResponse {
    fn from(r: IngestReport) -> Self {
        Self {
            documents_found: r.documents_found,
            documents_indexed: r.documents_indexed,
            chunks_indexed: r.chunks_indexed,
            failures: r.failures,
            elapsed_ms: r.elapsed_ms,
        }
    }
}

/// Rebuild the index from every document in the data directory
///
/// Unreadable documents are skipped and listed under `failures`. Queries keep
/// using the previous index until the new one is saved.
#[utoipa::path(
    post,
    path = "/ingest",
    tag = "Ingest",
    responses(
        (status = 200, description = "Index rebuilt", body = IngestResponse),
        (status = 409, description = "An ingestion run is already in progress", body = QueryErrorResponse),
        (status = 500, description = "Ingestion failed", body = QueryErrorResponse)
    )
)]
pub async fn ingest(State(state): State<Arc<AppState>>) -> Result<Json<IngestResponse>, ApiError> {
    info!(dir = %state.ingestor.data_dir().display(), "Ingestion requested");
    let report = state.ingestor.ingest().await.map_err(api_error)?;
    Ok(Json(report.into()))
}
