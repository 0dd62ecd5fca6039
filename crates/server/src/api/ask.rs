//! Grounded question answering.

use std::sync::Arc;

use airman_core::{AnswerRecord, ScoredChunk};
use axum::extract::State;
use axum::Json;
use serde::{Deserialize, Serialize};

use crate::state::AppState;

use super::{api_error, ApiError, QueryErrorResponse};

#[derive(Deserialize, utoipa::ToSchema)]
pub struct AskRequest {
    pub question: String,
    /// Include the evidence chunks and their scores in the response.
    #[serde(default)]
    pub debug: bool,
}

#[derive(Serialize, utoipa::ToSchema)]
pub struct AskResponse {
    pub answer: String,
    pub citations: Vec<String>,
    #[schema(value_type = Vec<Object>)]
    pub chunks: Vec<ScoredChunk>,
}

impl From<AnswerRecord> for AskResponse {
    fn from(record: AnswerRecord) -> Self {
        Self {
            answer: record.answer_text,
            citations: record.citations,
            chunks: record.chunks,
        }
    }
}

/// Answer a question from the indexed documents
///
/// Returns the grounded answer with `"<file> page <n>"` citations, or the
/// fixed refusal text with no citations when the documents do not cover it.
#[utoipa::path(
    post,
    path = "/ask",
    tag = "Ask",
    request_body = AskRequest,
    responses(
        (status = 200, description = "Grounded answer or refusal", body = AskResponse),
        (status = 400, description = "Empty question", body = QueryErrorResponse),
        (status = 503, description = "Generation backend unavailable", body = QueryErrorResponse),
        (status = 504, description = "Generation timed out", body = QueryErrorResponse)
    )
)]
pub async fn ask(
    State(state): State<Arc<AppState>>,
    Json(req): Json<AskRequest>,
) -> Result<Json<AskResponse>, ApiError> {
    let record = state.pipeline.ask(&req.question, req.debug).await.map_err(|e| {
        if e.is_generation_failure() {
            tracing::warn!(provider = %state.llm_provider, error = %e, "Generation failed");
        }
        api_error(e)
    })?;
    Ok(Json(record.into()))
}
