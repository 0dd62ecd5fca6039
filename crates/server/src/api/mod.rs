//! HTTP endpoint modules.
//!
//! Shared error body and the error-to-status mapping live here.

pub mod ask;
pub mod doc;
pub mod health;
pub mod ingest;

use airman_core::AirmanError;
use axum::http::StatusCode;
use axum::Json;
use serde::Serialize;

#[derive(Serialize, utoipa::ToSchema)]
pub struct QueryErrorResponse {
    pub error: String,
}

pub(crate) type ApiError = (StatusCode, Json<QueryErrorResponse>);

pub(crate) fn status_for(err: &AirmanError) -> StatusCode {
    match err {
        AirmanError::InvalidQuery(_) => StatusCode::BAD_REQUEST,
        AirmanError::IngestionInProgress => StatusCode::CONFLICT,
        AirmanError::GenerationTimeout(_) => StatusCode::GATEWAY_TIMEOUT,
        AirmanError::GenerationUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

pub(crate) fn api_error(err: AirmanError) -> ApiError {
    (
        status_for(&err),
        Json(QueryErrorResponse {
            error: err.to_string(),
        }),
    )
}

pub use ask::ask;
pub use health::health;
pub use ingest::ingest;
