//! OpenAPI documentation aggregator, served via Scalar UI at `/docs`.

use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "airman API",
        version = "0.1.0",
        description = "Grounded question answering over aviation documents with hybrid dense and BM25 retrieval.",
    ),
    tags(
        (name = "Health", description = "Liveness and index status"),
        (name = "Ask", description = "Grounded answers with page citations, or a fixed refusal"),
        (name = "Ingest", description = "Rebuild the index from the data directory"),
    ),
    paths(
        crate::api::health::health,
        crate::api::ask::ask,
        crate::api::ingest::ingest,
    ),
    components(schemas(
        crate::api::QueryErrorResponse,
        crate::api::health::HealthResponse,
        crate::api::ask::AskRequest,
        crate::api::ask::AskResponse,
        crate::api::ingest::IngestResponse,
    ))
)]
pub struct ApiDoc;
