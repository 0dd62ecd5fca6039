use std::time::Duration;

use thiserror::Error;

use crate::chunk::ChunkId;

#[derive(Error, Debug)]
pub enum AirmanError {
    /// Extraction or embedding failed for one document; that document is skipped.
    #[error("Ingestion failed for '{document}': {reason}")]
    Ingestion { document: String, reason: String },

    #[error("Dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },

    #[error("Ingestion is already running")]
    IngestionInProgress,

    #[error("Index not built: run ingestion first")]
    IndexNotBuilt,

    #[error("Chunk not found: {0}")]
    ChunkNotFound(ChunkId),

    #[error("Generation timed out after {0:?}")]
    GenerationTimeout(Duration),

    #[error("Generation unavailable: {0}")]
    GenerationUnavailable(String),

    #[error("Embedding failed: {0}")]
    Embedding(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Invalid query: {0}")]
    InvalidQuery(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialize(String),

    #[error("{0}")]
    Other(String),
}

impl AirmanError {
    pub fn ingestion(document: impl Into<String>, reason: impl ToString) -> Self {
        AirmanError::Ingestion {
            document: document.into(),
            reason: reason.to_string(),
        }
    }

    /// True for failures of the external generation collaborator, which callers
    /// must be able to tell apart from a grounded refusal.
    pub fn is_generation_failure(&self) -> bool {
        matches!(
            self,
            AirmanError::GenerationTimeout(_) | AirmanError::GenerationUnavailable(_)
        )
    }
}

pub type AirmanResult<T> = Result<T, AirmanError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_generator_failures_are_generation_failures() {
        assert!(AirmanError::GenerationTimeout(Duration::from_secs(60)).is_generation_failure());
        assert!(AirmanError::GenerationUnavailable("529".into()).is_generation_failure());
        assert!(!AirmanError::IndexNotBuilt.is_generation_failure());
        assert!(!AirmanError::Embedding("timeout".into()).is_generation_failure());
    }

    #[test]
    fn ingestion_error_names_document() {
        let e = AirmanError::ingestion("PHAK.pdf", "no extractable text");
        assert_eq!(e.to_string(), "Ingestion failed for 'PHAK.pdf': no extractable text");
    }
}

