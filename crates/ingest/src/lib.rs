//! Document ingestion: text extraction, page chunking, and embedding.

pub mod document;
pub mod embedding;
pub mod prepare;

pub use document::chunker::{chunk_document, chunk_page};
pub use document::{extract, DocumentKind, ExtractedDocument, ExtractionError, PageContent};
pub use embedding::{create_embedder, Embedder, EmbeddingError};
pub use prepare::{discover_documents, ChunkedDocument, DocumentPreparer};
