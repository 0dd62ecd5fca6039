//! Grounded question answering over the hybrid index.

pub mod assembler;
pub mod eval;
pub mod gate;
pub mod ingestion;
pub mod pipeline;

pub use eval::{EvalQuestion, EvalReport, EvalSummary};
pub use gate::{GateDecision, GroundingGate, RefusalReason};
pub use ingestion::{open_index, IngestFailure, IngestReport, Ingestor};
pub use pipeline::RagPipeline;
