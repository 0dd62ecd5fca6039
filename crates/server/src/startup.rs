//! Server startup: backends, persisted index and shared state.

use std::sync::Arc;

use airman_core::{AirmanError, Config};
use airman_index::{Bm25Params, IndexSnapshot};
use airman_ingest::create_embedder;
use airman_llm::{create_provider, LlmProvider, UnavailableProvider};
use airman_rag::open_index;
use anyhow::Context;
use tracing::{info, warn};

use crate::state::AppState;

/// Load the saved index. A snapshot built with another embedding size is
/// unusable, so start empty and ask for re-ingestion instead of failing.
fn load_index(config: &Config) -> anyhow::Result<IndexSnapshot> {
    match open_index(config) {
        Ok(snapshot) => {
            if snapshot.is_empty() {
                info!(
                    index_dir = %config.storage.index_dir.display(),
                    "No index found; run ingestion before asking questions"
                );
            }
            Ok(snapshot)
        }
        Err(AirmanError::DimensionMismatch { expected, actual }) => {
            warn!(
                expected,
                actual,
                "Saved index has a different embedding size; starting empty, re-run ingestion"
            );
            Ok(IndexSnapshot::empty(
                config.embedding.dimensions,
                Bm25Params::from(&config.retrieval),
            ))
        }
        Err(e) => Err(e).context("failed to load index"),
    }
}

fn load_provider(config: &Config) -> Arc<dyn LlmProvider> {
    match create_provider(&config.llm, &config.ollama) {
        Ok(provider) => {
            info!("LLM provider ready (provider: {})", provider.name());
            provider
        }
        Err(e) => {
            warn!("LLM provider not available: {}; answerable questions will fail with 503", e);
            Arc::new(UnavailableProvider::new(e.to_string()))
        }
    }
}

pub fn build_app_state(config: &Config) -> anyhow::Result<Arc<AppState>> {
    config.validate().context("invalid configuration")?;
    let embedder = create_embedder(config).context("failed to initialise embedder")?;
    let snapshot = load_index(config)?;
    info!(
        chunks = snapshot.chunk_count(),
        documents = snapshot.manifest().documents.len(),
        "Index ready"
    );
    let provider = load_provider(config);
    Ok(Arc::new(AppState::new(config, embedder, snapshot, provider)))
}
