use std::sync::Arc;

use airman_core::Config;
use airman_index::{IndexSnapshot, SharedIndex};
use airman_ingest::Embedder;
use airman_llm::{GroundedGenerator, LlmProvider};
use airman_rag::{Ingestor, RagPipeline};

pub struct AppState {
    pub pipeline: RagPipeline,
    pub ingestor: Ingestor,
    pub index: Arc<SharedIndex>,
    pub llm_provider: String,
}

impl AppState {
    pub fn new(
        config: &Config,
        embedder: Arc<dyn Embedder>,
        snapshot: IndexSnapshot,
        provider: Arc<dyn LlmProvider>,
    ) -> Self {
        let index = Arc::new(SharedIndex::new(snapshot));
        let llm_provider = provider.name().to_string();
        let generator = GroundedGenerator::from_config(provider, &config.llm);
        Self {
            pipeline: RagPipeline::new(index.clone(), embedder.clone(), generator, config),
            ingestor: Ingestor::new(config, embedder, index.clone()),
            index,
            llm_provider,
        }
    }
}
