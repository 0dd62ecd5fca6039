use std::sync::Arc;
use std::time::{Duration, Instant};

use airman_core::config::RetrievalConfig;
use airman_core::{AirmanError, AirmanResult, AnswerRecord, Config, RetrievalResult};
use airman_index::SharedIndex;
use airman_ingest::embedding::{embed_with_timeout, CachedEmbedder, Embedder};
use airman_llm::GroundedGenerator;
use tracing::{debug, info};

use crate::assembler::{assemble, build_context, is_model_refusal};
use crate::gate::{GateDecision, GroundingGate, RefusalReason};

/// Query entry point: embed, retrieve, gate, generate, assemble.
pub struct RagPipeline {
    index: Arc<SharedIndex>,
    embedder: Arc<dyn Embedder>,
    embed_timeout: Duration,
    generator: GroundedGenerator,
    gate: GroundingGate,
    retrieval: RetrievalConfig,
}

impl RagPipeline {
    pub fn new(
        index: Arc<SharedIndex>,
        embedder: Arc<dyn Embedder>,
        generator: GroundedGenerator,
        config: &Config,
    ) -> Self {
        let cached: Arc<dyn Embedder> =
            Arc::new(CachedEmbedder::new(embedder, config.embedding.cache_capacity));
        Self {
            index,
            embedder: cached,
            embed_timeout: config.embedding.timeout(),
            generator,
            gate: GroundingGate::new(config.retrieval.min_relevance),
            retrieval: config.retrieval.clone(),
        }
    }

    /// Ranked chunks for `question`, without gating or generation.
    pub async fn retrieve(&self, question: &str, top_k: usize) -> AirmanResult<RetrievalResult> {
        let snapshot = self.index.current().await;
        if snapshot.is_empty() {
            return Err(AirmanError::IndexNotBuilt);
        }
        let query_vector = embed_with_timeout(self.embedder.as_ref(), &[question], self.embed_timeout)
            .await
            .map_err(|e| AirmanError::Embedding(e.to_string()))?
            .swap_remove(0);
        snapshot.retrieve(question, &query_vector, top_k, &self.retrieval)
    }

    /// Answer `question` from the indexed documents, or refuse.
    ///
    /// Refusals are `Ok`. Only generator failures, embedding failures and
    /// invalid input are errors.
    pub async fn ask(&self, question: &str, debug: bool) -> AirmanResult<AnswerRecord> {
        let question = question.trim();
        if question.is_empty() {
            return Err(AirmanError::InvalidQuery("question must not be empty".into()));
        }
        let started = Instant::now();

        let result = match self.retrieve(question, self.retrieval.top_k).await {
            Ok(result) => result,
            Err(AirmanError::IndexNotBuilt) => {
                return Ok(refuse(RefusalReason::IndexNotBuilt, started));
            }
            Err(e) => return Err(e),
        };
        debug!(
            top_k = self.retrieval.top_k,
            candidates = result.len(),
            best = result.first().map(|s| s.fused_score),
            "Retrieved"
        );

        let evidence = match self.gate.decide(&result) {
            GateDecision::Answer(evidence) => evidence,
            GateDecision::Refuse(reason) => return Ok(refuse(reason, started)),
        };

        let context = build_context(&evidence);
        let answer = self.generator.generate(&context, question).await?;
        if is_model_refusal(&answer) {
            return Ok(refuse(RefusalReason::ModelRefused, started));
        }

        let record = assemble(&answer, evidence, debug);
        info!(
            citations = record.citations.len(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "Answered"
        );
        Ok(record)
    }
}

fn refuse(reason: RefusalReason, started: Instant) -> AnswerRecord {
    info!(
        reason = %reason,
        elapsed_ms = started.elapsed().as_millis() as u64,
        "Refused"
    );
    AnswerRecord::refusal()
}
