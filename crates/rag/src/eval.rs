//! Offline answer-quality metrics over a question set.
//!
//! Token overlap between the answer and the retrieved chunks stands in for
//! groundedness: `overlap = |answer ∩ chunks| / |answer|` over lowercased
//! word sets.

use std::collections::HashSet;
use std::path::Path;

use airman_core::text::tokenize;
use airman_core::{AirmanError, AirmanResult, ScoredChunk, REFUSAL};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::pipeline::RagPipeline;

pub const HIT_OVERLAP: f64 = 0.15;
pub const FAITHFUL_OVERLAP: f64 = 0.25;

#[derive(Debug, Clone, Deserialize)]
pub struct EvalQuestion {
    pub question: String,
    #[serde(rename = "type", default = "default_kind")]
    pub kind: String,
}

fn default_kind() -> String {
    "factual".to_string()
}

#[derive(Debug, Clone, Serialize)]
pub struct EvalRecord {
    pub question: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub answer: String,
    pub citations: Vec<String>,
    pub chunks: Vec<ScoredChunk>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub retrieval_hit: bool,
    pub faithfulness: f64,
    pub hallucination: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EvalSummary {
    pub total_questions: usize,
    pub answered: usize,
    pub refused: usize,
    pub retrieval_hit_rate: f64,
    pub faithfulness_rate: f64,
    pub hallucination_rate: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct EvalReport {
    pub summary: EvalSummary,
    pub best: Vec<EvalRecord>,
    pub worst: Vec<EvalRecord>,
    pub results: Vec<EvalRecord>,
}

fn is_refusal(answer: &str) -> bool {
    answer.trim() == REFUSAL
}

fn word_set(text: &str) -> HashSet<String> {
    tokenize(text, false).into_iter().collect()
}

fn overlap(answer: &str, chunks: &[ScoredChunk]) -> f64 {
    let answer_words = word_set(answer);
    if answer_words.is_empty() {
        return 1.0;
    }
    let chunk_words: HashSet<String> = chunks.iter().flat_map(|c| word_set(&c.chunk.text)).collect();
    answer_words.intersection(&chunk_words).count() as f64 / answer_words.len() as f64
}

/// The chunks held enough of the answer's wording to count as a hit.
pub fn retrieval_hit(answer: &str, chunks: &[ScoredChunk]) -> bool {
    if chunks.first().map_or(true, |c| c.chunk.text.is_empty()) || is_refusal(answer) {
        return false;
    }
    overlap(answer, chunks) >= HIT_OVERLAP
}

/// Share of the answer's words found in the chunks. A refusal is fully faithful.
pub fn faithfulness(answer: &str, chunks: &[ScoredChunk]) -> f64 {
    if is_refusal(answer) {
        return 1.0;
    }
    if chunks.is_empty() {
        return 0.0;
    }
    overlap(answer, chunks)
}

pub fn is_hallucination(answer: &str, chunks: &[ScoredChunk]) -> bool {
    !is_refusal(answer) && faithfulness(answer, chunks) < FAITHFUL_OVERLAP
}

fn score_record(question: &EvalQuestion, answer: String, citations: Vec<String>, chunks: Vec<ScoredChunk>) -> EvalRecord {
    EvalRecord {
        retrieval_hit: retrieval_hit(&answer, &chunks),
        faithfulness: faithfulness(&answer, &chunks),
        hallucination: is_hallucination(&answer, &chunks),
        question: question.question.clone(),
        kind: question.kind.clone(),
        answer,
        citations,
        chunks,
        error: None,
    }
}

fn failed_record(question: &EvalQuestion, error: &AirmanError) -> EvalRecord {
    EvalRecord {
        question: question.question.clone(),
        kind: question.kind.clone(),
        answer: String::new(),
        citations: Vec::new(),
        chunks: Vec::new(),
        error: Some(error.to_string()),
        retrieval_hit: false,
        faithfulness: 0.0,
        hallucination: true,
    }
}

/// Ranking used to pick the best and worst examples.
fn quality(r: &EvalRecord) -> f64 {
    let mut s = r.faithfulness;
    if r.retrieval_hit {
        s += 1.0;
    }
    if r.hallucination {
        s -= 2.0;
    }
    if is_refusal(&r.answer) && !r.retrieval_hit {
        s += 0.5;
    }
    s
}

fn round4(x: f64) -> f64 {
    (x * 10_000.0).round() / 10_000.0
}

pub fn summarize(results: &[EvalRecord]) -> EvalSummary {
    let n = results.len();
    let rate = |count: usize| if n == 0 { 0.0 } else { round4(count as f64 / n as f64) };
    let answered = results.iter().filter(|r| !is_refusal(&r.answer)).count();
    EvalSummary {
        total_questions: n,
        answered,
        refused: n - answered,
        retrieval_hit_rate: rate(results.iter().filter(|r| r.retrieval_hit).count()),
        faithfulness_rate: rate(results.iter().filter(|r| r.faithfulness >= FAITHFUL_OVERLAP).count()),
        hallucination_rate: rate(results.iter().filter(|r| r.hallucination).count()),
    }
}

pub fn build_report(results: Vec<EvalRecord>) -> EvalReport {
    let mut ranked: Vec<&EvalRecord> = results.iter().collect();
    ranked.sort_by(|a, b| quality(b).total_cmp(&quality(a)));
    let best = ranked.iter().take(5).map(|r| (*r).clone()).collect();
    let worst = ranked.iter().rev().take(5).map(|r| (*r).clone()).collect();
    EvalReport {
        summary: summarize(&results),
        best,
        worst,
        results,
    }
}

pub fn load_questions(path: &Path) -> AirmanResult<Vec<EvalQuestion>> {
    let raw = std::fs::read_to_string(path)?;
    serde_json::from_str(&raw).map_err(|e| AirmanError::Serialize(format!("{}: {e}", path.display())))
}

/// Ask every question with debug detail and score the answers.
pub async fn run(pipeline: &RagPipeline, questions: &[EvalQuestion]) -> EvalReport {
    let mut results = Vec::with_capacity(questions.len());
    for (i, q) in questions.iter().enumerate() {
        let record = match pipeline.ask(&q.question, true).await {
            Ok(answer) => score_record(q, answer.answer_text, answer.citations, answer.chunks),
            Err(e) => {
                warn!(question = %q.question, error = %e, "Evaluation question failed");
                failed_record(q, &e)
            }
        };
        info!(
            n = i + 1,
            total = questions.len(),
            kind = %record.kind,
            hit = record.retrieval_hit,
            faithfulness = record.faithfulness,
            hallucination = record.hallucination,
            "Evaluated"
        );
        results.push(record);
    }
    build_report(results)
}
