use std::env;
use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::AirmanError;

/// Load .env file (silently ignores if missing).
pub fn load_dotenv() {
    dotenvy::dotenv().ok();
}

fn env_or(key: &str, default: &str) -> String {
    env::var(key).unwrap_or_else(|_| default.to_string())
}

fn env_opt(key: &str) -> Option<String> {
    env::var(key).ok().filter(|s| !s.is_empty())
}

/// Read a profiled env var: tries {PROFILE}_{KEY} first, falls back to {KEY}.
fn profiled_env_opt(profile: &str, key: &str) -> Option<String> {
    if !profile.is_empty() {
        let prefixed = format!("{}_{}", profile, key);
        if let Some(v) = env_opt(&prefixed) {
            return Some(v);
        }
    }
    env_opt(key)
}

fn profiled_env_or(profile: &str, key: &str, default: &str) -> String {
    profiled_env_opt(profile, key).unwrap_or_else(|| default.to_string())
}

fn profiled_env_parse<T: std::str::FromStr>(profile: &str, key: &str, default: T) -> T {
    profiled_env_opt(profile, key)
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

fn profiled_env_bool(profile: &str, key: &str, default: bool) -> bool {
    match profiled_env_opt(profile, key) {
        Some(v) => matches!(v.to_ascii_lowercase().as_str(), "1" | "true" | "yes" | "on"),
        None => default,
    }
}

// ── Top-level config ──────────────────────────────────────────

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Active profile name (empty = default).
    pub profile: String,
    pub server: ServerConfig,
    pub storage: StorageConfig,
    pub chunking: ChunkingConfig,
    pub retrieval: RetrievalConfig,
    pub llm: LlmConfig,
    pub ollama: OllamaConfig,
    pub embedding: EmbeddingConfig,
}

impl Config {
    /// Build config from environment variables (call `load_dotenv()` first).
    /// Profile is read from `AIRMAN_PROFILE`. When set (e.g. `PROD`), every key
    /// is first looked up as `{PROFILE}_{KEY}`, falling back to `{KEY}`.
    pub fn from_env() -> Self {
        let profile = env_or("AIRMAN_PROFILE", "").to_uppercase();
        Self::for_profile(&profile)
    }

    /// Build config for a specific named profile (empty string = default).
    pub fn for_profile(profile: &str) -> Self {
        let p = profile.to_uppercase();
        let p = p.as_str();
        Self {
            profile: p.to_string(),
            server: ServerConfig::from_env_profiled(p),
            storage: StorageConfig::from_env_profiled(p),
            chunking: ChunkingConfig::from_env_profiled(p),
            retrieval: RetrievalConfig::from_env_profiled(p),
            llm: LlmConfig::from_env_profiled(p),
            ollama: OllamaConfig::from_env_profiled(p),
            embedding: EmbeddingConfig::from_env_profiled(p),
        }
    }

    pub fn profile_label(&self) -> &str {
        if self.profile.is_empty() { "default" } else { &self.profile }
    }

    /// Reject settings the chunker and retriever cannot honour.
    pub fn validate(&self) -> Result<(), AirmanError> {
        self.chunking.validate()?;
        self.retrieval.validate()?;
        if self.embedding.dimensions == 0 {
            return Err(AirmanError::InvalidConfig(
                "EMBEDDING_DIMENSIONS must be greater than zero".into(),
            ));
        }
        Ok(())
    }

    /// Print a redacted summary for startup logs.
    pub fn log_summary(&self) {
        tracing::info!("Config loaded (profile: {}):", self.profile_label());
        tracing::info!("  server:      {}:{}", self.server.host, self.server.port);
        tracing::info!(
            "  storage:     data_dir={}, index_dir={}",
            self.storage.data_dir.display(),
            self.storage.index_dir.display()
        );
        tracing::info!(
            "  chunking:    size={}, overlap={}",
            self.chunking.chunk_size,
            self.chunking.overlap
        );
        tracing::info!(
            "  retrieval:   top_k={}, w_vec={}, w_lex={}, min_relevance={}",
            self.retrieval.top_k,
            self.retrieval.vector_weight,
            self.retrieval.lexical_weight,
            self.retrieval.min_relevance
        );
        tracing::info!(
            "  llm:         provider={}, configured={}",
            self.llm.provider,
            self.llm.is_configured()
        );
        tracing::info!(
            "  embedding:   provider={}, dimensions={}",
            self.embedding.provider,
            self.embedding.dimensions
        );
    }
}

// ── Server ────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub cors_origin: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".into(),
            port: 8000,
            cors_origin: "*".into(),
        }
    }
}

impl ServerConfig {
    fn from_env_profiled(p: &str) -> Self {
        let d = Self::default();
        Self {
            host: profiled_env_or(p, "HOST", &d.host),
            port: profiled_env_parse(p, "PORT", d.port),
            cors_origin: profiled_env_or(p, "CORS_ORIGIN", &d.cors_origin),
        }
    }
}

// ── Storage ───────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Directory holding the source documents to ingest.
    pub data_dir: PathBuf,
    /// Directory holding the persisted chunk store and vector index.
    pub index_dir: PathBuf,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("data"),
            index_dir: PathBuf::from("vector_store"),
        }
    }
}

impl StorageConfig {
    fn from_env_profiled(p: &str) -> Self {
        Self {
            data_dir: PathBuf::from(profiled_env_or(p, "DATA_DIR", "data")),
            index_dir: PathBuf::from(profiled_env_or(p, "INDEX_DIR", "vector_store")),
        }
    }
}

// ── Chunking ──────────────────────────────────────────────────

/// Character-window chunking parameters.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ChunkingConfig {
    /// Window length in characters (default: 500).
    pub chunk_size: usize,
    /// Characters shared by consecutive windows on the same page (default: 50).
    pub overlap: usize,
}

impl Default for ChunkingConfig {
    fn default() -> Self {
        Self {
            chunk_size: 500,
            overlap: 50,
        }
    }
}

impl ChunkingConfig {
    fn from_env_profiled(p: &str) -> Self {
        let defaults = Self::default();
        Self {
            chunk_size: profiled_env_parse(p, "CHUNK_SIZE", defaults.chunk_size),
            overlap: profiled_env_parse(p, "CHUNK_OVERLAP", defaults.overlap),
        }
    }

    /// Distance the window start advances between consecutive chunks.
    pub fn stride(&self) -> usize {
        self.chunk_size.saturating_sub(self.overlap)
    }

    pub fn validate(&self) -> Result<(), AirmanError> {
        if self.chunk_size == 0 {
            return Err(AirmanError::InvalidConfig("CHUNK_SIZE must be greater than zero".into()));
        }
        if self.overlap >= self.chunk_size {
            return Err(AirmanError::InvalidConfig(format!(
                "CHUNK_OVERLAP ({}) must be smaller than CHUNK_SIZE ({})",
                self.overlap, self.chunk_size
            )));
        }
        Ok(())
    }
}

// ── Retrieval ─────────────────────────────────────────────────

/// Hybrid retrieval and grounding-gate parameters.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RetrievalConfig {
    /// Chunks returned per query.
    pub top_k: usize,
    /// Each index is queried for `top_k * candidate_multiplier` candidates.
    pub candidate_multiplier: usize,
    pub vector_weight: f32,
    pub lexical_weight: f32,
    /// Fused score a chunk needs to count as evidence.
    pub min_relevance: f32,
    pub bm25_k1: f32,
    pub bm25_b: f32,
    pub remove_stopwords: bool,
}

impl Default for RetrievalConfig {
    fn default() -> Self {
        Self {
            top_k: 3,
            candidate_multiplier: 4,
            vector_weight: 0.5,
            lexical_weight: 0.5,
            min_relevance: 0.25,
            bm25_k1: 1.5,
            bm25_b: 0.75,
            remove_stopwords: true,
        }
    }
}

impl RetrievalConfig {
    fn from_env_profiled(p: &str) -> Self {
        let d = Self::default();
        Self {
            top_k: profiled_env_parse(p, "TOP_K", d.top_k),
            candidate_multiplier: profiled_env_parse(p, "CANDIDATE_MULTIPLIER", d.candidate_multiplier),
            vector_weight: profiled_env_parse(p, "VECTOR_WEIGHT", d.vector_weight),
            lexical_weight: profiled_env_parse(p, "LEXICAL_WEIGHT", d.lexical_weight),
            min_relevance: profiled_env_parse(p, "MIN_RELEVANCE", d.min_relevance),
            bm25_k1: profiled_env_parse(p, "BM25_K1", d.bm25_k1),
            bm25_b: profiled_env_parse(p, "BM25_B", d.bm25_b),
            remove_stopwords: profiled_env_bool(p, "REMOVE_STOPWORDS", d.remove_stopwords),
        }
    }

    /// Number of candidates pulled from each index before fusion.
    pub fn candidate_width(&self, top_k: usize) -> usize {
        top_k.saturating_mul(self.candidate_multiplier.max(1)).max(top_k)
    }

    pub fn validate(&self) -> Result<(), AirmanError> {
        if self.top_k == 0 {
            return Err(AirmanError::InvalidConfig("TOP_K must be greater than zero".into()));
        }
        let numbers = [
            ("VECTOR_WEIGHT", self.vector_weight),
            ("LEXICAL_WEIGHT", self.lexical_weight),
            ("MIN_RELEVANCE", self.min_relevance),
            ("BM25_K1", self.bm25_k1),
            ("BM25_B", self.bm25_b),
        ];
        if let Some((name, _)) = numbers.iter().find(|(_, v)| !v.is_finite()) {
            return Err(AirmanError::InvalidConfig(format!("{name} must be a finite number")));
        }
        if self.bm25_k1 < 0.0 {
            return Err(AirmanError::InvalidConfig("BM25_K1 must be non-negative".into()));
        }
        if self.vector_weight < 0.0 || self.lexical_weight < 0.0 {
            return Err(AirmanError::InvalidConfig("fusion weights must be non-negative".into()));
        }
        if self.vector_weight + self.lexical_weight <= 0.0 {
            return Err(AirmanError::InvalidConfig("at least one fusion weight must be positive".into()));
        }
        if !(0.0..=1.0).contains(&self.bm25_b) {
            return Err(AirmanError::InvalidConfig("BM25_B must be within [0, 1]".into()));
        }
        if !(0.0..=1.0).contains(&self.min_relevance) {
            return Err(AirmanError::InvalidConfig("MIN_RELEVANCE must be within [0, 1]".into()));
        }
        Ok(())
    }
}

// ── LLM (Anthropic / OpenAI / Ollama) ─────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmConfig {
    /// "anthropic", "openai", "ollama"
    pub provider: String,
    pub openai_api_key: Option<String>,
    pub openai_model: String,
    pub openai_base_url: Option<String>,
    pub anthropic_api_key: Option<String>,
    pub anthropic_model: String,
    pub temperature: f32,
    pub max_tokens: u32,
    pub timeout_secs: u64,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            provider: "anthropic".into(),
            openai_api_key: None,
            openai_model: "gpt-4o-mini".into(),
            openai_base_url: None,
            anthropic_api_key: None,
            anthropic_model: "claude-3-haiku-20240307".into(),
            temperature: 0.0,
            max_tokens: 300,
            timeout_secs: 60,
        }
    }
}

impl LlmConfig {
    fn from_env_profiled(p: &str) -> Self {
        let d = Self::default();
        Self {
            provider: profiled_env_or(p, "LLM_PROVIDER", &d.provider),
            openai_api_key: profiled_env_opt(p, "OPENAI_API_KEY"),
            openai_model: profiled_env_or(p, "OPENAI_MODEL", &d.openai_model),
            openai_base_url: profiled_env_opt(p, "OPENAI_BASE_URL"),
            anthropic_api_key: profiled_env_opt(p, "ANTHROPIC_API_KEY"),
            anthropic_model: profiled_env_or(p, "ANTHROPIC_MODEL", &d.anthropic_model),
            temperature: profiled_env_parse(p, "LLM_TEMPERATURE", d.temperature),
            max_tokens: profiled_env_parse(p, "LLM_MAX_TOKENS", d.max_tokens),
            timeout_secs: profiled_env_parse(p, "LLM_TIMEOUT_SECS", d.timeout_secs),
        }
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs.max(1))
    }

    pub fn is_configured(&self) -> bool {
        match self.provider.as_str() {
            "openai" => self.openai_api_key.is_some(),
            "anthropic" | "claude" => self.anthropic_api_key.is_some(),
            "ollama" => true,
            _ => false,
        }
    }
}

// ── Ollama (local models) ─────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OllamaConfig {
    pub url: String,
    pub model: String,
    pub embedding_model: String,
}

impl Default for OllamaConfig {
    fn default() -> Self {
        Self {
            url: "http://localhost:11434".into(),
            model: "llama3.2".into(),
            embedding_model: "nomic-embed-text".into(),
        }
    }
}

impl OllamaConfig {
    fn from_env_profiled(p: &str) -> Self {
        let d = Self::default();
        Self {
            url: profiled_env_or(p, "OLLAMA_URL", &d.url),
            model: profiled_env_or(p, "OLLAMA_MODEL", &d.model),
            embedding_model: profiled_env_or(p, "OLLAMA_EMBEDDING_MODEL", &d.embedding_model),
        }
    }
}

// ── Embedding ─────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmbeddingConfig {
    /// "hash", "ollama", "openai"
    pub provider: String,
    pub dimensions: usize,
    pub batch_size: usize,
    pub timeout_secs: u64,
    pub openai_model: String,
    /// Capacity of the query-embedding LRU cache.
    pub cache_capacity: usize,
}

impl Default for EmbeddingConfig {
    fn default() -> Self {
        Self {
            provider: "hash".into(),
            dimensions: 384,
            batch_size: 64,
            timeout_secs: 30,
            openai_model: "text-embedding-3-small".into(),
            cache_capacity: 1024,
        }
    }
}

impl EmbeddingConfig {
    fn from_env_profiled(p: &str) -> Self {
        let d = Self::default();
        Self {
            provider: profiled_env_or(p, "EMBEDDING_PROVIDER", &d.provider),
            dimensions: profiled_env_parse(p, "EMBEDDING_DIMENSIONS", d.dimensions),
            batch_size: profiled_env_parse(p, "EMBEDDING_BATCH_SIZE", d.batch_size),
            timeout_secs: profiled_env_parse(p, "EMBEDDING_TIMEOUT_SECS", d.timeout_secs),
            openai_model: profiled_env_or(p, "OPENAI_EMBEDDING_MODEL", &d.openai_model),
            cache_capacity: profiled_env_parse(p, "EMBEDDING_CACHE_CAPACITY", d.cache_capacity),
        }
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs.max(1))
    }
}
