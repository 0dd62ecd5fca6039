pub mod claude;
pub mod ollama;
pub mod openai;

use std::sync::Arc;

use airman_core::config::{LlmConfig, OllamaConfig};
use async_trait::async_trait;
use serde_json::{json, Value};

use crate::provider::{Completion, LlmError, LlmProvider, Message};

/// Create the LLM provider named by `LLM_PROVIDER`.
pub fn create_provider(
    llm_config: &LlmConfig,
    ollama_config: &OllamaConfig,
) -> Result<Arc<dyn LlmProvider>, LlmError> {
    match llm_config.provider.as_str() {
        "openai" => {
            let api_key = llm_config
                .openai_api_key
                .as_ref()
                .ok_or_else(|| LlmError::NotConfigured("OPENAI_API_KEY not set".into()))?;
            let base_url = llm_config
                .openai_base_url
                .as_deref()
                .unwrap_or("https://api.openai.com");
            Ok(Arc::new(openai::OpenAiProvider::new(
                api_key.clone(),
                llm_config.openai_model.clone(),
                base_url.to_string(),
            )))
        }
        "anthropic" | "claude" => {
            let api_key = llm_config
                .anthropic_api_key
                .as_ref()
                .ok_or_else(|| LlmError::NotConfigured("ANTHROPIC_API_KEY not set".into()))?;
            Ok(Arc::new(claude::ClaudeProvider::new(
                api_key.clone(),
                llm_config.anthropic_model.clone(),
            )))
        }
        "ollama" => Ok(Arc::new(ollama::OllamaProvider::new(
            ollama_config.url.clone(),
            ollama_config.model.clone(),
        ))),
        other => Err(LlmError::NotConfigured(format!(
            "unknown LLM provider: '{}'",
            other
        ))),
    }
}

/// Stands in when no provider could be built, so the service can still
/// start, ingest and refuse. Every completion fails with the original reason.
pub struct UnavailableProvider {
    reason: String,
}

impl UnavailableProvider {
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }
}

#[async_trait]
impl LlmProvider for UnavailableProvider {
    async fn complete(&self, _request: &Completion) -> Result<String, LlmError> {
        Err(LlmError::NotConfigured(self.reason.clone()))
    }

    fn name(&self) -> &str {
        "unavailable"
    }
}

/// Chat messages in the `{role, content}` shape OpenAI and Ollama share.
pub(crate) fn chat_messages<'a>(messages: impl IntoIterator<Item = &'a Message>) -> Vec<Value> {
    messages
        .into_iter()
        .map(|m| json!({ "role": m.role.as_str(), "content": m.content }))
        .collect()
}

/// Fail with the response body on any non-2xx status.
pub(crate) async fn ensure_success(
    provider: &'static str,
    response: reqwest::Response,
) -> Result<reqwest::Response, LlmError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    Err(LlmError::Api {
        provider,
        status: status.as_u16(),
        body,
    })
}

pub(crate) fn parse_error(provider: &'static str, reason: &str) -> LlmError {
    LlmError::Parse {
        provider,
        reason: reason.to_string(),
    }
}
