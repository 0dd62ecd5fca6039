use async_trait::async_trait;
use serde_json::{json, Value};
use tracing::debug;

use super::{ensure_success, parse_error};
use crate::provider::{Completion, LlmError, LlmProvider, Role};

const MESSAGES_URL: &str = "https://api.anthropic.com/v1/messages";
const API_VERSION: &str = "2023-06-01";
const NAME: &str = "anthropic";

/// Anthropic Messages API backend.
pub struct ClaudeProvider {
    client: reqwest::Client,
    api_key: String,
    model: String,
}

impl ClaudeProvider {
    pub fn new(api_key: String, model: String) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_key,
            model,
        }
    }

    /// The Messages API takes the system prompt as a top-level field.
    fn request_body(&self, request: &Completion) -> Value {
        let turns: Vec<Value> = request
            .messages
            .iter()
            .filter(|m| m.role != Role::System)
            .map(|m| json!({ "role": m.role.as_str(), "content": m.content }))
            .collect();

        let mut body = json!({
            "model": self.model,
            "messages": turns,
            "temperature": request.temperature,
            "max_tokens": request.max_tokens,
        });
        if let Some(system) = request.system_prompt() {
            body["system"] = json!(system);
        }
        body
    }
}

/// Concatenate every text block of a Messages API response.
fn response_text(resp: &Value) -> Result<String, LlmError> {
    let blocks = resp["content"]
        .as_array()
        .ok_or_else(|| parse_error(NAME, "missing content array"))?;
    Ok(blocks
        .iter()
        .filter(|b| b["type"] == "text")
        .filter_map(|b| b["text"].as_str())
        .collect::<Vec<_>>()
        .join(""))
}

#[async_trait]
impl LlmProvider for ClaudeProvider {
    async fn complete(&self, request: &Completion) -> Result<String, LlmError> {
        debug!(model = %self.model, max_tokens = request.max_tokens, "Anthropic request");
        let response = self
            .client
            .post(MESSAGES_URL)
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", API_VERSION)
            .json(&self.request_body(request))
            .send()
            .await?;

        let resp: Value = ensure_success(NAME, response).await?.json().await?;
        response_text(&resp)
    }

    fn name(&self) -> &str {
        NAME
    }
}
