use async_trait::async_trait;
use serde_json::{json, Value};
use tracing::debug;

use super::{chat_messages, ensure_success, parse_error};
use crate::provider::{Completion, LlmError, LlmProvider};

const NAME: &str = "ollama";

/// Local Ollama `/api/chat` backend, non-streaming.
pub struct OllamaProvider {
    client: reqwest::Client,
    endpoint: String,
    model: String,
}

impl OllamaProvider {
    pub fn new(url: String, model: String) -> Self {
        Self {
            client: reqwest::Client::new(),
            endpoint: format!("{}/api/chat", url.trim_end_matches('/')),
            model,
        }
    }

    fn request_body(&self, request: &Completion) -> Value {
        json!({
            "model": self.model,
            "messages": chat_messages(&request.messages),
            "stream": false,
            "options": {
                "temperature": request.temperature,
                "num_predict": request.max_tokens,
            },
        })
    }
}

fn response_text(resp: &Value) -> Result<String, LlmError> {
    resp["message"]["content"]
        .as_str()
        .map(str::to_string)
        .ok_or_else(|| parse_error(NAME, "missing message.content"))
}

#[async_trait]
impl LlmProvider for OllamaProvider {
    async fn complete(&self, request: &Completion) -> Result<String, LlmError> {
        debug!(model = %self.model, endpoint = %self.endpoint, "Ollama request");
        let response = self
            .client
            .post(&self.endpoint)
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
