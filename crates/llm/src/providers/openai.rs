use async_trait::async_trait;
use serde_json::{json, Value};
use tracing::debug;

use super::{chat_messages, ensure_success, parse_error};
use crate::provider::{Completion, LlmError, LlmProvider};

const NAME: &str = "openai";

/// OpenAI-compatible chat completions backend.
pub struct OpenAiProvider {
    client: reqwest::Client,
    api_key: String,
    model: String,
    endpoint: String,
}

impl OpenAiProvider {
    pub fn new(api_key: String, model: String, base_url: String) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_key,
            model,
            endpoint: format!("{}/v1/chat/completions", base_url.trim_end_matches('/')),
        }
    }

    fn request_body(&self, request: &Completion) -> Value {
        json!({
            "model": self.model,
            "messages": chat_messages(&request.messages),
            "temperature": request.temperature,
            "max_tokens": request.max_tokens,
        })
    }
}

fn response_text(resp: &Value) -> Result<String, LlmError> {
    match &resp["choices"][0]["message"]["content"] {
        Value::String(text) => Ok(text.clone()),
        // Some compatible servers send null content on an empty reply.
        Value::Null if resp["choices"][0]["message"].is_object() => Ok(String::new()),
        _ => Err(parse_error(NAME, "missing choices[0].message.content")),
    }
}

#[async_trait]
impl LlmProvider for OpenAiProvider {
    async fn complete(&self, request: &Completion) -> Result<String, LlmError> {
        debug!(model = %self.model, endpoint = %self.endpoint, "OpenAI request");
        let response = self
            .client
            .post(&self.endpoint)
            .bearer_auth(&self.api_key)
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

#[cfg(test)]
mod tests {
    use super::*;
    use crate::provider::Message;

    #[test]
    fn endpoint_ignores_trailing_slash() {
        let p = OpenAiProvider::new("k".into(), "gpt-4o-mini".into(), "http://localhost:8080/".into());
        assert_eq!(p.endpoint, "http://localhost:8080/v1/chat/completions");
    }

    #[test]
    fn body_keeps_system_message_inline() {
        let p = OpenAiProvider::new("k".into(), "gpt-4o-mini".into(), "https://api.openai.com".into());
        let body = p.request_body(&Completion {
            messages: vec![Message::system("rules"), Message::user("q")],
            temperature: 0.0,
            max_tokens: 300,
        });
        assert_eq!(body["messages"][0]["role"], "system");
        assert_eq!(body["max_tokens"], 300);
    }

    #[test]
    fn reads_first_choice() {
        let resp = json!({ "choices": [{ "message": { "role": "assistant", "content": "Vy is best rate." } }] });
        assert_eq!(response_text(&resp).unwrap(), "Vy is best rate.");
    }

    #[test]
    fn null_content_is_empty_reply() {
        let resp = json!({ "choices": [{ "message": { "role": "assistant", "content": null } }] });
        assert_eq!(response_text(&resp).unwrap(), "");
    }

    #[test]
    fn missing_choices_is_parse_error() {
        assert!(response_text(&json!({ "error": "x" })).is_err());
    }
}
