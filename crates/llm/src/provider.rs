use async_trait::async_trait;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
}

impl Role {
    pub fn as_str(self) -> &'static str {
        match self {
            Role::System => "system",
            Role::User => "user",
            Role::Assistant => "assistant",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    pub role: Role,
    pub content: String,
}

impl Message {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: Role::System,
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }
}

/// One chat completion: the conversation plus sampling settings.
#[derive(Debug, Clone, PartialEq)]
pub struct Completion {
    pub messages: Vec<Message>,
    pub temperature: f32,
    pub max_tokens: u32,
}

impl Completion {
    /// System prompt text, joined when there is more than one.
    pub fn system_prompt(&self) -> Option<String> {
        let parts: Vec<&str> = self
            .messages
            .iter()
            .filter(|m| m.role == Role::System)
            .map(|m| m.content.as_str())
            .collect();
        (!parts.is_empty()).then(|| parts.join("\n\n"))
    }
}

/// A text-generation backend.
#[async_trait]
pub trait LlmProvider: Send + Sync {
    /// Return the assistant's reply text for `request`.
    async fn complete(&self, request: &Completion) -> Result<String, LlmError>;

    fn name(&self) -> &str;
}

#[derive(Debug, thiserror::Error)]
pub enum LlmError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("{provider} returned {status}: {body}")]
    Api {
        provider: &'static str,
        status: u16,
        body: String,
    },
    #[error("unexpected {provider} response: {reason}")]
    Parse {
        provider: &'static str,
        reason: String,
    },
    #[error("provider not configured: {0}")]
    NotConfigured(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn system_prompts_are_joined() {
        let req = Completion {
            messages: vec![Message::system("a"), Message::user("q"), Message::system("b")],
            temperature: 0.0,
            max_tokens: 10,
        };
        assert_eq!(req.system_prompt().as_deref(), Some("a\n\nb"));
    }

    #[test]
    fn no_system_prompt() {
        let req = Completion {
            messages: vec![Message::user("q")],
            temperature: 0.0,
            max_tokens: 10,
        };
        assert!(req.system_prompt().is_none());
    }

    #[test]
    fn api_error_names_provider() {
        let err = LlmError::Api {
            provider: "anthropic",
            status: 529,
            body: "overloaded".into(),
        };
        assert_eq!(err.to_string(), "anthropic returned 529: overloaded");
    }
}
