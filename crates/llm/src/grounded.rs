//! Context-restricted answer generation.

use std::sync::Arc;
use std::time::Duration;

use airman_core::config::LlmConfig;
use airman_core::{AirmanError, AirmanResult, REFUSAL};
use tracing::{debug, warn};

use crate::provider::{Completion, LlmProvider, Message};

/// Wraps a provider with the grounding instructions, sampling settings and a
/// hard deadline. Provider failures come back as
/// [`AirmanError::GenerationUnavailable`], a missed deadline as
/// [`AirmanError::GenerationTimeout`]; neither is ever turned into a refusal.
pub struct GroundedGenerator {
    provider: Arc<dyn LlmProvider>,
    temperature: f32,
    max_tokens: u32,
    timeout: Duration,
}

impl GroundedGenerator {
    pub fn new(provider: Arc<dyn LlmProvider>, temperature: f32, max_tokens: u32, timeout: Duration) -> Self {
        Self {
            provider,
            temperature,
            max_tokens,
            timeout,
        }
    }

    pub fn from_config(provider: Arc<dyn LlmProvider>, config: &LlmConfig) -> Self {
        Self::new(provider, config.temperature, config.max_tokens, config.timeout())
    }

    pub fn system_prompt() -> String {
        format!(
            "You answer questions about aviation using ONLY the provided context.\n\
             Do not use outside knowledge. If the context does not contain the answer, \
             reply with exactly:\n{REFUSAL}"
        )
    }

    pub fn build_messages(context: &str, question: &str) -> Vec<Message> {
        vec![
            Message::system(Self::system_prompt()),
            Message::user(format!("Context:\n{context}\n\nQuestion:\n{question}")),
        ]
    }

    /// Ask the model to answer `question` from `context` alone.
    pub async fn generate(&self, context: &str, question: &str) -> AirmanResult<String> {
        let request = Completion {
            messages: Self::build_messages(context, question),
            temperature: self.temperature,
            max_tokens: self.max_tokens,
        };
        debug!(
            provider = self.provider.name(),
            context_chars = context.len(),
            "Requesting grounded answer"
        );

        match tokio::time::timeout(self.timeout, self.provider.complete(&request)).await {
            Ok(Ok(text)) => Ok(text),
            Ok(Err(e)) => {
                warn!(provider = self.provider.name(), error = %e, "Generation failed");
                Err(AirmanError::GenerationUnavailable(e.to_string()))
            }
            Err(_) => {
                warn!(provider = self.provider.name(), timeout = ?self.timeout, "Generation timed out");
                Err(AirmanError::GenerationTimeout(self.timeout))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::provider::{LlmError, Role};
    use async_trait::async_trait;
    use std::sync::Mutex;

    struct Scripted {
        reply: Result<String, u16>,
        delay: Duration,
        seen: Mutex<Vec<Vec<Message>>>,
    }

    impl Scripted {
        fn new(reply: Result<&str, u16>, delay: Duration) -> Arc<Self> {
            Arc::new(Self {
                reply: reply.map(str::to_string),
                delay,
                seen: Mutex::new(Vec::new()),
            })
        }
    }

    #[async_trait]
    impl LlmProvider for Scripted {
        async fn complete(&self, request: &Completion) -> Result<String, LlmError> {
            self.seen.lock().unwrap().push(request.messages.clone());
            tokio::time::sleep(self.delay).await;
            match &self.reply {
                Ok(text) => Ok(text.clone()),
                Err(status) => Err(LlmError::Api {
                    provider: "scripted",
                    status: *status,
                    body: "overloaded".into(),
                }),
            }
        }

        fn name(&self) -> &str {
            "scripted"
        }
    }

    #[tokio::test]
    async fn passes_context_and_question() {
        let provider = Scripted::new(Ok("IAS is read from the indicator."), Duration::ZERO);
        let gen = GroundedGenerator::new(provider.clone(), 0.0, 300, Duration::from_secs(5));

        let answer = gen.generate("Indicated airspeed ...", "What is IAS?").await.unwrap();
        assert_eq!(answer, "IAS is read from the indicator.");

        let seen = provider.seen.lock().unwrap();
        assert_eq!(seen.len(), 1);
        assert_eq!(seen[0][0].role, Role::System);
        assert!(seen[0][0].content.contains(REFUSAL));
        assert!(seen[0][1].content.contains("Indicated airspeed ..."));
        assert!(seen[0][1].content.contains("What is IAS?"));
    }

    #[tokio::test]
    async fn provider_error_is_unavailable() {
        let gen = GroundedGenerator::new(
            Scripted::new(Err(529), Duration::ZERO),
            0.0,
            300,
            Duration::from_secs(5),
        );
        let err = gen.generate("ctx", "q").await.unwrap_err();
        assert!(matches!(err, AirmanError::GenerationUnavailable(msg) if msg.contains("529")));
    }

    #[tokio::test(start_paused = true)]
    async fn slow_provider_times_out() {
        let gen = GroundedGenerator::new(
            Scripted::new(Ok("late"), Duration::from_secs(120)),
            0.0,
            300,
            Duration::from_secs(60),
        );
        let err = gen.generate("ctx", "q").await.unwrap_err();
        assert!(matches!(err, AirmanError::GenerationTimeout(d) if d == Duration::from_secs(60)));
    }
}
