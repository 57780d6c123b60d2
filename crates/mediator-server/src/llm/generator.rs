// crates/mediator-server/src/llm/generator.rs
// TextGenerator adapters over LLM clients

use crate::dispatch::TextGenerator;
use crate::llm::{Admission, CircuitBreaker, LlmClient, Message, Provider};
use crate::{MediatorError, Result};
use async_trait::async_trait;
use mediator_types::ChatTurn;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

/// Generates text with a single chat completion
pub struct LlmGenerator {
    client: Arc<dyn LlmClient>,
}

impl LlmGenerator {
    pub fn new(client: Arc<dyn LlmClient>) -> Self {
        Self { client }
    }

    pub fn provider(&self) -> Provider {
        self.client.provider_type()
    }
}

#[async_trait]
impl TextGenerator for LlmGenerator {
    async fn generate(
        &self,
        system_prompt: &str,
        prior_turns: &[ChatTurn],
        user_message: &str,
        max_output_tokens: u32,
    ) -> Result<String> {
        let mut messages = Vec::with_capacity(prior_turns.len() + 2);
        messages.push(Message::system(system_prompt));
        messages.extend(prior_turns.iter().map(Message::from));
        messages.push(Message::user(user_message));

        let result = self.client.chat(messages, Some(max_output_tokens)).await?;
        debug!(
            request_id = %result.request_id,
            model = %self.client.model_name(),
            duration_ms = result.duration_ms,
            "Generation complete"
        );
        Ok(result.content.unwrap_or_default())
    }
}

/// Wraps a generator with a timeout and a per-provider circuit breaker.
///
/// An open circuit fails immediately without calling the inner generator.
pub struct GuardedGenerator {
    inner: Arc<dyn TextGenerator>,
    provider: Provider,
    breaker: CircuitBreaker,
    timeout: Duration,
}

impl GuardedGenerator {
    pub fn new(
        inner: Arc<dyn TextGenerator>,
        provider: Provider,
        breaker: CircuitBreaker,
        timeout: Duration,
    ) -> Self {
        Self {
            inner,
            provider,
            breaker,
            timeout,
        }
    }
}

#[async_trait]
impl TextGenerator for GuardedGenerator {
    async fn generate(
        &self,
        system_prompt: &str,
        prior_turns: &[ChatTurn],
        user_message: &str,
        max_output_tokens: u32,
    ) -> Result<String> {
        match self.breaker.admit(self.provider) {
            Admission::Allowed => {}
            Admission::Trial => {
                debug!(provider = %self.provider, "Circuit cooldown over, sending trial request")
            }
            Admission::Rejected { retry_in } => {
                debug!(
                    provider = %self.provider,
                    retry_in_ms = retry_in.as_millis() as u64,
                    "Circuit open, skipping generation"
                );
                return Err(MediatorError::CircuitOpen(self.provider.to_string()));
            }
        }

        let call = self
            .inner
            .generate(system_prompt, prior_turns, user_message, max_output_tokens);

        match tokio::time::timeout(self.timeout, call).await {
            Ok(Ok(text)) => {
                self.breaker.record_success(self.provider);
                Ok(text)
            }
            Ok(Err(e)) => {
                self.breaker.record_failure(self.provider);
                Err(e)
            }
            Err(_) => {
                warn!(
                    provider = %self.provider,
                    timeout_secs = self.timeout.as_secs(),
                    "Generation timed out"
                );
                self.breaker.record_failure(self.provider);
                Err(MediatorError::Timeout(self.timeout.as_secs()))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::{BreakerPolicy, ChatResult, Role};
    use std::sync::Mutex;

    // ============================================================================
    // LlmGenerator
    // ============================================================================

    struct MockClient {
        content: Option<String>,
        fail: bool,
        seen: Mutex<Vec<Message>>,
        seen_max_tokens: Mutex<Option<u32>>,
    }

    impl MockClient {
        fn replying(content: Option<&str>) -> Arc<Self> {
            Arc::new(Self {
                content: content.map(str::to_string),
                fail: false,
                seen: Mutex::new(Vec::new()),
                seen_max_tokens: Mutex::new(None),
            })
        }
    }

    #[async_trait]
    impl LlmClient for MockClient {
        async fn chat(
            &self,
            messages: Vec<Message>,
            max_tokens: Option<u32>,
        ) -> anyhow::Result<ChatResult> {
            *self.seen.lock().unwrap() = messages;
            *self.seen_max_tokens.lock().unwrap() = max_tokens;
            if self.fail {
                anyhow::bail!("API error 500");
            }
            Ok(ChatResult {
                request_id: "req-1".to_string(),
                content: self.content.clone(),
                usage: None,
                duration_ms: 5,
            })
        }

        fn provider_type(&self) -> Provider {
            Provider::DeepSeek
        }

        fn model_name(&self) -> String {
            "mock".to_string()
        }
    }

    #[tokio::test]
    async fn test_llm_generator_builds_messages() {
        let client = MockClient::replying(Some("It works in stages."));
        let generator = LlmGenerator::new(client.clone());

        let text = generator
            .generate(
                "guide prompt",
                &[ChatTurn::user("hi"), ChatTurn::assistant("hello")],
                "how does this work?",
                120,
            )
            .await
            .unwrap();

        assert_eq!(text, "It works in stages.");
        let seen = client.seen.lock().unwrap().clone();
        let roles: Vec<Role> = seen.iter().map(|m| m.role).collect();
        assert_eq!(roles, vec![Role::System, Role::User, Role::Assistant, Role::User]);
        assert_eq!(seen[0].content, "guide prompt");
        assert_eq!(seen[3].content, "how does this work?");
        assert_eq!(*client.seen_max_tokens.lock().unwrap(), Some(120));
        assert_eq!(generator.provider(), Provider::DeepSeek);
    }

    #[tokio::test]
    async fn test_llm_generator_missing_content_is_empty() {
        let generator = LlmGenerator::new(MockClient::replying(None));
        let text = generator.generate("p", &[], "q", 10).await.unwrap();
        assert_eq!(text, "");
    }

    #[tokio::test]
    async fn test_llm_generator_propagates_error() {
        let client = Arc::new(MockClient {
            content: None,
            fail: true,
            seen: Mutex::new(Vec::new()),
            seen_max_tokens: Mutex::new(None),
        });
        let generator = LlmGenerator::new(client);
        let err = generator.generate("p", &[], "q", 10).await.unwrap_err();
        assert!(matches!(err, MediatorError::Anyhow(_)));
    }

    // ============================================================================
    // GuardedGenerator
    // ============================================================================

    struct SlowGenerator(Duration);

    #[async_trait]
    impl TextGenerator for SlowGenerator {
        async fn generate(&self, _: &str, _: &[ChatTurn], _: &str, _: u32) -> Result<String> {
            tokio::time::sleep(self.0).await;
            Ok("late".to_string())
        }
    }

    struct FailingGenerator;

    #[async_trait]
    impl TextGenerator for FailingGenerator {
        async fn generate(&self, _: &str, _: &[ChatTurn], _: &str, _: u32) -> Result<String> {
            Err(MediatorError::Llm("boom".to_string()))
        }
    }

    #[tokio::test]
    async fn test_guarded_timeout() {
        let guarded = GuardedGenerator::new(
            Arc::new(SlowGenerator(Duration::from_secs(30))),
            Provider::OpenAi,
            CircuitBreaker::new(),
            Duration::from_millis(50),
        );
        let err = guarded.generate("p", &[], "q", 10).await.unwrap_err();
        assert!(matches!(err, MediatorError::Timeout(_)));
        assert!(err.is_transient());
    }

    #[tokio::test]
    async fn test_guarded_passes_through_success() {
        let guarded = GuardedGenerator::new(
            Arc::new(SlowGenerator(Duration::ZERO)),
            Provider::OpenAi,
            CircuitBreaker::new(),
            Duration::from_secs(2),
        );
        assert_eq!(guarded.generate("p", &[], "q", 10).await.unwrap(), "late");
    }

    #[tokio::test]
    async fn test_guarded_trips_and_fails_fast() {
        let breaker = CircuitBreaker::new();
        let guarded = GuardedGenerator::new(
            Arc::new(FailingGenerator),
            Provider::DeepSeek,
            breaker.clone(),
            Duration::from_secs(2),
        );

        for _ in 0..3 {
            let err = guarded.generate("p", &[], "q", 10).await.unwrap_err();
            assert!(matches!(err, MediatorError::Llm(_)));
        }

        let err = guarded.generate("p", &[], "q", 10).await.unwrap_err();
        assert!(matches!(err, MediatorError::CircuitOpen(ref p) if p == "deepseek"));
        assert!(matches!(
            breaker.admit(Provider::DeepSeek),
            Admission::Rejected { .. }
        ));
    }

    /// Fails a fixed number of times, then succeeds
    struct FlakyGenerator {
        failures_left: Mutex<u32>,
    }

    #[async_trait]
    impl TextGenerator for FlakyGenerator {
        async fn generate(&self, _: &str, _: &[ChatTurn], _: &str, _: u32) -> Result<String> {
            let mut left = self.failures_left.lock().unwrap();
            if *left > 0 {
                *left -= 1;
                return Err(MediatorError::Llm("overloaded".to_string()));
            }
            Ok("recovered".to_string())
        }
    }

    #[tokio::test]
    async fn test_guarded_recovers_after_cooldown() {
        let breaker = CircuitBreaker::with_policy(BreakerPolicy {
            failure_threshold: 1,
            cooldown: Duration::from_millis(30),
            ..Default::default()
        });
        let guarded = GuardedGenerator::new(
            Arc::new(FlakyGenerator {
                failures_left: Mutex::new(1),
            }),
            Provider::Ollama,
            breaker.clone(),
            Duration::from_secs(2),
        );

        assert!(guarded.generate("p", &[], "q", 10).await.is_err());
        let err = guarded.generate("p", &[], "q", 10).await.unwrap_err();
        assert!(matches!(err, MediatorError::CircuitOpen(_)));

        tokio::time::sleep(Duration::from_millis(40)).await;
        assert_eq!(guarded.generate("p", &[], "q", 10).await.unwrap(), "recovered");
        assert_eq!(breaker.admit(Provider::Ollama), Admission::Allowed);
    }
}
