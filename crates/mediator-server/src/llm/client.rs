// crates/mediator-server/src/llm/client.rs
// OpenAI-compatible chat client (OpenAI, DeepSeek, Ollama)

use crate::llm::http_client::LlmHttpClient;
use crate::llm::logging::{log_chat_complete, log_chat_failed};
use crate::llm::openai_compat::{ChatRequest, parse_chat_response};
use crate::llm::provider::{LlmClient, Provider};
use crate::llm::{ChatResult, Message};
use anyhow::Result;
use async_trait::async_trait;
use std::time::Instant;
use tracing::{Span, debug, info, instrument};
use uuid::Uuid;

/// Off-ramp replies are short and conversational
const DEFAULT_TEMPERATURE: f32 = 0.6;

/// Chat client for any provider that speaks the OpenAI chat completions format
pub struct OpenAiCompatClient {
    provider: Provider,
    model: String,
    url: String,
    api_key: Option<String>,
    http: LlmHttpClient,
}

impl OpenAiCompatClient {
    /// Create a client using the provider's default model.
    ///
    /// `credential` is the API key, or the host URL for Ollama.
    pub fn new(provider: Provider, credential: String) -> Self {
        Self::with_model(provider, credential, provider.default_model().to_string())
    }

    /// Create a client with a custom model
    pub fn with_model(provider: Provider, credential: String, model: String) -> Self {
        let (url, api_key) = if provider.uses_api_key() {
            (provider.chat_url(None), Some(credential))
        } else {
            (provider.chat_url(Some(&credential)), None)
        };
        Self {
            provider,
            model,
            url,
            api_key,
            http: LlmHttpClient::default(),
        }
    }

    #[instrument(skip(self, messages), fields(request_id, provider = %self.provider, model = %self.model, message_count = messages.len()))]
    async fn chat_inner(&self, messages: Vec<Message>, max_tokens: Option<u32>) -> Result<ChatResult> {
        let request_id = Uuid::new_v4().to_string();
        let start_time = Instant::now();

        Span::current().record("request_id", request_id.as_str());

        info!(
            request_id = %request_id,
            message_count = messages.len(),
            max_tokens = ?max_tokens,
            "Starting {} chat request", self.provider
        );

        let request = ChatRequest::new(&self.model, messages)
            .with_max_tokens(max_tokens)
            .with_temperature(DEFAULT_TEMPERATURE);

        let body = serde_json::to_string(&request)?;
        debug!(request_id = %request_id, body_len = body.len(), "Chat request built");

        let response_body = match self
            .http
            .post_json(&request_id, &self.url, self.api_key.as_deref(), body)
            .await
        {
            Ok(body) => body,
            Err(e) => {
                log_chat_failed(&request_id, self.provider, elapsed_ms(start_time), &e);
                return Err(e);
            }
        };

        let duration_ms = elapsed_ms(start_time);
        let result = parse_chat_response(&response_body, &request_id, duration_ms)?;
        log_chat_complete(
            &request_id,
            self.provider,
            &self.model,
            duration_ms,
            result.content.as_ref().map(|c| c.len()).unwrap_or(0),
            result.usage.as_ref(),
        );

        Ok(result)
    }
}

fn elapsed_ms(start: Instant) -> u64 {
    start.elapsed().as_millis() as u64
}

#[async_trait]
impl LlmClient for OpenAiCompatClient {
    async fn chat(&self, messages: Vec<Message>, max_tokens: Option<u32>) -> Result<ChatResult> {
        self.chat_inner(messages, max_tokens).await
    }

    fn provider_type(&self) -> Provider {
        self.provider
    }

    fn model_name(&self) -> String {
        self.model.clone()
    }
}
