// crates/mediator-server/src/llm/openai_compat/response.rs
// Chat completion body -> ChatResult

use crate::llm::{ChatResult, Usage};
use anyhow::{Result, anyhow, bail};
use serde::Deserialize;
use tracing::debug;

#[derive(Debug, Deserialize)]
struct Completion {
    #[serde(default)]
    choices: Vec<Choice>,
    #[serde(default)]
    usage: Option<Usage>,
    /// Some gateways answer 200 with an error object instead of choices
    #[serde(default)]
    error: Option<ProviderError>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ChoiceMessage,
    #[serde(default)]
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ChoiceMessage {
    #[serde(default)]
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ProviderError {
    message: String,
}

/// Read the first choice's text. An empty choice list yields `content: None`.
pub fn parse_chat_response(
    response_body: &str,
    request_id: &str,
    duration_ms: u64,
) -> Result<ChatResult> {
    let completion: Completion = serde_json::from_str(response_body)
        .map_err(|e| anyhow!("Failed to parse chat response: {}", e))?;

    if let Some(error) = completion.error {
        bail!("provider returned an error: {}", error.message);
    }

    let content = completion.choices.into_iter().next().and_then(|choice| {
        if choice.finish_reason.as_deref() == Some("length") {
            debug!(request_id, "Reply cut off at the output budget");
        }
        choice.message.content
    });

    Ok(ChatResult {
        request_id: request_id.to_owned(),
        content,
        usage: completion.usage,
        duration_ms,
    })
}
