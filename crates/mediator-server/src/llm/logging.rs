// crates/mediator-server/src/llm/logging.rs
// Provider call logging. Signal, session and turn fields come from the
// enclosing off-ramp span, so these lines only carry call-level data.

use super::{Provider, Usage};
use tracing::{info, warn};

/// One line per finished chat call, with token counts when the provider reports them
pub fn log_chat_complete(
    request_id: &str,
    provider: Provider,
    model: &str,
    duration_ms: u64,
    content_len: usize,
    usage: Option<&Usage>,
) {
    match usage {
        Some(usage) => info!(
            request_id,
            provider = %provider,
            model,
            duration_ms,
            content_len,
            prompt_tokens = usage.prompt_tokens,
            completion_tokens = usage.completion_tokens,
            total_tokens = usage.total_tokens,
            "Chat call complete"
        ),
        None => info!(
            request_id,
            provider = %provider,
            model,
            duration_ms,
            content_len,
            "Chat call complete, no usage reported"
        ),
    }
}

/// A chat call that gave up after retries
pub fn log_chat_failed(request_id: &str, provider: Provider, duration_ms: u64, error: &anyhow::Error) {
    warn!(
        request_id,
        provider = %provider,
        duration_ms,
        error = %error,
        "Chat call failed"
    );
}
