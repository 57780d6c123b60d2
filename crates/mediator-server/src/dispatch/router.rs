// crates/mediator-server/src/dispatch/router.rs
// Routes an off-ramp signal to its curated response

use super::{OffRampSignal, TextGenerator, process};
use crate::config::DispatchSettings;
use crate::parser::strip_micro_tags;
use mediator_types::DispatchContext;
use std::sync::Arc;
use tracing::{debug, instrument, warn};

/// Reply for `HANDLE_MEMORY_REQUEST`
pub const MEMORY_REQUEST_RESPONSE: &str = "I can't save things to memory from inside our \
    conversation, but you can add anything you'd like me to keep in mind from the Memory \
    section of your profile. It will be taken into account in future sessions.";

/// Reply for signals nobody handles
pub const UNKNOWN_SIGNAL_RESPONSE: &str =
    "Thanks for sharing that. Let's keep going whenever you're ready.";

/// Resolves off-ramp signals. Total: every path yields non-empty text.
pub struct OffRampRouter {
    generator: Option<Arc<dyn TextGenerator>>,
    settings: DispatchSettings,
}

impl OffRampRouter {
    pub fn new(generator: Arc<dyn TextGenerator>, settings: DispatchSettings) -> Self {
        Self {
            generator: Some(generator),
            settings,
        }
    }

    /// Router without a generator; `EXPLAIN_PROCESS` always uses its static text
    pub fn offline(settings: DispatchSettings) -> Self {
        Self {
            generator: None,
            settings,
        }
    }

    /// Produce the replacement text for `signal`
    pub async fn dispatch(&self, signal: &str, ctx: &DispatchContext) -> String {
        let signal = OffRampSignal::parse(signal);
        debug!(
            signal = %signal,
            session_id = %ctx.session_id,
            turn_id = %ctx.turn_id,
            "Dispatching off-ramp"
        );

        match signal {
            OffRampSignal::ExplainProcess => self.explain_process(ctx).await,
            OffRampSignal::HandleMemoryRequest => MEMORY_REQUEST_RESPONSE.to_string(),
            OffRampSignal::Unknown(token) => {
                debug!(signal = %token, "Unrecognized off-ramp signal");
                UNKNOWN_SIGNAL_RESPONSE.to_string()
            }
        }
    }

    // Provider and breaker logs emitted during generation inherit these fields
    #[instrument(
        skip_all,
        fields(signal = "EXPLAIN_PROCESS", session_id = %ctx.session_id, turn_id = %ctx.turn_id)
    )]
    async fn explain_process(&self, ctx: &DispatchContext) -> String {
        let Some(generator) = &self.generator else {
            debug!(session_id = %ctx.session_id, "No generator configured, using static explanation");
            return process::fallback(ctx);
        };

        let window_start = ctx.history.len().saturating_sub(self.settings.history_window);
        let prior_turns = &ctx.history[window_start..];
        let system_prompt = process::system_prompt(ctx);

        match generator
            .generate(
                &system_prompt,
                prior_turns,
                &ctx.user_message,
                self.settings.max_output_tokens,
            )
            .await
        {
            Ok(text) => {
                let text = strip_micro_tags(&text);
                if text.is_empty() {
                    warn!(
                        signal = "EXPLAIN_PROCESS",
                        session_id = %ctx.session_id,
                        turn_id = %ctx.turn_id,
                        "Generator returned empty text, using static explanation"
                    );
                    process::fallback(ctx)
                } else {
                    text
                }
            }
            Err(e) => {
                warn!(
                    signal = "EXPLAIN_PROCESS",
                    session_id = %ctx.session_id,
                    turn_id = %ctx.turn_id,
                    error = %e,
                    "Generation failed, using static explanation"
                );
                process::fallback(ctx)
            }
        }
    }
}
