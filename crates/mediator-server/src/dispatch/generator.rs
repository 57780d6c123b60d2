// crates/mediator-server/src/dispatch/generator.rs

use crate::Result;
use async_trait::async_trait;
use mediator_types::ChatTurn;

/// Text generation seam used by off-ramps that need a model reply
#[async_trait]
pub trait TextGenerator: Send + Sync {
    /// Generate one reply from a system prompt, prior turns and the current
    /// user message, within `max_output_tokens`
    async fn generate(
        &self,
        system_prompt: &str,
        prior_turns: &[ChatTurn],
        user_message: &str,
        max_output_tokens: u32,
    ) -> Result<String>;
}
