// crates/mediator-server/src/turn.rs
// One conversational turn: parse the model reply, then resolve any off-ramp

use crate::dispatch::OffRampRouter;
use crate::parser::parse_micro_tag_response;
use mediator_types::{DispatchContext, TurnOutcome};
use tracing::{info, instrument};

/// Parse `raw` and, when it names an off-ramp, replace the response with
/// the router's text. Never fails.
#[instrument(skip(raw, ctx, router), fields(session_id = %ctx.session_id, turn_id = %ctx.turn_id))]
pub async fn resolve_turn(raw: &str, ctx: &DispatchContext, router: &OffRampRouter) -> TurnOutcome {
    let parsed = parse_micro_tag_response(raw);

    info!(
        raw_len = raw.len(),
        response_len = parsed.response_text.len(),
        reasoning_len = parsed.reasoning_text.len(),
        has_draft = parsed.draft_text.is_some(),
        feel_heard_ready = parsed.feel_heard_ready,
        ready_to_share = parsed.ready_to_share,
        proposed_items = parsed.proposed_items.len(),
        off_ramp = ?parsed.off_ramp_signal,
        "Parsed model response"
    );

    let response_text = match parsed.off_ramp_signal.as_deref() {
        Some(signal) => router.dispatch(signal, ctx).await,
        None => parsed.response_text,
    };

    TurnOutcome {
        response_text,
        draft_text: parsed.draft_text,
        feel_heard_ready: parsed.feel_heard_ready,
        ready_to_share: parsed.ready_to_share,
        proposed_items: parsed.proposed_items,
        off_ramp_signal: parsed.off_ramp_signal,
    }
}
