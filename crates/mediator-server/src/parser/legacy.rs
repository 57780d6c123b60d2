// crates/mediator-server/src/parser/legacy.rs
// JSON envelope emitted by older prompt revisions, before micro-tags

use mediator_types::ParsedResponse;
use serde::Deserialize;
use tracing::debug;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct LegacyEnvelope {
    #[serde(default)]
    response: Option<String>,
    #[serde(default)]
    invitation_message: Option<String>,
    #[serde(default)]
    proposed_empathy_statement: Option<String>,
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|s| !s.trim().is_empty())
}

/// Reinterpret a tag-free `{...}` reply as the legacy JSON envelope.
///
/// Returns `None` when the text is not a JSON object of the expected shape;
/// the caller then keeps its tag-based result.
pub fn parse_envelope(response_text: &str) -> Option<ParsedResponse> {
    let envelope: LegacyEnvelope = match serde_json::from_str(response_text) {
        Ok(envelope) => envelope,
        Err(e) => {
            debug!(error = %e, "Brace-prefixed reply is not a legacy envelope");
            return None;
        }
    };

    let response_text = non_empty(envelope.response)
        .map(|r| super::strip_micro_tags(&r))
        .unwrap_or_else(|| response_text.to_string());
    let draft_text = non_empty(envelope.invitation_message)
        .or_else(|| non_empty(envelope.proposed_empathy_statement))
        .map(|d| d.trim().to_string());

    Some(ParsedResponse {
        response_text,
        draft_text,
        ..Default::default()
    })
}
