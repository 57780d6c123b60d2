// crates/mediator-server/src/parser/mod.rs
// Micro-tag response parser: splits one raw model reply into its parts
//
// Wire format emitted by the model:
//
//   <thinking>
//   Mode: Witness
//   FeelHeardCheck: Y
//   ReadyShare: N
//   ProposedStrategy: ...
//   </thinking>
//   <draft>text for the side panel</draft>
//   <dispatch>EXPLAIN_PROCESS</dispatch>
//   Prose shown to the user.
//
// Only the first block of each kind is read, but every block is stripped
// from the user-facing text.

mod legacy;
mod reasoning;
pub mod scanner;

pub use scanner::TagKind;

use mediator_types::ParsedResponse;
use tracing::{debug, trace};

/// Parse one raw model reply. Total: malformed input degrades, never fails.
pub fn parse_micro_tag_response(raw: &str) -> ParsedResponse {
    let reasoning_block = scanner::first_content(raw, TagKind::Thinking);
    let draft_block = scanner::first_content(raw, TagKind::Draft);
    let off_ramp_signal = off_ramp_signal(raw);

    let reasoning_text = reasoning_block.unwrap_or_default().to_string();
    let draft_text = draft_block
        .map(strip_hidden_blocks)
        .filter(|draft| !draft.is_empty());
    let response_text = strip_micro_tags(raw);

    let parsed = ParsedResponse {
        feel_heard_ready: reasoning::feel_heard_ready(&reasoning_text),
        ready_to_share: reasoning::ready_to_share(&reasoning_text),
        proposed_items: reasoning::proposed_items(&reasoning_text),
        response_text,
        reasoning_text,
        draft_text,
        off_ramp_signal,
    };

    trace!(
        has_reasoning = reasoning_block.is_some(),
        has_draft = parsed.draft_text.is_some(),
        off_ramp = ?parsed.off_ramp_signal,
        "Parsed micro-tag response"
    );

    if reasoning_block.is_none() && draft_block.is_none() && parsed.response_text.starts_with('{')
    {
        if let Some(envelope) = legacy::parse_envelope(&parsed.response_text) {
            debug!(
                has_draft = envelope.draft_text.is_some(),
                "Parsed legacy JSON envelope"
            );
            return envelope;
        }
    }

    parsed
}

/// Remove every reasoning, draft and off-ramp block (and stray marker), then trim
pub fn strip_micro_tags(text: &str) -> String {
    strip_until_stable(text, &TagKind::ALL)
}

/// Draft content may only carry prose; reasoning and off-ramp blocks are dropped
fn strip_hidden_blocks(draft: &str) -> String {
    strip_until_stable(draft, &[TagKind::Thinking, TagKind::Dispatch])
}

/// Repeat removal until nothing changes: joining the text around a removed
/// block can spell out a new marker (`<thin<draft>x</draft>king>`).
/// Each productive pass shortens the text, so the loop terminates.
fn strip_until_stable(text: &str, kinds: &[TagKind]) -> String {
    let mut out = text.to_string();
    loop {
        let before = out.len();
        for &kind in kinds {
            out = scanner::remove_all(&out, kind);
        }
        if out.len() == before {
            break;
        }
    }
    out.trim().to_string()
}

/// Signal token from the first `<dispatch>` block.
///
/// An unclosed block keeps only its first word; the prose after it is not
/// part of the signal.
fn off_ramp_signal(raw: &str) -> Option<String> {
    let scan = scanner::scan(raw, TagKind::Dispatch);
    let block = scan.blocks.first()?;
    let content = raw[block.inner.clone()].trim();
    let signal = if block.closed {
        content
    } else {
        content.split_whitespace().next().unwrap_or_default()
    };
    (!signal.is_empty()).then(|| signal.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    const MARKERS: [&str; 6] = [
        "<thinking>",
        "</thinking>",
        "<draft>",
        "</draft>",
        "<dispatch>",
        "</dispatch>",
    ];

    fn assert_no_markers(text: &str) {
        let lower = text.to_lowercase();
        for marker in MARKERS {
            assert!(!lower.contains(marker), "{marker} leaked into {text:?}");
        }
    }

    // ============================================================================
    // Basic extraction
    // ============================================================================

    #[test]
    fn test_witness_example() {
        let raw = "<thinking>\nMode: Witness\nFeelHeardCheck: Y\n</thinking>\n\nI really hear that.";
        let parsed = parse_micro_tag_response(raw);
        assert_eq!(parsed.response_text, "I really hear that.");
        assert_eq!(parsed.reasoning_text, "Mode: Witness\nFeelHeardCheck: Y");
        assert!(parsed.feel_heard_ready);
        assert!(!parsed.ready_to_share);
        assert_eq!(parsed.draft_text, None);
        assert_eq!(parsed.off_ramp_signal, None);
        assert!(parsed.proposed_items.is_empty());
    }

    #[test]
    fn test_no_tags_returns_trimmed_input() {
        let parsed = parse_micro_tag_response("   Tell me more about that.\n");
        assert_eq!(parsed.response_text, "Tell me more about that.");
        assert_eq!(parsed.reasoning_text, "");
        assert_eq!(parsed.draft_text, None);
        assert_eq!(parsed.off_ramp_signal, None);
        assert!(!parsed.feel_heard_ready);
        assert!(!parsed.ready_to_share);
    }

    #[test]
    fn test_empty_input() {
        let parsed = parse_micro_tag_response("");
        assert_eq!(parsed, ParsedResponse::default());
    }

    #[test]
    fn test_draft_between_prose() {
        let raw = "Here is something you could send: <draft>Draft body</draft> Let me know what you think.";
        let parsed = parse_micro_tag_response(raw);
        assert_eq!(parsed.draft_text.as_deref(), Some("Draft body"));
        assert_eq!(
            parsed.response_text,
            "Here is something you could send: Let me know what you think."
        );
        assert!(!parsed.response_text.contains("Draft body"));
    }

    #[test]
    fn test_off_ramp_signal_trimmed_and_stripped() {
        let raw = "<thinking>User asks how this works</thinking>\n<dispatch>  EXPLAIN_PROCESS \n</dispatch>\nGood question!";
        let parsed = parse_micro_tag_response(raw);
        assert_eq!(parsed.off_ramp_signal.as_deref(), Some("EXPLAIN_PROCESS"));
        assert_eq!(parsed.response_text, "Good question!");
        assert!(!parsed.response_text.contains("EXPLAIN_PROCESS"));
    }

    #[test]
    fn test_empty_dispatch_is_absent() {
        let parsed = parse_micro_tag_response("<dispatch>  </dispatch>Hello");
        assert_eq!(parsed.off_ramp_signal, None);
        assert_eq!(parsed.response_text, "Hello");
    }

    #[test]
    fn test_ready_share_and_proposals() {
        let raw = "<thinking>\nReadyShare: Y\nProposedStrategy: Sunday planning chat\nProposedStrategy: Text before running late\n</thinking>\n<draft>I'd like us to try a Sunday planning chat.</draft>\nHere's a draft for you to review.";
        let parsed = parse_micro_tag_response(raw);
        assert!(parsed.ready_to_share);
        assert!(!parsed.feel_heard_ready);
        assert_eq!(
            parsed.proposed_items,
            vec!["Sunday planning chat", "Text before running late"]
        );
        assert_eq!(parsed.response_text, "Here's a draft for you to review.");
    }

    #[test]
    fn test_flags_only_read_from_reasoning() {
        let parsed = parse_micro_tag_response("FeelHeardCheck: Y\nReadyShare: Y\nProposedStrategy: x");
        assert!(!parsed.feel_heard_ready);
        assert!(!parsed.ready_to_share);
        assert!(parsed.proposed_items.is_empty());
    }

    // ============================================================================
    // Duplicates, nesting and malformed tags
    // ============================================================================

    #[test]
    fn test_duplicate_reasoning_first_wins_all_stripped() {
        let raw = "<thinking>first FeelHeardCheck: N</thinking>Hi<thinking>second FeelHeardCheck: Y</thinking> there";
        let parsed = parse_micro_tag_response(raw);
        assert_eq!(parsed.reasoning_text, "first FeelHeardCheck: N");
        assert!(!parsed.feel_heard_ready);
        assert_eq!(parsed.response_text, "Hi there");
        assert!(!parsed.response_text.contains("second"));
    }

    #[test]
    fn test_unclosed_reasoning_hides_rest() {
        let raw = "Visible part. <thinking>private analysis that never closes";
        let parsed = parse_micro_tag_response(raw);
        assert_eq!(parsed.response_text, "Visible part.");
        assert_eq!(parsed.reasoning_text, "private analysis that never closes");
    }

    #[test]
    fn test_stray_close_markers_removed() {
        let parsed = parse_micro_tag_response("Okay.</thinking> Let's go on.</dispatch>");
        assert_eq!(parsed.response_text, "Okay. Let's go on.");
        assert_no_markers(&parsed.response_text);
    }

    #[test]
    fn test_nested_reasoning_does_not_leak() {
        let raw = "<thinking>outer <thinking>inner</thinking> tail-secret</thinking>Shown";
        let parsed = parse_micro_tag_response(raw);
        assert_eq!(parsed.response_text, "Shown");
        assert!(!parsed.response_text.contains("tail-secret"));
    }

    #[test]
    fn test_uppercase_tags() {
        let raw = "<THINKING>FeelHeardCheck: y</THINKING><Draft>d</Draft><DISPATCH>X</DISPATCH>ok";
        let parsed = parse_micro_tag_response(raw);
        assert!(parsed.feel_heard_ready);
        assert_eq!(parsed.draft_text.as_deref(), Some("d"));
        assert_eq!(parsed.off_ramp_signal.as_deref(), Some("X"));
        assert_eq!(parsed.response_text, "ok");
    }

    #[test]
    fn test_draft_inside_reasoning_still_extracted() {
        let raw = "<thinking>plan <draft>inner draft</draft></thinking>Reply";
        let parsed = parse_micro_tag_response(raw);
        assert_eq!(parsed.draft_text.as_deref(), Some("inner draft"));
        assert_eq!(parsed.response_text, "Reply");
    }

    #[test]
    fn test_reasoning_inside_draft_removed_from_draft() {
        let raw = "<draft>Dear Alex,<thinking>keep it short</thinking> can we talk?</draft>Sent to the panel.";
        let parsed = parse_micro_tag_response(raw);
        assert_eq!(parsed.draft_text.as_deref(), Some("Dear Alex, can we talk?"));
        assert_eq!(parsed.reasoning_text, "keep it short");
        assert_eq!(parsed.response_text, "Sent to the panel.");
    }

    #[test]
    fn test_privacy_invariant_over_messy_inputs() {
        let inputs = [
            "<thinking>s1</thinking><thinking>s2</thinking>text",
            "<thinking>s1",
            "text</thinking><thinking>s1</thinking>",
            "<draft>d<dispatch>X</dispatch></draft>text<dispatch>Y",
            "< thinking >s1</ THINKING >text</draft></draft>",
            "<thinking>a<draft>b</thinking>c</draft>text",
        ];
        for raw in inputs {
            let parsed = parse_micro_tag_response(raw);
            assert_no_markers(&parsed.response_text);
            assert!(!parsed.response_text.contains("s1"), "{raw:?}");
            assert!(!parsed.response_text.contains("s2"), "{raw:?}");
        }
    }

    // ============================================================================
    // Legacy JSON fallback
    // ============================================================================

    #[test]
    fn test_legacy_json_envelope() {
        let raw = r#"{"response": "I drafted an invitation.", "invitationMessage": "Hey, can we talk this week?"}"#;
        let parsed = parse_micro_tag_response(raw);
        assert_eq!(parsed.response_text, "I drafted an invitation.");
        assert_eq!(parsed.draft_text.as_deref(), Some("Hey, can we talk this week?"));
        assert_eq!(parsed.off_ramp_signal, None);
    }

    #[test]
    fn test_legacy_skipped_when_tags_present() {
        let raw = "<thinking>x</thinking>{\"response\": \"json\"}";
        let parsed = parse_micro_tag_response(raw);
        assert_eq!(parsed.response_text, "{\"response\": \"json\"}");
    }

    #[test]
    fn test_legacy_invalid_json_keeps_text() {
        let parsed = parse_micro_tag_response("{not really json");
        assert_eq!(parsed.response_text, "{not really json");
        assert_eq!(parsed.draft_text, None);
    }

    #[test]
    fn test_unclosed_dispatch_keeps_first_word() {
        let parsed = parse_micro_tag_response("<dispatch>EXPLAIN_PROCESS\nLet me explain.");
        assert_eq!(parsed.off_ramp_signal.as_deref(), Some("EXPLAIN_PROCESS"));
        assert_eq!(parsed.response_text, "");

        let parsed = parse_micro_tag_response("Sure. <dispatch>  ");
        assert_eq!(parsed.off_ramp_signal, None);
        assert_eq!(parsed.response_text, "Sure.");
    }

    #[test]
    fn test_closed_dispatch_keeps_full_content() {
        let parsed = parse_micro_tag_response("<dispatch>SOME SIGNAL</dispatch>ok");
        assert_eq!(parsed.off_ramp_signal.as_deref(), Some("SOME SIGNAL"));
    }

    // ============================================================================
    // Markers spliced together by removal
    // ============================================================================

    const SPLICED: [&str; 3] = [
        "Hi <thin<thinking>x</thinking>king>secret plan",
        "<think<draft>x</draft>ing>hidden",
        "<dra<dispatch>X</dispatch>ft>body</draft> Ok",
    ];

    #[test]
    fn test_spliced_markers_are_removed() {
        let expected = ["Hi", "", ""];
        for (raw, want) in SPLICED.iter().zip(expected) {
            let parsed = parse_micro_tag_response(raw);
            assert_eq!(parsed.response_text, want, "{raw:?}");
            assert_no_markers(&parsed.response_text);
            assert!(!parsed.response_text.contains("secret"));
            assert!(!parsed.response_text.contains("hidden"));
        }
    }

    #[test]
    fn test_strip_is_stable_on_spliced_markers() {
        for raw in SPLICED {
            let once = strip_micro_tags(raw);
            assert_eq!(strip_micro_tags(&once), once, "{raw:?}");
        }
    }

    #[test]
    fn test_spliced_marker_in_draft_removed() {
        let raw = "<draft>Dear Alex, <thin<dispatch>X</dispatch>king>note</draft>Done.";
        let parsed = parse_micro_tag_response(raw);
        assert_eq!(parsed.draft_text.as_deref(), Some("Dear Alex,"));
    }

    #[test]
    fn test_strip_micro_tags() {
        assert_eq!(
            strip_micro_tags(" <dispatch>X</dispatch> Hello <draft>d</draft>world "),
            "Hello world"
        );
    }
}
