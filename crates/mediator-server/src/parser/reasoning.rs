// crates/mediator-server/src/parser/reasoning.rs
// Control flags and proposed items mined from the reasoning block

use regex::Regex;
use std::sync::LazyLock;

// SAFETY: static literal patterns; compilation cannot fail.
#[allow(clippy::expect_used)]
static FEEL_HEARD_FLAG: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\bFeelHeardCheck\s*:\s*Y(?:es)?\b").expect("feel-heard flag regex")
});

#[allow(clippy::expect_used)]
static READY_SHARE_FLAG: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\bReadyShare\s*:\s*Y(?:es)?\b").expect("ready-share flag regex")
});

#[allow(clippy::expect_used)]
static PROPOSED_ITEM: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?im)^[ \t]*(?:[-*][ \t]*)?ProposedStrategy[ \t]*:(.*)$")
        .expect("proposed item regex")
});

/// `FeelHeardCheck: Y`, the user is ready to confirm they feel heard
pub fn feel_heard_ready(reasoning: &str) -> bool {
    FEEL_HEARD_FLAG.is_match(reasoning)
}

/// `ReadyShare: Y`, the drafted content is ready for review
pub fn ready_to_share(reasoning: &str) -> bool {
    READY_SHARE_FLAG.is_match(reasoning)
}

/// Every `ProposedStrategy:` line, trimmed, in order, empties skipped
pub fn proposed_items(reasoning: &str) -> Vec<String> {
    PROPOSED_ITEM
        .captures_iter(reasoning)
        .filter_map(|caps| caps.get(1))
        .map(|m| m.as_str().trim())
        .filter(|item| !item.is_empty())
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_feel_heard_variants() {
        assert!(feel_heard_ready("feelHeardCheck:Y"));
        assert!(feel_heard_ready("FeelHeardCheck: Y"));
        assert!(feel_heard_ready("feelheardcheck:   y"));
        assert!(feel_heard_ready("Mode: Witness\nFeelHeardCheck : YES\n"));
    }

    #[test]
    fn test_feel_heard_negative() {
        assert!(!feel_heard_ready("FeelHeardCheck: N"));
        assert!(!feel_heard_ready("Mode: Witness"));
        assert!(!feel_heard_ready(""));
        assert!(!feel_heard_ready("FeelHeardCheck: Yikes"));
    }

    #[test]
    fn test_flags_are_independent() {
        let reasoning = "FeelHeardCheck: N\nReadyShare: Y";
        assert!(!feel_heard_ready(reasoning));
        assert!(ready_to_share(reasoning));
    }

    #[test]
    fn test_ready_share_whitespace() {
        assert!(ready_to_share("readyshare\t:\ty"));
        assert!(!ready_to_share("ReadyShare: N"));
    }

    #[test]
    fn test_proposed_items_in_order() {
        let reasoning = "Mode: Repair\n\
            ProposedStrategy: Weekly check-in walk\n\
            Some other note\n\
            - ProposedStrategy:   Phone-free dinners  \n\
            ProposedStrategy:\n\
            proposedstrategy: Pause word for heated moments";
        assert_eq!(
            proposed_items(reasoning),
            vec![
                "Weekly check-in walk".to_string(),
                "Phone-free dinners".to_string(),
                "Pause word for heated moments".to_string(),
            ]
        );
    }

    #[test]
    fn test_proposed_items_requires_line_start() {
        assert!(proposed_items("Note: see ProposedStrategy: inline").is_empty());
    }

    #[test]
    fn test_proposed_items_crlf() {
        let reasoning = "ProposedStrategy: One\r\nProposedStrategy: Two\r\n";
        assert_eq!(proposed_items(reasoning), vec!["One", "Two"]);
    }
}
