//! crates/mediator-server/src/utils.rs
//! Shared utility functions used across the codebase

/// Truncate a string to at most `max_chars` characters with ellipsis.
///
/// Counts characters rather than bytes so multi-byte text never splits
/// mid-codepoint. The result is at most `max_chars + 3` characters long.
pub fn truncate(s: &str, max_chars: usize) -> String {
    match s.char_indices().nth(max_chars) {
        None => s.to_string(),
        Some((byte_idx, _)) => format!("{}...", &s[..byte_idx]),
    }
}
