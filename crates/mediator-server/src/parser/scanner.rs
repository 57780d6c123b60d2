// crates/mediator-server/src/parser/scanner.rs
// Single-pass block scanner for the micro-tag vocabulary

use regex::Regex;
use std::ops::Range;
use std::sync::LazyLock;

/// Block types the model may emit
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TagKind {
    /// Hidden reasoning and control flags
    Thinking,
    /// Content for the side-panel review surface
    Draft,
    /// Off-ramp signal token
    Dispatch,
}

impl TagKind {
    pub const ALL: [TagKind; 3] = [TagKind::Thinking, TagKind::Draft, TagKind::Dispatch];

    pub fn name(self) -> &'static str {
        match self {
            TagKind::Thinking => "thinking",
            TagKind::Draft => "draft",
            TagKind::Dispatch => "dispatch",
        }
    }

    fn marker(self) -> &'static Regex {
        match self {
            TagKind::Thinking => &THINKING_MARKER,
            TagKind::Draft => &DRAFT_MARKER,
            TagKind::Dispatch => &DISPATCH_MARKER,
        }
    }
}

// Group 1 is present only on close markers
fn marker_regex(name: &str) -> Regex {
    // SAFETY: built from a fixed tag name; compilation cannot fail.
    #[allow(clippy::expect_used)]
    Regex::new(&format!(r"(?i)<\s*(/)?\s*{name}\s*>")).expect("tag marker regex")
}

static THINKING_MARKER: LazyLock<Regex> = LazyLock::new(|| marker_regex("thinking"));
static DRAFT_MARKER: LazyLock<Regex> = LazyLock::new(|| marker_regex("draft"));
static DISPATCH_MARKER: LazyLock<Regex> = LazyLock::new(|| marker_regex("dispatch"));

/// One outermost block of a single tag type
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Block {
    /// Markers included; runs to end of input when unclosed
    pub outer: Range<usize>,
    /// Content between the markers
    pub inner: Range<usize>,
    pub closed: bool,
}

/// All blocks and stray close markers of one tag type, in order of appearance
#[derive(Debug, Default)]
pub struct Scan {
    pub blocks: Vec<Block>,
    pub strays: Vec<Range<usize>>,
}

/// Scan `text` for blocks of `kind`.
///
/// Same-type nesting is tracked by depth so an inner block belongs to its
/// outermost block. An open marker that is never closed swallows the rest of
/// the input. A close marker at depth zero is recorded as a stray.
pub fn scan(text: &str, kind: TagKind) -> Scan {
    let mut result = Scan::default();
    let mut depth = 0usize;
    let mut open_at = 0usize;
    let mut content_at = 0usize;

    for caps in kind.marker().captures_iter(text) {
        let Some(marker) = caps.get(0) else {
            continue;
        };
        let closing = caps.get(1).is_some();

        if !closing {
            if depth == 0 {
                open_at = marker.start();
                content_at = marker.end();
            }
            depth += 1;
        } else if depth == 0 {
            result.strays.push(marker.range());
        } else {
            depth -= 1;
            if depth == 0 {
                result.blocks.push(Block {
                    outer: open_at..marker.end(),
                    inner: content_at..marker.start(),
                    closed: true,
                });
            }
        }
    }

    if depth > 0 {
        result.blocks.push(Block {
            outer: open_at..text.len(),
            inner: content_at..text.len(),
            closed: false,
        });
    }

    result
}

/// Trimmed content of the first block of `kind`, if any block exists
pub fn first_content(text: &str, kind: TagKind) -> Option<&str> {
    scan(text, kind)
        .blocks
        .first()
        .map(|block| text[block.inner.clone()].trim())
}

/// Remove every block and stray marker of `kind` from `text`
pub fn remove_all(text: &str, kind: TagKind) -> String {
    let scan = scan(text, kind);
    let mut ranges: Vec<Range<usize>> = scan
        .blocks
        .into_iter()
        .map(|b| b.outer)
        .chain(scan.strays)
        .collect();

    if ranges.is_empty() {
        return text.to_string();
    }
    ranges.sort_by_key(|r| r.start);

    let mut out = String::with_capacity(text.len());
    let mut cursor = 0;
    for range in ranges {
        push_joined(&mut out, &text[cursor..range.start]);
        cursor = range.end;
    }
    push_joined(&mut out, &text[cursor..]);
    out
}

/// Append `piece` after a removed block, collapsing the whitespace at the seam.
///
/// Horizontal whitespace collapses to one space. When either side carries
/// line breaks the larger count is kept, capped at one blank line.
fn push_joined(out: &mut String, piece: &str) {
    if out.is_empty() {
        out.push_str(piece);
        return;
    }

    let left_len = out.len() - out.trim_end().len();
    let right = piece.trim_start();
    let right_ws = &piece[..piece.len() - right.len()];

    if left_len == 0 && right_ws.is_empty() {
        out.push_str(piece);
        return;
    }

    let left_ws = &out[out.len() - left_len..];
    let newlines = left_ws
        .matches('\n')
        .count()
        .max(right_ws.matches('\n').count())
        .min(2);

    out.truncate(out.len() - left_len);
    if newlines == 0 {
        out.push(' ');
    } else {
        out.extend(std::iter::repeat_n('\n', newlines));
    }
    out.push_str(right);
}
