// crates/mediator-server/src/dispatch/signal.rs

use std::fmt;

/// Off-ramp signal named in a `<dispatch>` block
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OffRampSignal {
    /// User asked how the process works or what comes next
    ExplainProcess,
    /// User asked the assistant to remember something
    HandleMemoryRequest,
    /// Anything else, kept verbatim (trimmed)
    Unknown(String),
}

impl OffRampSignal {
    /// Parse a raw signal token; matching is trimmed and case-insensitive
    pub fn parse(raw: &str) -> Self {
        let token = raw.trim();
        if token.eq_ignore_ascii_case("EXPLAIN_PROCESS") {
            Self::ExplainProcess
        } else if token.eq_ignore_ascii_case("HANDLE_MEMORY_REQUEST") {
            Self::HandleMemoryRequest
        } else {
            Self::Unknown(token.to_string())
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Self::ExplainProcess => "EXPLAIN_PROCESS",
            Self::HandleMemoryRequest => "HANDLE_MEMORY_REQUEST",
            Self::Unknown(token) => token,
        }
    }
}

impl fmt::Display for OffRampSignal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
