// crates/mediator-types/src/lib.rs
// Shared types for Mediator, kept free of runtime and I/O dependencies

use serde::{Deserialize, Serialize};

// ═══════════════════════════════════════
// CONVERSATION
// ═══════════════════════════════════════

/// Speaker of a prior turn in the conversation history
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum TurnRole {
    User,
    Assistant,
}

/// One prior turn of the conversation
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ChatTurn {
    pub role: TurnRole,
    pub content: String,
}

impl ChatTurn {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: TurnRole::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: TurnRole::Assistant,
            content: content.into(),
        }
    }
}

/// Stage of a mediation session, in the order a session moves through them
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    Onboarding,
    Witness,
    PerspectiveStretch,
    NeedMapping,
    StrategicRepair,
}

impl Stage {
    /// The stage that follows this one, if any
    pub fn next(self) -> Option<Stage> {
        match self {
            Stage::Onboarding => Some(Stage::Witness),
            Stage::Witness => Some(Stage::PerspectiveStretch),
            Stage::PerspectiveStretch => Some(Stage::NeedMapping),
            Stage::NeedMapping => Some(Stage::StrategicRepair),
            Stage::StrategicRepair => None,
        }
    }

    /// Display name shown to participants
    pub fn title(self) -> &'static str {
        match self {
            Stage::Onboarding => "Getting Started",
            Stage::Witness => "Witness",
            Stage::PerspectiveStretch => "Perspective Stretch",
            Stage::NeedMapping => "Need Mapping",
            Stage::StrategicRepair => "Strategic Repair",
        }
    }

    /// One-sentence description of what happens in this stage
    pub fn summary(self) -> &'static str {
        match self {
            Stage::Onboarding => {
                "you both agree to take part and set the ground rules for the conversation."
            }
            Stage::Witness => {
                "each of you shares your side privately and I listen until you feel fully heard."
            }
            Stage::PerspectiveStretch => {
                "you try on your partner's point of view and put into words how it might feel for them."
            }
            Stage::NeedMapping => {
                "we name the needs underneath the conflict and look for the ones you share."
            }
            Stage::StrategicRepair => {
                "you propose small, concrete experiments and agree on the ones you both want to try."
            }
        }
    }
}

// ═══════════════════════════════════════
// MODEL OUTPUT
// ═══════════════════════════════════════

/// The parts of one raw model reply, as split by the micro-tag parser.
///
/// `response_text` is the only field that may be shown in the chat thread.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ParsedResponse {
    pub response_text: String,
    pub reasoning_text: String,
    pub draft_text: Option<String>,
    pub off_ramp_signal: Option<String>,
    pub feel_heard_ready: bool,
    pub ready_to_share: bool,
    #[serde(default)]
    pub proposed_items: Vec<String>,
}

/// Read-only inputs for resolving an off-ramp signal
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct DispatchContext {
    pub user_message: String,
    #[serde(default)]
    pub history: Vec<ChatTurn>,
    #[serde(default)]
    pub user_name: Option<String>,
    #[serde(default)]
    pub partner_name: Option<String>,
    pub session_id: String,
    pub turn_id: String,
    /// Current stage, when the caller knows it
    #[serde(default)]
    pub stage: Option<Stage>,
}

/// Final result of one conversational turn after off-ramp resolution
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct TurnOutcome {
    pub response_text: String,
    pub draft_text: Option<String>,
    pub feel_heard_ready: bool,
    pub ready_to_share: bool,
    #[serde(default)]
    pub proposed_items: Vec<String>,
    /// The off-ramp signal that replaced the model's response, if any
    pub off_ramp_signal: Option<String>,
}
