// crates/mediator-server/src/dispatch/process.rs
// Process-guide prompt and static explanations of the mediation process

use mediator_types::{DispatchContext, Stage};

/// Phrases that mean the user wants to know what comes next
const WHATS_NEXT_CUES: [&str; 7] = [
    "next",
    "what now",
    "after this",
    "after that",
    "then what",
    "move on",
    "what happens now",
];

const STAGES: [Stage; 5] = [
    Stage::Onboarding,
    Stage::Witness,
    Stage::PerspectiveStretch,
    Stage::NeedMapping,
    Stage::StrategicRepair,
];

/// System prompt for explaining the process in the assistant's own voice
pub fn system_prompt(ctx: &DispatchContext) -> String {
    let user = ctx.user_name.as_deref().unwrap_or("the user");
    let partner = ctx.partner_name.as_deref().unwrap_or("their partner");

    let mut prompt = format!(
        "You are a warm, neutral mediation guide talking with {user}. \
         {user} has asked about how this process works. Explain it briefly and \
         plainly, in two to four sentences, then invite {user} to continue.\n\n\
         The process has these stages:\n"
    );
    for (i, stage) in STAGES.iter().enumerate() {
        prompt.push_str(&format!("{}. {}: {}\n", i + 1, stage.title(), stage.summary()));
    }

    if let Some(stage) = ctx.stage {
        prompt.push_str(&format!("\n{user} is currently in the {} stage.\n", stage.title()));
    }

    prompt.push_str(&format!(
        "\nRules:\n\
         - Never reveal or guess what {partner} has said privately.\n\
         - Do not use tags, markup, or bullet lists.\n\
         - Do not give advice about the conflict itself.\n"
    ));
    prompt
}

/// True when the message asks what happens next
pub fn asks_whats_next(user_message: &str) -> bool {
    let lower = user_message.to_lowercase();
    WHATS_NEXT_CUES.iter().any(|cue| lower.contains(cue))
}

/// Static explanation used when generation is unavailable
pub fn fallback(ctx: &DispatchContext) -> String {
    if asks_whats_next(&ctx.user_message) {
        next_stage_text(ctx.stage)
    } else {
        overview_text()
    }
}

fn overview_text() -> String {
    let mut text = String::from("Here's how this works. We move through a few stages together:");
    for stage in STAGES {
        text.push_str(&format!(" In {}, {}", stage.title(), stage.summary()));
    }
    text.push_str(" We go at your pace, and nothing you share privately is passed on without your say.");
    text
}

fn next_stage_text(current: Option<Stage>) -> String {
    match current.and_then(|stage| stage.next().map(|next| (stage, next))) {
        Some((stage, next)) => format!(
            "Once we've finished {}, we'll move into {}. In that stage, {} \
             There's no rush; we'll move on when you're ready.",
            stage.title(),
            next.title(),
            next.summary()
        ),
        None if current == Some(Stage::StrategicRepair) => {
            "You're in the last stage, Strategic Repair. From here, you try the experiments \
             you both agreed on and check in on how they're going. You can come back any time."
                .to_string()
        }
        None => "Next, we keep going one step at a time. When this part feels complete, \
                 I'll guide you into the next stage and explain what it involves."
            .to_string(),
    }
}
