// crates/mediator-server/src/lib.rs
// Mediator - LLM response parsing and off-ramp dispatch for guided mediation

#![warn(clippy::unwrap_used)]
#![warn(clippy::expect_used)]
#![cfg_attr(test, allow(clippy::unwrap_used, clippy::expect_used))]

pub mod config;
pub mod dispatch;
pub mod error;
pub mod llm;
pub mod parser;
pub mod turn;
pub mod utils;
pub use error::{MediatorError, Result};
pub use mediator_types::{ChatTurn, DispatchContext, ParsedResponse, Stage, TurnOutcome, TurnRole};
