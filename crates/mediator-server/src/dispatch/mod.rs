// crates/mediator-server/src/dispatch/mod.rs
// Off-ramp dispatch: curated responses that replace the model's reply

mod generator;
mod process;
mod router;
mod signal;

pub use generator::TextGenerator;
pub use router::{MEMORY_REQUEST_RESPONSE, OffRampRouter, UNKNOWN_SIGNAL_RESPONSE};
pub use signal::OffRampSignal;
