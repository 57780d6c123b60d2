// crates/mediator-server/src/config/mod.rs
// Configuration from environment and ~/.mediator/config.toml

pub mod env;
pub mod file;

pub use env::{ApiKeys, ConfigValidation, EnvConfig};
pub use file::{DispatchSettings, MediatorConfig};
