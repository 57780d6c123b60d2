// crates/mediator-server/src/llm/mod.rs
// LLM inference clients (OpenAI, DeepSeek, Ollama) and generation adapters

pub mod circuit_breaker;
mod client;
mod factory;
mod generator;
pub mod http_client;
mod logging;
mod openai_compat;
mod provider;
mod types;

pub use circuit_breaker::{Admission, BreakerPolicy, CircuitBreaker};
pub use client::OpenAiCompatClient;
pub use factory::ProviderFactory;
pub use generator::{GuardedGenerator, LlmGenerator};
pub use provider::{LlmClient, Provider};
pub use types::{ChatResult, Message, Role, Usage};
