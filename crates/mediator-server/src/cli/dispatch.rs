// crates/mediator-server/src/cli/dispatch.rs
// Off-ramp dispatch and full-turn commands

use super::{ContextArgs, read_input};
use anyhow::Result;
use mediator::config::{EnvConfig, MediatorConfig};
use mediator::dispatch::OffRampRouter;
use mediator::llm::{CircuitBreaker, GuardedGenerator, LlmGenerator, ProviderFactory};
use mediator::turn::resolve_turn;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

/// Build the router from configuration, or a static-only router when offline
fn build_router(env: &EnvConfig, offline: bool) -> OffRampRouter {
    let file = MediatorConfig::load();
    let settings = file.dispatch.clone();

    if offline {
        info!("Offline mode, off-ramps use static replies");
        return OffRampRouter::offline(settings);
    }

    let factory = ProviderFactory::from_config(env, &file);
    let Some(client) = factory.default_client() else {
        info!("No LLM provider available, off-ramps use static replies");
        return OffRampRouter::offline(settings);
    };

    let generator = LlmGenerator::new(client);
    let provider = generator.provider();
    let timeout_secs = env.effective_timeout_secs(settings.timeout_secs);
    let policy = settings.breaker_policy();
    info!(
        provider = %provider,
        timeout_secs,
        breaker_threshold = policy.failure_threshold,
        breaker_cooldown_secs = policy.cooldown.as_secs(),
        "Off-ramp generation enabled"
    );

    let generator = GuardedGenerator::new(
        Arc::new(generator),
        provider,
        CircuitBreaker::with_policy(policy),
        Duration::from_secs(timeout_secs),
    );
    OffRampRouter::new(Arc::new(generator), settings)
}

/// Resolve one off-ramp signal and print the reply text
pub async fn run_dispatch(env: &EnvConfig, signal: String, context: ContextArgs) -> Result<()> {
    let router = build_router(env, context.offline);
    let ctx = context.into_context()?;
    let text = router.dispatch(&signal, &ctx).await;
    println!("{}", text);
    Ok(())
}

/// Parse raw output, resolve any off-ramp, and print the TurnOutcome JSON
pub async fn run_turn(env: &EnvConfig, file: Option<PathBuf>, context: ContextArgs) -> Result<()> {
    let raw = read_input(file.as_deref())?;
    let router = build_router(env, context.offline);
    let ctx = context.into_context()?;
    let outcome = resolve_turn(&raw, &ctx, &router).await;
    println!("{}", serde_json::to_string_pretty(&outcome)?);
    Ok(())
}
