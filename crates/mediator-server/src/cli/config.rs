// crates/mediator-server/src/cli/config.rs

use anyhow::{Result, bail};
use mediator::config::{EnvConfig, MediatorConfig};
use mediator::llm::ProviderFactory;

/// Print the effective configuration and its validation report
pub fn run_config(env: &EnvConfig) -> Result<()> {
    let path = MediatorConfig::config_path();
    let file = MediatorConfig::load_from(&path);
    let factory = ProviderFactory::from_config(env, &file);

    println!("Config file:      {}", path.display());
    println!("Providers:        {}", env.api_keys.summary());
    let order: Vec<String> = factory
        .available_providers()
        .iter()
        .map(|p| p.to_string())
        .collect();
    if !order.is_empty() {
        println!("Fallback order:   {}", order.join(" -> "));
    }
    match factory.default_client() {
        Some(client) => println!(
            "Off-ramp model:   {} ({})",
            client.model_name(),
            client.provider_type()
        ),
        None => println!("Off-ramp model:   none (static replies)"),
    }
    println!("History window:   {} turns", file.dispatch.history_window);
    println!("Output budget:    {} tokens", file.dispatch.max_output_tokens);
    println!(
        "Timeout:          {}s",
        env.effective_timeout_secs(file.dispatch.timeout_secs)
    );
    println!(
        "Circuit breaker:  pause after {} failures for {}s",
        file.dispatch.breaker_policy().failure_threshold,
        file.dispatch.breaker_cooldown_secs
    );
    println!();

    let validation = env.validate();
    println!("{}", validation.report());
    if !validation.is_valid() {
        bail!("configuration has errors");
    }
    Ok(())
}
