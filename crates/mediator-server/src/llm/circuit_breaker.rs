// crates/mediator-server/src/llm/circuit_breaker.rs
// Per-provider circuit breaker in front of off-ramp generation

use crate::llm::provider::Provider;
use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::{Duration, Instant};
use tracing::{info, warn};

const DEFAULT_FAILURE_THRESHOLD: u32 = 3;
const DEFAULT_FAILURE_WINDOW: Duration = Duration::from_secs(5 * 60);
const DEFAULT_COOLDOWN: Duration = Duration::from_secs(60);

/// When a provider is taken out of rotation and for how long
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BreakerPolicy {
    /// Failures inside `failure_window` that open the circuit
    pub failure_threshold: u32,
    pub failure_window: Duration,
    /// Time an open circuit rejects calls before one trial call is let through
    pub cooldown: Duration,
}

impl Default for BreakerPolicy {
    fn default() -> Self {
        Self {
            failure_threshold: DEFAULT_FAILURE_THRESHOLD,
            failure_window: DEFAULT_FAILURE_WINDOW,
            cooldown: DEFAULT_COOLDOWN,
        }
    }
}

/// Decision for one generation attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Admission {
    /// Circuit closed
    Allowed,
    /// Cooldown elapsed; this caller's result decides whether the circuit closes
    Trial,
    /// Circuit open. `retry_in` is zero while another trial call is in flight.
    Rejected { retry_in: Duration },
}

#[derive(Debug, Default)]
struct Health {
    recent_failures: VecDeque<Instant>,
    opened_at: Option<Instant>,
    trial_in_flight: bool,
}

/// Shared, cloneable breaker. Clones observe the same provider health.
#[derive(Debug, Clone, Default)]
pub struct CircuitBreaker {
    policy: BreakerPolicy,
    health: Arc<Mutex<HashMap<Provider, Health>>>,
}

impl CircuitBreaker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_policy(policy: BreakerPolicy) -> Self {
        Self {
            policy,
            health: Arc::default(),
        }
    }

    // A panic while holding the lock leaves the map consistent, so recover it
    fn lock(&self) -> MutexGuard<'_, HashMap<Provider, Health>> {
        self.health.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Decide whether a call to `provider` may go out now
    pub fn admit(&self, provider: Provider) -> Admission {
        let mut health = self.lock();
        let entry = health.entry(provider).or_default();

        let Some(opened_at) = entry.opened_at else {
            return Admission::Allowed;
        };

        let elapsed = opened_at.elapsed();
        if elapsed < self.policy.cooldown {
            return Admission::Rejected {
                retry_in: self.policy.cooldown - elapsed,
            };
        }
        if entry.trial_in_flight {
            return Admission::Rejected {
                retry_in: Duration::ZERO,
            };
        }

        entry.trial_in_flight = true;
        Admission::Trial
    }

    /// Close the circuit and forget earlier failures
    pub fn record_success(&self, provider: Provider) {
        let mut health = self.lock();
        let entry = health.entry(provider).or_default();
        if entry.opened_at.is_some() {
            info!(provider = %provider, "Provider recovered, circuit closed");
        }
        *entry = Health::default();
    }

    /// Count a failure; may open (or re-open) the circuit
    pub fn record_failure(&self, provider: Provider) {
        let mut health = self.lock();
        let entry = health.entry(provider).or_default();
        let now = Instant::now();

        if entry.trial_in_flight {
            warn!(provider = %provider, "Trial call failed, circuit stays open");
            entry.trial_in_flight = false;
            entry.opened_at = Some(now);
            return;
        }
        if entry.opened_at.is_some() {
            // Late result from a call admitted before the circuit opened
            return;
        }

        entry.recent_failures.push_back(now);
        while entry
            .recent_failures
            .front()
            .is_some_and(|t| now.duration_since(*t) >= self.policy.failure_window)
        {
            entry.recent_failures.pop_front();
        }

        if entry.recent_failures.len() as u32 >= self.policy.failure_threshold {
            warn!(
                provider = %provider,
                failures = entry.recent_failures.len(),
                cooldown_secs = self.policy.cooldown.as_secs(),
                "Circuit opened, generation for this provider is paused"
            );
            entry.recent_failures.clear();
            entry.opened_at = Some(now);
        }
    }
}
