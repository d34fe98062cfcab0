//! Consecutive-failure circuit breaker.
//!
//! ```text
//!            failures >= threshold
//!   Closed ─────────────────────────▶ Open
//!     ▲                                │ reset_timeout elapsed
//!     │ trial succeeds                 ▼
//!     └──────────────────────────── HalfOpen ──▶ Open (trial fails)
//! ```
//!
//! While half-open exactly one trial call is admitted; concurrent callers are
//! rejected as if the circuit were still open until the trial settles. A trial
//! whose future is dropped before completing counts as a failed trial.

use std::future::Future;
use std::sync::{Mutex, MutexGuard};
use std::time::Duration;

use metrics::{counter, gauge};
use tokio::time::Instant;
use tracing::{info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CircuitState {
    Closed,
    Open,
    HalfOpen,
}

impl CircuitState {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Closed => "closed",
            Self::Open => "open",
            Self::HalfOpen => "half_open",
        }
    }

    fn gauge_value(&self) -> f64 {
        match self {
            Self::Closed => 0.0,
            Self::HalfOpen => 1.0,
            Self::Open => 2.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CircuitBreakerConfig {
    /// Consecutive failures that open the circuit.
    pub failure_threshold: u32,
    /// How long the circuit stays open before a trial call is allowed.
    pub reset_timeout: Duration,
}

impl Default for CircuitBreakerConfig {
    fn default() -> Self {
        Self {
            failure_threshold: 5,
            reset_timeout: Duration::from_secs(60),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum BreakerError<E> {
    #[error("circuit breaker is open")]
    Open,
    #[error("{0}")]
    Inner(E),
}

#[derive(Debug)]
struct Inner {
    state: CircuitState,
    consecutive_failures: u32,
    opened_at: Option<Instant>,
    trial_in_flight: bool,
}

#[derive(Debug)]
pub struct CircuitBreaker {
    name: &'static str,
    config: CircuitBreakerConfig,
    inner: Mutex<Inner>,
}

impl CircuitBreaker {
    pub fn new(name: &'static str, config: CircuitBreakerConfig) -> Self {
        gauge!("circuit_breaker_state", "breaker" => name).set(CircuitState::Closed.gauge_value());
        Self {
            name,
            config: CircuitBreakerConfig {
                failure_threshold: config.failure_threshold.max(1),
                ..config
            },
            inner: Mutex::new(Inner {
                state: CircuitState::Closed,
                consecutive_failures: 0,
                opened_at: None,
                trial_in_flight: false,
            }),
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn config(&self) -> CircuitBreakerConfig {
        self.config
    }

    /// Current state. An open circuit whose cool-down has elapsed reports
    /// `HalfOpen` even before the trial call arrives.
    pub fn state(&self) -> CircuitState {
        let inner = self.lock();
        match inner.state {
            CircuitState::Open if self.cooled_down(&inner) => CircuitState::HalfOpen,
            state => state,
        }
    }

    pub fn consecutive_failures(&self) -> u32 {
        self.lock().consecutive_failures
    }

    /// Runs `f` through the breaker. Any `Err` from `f` counts as a failure.
    pub async fn call<T, E, F, Fut>(&self, f: F) -> Result<T, BreakerError<E>>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, E>>,
    {
        let attempt = self.acquire().ok_or(BreakerError::Open)?;
        let result = f().await;
        attempt.finish(result.is_ok());
        result.map_err(BreakerError::Inner)
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn cooled_down(&self, inner: &Inner) -> bool {
        inner
            .opened_at
            .is_some_and(|opened| opened.elapsed() >= self.config.reset_timeout)
    }

    fn acquire(&self) -> Option<Attempt<'_>> {
        let mut inner = self.lock();
        let trial = match inner.state {
            CircuitState::Closed => false,
            CircuitState::Open if self.cooled_down(&inner) => {
                self.transition(&mut inner, CircuitState::HalfOpen);
                inner.trial_in_flight = true;
                true
            }
            CircuitState::HalfOpen if !inner.trial_in_flight => {
                inner.trial_in_flight = true;
                true
            }
            CircuitState::Open | CircuitState::HalfOpen => {
                counter!("circuit_breaker_rejected_total", "breaker" => self.name).increment(1);
                return None;
            }
        };

        Some(Attempt {
            breaker: self,
            trial,
            settled: false,
        })
    }

    fn record(&self, trial: bool, success: bool) {
        let mut inner = self.lock();

        if trial {
            inner.trial_in_flight = false;
            if success {
                inner.consecutive_failures = 0;
                inner.opened_at = None;
                self.transition(&mut inner, CircuitState::Closed);
            } else {
                inner.opened_at = Some(Instant::now());
                self.transition(&mut inner, CircuitState::Open);
            }
            return;
        }

        // Results of calls admitted before the circuit opened do not move it.
        if inner.state != CircuitState::Closed {
            return;
        }

        if success {
            inner.consecutive_failures = 0;
        } else {
            inner.consecutive_failures += 1;
            if inner.consecutive_failures >= self.config.failure_threshold {
                inner.opened_at = Some(Instant::now());
                self.transition(&mut inner, CircuitState::Open);
            }
        }
    }

    fn transition(&self, inner: &mut Inner, to: CircuitState) {
        if inner.state == to {
            return;
        }
        let from = inner.state;
        inner.state = to;

        match to {
            CircuitState::Open => warn!(
                breaker = self.name,
                from = from.as_str(),
                failures = inner.consecutive_failures,
                "Circuit opened"
            ),
            CircuitState::HalfOpen => info!(breaker = self.name, "Circuit half-open, allowing trial call"),
            CircuitState::Closed => info!(breaker = self.name, "Circuit closed"),
        }

        counter!(
            "circuit_breaker_transitions_total",
            "breaker" => self.name,
            "to" => to.as_str()
        )
        .increment(1);
        gauge!("circuit_breaker_state", "breaker" => self.name).set(to.gauge_value());
    }
}

struct Attempt<'a> {
    breaker: &'a CircuitBreaker,
    trial: bool,
    settled: bool,
}

impl Attempt<'_> {
    fn finish(mut self, success: bool) {
        self.settled = true;
        self.breaker.record(self.trial, success);
    }
}

impl Drop for Attempt<'_> {
    fn drop(&mut self) {
        if !self.settled && self.trial {
            self.breaker.record(true, false);
        }
    }
}
