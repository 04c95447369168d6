//! Circuit breaker for upstream protection.
//!
//! # States
//! - Closed: normal operation, calls pass through
//! - Open: upstream assumed down, calls fail fast
//! - Half-Open: one trial call tests whether the upstream recovered
//!
//! # State Transitions
//! ```text
//! Closed → Open: window holds >= minimum_calls and failure ratio >= threshold
//! Open → Half-Open: first call at or after open_until
//! Half-Open → Closed: trial succeeds (window cleared)
//! Half-Open → Open: trial fails (open_until restarted)
//! ```
//!
//! # Design Decisions
//! - One breaker per protected operation, shared by `Arc`
//! - One mutex guards the state and the window, so admission and recording
//!   never interleave
//! - Outcomes are tagged with the epoch they were admitted in; results that
//!   arrive after a transition are discarded
//! - A dropped trial permit counts as a failed trial

use std::future::Future;
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use serde::Serialize;
use thiserror::Error;
use tokio::time::Instant;

use crate::config::CircuitBreakerConfig;
use crate::observability::metrics;
use crate::resilience::window::RollingWindow;

/// Returned instead of running the operation while the circuit is open.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("circuit breaker is open")]
pub struct CircuitOpenError;

/// Outcome of a call made through [`CircuitBreaker::call`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BreakerError<E> {
    #[error(transparent)]
    Open(#[from] CircuitOpenError),

    #[error("{0}")]
    Inner(E),
}

/// Public view of the breaker state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum BreakerState {
    Closed,
    Open,
    HalfOpen,
}

impl BreakerState {
    pub fn as_str(&self) -> &'static str {
        match self {
            BreakerState::Closed => "closed",
            BreakerState::Open => "open",
            BreakerState::HalfOpen => "half_open",
        }
    }
}

/// Read-only snapshot for status endpoints.
#[derive(Debug, Clone, Serialize)]
pub struct BreakerSnapshot {
    pub name: String,
    pub state: BreakerState,
    pub window_len: usize,
    pub window_failures: usize,
    pub open_remaining_ms: Option<u64>,
}

#[derive(Debug, Clone, Copy)]
enum State {
    Closed,
    Open { until: Instant },
    /// A trial call is in flight.
    HalfOpen,
}

impl State {
    fn public(&self) -> BreakerState {
        match self {
            State::Closed => BreakerState::Closed,
            State::Open { .. } => BreakerState::Open,
            State::HalfOpen => BreakerState::HalfOpen,
        }
    }
}

#[derive(Debug)]
struct Inner {
    state: State,
    window: RollingWindow,
    epoch: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PermitKind {
    Normal,
    Trial,
}

/// Fail-fast gate over a rolling outcome window.
#[derive(Debug)]
pub struct CircuitBreaker {
    name: String,
    minimum_calls: usize,
    failure_ratio: f64,
    open_duration: Duration,
    inner: Mutex<Inner>,
}

impl CircuitBreaker {
    pub fn new(name: impl Into<String>, config: &CircuitBreakerConfig) -> Self {
        Self {
            name: name.into(),
            minimum_calls: config.minimum_calls.max(1),
            failure_ratio: config.failure_ratio,
            open_duration: Duration::from_millis(config.open_duration_ms),
            inner: Mutex::new(Inner {
                state: State::Closed,
                window: RollingWindow::new(config.window_size),
                epoch: 0,
            }),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Run `operation` if the circuit admits it and record the result.
    pub async fn call<F, Fut, T, E>(&self, operation: F) -> Result<T, BreakerError<E>>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, E>>,
    {
        let permit = self.try_acquire()?;
        match operation().await {
            Ok(value) => {
                permit.record(true);
                Ok(value)
            }
            Err(e) => {
                permit.record(false);
                Err(BreakerError::Inner(e))
            }
        }
    }

    /// Ask for admission. The permit must be resolved with [`Permit::record`];
    /// dropping it unresolved records a failure.
    pub fn try_acquire(&self) -> Result<Permit<'_>, CircuitOpenError> {
        let now = Instant::now();
        let mut inner = self.lock();
        match inner.state {
            State::Closed => Ok(Permit::new(self, PermitKind::Normal, inner.epoch)),
            State::Open { until } if now >= until => {
                self.transition(&mut inner, State::HalfOpen);
                tracing::info!(breaker = %self.name, "Circuit half-open, admitting trial call");
                Ok(Permit::new(self, PermitKind::Trial, inner.epoch))
            }
            State::Open { .. } | State::HalfOpen => {
                metrics::record_breaker_rejection(&self.name);
                tracing::debug!(breaker = %self.name, state = inner.state.public().as_str(), "Call rejected");
                Err(CircuitOpenError)
            }
        }
    }

    /// Current state as seen by the next caller.
    pub fn state(&self) -> BreakerState {
        self.snapshot().state
    }

    pub fn snapshot(&self) -> BreakerSnapshot {
        let now = Instant::now();
        let inner = self.lock();
        let (state, open_remaining_ms) = match inner.state {
            // The transition itself happens on the next admission.
            State::Open { until } if now >= until => (BreakerState::HalfOpen, None),
            State::Open { until } => (
                BreakerState::Open,
                Some(until.saturating_duration_since(now).as_millis() as u64),
            ),
            other => (other.public(), None),
        };
        BreakerSnapshot {
            name: self.name.clone(),
            state,
            window_len: inner.window.len(),
            window_failures: inner.window.failures(),
            open_remaining_ms,
        }
    }

    fn on_outcome(&self, kind: PermitKind, epoch: u64, success: bool) {
        let now = Instant::now();
        let mut inner = self.lock();
        if inner.epoch != epoch {
            tracing::trace!(breaker = %self.name, "Discarding outcome from earlier epoch");
            return;
        }

        match (kind, inner.state) {
            (PermitKind::Trial, State::HalfOpen) => {
                if success {
                    inner.window.clear();
                    self.transition(&mut inner, State::Closed);
                    tracing::info!(breaker = %self.name, "Trial call succeeded, circuit closed");
                } else {
                    let until = now + self.open_duration;
                    self.transition(&mut inner, State::Open { until });
                    tracing::warn!(
                        breaker = %self.name,
                        open_ms = self.open_duration.as_millis() as u64,
                        "Trial call failed, circuit re-opened"
                    );
                }
            }
            (PermitKind::Normal, State::Closed) => {
                inner.window.record(success);
                let ratio = inner.window.failure_ratio();
                if inner.window.len() >= self.minimum_calls && ratio >= self.failure_ratio {
                    let until = now + self.open_duration;
                    tracing::warn!(
                        breaker = %self.name,
                        failures = inner.window.failures(),
                        window = inner.window.len(),
                        ratio,
                        open_ms = self.open_duration.as_millis() as u64,
                        "Failure ratio reached, circuit opened"
                    );
                    self.transition(&mut inner, State::Open { until });
                }
            }
            _ => {}
        }
    }

    fn transition(&self, inner: &mut Inner, to: State) {
        let from = inner.state.public();
        inner.state = to;
        inner.epoch = inner.epoch.wrapping_add(1);
        metrics::record_breaker_transition(&self.name, from.as_str(), to.public().as_str());
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Admission ticket for one call.
#[derive(Debug)]
pub struct Permit<'a> {
    breaker: &'a CircuitBreaker,
    kind: PermitKind,
    epoch: u64,
    resolved: bool,
}

impl<'a> Permit<'a> {
    fn new(breaker: &'a CircuitBreaker, kind: PermitKind, epoch: u64) -> Self {
        Self {
            breaker,
            kind,
            epoch,
            resolved: false,
        }
    }

    /// Whether this permit is the single half-open trial.
    pub fn is_trial(&self) -> bool {
        self.kind == PermitKind::Trial
    }

    pub fn record(mut self, success: bool) {
        self.resolved = true;
        self.breaker.on_outcome(self.kind, self.epoch, success);
    }
}

/// An abandoned trial counts as a failure so the half-open slot is freed.
/// An abandoned normal call never completed and records nothing.
impl Drop for Permit<'_> {
    fn drop(&mut self) {
        if !self.resolved && self.kind == PermitKind::Trial {
            self.breaker.on_outcome(self.kind, self.epoch, false);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::Arc;

    fn breaker() -> CircuitBreaker {
        CircuitBreaker::new("test", &CircuitBreakerConfig::default())
    }

    async fn succeed(breaker: &CircuitBreaker) -> Result<(), BreakerError<()>> {
        breaker.call(|| async { Ok::<_, ()>(()) }).await
    }

    async fn fail(breaker: &CircuitBreaker) -> Result<(), BreakerError<()>> {
        breaker.call(|| async { Err::<(), _>(()) }).await
    }

    async fn open(breaker: &CircuitBreaker) {
        for _ in 0..4 {
            let _ = fail(breaker).await;
        }
        assert_eq!(breaker.state(), BreakerState::Open);
    }

    #[tokio::test(start_paused = true)]
    async fn test_stays_closed_below_minimum_calls() {
        let breaker = breaker();
        let _ = fail(&breaker).await;
        let _ = fail(&breaker).await;
        let _ = fail(&breaker).await;
        assert_eq!(breaker.state(), BreakerState::Closed);
    }

    #[tokio::test(start_paused = true)]
    async fn test_opens_at_half_failures_and_skips_operation() {
        let breaker = breaker();
        let _ = succeed(&breaker).await;
        let _ = fail(&breaker).await;
        let _ = succeed(&breaker).await;
        let _ = fail(&breaker).await;
        assert_eq!(breaker.state(), BreakerState::Open);

        let invoked = AtomicU32::new(0);
        let result = breaker
            .call(|| async {
                invoked.fetch_add(1, Ordering::SeqCst);
                Ok::<_, ()>(())
            })
            .await;

        assert_eq!(result, Err(BreakerError::Open(CircuitOpenError)));
        assert_eq!(invoked.load(Ordering::SeqCst), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_rolling_window_forgets_old_failures() {
        let breaker = breaker();
        let _ = fail(&breaker).await;
        for _ in 0..4 {
            let _ = succeed(&breaker).await;
        }
        // Window is now [S, S, S, S]; one new failure is 1/4.
        let _ = fail(&breaker).await;
        assert_eq!(breaker.state(), BreakerState::Closed);
        // [S, S, F, F] reaches the threshold.
        let _ = fail(&breaker).await;
        assert_eq!(breaker.state(), BreakerState::Open);
    }

    #[tokio::test(start_paused = true)]
    async fn test_rejects_until_open_duration_elapses() {
        let breaker = breaker();
        open(&breaker).await;

        tokio::time::advance(Duration::from_millis(1_999)).await;
        assert!(breaker.try_acquire().is_err());

        tokio::time::advance(Duration::from_millis(1)).await;
        let permit = breaker.try_acquire().expect("trial admitted at open_until");
        assert!(permit.is_trial());
        permit.record(true);
    }

    #[tokio::test(start_paused = true)]
    async fn test_successful_trial_closes_and_clears_window() {
        let breaker = breaker();
        open(&breaker).await;
        tokio::time::advance(Duration::from_millis(2_000)).await;

        assert_eq!(succeed(&breaker).await, Ok(()));
        let snapshot = breaker.snapshot();
        assert_eq!(snapshot.state, BreakerState::Closed);
        assert_eq!(snapshot.window_len, 0);

        // A fresh window needs minimum_calls again before it can open.
        let _ = fail(&breaker).await;
        assert_eq!(breaker.state(), BreakerState::Closed);
    }

    #[tokio::test(start_paused = true)]
    async fn test_failed_trial_reopens_and_restarts_timer() {
        let breaker = breaker();
        open(&breaker).await;
        tokio::time::advance(Duration::from_millis(2_000)).await;

        let _ = fail(&breaker).await;
        assert_eq!(breaker.state(), BreakerState::Open);
        let remaining = breaker.snapshot().open_remaining_ms;
        assert_eq!(remaining, Some(2_000));

        tokio::time::advance(Duration::from_millis(1_000)).await;
        assert!(breaker.try_acquire().is_err());
        tokio::time::advance(Duration::from_millis(1_000)).await;
        assert!(breaker.try_acquire().is_ok());
    }

    #[tokio::test(start_paused = true)]
    async fn test_single_trial_slot() {
        let breaker = breaker();
        open(&breaker).await;
        tokio::time::advance(Duration::from_millis(2_000)).await;

        let trial = breaker.try_acquire().expect("first caller gets the trial");
        assert!(trial.is_trial());
        assert_eq!(breaker.try_acquire().unwrap_err(), CircuitOpenError);
        assert_eq!(breaker.state(), BreakerState::HalfOpen);

        trial.record(true);
        assert!(breaker.try_acquire().is_ok());
    }

    #[tokio::test(start_paused = true)]
    async fn test_concurrent_callers_get_one_trial() {
        let breaker = Arc::new(breaker());
        open(&breaker).await;
        tokio::time::advance(Duration::from_millis(2_000)).await;

        let invoked = Arc::new(AtomicU32::new(0));
        let mut handles = Vec::new();
        for _ in 0..8 {
            let breaker = breaker.clone();
            let invoked = invoked.clone();
            handles.push(tokio::spawn(async move {
                breaker
                    .call(|| async move {
                        invoked.fetch_add(1, Ordering::SeqCst);
                        tokio::time::sleep(Duration::from_millis(50)).await;
                        Ok::<_, ()>(())
                    })
                    .await
            }));
        }

        let mut admitted = 0;
        for handle in handles {
            if handle.await.unwrap().is_ok() {
                admitted += 1;
            }
        }
        assert_eq!(admitted, 1);
        assert_eq!(invoked.load(Ordering::SeqCst), 1);
        assert_eq!(breaker.state(), BreakerState::Closed);
    }

    #[tokio::test(start_paused = true)]
    async fn test_dropped_trial_counts_as_failure() {
        let breaker = breaker();
        open(&breaker).await;
        tokio::time::advance(Duration::from_millis(2_000)).await;

        drop(breaker.try_acquire().unwrap());
        assert_eq!(breaker.state(), BreakerState::Open);
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancelled_calls_do_not_count() {
        let breaker = breaker();
        let _ = succeed(&breaker).await;
        let _ = succeed(&breaker).await;

        for _ in 0..2 {
            let pending = breaker.call(|| async {
                tokio::time::sleep(Duration::from_secs(60)).await;
                Ok::<_, ()>(())
            });
            assert!(tokio::time::timeout(Duration::from_millis(10), pending)
                .await
                .is_err());
        }

        assert_eq!(breaker.state(), BreakerState::Closed);
        let snapshot = breaker.snapshot();
        assert_eq!(snapshot.window_len, 2);
        assert_eq!(snapshot.window_failures, 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_stale_outcome_is_discarded() {
        let breaker = breaker();
        let slow = breaker.try_acquire().unwrap();
        open(&breaker).await;
        tokio::time::advance(Duration::from_millis(2_000)).await;
        let _ = succeed(&breaker).await;
        assert_eq!(breaker.state(), BreakerState::Closed);

        // Admitted before the circuit opened; must not land in the new window.
        slow.record(false);
        assert_eq!(breaker.snapshot().window_len, 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_snapshot_reports_half_open_after_expiry() {
        let breaker = breaker();
        open(&breaker).await;
        assert_eq!(breaker.snapshot().open_remaining_ms, Some(2_000));

        tokio::time::advance(Duration::from_millis(2_500)).await;
        assert_eq!(breaker.state(), BreakerState::HalfOpen);
    }
}
