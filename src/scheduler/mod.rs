//! Round scheduling and out-of-band retries
//!
//! # Overview
//!
//! The scheduler owns the [`StateTable`] and drives the [`MonitorLoop`]:
//!
//! - **Rounds**: on every tick of a fixed interval one round is dispatched
//!   as its own task. A round starts a check for every target at once and
//!   waits for all of them. Dispatches stay `check_interval` apart no
//!   matter how long checks take, so slow rounds may overlap.
//! - **Retries**: a failure below the retry ceiling schedules one deferred
//!   check of that target in the [`RetryRegistry`], independent of rounds.
//!
//! ```text
//!   tick ──▶ round ──┬──▶ check(target A) ──▶ RetrySoon ──▶ RetryRegistry
//!                    ├──▶ check(target B)                       │
//!                    └──▶ check(target C)        ◀── retry_delay ┘
//! ```
//!
//! Nothing here ends the process; [`Scheduler::run_until`] returns only
//! when its shutdown future resolves.

pub mod retry;

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use futures::future::{join_all, BoxFuture, FutureExt};
use tokio::time::{Instant, MissedTickBehavior};

pub use retry::RetryRegistry;

use crate::config::Config;
use crate::crawler::PageSource;
use crate::monitor::{CheckOutcome, MonitorLoop, StateTable, TargetSlot, Trigger};
use crate::notifications::Channel;

/// Tally of one round's outcomes
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RoundSummary {
    pub available: usize,
    pub full: usize,
    pub failed: usize,
    pub skipped: usize,
}

impl RoundSummary {
    fn record(&mut self, outcome: &CheckOutcome) {
        match outcome {
            CheckOutcome::Available(_) => self.available += 1,
            CheckOutcome::Full(_) => self.full += 1,
            CheckOutcome::Failed { .. } => self.failed += 1,
            CheckOutcome::Skipped => self.skipped += 1,
        }
    }

    pub fn total(&self) -> usize {
        self.available + self.full + self.failed + self.skipped
    }
}

struct SchedulerInner {
    monitor: MonitorLoop,
    states: StateTable,
    retries: RetryRegistry,
    check_interval: Duration,
    retry_delay: Duration,
}

/// Drives periodic rounds and deferred retries over a fixed target set
#[derive(Clone)]
pub struct Scheduler {
    inner: Arc<SchedulerInner>,
}

impl Scheduler {
    pub fn new(
        monitor: MonitorLoop,
        states: StateTable,
        check_interval: Duration,
        retry_delay: Duration,
    ) -> Self {
        Self {
            inner: Arc::new(SchedulerInner {
                monitor,
                states,
                retries: RetryRegistry::new(),
                check_interval,
                retry_delay,
            }),
        }
    }

    /// Build a scheduler for the configured targets
    pub fn from_config(
        config: &Config,
        source: Arc<dyn PageSource>,
        channel: Arc<dyn Channel>,
    ) -> Self {
        let monitor = MonitorLoop::new(source, channel, config.monitor.max_retries)
            .with_exclusive_checks(config.monitor.exclusive_checks);

        Self::new(
            monitor,
            StateTable::new(config.monitor.targets.iter().cloned()),
            config.check_interval(),
            config.retry_delay(),
        )
    }

    pub fn states(&self) -> &StateTable {
        &self.inner.states
    }

    pub fn retries(&self) -> &RetryRegistry {
        &self.inner.retries
    }

    pub fn check_interval(&self) -> Duration {
        self.inner.check_interval
    }

    /// Check every target concurrently and wait for all of them
    pub async fn run_round(&self) -> RoundSummary {
        let checks = self
            .inner
            .states
            .slots()
            .map(|slot| check_target(Arc::clone(&self.inner), Arc::clone(slot), Trigger::Round));

        let mut summary = RoundSummary::default();
        for outcome in join_all(checks).await {
            summary.record(&outcome);
        }
        summary
    }

    /// Dispatch rounds every `check_interval` until `shutdown` resolves
    ///
    /// The first round is dispatched immediately. On shutdown every pending
    /// retry is cancelled; rounds already in flight are left to finish.
    pub async fn run_until<F>(&self, shutdown: F)
    where
        F: Future<Output = ()>,
    {
        let mut ticker = tokio::time::interval(self.inner.check_interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        tokio::pin!(shutdown);

        let mut round: u64 = 0;
        loop {
            tokio::select! {
                _ = &mut shutdown => break,
                _ = ticker.tick() => {
                    round += 1;
                    let scheduler = self.clone();
                    tokio::spawn(async move { scheduler.dispatch_round(round).await });
                }
            }
        }

        let cancelled = self.inner.retries.cancel_all();
        tracing::info!(rounds = round, cancelled_retries = cancelled, "Scheduler stopped");
    }

    /// Run until the process is terminated
    pub async fn run(&self) {
        self.run_until(std::future::pending::<()>()).await;
    }

    async fn dispatch_round(&self, round: u64) {
        let started = Instant::now();
        tracing::debug!(round, targets = self.inner.states.len(), "Starting check round");

        let summary = self.run_round().await;

        let elapsed = started.elapsed();
        tracing::info!(
            round,
            available = summary.available,
            full = summary.full,
            failed = summary.failed,
            skipped = summary.skipped,
            elapsed_ms = elapsed.as_millis() as u64,
            "Check round complete"
        );

        let until_next = self.inner.check_interval.saturating_sub(elapsed);
        tracing::info!("Next check scheduled in {} seconds", until_next.as_secs());
    }
}

/// Check one target, scheduling a deferred retry when the outcome asks for one
///
/// Boxed because a retry re-enters this function from a spawned task.
fn check_target(
    inner: Arc<SchedulerInner>,
    slot: Arc<TargetSlot>,
    trigger: Trigger,
) -> BoxFuture<'static, CheckOutcome> {
    async move {
        let outcome = inner.monitor.check(&slot, trigger).await;
        if outcome.wants_retry() {
            schedule_retry(inner, slot);
        }
        outcome
    }
    .boxed()
}

fn schedule_retry(inner: Arc<SchedulerInner>, slot: Arc<TargetSlot>) {
    let delay = inner.retry_delay;
    let target = slot.target().to_string();
    tracing::info!(target_url = %target, "Will retry in {} seconds...", delay.as_secs());

    let task_inner = Arc::clone(&inner);
    inner.retries.schedule(&target, delay, async move {
        check_target(task_inner, slot, Trigger::Retry).await;
    });
}
