//! Per-target monitoring state machine
//!
//! One check moves a target through
//! `Idle → Checking → {NotifyAvailable | NotifyNothing | Failed} → (RetrySoon | Idle)`.
//!
//! - A successful check resets the failure streak. Open slots are announced
//!   on every check that sees them; there is no deduplication across checks.
//! - A failed check extends the streak. Below the ceiling the caller should
//!   retry out of band; at the ceiling one escalation warning goes out;
//!   past it the target simply waits for the next regular round.
//!
//! Notification failures are logged and swallowed here, so nothing a
//! channel does can stop a target from being monitored.

pub mod state;
#[cfg(test)]
pub(crate) mod test_support;

use std::fmt;
use std::sync::Arc;

pub use state::{EndedStreak, StateTable, TargetSlot, TargetState};

use crate::crawler::PageSource;
use crate::error::SlotwatchErrorTrait;
use crate::notifications::{availability_message, escalation_message, Channel};
use crate::parser::{AvailabilityClassifier, AvailabilityResult};
use crate::utils::error::CheckError;

/// What a failed check leads to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureAction {
    /// Streak below the ceiling: check again after the retry delay
    RetrySoon,
    /// Streak just reached the ceiling: send the one escalation warning
    Escalate,
    /// Streak past the ceiling: wait for the regular round
    Wait,
}

/// Decide the follow-up for a failure streak of `consecutive_errors`
///
/// Escalation fires on equality only, so exactly once per unbroken streak.
pub fn failure_action(consecutive_errors: u32, max_retries: u32) -> FailureAction {
    match consecutive_errors.cmp(&max_retries) {
        std::cmp::Ordering::Less => FailureAction::RetrySoon,
        std::cmp::Ordering::Equal => FailureAction::Escalate,
        std::cmp::Ordering::Greater => FailureAction::Wait,
    }
}

/// What started a check
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Trigger {
    /// Part of a scheduled round
    Round,
    /// Deferred retry after a failure
    Retry,
}

impl fmt::Display for Trigger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Round => write!(f, "round"),
            Self::Retry => write!(f, "retry"),
        }
    }
}

/// Result of one check
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CheckOutcome {
    /// Slots are open; the availability notice was attempted
    Available(AvailabilityResult),
    /// The beta is full
    Full(AvailabilityResult),
    /// Fetch or classification failed
    Failed {
        /// Streak length after this failure
        attempt: u32,
        action: FailureAction,
    },
    /// Another check of the same target was still running
    Skipped,
}

impl CheckOutcome {
    /// Whether the caller should schedule an out-of-band retry
    pub fn wants_retry(&self) -> bool {
        matches!(
            self,
            Self::Failed {
                action: FailureAction::RetrySoon,
                ..
            }
        )
    }
}

/// Runs single checks against targets
pub struct MonitorLoop {
    source: Arc<dyn PageSource>,
    channel: Arc<dyn Channel>,
    classifier: AvailabilityClassifier,
    max_retries: u32,
    exclusive_checks: bool,
}

impl MonitorLoop {
    pub fn new(source: Arc<dyn PageSource>, channel: Arc<dyn Channel>, max_retries: u32) -> Self {
        Self {
            source,
            channel,
            classifier: AvailabilityClassifier::new(),
            max_retries,
            exclusive_checks: false,
        }
    }

    /// Skip a check while another check of the same target is running
    #[must_use]
    pub fn with_exclusive_checks(mut self, exclusive: bool) -> Self {
        self.exclusive_checks = exclusive;
        self
    }

    /// Check one target and apply the outcome to its state
    pub async fn check(&self, slot: &TargetSlot, trigger: Trigger) -> CheckOutcome {
        let _claim = if self.exclusive_checks {
            match slot.try_begin() {
                Some(claim) => Some(claim),
                None => {
                    tracing::debug!(
                        target_url = %slot.target(),
                        trigger = %trigger,
                        "Check already in flight, skipping"
                    );
                    return CheckOutcome::Skipped;
                }
            }
        } else {
            None
        };

        let url = slot.target();
        tracing::info!(target_url = %url, trigger = %trigger, "Checking TestFlight availability");

        match self.fetch_and_classify(url).await {
            Ok(result) => {
                if let Some(streak) = slot.record_success() {
                    tracing::info!(
                        target_url = %url,
                        failures = streak.failures,
                        last_error = streak.last_error.as_deref().unwrap_or_default(),
                        streak_secs = streak.duration().num_seconds(),
                        "Recovered after {} failed checks",
                        streak.failures
                    );
                }
                if result.is_available {
                    tracing::info!(
                        target_url = %url,
                        app = %result.display_name,
                        "✅ TestFlight is AVAILABLE for {}",
                        result.display_name
                    );
                    self.announce_availability(url, &result).await;
                    CheckOutcome::Available(result)
                } else {
                    tracing::info!(
                        target_url = %url,
                        app = %result.display_name,
                        "❌ TestFlight is FULL for {}",
                        result.display_name
                    );
                    CheckOutcome::Full(result)
                }
            }
            Err(error) => self.handle_failure(slot, error).await,
        }
    }

    async fn fetch_and_classify(&self, url: &str) -> Result<AvailabilityResult, CheckError> {
        let html = self.source.fetch_page(url).await?;
        Ok(self.classifier.classify(&html)?)
    }

    async fn announce_availability(&self, url: &str, result: &AvailabilityResult) {
        let text = availability_message(&result.display_name, url);
        match self.channel.send(&text).await {
            Ok(()) => tracing::info!(
                target_url = %url,
                channel = self.channel.name(),
                "Availability notification sent for {}",
                result.display_name
            ),
            Err(e) => tracing::error!(
                target_url = %url,
                channel = self.channel.name(),
                category = %e.category(),
                error = %e,
                "Failed to send availability notification"
            ),
        }
    }

    async fn handle_failure(&self, slot: &TargetSlot, error: CheckError) -> CheckOutcome {
        let url = slot.target();
        let attempt = slot.record_failure(error.to_string());
        let action = failure_action(attempt, self.max_retries);

        match action {
            FailureAction::RetrySoon => tracing::warn!(
                target_url = %url,
                attempt,
                max_retries = self.max_retries,
                category = %error.category(),
                error = %error,
                "Error checking TestFlight"
            ),
            FailureAction::Escalate | FailureAction::Wait => tracing::error!(
                target_url = %url,
                attempt,
                max_retries = self.max_retries,
                category = %error.category(),
                error = %error,
                "Error checking TestFlight"
            ),
        }

        if action == FailureAction::Escalate {
            let text = escalation_message(url, &error.to_string());
            match self.channel.send(&text).await {
                Ok(()) => tracing::info!(target_url = %url, "Error notification sent"),
                Err(e) => tracing::error!(
                    target_url = %url,
                    category = %e.category(),
                    error = %e,
                    "Failed to send error notification"
                ),
            }
        }

        CheckOutcome::Failed { attempt, action }
    }
}
