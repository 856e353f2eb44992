//! Per-target state records
//!
//! Every configured target owns one [`TargetSlot`] for the whole process
//! lifetime. The slot's [`TargetState`] sits behind a mutex that is only
//! held for the duration of a single update, never across an await, so
//! each check completion applies its update atomically and the last
//! completion wins when checks of the same target overlap.

use chrono::{DateTime, Utc};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

/// Mutable record for one target
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TargetState {
    /// Failed checks since the last successful one
    pub consecutive_errors: u32,

    /// When the first failure of the current streak was recorded
    pub streak_started_at: Option<DateTime<Utc>>,

    /// Error text of the most recent failed check in the current streak
    pub last_error: Option<String>,
}

/// A failure streak closed by a successful check
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EndedStreak {
    pub failures: u32,
    pub last_error: Option<String>,
    pub started_at: DateTime<Utc>,
}

impl EndedStreak {
    /// Time from the first failure until now
    pub fn duration(&self) -> chrono::Duration {
        Utc::now() - self.started_at
    }
}

impl TargetState {
    /// Record a successful check; returns the streak it ended, if any
    pub fn record_success(&mut self) -> Option<EndedStreak> {
        let failures = std::mem::take(&mut self.consecutive_errors);
        let last_error = self.last_error.take();
        let started_at = self.streak_started_at.take()?;
        (failures > 0).then_some(EndedStreak {
            failures,
            last_error,
            started_at,
        })
    }

    /// Record a failed check and return the updated streak length
    pub fn record_failure(&mut self, error: impl Into<String>) -> u32 {
        if self.consecutive_errors == 0 {
            self.streak_started_at = Some(Utc::now());
        }
        self.consecutive_errors = self.consecutive_errors.saturating_add(1);
        self.last_error = Some(error.into());
        self.consecutive_errors
    }
}

/// A target locator with its state and in-flight flag
#[derive(Debug)]
pub struct TargetSlot {
    target: String,
    state: Mutex<TargetState>,
    in_flight: AtomicBool,
}

impl TargetSlot {
    pub fn new(target: impl Into<String>) -> Self {
        Self {
            target: target.into(),
            state: Mutex::new(TargetState::default()),
            in_flight: AtomicBool::new(false),
        }
    }

    /// The target locator
    pub fn target(&self) -> &str {
        &self.target
    }

    pub fn consecutive_errors(&self) -> u32 {
        self.lock().consecutive_errors
    }

    pub fn record_success(&self) -> Option<EndedStreak> {
        self.lock().record_success()
    }

    pub fn record_failure(&self, error: impl Into<String>) -> u32 {
        self.lock().record_failure(error)
    }

    /// Claim the single in-flight slot for this target
    ///
    /// Returns `None` while another claim is alive. The claim is released
    /// when the returned guard is dropped.
    pub fn try_begin(&self) -> Option<InFlightGuard<'_>> {
        self.in_flight
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| InFlightGuard { slot: self })
    }

    pub fn is_in_flight(&self) -> bool {
        self.in_flight.load(Ordering::Acquire)
    }

    fn lock(&self) -> MutexGuard<'_, TargetState> {
        // A panic elsewhere cannot leave the counter half-written.
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

/// Releases a target's in-flight claim on drop
#[derive(Debug)]
pub struct InFlightGuard<'a> {
    slot: &'a TargetSlot,
}

impl Drop for InFlightGuard<'_> {
    fn drop(&mut self) {
        self.slot.in_flight.store(false, Ordering::Release);
    }
}

/// The fixed set of target slots, in configuration order
#[derive(Debug, Default)]
pub struct StateTable {
    slots: Vec<Arc<TargetSlot>>,
}

impl StateTable {
    /// Create one slot per target; duplicate locators share the first slot
    pub fn new<I, S>(targets: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut slots: Vec<Arc<TargetSlot>> = Vec::new();
        for target in targets {
            let target = target.into();
            if slots.iter().all(|slot| slot.target() != target) {
                slots.push(Arc::new(TargetSlot::new(target)));
            }
        }
        Self { slots }
    }

    pub fn get(&self, target: &str) -> Option<&Arc<TargetSlot>> {
        self.slots.iter().find(|slot| slot.target() == target)
    }

    pub fn slots(&self) -> impl Iterator<Item = &Arc<TargetSlot>> {
        self.slots.iter()
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_failure_then_success_resets() {
        let mut state = TargetState::default();
        assert_eq!(state.record_failure("timeout"), 1);
        let started_at = state.streak_started_at;
        assert!(started_at.is_some());
        assert_eq!(state.record_failure("HTTP 503"), 2);
        assert_eq!(state.streak_started_at, started_at);

        let ended = state.record_success().unwrap();
        assert_eq!(ended.failures, 2);
        assert_eq!(ended.last_error.as_deref(), Some("HTTP 503"));
        assert_eq!(Some(ended.started_at), started_at);
        assert!(ended.duration() >= chrono::Duration::zero());
        assert_eq!(state, TargetState::default());
    }

    #[test]
    fn test_success_without_streak_ends_nothing() {
        let mut state = TargetState::default();
        assert!(state.record_success().is_none());

        state.record_failure("timeout");
        assert!(state.record_success().is_some());
        assert!(state.record_success().is_none());
    }

    #[test]
    fn test_in_flight_guard_is_exclusive() {
        let slot = TargetSlot::new("https://example.com/join/a");
        let guard = slot.try_begin();
        assert!(guard.is_some());
        assert!(slot.is_in_flight());
        assert!(slot.try_begin().is_none());

        drop(guard);
        assert!(!slot.is_in_flight());
        assert!(slot.try_begin().is_some());
    }

    #[test]
    fn test_state_table_keeps_order_and_collapses_duplicates() {
        let table = StateTable::new(["https://a.example", "https://b.example", "https://a.example"]);
        assert_eq!(table.len(), 2);
        let order: Vec<&str> = table.slots().map(|s| s.target()).collect();
        assert_eq!(order, vec!["https://a.example", "https://b.example"]);
    }

    #[test]
    fn test_slots_are_independent() {
        let table = StateTable::new(["https://a.example", "https://b.example"]);
        table.get("https://a.example").unwrap().record_failure("boom");

        assert_eq!(table.get("https://a.example").unwrap().consecutive_errors(), 1);
        assert_eq!(table.get("https://b.example").unwrap().consecutive_errors(), 0);
        assert!(table.get("https://c.example").is_none());
    }
}
