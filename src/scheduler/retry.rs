//! Deferred retry tasks
//!
//! Each retry is a spawned task that sleeps for the retry delay and then
//! runs its check. Tasks are tracked by id until they finish so they can
//! be listed or aborted.

use std::collections::HashMap;
use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use tokio::task::AbortHandle;

#[derive(Debug)]
struct PendingRetry {
    target: String,
    handle: AbortHandle,
}

type PendingMap = HashMap<u64, PendingRetry>;

/// Registry of pending out-of-band retries
#[derive(Debug, Default)]
pub struct RetryRegistry {
    next_id: AtomicU64,
    pending: Arc<Mutex<PendingMap>>,
}

impl RetryRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Run `work` for `target` after `delay`, returning the retry id
    ///
    /// Must be called from within a tokio runtime.
    pub fn schedule<F>(&self, target: &str, delay: Duration, work: F) -> u64
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let pending = Arc::clone(&self.pending);

        // Holding the lock across the spawn keeps the task from finishing
        // and removing itself before it has been registered.
        let mut map = lock(&self.pending);
        let handle = tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            work.await;
            lock(&pending).remove(&id);
        })
        .abort_handle();

        map.insert(
            id,
            PendingRetry {
                target: target.to_string(),
                handle,
            },
        );

        tracing::debug!(retry_id = id, target_url = %target, delay_secs = delay.as_secs(), "Retry scheduled");
        id
    }

    /// Abort one retry; returns whether it was still pending
    pub fn cancel(&self, id: u64) -> bool {
        match lock(&self.pending).remove(&id) {
            Some(retry) => {
                retry.handle.abort();
                true
            }
            None => false,
        }
    }

    /// Abort every pending retry and return how many there were
    pub fn cancel_all(&self) -> usize {
        let drained: Vec<PendingRetry> = lock(&self.pending).drain().map(|(_, r)| r).collect();
        for retry in &drained {
            retry.handle.abort();
        }
        drained.len()
    }

    /// Number of retries not yet finished
    pub fn pending(&self) -> usize {
        lock(&self.pending).len()
    }

    /// Number of unfinished retries for one target
    pub fn pending_for(&self, target: &str) -> usize {
        lock(&self.pending)
            .values()
            .filter(|retry| retry.target == target)
            .count()
    }
}

fn lock(pending: &Mutex<PendingMap>) -> MutexGuard<'_, PendingMap> {
    pending.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}
