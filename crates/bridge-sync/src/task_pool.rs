//! Bounded pool for background side effects.
//!
//! Notifications, large-transfer monitoring and claim pushes never block the
//! ledger path, but they must not pile up without limit either. A semaphore
//! caps the tasks in flight (submitters wait for a permit), a task tracker
//! lets shutdown wait for them, and a cancellation token aborts them.
//! Every task returns a [`SyncResult`]; failures and panics are logged and
//! counted here.

use crate::error::{SyncError, SyncResult};
use crate::ports::MetricsSink;
use std::future::Future;
use std::sync::Arc;
use tokio::sync::Semaphore;
use tokio_util::sync::CancellationToken;
use tokio_util::task::TaskTracker;
use tracing::{debug, error, warn};

/// Bounded, cancellable, supervised task pool.
pub struct SideEffectPool {
    permits: Arc<Semaphore>,
    capacity: usize,
    tracker: TaskTracker,
    cancel: CancellationToken,
    metrics: Arc<dyn MetricsSink>,
}

impl SideEffectPool {
    /// Pool allowing `capacity` tasks in flight.
    pub fn new(capacity: usize, metrics: Arc<dyn MetricsSink>) -> Self {
        Self::with_cancel(capacity, metrics, CancellationToken::new())
    }

    /// Pool whose tasks are cancelled together with `cancel`.
    pub fn with_cancel(
        capacity: usize,
        metrics: Arc<dyn MetricsSink>,
        cancel: CancellationToken,
    ) -> Self {
        let capacity = capacity.max(1);
        Self {
            permits: Arc::new(Semaphore::new(capacity)),
            capacity,
            tracker: TaskTracker::new(),
            cancel,
            metrics,
        }
    }

    /// Submit a task, waiting for a free slot.
    ///
    /// Returns [`SyncError::Cancelled`] if the pool is shut down before a slot
    /// frees up. The task's own result never reaches the submitter.
    pub async fn submit<F>(&self, task: &'static str, fut: F) -> SyncResult<()>
    where
        F: Future<Output = SyncResult<()>> + Send + 'static,
    {
        if self.cancel.is_cancelled() {
            return Err(SyncError::Cancelled);
        }
        let permit = tokio::select! {
            biased;
            _ = self.cancel.cancelled() => return Err(SyncError::Cancelled),
            permit = self.permits.clone().acquire_owned() => {
                permit.map_err(|_| SyncError::Cancelled)?
            }
        };

        let cancel = self.cancel.clone();
        let metrics = self.metrics.clone();
        self.tracker.spawn(async move {
            let _permit = permit;
            // Inner task so a panic surfaces as a JoinError
            let mut handle = tokio::spawn(fut);
            let outcome = tokio::select! {
                _ = cancel.cancelled() => {
                    handle.abort();
                    let _ = (&mut handle).await;
                    Err(SyncError::Cancelled)
                }
                joined = &mut handle => match joined {
                    Ok(result) => result,
                    Err(e) if e.is_panic() => Err(SyncError::Panicked {
                        reason: e.to_string(),
                    }),
                    Err(_) => Err(SyncError::Cancelled),
                },
            };
            match outcome {
                Ok(()) => {}
                Err(SyncError::Cancelled) => {
                    debug!(task, "[bridge-sync] side-effect task cancelled")
                }
                Err(e @ SyncError::Panicked { .. }) => {
                    error!(task, error = %e, "[bridge-sync] side-effect task panicked");
                    metrics.record_side_effect_failure(task);
                }
                Err(e) => {
                    warn!(task, error = %e, "[bridge-sync] side-effect task failed");
                    metrics.record_side_effect_failure(task);
                }
            }
        });
        Ok(())
    }

    /// Tasks currently holding a slot.
    pub fn in_flight(&self) -> usize {
        self.capacity - self.permits.available_permits()
    }

    /// Maximum tasks in flight.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Token cancelling every task of this pool.
    pub fn cancel_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    /// Wait until every submitted task has finished. New submissions are
    /// accepted again afterwards.
    pub async fn wait_idle(&self) {
        self.tracker.close();
        self.tracker.wait().await;
        self.tracker.reopen();
    }

    /// Cancel outstanding tasks and wait for them to stop.
    pub async fn shutdown(&self) {
        self.cancel.cancel();
        self.tracker.close();
        self.tracker.wait().await;
    }
}
