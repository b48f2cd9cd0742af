//! Delayed completions
//!
//! After a delay, re-resolves a pipeline by id, applies the result fields
//! and appends the completion log. Each scheduled completion runs in its
//! own task and fires at most once.
//!
//! A pipeline deleted before its completion fires is not an error: the
//! completion finds nothing to update and is dropped silently. The same
//! holds for a pipeline that is no longer running (stopped meanwhile).

use conduit_core::domain::pipeline::PipelineStatus;
use conduit_core::dto::log::NewLogEntry;
use conduit_core::dto::pipeline::PipelineUpdate;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;
use tokio::task::AbortHandle;
use tokio::time;
use tracing::{debug, info};
use uuid::Uuid;

use crate::notify::{Notification, Notifier};
use crate::store::Store;

/// What happens to a pipeline when its completion fires
#[derive(Debug, Clone)]
pub struct Completion {
    pub update: PipelineUpdate,
    pub log: NewLogEntry,
    pub notification: Option<Notification>,
}

impl Completion {
    pub fn new(update: PipelineUpdate, log: NewLogEntry) -> Self {
        Self {
            update,
            log,
            notification: None,
        }
    }

    pub fn with_notification(mut self, notification: Notification) -> Self {
        self.notification = Some(notification);
        self
    }
}

type PendingMap = Arc<Mutex<HashMap<Uuid, PendingCompletion>>>;

struct PendingCompletion {
    pipeline_id: u64,
    abort: AbortHandle,
}

/// Schedules delayed pipeline completions
///
/// Cloning is cheap; clones share the same pending set.
#[derive(Clone)]
pub struct CompletionScheduler {
    store: Arc<Store>,
    notifier: Arc<dyn Notifier>,
    pending: PendingMap,
}

impl CompletionScheduler {
    pub fn new(store: Arc<Store>, notifier: Arc<dyn Notifier>) -> Self {
        Self {
            store,
            notifier,
            pending: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    /// Schedules `completion` for `pipeline_id` after `delay`
    ///
    /// Must be called from within a tokio runtime.
    pub fn schedule(
        &self,
        pipeline_id: u64,
        delay: Duration,
        completion: Completion,
    ) -> CompletionHandle {
        let id = Uuid::new_v4();
        let store = Arc::clone(&self.store);
        let notifier = Arc::clone(&self.notifier);
        let task_pending = Arc::clone(&self.pending);

        // Held across spawn so the task cannot claim its entry before it exists
        let mut pending = lock(&self.pending);

        let task = tokio::spawn(async move {
            time::sleep(delay).await;

            // Whoever removes the entry owns it: either this task or a cancel
            if lock(&task_pending).remove(&id).is_none() {
                return;
            }

            fire(&store, notifier.as_ref(), pipeline_id, completion);
        });

        let abort = task.abort_handle();
        pending.insert(
            id,
            PendingCompletion {
                pipeline_id,
                abort: abort.clone(),
            },
        );

        debug!(
            "Scheduled completion {} for pipeline {} in {:?}",
            id, pipeline_id, delay
        );

        CompletionHandle {
            id,
            pipeline_id,
            abort,
            pending: Arc::clone(&self.pending),
        }
    }

    /// Cancels every pending completion targeting `pipeline_id`
    ///
    /// Returns the number of completions cancelled.
    pub fn cancel_for_pipeline(&self, pipeline_id: u64) -> usize {
        let mut pending = lock(&self.pending);
        let ids: Vec<Uuid> = pending
            .iter()
            .filter(|(_, p)| p.pipeline_id == pipeline_id)
            .map(|(id, _)| *id)
            .collect();

        for id in &ids {
            if let Some(entry) = pending.remove(id) {
                entry.abort.abort();
                debug!("Cancelled completion {} for pipeline {}", id, pipeline_id);
            }
        }

        ids.len()
    }

    /// Number of completions that have not fired or been cancelled yet
    pub fn pending_count(&self) -> usize {
        lock(&self.pending).len()
    }

    /// Waits until every pending completion has fired or been cancelled
    pub async fn wait_idle(&self) {
        let mut ticker = time::interval(Duration::from_millis(20));
        while self.pending_count() > 0 {
            ticker.tick().await;
        }
    }
}

fn fire(store: &Store, notifier: &dyn Notifier, pipeline_id: u64, completion: Completion) {
    let pipeline = match store.update_pipeline_in_status(
        pipeline_id,
        PipelineStatus::Running,
        &completion.update,
    ) {
        Some(Ok(pipeline)) => pipeline,
        Some(Err(current)) => {
            debug!(
                "Pipeline {} is {} now, dropping its completion",
                pipeline_id, current
            );
            return;
        }
        None => {
            debug!(
                "Pipeline {} no longer exists, dropping its completion",
                pipeline_id
            );
            return;
        }
    };

    store.add_log(completion.log);

    info!(
        "Pipeline {} ({}) completed with status {}",
        pipeline.name, pipeline.id, pipeline.status
    );

    if let Some(notification) = completion.notification {
        notifier.notify(notification);
    }
}

/// Handle to one scheduled completion
#[derive(Clone)]
pub struct CompletionHandle {
    id: Uuid,
    pipeline_id: u64,
    abort: AbortHandle,
    pending: PendingMap,
}

impl CompletionHandle {
    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn pipeline_id(&self) -> u64 {
        self.pipeline_id
    }

    /// True until the completion fires or is cancelled
    pub fn is_pending(&self) -> bool {
        lock(&self.pending).contains_key(&self.id)
    }

    /// Prevents the completion from firing
    ///
    /// Returns false if it already fired or was already cancelled.
    pub fn cancel(&self) -> bool {
        if lock(&self.pending).remove(&self.id).is_none() {
            return false;
        }
        self.abort.abort();
        debug!(
            "Cancelled completion {} for pipeline {}",
            self.id, self.pipeline_id
        );
        true
    }
}

impl std::fmt::Debug for CompletionHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CompletionHandle")
            .field("id", &self.id)
            .field("pipeline_id", &self.pipeline_id)
            .finish()
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}
