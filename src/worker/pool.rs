//! Fixed-size worker pool: spec §4.5.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{instrument, warn};
use uuid::Uuid;

use crate::task_store::{Task, TaskStatus, TaskStore};

/// Dispatch target for one `task_type`. The handler owns the terminal
/// write to the task store; the pool's own defensive handling (see
/// `WorkerPool::dispatch`) only fires if the handler panics instead of
/// completing normally.
#[async_trait]
pub trait TaskHandler: Send + Sync {
    async fn handle(&self, task_id: Uuid, repository: String, input: Value);
}

/// A fixed-size pool of cooperative workers continuously draining the
/// task store. Constructed once at startup with its collaborators; `spawn`
/// starts the worker loops and returns a shutdown handle.
pub struct WorkerPool {
    task_store: Arc<dyn TaskStore>,
    handlers: HashMap<String, Arc<dyn TaskHandler>>,
    poll_interval: Duration,
}

impl std::fmt::Debug for WorkerPool {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WorkerPool")
            .field("task_types", &self.handlers.keys().collect::<Vec<_>>())
            .field("poll_interval", &self.poll_interval)
            .finish()
    }
}

impl WorkerPool {
    pub fn new(
        task_store: Arc<dyn TaskStore>,
        handlers: HashMap<String, Arc<dyn TaskHandler>>,
        poll_interval: Duration,
    ) -> Self {
        Self {
            task_store,
            handlers,
            poll_interval,
        }
    }

    /// Start `worker_count` worker loops. Returns their join handles plus
    /// a `watch::Sender` the caller flips to `true` to request shutdown;
    /// each worker stops at its next loop boundary.
    pub fn spawn(self: Arc<Self>, worker_count: usize) -> (Vec<JoinHandle<()>>, watch::Sender<bool>) {
        let (tx, rx) = watch::channel(false);
        let handles = (0..worker_count)
            .map(|i| {
                let pool = self.clone();
                let worker_id = format!("worker-{i}");
                let mut shutdown = rx.clone();
                tokio::spawn(async move { pool.run_loop(worker_id, &mut shutdown).await })
            })
            .collect();
        (handles, tx)
    }

    async fn run_loop(&self, worker_id: String, shutdown: &mut watch::Receiver<bool>) {
        loop {
            if *shutdown.borrow() {
                break;
            }

            match self.task_store.dequeue(&worker_id).await {
                Ok(Some(task)) => self.dispatch(task).await,
                Ok(None) => self.idle(shutdown).await,
                Err(e) => {
                    warn!(worker_id, error = %e, "dequeue failed; backing off");
                    self.idle(shutdown).await;
                }
            }
        }
    }

    /// Sleeps for `poll_interval` plus up to 20% jitter, so workers polling
    /// on the same interval don't all hit `dequeue` in lockstep.
    async fn idle(&self, shutdown: &mut watch::Receiver<bool>) {
        let jitter = self.poll_interval.mul_f64(fastrand::f64() * 0.2);
        tokio::select! {
            _ = tokio::time::sleep(self.poll_interval + jitter) => {}
            _ = shutdown.changed() => {}
        }
    }

    #[instrument(skip(self, task), fields(task_id = %task.task_id, task_type = %task.task_type))]
    async fn dispatch(&self, task: Task) {
        let Some(handler) = self.handlers.get(&task.task_type).cloned() else {
            warn!("unknown task_type");
            self.fail(task.task_id, format!("unknown task_type: {}", task.task_type))
                .await;
            return;
        };

        let task_id = task.task_id;
        // Spawned so a panicking handler can't take the worker loop with
        // it; the worker's own fallback below is defense in depth per
        // spec §4.5 step 4.
        let outcome = tokio::spawn(async move {
            handler.handle(task.task_id, task.repository, task.input).await
        })
        .await;

        if let Err(join_err) = outcome {
            warn!(%task_id, error = %join_err, "task handler panicked");
            self.fail(task_id, format!("handler panicked: {join_err}")).await;
        }
    }

    async fn fail(&self, task_id: Uuid, error: String) {
        if let Err(e) = self
            .task_store
            .update(task_id, TaskStatus::Failed, None, Some(error))
            .await
        {
            warn!(%task_id, error = %e, "failed to record terminal failure");
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    use async_trait::async_trait;

    use super::*;
    use crate::task_store::test_support::InMemoryTaskStore;

    struct ImmediateCompleteHandler {
        task_store: Arc<InMemoryTaskStore>,
        completions: Arc<AtomicUsize>,
    }

    #[async_trait]
    impl TaskHandler for ImmediateCompleteHandler {
        async fn handle(&self, task_id: Uuid, _repository: String, _input: Value) {
            self.completions.fetch_add(1, Ordering::SeqCst);
            let _ = self
                .task_store
                .update(task_id, TaskStatus::Completed, Some(serde_json::json!({})), None)
                .await;
        }
    }

    struct PanickingHandler;

    #[async_trait]
    impl TaskHandler for PanickingHandler {
        async fn handle(&self, _task_id: Uuid, _repository: String, _input: Value) {
            panic!("boom");
        }
    }

    #[tokio::test]
    async fn test_s6_unknown_task_type_fails_with_message() {
        let store = Arc::new(InMemoryTaskStore::default());
        let task_id = store
            .create("nope", "acme/api", serde_json::json!({}))
            .await
            .unwrap();

        let pool = Arc::new(WorkerPool::new(
            store.clone(),
            HashMap::new(),
            Duration::from_millis(10),
        ));
        let (handles, tx) = pool.spawn(1);

        // Give the single worker one iteration to pick up the task, then
        // shut down.
        tokio::time::sleep(Duration::from_millis(50)).await;
        tx.send(true).unwrap();
        for handle in handles {
            handle.await.unwrap();
        }

        let task = store.get(task_id).await.unwrap().unwrap();
        assert_eq!(task.status, TaskStatus::Failed);
        assert!(task.error.unwrap().starts_with("unknown task_type"));
    }

    #[tokio::test]
    async fn test_s4_concurrent_workers_each_task_claimed_once() {
        let store = Arc::new(InMemoryTaskStore::default());
        for _ in 0..100 {
            store
                .create("noop", "acme/api", serde_json::json!({}))
                .await
                .unwrap();
        }

        let completions = Arc::new(AtomicUsize::new(0));
        let mut handlers: HashMap<String, Arc<dyn TaskHandler>> = HashMap::new();
        handlers.insert(
            "noop".to_string(),
            Arc::new(ImmediateCompleteHandler {
                task_store: store.clone(),
                completions: completions.clone(),
            }),
        );

        let pool = Arc::new(WorkerPool::new(store.clone(), handlers, Duration::from_millis(10)));
        let (handles, tx) = pool.spawn(4);

        // Poll until drained instead of a fixed sleep, bounded generously.
        for _ in 0..200 {
            let stats = store.stats().await.unwrap();
            if stats.completed == 100 {
                break;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }

        tx.send(true).unwrap();
        for handle in handles {
            handle.await.unwrap();
        }

        assert_eq!(completions.load(Ordering::SeqCst), 100);
        let stats = store.stats().await.unwrap();
        assert_eq!(stats.completed, 100);
        assert_eq!(stats.queued, 0);
        assert_eq!(stats.processing, 0);
    }

    #[tokio::test]
    async fn test_panicking_handler_is_recorded_as_failed_not_lost() {
        let store = Arc::new(InMemoryTaskStore::default());
        let task_id = store
            .create("boom", "acme/api", serde_json::json!({}))
            .await
            .unwrap();

        let mut handlers: HashMap<String, Arc<dyn TaskHandler>> = HashMap::new();
        handlers.insert("boom".to_string(), Arc::new(PanickingHandler));

        let pool = Arc::new(WorkerPool::new(store.clone(), handlers, Duration::from_millis(10)));
        let (handles, tx) = pool.spawn(1);

        tokio::time::sleep(Duration::from_millis(50)).await;
        tx.send(true).unwrap();
        for handle in handles {
            handle.await.unwrap();
        }

        let task = store.get(task_id).await.unwrap().unwrap();
        assert_eq!(task.status, TaskStatus::Failed);
        assert!(task.error.unwrap().contains("panicked"));
    }
}
