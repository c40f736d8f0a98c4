//! Bounded bulkhead pools with fail-fast admission control.
//!
//! One pool per operation category: a fixed number of worker tasks drain
//! one bounded queue. When the queue is full at submission time the task
//! is not queued; its precomputed rejection response is written
//! immediately on the submitting thread. Submission never blocks and
//! never errors, and once rejected a call is never retried by this layer.

use std::sync::Arc;

use tokio::sync::mpsc;
use tokio::sync::mpsc::error::TrySendError;
use tokio::task::JoinHandle;
use tracing::debug;

use super::config::PoolConfig;
use super::task::RpcTask;

/// A bounded worker pool for one operation category.
///
/// Pools never share queues or workers, which is the isolation property
/// this subsystem exists to provide: a burst of sends saturates only the
/// produce pool while heartbeats keep flowing through their own.
pub struct BulkheadPool {
    name: &'static str,
    queue_capacity: usize,
    tx: parking_lot::Mutex<Option<mpsc::Sender<RpcTask>>>,
    workers: parking_lot::Mutex<Vec<JoinHandle<()>>>,
}

impl BulkheadPool {
    /// Spawns the pool's workers. Must be called from within a tokio
    /// runtime. Worker count and queue capacity are clamped to at least 1.
    #[must_use]
    pub fn start(name: &'static str, config: &PoolConfig) -> Self {
        let queue_capacity = config.queue_capacity.max(1);
        let worker_count = config.workers.max(1);
        let (tx, rx) = mpsc::channel::<RpcTask>(queue_capacity);
        let rx = Arc::new(tokio::sync::Mutex::new(rx));

        let mut workers = Vec::with_capacity(worker_count);
        for worker_id in 0..worker_count {
            let rx = Arc::clone(&rx);
            workers.push(tokio::spawn(async move {
                loop {
                    // Hold the receiver lock only while dequeuing; release
                    // it before running so workers execute in parallel.
                    let task = { rx.lock().await.recv().await };
                    match task {
                        Some(task) => task.run().await,
                        None => break,
                    }
                }
                debug!(pool = name, worker = worker_id, "bulkhead worker exited");
            }));
        }

        Self {
            name,
            queue_capacity,
            tx: parking_lot::Mutex::new(Some(tx)),
            workers: parking_lot::Mutex::new(workers),
        }
    }

    /// Pool name used in logs.
    #[must_use]
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// The bounded queue capacity this pool was built with.
    #[must_use]
    pub fn queue_capacity(&self) -> usize {
        self.queue_capacity
    }

    /// Admits a task, or rejects it immediately when the queue is full or
    /// the pool has shut down. Never blocks the submitting thread and
    /// never surfaces an error: the rejection path answers the caller
    /// directly with the task's precomputed envelope.
    pub fn submit(&self, task: RpcTask) {
        let sender = self.tx.lock().clone();
        let Some(tx) = sender else {
            debug!(pool = self.name, kind = task.kind().name(), "pool shut down, rejecting");
            task.reject();
            return;
        };
        match tx.try_send(task) {
            Ok(()) => {}
            Err(TrySendError::Full(task)) => {
                debug!(pool = self.name, kind = task.kind().name(), "queue full, rejecting");
                task.reject();
            }
            Err(TrySendError::Closed(task)) => {
                debug!(pool = self.name, kind = task.kind().name(), "pool shut down, rejecting");
                task.reject();
            }
        }
    }

    /// Stops accepting submissions, then waits for the workers to drain
    /// already-queued tasks and exit. Submissions arriving after shutdown
    /// are rejected through the normal saturation path.
    pub async fn shutdown(&self) {
        // Closing the channel lets workers finish the queue and exit.
        self.tx.lock().take();
        let handles: Vec<_> = self.workers.lock().drain(..).collect();
        for handle in handles {
            let _ = handle.await;
        }
        debug!(pool = self.name, "bulkhead pool stopped");
    }
}

impl std::fmt::Debug for BulkheadPool {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BulkheadPool")
            .field("name", &self.name)
            .field("queue_capacity", &self.queue_capacity)
            .finish_non_exhaustive()
    }
}
