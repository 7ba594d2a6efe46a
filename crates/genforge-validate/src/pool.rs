//! Fixed-size async worker pool.
//!
//! A small set of long-lived tokio tasks consuming one shared mpsc
//! queue. Jobs run to completion on whichever worker picks them up; a
//! job that returns never takes the worker down with it.

use std::future::Future;
use std::sync::Arc;

use tokio::sync::{mpsc, Mutex};
use tracing::debug;

use crate::error::{Result, ValidateError};

/// Fixed pool of workers over a shared queue of `T` jobs.
pub struct WorkerPool<T> {
    tx: mpsc::Sender<T>,
}

impl<T: Send + 'static> WorkerPool<T> {
    /// Spawn `workers` tasks, each pulling from the shared queue and
    /// running `handler` on every job.
    pub fn new<F, Fut>(workers: usize, queue_depth: usize, handler: F) -> Self
    where
        F: Fn(T) -> Fut + Send + Sync + Clone + 'static,
        Fut: Future<Output = ()> + Send,
    {
        let (tx, rx) = mpsc::channel::<T>(queue_depth.max(1));
        let rx = Arc::new(Mutex::new(rx));

        for worker_id in 0..workers.max(1) {
            let rx = Arc::clone(&rx);
            let handler = handler.clone();
            tokio::spawn(async move {
                loop {
                    // Hold the receiver lock only while waiting for the
                    // next job, never while running one.
                    let job = { rx.lock().await.recv().await };
                    match job {
                        Some(job) => {
                            debug!(worker_id, "worker picked up job");
                            handler(job).await;
                        }
                        None => {
                            debug!(worker_id, "queue closed, worker exiting");
                            break;
                        }
                    }
                }
            });
        }

        Self { tx }
    }

    /// Enqueue a job, waiting for queue capacity.
    pub async fn submit(&self, job: T) -> Result<()> {
        self.tx
            .send(job)
            .await
            .map_err(|e| ValidateError::QueueClosed(e.to_string()))
    }
}
