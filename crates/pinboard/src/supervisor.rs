//! Worker supervision.
//!
//! The server runs `workers` copies of the same serving loop. A worker that
//! panics, fails or returns on its own is restarted after a backoff; once
//! shutdown is triggered, workers finish their in-flight work and are not
//! restarted.

use std::{future::Future, panic::AssertUnwindSafe, sync::Arc, time::Duration};

use futures_util::FutureExt;
use tokio::{sync::watch, task::JoinSet};

/// Handle a worker awaits to learn that the process is shutting down.
#[derive(Clone)]
pub struct Shutdown(watch::Receiver<bool>);

impl Shutdown {
    /// Creates the sender/handle pair. Send `true` to trigger shutdown.
    pub fn channel() -> (watch::Sender<bool>, Self) {
        let (tx, rx) = watch::channel(false);
        (tx, Self(rx))
    }

    pub fn is_triggered(&self) -> bool {
        *self.0.borrow()
    }

    /// Resolves once shutdown is triggered or the sender is gone.
    pub async fn wait(mut self) {
        let _ = self.0.wait_for(|triggered| *triggered).await;
    }
}

/// Keeps a fixed number of workers running until shutdown.
#[derive(Debug, Clone, Copy)]
pub struct Supervisor {
    workers: usize,
    restart_backoff: Duration,
}

impl Supervisor {
    pub fn new(workers: usize, restart_backoff: Duration) -> Self {
        Self {
            workers: workers.max(1),
            restart_backoff,
        }
    }

    /// Runs `factory(worker_id, shutdown)` in every worker slot and returns
    /// the total number of restarts once all workers have stopped.
    pub async fn run<F, Fut>(self, factory: F, shutdown: Shutdown) -> u64
    where
        F: Fn(usize, Shutdown) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = anyhow::Result<()>> + Send + 'static,
    {
        let factory = Arc::new(factory);
        let mut slots = JoinSet::new();

        tracing::info!(workers = self.workers, "Starting workers");
        for worker in 0..self.workers {
            slots.spawn(supervise(
                worker,
                factory.clone(),
                shutdown.clone(),
                self.restart_backoff,
            ));
        }

        let mut restarts = 0;
        while let Some(joined) = slots.join_next().await {
            match joined {
                Ok(count) => restarts += count,
                Err(err) => tracing::error!(error = %err, "Worker slot aborted"),
            }
        }

        tracing::info!(restarts, "All workers stopped");
        restarts
    }
}

async fn supervise<F, Fut>(
    worker: usize,
    factory: Arc<F>,
    shutdown: Shutdown,
    backoff: Duration,
) -> u64
where
    F: Fn(usize, Shutdown) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = anyhow::Result<()>> + Send + 'static,
{
    let mut restarts = 0;

    loop {
        tracing::debug!(worker, "Worker started");
        let outcome = AssertUnwindSafe(factory(worker, shutdown.clone()))
            .catch_unwind()
            .await;

        if shutdown.is_triggered() {
            if let Ok(Err(err)) = &outcome {
                tracing::warn!(worker, error = %err, "Worker failed during shutdown");
            }
            tracing::debug!(worker, "Worker stopped");
            return restarts;
        }

        match outcome {
            Ok(Ok(())) => tracing::warn!(worker, "Worker exited unexpectedly"),
            Ok(Err(err)) => tracing::error!(worker, error = %err, "Worker failed"),
            Err(panic) => tracing::error!(worker, panic = panic_message(&*panic), "Worker panicked"),
        }

        tokio::select! {
            _ = tokio::time::sleep(backoff) => {}
            _ = shutdown.clone().wait() => return restarts,
        }

        restarts += 1;
        tracing::info!(worker, restarts, "Restarting worker");
    }
}

fn panic_message(panic: &(dyn std::any::Any + Send)) -> &str {
    panic
        .downcast_ref::<&str>()
        .copied()
        .or_else(|| panic.downcast_ref::<String>().map(String::as_str))
        .unwrap_or("unknown panic")
}
