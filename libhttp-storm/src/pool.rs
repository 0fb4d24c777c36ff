use std::{future::Future, sync::Arc};
use tokio::{sync::Semaphore, task::JoinSet};
use tracing::warn;

/// Fixed-size pool: every submitted task runs while holding one of `size`
/// permits, so at most `size` tasks make progress at a time across all
/// batches sharing the pool.
#[derive(Debug, Clone)]
pub struct WorkerPool {
    permits: Arc<Semaphore>,
    size: usize,
}

impl WorkerPool {
    pub fn new(size: usize) -> Self {
        let size = size.max(1);
        Self {
            permits: Arc::new(Semaphore::new(size)),
            size,
        }
    }

    pub fn size(&self) -> usize {
        self.size
    }

    /// Spawns one task per item onto the current tokio runtime and returns
    /// the handle for the whole batch. Must be called from within a runtime.
    pub fn submit<T, F, Fut>(&self, items: impl IntoIterator<Item = T>, task: F) -> Batch
    where
        T: Send + 'static,
        F: Fn(T) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        let task = Arc::new(task);
        let mut tasks = JoinSet::new();
        let mut submitted = 0;

        for item in items {
            let permits = Arc::clone(&self.permits);
            let task = Arc::clone(&task);
            tasks.spawn(async move {
                // The pool never closes its semaphore.
                let Ok(_permit) = permits.acquire_owned().await else {
                    return;
                };
                (*task)(item).await;
            });
            submitted += 1;
        }

        Batch { tasks, submitted }
    }
}

#[derive(Debug)]
pub struct Batch {
    tasks: JoinSet<()>,
    submitted: usize,
}

impl Batch {
    pub fn len(&self) -> usize {
        self.submitted
    }

    pub fn is_empty(&self) -> bool {
        self.submitted == 0
    }

    /// Resolves once every task in the batch has finished.
    pub async fn wait(mut self) {
        while let Some(joined) = self.tasks.join_next().await {
            if let Err(err) = joined {
                warn!(error = %err, "probe task did not complete");
            }
        }
    }
}
