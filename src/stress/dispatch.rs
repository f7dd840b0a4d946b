use std::future::Future;
use std::sync::{Arc, Mutex, PoisonError};

use tokio::task::JoinSet;
use tracing::{error, warn};

use super::growth::Growth;

/// Runs batches of concurrent units of work sized by a growth function.
#[derive(Debug, Clone)]
pub struct BatchDispatcher {
    growth: Growth,
    max_batch_size: usize,
    last_batch_size: usize,
}

impl BatchDispatcher {
    #[must_use]
    pub const fn new(growth: Growth) -> Self {
        Self {
            growth,
            max_batch_size: usize::MAX,
            last_batch_size: 0,
        }
    }

    /// Caps every batch at `max_batch_size` units.
    #[must_use]
    pub const fn with_max_batch_size(mut self, max_batch_size: usize) -> Self {
        self.max_batch_size = max_batch_size;
        self
    }

    #[must_use]
    pub const fn growth(&self) -> &Growth {
        &self.growth
    }

    /// Units launched by the most recent batch.
    #[must_use]
    pub const fn last_batch_size(&self) -> usize {
        self.last_batch_size
    }

    /// Advances the growth function and returns the size of the next batch.
    pub fn next_batch_size(&mut self) -> usize {
        let value = self.growth.next_value();
        let size = usize::try_from(value).unwrap_or(usize::MAX);
        if size > self.max_batch_size {
            warn!(
                "Batch size {} exceeds the cap of {}; capping.",
                value, self.max_batch_size
            );
            return self.max_batch_size;
        }
        size
    }

    /// Runs the next batch: `unit` is spawned once per slot and every task is
    /// awaited. Returns the errors of the failed units in completion order.
    ///
    /// Dropping the returned future aborts the units still running.
    pub async fn execute_batch<F, Fut, E>(&mut self, unit: F) -> Vec<E>
    where
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<(), E>> + Send + 'static,
        E: Send + 'static,
    {
        let size = self.next_batch_size();
        self.last_batch_size = size;
        if size == 0 {
            // An empty batch must still hand control back to the runtime so
            // timers and shutdown can win the race.
            tokio::task::yield_now().await;
            return Vec::new();
        }
        let unit = Arc::new(unit);
        let errors: Arc<Mutex<Vec<E>>> = Arc::new(Mutex::new(Vec::new()));

        let mut tasks = JoinSet::new();
        for _ in 0..size {
            let unit = Arc::clone(&unit);
            let errors = Arc::clone(&errors);
            tasks.spawn(async move {
                if let Err(err) = (*unit)().await {
                    errors
                        .lock()
                        .unwrap_or_else(PoisonError::into_inner)
                        .push(err);
                }
            });
        }

        while let Some(joined) = tasks.join_next().await {
            if let Err(err) = joined {
                error!("Batch unit did not complete: {}", err);
            }
        }

        std::mem::take(&mut *errors.lock().unwrap_or_else(PoisonError::into_inner))
    }

    pub fn reset(&mut self) {
        self.growth.reset();
    }
}
