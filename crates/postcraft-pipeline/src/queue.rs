//! Bounded work queue for model sub-calls within a stage.

use std::future::Future;

use futures::stream::{self, StreamExt};

/// Runs a stage's sub-calls with at most `concurrency` in flight, preserving input order.
///
/// The pipeline uses concurrency 1 so upstream rate limits are respected.
#[derive(Debug, Clone, Copy)]
pub struct WorkQueue {
    concurrency: usize,
}

impl WorkQueue {
    #[must_use]
    pub fn new(concurrency: usize) -> Self {
        Self {
            concurrency: concurrency.max(1),
        }
    }

    #[must_use]
    pub fn concurrency(&self) -> usize {
        self.concurrency
    }

    /// Apply `task` to every item; outputs come back in input order.
    ///
    /// # Errors
    ///
    /// Returns the first error in input order. Tasks after it are not started.
    pub async fn try_map<I, T, U, E, F, Fut>(&self, items: I, task: F) -> Result<Vec<U>, E>
    where
        I: IntoIterator<Item = T>,
        F: FnMut(T) -> Fut,
        Fut: Future<Output = Result<U, E>>,
    {
        let mut results = stream::iter(items).map(task).buffered(self.concurrency);
        let mut out = Vec::new();
        while let Some(result) = results.next().await {
            out.push(result?);
        }
        Ok(out)
    }
}

impl Default for WorkQueue {
    fn default() -> Self {
        Self::new(1)
    }
}
