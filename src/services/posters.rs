use std::sync::Arc;

use futures::stream::{self, StreamExt};

use crate::{
    error::{AppError, AppResult},
    models::MovieId,
};

/// Default number of posters resolved at the same time
pub const DEFAULT_CONCURRENCY: usize = 5;

/// Anything that can turn a movie id into a poster URL without failing
#[async_trait::async_trait]
pub trait PosterSource: Send + Sync {
    async fn resolve_poster(&self, movie_id: &MovieId) -> String;
}

/// Receives `(completed, total)` after each poster in a batch resolves
pub trait ProgressObserver: Send + Sync {
    fn on_progress(&self, completed: usize, total: usize);
}

impl<F> ProgressObserver for F
where
    F: Fn(usize, usize) + Send + Sync,
{
    fn on_progress(&self, completed: usize, total: usize) {
        self(completed, total)
    }
}

/// Observer that only logs progress
pub struct LogProgress;

impl ProgressObserver for LogProgress {
    fn on_progress(&self, completed: usize, total: usize) {
        tracing::debug!(completed, total, "Poster progress");
    }
}

/// Resolves posters for a batch of ids on a bounded pool of tasks
#[derive(Clone)]
pub struct PosterFetcher {
    source: Arc<dyn PosterSource>,
    concurrency: usize,
}

impl PosterFetcher {
    pub fn new(source: Arc<dyn PosterSource>, concurrency: usize) -> Self {
        Self {
            source,
            concurrency: concurrency.max(1),
        }
    }

    /// Resolves every id and returns the URLs in input order
    ///
    /// Completion order is arbitrary; each result is slotted back by its
    /// submission index. Returns only once the whole batch has finished. The
    /// only error is a resolution task that panicked.
    pub async fn fetch_all(
        &self,
        movie_ids: &[MovieId],
        observer: &dyn ProgressObserver,
    ) -> AppResult<Vec<String>> {
        let total = movie_ids.len();
        let mut slots: Vec<Option<String>> = vec![None; total];

        let mut completions = stream::iter(movie_ids.iter().cloned().enumerate())
            .map(|(index, movie_id)| {
                let source = self.source.clone();
                // Spawned so each lookup progresses even while we are busy
                // handling another completion; buffer_unordered caps how many run.
                tokio::spawn(async move {
                    let url = source.resolve_poster(&movie_id).await;
                    (index, url)
                })
            })
            .buffer_unordered(self.concurrency);

        // Keep draining after a failure so no task outlives this call.
        let mut completed = 0;
        let mut failure = None;
        while let Some(joined) = completions.next().await {
            completed += 1;
            match joined {
                Ok((index, url)) => slots[index] = Some(url),
                Err(e) => {
                    tracing::error!(error = %e, "Poster task join error");
                    failure.get_or_insert(AppError::Internal(format!("poster task failed: {}", e)));
                }
            }
            observer.on_progress(completed, total);
        }

        if let Some(error) = failure {
            return Err(error);
        }

        slots
            .into_iter()
            .enumerate()
            .map(|(index, slot)| {
                slot.ok_or_else(|| AppError::Internal(format!("missing poster for slot {}", index)))
            })
            .collect()
    }
}
