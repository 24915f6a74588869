//! Worker pool configuration for the parallel batch runner.

/// Sizing of the parallel batch runner's worker pool.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ParallelConfig {
    /// Number of worker threads. `None` = one per available CPU.
    pub worker_count: Option<usize>,
}

impl ParallelConfig {
    /// Upper bound on worker threads.
    pub const MAX_WORKERS: usize = 64;

    /// Config with an explicit worker count.
    pub fn with_workers(worker_count: usize) -> Self {
        Self {
            worker_count: Some(worker_count),
        }
    }

    /// Resolve the actual worker count, applying auto-detection if `None`.
    ///
    /// Explicit values are clamped to `[1, 64]`; zero workers would never
    /// drain the job queue.
    pub fn resolved_worker_count(&self) -> usize {
        match self.worker_count {
            Some(n) => n.clamp(1, Self::MAX_WORKERS),
            None => std::thread::available_parallelism()
                .map(|n| n.get())
                .unwrap_or(4)
                .clamp(1, Self::MAX_WORKERS),
        }
    }
}
