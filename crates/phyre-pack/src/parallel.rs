//! Fanning independent batch calls across a worker pool.
//!
//! Each job runs exactly as it would on a single thread; workers share the
//! engine by reference and nothing else. Job indices are fed through a
//! `crossbeam-channel` queue to scoped threads, and results come back in
//! input order regardless of completion order.

use crossbeam_channel::unbounded;
use phyre_core::{Engine, EngineError, Task, TaskSimulation, UserInput};

use crate::config::ParallelConfig;
use crate::error::PackError;
use crate::pack::{BatchPacker, PackRequest, PackResult};

/// One independent batch call.
#[derive(Clone, Debug)]
pub struct PackJob {
    /// Encoded task.
    pub encoded_task: Vec<u8>,
    /// User input to merge before simulating.
    pub input: UserInput,
    /// Outputs to pack.
    pub request: PackRequest,
}

/// Simulate every task, returning results in input order.
///
/// A task whose worker panicked reports [`EngineError::SimulationFailed`].
pub fn simulate_tasks_in_parallel<E: Engine + ?Sized>(
    engine: &E,
    tasks: &[Task],
    steps: i32,
    stride: i32,
    config: &ParallelConfig,
) -> Vec<Result<TaskSimulation, EngineError>> {
    run_ordered(tasks, config, |task| {
        engine.simulate_task(task, steps, stride)
    })
    .into_iter()
    .map(|slot| {
        slot.unwrap_or_else(|| {
            Err(EngineError::SimulationFailed {
                reason: "worker panicked".into(),
            })
        })
    })
    .collect()
}

/// Run every job through `packer`, returning results in input order.
///
/// Workers share the packer, so its engine and feature width apply to
/// every job.
pub fn pack_in_parallel<E: Engine + ?Sized>(
    packer: &BatchPacker<'_, E>,
    jobs: &[PackJob],
    config: &ParallelConfig,
) -> Vec<Result<PackResult, PackError>> {
    run_ordered(jobs, config, |job| {
        packer.run(&job.encoded_task, &job.input, &job.request)
    })
    .into_iter()
    .enumerate()
    .map(|(job, slot)| slot.unwrap_or(Err(PackError::WorkerPanicked { job })))
    .collect()
}

/// Apply `f` to every item on a scoped pool. Slot `i` holds the result for
/// `items[i]`, or `None` if its worker panicked.
fn run_ordered<T, R, F>(items: &[T], config: &ParallelConfig, f: F) -> Vec<Option<R>>
where
    T: Sync,
    R: Send,
    F: Fn(&T) -> R + Sync,
{
    let mut slots: Vec<Option<R>> = std::iter::repeat_with(|| None).take(items.len()).collect();
    if items.is_empty() {
        return slots;
    }
    let workers = config.resolved_worker_count().min(items.len());
    tracing::debug!(jobs = items.len(), workers, "starting parallel batch");

    let (job_tx, job_rx) = unbounded::<usize>();
    let (result_tx, result_rx) = unbounded::<(usize, R)>();
    for index in 0..items.len() {
        // The receiver is alive until the scope below ends.
        let _ = job_tx.send(index);
    }
    drop(job_tx);

    std::thread::scope(|s| {
        let f = &f;
        let handles: Vec<_> = (0..workers)
            .map(|_| {
                let job_rx = job_rx.clone();
                let result_tx = result_tx.clone();
                s.spawn(move || {
                    for index in job_rx.iter() {
                        let _ = result_tx.send((index, f(&items[index])));
                    }
                })
            })
            .collect();
        for handle in handles {
            if handle.join().is_err() {
                tracing::warn!("batch worker panicked");
            }
        }
    });
    drop(result_tx);

    for (index, result) in result_rx.iter() {
        slots[index] = Some(result);
    }
    slots
}
