//! Worker-pool capability interface and its rayon-backed implementation.
//!
//! The dispatcher only needs one thing from the concurrency backend: run a
//! batch of independent jobs, block until every one of them has finished, and
//! hand the outcomes back in submission order. [WorkerPool] captures that
//! contract so the backend (thread pool, process pool, task queue) stays
//! swappable without touching the dispatch logic.

use std::sync::Mutex;

use rayon::ThreadPoolBuilder;

use crate::dispatch::WorkerFailure;

/// One unit of work. A job owns its task description and shares no mutable
/// state with its siblings.
pub type Job<'scope> = Box<dyn FnOnce() -> Result<(), WorkerFailure> + Send + 'scope>;

pub trait WorkerPool {
    /// Run every job to completion, then return outcomes in submission order.
    ///
    /// Completion order across workers is unspecified. A failing job does not
    /// cancel its siblings. A job that never returns blocks this call
    /// indefinitely; bounding wall-clock time is the caller's problem.
    fn run_to_completion<'scope>(&self, jobs: Vec<Job<'scope>>)
        -> Vec<Result<(), WorkerFailure>>;
}

/// Fixed-size rayon thread pool: jobs queue up and are handed to the next
/// free worker.
#[derive(Debug, Clone, Copy)]
pub struct FixedPool {
    workers: usize,
}

impl FixedPool {
    /// A pool with exactly `workers` threads (floored at one).
    pub fn new(workers: usize) -> Self {
        Self {
            workers: workers.max(1),
        }
    }

    pub fn workers(&self) -> usize {
        self.workers
    }
}

impl WorkerPool for FixedPool {
    fn run_to_completion<'scope>(
        &self,
        jobs: Vec<Job<'scope>>,
    ) -> Vec<Result<(), WorkerFailure>> {
        let pool = ThreadPoolBuilder::new()
            .num_threads(self.workers)
            .build()
            .expect("Rayon thread pool");

        // One slot per job keeps outcomes in submission order even though
        // completion order is up to the scheduler.
        let slots: Vec<Mutex<Option<Result<(), WorkerFailure>>>> =
            jobs.iter().map(|_| Mutex::new(None)).collect();

        pool.scope(|scope| {
            for (slot, job) in slots.iter().zip(jobs) {
                scope.spawn(move |_| {
                    let outcome = job();
                    *slot.lock().expect("job slot should be lockable") = Some(outcome);
                });
            }
        });

        slots
            .into_iter()
            .map(|slot| {
                slot.into_inner()
                    .expect("job slot should be lockable")
                    .expect("every job should have reported an outcome")
            })
            .collect()
    }
}
