//! Dispatch of event chunks across the worker pool.
//!
//! One task per range: the dispatcher creates each task's output directory up
//! front, submits every task to the pool, blocks until all of them have
//! finished, and reports elapsed wall-clock time plus per-task outcomes.
//! Failed tasks do not cancel their siblings, are never retried, and whatever
//! they wrote stays on disk.

pub mod pool;

use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Instant;

use serde::Serialize;
use tracing::{error, info};

use crate::partition::EventRange;
use crate::sim::SimulationRunner;

pub use pool::{FixedPool, Job, WorkerPool};

/// One range bound to its pre-created output directory. Consumed exactly
/// once by one runner invocation, never mutated after dispatch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WorkerTask {
    pub range: EventRange,
    pub output_dir: PathBuf,
}

/// Terminal state of one task after the join; tasks move
/// pending -> running -> completed|failed and never leave a terminal state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum TaskOutcome {
    Completed,
    Failed { error: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TaskReport {
    pub begin: usize,
    pub end: usize,
    pub output_dir: PathBuf,
    #[serde(flatten)]
    pub outcome: TaskOutcome,
}

/// Summary of one dispatch: when it started, how long the join took, and how
/// every task ended.
#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    pub started_at: String,
    pub elapsed_secs: f64,
    pub completed: usize,
    pub failed: usize,
    pub tasks: Vec<TaskReport>,
}

/// Failure of one worker invocation, as surfaced at the pool join.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkerFailure {
    pub range: EventRange,
    pub message: String,
}

impl fmt::Display for WorkerFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "worker for events {} failed: {}", self.range, self.message)
    }
}

impl std::error::Error for WorkerFailure {}

#[derive(Debug)]
pub enum DispatchError {
    /// An output directory could not be created; surfaced before any worker
    /// starts.
    CreateDir {
        path: PathBuf,
        source: std::io::Error,
    },
    /// First worker failure in range order. Siblings still ran to completion.
    Worker(WorkerFailure),
}

impl fmt::Display for DispatchError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::CreateDir { path, source } => write!(
                f,
                "failed to create output directory {}: {source}",
                path.display()
            ),
            Self::Worker(failure) => write!(f, "{failure}"),
        }
    }
}

impl std::error::Error for DispatchError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::CreateDir { source, .. } => Some(source),
            Self::Worker(failure) => Some(failure),
        }
    }
}

/// Build the task list: one task per range, directory named after the range
/// bounds, created recursively. An existing directory is not an error. All
/// directories exist before this returns, so an I/O problem aborts the run
/// before any worker starts.
pub fn prepare_tasks(
    ranges: &[EventRange],
    base_dir: &Path,
) -> Result<Vec<WorkerTask>, DispatchError> {
    let mut tasks = Vec::with_capacity(ranges.len());
    for &range in ranges {
        let output_dir = base_dir.join(range.dir_name());
        fs::create_dir_all(&output_dir).map_err(|source| DispatchError::CreateDir {
            path: output_dir.clone(),
            source,
        })?;
        tasks.push(WorkerTask { range, output_dir });
    }
    Ok(tasks)
}

/// Run one simulation invocation per range across `pool`, blocking until all
/// of them have finished.
///
/// Every submitted task runs to completion even when a sibling fails; after
/// the join all failures are logged and the first one in range order comes
/// back as the error. On success the report carries total elapsed wall-clock
/// seconds for the whole join.
pub fn dispatch_ranges<R, P>(
    ranges: &[EventRange],
    base_dir: &Path,
    pool: &P,
    runner: &R,
) -> Result<RunReport, DispatchError>
where
    R: SimulationRunner,
    P: WorkerPool,
{
    let tasks = prepare_tasks(ranges, base_dir)?;
    let started_at = chrono::Utc::now().format("%Y-%m-%dT%H:%M:%SZ").to_string();
    let clock = Instant::now();

    let jobs: Vec<Job<'_>> = tasks
        .iter()
        .map(|task| {
            let job: Job<'_> = Box::new(move || {
                info!(
                    begin = task.range.begin,
                    end = task.range.end,
                    "simulating event chunk"
                );
                runner
                    .run(task.range, &task.output_dir)
                    .map_err(|err| WorkerFailure {
                        range: task.range,
                        message: err.to_string(),
                    })
            });
            job
        })
        .collect();

    let outcomes = pool.run_to_completion(jobs);
    let elapsed_secs = clock.elapsed().as_secs_f64();

    let mut first_failure = None;
    let mut reports = Vec::with_capacity(tasks.len());
    let mut completed = 0;
    let mut failed = 0;
    for (task, outcome) in tasks.iter().zip(outcomes) {
        match outcome {
            Ok(()) => {
                completed += 1;
                reports.push(TaskReport {
                    begin: task.range.begin,
                    end: task.range.end,
                    output_dir: task.output_dir.clone(),
                    outcome: TaskOutcome::Completed,
                });
            }
            Err(failure) => {
                failed += 1;
                error!(
                    begin = task.range.begin,
                    end = task.range.end,
                    error = %failure.message,
                    "worker failed"
                );
                reports.push(TaskReport {
                    begin: task.range.begin,
                    end: task.range.end,
                    output_dir: task.output_dir.clone(),
                    outcome: TaskOutcome::Failed {
                        error: failure.message.clone(),
                    },
                });
                if first_failure.is_none() {
                    first_failure = Some(failure);
                }
            }
        }
    }

    info!(completed, failed, elapsed_secs, "event chunks joined");

    match first_failure {
        Some(failure) => Err(DispatchError::Worker(failure)),
        None => Ok(RunReport {
            started_at,
            elapsed_secs,
            completed,
            failed,
            tasks: reports,
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::time::{SystemTime, UNIX_EPOCH};

    fn unique_temp_dir(name: &str) -> PathBuf {
        let stamp = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .expect("clock should be after unix epoch")
            .as_nanos();
        std::env::temp_dir().join(format!("simfarm-dispatch-{name}-{stamp}"))
    }

    #[test]
    fn prepare_tasks_creates_one_directory_per_range() {
        let base = unique_temp_dir("prepare");
        let ranges = [
            EventRange { begin: 0, end: 33 },
            EventRange { begin: 33, end: 66 },
        ];

        let tasks = prepare_tasks(&ranges, &base).expect("directories should be created");
        assert_eq!(tasks.len(), 2);
        assert_eq!(tasks[0].output_dir, base.join("process_0_33"));
        assert_eq!(tasks[1].output_dir, base.join("process_33_66"));
        for task in &tasks {
            assert!(task.output_dir.is_dir());
        }

        let _ = fs::remove_dir_all(base);
    }

    #[test]
    fn prepare_tasks_is_idempotent_over_existing_directories() {
        let base = unique_temp_dir("idempotent");
        let ranges = [EventRange { begin: 0, end: 10 }];
        let existing = base.join("process_0_10");
        fs::create_dir_all(&existing).expect("pre-created dir");
        fs::write(existing.join("sentinel"), b"keep").expect("sentinel should be written");

        prepare_tasks(&ranges, &base).expect("existing directory is not an error");
        assert!(existing.join("sentinel").is_file());

        let _ = fs::remove_dir_all(base);
    }
}
