use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::time::{SystemTime, UNIX_EPOCH};

use simfarm::dispatch::{dispatch_ranges, DispatchError, FixedPool};
use simfarm::partition::{chunk_events, EventRange};
use simfarm::sim::{SimulationError, SimulationRunner};

fn unique_temp_dir(name: &str) -> PathBuf {
    let stamp = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("clock should be after unix epoch")
        .as_nanos();
    std::env::temp_dir().join(format!("simfarm-{name}-{stamp}"))
}

/// Records every invocation; asserts the output directory already exists when
/// the dispatcher calls in, and optionally fails one chunk after leaving a
/// partial file behind.
struct RecordingRunner {
    calls: Mutex<Vec<(EventRange, PathBuf)>>,
    fail_on: Option<EventRange>,
}

impl RecordingRunner {
    fn new() -> Self {
        Self {
            calls: Mutex::new(Vec::new()),
            fail_on: None,
        }
    }

    fn failing_on(range: EventRange) -> Self {
        Self {
            calls: Mutex::new(Vec::new()),
            fail_on: Some(range),
        }
    }

    fn calls(&self) -> Vec<(EventRange, PathBuf)> {
        self.calls.lock().expect("calls lock").clone()
    }
}

impl SimulationRunner for RecordingRunner {
    fn run(&self, range: EventRange, output_dir: &Path) -> Result<(), SimulationError> {
        assert!(
            output_dir.is_dir(),
            "output directory should exist before the runner is invoked"
        );
        self.calls
            .lock()
            .expect("calls lock")
            .push((range, output_dir.to_path_buf()));
        if self.fail_on == Some(range) {
            fs::write(output_dir.join("partial.csv"), b"event_id\n").map_err(|source| {
                SimulationError::Io {
                    path: output_dir.join("partial.csv"),
                    source,
                }
            })?;
            return Err(SimulationError::Runner("injected failure".to_string()));
        }
        Ok(())
    }
}

#[test]
fn dispatch_invokes_the_runner_once_per_range_with_distinct_directories() {
    let base = unique_temp_dir("invocations");
    let ranges = chunk_events(100, 4).expect("valid partition");
    let runner = RecordingRunner::new();

    // Pool smaller than the task count: tasks queue up on free workers.
    let report = dispatch_ranges(&ranges, &base, &FixedPool::new(2), &runner)
        .expect("dispatch should succeed");

    assert_eq!(report.completed, 4);
    assert_eq!(report.failed, 0);
    assert!(report.elapsed_secs >= 0.0);

    let calls = runner.calls();
    assert_eq!(calls.len(), 4);

    let mut seen_ranges: Vec<EventRange> = calls.iter().map(|(range, _)| *range).collect();
    seen_ranges.sort_by_key(|range| range.begin);
    assert_eq!(seen_ranges, ranges);

    let mut dirs: Vec<PathBuf> = calls.iter().map(|(_, dir)| dir.clone()).collect();
    dirs.sort();
    dirs.dedup();
    assert_eq!(dirs.len(), 4, "every task should get its own directory");
    for (range, dir) in &calls {
        assert_eq!(dir, &base.join(format!("process_{}_{}", range.begin, range.end)));
    }

    let _ = fs::remove_dir_all(base);
}

#[test]
fn a_failing_task_does_not_cancel_its_siblings() {
    let base = unique_temp_dir("failure");
    let ranges = chunk_events(100, 4).expect("valid partition");
    let failing = EventRange { begin: 33, end: 66 };
    let runner = RecordingRunner::failing_on(failing);

    let result = dispatch_ranges(&ranges, &base, &FixedPool::new(2), &runner);

    let err = result.expect_err("dispatch should surface the worker failure");
    match err {
        DispatchError::Worker(failure) => {
            assert_eq!(failure.range, failing);
            assert!(failure.message.contains("injected failure"));
        }
        other => panic!("unexpected error: {other}"),
    }
    assert_eq!(
        runner.calls().len(),
        4,
        "siblings should run to completion after a failure"
    );

    let _ = fs::remove_dir_all(base);
}

#[test]
fn a_failed_task_leaves_its_partial_output_on_disk() {
    let base = unique_temp_dir("partial");
    let ranges = chunk_events(10, 2).expect("valid partition");
    let runner = RecordingRunner::failing_on(EventRange { begin: 0, end: 10 });

    dispatch_ranges(&ranges, &base, &FixedPool::new(2), &runner)
        .expect_err("dispatch should fail");

    let partial = base.join("process_0_10").join("partial.csv");
    assert!(partial.is_file(), "partial output should not be cleaned up");

    let _ = fs::remove_dir_all(base);
}

#[test]
fn report_lists_tasks_in_range_order_regardless_of_completion_order() {
    let base = unique_temp_dir("ordering");
    let ranges = chunk_events(1_000, 9).expect("valid partition");
    let runner = RecordingRunner::new();

    let report = dispatch_ranges(&ranges, &base, &FixedPool::new(4), &runner)
        .expect("dispatch should succeed");

    let reported: Vec<(usize, usize)> = report
        .tasks
        .iter()
        .map(|task| (task.begin, task.end))
        .collect();
    let expected: Vec<(usize, usize)> = ranges.iter().map(|r| (r.begin, r.end)).collect();
    assert_eq!(reported, expected);

    let _ = fs::remove_dir_all(base);
}
