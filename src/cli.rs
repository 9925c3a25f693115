//! Command-line surface.
//!
//! `run` partitions and dispatches the workload; `plan` prints the partition
//! without running anything. Invoking the binary with no arguments is a
//! `run` with the documented defaults. Flags come after the positional
//! arguments.

use std::path::PathBuf;

use crate::config::{self, RunConfig};
use crate::partition::chunk_events;
use crate::run::{self, RunError};
use crate::sim::SeedPolicy;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Run,
    Plan,
}

pub fn parse_command(args: &[String]) -> Option<Command> {
    match args.get(1).map(String::as_str) {
        None | Some("run") => Some(Command::Run),
        Some("plan") => Some(Command::Plan),
        _ => None,
    }
}

pub fn run_with_args(args: &[String]) -> i32 {
    match parse_command(args) {
        Some(Command::Run) => handle_run(args),
        Some(Command::Plan) => handle_plan(args),
        None => {
            eprintln!(
                "usage: simfarm [run [events] [workers] [--seed N] [--per-range-seeds] \
                 [--out DIR] [--json] | plan [events] [workers]]"
            );
            2
        }
    }
}

fn handle_run(args: &[String]) -> i32 {
    let defaults = RunConfig::for_host();
    let config = RunConfig {
        total_events: parse_usize_arg(positional(args, 2), "events", defaults.total_events),
        worker_count: parse_usize_arg(positional(args, 3), "workers", defaults.worker_count),
        seed_policy: seed_policy_from_args(args),
        output_dir: flag_value(args, "--out")
            .map(PathBuf::from)
            .unwrap_or(defaults.output_dir),
    };

    match run::execute(&config) {
        Ok(report) => {
            if has_flag(args, "--json") {
                match serde_json::to_string_pretty(&report) {
                    Ok(payload) => println!("{payload}"),
                    Err(err) => {
                        eprintln!("failed to serialize run report: {err}");
                        return 1;
                    }
                }
            } else {
                println!("Total execution time: {:.2} s", report.elapsed_secs);
            }
            0
        }
        Err(err @ RunError::Partition(_)) => {
            eprintln!("{err}");
            1
        }
        Err(err) => {
            eprintln!("run failed: {err}");
            1
        }
    }
}

fn handle_plan(args: &[String]) -> i32 {
    let defaults = RunConfig::for_host();
    let total_events = parse_usize_arg(positional(args, 2), "events", defaults.total_events);
    let worker_count = parse_usize_arg(positional(args, 3), "workers", defaults.worker_count);

    match chunk_events(total_events, worker_count) {
        Ok(ranges) => match serde_json::to_string_pretty(&ranges) {
            Ok(payload) => {
                println!("{payload}");
                0
            }
            Err(err) => {
                eprintln!("failed to serialize partition plan: {err}");
                1
            }
        },
        Err(err) => {
            eprintln!("invalid configuration: {err}");
            1
        }
    }
}

fn seed_policy_from_args(args: &[String]) -> SeedPolicy {
    let seed = parse_u64_arg(flag_value(args, "--seed"), "seed", config::DEFAULT_SEED);
    if has_flag(args, "--per-range-seeds") {
        SeedPolicy::PerRange(seed)
    } else {
        SeedPolicy::Shared(seed)
    }
}

/// Positional argument at `index`, unless a flag already starts there.
fn positional(args: &[String], index: usize) -> Option<&String> {
    args.get(index).filter(|value| !value.starts_with("--"))
}

fn flag_value<'a>(args: &'a [String], flag: &str) -> Option<&'a String> {
    args.iter()
        .position(|arg| arg == flag)
        .and_then(|index| args.get(index + 1))
}

fn has_flag(args: &[String], flag: &str) -> bool {
    args.iter().any(|arg| arg == flag)
}

fn parse_usize_arg(raw: Option<&String>, name: &str, default: usize) -> usize {
    raw.and_then(|value| value.parse::<usize>().ok())
        .unwrap_or_else(|| {
            if let Some(value) = raw {
                eprintln!("invalid {name} '{value}', defaulting to {default}");
            }
            default
        })
}

fn parse_u64_arg(raw: Option<&String>, name: &str, default: u64) -> u64 {
    raw.and_then(|value| value.parse::<u64>().ok())
        .unwrap_or_else(|| {
            if let Some(value) = raw {
                eprintln!("invalid {name} '{value}', defaulting to {default}");
            }
            default
        })
}
