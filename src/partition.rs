//! Event-chunk partitioning for the parallel simulation driver.
//!
//! Splits a fixed number of events into contiguous half-open ranges, one per
//! worker invocation. The nominal chunk length is `total_events` divided by
//! one less than the worker count: the caller hands us a worker count derived
//! from host capacity minus a reservation, and one slot of headroom is kept
//! out of the divisor so the chunk count tracks the simulation workers that
//! are actually running.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Contiguous half-open block `[begin, end)` of event indices, processed by
/// exactly one worker invocation. Always non-empty: `begin < end`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventRange {
    pub begin: usize,
    pub end: usize,
}

impl EventRange {
    /// Number of events in the range.
    pub fn len(&self) -> usize {
        self.end - self.begin
    }

    pub fn is_empty(&self) -> bool {
        self.begin >= self.end
    }

    /// Output directory name for this range, `process_<begin>_<end>`.
    /// Depends only on the range bounds, never on scheduling order.
    pub fn dir_name(&self) -> String {
        format!("process_{}_{}", self.begin, self.end)
    }
}

impl fmt::Display for EventRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}, {})", self.begin, self.end)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PartitionError {
    /// A run over zero events has nothing to partition.
    NoEvents,
    /// The chunk divisor is `worker_count - 1`; fewer than two workers would
    /// make it non-positive.
    TooFewWorkers { worker_count: usize },
    /// More chunk slots than events: the nominal chunk length came out zero.
    ChunkTooSmall {
        total_events: usize,
        worker_count: usize,
    },
}

impl fmt::Display for PartitionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NoEvents => write!(f, "total event count must be positive"),
            Self::TooFewWorkers { worker_count } => write!(
                f,
                "worker count must be at least 2, got {worker_count}"
            ),
            Self::ChunkTooSmall {
                total_events,
                worker_count,
            } => write!(
                f,
                "{total_events} event(s) cannot be split across {worker_count} workers; \
                 the chunk length would be zero"
            ),
        }
    }
}

impl std::error::Error for PartitionError {}

/// Validated partition input: a positive event count and at least two
/// workers. Constructed once per run and immutable afterwards.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PartitionRequest {
    total_events: usize,
    worker_count: usize,
}

impl PartitionRequest {
    /// Validates the preconditions and rejects anything that would produce a
    /// malformed partition, before any task is dispatched.
    pub fn new(total_events: usize, worker_count: usize) -> Result<Self, PartitionError> {
        if worker_count < 2 {
            return Err(PartitionError::TooFewWorkers { worker_count });
        }
        if total_events == 0 {
            return Err(PartitionError::NoEvents);
        }
        let request = Self {
            total_events,
            worker_count,
        };
        if request.chunk_len() == 0 {
            return Err(PartitionError::ChunkTooSmall {
                total_events,
                worker_count,
            });
        }
        Ok(request)
    }

    pub fn total_events(&self) -> usize {
        self.total_events
    }

    pub fn worker_count(&self) -> usize {
        self.worker_count
    }

    /// Nominal chunk length, `total_events / (worker_count - 1)` with floor
    /// division. The last range of [ranges](Self::ranges) may be shorter.
    pub fn chunk_len(&self) -> usize {
        self.total_events / (self.worker_count - 1)
    }

    /// Ordered ranges: the first begins at 0, consecutive ranges are
    /// contiguous, every range has the nominal length except possibly the
    /// last, and the union covers `[0, total_events)` exactly.
    pub fn ranges(&self) -> Vec<EventRange> {
        let chunk_len = self.chunk_len();
        let mut ranges = Vec::with_capacity(self.total_events.div_ceil(chunk_len));
        let mut begin = 0;
        while begin < self.total_events {
            let end = (begin + chunk_len).min(self.total_events);
            ranges.push(EventRange { begin, end });
            begin = end;
        }
        ranges
    }
}

/// Split `total_events` into chunks sized for `worker_count` workers.
///
/// # Example
/// ```
/// # use simfarm::partition::chunk_events;
/// let ranges = chunk_events(100, 3).unwrap();
/// assert_eq!(ranges.len(), 2);
/// assert_eq!((ranges[0].begin, ranges[0].end), (0, 50));
/// assert_eq!((ranges[1].begin, ranges[1].end), (50, 100));
/// ```
pub fn chunk_events(
    total_events: usize,
    worker_count: usize,
) -> Result<Vec<EventRange>, PartitionError> {
    PartitionRequest::new(total_events, worker_count).map(|request| request.ranges())
}
