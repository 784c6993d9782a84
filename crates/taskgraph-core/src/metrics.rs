//! Instrumentation sinks attached to each algorithm call.
//!
//! Every engine takes a `&mut dyn MetricsSink`. The sink is passed in
//! explicitly so concurrent analyses never share counters; results are
//! identical whether a [`Counters`] or a [`NoopMetrics`] is supplied.

use std::fmt;
use std::time::{Duration, Instant};

use serde::Serialize;

/// Passive observer of traversal, relaxation and frontier work.
pub trait MetricsSink {
    /// Called once when an algorithm begins its timed section.
    fn start(&mut self);
    /// Called once when the timed section ends.
    fn stop(&mut self);
    /// A DFS vertex discovery or edge exploration.
    fn record_visit(&mut self);
    /// An edge examined during distance relaxation.
    fn record_relaxation(&mut self);
    /// An enqueue, dequeue, or in-degree update on the Kahn frontier.
    fn record_frontier_op(&mut self);
}

/// Sink that discards everything.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct NoopMetrics;

impl MetricsSink for NoopMetrics {
    fn start(&mut self) {}
    fn stop(&mut self) {}
    fn record_visit(&mut self) {}
    fn record_relaxation(&mut self) {}
    fn record_frontier_op(&mut self) {}
}

/// Counting sink with a wall-clock timer.
///
/// Counters accumulate across calls until [`Counters::reset`]. The timer
/// measures the most recent `start`/`stop` pair.
#[derive(Debug, Clone, Default, Serialize)]
pub struct Counters {
    /// DFS vertex discoveries plus edge explorations.
    pub visits: u64,
    /// Edges examined while relaxing distances.
    pub relaxations: u64,
    /// Frontier enqueues, dequeues and in-degree updates.
    pub frontier_ops: u64,
    /// Duration of the last timed section.
    #[serde(serialize_with = "serialize_nanos", rename = "elapsed_ns")]
    pub elapsed: Duration,
    #[serde(skip)]
    started: Option<Instant>,
}

impl Counters {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Zero all counters and the timer.
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

impl MetricsSink for Counters {
    fn start(&mut self) {
        self.started = Some(Instant::now());
    }

    fn stop(&mut self) {
        if let Some(started) = self.started.take() {
            self.elapsed = started.elapsed();
        }
    }

    fn record_visit(&mut self) {
        self.visits += 1;
    }

    fn record_relaxation(&mut self) {
        self.relaxations += 1;
    }

    fn record_frontier_op(&mut self) {
        self.frontier_ops += 1;
    }
}

impl fmt::Display for Counters {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "time={}ns visits={} relaxations={} frontier_ops={}",
            self.elapsed.as_nanos(),
            self.visits,
            self.relaxations,
            self.frontier_ops
        )
    }
}

#[allow(clippy::trivially_copy_pass_by_ref)]
fn serialize_nanos<S: serde::Serializer>(value: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_u64(u64::try_from(value.as_nanos()).unwrap_or(u64::MAX))
}
