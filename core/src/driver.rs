//! Measurement driver shared by the Criterion benches, the `rtbench` CLI and
//! the dashboard reporter.
//!
//! A benchmark body receives a [`Bench`] handle carrying the iteration count.
//! Work done before [`Bench::reset_timer`] (buffer allocation, warm-up) and
//! after [`Bench::stop_timer`] (self-checks, teardown) is excluded from both
//! the elapsed time and the allocation counts.

use std::fmt;
use std::hint::black_box;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use crate::alloc::{AllocDelta, AllocSnapshot, tracking_active};

/// Upper bound for calibrated iteration counts.
pub const MAX_ITERS: u64 = 1_000_000_000;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Group {
    Addressing,
    Function,
    Division,
    Shift,
    Format,
}

impl Group {
    pub const fn as_str(self) -> &'static str {
        match self {
            Group::Addressing => "addressing",
            Group::Function => "function",
            Group::Division => "division",
            Group::Shift => "shift",
            Group::Format => "format",
        }
    }
}

impl fmt::Display for Group {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

pub type BenchFn = fn(&mut Bench) -> Result<()>;

/// A named benchmark: `group/variant` plus the body to time.
#[derive(Clone, Copy)]
pub struct BenchCase {
    pub group: Group,
    pub variant: &'static str,
    pub report_allocs: bool,
    pub run: BenchFn,
}

impl BenchCase {
    pub fn name(&self) -> String {
        format!("{}/{}", self.group, self.variant)
    }
}

impl fmt::Debug for BenchCase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BenchCase")
            .field("group", &self.group)
            .field("variant", &self.variant)
            .field("report_allocs", &self.report_allocs)
            .finish()
    }
}

/// Per-run handle passed to a benchmark body.
pub struct Bench {
    iters: u64,
    started: Instant,
    alloc_base: AllocSnapshot,
    stopped: Option<(Duration, AllocDelta)>,
}

impl Bench {
    fn new(iters: u64) -> Self {
        Bench {
            iters,
            started: Instant::now(),
            alloc_base: AllocSnapshot::now(),
            stopped: None,
        }
    }

    pub fn iters(&self) -> u64 {
        self.iters
    }

    /// Restart the clock and the allocation baseline.
    pub fn reset_timer(&mut self) {
        self.stopped = None;
        self.alloc_base = AllocSnapshot::now();
        self.started = Instant::now();
    }

    /// Time `kernel` over this run's iteration count and keep its result
    /// alive past the timed region.
    pub fn time<T>(&mut self, kernel: impl FnOnce(u64) -> T) -> T {
        self.reset_timer();
        let out = black_box(kernel(self.iters));
        self.stop_timer();
        out
    }

    /// Freeze the measurement; later work is not counted. Idempotent.
    pub fn stop_timer(&mut self) {
        if self.stopped.is_none() {
            let elapsed = self.started.elapsed();
            let allocs = AllocSnapshot::now().since(&self.alloc_base);
            self.stopped = Some((elapsed, allocs));
        }
    }
}

/// Result of running one case for a fixed iteration count.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Measurement {
    pub name: String,
    pub group: Group,
    pub iters: u64,
    pub elapsed_ns: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub allocs: Option<AllocDelta>,
}

impl Measurement {
    pub fn elapsed(&self) -> Duration {
        Duration::from_nanos(self.elapsed_ns)
    }

    pub fn ns_per_iter(&self) -> f64 {
        if self.iters == 0 {
            return 0.0;
        }
        self.elapsed_ns as f64 / self.iters as f64
    }

    pub fn allocs_per_iter(&self) -> Option<u64> {
        self.allocs.map(|a| a.allocs.checked_div(self.iters).unwrap_or(0))
    }

    pub fn bytes_per_iter(&self) -> Option<u64> {
        self.allocs.map(|a| a.bytes.checked_div(self.iters).unwrap_or(0))
    }
}

/// Run `case` for exactly `iters` iterations.
pub fn measure(case: &BenchCase, iters: u64) -> Result<Measurement> {
    let mut bench = Bench::new(iters);
    (case.run)(&mut bench).with_context(|| format!("benchmark {} failed", case.name()))?;
    bench.stop_timer();
    let (elapsed, allocs) = bench.stopped.unwrap_or_default();

    let measurement = Measurement {
        name: case.name(),
        group: case.group,
        iters,
        elapsed_ns: u64::try_from(elapsed.as_nanos()).unwrap_or(u64::MAX),
        allocs: (case.report_allocs && tracking_active()).then_some(allocs),
    };
    debug!(
        name = %measurement.name,
        iters,
        ns_per_iter = measurement.ns_per_iter(),
        allocs = ?measurement.allocs,
        "measured"
    );
    Ok(measurement)
}

/// Grow the iteration count until one run lasts at least `target`.
pub fn calibrate(case: &BenchCase, target: Duration) -> Result<Measurement> {
    let goal_ns = u64::try_from(target.as_nanos()).unwrap_or(u64::MAX);
    let mut iters = 1;
    let mut last = measure(case, iters)?;
    while last.elapsed_ns < goal_ns && iters < MAX_ITERS {
        iters = next_iters(iters, last.elapsed_ns, goal_ns);
        trace!(name = %last.name, iters, previous_ns = last.elapsed_ns, "calibrating");
        last = measure(case, iters)?;
    }
    Ok(last)
}

/// Predict the count that reaches `goal_ns`, overshooting by 20%, growing by
/// at least one and at most 100x.
pub(crate) fn next_iters(prev_iters: u64, prev_ns: u64, goal_ns: u64) -> u64 {
    let prev_ns = prev_ns.max(1) as u128;
    let mut n = (goal_ns as u128 * prev_iters as u128 / prev_ns).min(u64::MAX as u128) as u64;
    n = n.saturating_add(n / 5);
    n = n.min(prev_iters.saturating_mul(100));
    n = n.max(prev_iters + 1);
    n.min(MAX_ITERS)
}
