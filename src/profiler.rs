//! Search latency and worker counters
//!
//! Purely diagnostic: nothing in the engine reads these values to make a
//! decision. Counters are atomics so the parallel search workers and the
//! owning thread can update them without locking.

use serde::Serialize;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::time::{Duration, Instant};

/// Which public search produced a measurement
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchKind {
    Shortest,
    Longest,
}

#[derive(Debug, Default)]
struct KindCounters {
    calls: AtomicUsize,
    total_ns: AtomicU64,
    max_ns: AtomicU64,
}

impl KindCounters {
    fn record(&self, elapsed_ns: u64) {
        self.calls.fetch_add(1, Ordering::Relaxed);
        self.total_ns.fetch_add(elapsed_ns, Ordering::Relaxed);
        self.max_ns.fetch_max(elapsed_ns, Ordering::Relaxed);
    }

    fn snapshot(&self) -> KindStats {
        KindStats {
            calls: self.calls.load(Ordering::Relaxed),
            total_ns: self.total_ns.load(Ordering::Relaxed),
            max_ns: self.max_ns.load(Ordering::Relaxed),
        }
    }

    fn reset(&self) {
        self.calls.store(0, Ordering::Relaxed);
        self.total_ns.store(0, Ordering::Relaxed);
        self.max_ns.store(0, Ordering::Relaxed);
    }
}

/// Point-in-time copy of one search kind's counters
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct KindStats {
    pub calls: usize,
    pub total_ns: u64,
    pub max_ns: u64,
}

impl KindStats {
    pub fn total(&self) -> Duration {
        Duration::from_nanos(self.total_ns)
    }

    pub fn max(&self) -> Duration {
        Duration::from_nanos(self.max_ns)
    }
}

/// Point-in-time copy of all counters
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct SearchStats {
    pub shortest: KindStats,
    pub longest: KindStats,
    pub peak_workers: usize,
}

/// Shared profiling aggregator
#[derive(Debug, Default)]
pub struct SearchProfiler {
    shortest: KindCounters,
    longest: KindCounters,
    active_workers: AtomicUsize,
    peak_workers: AtomicUsize,
}

impl SearchProfiler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&self, kind: SearchKind, elapsed: Duration) {
        let elapsed_ns = elapsed.as_nanos() as u64;
        match kind {
            SearchKind::Shortest => self.shortest.record(elapsed_ns),
            SearchKind::Longest => self.longest.record(elapsed_ns),
        }
    }

    /// Starts a timer that records into `kind` when dropped
    pub fn time(&self, kind: SearchKind) -> ProfileGuard<'_> {
        ProfileGuard {
            profiler: self,
            kind,
            start: Instant::now(),
        }
    }

    /// Marks a worker as busy; pair with `worker_finished`
    pub fn worker_started(&self) {
        let active = self.active_workers.fetch_add(1, Ordering::AcqRel) + 1;
        self.peak_workers.fetch_max(active, Ordering::Relaxed);
    }

    pub fn worker_finished(&self) {
        self.active_workers.fetch_sub(1, Ordering::AcqRel);
    }

    pub fn snapshot(&self) -> SearchStats {
        SearchStats {
            shortest: self.shortest.snapshot(),
            longest: self.longest.snapshot(),
            peak_workers: self.peak_workers.load(Ordering::Relaxed),
        }
    }

    pub fn reset(&self) {
        self.shortest.reset();
        self.longest.reset();
        self.peak_workers.store(0, Ordering::Relaxed);
    }

    /// Prints profiling report to stderr
    pub fn print_report(&self) {
        let stats = self.snapshot();

        eprintln!("\n═══════════════════════════════════════════════════════════");
        eprintln!("                    SEARCH PROFILE");
        eprintln!("═══════════════════════════════════════════════════════════");
        for (label, kind) in [("Shortest path (BFS)", stats.shortest), ("Longest path", stats.longest)] {
            let avg_us = if kind.calls > 0 {
                kind.total_ns as f64 / (kind.calls as f64 * 1000.0)
            } else {
                0.0
            };
            eprintln!("{}:", label);
            eprintln!("  Calls:    {}", kind.calls);
            eprintln!("  Total:    {:.3}ms", kind.total_ns as f64 / 1_000_000.0);
            eprintln!("  Max:      {:.3}ms", kind.max_ns as f64 / 1_000_000.0);
            eprintln!("  Avg:      {:.2}µs/call\n", avg_us);
        }
        eprintln!("Peak concurrent workers: {}", stats.peak_workers);
        eprintln!("═══════════════════════════════════════════════════════════\n");
    }
}

/// Records elapsed time into the profiler on drop
pub struct ProfileGuard<'a> {
    profiler: &'a SearchProfiler,
    kind: SearchKind,
    start: Instant,
}

impl Drop for ProfileGuard<'_> {
    fn drop(&mut self) {
        self.profiler.record(self.kind, self.start.elapsed());
    }
}
