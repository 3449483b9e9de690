use serde::{Serialize, Serializer};
use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

use crate::parallel::{ExecutionStrategy, PoolStats};
use crate::tally::FrequencyTable;

/// How the tasks of one run settled
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct TaskStats {
    pub completed: usize,
    pub failed: usize,
    pub cancelled: usize,
}

/// Outcome of one execution mode
#[derive(Debug, Clone)]
pub struct RunResult {
    pub strategy: ExecutionStrategy,
    pub elapsed: Duration,
    pub table: FrequencyTable,
    pub tasks: TaskStats,
    pub pool: PoolStats,
}

impl RunResult {
    pub fn elapsed_ms(&self) -> u128 {
        self.elapsed.as_millis()
    }

    /// Every submitted file was tokenized or failed on its own; nothing was cut short
    pub fn is_complete(&self) -> bool {
        self.tasks.cancelled == 0 && self.pool.dropped == 0
    }
}

/// Sequential time divided by parallel time, both in whole milliseconds
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Speedup {
    Ratio(f64),
    /// The parallel run took no measurable time
    NotApplicable,
}

impl Speedup {
    /// Computed from the same millisecond values that are printed, so a
    /// `0 ms` parallel time always reads as `n/a`
    pub fn compute(sequential_ms: u128, parallel_ms: u128) -> Self {
        if sequential_ms == 0 {
            return Speedup::Ratio(0.0);
        }
        if parallel_ms == 0 {
            return Speedup::NotApplicable;
        }
        Speedup::Ratio(sequential_ms as f64 / parallel_ms as f64)
    }

    pub fn ratio(&self) -> Option<f64> {
        match self {
            Speedup::Ratio(ratio) => Some(*ratio),
            Speedup::NotApplicable => None,
        }
    }
}

impl fmt::Display for Speedup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Speedup::Ratio(ratio) => write!(f, "{ratio:.2}"),
            Speedup::NotApplicable => f.write_str("n/a"),
        }
    }
}

impl Serialize for Speedup {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Speedup::Ratio(ratio) => serializer.serialize_f64(*ratio),
            Speedup::NotApplicable => serializer.serialize_str("n/a"),
        }
    }
}

/// Both runs over the same file set
#[derive(Debug, Clone)]
pub struct Comparison {
    pub directory: PathBuf,
    pub file_count: usize,
    pub threads: usize,
    pub sequential: RunResult,
    pub parallel: RunResult,
    pub speedup: Speedup,
}

impl Comparison {
    pub fn new(
        directory: PathBuf,
        file_count: usize,
        threads: usize,
        sequential: RunResult,
        parallel: RunResult,
    ) -> Self {
        let speedup = Speedup::compute(sequential.elapsed_ms(), parallel.elapsed_ms());
        Self {
            directory,
            file_count,
            threads,
            sequential,
            parallel,
            speedup,
        }
    }

    /// Both runs produced the same counts
    pub fn counts_match(&self) -> bool {
        self.sequential.table.counts() == self.parallel.table.counts()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_speedup_ratio() {
        let speedup = Speedup::compute(300, 100);
        assert!((speedup.ratio().unwrap() - 3.0).abs() < 1e-9);
        assert_eq!(speedup.to_string(), "3.00");
    }

    #[test]
    fn test_speedup_zero_sequential() {
        let speedup = Speedup::compute(0, 5);
        assert_eq!(speedup, Speedup::Ratio(0.0));

        let both_zero = Speedup::compute(0, 0);
        assert_eq!(both_zero, Speedup::Ratio(0.0));
    }

    #[test]
    fn test_speedup_zero_parallel() {
        let speedup = Speedup::compute(5, 0);
        assert_eq!(speedup, Speedup::NotApplicable);
        assert_eq!(speedup.to_string(), "n/a");
        assert_eq!(serde_json::to_string(&speedup).unwrap(), "\"n/a\"");
    }

    fn run(elapsed: Duration) -> RunResult {
        RunResult {
            strategy: ExecutionStrategy::Sequential,
            elapsed,
            table: FrequencyTable::default(),
            tasks: TaskStats::default(),
            pool: PoolStats::default(),
        }
    }

    #[test]
    fn test_speedup_follows_printed_milliseconds() {
        let comparison = Comparison::new(
            PathBuf::from("corpus"),
            1,
            2,
            run(Duration::from_micros(900)),
            run(Duration::from_micros(300)),
        );
        assert_eq!(comparison.sequential.elapsed_ms(), 0);
        assert_eq!(comparison.speedup, Speedup::Ratio(0.0));
        assert_eq!(comparison.speedup.to_string(), "0.00");

        let comparison = Comparison::new(
            PathBuf::from("corpus"),
            1,
            2,
            run(Duration::from_micros(1_900)),
            run(Duration::from_micros(700)),
        );
        assert_eq!(comparison.sequential.elapsed_ms(), 1);
        assert_eq!(comparison.parallel.elapsed_ms(), 0);
        assert_eq!(comparison.speedup.to_string(), "n/a");
    }
}
