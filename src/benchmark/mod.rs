//! Benchmark harness comparing sequential and parallel tallying

pub mod harness;
pub mod result;

pub use harness::{Benchmark, HarnessState};
pub use result::{Comparison, RunResult, Speedup, TaskStats};
