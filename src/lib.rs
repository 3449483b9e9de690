//! # wordtally - sequential vs. parallel word frequency analysis
//!
//! Tokenizes every matching file in a directory twice: once on the calling
//! thread and once on a bounded worker pool. Both runs produce identical
//! frequency tables; the difference is wall-clock time, which is reported
//! alongside the most frequent tokens.
//!
//! ## Quick Start
//!
//! ```bash
//! # Analyze ./corpus with 8 worker threads and write a JSON report
//! wordtally ./corpus --threads 8 --format json -o result.json
//! ```
//!
//! ## Library use
//!
//! ```no_run
//! use wordtally::{Benchmark, FileDiscovery, PoolConfig};
//!
//! # fn main() -> wordtally::Result<()> {
//! let mut bench = Benchmark::new(FileDiscovery::default(), PoolConfig::default());
//! let comparison = bench.run("corpus".as_ref())?;
//! for ranked in comparison.parallel.table.top_k(10) {
//!     println!("{ranked:?}");
//! }
//! # Ok(())
//! # }
//! ```

pub mod benchmark;
pub mod cli;
pub mod config;
pub mod discovery;
pub mod error;
pub mod parallel;
pub mod reports;
pub mod tally;

pub use benchmark::{Benchmark, Comparison, RunResult, Speedup};
pub use config::TallyConfig;
pub use discovery::FileDiscovery;
pub use error::{Result, TallyError};
pub use parallel::{ExecutionStrategy, PoolConfig};

/// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
