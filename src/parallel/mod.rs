//! Generic parallel execution framework
//!
//! This module knows about threads, channels and shutdown, and nothing about
//! words or files. Callers hand it a batch of work items plus a processor and
//! receive each result back on their own thread.
//!
//! # Architecture
//!
//! ```text
//! ┌────────────┐  bounded   ┌────────────┐  bounded   ┌──────────────┐
//! │  Producer  │──channel──▶│  Workers   │──channel──▶│  Collector   │
//! │  (thread)  │            │ (N threads)│            │(caller thread)│
//! └────────────┘            └────────────┘            └──────────────┘
//!        ▲                        ▲                          │
//!        └──────── CancellationToken (shared) ◀──────────────┘
//!                                              timeout / shutdown
//! ```
//!
//! - At most `workers` items are processed at once
//! - The collector hands results to the caller as they arrive
//! - On shutdown the producer stops, queued items are dropped, workers stop
//!   after their current item, and the collector waits a bounded grace period
//!   before detaching anything still running
//!
//! # Example
//!
//! ```rust
//! use wordtally::parallel::{CancellationToken, ExecutionStrategy, PoolConfig};
//!
//! let mut total = 0;
//! let stats = ExecutionStrategy::Parallel { workers: 4 }.execute(
//!     &PoolConfig::default(),
//!     vec![1, 2, 3, 4],
//!     |x: &i32, _worker_id| x * 10,
//!     None::<fn(usize, usize, usize)>,
//!     &CancellationToken::new(),
//!     |r| total += r,
//! );
//! assert_eq!(total, 100);
//! assert_eq!(stats.finished, 4);
//! ```

pub mod cancel;
pub mod core;
pub mod progress;

pub use cancel::CancellationToken;
pub use self::core::{ExecutionStrategy, PoolConfig, PoolStats, SequentialExecutor, WorkerPool};
pub use progress::TallyProgress;
