//! Sequential vs parallel benchmark driver
//!
//! A [`Benchmark`] walks a fixed set of states:
//!
//! ```text
//! Idle → Discovering → RunningSequential → RunningParallel → Reporting → Done
//! ```
//!
//! Each step may only move to the next state. The global frequency map is
//! cleared at the start of both runs, so the two results are independent.

use serde::Serialize;
use std::fmt;
use std::path::Path;
use std::time::Instant;

use super::result::{Comparison, RunResult, TaskStats};
use crate::discovery::FileDiscovery;
use crate::error::{Result, TallyError};
use crate::parallel::{CancellationToken, ExecutionStrategy, PoolConfig, TallyProgress};
use crate::tally::{FileTask, GlobalFrequencyMap, TaskOutcome, tokenize_file};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum HarnessState {
    Idle,
    Discovering,
    RunningSequential,
    RunningParallel,
    Reporting,
    Done,
}

impl HarnessState {
    /// The only state this one may move to
    pub fn successor(self) -> Option<HarnessState> {
        match self {
            HarnessState::Idle => Some(HarnessState::Discovering),
            HarnessState::Discovering => Some(HarnessState::RunningSequential),
            HarnessState::RunningSequential => Some(HarnessState::RunningParallel),
            HarnessState::RunningParallel => Some(HarnessState::Reporting),
            HarnessState::Reporting => Some(HarnessState::Done),
            HarnessState::Done => None,
        }
    }
}

impl fmt::Display for HarnessState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

pub struct Benchmark {
    state: HarnessState,
    discovery: FileDiscovery,
    pool: PoolConfig,
    progress: bool,
    global: GlobalFrequencyMap,
    cancel: CancellationToken,
}

impl Benchmark {
    pub fn new(discovery: FileDiscovery, pool: PoolConfig) -> Self {
        Self {
            state: HarnessState::Idle,
            discovery,
            pool,
            progress: false,
            global: GlobalFrequencyMap::new(),
            cancel: CancellationToken::new(),
        }
    }

    /// Draw progress bars during both runs
    pub fn with_progress(mut self, progress: bool) -> Self {
        self.progress = progress;
        self
    }

    pub fn state(&self) -> HarnessState {
        self.state
    }

    pub fn threads(&self) -> usize {
        self.pool.workers.max(1)
    }

    /// Token that shuts the parallel run down when cancelled
    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    fn advance(&mut self, next: HarnessState) -> Result<()> {
        if self.state.successor() != Some(next) {
            return Err(TallyError::config(format!(
                "Invalid benchmark transition {} -> {}",
                self.state, next
            )));
        }
        tracing::info!("Benchmark state: {} -> {}", self.state, next);
        self.state = next;
        Ok(())
    }

    /// Run every step up to `Reporting` and return the comparison
    pub fn run(&mut self, directory: &Path) -> Result<Comparison> {
        let tasks = self.discover(directory)?;
        let sequential = self.run_sequential(&tasks)?;
        let parallel = self.run_parallel(&tasks)?;
        self.compare(directory, &tasks, sequential, parallel)
    }

    /// Discover the input files. A bad directory is fatal.
    pub fn discover(&mut self, directory: &Path) -> Result<Vec<FileTask>> {
        self.advance(HarnessState::Discovering)?;
        let tasks = self.discovery.discover(directory)?;
        tracing::info!("Discovered {} files to process", tasks.len());
        Ok(tasks)
    }

    /// Tokenize files one after another in discovery order, merging each immediately
    pub fn run_sequential(&mut self, tasks: &[FileTask]) -> Result<RunResult> {
        self.advance(HarnessState::RunningSequential)?;
        self.execute(ExecutionStrategy::Sequential, tasks)
    }

    /// Tokenize files on the worker pool and merge results as they arrive
    pub fn run_parallel(&mut self, tasks: &[FileTask]) -> Result<RunResult> {
        self.advance(HarnessState::RunningParallel)?;
        let strategy = ExecutionStrategy::Parallel {
            workers: self.threads(),
        };
        self.execute(strategy, tasks)
    }

    /// Pair the two runs up and enter `Reporting`
    pub fn compare(
        &mut self,
        directory: &Path,
        tasks: &[FileTask],
        sequential: RunResult,
        parallel: RunResult,
    ) -> Result<Comparison> {
        self.advance(HarnessState::Reporting)?;
        let comparison = Comparison::new(
            directory.to_path_buf(),
            tasks.len(),
            self.threads(),
            sequential,
            parallel,
        );

        if comparison.parallel.is_complete() && !comparison.counts_match() {
            tracing::error!("Sequential and parallel counts differ");
        }
        tracing::info!(
            "Sequential {} ms, parallel {} ms, speedup {}",
            comparison.sequential.elapsed_ms(),
            comparison.parallel.elapsed_ms(),
            comparison.speedup
        );
        Ok(comparison)
    }

    /// Mark reporting as finished
    pub fn complete(&mut self) -> Result<()> {
        self.advance(HarnessState::Done)
    }

    fn execute(&mut self, strategy: ExecutionStrategy, tasks: &[FileTask]) -> Result<RunResult> {
        self.global.clear();

        let progress = self.progress.then(|| match strategy {
            ExecutionStrategy::Sequential => TallyProgress::sequential(tasks.len()),
            ExecutionStrategy::Parallel { workers } => {
                TallyProgress::parallel(tasks.len(), workers.min(tasks.len()))
            }
        });

        let cancel = self.cancel.clone();
        let label = strategy.label();
        let worker_progress = progress.clone();
        let processor = move |task: &FileTask, worker_id: usize| {
            tracing::debug!("[{}] worker-{} -> processing {}", label, worker_id, task.display_name());
            if let Some(progress) = &worker_progress {
                progress.update_worker_file(worker_id, &task.display_name());
            }
            tokenize_file(task, &cancel)
        };
        let overall_progress = progress.clone();
        let reporter = overall_progress
            .map(|progress| move |current: usize, _total: usize, _worker_id: usize| progress.update_overall(current));

        let global = &self.global;
        let progress_stats = progress.as_ref().map(TallyProgress::stats);
        let mut task_stats = TaskStats::default();

        let start = Instant::now();
        let pool_stats = strategy.execute(
            &self.pool,
            tasks.to_vec(),
            processor,
            reporter,
            &self.cancel,
            |outcome: TaskOutcome| match outcome {
                TaskOutcome::Completed(local) => {
                    task_stats.completed += 1;
                    if let Some(stats) = &progress_stats {
                        stats.increment_tokenized();
                    }
                    global.merge(local);
                }
                TaskOutcome::Failed(error) => {
                    task_stats.failed += 1;
                    if let Some(stats) = &progress_stats {
                        stats.increment_failed();
                    }
                    tracing::warn!("[{}] {}", label, error);
                }
                TaskOutcome::Cancelled => task_stats.cancelled += 1,
            },
        );
        let elapsed = start.elapsed();

        if let Some(progress) = &progress {
            progress.finish();
        }

        if pool_stats.shutdown_requested {
            tracing::warn!(
                "[{}] run cut short: {} finished, {} dropped, {} cancelled",
                label,
                pool_stats.finished,
                pool_stats.dropped,
                task_stats.cancelled
            );
        }
        tracing::info!(
            "[{}] {} files in {} ms ({} failed)",
            label,
            task_stats.completed,
            elapsed.as_millis(),
            task_stats.failed
        );

        Ok(RunResult {
            strategy,
            elapsed,
            table: self.global.snapshot(),
            tasks: task_stats,
            pool: pool_stats,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::fs;
    use std::time::Duration;
    use tempfile::TempDir;

    fn benchmark(workers: usize) -> Benchmark {
        Benchmark::new(
            FileDiscovery::default(),
            PoolConfig {
                workers,
                ..PoolConfig::default()
            },
        )
    }

    fn write_files(dir: &Path, contents: &[&str]) {
        for (index, content) in contents.iter().enumerate() {
            fs::write(dir.join(format!("file{index:03}.txt")), content).unwrap();
        }
    }

    fn expected(pairs: &[(&str, u64)]) -> HashMap<String, u64> {
        pairs.iter().map(|(k, v)| (k.to_string(), *v)).collect()
    }

    #[test]
    fn test_the_cat_and_the_dog() {
        let temp_dir = TempDir::new().unwrap();
        write_files(temp_dir.path(), &["the cat sat", "the dog sat"]);

        let mut bench = benchmark(2);
        let comparison = bench.run(temp_dir.path()).unwrap();

        let want = expected(&[("the", 2), ("cat", 1), ("sat", 2), ("dog", 1)]);
        assert_eq!(comparison.sequential.table.counts(), want);
        assert_eq!(comparison.parallel.table.counts(), want);
        assert_eq!(comparison.file_count, 2);
        assert_eq!(bench.state(), HarnessState::Reporting);

        bench.complete().unwrap();
        assert_eq!(bench.state(), HarnessState::Done);
    }

    #[test]
    fn test_worker_count_never_changes_counts() {
        let temp_dir = TempDir::new().unwrap();
        let contents: Vec<String> = (0..24)
            .map(|i| format!("Alpha beta{} GAMMA, alpha; delta_{} beta{}\nline two {}", i % 3, i % 5, i % 3, i))
            .collect();
        let refs: Vec<&str> = contents.iter().map(String::as_str).collect();
        write_files(temp_dir.path(), &refs);

        let baseline = benchmark(1).run(temp_dir.path()).unwrap();
        assert!(baseline.counts_match());

        for workers in [2, 3, 8] {
            let comparison = benchmark(workers).run(temp_dir.path()).unwrap();
            assert!(comparison.counts_match());
            assert_eq!(comparison.parallel.table, baseline.parallel.table);
            assert_eq!(comparison.sequential.table, baseline.sequential.table);
        }
    }

    #[test]
    fn test_empty_directory_produces_empty_results() {
        let temp_dir = TempDir::new().unwrap();
        let comparison = benchmark(4).run(temp_dir.path()).unwrap();

        assert_eq!(comparison.file_count, 0);
        assert!(comparison.sequential.table.is_empty());
        assert!(comparison.parallel.table.is_empty());
        assert!(comparison.parallel.table.top_k(20).is_empty());
    }

    #[test]
    fn test_empty_file_list_still_reaches_done() {
        let temp_dir = TempDir::new().unwrap();
        let mut bench = benchmark(4);

        let tasks = bench.discover(temp_dir.path()).unwrap();
        assert!(tasks.is_empty());
        let sequential = bench.run_sequential(&tasks).unwrap();
        let parallel = bench.run_parallel(&tasks).unwrap();
        assert_eq!(parallel.pool.submitted, 0);
        assert!(parallel.is_complete());

        bench.compare(temp_dir.path(), &tasks, sequential, parallel).unwrap();
        bench.complete().unwrap();
        assert_eq!(bench.state(), HarnessState::Done);
    }

    #[test]
    fn test_unreadable_file_contributes_nothing() {
        let temp_dir = TempDir::new().unwrap();
        write_files(temp_dir.path(), &["good words here", "more good words"]);
        fs::write(temp_dir.path().join("file001b.txt"), [0xff, 0xfe, 0x41]).unwrap();

        let comparison = benchmark(3).run(temp_dir.path()).unwrap();

        assert_eq!(comparison.file_count, 3);
        assert_eq!(comparison.sequential.tasks.failed, 1);
        assert_eq!(comparison.parallel.tasks.failed, 1);
        assert_eq!(comparison.parallel.tasks.completed, 2);
        assert_eq!(comparison.parallel.table.get("good"), Some(2));
        assert_eq!(comparison.parallel.table.get("words"), Some(2));
        assert!(comparison.counts_match());
    }

    #[test]
    fn test_missing_directory_halts_before_running() {
        let temp_dir = TempDir::new().unwrap();
        let mut bench = benchmark(2);

        let err = bench.run(&temp_dir.path().join("missing")).unwrap_err();
        assert!(err.is_fatal());
        assert_eq!(bench.state(), HarnessState::Discovering);
    }

    #[test]
    fn test_states_cannot_be_skipped() {
        let mut bench = benchmark(2);
        assert!(bench.run_parallel(&[]).is_err());
        assert!(bench.complete().is_err());
        assert_eq!(bench.state(), HarnessState::Idle);

        let temp_dir = TempDir::new().unwrap();
        bench.discover(temp_dir.path()).unwrap();
        assert!(bench.run_parallel(&[]).is_err());
        bench.run_sequential(&[]).unwrap();
        bench.run_parallel(&[]).unwrap();
        assert_eq!(bench.state(), HarnessState::RunningParallel);
    }

    #[test]
    fn test_cancelled_parallel_run_still_returns() {
        let temp_dir = TempDir::new().unwrap();
        write_files(temp_dir.path(), &["a b", "c d", "e f"]);

        let mut bench = Benchmark::new(
            FileDiscovery::default(),
            PoolConfig {
                workers: 2,
                grace_period: Duration::from_millis(200),
                ..PoolConfig::default()
            },
        );
        let tasks = bench.discover(temp_dir.path()).unwrap();
        let sequential = bench.run_sequential(&tasks).unwrap();
        assert_eq!(sequential.table.len(), 6);

        bench.cancellation_token().cancel();
        let parallel = bench.run_parallel(&tasks).unwrap();

        assert!(parallel.pool.shutdown_requested);
        assert!(!parallel.is_complete());
        assert!(parallel.table.is_empty());
        assert_eq!(parallel.tasks.completed, 0);
        assert_eq!(parallel.pool.finished + parallel.pool.dropped, 3);

        let comparison = bench.compare(temp_dir.path(), &tasks, sequential, parallel).unwrap();
        assert_eq!(comparison.file_count, 3);
    }

    #[test]
    fn test_state_successors() {
        let mut state = HarnessState::Idle;
        let mut visited = vec![state];
        while let Some(next) = state.successor() {
            visited.push(next);
            state = next;
        }
        assert_eq!(
            visited,
            vec![
                HarnessState::Idle,
                HarnessState::Discovering,
                HarnessState::RunningSequential,
                HarnessState::RunningParallel,
                HarnessState::Reporting,
                HarnessState::Done,
            ]
        );
    }
}
