use crossbeam::channel::{Receiver, RecvTimeoutError, Sender, bounded};
use serde::Serialize;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use super::cancel::CancellationToken;
use crate::error::TallyError;

/// How often the collector wakes up to look for shutdown requests
const COLLECTOR_TICK: Duration = Duration::from_millis(25);

/// Settings for a bounded worker pool
#[derive(Debug, Clone)]
pub struct PoolConfig {
    /// Maximum concurrently running tasks (at least 1)
    pub workers: usize,
    /// Channel capacity = workers * multiplier
    pub channel_buffer_multiplier: usize,
    /// How long to wait for workers after a shutdown request
    pub grace_period: Duration,
    /// Overall deadline for the whole batch
    pub timeout: Option<Duration>,
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self {
            workers: ExecutionStrategy::default_workers(),
            channel_buffer_multiplier: 2,
            grace_period: Duration::from_secs(5),
            timeout: None,
        }
    }
}

/// What happened to a batch of work items
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PoolStats {
    /// Threads that actually ran (0 for sequential execution)
    pub workers: usize,
    pub submitted: usize,
    /// Items whose result reached the collector
    pub finished: usize,
    /// Items never started, or whose result was lost
    pub dropped: usize,
    /// A shutdown was requested before the batch drained
    pub shutdown_requested: bool,
    /// The shutdown came from the pool deadline
    pub timed_out: bool,
    /// Workers abandoned after the grace period ran out
    pub detached_workers: usize,
    pub panicked_workers: usize,
}

impl PoolStats {
    fn new(submitted: usize) -> Self {
        Self {
            submitted,
            ..Self::default()
        }
    }

    fn settle(mut self) -> Self {
        self.dropped = self.submitted.saturating_sub(self.finished);
        self
    }
}

/// Bounded pool of named worker threads fed by a producer over crossbeam channels.
///
/// Results are delivered to the caller's thread one at a time, so whatever
/// the caller does with them needs no extra synchronization.
pub struct WorkerPool {
    config: PoolConfig,
}

/// Context for worker threads to avoid too many function parameters
struct WorkerContext<T, R, F, P> {
    worker_id: usize,
    work_rx: Receiver<T>,
    result_tx: Sender<R>,
    progress_counter: Arc<AtomicUsize>,
    total_items: usize,
    processor: Arc<F>,
    progress_reporter: Option<Arc<P>>,
    cancel: CancellationToken,
}

enum CollectorExit {
    Drained,
    Shutdown,
}

impl WorkerPool {
    pub fn new(config: PoolConfig) -> Self {
        Self { config }
    }

    pub fn workers(&self) -> usize {
        self.config.workers.max(1)
    }

    /// Run every work item through `processor` on at most `workers` threads.
    ///
    /// Blocks until each item has settled or a shutdown request has been
    /// honored. `on_result` runs on the calling thread for every finished
    /// item, in completion order.
    pub fn execute<T, R, F, P, C>(
        &self,
        work_items: Vec<T>,
        processor: F,
        progress_reporter: Option<P>,
        cancel: &CancellationToken,
        mut on_result: C,
    ) -> PoolStats
    where
        T: Send + 'static,
        R: Send + 'static,
        F: Fn(&T, usize) -> R + Send + Sync + 'static,
        P: Fn(usize, usize, usize) + Send + Sync + 'static,
        C: FnMut(R),
    {
        let total_items = work_items.len();
        let mut stats = PoolStats::new(total_items);
        if total_items == 0 {
            return stats;
        }

        let actual_workers = std::cmp::min(self.workers(), total_items);
        let buffer_size = actual_workers * self.config.channel_buffer_multiplier.max(1);
        let (work_tx, work_rx): (Sender<T>, Receiver<T>) = bounded(buffer_size);
        let (result_tx, result_rx): (Sender<R>, Receiver<R>) = bounded(buffer_size);

        let progress_counter = Arc::new(AtomicUsize::new(0));
        let processor = Arc::new(processor);
        let progress_reporter = progress_reporter.map(Arc::new);

        let mut workers: Vec<JoinHandle<()>> = Vec::with_capacity(actual_workers);
        for worker_id in 0..actual_workers {
            let ctx = WorkerContext {
                worker_id,
                work_rx: work_rx.clone(),
                result_tx: result_tx.clone(),
                progress_counter: progress_counter.clone(),
                total_items,
                processor: processor.clone(),
                progress_reporter: progress_reporter.clone(),
                cancel: cancel.clone(),
            };

            match thread::Builder::new()
                .name(format!("wordtally-worker-{worker_id}"))
                .spawn(move || worker_thread(ctx))
            {
                Ok(handle) => workers.push(handle),
                Err(e) => {
                    tracing::warn!("Could not spawn worker {}: {}", worker_id, e);
                    break;
                }
            }
        }

        if workers.is_empty() {
            tracing::warn!("No worker threads available, processing {} items inline", total_items);
            drop(work_rx);
            drop(result_tx);
            let processor = |item: &T, worker_id: usize| processor(item, worker_id);
            let progress_reporter = progress_reporter.map(|reporter| {
                move |current: usize, total: usize, worker_id: usize| reporter(current, total, worker_id)
            });
            return SequentialExecutor::execute(work_items, processor, progress_reporter, cancel, on_result);
        }
        stats.workers = workers.len();

        // Producer thread: send work to workers until told to stop
        let producer_cancel = cancel.clone();
        let producer = thread::Builder::new()
            .name("wordtally-producer".to_string())
            .spawn(move || {
                for work_item in work_items {
                    if producer_cancel.is_cancelled() {
                        break;
                    }
                    if work_tx.send(work_item).is_err() {
                        break; // Workers dropped
                    }
                }
            });
        let producer = match producer {
            Ok(handle) => Some(handle),
            Err(e) => {
                // The closure (and the work sender) is gone, so workers see a closed queue
                tracing::warn!("Could not spawn producer thread: {}", e);
                None
            }
        };

        // Drop our copies so the channels close when the threads finish
        drop(work_rx);
        drop(result_tx);

        let deadline = self.config.timeout.map(|timeout| Instant::now() + timeout);
        let exit = collect_until_shutdown(&result_rx, cancel, deadline, &mut stats, &mut on_result);

        if let CollectorExit::Shutdown = exit {
            stats.shutdown_requested = true;
            let grace_deadline = Instant::now() + self.config.grace_period;
            loop {
                match result_rx.recv_deadline(grace_deadline) {
                    Ok(result) => {
                        stats.finished += 1;
                        on_result(result);
                    }
                    Err(RecvTimeoutError::Disconnected) => break,
                    Err(RecvTimeoutError::Timeout) => {
                        let remaining = workers.iter().filter(|handle| !handle.is_finished()).count();
                        if remaining > 0 {
                            stats.detached_workers = remaining;
                            let warning = TallyError::PoolShutdownTimeout {
                                remaining,
                                grace: self.config.grace_period,
                            };
                            tracing::warn!("{}", warning);
                        }
                        break;
                    }
                }
            }
        }

        for handle in workers {
            if handle.is_finished() || stats.detached_workers == 0 {
                if handle.join().is_err() {
                    stats.panicked_workers += 1;
                    tracing::error!("A worker thread panicked");
                }
            }
            // Otherwise the handle is dropped and the thread detached
        }
        if let Some(handle) = producer
            && (handle.is_finished() || stats.detached_workers == 0)
        {
            let _ = handle.join();
        }

        stats.settle()
    }
}

fn collect_until_shutdown<R, C>(
    result_rx: &Receiver<R>,
    cancel: &CancellationToken,
    deadline: Option<Instant>,
    stats: &mut PoolStats,
    on_result: &mut C,
) -> CollectorExit
where
    C: FnMut(R),
{
    loop {
        if cancel.is_cancelled() {
            tracing::debug!("Shutdown requested, stopping collection");
            return CollectorExit::Shutdown;
        }

        let mut wait = COLLECTOR_TICK;
        if let Some(deadline) = deadline {
            let left = deadline.saturating_duration_since(Instant::now());
            if left.is_zero() {
                tracing::warn!(
                    "Pool deadline reached with {}/{} items finished, cancelling",
                    stats.finished,
                    stats.submitted
                );
                stats.timed_out = true;
                cancel.cancel();
                return CollectorExit::Shutdown;
            }
            wait = wait.min(left);
        }

        match result_rx.recv_timeout(wait) {
            Ok(result) => {
                stats.finished += 1;
                on_result(result);
            }
            Err(RecvTimeoutError::Timeout) => continue,
            Err(RecvTimeoutError::Disconnected) => return CollectorExit::Drained,
        }
    }
}

fn worker_thread<T, R, F, P>(ctx: WorkerContext<T, R, F, P>)
where
    F: Fn(&T, usize) -> R,
    P: Fn(usize, usize, usize),
{
    while let Ok(work_item) = ctx.work_rx.recv() {
        if ctx.cancel.is_cancelled() {
            break; // Queued items are dropped
        }

        let result = (ctx.processor)(&work_item, ctx.worker_id);

        if ctx.result_tx.send(result).is_err() {
            break; // Receiver dropped
        }

        let current = ctx.progress_counter.fetch_add(1, Ordering::Relaxed) + 1;
        if let Some(ref reporter) = ctx.progress_reporter {
            reporter(current, ctx.total_items, ctx.worker_id);
        }
    }
}

/// Single-threaded execution on the caller's thread, in input order
pub struct SequentialExecutor;

impl SequentialExecutor {
    pub fn execute<T, R, F, P, C>(
        work_items: Vec<T>,
        processor: F,
        progress_reporter: Option<P>,
        cancel: &CancellationToken,
        mut on_result: C,
    ) -> PoolStats
    where
        F: Fn(&T, usize) -> R,
        P: Fn(usize, usize, usize),
        C: FnMut(R),
    {
        let total_items = work_items.len();
        let mut stats = PoolStats::new(total_items);

        for (index, work_item) in work_items.iter().enumerate() {
            if cancel.is_cancelled() {
                stats.shutdown_requested = true;
                break;
            }

            on_result(processor(work_item, 0)); // Sequential uses worker_id 0
            stats.finished += 1;

            if let Some(reporter) = &progress_reporter {
                reporter(index + 1, total_items, 0);
            }
        }

        stats.settle()
    }
}

/// Execution strategy enum for choosing between parallel and sequential
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "mode", rename_all = "lowercase")]
pub enum ExecutionStrategy {
    Sequential,
    Parallel { workers: usize },
}

impl ExecutionStrategy {
    pub fn execute<T, R, F, P, C>(
        &self,
        config: &PoolConfig,
        work_items: Vec<T>,
        processor: F,
        progress_reporter: Option<P>,
        cancel: &CancellationToken,
        on_result: C,
    ) -> PoolStats
    where
        T: Send + 'static,
        R: Send + 'static,
        F: Fn(&T, usize) -> R + Send + Sync + 'static,
        P: Fn(usize, usize, usize) + Send + Sync + 'static,
        C: FnMut(R),
    {
        match self {
            ExecutionStrategy::Sequential => {
                SequentialExecutor::execute(work_items, processor, progress_reporter, cancel, on_result)
            }
            ExecutionStrategy::Parallel { workers } => {
                let pool = WorkerPool::new(PoolConfig {
                    workers: *workers,
                    ..config.clone()
                });
                pool.execute(work_items, processor, progress_reporter, cancel, on_result)
            }
        }
    }

    /// Number of threads this strategy runs on
    pub fn workers(&self) -> usize {
        match self {
            ExecutionStrategy::Sequential => 1,
            ExecutionStrategy::Parallel { workers } => (*workers).max(1),
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            ExecutionStrategy::Sequential => "sequential",
            ExecutionStrategy::Parallel { .. } => "parallel",
        }
    }

    /// Host parallelism, never less than one
    pub fn default_workers() -> usize {
        std::cmp::max(1, num_cpus::get())
    }
}
