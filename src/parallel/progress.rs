use indicatif::{MultiProgress, ProgressBar, ProgressStyle};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

/// Tokenization statistics tracked atomically across threads
#[derive(Debug, Default)]
pub struct TallyingStats {
    pub tokenized: AtomicUsize,
    pub failed: AtomicUsize,
}

impl TallyingStats {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn increment_tokenized(&self) {
        self.tokenized.fetch_add(1, Ordering::Relaxed);
    }

    pub fn increment_failed(&self) {
        self.failed.fetch_add(1, Ordering::Relaxed);
    }

    pub fn get_counts(&self) -> (usize, usize) {
        (
            self.tokenized.load(Ordering::Relaxed),
            self.failed.load(Ordering::Relaxed),
        )
    }
}

fn bar_style(template: &str) -> ProgressStyle {
    ProgressStyle::with_template(template)
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("█▉▊▋▌▍▎▏  ")
}

/// Progress display with an overall bar and, for parallel runs, one bar per worker
#[derive(Clone)]
pub struct TallyProgress {
    multi_progress: MultiProgress,
    overall_bar: ProgressBar,
    worker_bars: Vec<ProgressBar>,
    worker_counts: Arc<Vec<AtomicUsize>>,
    stats: Arc<TallyingStats>,
}

impl TallyProgress {
    /// Single overall bar for the sequential run
    pub fn sequential(total_files: usize) -> Self {
        Self::build(total_files, 0)
    }

    /// Overall bar plus one bar per worker
    pub fn parallel(total_files: usize, worker_count: usize) -> Self {
        Self::build(total_files, worker_count)
    }

    /// Progress reporter that draws nothing
    #[cfg(test)]
    pub(crate) fn hidden(total_files: usize) -> Self {
        let progress = Self::build(total_files, 0);
        progress
            .multi_progress
            .set_draw_target(indicatif::ProgressDrawTarget::hidden());
        progress
    }

    fn build(total_files: usize, worker_count: usize) -> Self {
        let multi_progress = MultiProgress::new();
        let worker_colors = ["cyan/blue", "green/yellow", "magenta/red", "yellow/blue"];

        let mut worker_bars = Vec::with_capacity(worker_count);
        for worker_id in 0..worker_count {
            let color = worker_colors[worker_id % worker_colors.len()];
            let template = format!(
                "[Worker {}] {{bar:30.{}}} {{pos:>5}} {{spinner}} {{msg}}",
                worker_id + 1,
                color
            );
            let estimated_per_worker = total_files / worker_count + 1;
            let bar = multi_progress.add(ProgressBar::new(estimated_per_worker as u64));
            bar.set_style(bar_style(&template));
            bar.enable_steady_tick(Duration::from_millis(120));
            worker_bars.push(bar);
        }

        let overall_bar = multi_progress.add(ProgressBar::new(total_files as u64));
        overall_bar.set_style(bar_style(
            "Overall:   [{elapsed_precise}] {bar:40.bright_white/dim} {pos:>7}/{len:7} files ({percent}%) {msg}",
        ));

        let worker_counts = (0..worker_count).map(|_| AtomicUsize::new(0)).collect();

        Self {
            multi_progress,
            overall_bar,
            worker_bars,
            worker_counts: Arc::new(worker_counts),
            stats: Arc::new(TallyingStats::new()),
        }
    }

    /// Show which file a worker picked up
    pub fn update_worker_file(&self, worker_id: usize, file_name: &str) {
        if let Some(worker_bar) = self.worker_bars.get(worker_id) {
            if let Some(worker_count) = self.worker_counts.get(worker_id) {
                let current_count = worker_count.fetch_add(1, Ordering::Relaxed) + 1;
                worker_bar.set_position(current_count as u64);
            }
            worker_bar.set_message(file_name.to_string());
        }
    }

    pub fn update_overall(&self, completed: usize) {
        self.overall_bar.set_position(completed as u64);
        let (tokenized, failed) = self.stats.get_counts();
        self.overall_bar
            .set_message(format!("Tokenized: {tokenized} | Failed: {failed}"));
    }

    pub fn stats(&self) -> Arc<TallyingStats> {
        self.stats.clone()
    }

    pub fn finish(&self) {
        for worker_bar in &self.worker_bars {
            worker_bar.finish();
        }
        self.overall_bar.finish();
        let _ = self.multi_progress.clear();
    }
}
