//! JSON report generator

use serde_json::{Value, json};
use std::time::{SystemTime, UNIX_EPOCH};

use super::ReportGenerator;
use crate::benchmark::{Comparison, RunResult};
use crate::error::Result;

/// JSON report generator - machine-friendly format
pub struct JsonReportGenerator;

fn run_json(run: &RunResult) -> Value {
    json!({
        "strategy": run.strategy,
        "elapsed_ms": run.elapsed_ms() as u64,
        "distinct_tokens": run.table.len(),
        "total_tokens": run.table.total_tokens(),
        "tasks": run.tasks,
        "pool": run.pool,
    })
}

impl ReportGenerator for JsonReportGenerator {
    fn generate(&self, comparison: &Comparison, top: usize) -> Result<String> {
        let report = json!({
            "metadata": {
                "generated_at": SystemTime::now()
                    .duration_since(UNIX_EPOCH)
                    .unwrap_or_default()
                    .as_secs(),
                "wordtally_version": env!("CARGO_PKG_VERSION"),
            },
            "summary": {
                "directory": comparison.directory,
                "files_processed": comparison.file_count,
                "threads": comparison.threads,
                "speedup": comparison.speedup,
                "counts_match": comparison.counts_match(),
            },
            "runs": {
                "sequential": run_json(&comparison.sequential),
                "parallel": run_json(&comparison.parallel),
            },
            "top_tokens": comparison.parallel.table.top_k(top),
        });

        Ok(serde_json::to_string_pretty(&report)?)
    }
}
