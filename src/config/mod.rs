//! Configuration management for wordtally
//!
//! Settings are layered with figment (see [`TallyConfig::load`]) and then
//! extracted into the typed structures below.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

use crate::error::{Result, TallyError};
use crate::parallel::{ExecutionStrategy, PoolConfig};
use crate::reports::ReportFormat;

mod core;

pub use self::core::CliOverrides;

/// Main configuration structure for wordtally
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
#[serde(default)]
pub struct TallyConfig {
    pub discovery: DiscoveryConfig,
    pub pool: PoolSettings,
    pub report: ReportSettings,
    pub run: RunSettings,
}

/// Which files are picked up from the input directory
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct DiscoveryConfig {
    /// File extensions to include, matched case-insensitively
    pub extensions: Vec<String>,
}

/// Worker pool settings
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct PoolSettings {
    /// Worker threads for the parallel run (unset = host parallelism)
    pub threads: Option<usize>,

    /// Channel capacity per worker
    pub channel_buffer_multiplier: usize,

    /// How long to wait for workers after a shutdown request
    pub grace_period_ms: u64,

    /// Overall deadline for the parallel run
    pub timeout_secs: Option<u64>,
}

/// Report rendering settings
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ReportSettings {
    /// Tokens shown in the console summary
    pub console_top: usize,

    /// Tokens written to the persisted report
    pub report_top: usize,

    /// Persisted report location
    pub output: PathBuf,

    pub format: ReportFormat,

    /// Whether to write the persisted report at all
    pub write_report: bool,
}

/// Run behaviour
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(default)]
pub struct RunSettings {
    /// Treat a directory without matching files as a failure
    pub fail_on_empty: bool,

    /// Draw progress bars while tokenizing
    pub progress: bool,
}

impl Default for DiscoveryConfig {
    fn default() -> Self {
        Self {
            extensions: vec!["txt".to_string()],
        }
    }
}

impl Default for PoolSettings {
    fn default() -> Self {
        Self {
            threads: None,
            channel_buffer_multiplier: 2,
            grace_period_ms: 5000,
            timeout_secs: None,
        }
    }
}

impl Default for ReportSettings {
    fn default() -> Self {
        Self {
            console_top: 20,
            report_top: 50,
            output: PathBuf::from("analysis_result.txt"),
            format: ReportFormat::Text,
            write_report: true,
        }
    }
}

impl TallyConfig {
    /// Reject settings no run could honor
    pub fn validate(&self) -> Result<()> {
        if self.pool.threads == Some(0) {
            return Err(TallyError::config("Thread count must be a positive integer"));
        }
        if self.pool.channel_buffer_multiplier == 0 {
            return Err(TallyError::config("pool.channel_buffer_multiplier must be at least 1"));
        }
        if self.discovery.extensions.iter().all(|ext| ext.trim().is_empty()) {
            return Err(TallyError::config("discovery.extensions must name at least one extension"));
        }
        Ok(())
    }

    /// Worker count for the parallel run
    pub fn threads(&self) -> usize {
        self.pool
            .threads
            .unwrap_or_else(ExecutionStrategy::default_workers)
            .max(1)
    }

    pub fn pool_config(&self) -> PoolConfig {
        PoolConfig {
            workers: self.threads(),
            channel_buffer_multiplier: self.pool.channel_buffer_multiplier,
            grace_period: Duration::from_millis(self.pool.grace_period_ms),
            timeout: self.pool.timeout_secs.map(Duration::from_secs),
        }
    }
}
