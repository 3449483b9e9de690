//! Report generation
//!
//! Renders a [`Comparison`] with pluggable formats and persists it.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use crate::benchmark::Comparison;
use crate::error::{Result, TallyError};

mod json;
mod text;

pub use json::JsonReportGenerator;
pub use text::TextReportGenerator;

/// Core reporting trait - allows pluggable report formats
pub trait ReportGenerator {
    /// Render the comparison with the `top` most frequent tokens
    fn generate(&self, comparison: &Comparison, top: usize) -> Result<String>;
}

/// Persisted report format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum ReportFormat {
    Text,
    Json,
}

impl ReportFormat {
    pub fn generator(&self) -> Box<dyn ReportGenerator> {
        match self {
            ReportFormat::Text => Box::new(TextReportGenerator),
            ReportFormat::Json => Box::new(JsonReportGenerator),
        }
    }
}

/// Render `comparison` in `format` and write it to `path`
pub fn write_report(comparison: &Comparison, format: ReportFormat, top: usize, path: &Path) -> Result<()> {
    let content = format.generator().generate(comparison, top)?;
    fs::write(path, content).map_err(|source| TallyError::Report {
        path: path.to_path_buf(),
        source,
    })?;
    tracing::info!("Results written to {}", path.display());
    Ok(())
}


#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_write_report_to_disk() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("analysis_result.txt");
        let comparison = fixtures::comparison(&["the cat sat", "the dog sat"], 10, 5);

        write_report(&comparison, ReportFormat::Text, 50, &path).unwrap();
        let content = fs::read_to_string(&path).unwrap();
        assert!(content.contains("Files processed: 2"));
    }

    #[test]
    fn test_write_report_bad_path() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("missing").join("report.txt");
        let comparison = fixtures::comparison(&["x"], 1, 1);

        let err = write_report(&comparison, ReportFormat::Json, 5, &path).unwrap_err();
        assert!(matches!(err, TallyError::Report { .. }));
        assert!(!err.is_fatal());
    }
}
