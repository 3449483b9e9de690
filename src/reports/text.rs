use std::fmt::Write;

use super::ReportGenerator;
use crate::benchmark::Comparison;
use crate::error::Result;

/// Plain-text report, one ranked token per line
pub struct TextReportGenerator;

impl ReportGenerator for TextReportGenerator {
    fn generate(&self, comparison: &Comparison, top: usize) -> Result<String> {
        let directory = std::path::absolute(&comparison.directory)
            .unwrap_or_else(|_| comparison.directory.clone());

        let mut out = String::new();
        // Writing to a String cannot fail
        let _ = writeln!(out, "wordtally - Results");
        let _ = writeln!(out, "Directory: {}", directory.display());
        let _ = writeln!(out, "Files processed: {}", comparison.file_count);
        let _ = writeln!(out, "Threads used (parallel): {}", comparison.threads);
        let _ = writeln!(out, "Execution time (sequential): {} ms", comparison.sequential.elapsed_ms());
        let _ = writeln!(out, "Execution time (parallel): {} ms", comparison.parallel.elapsed_ms());
        let _ = writeln!(out, "Speedup (seq / par): {}", comparison.speedup);

        let failed = comparison.parallel.tasks.failed;
        if failed > 0 {
            let _ = writeln!(out, "Files failed: {failed}");
        }
        if !comparison.parallel.is_complete() {
            let _ = writeln!(
                out,
                "Parallel run incomplete: {} dropped, {} cancelled",
                comparison.parallel.pool.dropped, comparison.parallel.tasks.cancelled
            );
        }

        let _ = writeln!(out, "\nTop {top} keywords (by count):");
        for ranked in comparison.parallel.table.top_k(top) {
            let _ = writeln!(out, "{:>3}. {:<20} : {}", ranked.rank, ranked.token, ranked.count);
        }

        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reports::fixtures;

    #[test]
    fn test_text_report_contents() {
        let comparison = fixtures::comparison(&["the cat sat", "the dog sat"], 30, 10);
        let report = TextReportGenerator.generate(&comparison, 50).unwrap();

        assert!(report.contains("Files processed: 2"));
        assert!(report.contains("Threads used (parallel): 4"));
        assert!(report.contains("Execution time (sequential): 30 ms"));
        assert!(report.contains("Execution time (parallel): 10 ms"));
        assert!(report.contains("Speedup (seq / par): 3.00"));
        assert!(report.contains("Top 50 keywords (by count):"));
        assert!(report.contains("  1. the                  : 2"));
        assert!(report.contains("  2. sat                  : 2"));
        assert!(report.contains("  3. cat                  : 1"));
        assert!(report.contains("  4. dog                  : 1"));
        assert!(!report.contains("Files failed"));
    }

    #[test]
    fn test_text_report_limits_rows() {
        let comparison = fixtures::comparison(&["a b c d e f"], 1, 1);
        let report = TextReportGenerator.generate(&comparison, 2).unwrap();
        let rows = report.lines().filter(|line| line.contains(" : ")).count();
        assert_eq!(rows, 2);
    }

    #[test]
    fn test_text_report_zero_parallel_time() {
        let comparison = fixtures::comparison(&["a"], 3, 0);
        let report = TextReportGenerator.generate(&comparison, 5).unwrap();
        assert!(report.contains("Speedup (seq / par): n/a"));
    }
}
