//! Styled console output
//!
//! Consistent symbols and colors for the CLI. Everything except errors is
//! suppressed in quiet mode.

use console::style;

use crate::benchmark::Comparison;
use crate::tally::RankedToken;

/// Output handler for consistent CLI formatting
pub struct Output {
    verbose: bool,
    quiet: bool,
}

impl Output {
    pub fn new(verbose: bool, quiet: bool) -> Self {
        Self { verbose, quiet }
    }

    pub fn success(&self, message: &str) {
        if !self.quiet {
            println!("{} {}", style("✔").green(), message);
        }
    }

    /// Errors are always shown, even in quiet mode
    pub fn error(&self, message: &str) {
        eprintln!("{} {}", style("✖").red(), message);
    }

    pub fn warning(&self, message: &str) {
        if !self.quiet {
            println!("{} {}", style("⚠").yellow(), message);
        }
    }

    pub fn info(&self, message: &str) {
        if !self.quiet {
            println!("{} {}", style("ℹ").blue(), message);
        }
    }

    /// Only printed with `-v`
    pub fn verbose(&self, message: &str) {
        if self.verbose && !self.quiet {
            println!("{} {}", style("ℹ").dim(), style(message).dim());
        }
    }

    pub fn section_header(&self, title: &str) {
        if !self.quiet {
            println!("\n{}", style(title).bold().cyan());
        }
    }

    pub fn key_value(&self, key: &str, value: &str, highlight: bool) {
        if !self.quiet {
            let styled_value = if highlight {
                style(value).green().bold()
            } else {
                style(value).white()
            };
            println!("  {} {}", style(key).dim(), styled_value);
        }
    }

    /// Print a critical error with enhanced styling
    pub fn critical(&self, message: &str) {
        eprintln!("{} {}", style("✖").red().bold(), style(message).red().bold());
    }

    pub fn ranked_token(&self, ranked: &RankedToken) {
        if !self.quiet {
            println!(
                "{}. {:<20} : {}",
                style(format!("{:>3}", ranked.rank)).dim(),
                ranked.token,
                style(ranked.count).yellow().bold()
            );
        }
    }

    /// Timing comparison plus the top `top` tokens of the parallel run
    pub fn summary(&self, comparison: &Comparison, top: usize) {
        if self.quiet {
            return;
        }

        self.section_header("Summary");
        self.key_value("Files processed:", &comparison.file_count.to_string(), false);
        self.key_value("Threads used:", &comparison.threads.to_string(), false);
        self.key_value(
            "Sequential:",
            &format!("{} ms", comparison.sequential.elapsed_ms()),
            false,
        );
        self.key_value(
            "Parallel:",
            &format!("{} ms", comparison.parallel.elapsed_ms()),
            false,
        );
        self.key_value("Speedup (seq / par):", &comparison.speedup.to_string(), true);

        let failed = comparison.parallel.tasks.failed;
        if failed > 0 {
            self.warning(&format!("{failed} file(s) could not be read and were skipped"));
        }
        if !comparison.parallel.is_complete() {
            self.warning(&format!(
                "Parallel run was cut short: {} dropped, {} cancelled",
                comparison.parallel.pool.dropped, comparison.parallel.tasks.cancelled
            ));
        }

        self.section_header(&format!("--- TOP {top} KEYWORDS ---"));
        for ranked in comparison.parallel.table.top_k(top) {
            self.ranked_token(&ranked);
        }
    }
}
