use clap::Parser;
use std::process::ExitCode;

use wordtally::cli::{Cli, Output};

fn main() -> ExitCode {
    let cli = Cli::parse();
    let quiet = cli.quiet;

    match cli.run() {
        Ok(code) => code,
        Err(e) => {
            Output::new(false, quiet).critical(&format!("{e:#}"));
            ExitCode::FAILURE
        }
    }
}
