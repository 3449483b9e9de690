//! Word tokenizer
//!
//! A token is a maximal run of ASCII word characters (`[A-Za-z0-9_]`),
//! lowercased. Everything else separates tokens.

use lazy_static::lazy_static;
use regex::Regex;
use std::fs::File;
use std::io::{BufRead, BufReader};

use super::frequency::LocalFrequencyMap;
use super::task::{FileTask, TaskOutcome};
use super::token::Token;
use crate::error::TallyError;
use crate::parallel::CancellationToken;

lazy_static! {
    static ref WORD: Regex = Regex::new(r"[A-Za-z0-9_]+").expect("word pattern is valid");
}

/// Iterate the normalized tokens of a piece of text in order
pub fn tokens(text: &str) -> impl Iterator<Item = Token> + '_ {
    WORD.find_iter(text)
        .filter_map(|word| Token::normalize(word.as_str()))
}

/// Count the tokens of in-memory text
pub fn tokenize_str(text: &str, file_index: usize) -> LocalFrequencyMap {
    let mut local = LocalFrequencyMap::new(file_index);
    for token in tokens(text) {
        local.record(token);
    }
    local
}

/// Count tokens line by line, checking for cancellation between lines.
///
/// Returns `Ok(None)` when cancelled before the input was exhausted.
pub fn tokenize_reader<R: BufRead>(
    reader: R,
    file_index: usize,
    cancel: &CancellationToken,
) -> std::io::Result<Option<LocalFrequencyMap>> {
    let mut local = LocalFrequencyMap::new(file_index);
    for line in reader.lines() {
        if cancel.is_cancelled() {
            return Ok(None);
        }
        for token in tokens(&line?) {
            local.record(token);
        }
    }
    Ok(Some(local))
}

/// Tokenize one discovered file.
///
/// Read and decode failures are reported for this file only; the handle is
/// dropped on every return path.
pub fn tokenize_file(task: &FileTask, cancel: &CancellationToken) -> TaskOutcome {
    if cancel.is_cancelled() {
        return TaskOutcome::Cancelled;
    }

    let file = match File::open(task.path()) {
        Ok(file) => file,
        Err(e) => return TaskOutcome::Failed(TallyError::file_read(task.path(), e)),
    };

    match tokenize_reader(BufReader::new(file), task.index(), cancel) {
        Ok(Some(local)) => TaskOutcome::Completed(local),
        Ok(None) => TaskOutcome::Cancelled,
        Err(e) => TaskOutcome::Failed(TallyError::file_read(task.path(), e)),
    }
}
