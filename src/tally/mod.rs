//! Token counting core
//!
//! Tokenization produces a [`LocalFrequencyMap`] per file; every local map
//! is folded into a shared [`GlobalFrequencyMap`]; a run ends with a frozen
//! [`FrequencyTable`] that can be ranked.

pub mod frequency;
pub mod ranking;
pub mod task;
pub mod token;
pub mod tokenizer;

pub use frequency::{FrequencyTable, GlobalFrequencyMap, LocalFrequencyMap, Occurrence, TokenCount};
pub use ranking::RankedToken;
pub use task::{FileTask, TaskOutcome};
pub use token::Token;
pub use tokenizer::{tokenize_file, tokenize_str};
