//! Frequency maps
//!
//! Three shapes of the same token -> count table:
//!
//! - [`LocalFrequencyMap`]: owned by exactly one task while it tokenizes a file
//! - [`GlobalFrequencyMap`]: shared by every task of a run, written only via [`GlobalFrequencyMap::merge`]
//! - [`FrequencyTable`]: frozen snapshot of the global map handed to reporting
//!
//! Every entry remembers where its token was first seen. Merging keeps the
//! earliest position, so the global table ends up identical no matter which
//! order tasks complete in.

use dashmap::DashMap;
use serde::Serialize;
use std::collections::HashMap;

use super::ranking::{self, RankedToken};
use super::token::Token;

/// Position of a token occurrence in discovery order
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct Occurrence {
    /// Index of the file in the discovered file list
    pub file_index: usize,
    /// Token ordinal within that file
    pub offset: usize,
}

/// Count of a token plus its earliest occurrence
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TokenCount {
    pub count: u64,
    pub first_seen: Occurrence,
}

impl TokenCount {
    pub fn new(count: u64, first_seen: Occurrence) -> Self {
        Self { count, first_seen }
    }

    /// Fold another contribution for the same token into this one
    pub fn absorb(&mut self, other: TokenCount) {
        self.count += other.count;
        self.first_seen = self.first_seen.min(other.first_seen);
    }
}

/// Per-task frequency map, never shared between threads
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocalFrequencyMap {
    file_index: usize,
    next_offset: usize,
    entries: HashMap<Token, TokenCount>,
}

impl LocalFrequencyMap {
    pub fn new(file_index: usize) -> Self {
        Self {
            file_index,
            next_offset: 0,
            entries: HashMap::new(),
        }
    }

    /// Count one occurrence of `token` at the next position in the file
    pub fn record(&mut self, token: Token) {
        let occurrence = Occurrence {
            file_index: self.file_index,
            offset: self.next_offset,
        };
        self.next_offset += 1;
        self.entries
            .entry(token)
            .and_modify(|entry| entry.count += 1)
            .or_insert(TokenCount::new(1, occurrence));
    }

    pub fn file_index(&self) -> usize {
        self.file_index
    }

    pub fn get(&self, token: &str) -> Option<u64> {
        self.entries.get(token).map(|entry| entry.count)
    }

    /// Number of distinct tokens
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Number of token occurrences recorded
    pub fn total_tokens(&self) -> u64 {
        self.next_offset as u64
    }

    pub fn iter(&self) -> impl Iterator<Item = (&Token, &TokenCount)> {
        self.entries.iter()
    }

    pub fn into_entries(self) -> impl Iterator<Item = (Token, TokenCount)> {
        self.entries.into_iter()
    }
}

/// Run-scoped table every task merges into
///
/// Backed by a sharded concurrent map, so `merge` can be called from any
/// number of threads at once without lost updates.
#[derive(Debug, Default)]
pub struct GlobalFrequencyMap {
    entries: DashMap<Token, TokenCount>,
}

impl GlobalFrequencyMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fold a local map in: `global[token] += count` for every entry
    pub fn merge(&self, local: LocalFrequencyMap) {
        for (token, contribution) in local.into_entries() {
            self.entries
                .entry(token)
                .and_modify(|entry| entry.absorb(contribution))
                .or_insert(contribution);
        }
    }

    /// Reset before a fresh run. Takes `&mut self` so no merge can be in flight.
    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn get(&self, token: &str) -> Option<u64> {
        self.entries.get(token).map(|entry| entry.count)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Copy the current contents into an immutable table
    pub fn snapshot(&self) -> FrequencyTable {
        let entries = self
            .entries
            .iter()
            .map(|entry| (entry.key().clone(), *entry.value()))
            .collect();
        FrequencyTable { entries }
    }
}

/// Immutable result of one run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FrequencyTable {
    entries: HashMap<Token, TokenCount>,
}

impl FrequencyTable {
    pub fn get(&self, token: &str) -> Option<u64> {
        self.entries.get(token).map(|entry| entry.count)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn total_tokens(&self) -> u64 {
        self.entries.values().map(|entry| entry.count).sum()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&Token, &TokenCount)> {
        self.entries.iter()
    }

    /// Plain token -> count view, ignoring first-seen positions
    pub fn counts(&self) -> HashMap<String, u64> {
        self.entries
            .iter()
            .map(|(token, entry)| (token.as_str().to_string(), entry.count))
            .collect()
    }

    /// The `k` most frequent tokens, ties in discovery order
    pub fn top_k(&self, k: usize) -> Vec<RankedToken> {
        ranking::top_k(self.iter(), k)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::thread;

    fn local(file_index: usize, words: &[&str]) -> LocalFrequencyMap {
        let mut map = LocalFrequencyMap::new(file_index);
        for word in words {
            map.record(Token::normalize(word).unwrap());
        }
        map
    }

    #[test]
    fn test_local_record_accumulates() {
        let map = local(0, &["the", "cat", "the"]);
        assert_eq!(map.get("the"), Some(2));
        assert_eq!(map.get("cat"), Some(1));
        assert_eq!(map.len(), 2);
        assert_eq!(map.total_tokens(), 3);
    }

    #[test]
    fn test_local_keeps_first_occurrence() {
        let map = local(3, &["a", "b", "a"]);
        let first: HashMap<_, _> = map
            .iter()
            .map(|(token, entry)| (token.as_str().to_string(), entry.first_seen))
            .collect();
        assert_eq!(first["a"], Occurrence { file_index: 3, offset: 0 });
        assert_eq!(first["b"], Occurrence { file_index: 3, offset: 1 });
    }

    #[test]
    fn test_merge_sums_counts() {
        let global = GlobalFrequencyMap::new();
        global.merge(local(0, &["the", "cat", "sat"]));
        global.merge(local(1, &["the", "dog", "sat"]));

        assert_eq!(global.get("the"), Some(2));
        assert_eq!(global.get("sat"), Some(2));
        assert_eq!(global.get("cat"), Some(1));
        assert_eq!(global.get("dog"), Some(1));
        assert_eq!(global.len(), 4);
    }

    #[test]
    fn test_merge_order_does_not_matter() {
        let maps = [
            local(0, &["x", "y", "x"]),
            local(1, &["y", "z"]),
            local(2, &["z", "z", "x"]),
        ];
        let orders: [[usize; 3]; 3] = [[0, 1, 2], [2, 1, 0], [1, 2, 0]];

        let snapshots: Vec<FrequencyTable> = orders
            .iter()
            .map(|order| {
                let global = GlobalFrequencyMap::new();
                for &i in order {
                    global.merge(maps[i].clone());
                }
                global.snapshot()
            })
            .collect();

        assert_eq!(snapshots[0], snapshots[1]);
        assert_eq!(snapshots[1], snapshots[2]);
        assert_eq!(snapshots[0].get("x"), Some(3));
        assert_eq!(snapshots[0].get("z"), Some(3));
    }

    #[test]
    fn test_concurrent_merges_lose_nothing() {
        let global = Arc::new(GlobalFrequencyMap::new());
        let handles: Vec<_> = (0..8)
            .map(|file_index| {
                let global = Arc::clone(&global);
                thread::spawn(move || {
                    for _ in 0..50 {
                        global.merge(local(file_index, &["shared", "word"]));
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        assert_eq!(global.get("shared"), Some(400));
        assert_eq!(global.get("word"), Some(400));
    }

    #[test]
    fn test_clear_resets_table() {
        let mut global = GlobalFrequencyMap::new();
        global.merge(local(0, &["one"]));
        assert!(!global.is_empty());

        global.clear();
        assert!(global.is_empty());
        assert!(global.snapshot().is_empty());
    }
}
