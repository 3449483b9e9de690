use serde::Serialize;

use super::frequency::TokenCount;
use super::token::Token;

/// One line of a frequency ranking
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RankedToken {
    /// 1-based position
    pub rank: usize,
    pub token: Token,
    pub count: u64,
}

/// Rank tokens by descending count, ties broken by first occurrence
pub fn top_k<'a, I>(entries: I, k: usize) -> Vec<RankedToken>
where
    I: IntoIterator<Item = (&'a Token, &'a TokenCount)>,
{
    if k == 0 {
        return Vec::new();
    }

    let mut sorted: Vec<(&Token, &TokenCount)> = entries.into_iter().collect();
    sorted.sort_by(|(_, a), (_, b)| {
        b.count
            .cmp(&a.count)
            .then_with(|| a.first_seen.cmp(&b.first_seen))
    });

    sorted
        .into_iter()
        .take(k)
        .enumerate()
        .map(|(index, (token, entry))| RankedToken {
            rank: index + 1,
            token: token.clone(),
            count: entry.count,
        })
        .collect()
}
