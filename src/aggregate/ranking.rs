//! Ranking engine.
//!
//! Orders models by a chosen metric and assigns ranks 1..n with no gaps.
//! Ties are broken by stable input order: the sort is stable, so two models
//! with equal values keep their first-seen (catalog) order. That tie-break
//! is a documented, tested policy — there are no secondary sort keys.

use serde::{Deserialize, Serialize};

/// Comparison direction: ascending for latency/cost, descending for
/// quality and throughput.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Ascending,
    Descending,
}

/// One entry in a ranking.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Ranked {
    pub rank: usize,
    pub key: String,
    pub value: f64,
}

/// Rank `entries` by value. Input order is the tie-break order; only keys
/// actually present in `entries` are ranked (a model with no data for the
/// metric is simply not an entry, never ranked last with a placeholder).
pub fn rank_by(entries: &[(String, f64)], direction: Direction) -> Vec<Ranked> {
    let mut sorted: Vec<(String, f64)> = entries.to_vec();
    // Stable sort: equal values keep input order.
    match direction {
        Direction::Ascending => {
            sorted.sort_by(|a, b| a.1.partial_cmp(&b.1).unwrap_or(std::cmp::Ordering::Equal));
        }
        Direction::Descending => {
            sorted.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));
        }
    }
    sorted
        .into_iter()
        .enumerate()
        .map(|(i, (key, value))| Ranked {
            rank: i + 1,
            key,
            value,
        })
        .collect()
}
