//! Result aggregation: reduces N per-run measurement documents into
//! per-model, per-test and overall summary statistics.
//!
//! Every reducer is a pure function of the immutable [`RunSet`](crate::record::RunSet)
//! and the config; there is no shared mutable state between (test, model)
//! pairs. The report assembler is the single merge point.
//!
//! - `stats` — mean / sample stdev / rounding helpers
//! - `per_test` — latency/token/cost stats per (test, model) pair
//! - `quality` — judge-score reduction with the two-level composite
//! - `throughput` — tokens/sec per pair plus the mean-of-means rollup
//! - `overall` — cross-test summary per model (runs weighted equally)
//! - `ranking` — dense ranks with catalog-order tie-break
//! - `report` — document assembly and human-readable rendering

pub mod overall;
pub mod per_test;
pub mod quality;
pub mod ranking;
pub mod report;
pub mod stats;
pub mod throughput;
