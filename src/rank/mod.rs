//! Query-time relevance engine
//!
//! This module implements the scoring and merge core:
//!
//! - `ResultStore`: arena-backed doc id → scoring record mapping, handle
//!   stable under growth
//! - `Merger`: multi-term posting merge with fixed-point tf/idf scoring,
//!   proximity weighting and optimized variants (single-term pruning,
//!   top-K early exit)
//! - boolean combination of sibling clauses, including the AND-for-NOT
//!   algebra over negated stores
//! - bounded distinct collection for group-by estimation and live-delete
//!   filtering

mod arena;
mod combine;
mod filter;
mod group;
mod merger;
mod score;
mod store;
mod term;
mod topk;
mod types;

pub use arena::{Handle, RecordArena, DEFAULT_BLOCK_SIZE, MAX_PRESIZE};
pub use combine::{and_merge_dict, and_merge_for_not, or_merge};
pub use filter::{LiveFilter, TombstoneFilter};
pub use group::GroupCollector;
pub use merger::{MergeResult, MergeStrategy, Merger};
pub use store::{DocumentRecord, Payload, ResultStore};
pub use term::{collect_terms, sort_by_estimate, QueryWord, TermReader};
pub use types::{MergeStats, SearchOptions, SCORE_OVERFLOW, SCORE_SCALE};
