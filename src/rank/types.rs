//! Core types for the relevance engine

use serde::{Deserialize, Serialize};

/// Sentinel a score saturates to when fixed-point arithmetic overflows
///
/// Kept a few million below `i64::MAX` so that later additive adjustments
/// cannot wrap a saturated score back to negative.
pub const SCORE_OVERFLOW: i64 = i64::MAX - 4_000_000;

/// Fixed-point scale applied to every base contribution
pub const SCORE_SCALE: i64 = 1_000_000;

/// Query-shape options for one merge run
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct SearchOptions {
    /// Last requested result index (inclusive); `None` means unbounded
    pub end: Option<usize>,
    /// Whether posting lists may be consumed partially (windowed queries)
    pub partial_load: bool,
    /// Whether the surrounding query orders results by descending score
    pub order_by_score_desc: bool,
    /// Whether a group-by estimate is requested
    pub need_group_by: bool,
    /// Whether distinct results are required
    pub need_distinct: bool,
    /// Whether this clause is negated (NOT)
    pub negated: bool,
}

impl SearchOptions {
    /// Set the requested result window end
    pub fn with_end(mut self, end: usize) -> Self {
        self.end = Some(end);
        self
    }

    /// Permit partial posting-list consumption
    pub fn with_partial_load(mut self) -> Self {
        self.partial_load = true;
        self
    }

    /// Declare score-descending ordering
    pub fn with_order_by_score_desc(mut self) -> Self {
        self.order_by_score_desc = true;
        self
    }

    /// Request a group-by estimate
    pub fn with_group_by(mut self) -> Self {
        self.need_group_by = true;
        self
    }

    /// Require distinct results
    pub fn with_distinct(mut self) -> Self {
        self.need_distinct = true;
        self
    }

    /// Negate this clause
    pub fn with_negated(mut self) -> Self {
        self.negated = true;
        self
    }
}

/// Counters captured during one merge run
#[derive(Clone, Debug, Default)]
pub struct MergeStats {
    /// Number of postings consumed across all terms
    pub postings_read: u64,
    /// Number of documents stored at completion
    pub docs_matched: u64,
    /// Documents removed by the live filter
    pub docs_filtered: u64,
    /// Merge execution time in microseconds
    pub execution_time_us: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_options_builder() {
        let opts = SearchOptions::default()
            .with_end(250)
            .with_partial_load()
            .with_order_by_score_desc();
        assert_eq!(opts.end, Some(250));
        assert!(opts.partial_load);
        assert!(opts.order_by_score_desc);
        assert!(!opts.negated);
    }

    #[test]
    fn test_overflow_sentinel_headroom() {
        // Additive bonus adjustments must not wrap a saturated score
        assert!(SCORE_OVERFLOW.checked_add(4_000_000).is_some());
    }
}
