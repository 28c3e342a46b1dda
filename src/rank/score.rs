//! Fixed-point scoring arithmetic
//!
//! Scores are signed 64-bit fixed point. Arithmetic never faults: any
//! product that leaves the valid range saturates to `SCORE_OVERFLOW`,
//! preserving relative ordering instead of propagating an error.

use super::types::{SCORE_OVERFLOW, SCORE_SCALE};

/// Base tf/idf contribution of one posting
///
/// `field_rank * word_rank * idf * tf * SCORE_SCALE / (normalizer * doc_len)`
/// computed wide, clamped to the overflow sentinel on overflow or a negative
/// intermediate. The document length is guaranteed nonzero by index
/// construction; a violation surfaces as an arithmetic fault here rather
/// than being masked.
pub(crate) fn base_contribution(
    field_rank: i64,
    word_rank: i64,
    idf: i64,
    term_frequency: u32,
    normalizer: i64,
    doc_word_count: u32,
) -> i64 {
    let numerator = (field_rank as i128)
        .checked_mul(word_rank as i128)
        .and_then(|v| v.checked_mul(idf as i128))
        .and_then(|v| v.checked_mul(term_frequency as i128))
        .and_then(|v| v.checked_mul(SCORE_SCALE as i128));
    let denominator = normalizer as i128 * doc_word_count as i128;

    match numerator {
        Some(n) => {
            let score = n / denominator;
            if score < 0 || score > i64::MAX as i128 {
                SCORE_OVERFLOW
            } else {
                score as i64
            }
        }
        None => SCORE_OVERFLOW,
    }
}

/// Position-decay multiplier by term rank index
///
/// Earlier (more selective) terms weigh heavier: ×20, ×4, ×1, ÷2, then ÷i.
/// An already-saturated score passes through untouched.
pub(crate) fn apply_rank_decay(score: i64, term_index: usize) -> i64 {
    if score == SCORE_OVERFLOW {
        return score;
    }
    let adjusted = match term_index {
        0 => score.checked_mul(20),
        1 => score.checked_mul(4),
        2 => Some(score),
        3 => Some(score / 2),
        i => Some(score / i as i64),
    };
    match adjusted {
        Some(s) if s >= 0 => s,
        _ => SCORE_OVERFLOW,
    }
}

/// Bucket a positional delta, tolerating small noise while still rewarding
/// adjacency
pub(crate) fn bucket_delta(delta: f64) -> f64 {
    if delta < 0.031 {
        0.031
    } else if delta <= 1.1 {
        0.5
    } else if delta <= 2.1 {
        1.0
    } else {
        delta
    }
}

/// Rescale a score by a proximity factor, rounding to integer
pub(crate) fn rescale_by_proximity(score: i64, factor: f64) -> i64 {
    let scaled = (score as f64 * factor).round();
    if !scaled.is_finite() || scaled < 0.0 || scaled >= i64::MAX as f64 {
        SCORE_OVERFLOW
    } else {
        scaled as i64
    }
}

/// Add two scores, saturating to the sentinel on overflow
pub(crate) fn saturating_score_add(a: i64, b: i64) -> i64 {
    match a.checked_add(b) {
        Some(s) if s >= 0 => s,
        _ => SCORE_OVERFLOW,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_worked_base_contribution() {
        // fieldRank=1, wordRank=10, idf=500, tf=2, normalizer=1, docLen=50
        let score = base_contribution(1, 10, 500, 2, 1, 50);
        assert_eq!(score, 200_000_000);
        // First-ranked term gets the x20 decay multiplier
        assert_eq!(apply_rank_decay(score, 0), 4_000_000_000);
    }

    #[test]
    fn test_overflow_saturates_to_sentinel() {
        // Product of near-max inputs leaves i64; must be the sentinel, not a
        // wrapped negative
        let score = base_contribution(i64::MAX / 2, i64::MAX / 2, 1_000, 1_000, 1, 1);
        assert_eq!(score, SCORE_OVERFLOW);
        assert!(score > 0);
    }

    #[test]
    fn test_decay_table() {
        assert_eq!(apply_rank_decay(100, 0), 2000);
        assert_eq!(apply_rank_decay(100, 1), 400);
        assert_eq!(apply_rank_decay(100, 2), 100);
        assert_eq!(apply_rank_decay(100, 3), 50);
        assert_eq!(apply_rank_decay(100, 4), 25);
        assert_eq!(apply_rank_decay(100, 10), 10);
    }

    #[test]
    fn test_decay_overflow_saturates() {
        assert_eq!(apply_rank_decay(i64::MAX / 2, 0), SCORE_OVERFLOW);
        assert_eq!(apply_rank_decay(SCORE_OVERFLOW, 0), SCORE_OVERFLOW);
    }

    #[test]
    fn test_delta_buckets() {
        assert_eq!(bucket_delta(0.0), 0.031);
        assert_eq!(bucket_delta(0.030), 0.031);
        assert_eq!(bucket_delta(0.5), 0.5);
        assert_eq!(bucket_delta(1.1), 0.5);
        assert_eq!(bucket_delta(2.0), 1.0);
        assert_eq!(bucket_delta(2.1), 1.0);
        assert_eq!(bucket_delta(3.0), 3.0);
    }

    #[test]
    fn test_proximity_rescale() {
        assert_eq!(rescale_by_proximity(900, 0.5), 450);
        assert_eq!(rescale_by_proximity(10, 1.0 / 3.0), 3);
        assert_eq!(rescale_by_proximity(i64::MAX - 1, 4.0), SCORE_OVERFLOW);
    }

    #[test]
    fn test_saturating_add() {
        assert_eq!(saturating_score_add(1, 2), 3);
        assert_eq!(saturating_score_add(i64::MAX, 1), SCORE_OVERFLOW);
    }
}
