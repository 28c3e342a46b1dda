//! Multi-term scoring and merge
//!
//! The merger streams every term's postings into one `ResultStore`,
//! accumulating fixed-point tf/idf contributions weighted by positional
//! proximity, then adjusts so that documents matching every term always
//! outrank partial matches. Terms are merged cheapest-first (ascending
//! estimated match count), which lets the optimized variants prune early.

use std::time::Instant;

use roaring::RoaringBitmap;
use tracing::debug;

use crate::config::TableConfig;
use crate::error::Result;
use crate::posting::Posting;

use super::arena::{DEFAULT_BLOCK_SIZE, MAX_PRESIZE};
use super::combine;
use super::filter::LiveFilter;
use super::group::GroupCollector;
use super::score::{apply_rank_decay, base_contribution, bucket_delta, rescale_by_proximity, saturating_score_add};
use super::store::{DocumentRecord, ResultStore};
use super::term::{sort_by_estimate, TermReader};
use super::types::{MergeStats, SearchOptions};

/// Closed set of merge variants, selected from the query shape
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MergeStrategy {
    /// Stream every term fully
    Full,
    /// Single-term query with tf-based tail pruning
    SingleTerm,
    /// Multi-term query with top-K early exit and tail completion
    TopK,
}

impl MergeStrategy {
    /// Pick the variant for a query shape
    pub fn select(
        term_count: usize,
        options: &SearchOptions,
        has_up_dict: bool,
        has_exclusions: bool,
    ) -> Self {
        if term_count == 1
            && options.partial_load
            && !options.need_distinct
            && !has_exclusions
            && options.end.is_some()
        {
            return MergeStrategy::SingleTerm;
        }
        if term_count > 1
            && options.partial_load
            && options.order_by_score_desc
            && !options.need_distinct
            && !options.need_group_by
            && !has_up_dict
        {
            return MergeStrategy::TopK;
        }
        MergeStrategy::Full
    }
}

/// Outcome of one merge run
pub struct MergeResult {
    pub store: ResultStore,
    pub stats: MergeStats,
}

/// Query-time relevance merger
///
/// One merger run owns one `ResultStore` exclusively; execution is
/// single-threaded and synchronous, and the store is released on every exit
/// path when it drops.
pub struct Merger<'a> {
    pub(crate) config: &'a TableConfig,
    pub(crate) total_docs: usize,
    pub(crate) live_filter: Option<&'a dyn LiveFilter>,
}

impl<'a> Merger<'a> {
    pub fn new(config: &'a TableConfig, total_docs: usize) -> Self {
        Self {
            config,
            total_docs,
            live_filter: None,
        }
    }

    /// Attach a live-delete filter applied after scoring
    pub fn with_live_filter(mut self, filter: &'a dyn LiveFilter) -> Self {
        self.live_filter = Some(filter);
        self
    }

    /// Evaluate one query node: merge, adjust, filter
    ///
    /// `up_dict` is the optional upstream constraint store from an enclosing
    /// AND; `not_in` is a raw exclusion set from an enclosing NOT. An empty
    /// term list yields an empty result, except that a negated query with an
    /// up-dict returns the up-dict unchanged.
    pub fn search(
        &self,
        mut terms: Vec<TermReader>,
        options: &SearchOptions,
        up_dict: Option<ResultStore>,
        not_in: Option<&RoaringBitmap>,
    ) -> Result<MergeResult> {
        let started = Instant::now();
        let mut stats = MergeStats::default();

        if terms.is_empty() {
            let store = match (options.negated, up_dict) {
                (true, Some(up)) => up,
                _ => ResultStore::new(),
            };
            stats.docs_matched = store.len() as u64;
            return Ok(MergeResult { store, stats });
        }

        sort_by_estimate(&mut terms);

        let store = if options.negated {
            // A NOT clause scores its own matches; the combiner interprets
            // the store as an exclusion set
            let mut own = self.merge_scored(&mut terms, options, None, not_in, false, &mut stats)?;
            own.negated = true;
            match up_dict {
                Some(up) => combine::and_merge_for_not(own, up),
                None => own,
            }
        } else {
            let strategy =
                MergeStrategy::select(terms.len(), options, up_dict.is_some(), not_in.is_some());
            match strategy {
                MergeStrategy::TopK => self.merge_top_k(&mut terms, options, not_in, &mut stats)?,
                MergeStrategy::SingleTerm => {
                    self.merge_scored(&mut terms, options, up_dict.as_ref(), not_in, true, &mut stats)?
                }
                MergeStrategy::Full => {
                    self.merge_scored(&mut terms, options, up_dict.as_ref(), not_in, false, &mut stats)?
                }
            }
        };

        stats.docs_matched = store.len() as u64;
        stats.execution_time_us = started.elapsed().as_micros() as u64;
        debug!(
            terms = terms.len(),
            docs = store.len(),
            postings = stats.postings_read,
            elapsed_us = stats.execution_time_us,
            "merge complete"
        );

        Ok(MergeResult { store, stats })
    }

    /// Full scored merge over every term, with optional single-term pruning
    fn merge_scored(
        &self,
        terms: &mut [TermReader],
        options: &SearchOptions,
        up_dict: Option<&ResultStore>,
        not_in: Option<&RoaringBitmap>,
        prune_single: bool,
        stats: &mut MergeStats,
    ) -> Result<ResultStore> {
        let term_count = terms.len();
        let ratio = proximity_ratio(term_count);
        let mut store = presized_store(terms);

        let group_scan_all = if options.need_group_by {
            self.scan_groups(terms, &mut store, stats)
        } else {
            false
        };

        let min_result_count = self.config.group_by_limit;

        for (i, term) in terms.iter_mut().enumerate() {
            let bound = term.source.approximate_count();
            let mut consumed = 0usize;
            let mut pruned_max_tf = 0u32;

            while let Some(posting) = term.source.next() {
                stats.postings_read += 1;

                if prune_single {
                    if consumed > min_result_count {
                        // Past the sampled head: a lower-tf tail entry cannot
                        // reach the window
                        if pruned_max_tf > posting.term_frequency {
                            consumed += 1;
                            continue;
                        }
                    } else if pruned_max_tf < posting.term_frequency {
                        pruned_max_tf = posting.term_frequency;
                    }
                }

                let contribution = apply_rank_decay(
                    base_contribution(
                        term.field_rank,
                        term.word_rank,
                        term.idf,
                        posting.term_frequency,
                        term.normalizer,
                        posting.doc_word_count,
                    ),
                    i,
                );

                // The first term's stream cannot collide with itself
                let existing = if i > 0 { store.try_get(posting.doc_id) } else { None };
                match existing {
                    Some(handle) => {
                        merge_hit(store.record_mut(handle), contribution, term, &posting, i, ratio);
                    }
                    None => {
                        let excluded = not_in
                            .map_or(false, |set| set.contains(posting.doc_id.as_u32()));
                        let admitted = !excluded
                            && match up_dict {
                                None => true,
                                Some(up) if up.negated => !up.contains(posting.doc_id),
                                Some(up) => up.contains(posting.doc_id),
                            };
                        if admitted {
                            let in_group = store
                                .group()
                                .map_or(false, |g| g.contains(posting.doc_id));
                            let mut record = DocumentRecord::first_hit(
                                posting.doc_id,
                                contribution,
                                i as u32,
                                term.query_position,
                                term.query_count,
                                &posting,
                            );
                            record.in_group = in_group;
                            store.insert(posting.doc_id, record)?;
                        }
                    }
                }

                consumed += 1;
                if consumed > bound {
                    break;
                }
            }
        }

        apply_full_match_bonus(&mut store, term_count);

        // AND clauses accumulate relevance: fold the upstream constraint's
        // scores into the surviving documents
        if let Some(up) = up_dict {
            if !up.negated {
                store.for_each_mut(|record| {
                    if let Some(handle) = up.try_get(record.doc_id) {
                        record.score =
                            saturating_score_add(record.score, up.record(handle).score);
                    }
                });
            }
        }

        let document_sum = store.len().min(self.total_docs);

        let removed = self.live_filter.map_or(0, |f| f.filter(&mut store));
        stats.docs_filtered += removed as u64;

        if options.partial_load && up_dict.is_none() {
            let last_estimate = terms.last().map_or(0, |t| t.estimated_total);
            if store.len() < last_estimate {
                if term_count > 1 {
                    let mut sum = document_sum;
                    if last_estimate > self.config.max_return_count {
                        sum += last_estimate - self.config.max_return_count;
                    }
                    store.set_rel_total_count(sum.min(self.total_docs));
                } else if not_in.is_some() {
                    store.set_rel_total_count(document_sum);
                } else {
                    store.set_rel_total_count(last_estimate);
                }
            }
        }
        store.reduce_rel_total_count(removed);

        if options.need_group_by {
            let group_len = store.group().map_or(0, GroupCollector::len);
            if group_scan_all {
                // Complete scan: the distinct count is exact and wins
                store.set_rel_total_count(group_len);
            } else if group_len > store.rel_total_count() {
                store.set_rel_total_count(group_len);
            }
        }

        Ok(store)
    }

    /// Bounded distinct pre-scan for group-by estimation
    ///
    /// Returns true when every posting was seen before the collection limit
    /// was reached, making the distinct count exact.
    fn scan_groups(
        &self,
        terms: &mut [TermReader],
        store: &mut ResultStore,
        stats: &mut MergeStats,
    ) -> bool {
        let mut group = GroupCollector::new(self.config.group_by_limit);
        let mut scan_all = true;

        'terms: for term in terms.iter_mut() {
            while let Some(posting) = term.source.next() {
                stats.postings_read += 1;
                group.add(posting.doc_id);
                if group.is_exhausted() {
                    scan_all = false;
                    term.source.reset();
                    break 'terms;
                }
            }
            term.source.reset();
        }

        store.set_group(group);
        scan_all
    }
}

/// Proximity exponent: single-term queries force 1 to avoid dividing by zero
pub(crate) fn proximity_ratio(term_count: usize) -> f64 {
    if term_count > 1 {
        2.0 / (term_count - 1) as f64
    } else {
        1.0
    }
}

/// Pre-size the store from the terms' posting-volume estimates
pub(crate) fn presized_store(terms: &[TermReader]) -> ResultStore {
    let mut volume: usize = terms.iter().map(|t| t.source.approximate_count()).sum();
    volume += volume / 2;
    if volume > DEFAULT_BLOCK_SIZE {
        ResultStore::with_estimate(volume.min(MAX_PRESIZE))
    } else {
        ResultStore::new()
    }
}

/// Fold a repeat term match into an existing record
///
/// Adds the contribution, then rescales by the proximity between this match
/// and the previous term's match: similar relative offsets in query and
/// document reward the score, distant ones damp it.
pub(crate) fn merge_hit(
    record: &mut DocumentRecord,
    contribution: i64,
    term: &TermReader,
    posting: &Posting,
    term_index: usize,
    ratio: f64,
) {
    record.score = saturating_score_add(record.score, contribution);
    record.hit_count += 1;

    let query_pos_delta = term.query_position as f64 - record.last_query_position as f64;
    let pos_delta = posting.first_position as f64 - record.last_position as f64;
    let delta = bucket_delta((query_pos_delta - pos_delta).abs());

    let factor = (1.0 / delta).powf(ratio) * posting.term_frequency as f64
        * record.last_count as f64
        / (term.query_count as f64 * record.last_query_count as f64);
    record.score = rescale_by_proximity(record.score, factor);

    record.last_term = term_index as u32;
    record.last_position = posting.first_position;
    record.last_count = posting.term_frequency;
    record.last_query_position = term.query_position;
    record.last_query_count = term.query_count;
}

/// Lift full matches above every partial match
///
/// Adds the best partial-match score to each record that matched all terms.
/// A ranking guarantee, not an AND filter: non-matching terms simply
/// contributed zero.
pub(crate) fn apply_full_match_bonus(store: &mut ResultStore, term_count: usize) {
    let full = term_count as u32;
    let mut max_partial = 0i64;
    for record in store.iter() {
        if record.hit_count < full && record.score > max_partial {
            max_partial = record.score;
        }
    }
    if max_partial == 0 {
        return;
    }
    store.for_each_mut(|record| {
        if record.hit_count == full {
            record.score = saturating_score_add(record.score, max_partial);
        }
    });
}
