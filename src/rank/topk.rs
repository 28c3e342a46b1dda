//! Top-K early-exit merge
//!
//! When results are consumed as a score-descending window, streaming every
//! posting of every term is wasted work. This variant stops admitting new
//! documents once enough candidates are collected, completes hit counts for
//! the skipped terms by random access, and extrapolates the total match
//! count from the hit rate observed during that completion pass.

use roaring::RoaringBitmap;

use crate::error::Result;
use crate::posting::DocId;

use super::merger::{merge_hit, presized_store, proximity_ratio, Merger};
use super::score::{apply_rank_decay, base_contribution, saturating_score_add};
use super::store::{DocumentRecord, ResultStore};
use super::term::TermReader;
use super::types::{MergeStats, SearchOptions};

impl Merger<'_> {
    /// Merge with top-K early exit, tail completion and count extrapolation
    ///
    /// Selected only for multi-term, score-ordered, partial-load queries
    /// with no upstream constraint store.
    pub(crate) fn merge_top_k(
        &self,
        terms: &mut [TermReader],
        options: &SearchOptions,
        not_in: Option<&RoaringBitmap>,
        stats: &mut MergeStats,
    ) -> Result<ResultStore> {
        let term_count = terms.len();
        let full = term_count as u32;
        let ratio = proximity_ratio(term_count);

        let top = requested_top(options.end);

        let mut store = presized_store(terms);

        // Scan terms cheapest-first until enough candidates are collected
        let mut index_in_top = 0;
        for (i, term) in terms.iter_mut().enumerate() {
            if store.len() >= top {
                break;
            }
            index_in_top = i;

            let bound = term.source.approximate_count();
            let mut consumed = 0usize;

            while let Some(posting) = term.source.next() {
                stats.postings_read += 1;

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

                let existing = if i > 0 { store.try_get(posting.doc_id) } else { None };
                match existing {
                    Some(handle) => {
                        merge_hit(store.record_mut(handle), contribution, term, &posting, i, ratio);
                    }
                    None => {
                        let excluded = not_in
                            .map_or(false, |set| set.contains(posting.doc_id.as_u32()));
                        if !excluded {
                            store.insert(
                                posting.doc_id,
                                DocumentRecord::first_hit(
                                    posting.doc_id,
                                    contribution,
                                    i as u32,
                                    term.query_position,
                                    term.query_count,
                                    &posting,
                                ),
                            )?;
                        }
                    }
                }

                consumed += 1;
                if consumed > bound {
                    break;
                }
            }
        }

        let mut max_partial = store
            .iter()
            .filter(|r| r.hit_count < full)
            .map(|r| r.score)
            .max()
            .unwrap_or(0);

        // Tail completion: the remaining terms were never streamed. Probe
        // them by random access for the candidates already collected, so hit
        // counts and scores are complete before the bonus pass.
        let mut hit_rate = 0.0f64;
        if index_in_top < term_count - 1 {
            let mut doc_ids: Vec<DocId> = store.doc_ids().collect();
            doc_ids.sort_unstable();

            let mut last_term_hits = 0usize;
            for &doc_id in &doc_ids {
                let Some(handle) = store.try_get(doc_id) else {
                    continue;
                };
                for cur in (index_in_top + 1)..term_count {
                    let term = &mut terms[cur];
                    let Some(posting) = term.source.get(doc_id) else {
                        continue;
                    };
                    if cur == term_count - 1 {
                        last_term_hits += 1;
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
                        cur,
                    );
                    merge_hit(store.record_mut(handle), contribution, term, &posting, cur, ratio);
                }

                let record = store.record(handle);
                if record.hit_count < full && record.score > max_partial {
                    max_partial = record.score;
                }
            }

            if !doc_ids.is_empty() {
                hit_rate = last_term_hits as f64 / doc_ids.len() as f64;
            }
        }

        if max_partial > 0 {
            store.for_each_mut(|record| {
                if record.hit_count == full {
                    record.score = saturating_score_add(record.score, max_partial);
                }
            });
        }

        // Extrapolate the total: the last term's estimate counts in full;
        // terms that were neither streamed nor last project through the
        // observed hit rate
        let mut document_sum = store.len();
        if index_in_top < term_count - 1 {
            document_sum += terms[term_count - 1].estimated_total;
            if hit_rate > 0.0 {
                let mut predicted = 0usize;
                for term in &terms[(index_in_top + 1)..(term_count - 1)] {
                    predicted += (term.estimated_total as f64 * (1.0 - hit_rate)) as usize;
                }
                document_sum += predicted;
            }
        }
        store.set_rel_total_count(document_sum.min(self.total_docs));

        let removed = self.live_filter.map_or(0, |f| f.filter(&mut store));
        stats.docs_filtered += removed as u64;
        store.reduce_rel_total_count(removed);

        Ok(store)
    }
}

/// Round the requested window up to a hundreds boundary (minimum 100)
///
/// The surplus absorbs re-ranking among candidates near the cut.
fn requested_top(end: Option<usize>) -> usize {
    match end {
        Some(end) => (1 + end / 100) * 100,
        None => usize::MAX,
    }
}
