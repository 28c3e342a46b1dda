//! Query-term descriptors
//!
//! A `TermReader` pairs one term's posting source with the weights the
//! scoring formula needs. Duplicate words in the query fold into a single
//! reader, accumulating word rank and query count.

use std::collections::HashMap;

use crate::error::{RankexError, Result};
use crate::posting::PostingSource;

/// One analyzed word of the query, with its rank and position
#[derive(Clone, Debug)]
pub struct QueryWord {
    pub word: String,
    pub rank: i64,
    pub position: u32,
}

impl QueryWord {
    pub fn new(word: impl Into<String>, rank: i64, position: u32) -> Self {
        Self {
            word: word.into(),
            rank,
            position,
        }
    }
}

/// Posting source plus scoring weights for one query term
pub struct TermReader {
    pub source: Box<dyn PostingSource>,
    pub word: String,
    /// Accumulated word rank (repeats in the query add up)
    pub word_rank: i64,
    pub field_rank: i64,
    /// Derived inverse-document-frequency factor
    pub idf: i64,
    /// Document-length normalizer, strictly positive
    pub normalizer: i64,
    /// Position of the word's first occurrence in the query
    pub query_position: u32,
    /// Number of times the word repeats in the query
    pub query_count: u32,
    /// Estimated total match count, drives term ordering
    pub estimated_total: usize,
}

impl std::fmt::Debug for TermReader {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TermReader")
            .field("word", &self.word)
            .field("word_rank", &self.word_rank)
            .field("field_rank", &self.field_rank)
            .field("idf", &self.idf)
            .field("normalizer", &self.normalizer)
            .field("query_position", &self.query_position)
            .field("query_count", &self.query_count)
            .field("estimated_total", &self.estimated_total)
            .finish_non_exhaustive()
    }
}

impl TermReader {
    /// Create a reader; a non-positive normalizer is a data-integrity fault
    pub fn new(
        source: Box<dyn PostingSource>,
        word: impl Into<String>,
        word_rank: i64,
        field_rank: i64,
        idf: i64,
        normalizer: i64,
        query_position: u32,
    ) -> Result<Self> {
        let word = word.into();
        if normalizer <= 0 {
            return Err(RankexError::ZeroNormalizer {
                word,
                value: normalizer,
            });
        }
        let estimated_total = source.approximate_count();
        Ok(Self {
            source,
            word,
            word_rank,
            field_rank,
            idf,
            normalizer,
            query_position,
            query_count: 1,
            estimated_total,
        })
    }

    /// Derive an integer idf factor from collection statistics
    pub fn derive_idf(total_docs: usize, doc_count: usize) -> i64 {
        let ratio = total_docs as f64 / doc_count.max(1) as f64;
        ((ratio + 1.0).log10() * 100.0).round() as i64 + 1
    }
}

/// Fold query words into term readers, deduplicating repeated words
///
/// Words the resolver cannot find are skipped. The resolver is the index
/// layer's term lookup, returning a posting source per known word.
pub fn collect_terms(
    words: &[QueryWord],
    field_rank: i64,
    normalizer: i64,
    total_docs: usize,
    mut resolve: impl FnMut(&str) -> Option<Box<dyn PostingSource>>,
) -> Result<Vec<TermReader>> {
    let mut by_word: HashMap<String, usize> = HashMap::new();
    let mut terms: Vec<TermReader> = Vec::with_capacity(words.len());

    for qw in words {
        if let Some(&i) = by_word.get(&qw.word) {
            let term = &mut terms[i];
            term.word_rank += qw.rank;
            term.query_count += 1;
            continue;
        }
        let Some(source) = resolve(&qw.word) else {
            continue;
        };
        let idf = TermReader::derive_idf(total_docs, source.approximate_unique_docs());
        let term = TermReader::new(
            source,
            qw.word.clone(),
            qw.rank,
            field_rank,
            idf,
            normalizer,
            qw.position,
        )?;
        by_word.insert(qw.word.clone(), terms.len());
        terms.push(term);
    }

    Ok(terms)
}

/// Order terms ascending by estimated match count
///
/// The cheapest, most selective term drives the outer merge loop.
pub fn sort_by_estimate(terms: &mut [TermReader]) {
    terms.sort_by_key(|t| t.estimated_total);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::posting::{DocId, MemoryPostingSource, Posting};

    fn source_of(n: u32) -> Box<dyn PostingSource> {
        Box::new(MemoryPostingSource::new(
            (0..n)
                .map(|i| Posting::new(DocId(i), 1, 0, 10))
                .collect(),
        ))
    }

    #[test]
    fn test_zero_normalizer_rejected() {
        let err = TermReader::new(source_of(1), "cat", 10, 1, 500, 0, 0).unwrap_err();
        assert!(matches!(err, RankexError::ZeroNormalizer { .. }));
    }

    #[test]
    fn test_derive_idf_orders_by_rarity() {
        let rare = TermReader::derive_idf(10_000, 3);
        let common = TermReader::derive_idf(10_000, 9_000);
        assert!(rare > common);
        assert!(common >= 1);
    }

    #[test]
    fn test_collect_folds_duplicates() {
        let words = vec![
            QueryWord::new("cat", 10, 0),
            QueryWord::new("dog", 5, 1),
            QueryWord::new("cat", 10, 2),
        ];
        let terms = collect_terms(&words, 1, 50, 1000, |_| Some(source_of(4))).unwrap();

        assert_eq!(terms.len(), 2);
        let cat = terms.iter().find(|t| t.word == "cat").unwrap();
        assert_eq!(cat.word_rank, 20);
        assert_eq!(cat.query_count, 2);
        // The first occurrence's position wins
        assert_eq!(cat.query_position, 0);
    }

    #[test]
    fn test_collect_skips_unknown_words() {
        let words = vec![QueryWord::new("cat", 10, 0), QueryWord::new("xyz", 1, 1)];
        let terms = collect_terms(&words, 1, 50, 1000, |w| {
            (w == "cat").then(|| source_of(2))
        })
        .unwrap();
        assert_eq!(terms.len(), 1);
        assert_eq!(terms[0].word, "cat");
    }

    #[test]
    fn test_sort_by_estimate() {
        let mut terms = vec![
            TermReader::new(source_of(100), "big", 1, 1, 1, 1, 0).unwrap(),
            TermReader::new(source_of(2), "small", 1, 1, 1, 1, 1).unwrap(),
        ];
        sort_by_estimate(&mut terms);
        assert_eq!(terms[0].word, "small");
        assert_eq!(terms[1].word, "big");
    }
}
