//! Posting source abstraction
//!
//! A `PostingSource` is the engine's read interface to one term's posting
//! list. The index layer owns the storage; the merger only needs an ordered
//! cursor, random access by doc id, and rough size estimates.

use super::types::{DocId, Posting};

/// Ordered posting-list cursor for a single query term
///
/// `next` yields postings in ascending doc-id order until exhausted.
/// Implementations may be backed by partially-loaded lists; in that case
/// `approximate_count` reports the estimated full size, which may exceed
/// the number of postings the cursor actually yields.
pub trait PostingSource {
    /// Next posting in ascending doc-id order, `None` at end of stream
    fn next(&mut self) -> Option<Posting>;

    /// Rewind the cursor to the start of the stream
    fn reset(&mut self);

    /// Random-access lookup by doc id
    ///
    /// Used for tail completion in the top-K merge and must not disturb
    /// positions already consumed through `next`.
    fn get(&mut self, doc_id: DocId) -> Option<Posting>;

    /// Estimated total posting count for this term
    fn approximate_count(&self) -> usize;

    /// Estimated number of distinct documents containing this term
    fn approximate_unique_docs(&self) -> usize;
}

/// Posting source over an in-memory, pre-sorted posting list
///
/// Used by tests and by embedders that keep posting lists in RAM.
pub struct MemoryPostingSource {
    postings: Vec<Posting>,
    cursor: usize,
    approximate_count: usize,
}

impl MemoryPostingSource {
    /// Create a source over postings sorted by ascending doc id
    pub fn new(postings: Vec<Posting>) -> Self {
        debug_assert!(
            postings.windows(2).all(|w| w[0].doc_id < w[1].doc_id),
            "postings must be sorted by ascending doc id"
        );
        let approximate_count = postings.len();
        Self {
            postings,
            cursor: 0,
            approximate_count,
        }
    }

    /// Override the estimated total count
    ///
    /// Models a partially-loaded list whose true size exceeds what is held
    /// in memory.
    pub fn with_approximate_count(mut self, count: usize) -> Self {
        self.approximate_count = count;
        self
    }
}

impl PostingSource for MemoryPostingSource {
    fn next(&mut self) -> Option<Posting> {
        let posting = self.postings.get(self.cursor).copied();
        if posting.is_some() {
            self.cursor += 1;
        }
        posting
    }

    fn reset(&mut self) {
        self.cursor = 0;
    }

    fn get(&mut self, doc_id: DocId) -> Option<Posting> {
        self.postings
            .binary_search_by_key(&doc_id, |p| p.doc_id)
            .ok()
            .map(|i| self.postings[i])
    }

    fn approximate_count(&self) -> usize {
        self.approximate_count
    }

    fn approximate_unique_docs(&self) -> usize {
        // One posting per document per term in this representation
        self.postings.len()
    }
}
