//! Result store: arena-backed doc id → scoring record mapping
//!
//! One store is created per query-node evaluation, populated by the merger,
//! optionally combined with sibling clauses, filtered for live documents and
//! then consumed by the caller. The backing memory is released when the
//! store is dropped, on every exit path of the owning query.

use std::collections::HashMap;
use std::sync::Arc;

use crate::error::{RankexError, Result};
use crate::posting::{DocId, Posting};

use super::arena::{Handle, RecordArena};
use super::group::GroupCollector;

/// Opaque per-document payload carried through boolean combination
pub type Payload = Arc<[u8]>;

/// Mutable scoring record for one matched document
#[derive(Clone, Debug, Default)]
pub struct DocumentRecord {
    pub doc_id: DocId,
    /// Saturating fixed-point relevance score, never negative
    pub score: i64,
    /// Number of distinct query terms matched so far
    pub hit_count: u32,
    /// Index of the last term that matched (in merge order)
    pub last_term: u32,
    /// First position of the last matching term within the document
    pub last_position: u32,
    /// Term frequency of the last matching term
    pub last_count: u32,
    /// Query position of the last matching term
    pub last_query_position: u32,
    /// Query count of the last matching term
    pub last_query_count: u32,
    /// Opaque payload attached by the caller or a sibling clause
    pub payload: Option<Payload>,
    /// Whether this doc id is held in the group collection
    pub in_group: bool,
}

impl DocumentRecord {
    /// Record for a document's first matching term
    pub fn first_hit(
        doc_id: DocId,
        score: i64,
        term_index: u32,
        query_position: u32,
        query_count: u32,
        posting: &Posting,
    ) -> Self {
        Self {
            doc_id,
            score,
            hit_count: 1,
            last_term: term_index,
            last_position: posting.first_position,
            last_count: posting.term_frequency,
            last_query_position: query_position,
            last_query_count: query_count,
            payload: None,
            in_group: false,
        }
    }
}

/// Arena-backed map of doc id → scoring record
///
/// Records live in append-only blocks (`RecordArena`); the hash index maps
/// doc ids to stable handles, so growth never moves a record. A removed doc
/// id merely drops out of the index — its arena slot is reclaimed with the
/// store as a whole.
pub struct ResultStore {
    arena: RecordArena,
    index: HashMap<DocId, Handle>,
    /// When set, this store enumerates the excluded set; the true match
    /// population is the complement
    pub negated: bool,
    /// Set by a caller-invoked sort step; iteration order is otherwise
    /// arbitrary
    pub sorted: bool,
    rel_total_count: usize,
    group: Option<GroupCollector>,
}

impl ResultStore {
    pub fn new() -> Self {
        Self::with_arena(RecordArena::new())
    }

    /// Create a store pre-sized for an expected posting volume
    pub fn with_estimate(estimate: usize) -> Self {
        Self::with_arena(RecordArena::with_estimate(estimate))
    }

    fn with_arena(arena: RecordArena) -> Self {
        Self {
            arena,
            index: HashMap::new(),
            negated: false,
            sorted: false,
            rel_total_count: 0,
            group: None,
        }
    }

    /// Look up the handle for a doc id
    pub fn try_get(&self, doc_id: DocId) -> Option<Handle> {
        self.index.get(&doc_id).copied()
    }

    pub fn contains(&self, doc_id: DocId) -> bool {
        self.index.contains_key(&doc_id)
    }

    /// Resolve a handle to its record
    pub fn record(&self, handle: Handle) -> &DocumentRecord {
        self.arena.get(handle)
    }

    /// Resolve a handle to its record, mutably
    pub fn record_mut(&mut self, handle: Handle) -> &mut DocumentRecord {
        self.arena.get_mut(handle)
    }

    /// Insert a record for a doc id not yet present
    ///
    /// Re-inserting an existing doc id is a caller defect: it fails with
    /// `DuplicateDocId` rather than silently overwriting, which would
    /// corrupt accumulated scores.
    pub fn insert(&mut self, doc_id: DocId, record: DocumentRecord) -> Result<Handle> {
        if self.index.contains_key(&doc_id) {
            return Err(RankexError::DuplicateDocId(doc_id));
        }
        let handle = self.arena.push(record);
        self.index.insert(doc_id, handle);
        Ok(handle)
    }

    /// Overwrite the score of an existing record
    pub fn update_score(&mut self, doc_id: DocId, score: i64) -> bool {
        match self.try_get(doc_id) {
            Some(handle) => {
                self.arena.get_mut(handle).score = score;
                true
            }
            None => false,
        }
    }

    /// Remove a doc id from the store
    ///
    /// The arena slot is not reused; it is reclaimed when the store drops.
    pub fn remove(&mut self, doc_id: DocId) -> bool {
        self.index.remove(&doc_id).is_some()
    }

    /// Number of documents currently stored
    pub fn len(&self) -> usize {
        self.index.len()
    }

    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    /// Iterate records in arbitrary hash order
    pub fn iter(&self) -> impl Iterator<Item = &DocumentRecord> {
        self.index.values().map(|&h| self.arena.get(h))
    }

    /// Doc ids currently stored, in arbitrary hash order
    pub fn doc_ids(&self) -> impl Iterator<Item = DocId> + '_ {
        self.index.keys().copied()
    }

    /// Apply a mutation to every stored record
    pub fn for_each_mut(&mut self, mut f: impl FnMut(&mut DocumentRecord)) {
        let arena = &mut self.arena;
        for &handle in self.index.values() {
            f(arena.get_mut(handle));
        }
    }

    /// Estimated true match count, never less than the stored count
    pub fn rel_total_count(&self) -> usize {
        self.rel_total_count.max(self.len())
    }

    pub fn set_rel_total_count(&mut self, count: usize) {
        self.rel_total_count = count;
    }

    /// Subtract removed documents from the estimate
    pub fn reduce_rel_total_count(&mut self, removed: usize) {
        self.rel_total_count = self.rel_total_count.saturating_sub(removed);
    }

    pub fn group(&self) -> Option<&GroupCollector> {
        self.group.as_ref()
    }

    pub fn group_mut(&mut self) -> Option<&mut GroupCollector> {
        self.group.as_mut()
    }

    pub fn set_group(&mut self, group: GroupCollector) {
        self.group = Some(group);
    }

    pub fn take_group(&mut self) -> Option<GroupCollector> {
        self.group.take()
    }
}

impl Default for ResultStore {
    fn default() -> Self {
        Self::new()
    }
}
