//! Live-document filtering
//!
//! Logically deleted documents are removed from a scored result after the
//! merge; the removed count feeds back into the result's total estimate.

use roaring::RoaringBitmap;

use crate::posting::DocId;

use super::store::ResultStore;

/// Removes tombstoned documents from a computed result
pub trait LiveFilter {
    /// Remove dead doc ids from the store, returning how many were removed
    fn filter(&self, store: &mut ResultStore) -> usize;
}

/// Live filter backed by a tombstone bitmap
#[derive(Clone, Debug, Default)]
pub struct TombstoneFilter {
    deleted: RoaringBitmap,
}

impl TombstoneFilter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Mark a document as deleted
    pub fn mark_deleted(&mut self, doc_id: DocId) {
        self.deleted.insert(doc_id.as_u32());
    }

    pub fn is_deleted(&self, doc_id: DocId) -> bool {
        self.deleted.contains(doc_id.as_u32())
    }

    pub fn deleted_count(&self) -> usize {
        self.deleted.len() as usize
    }
}

impl LiveFilter for TombstoneFilter {
    fn filter(&self, store: &mut ResultStore) -> usize {
        if self.deleted.is_empty() {
            return 0;
        }

        let dead: Vec<(DocId, bool)> = store
            .iter()
            .filter(|r| self.is_deleted(r.doc_id))
            .map(|r| (r.doc_id, r.in_group))
            .collect();

        for &(id, in_group) in &dead {
            store.remove(id);
            if in_group {
                if let Some(group) = store.group_mut() {
                    group.remove(id);
                }
            }
        }

        dead.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rank::store::DocumentRecord;
    use crate::rank::GroupCollector;

    fn store_with(ids: &[u32]) -> ResultStore {
        let mut store = ResultStore::new();
        for &id in ids {
            store
                .insert(
                    DocId(id),
                    DocumentRecord {
                        doc_id: DocId(id),
                        score: 1,
                        ..Default::default()
                    },
                )
                .unwrap();
        }
        store
    }

    #[test]
    fn test_filter_removes_tombstoned() {
        let mut store = store_with(&[1, 2, 3, 4]);
        let mut filter = TombstoneFilter::new();
        filter.mark_deleted(DocId(2));
        filter.mark_deleted(DocId(4));
        filter.mark_deleted(DocId(99)); // not in the store

        let removed = filter.filter(&mut store);
        assert_eq!(removed, 2);
        assert_eq!(store.len(), 2);
        assert!(store.contains(DocId(1)));
        assert!(!store.contains(DocId(2)));
    }

    #[test]
    fn test_filter_updates_group_collection() {
        let mut store = store_with(&[1, 2]);
        let mut group = GroupCollector::new(10);
        group.add(DocId(1));
        group.add(DocId(2));
        store.set_group(group);
        store.for_each_mut(|r| r.in_group = true);

        let mut filter = TombstoneFilter::new();
        filter.mark_deleted(DocId(1));

        filter.filter(&mut store);
        assert_eq!(store.group().unwrap().len(), 1);
        assert!(!store.group().unwrap().contains(DocId(1)));
    }

    #[test]
    fn test_empty_filter_is_noop() {
        let mut store = store_with(&[1]);
        let filter = TombstoneFilter::new();
        assert_eq!(filter.filter(&mut store), 0);
        assert_eq!(store.len(), 1);
    }
}
