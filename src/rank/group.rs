//! Bounded distinct doc-id collection for group-by estimation

use roaring::RoaringBitmap;

use crate::posting::DocId;

/// Distinct doc-id set with an explicit capacity
///
/// Collection stops being exact once the capacity is reached; the caller
/// falls back to estimation and flags the result accordingly.
#[derive(Clone, Debug)]
pub struct GroupCollector {
    set: RoaringBitmap,
    limit: usize,
    len: usize,
}

impl GroupCollector {
    pub fn new(limit: usize) -> Self {
        Self {
            set: RoaringBitmap::new(),
            limit,
            len: 0,
        }
    }

    /// Add a doc id; returns true when it was not yet present
    ///
    /// Ids offered at or beyond the capacity are dropped.
    pub fn add(&mut self, doc_id: DocId) -> bool {
        if self.len >= self.limit {
            return false;
        }
        let added = self.set.insert(doc_id.as_u32());
        if added {
            self.len += 1;
        }
        added
    }

    pub fn contains(&self, doc_id: DocId) -> bool {
        self.set.contains(doc_id.as_u32())
    }

    /// Remove a doc id (live-delete of a grouped document)
    pub fn remove(&mut self, doc_id: DocId) -> bool {
        let removed = self.set.remove(doc_id.as_u32());
        if removed {
            self.len -= 1;
        }
        removed
    }

    /// Whether the capacity has been reached
    pub fn is_exhausted(&self) -> bool {
        self.len >= self.limit
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Union another collection into this one, keeping the capacity bound
    pub fn union(&mut self, other: &GroupCollector) {
        for id in other.set.iter() {
            if !self.add(DocId(id)) && self.is_exhausted() {
                break;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_distinct_collection() {
        let mut group = GroupCollector::new(10);
        assert!(group.add(DocId(1)));
        assert!(!group.add(DocId(1)));
        assert!(group.add(DocId(2)));
        assert_eq!(group.len(), 2);
        assert!(group.contains(DocId(1)));
        assert!(!group.contains(DocId(3)));
    }

    #[test]
    fn test_capacity_bound() {
        let mut group = GroupCollector::new(3);
        for i in 0..5 {
            group.add(DocId(i));
        }
        assert_eq!(group.len(), 3);
        assert!(group.is_exhausted());
        assert!(!group.add(DocId(100)));
    }

    #[test]
    fn test_remove() {
        let mut group = GroupCollector::new(3);
        group.add(DocId(1));
        group.add(DocId(2));
        assert!(group.remove(DocId(1)));
        assert!(!group.remove(DocId(1)));
        assert_eq!(group.len(), 1);
        assert!(!group.is_exhausted());
    }

    #[test]
    fn test_union_respects_capacity() {
        let mut a = GroupCollector::new(3);
        a.add(DocId(1));

        let mut b = GroupCollector::new(10);
        for i in 10..20 {
            b.add(DocId(i));
        }

        a.union(&b);
        assert_eq!(a.len(), 3);
        assert!(a.is_exhausted());
    }
}
