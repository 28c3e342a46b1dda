//! Boolean combination of result stores
//!
//! OR unions, AND intersects, and negated stores combine through the
//! AND-for-NOT rule: exclusions union with exclusions, and an exclusion set
//! subtracts from a match set.

use super::score::saturating_score_add;
use super::store::ResultStore;

/// Union of two stores, summing scores for doc ids present in both
///
/// Group collections are unioned as well.
pub fn or_merge(mut a: ResultStore, mut b: ResultStore) -> ResultStore {
    for record in b.iter() {
        match a.try_get(record.doc_id) {
            Some(handle) => {
                let merged = saturating_score_add(a.record(handle).score, record.score);
                a.update_score(record.doc_id, merged);
            }
            None => {
                // Doc id is absent from `a`, insert cannot collide
                a.insert(record.doc_id, record.clone())
                    .expect("or_merge inserts only absent doc ids");
            }
        }
    }

    if let Some(other) = b.take_group() {
        match a.group_mut() {
            Some(group) => group.union(&other),
            None => a.set_group(other),
        }
    }

    a
}

/// Intersection of two non-negated stores
///
/// Iterates the smaller store and probes the larger one; scores sum and the
/// payload carries over from whichever side has one.
pub fn and_merge_dict(a: ResultStore, b: ResultStore) -> ResultStore {
    let (src, dest) = if a.len() > b.len() { (b, a) } else { (a, b) };

    let mut result = ResultStore::new();
    result.negated = dest.negated;

    for record in src.iter() {
        if let Some(handle) = dest.try_get(record.doc_id) {
            let mut merged = dest.record(handle).clone();
            merged.score = saturating_score_add(merged.score, record.score);
            if merged.payload.is_none() {
                merged.payload = record.payload.clone();
            }
            result
                .insert(record.doc_id, merged)
                .expect("src holds each doc id once");
        }
    }

    result
}

/// AND combination when at least one side is negated
///
/// Both negated: the result is negated and its members are the union of the
/// exclusions. Exactly one negated: ordinary set difference, result
/// non-negated. Either way the estimate resets to the resulting entry count.
pub fn and_merge_for_not(a: ResultStore, b: ResultStore) -> ResultStore {
    // Iterate the smaller store for efficiency
    let (a, b) = if a.len() > b.len() { (b, a) } else { (a, b) };

    if a.negated && b.negated {
        let mut union = b;
        for record in a.iter() {
            if !union.contains(record.doc_id) {
                union
                    .insert(record.doc_id, record.clone())
                    .expect("checked absent before insert");
            }
        }
        let count = union.len();
        union.set_rel_total_count(count);
        union
    } else {
        let (mut yes, not) = if a.negated { (b, a) } else { (a, b) };
        for doc_id in not.doc_ids().collect::<Vec<_>>() {
            yes.remove(doc_id);
        }
        let count = yes.len();
        yes.set_rel_total_count(count);
        yes
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::posting::DocId;
    use crate::rank::store::DocumentRecord;

    fn store_with(entries: &[(u32, i64)]) -> ResultStore {
        let mut store = ResultStore::new();
        for &(id, score) in entries {
            store
                .insert(
                    DocId(id),
                    DocumentRecord {
                        doc_id: DocId(id),
                        score,
                        hit_count: 1,
                        ..Default::default()
                    },
                )
                .unwrap();
        }
        store
    }

    fn negated(mut store: ResultStore) -> ResultStore {
        store.negated = true;
        store
    }

    #[test]
    fn test_or_merge_disjoint_sizes_add() {
        let a = store_with(&[(1, 10), (2, 20)]);
        let b = store_with(&[(3, 30), (4, 40), (5, 50)]);
        let merged = or_merge(a, b);
        assert_eq!(merged.len(), 5);
    }

    #[test]
    fn test_or_merge_sums_overlap() {
        let a = store_with(&[(1, 10), (2, 20)]);
        let b = store_with(&[(2, 5), (3, 30)]);
        let merged = or_merge(a, b);

        assert_eq!(merged.len(), 3);
        let h = merged.try_get(DocId(2)).unwrap();
        assert_eq!(merged.record(h).score, 25);
    }

    #[test]
    fn test_and_merge_keeps_intersection() {
        let a = store_with(&[(1, 10), (2, 20), (3, 30)]);
        let b = store_with(&[(2, 2), (3, 3), (4, 4)]);
        let result = and_merge_dict(a, b);

        assert_eq!(result.len(), 2);
        let h = result.try_get(DocId(2)).unwrap();
        assert_eq!(result.record(h).score, 22);
        assert!(!result.contains(DocId(1)));
        assert!(!result.contains(DocId(4)));
    }

    #[test]
    fn test_and_merge_payload_carry() {
        let mut a = store_with(&[(1, 10)]);
        let payload: std::sync::Arc<[u8]> = vec![7u8, 8u8].into();
        let h = a.try_get(DocId(1)).unwrap();
        a.record_mut(h).payload = Some(payload.clone());

        let b = store_with(&[(1, 5)]);
        let result = and_merge_dict(b, a);

        let h = result.try_get(DocId(1)).unwrap();
        assert_eq!(result.record(h).payload.as_deref(), Some(&[7u8, 8u8][..]));
    }

    #[test]
    fn test_not_and_not_is_negated_union() {
        let a = negated(store_with(&[(1, 1), (2, 1)]));
        let b = negated(store_with(&[(2, 1), (3, 1)]));
        let result = and_merge_for_not(a, b);

        assert!(result.negated);
        assert_eq!(result.len(), 3);
        for id in [1, 2, 3] {
            assert!(result.contains(DocId(id)));
        }
        assert_eq!(result.rel_total_count(), 3);
    }

    #[test]
    fn test_yes_and_not_is_difference() {
        let a = store_with(&[(1, 1), (2, 1), (3, 1)]);
        let b = negated(store_with(&[(2, 1), (9, 1)]));
        let result = and_merge_for_not(a, b);

        assert!(!result.negated);
        assert_eq!(result.len(), 2);
        assert!(result.contains(DocId(1)));
        assert!(!result.contains(DocId(2)));
        assert!(result.contains(DocId(3)));
    }

    #[test]
    fn test_difference_with_larger_negated_side() {
        // Swap path: the negated store is smaller and iterated first
        let a = negated(store_with(&[(5, 1)]));
        let b = store_with(&[(4, 1), (5, 1), (6, 1), (7, 1)]);
        let result = and_merge_for_not(a, b);

        assert!(!result.negated);
        assert_eq!(result.len(), 3);
        assert!(!result.contains(DocId(5)));
    }
}
