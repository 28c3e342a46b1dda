//! Block arena for scoring records
//!
//! Records are stored in fixed-capacity blocks that are only ever appended,
//! so a `(block, slot)` handle issued at insertion stays valid for the life
//! of the arena. Handles are resolved to references at access time; nothing
//! hands out a pointer that growth could invalidate.

use super::store::DocumentRecord;

/// Default records per block
///
/// A legacy default of 32768 wasted memory on small result sets.
pub const DEFAULT_BLOCK_SIZE: usize = 128;

/// Hard ceiling on pre-sizing, bounding worst-case up-front allocation
pub const MAX_PRESIZE: usize = 1_048_576;

/// Stable handle to a record in the arena
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Handle {
    block: u32,
    slot: u32,
}

/// Append-only arena of fixed-capacity record blocks
pub struct RecordArena {
    blocks: Vec<Vec<DocumentRecord>>,
    block_size: usize,
    len: usize,
}

impl RecordArena {
    pub fn new() -> Self {
        Self::with_block_size(DEFAULT_BLOCK_SIZE)
    }

    /// Create an arena sized for an expected record volume
    ///
    /// The block size is rounded up to the next `DEFAULT_BLOCK_SIZE`
    /// boundary at or above the estimate and capped at `MAX_PRESIZE`.
    pub fn with_estimate(estimate: usize) -> Self {
        let rounded = estimate.div_ceil(DEFAULT_BLOCK_SIZE) * DEFAULT_BLOCK_SIZE;
        Self::with_block_size(rounded.clamp(DEFAULT_BLOCK_SIZE, MAX_PRESIZE))
    }

    fn with_block_size(block_size: usize) -> Self {
        Self {
            blocks: Vec::new(),
            block_size,
            len: 0,
        }
    }

    /// Append a record, returning its stable handle
    pub fn push(&mut self, record: DocumentRecord) -> Handle {
        if self
            .blocks
            .last()
            .map_or(true, |b| b.len() >= self.block_size)
        {
            self.blocks.push(Vec::with_capacity(self.block_size));
        }
        let block = self.blocks.len() - 1;
        let current = self.blocks.last_mut().unwrap();
        let slot = current.len();
        current.push(record);
        self.len += 1;
        Handle {
            block: block as u32,
            slot: slot as u32,
        }
    }

    pub fn get(&self, handle: Handle) -> &DocumentRecord {
        &self.blocks[handle.block as usize][handle.slot as usize]
    }

    pub fn get_mut(&mut self, handle: Handle) -> &mut DocumentRecord {
        &mut self.blocks[handle.block as usize][handle.slot as usize]
    }

    /// Number of records ever pushed (removal is tracked by the index map,
    /// not the arena)
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn block_size(&self) -> usize {
        self.block_size
    }
}

impl Default for RecordArena {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::posting::DocId;

    fn record(id: u32, score: i64) -> DocumentRecord {
        DocumentRecord {
            doc_id: DocId(id),
            score,
            ..Default::default()
        }
    }

    #[test]
    fn test_push_and_get() {
        let mut arena = RecordArena::new();
        let h = arena.push(record(7, 123));
        assert_eq!(arena.get(h).doc_id, DocId(7));
        assert_eq!(arena.get(h).score, 123);
    }

    #[test]
    fn test_handles_stable_across_growth() {
        let mut arena = RecordArena::with_block_size(4);
        let handles: Vec<Handle> = (0..100).map(|i| arena.push(record(i, i as i64))).collect();

        // Every handle issued before growth still resolves to its record
        for (i, h) in handles.iter().enumerate() {
            assert_eq!(arena.get(*h).doc_id, DocId(i as u32));
            assert_eq!(arena.get(*h).score, i as i64);
        }
        assert_eq!(arena.len(), 100);
    }

    #[test]
    fn test_estimate_rounding() {
        assert_eq!(RecordArena::with_estimate(0).block_size(), 128);
        assert_eq!(RecordArena::with_estimate(1).block_size(), 128);
        assert_eq!(RecordArena::with_estimate(128).block_size(), 128);
        assert_eq!(RecordArena::with_estimate(129).block_size(), 256);
        assert_eq!(
            RecordArena::with_estimate(usize::MAX / 2).block_size(),
            MAX_PRESIZE
        );
    }

    #[test]
    fn test_get_mut() {
        let mut arena = RecordArena::new();
        let h = arena.push(record(1, 10));
        arena.get_mut(h).score = 99;
        assert_eq!(arena.get(h).score, 99);
    }
}
