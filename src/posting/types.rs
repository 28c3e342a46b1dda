//! Core types for posting lists

use serde::{Deserialize, Serialize};
use std::fmt;

/// Document identifier within one table
///
/// Posting streams yield doc ids in strictly ascending order.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct DocId(pub u32);

impl DocId {
    pub fn new(id: u32) -> Self {
        Self(id)
    }

    pub fn as_u32(self) -> u32 {
        self.0
    }

    pub fn as_usize(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for DocId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A single posting: one term's occurrence summary within one document
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Posting {
    /// Document this posting belongs to
    pub doc_id: DocId,
    /// Term frequency in this document
    pub term_frequency: u32,
    /// Position of the first occurrence within the document
    pub first_position: u32,
    /// Total word count of the document (length normalization input)
    pub doc_word_count: u32,
}

impl Posting {
    pub fn new(doc_id: DocId, term_frequency: u32, first_position: u32, doc_word_count: u32) -> Self {
        Self {
            doc_id,
            term_frequency,
            first_position,
            doc_word_count,
        }
    }
}
