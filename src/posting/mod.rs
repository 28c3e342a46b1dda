//! Posting-list types and the posting source interface

mod source;
mod types;

pub use source::{MemoryPostingSource, PostingSource};
pub use types::{DocId, Posting};
