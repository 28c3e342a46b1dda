pub mod config;
pub mod error;
pub mod posting;
pub mod rank;

pub use config::TableConfig;
pub use error::{RankexError, Result};
pub use posting::{DocId, MemoryPostingSource, Posting, PostingSource};
pub use rank::{
    DocumentRecord, GroupCollector, LiveFilter, MergeResult, MergeStats, MergeStrategy, Merger,
    QueryWord, ResultStore, SearchOptions, TermReader, TombstoneFilter,
};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
