use thiserror::Error;

use crate::posting::DocId;

/// Main error type for rankex operations
#[derive(Error, Debug)]
pub enum RankexError {
    #[error("Duplicate doc id inserted into result store: {0}")]
    DuplicateDocId(DocId),

    #[error("Document-length normalizer must be positive for term {word:?}, got {value}")]
    ZeroNormalizer { word: String, value: i64 },
}

/// Result type alias for rankex operations
pub type Result<T> = std::result::Result<T, RankexError>;

impl RankexError {
    /// Check if this error indicates a caller defect rather than bad input data
    pub fn is_caller_defect(&self) -> bool {
        matches!(self, RankexError::DuplicateDocId(_))
    }
}
