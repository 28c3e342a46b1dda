use serde::{Deserialize, Serialize};

/// Per-table limits consumed by the relevance engine
///
/// Supplied by the owning table/collection provider and read-only here.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct TableConfig {
    /// Maximum number of distinct doc ids collected for group-by estimation
    pub group_by_limit: usize,
    /// Ceiling on how many documents a partially-loaded query may return
    pub max_return_count: usize,
}

impl Default for TableConfig {
    fn default() -> Self {
        Self {
            group_by_limit: 32_768,
            max_return_count: 1_000_000,
        }
    }
}

impl TableConfig {
    /// Set the group-by limit
    pub fn with_group_by_limit(mut self, limit: usize) -> Self {
        self.group_by_limit = limit;
        self
    }

    /// Set the max-return-count ceiling
    pub fn with_max_return_count(mut self, count: usize) -> Self {
        self.max_return_count = count;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = TableConfig::default();
        assert_eq!(config.group_by_limit, 32_768);
        assert_eq!(config.max_return_count, 1_000_000);
    }

    #[test]
    fn test_config_builder() {
        let config = TableConfig::default()
            .with_group_by_limit(100)
            .with_max_return_count(5_000);
        assert_eq!(config.group_by_limit, 100);
        assert_eq!(config.max_return_count, 5_000);
    }
}
