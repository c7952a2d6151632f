//! Configuration for an [`IntervalTree`](super::IntervalTree).

use super::payload::FieldKey;

/// How ids are chosen when an interval is added without one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum IdStrategy {
    /// `"0"`, `"1"`, ... skipping ids that are already taken.
    #[default]
    Sequential,
    /// Random UUID v4 strings.
    Uuid,
}

/// Tree configuration.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TreeConfig {
    /// Payload field holding the interval start.
    pub start_key: FieldKey,
    /// Payload field holding the interval end.
    pub end_key: FieldKey,
    /// Id assignment for [`IntervalTree::add`](super::IntervalTree::add).
    pub id_strategy: IdStrategy,
    /// Insertion depth above which a warning is logged.
    ///
    /// The tree never rebalances, so ordered insertion of disjoint intervals
    /// degrades it towards a list.
    pub depth_warning: usize,
}

impl TreeConfig {
    /// Default configuration reading start/end from the given payload fields.
    pub fn with_keys(start_key: impl Into<FieldKey>, end_key: impl Into<FieldKey>) -> Self {
        Self {
            start_key: start_key.into(),
            end_key: end_key.into(),
            ..Self::default()
        }
    }

    pub fn id_strategy(mut self, strategy: IdStrategy) -> Self {
        self.id_strategy = strategy;
        self
    }

    pub fn depth_warning(mut self, depth: usize) -> Self {
        self.depth_warning = depth;
        self
    }
}

impl Default for TreeConfig {
    fn default() -> Self {
        Self {
            start_key: FieldKey::Index(0),
            end_key: FieldKey::Index(1),
            id_strategy: IdStrategy::Sequential,
            depth_warning: 64,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_reads_first_two_positions() {
        let cfg = TreeConfig::default();
        assert_eq!(cfg.start_key, FieldKey::Index(0));
        assert_eq!(cfg.end_key, FieldKey::Index(1));
        assert_eq!(cfg.id_strategy, IdStrategy::Sequential);
        assert!(cfg.depth_warning > 0);
    }

    #[test]
    fn with_keys_by_name() {
        let cfg = TreeConfig::with_keys("begin", "finish")
            .id_strategy(IdStrategy::Uuid)
            .depth_warning(8);
        assert_eq!(cfg.start_key, FieldKey::Name("begin".into()));
        assert_eq!(cfg.end_key, FieldKey::Name("finish".into()));
        assert_eq!(cfg.id_strategy, IdStrategy::Uuid);
        assert_eq!(cfg.depth_warning, 8);
    }

    #[cfg(feature = "serde")]
    #[test]
    fn config_roundtrips_through_json() {
        let cfg = TreeConfig::with_keys("start", 1_usize);
        let json = serde_json::to_string(&cfg).unwrap();
        let back: TreeConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(back, cfg);
    }
}
