//! Pipeline statistics

use serde::Serialize;

/// Counters kept across the life of a pipeline
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Stats {
    /// Transformation passes executed
    pub passes_run: u64,
    /// Passes refused by the rate limiter
    pub passes_suppressed: u64,
    /// Mutation batches received while enabled
    pub mutation_batches: u64,
    /// Text leaves turned into processed regions
    pub leaves_transformed: u64,
    /// Processed regions turned back into text
    pub regions_reverted: u64,
    /// Operations refused by the host (locked document)
    pub access_denied: u64,
}

impl Stats {
    /// Reset all counters
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stats_reset() {
        let mut stats = Stats {
            passes_run: 3,
            leaves_transformed: 10,
            ..Stats::default()
        };
        assert_eq!(stats.passes_run, 3);
        stats.reset();
        assert_eq!(stats, Stats::default());
    }
}
