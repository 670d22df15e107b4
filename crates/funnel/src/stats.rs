//! Build statistics and outcomes

use std::time::Duration;

/// Counters accumulated across every build of one funnel.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BuildStats {
    /// Builds that wrote nothing (no change, or only complement changes in include mode).
    pub cache_hit: u64,

    /// Builds that replayed a complement patch onto the output.
    pub patch_applied: u64,

    /// Builds that found no entry module.
    pub no_entry: u64,

    /// No-entry builds that copied the whole input tree (exclude mode).
    pub copy_all: u64,

    /// Dependency walks performed.
    pub dependency_walk: u64,

    /// Full rebuilds that completed.
    pub full_rebuild: u64,

    /// Time spent in the dependency walker.
    pub walk_duration: Duration,
}

impl BuildStats {
    /// Total builds that completed successfully
    pub fn builds(&self) -> u64 {
        self.cache_hit + self.patch_applied + self.no_entry + self.full_rebuild
    }
}

/// What a single build did
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BuildOutcome {
    /// Nothing relevant changed; the output was not touched
    CacheHit,
    /// Only files outside the graph changed (include mode); output untouched
    GraphUnaffected,
    /// Complement changes were patched onto the output (exclude mode)
    PatchApplied {
        /// Number of patch operations applied
        ops: usize,
    },
    /// Graph recomputed and output rebuilt from scratch
    Rebuilt {
        /// Size of the new dependency graph
        graph: usize,
        /// Files written to the output
        materialized: usize,
    },
    /// Entry module was not found
    NoEntry {
        /// Whether the whole input tree was copied (exclude mode)
        copied_all: bool,
    },
}

impl BuildOutcome {
    /// Whether the output tree was left untouched
    pub fn is_cache_hit(&self) -> bool {
        matches!(self, BuildOutcome::CacheHit | BuildOutcome::GraphUnaffected)
    }
}
