//! Incremental build controller
//!
//! A [`Funnel`] remembers the dependency graph it computed last, plus stat
//! snapshots of the graph and of everything outside it. Each build compares
//! fresh snapshots against the held ones and does the least work that keeps
//! the output correct:
//!
//! - graph changed (or nothing held yet): walk dependencies and rebuild
//! - only the complement changed: nothing to do in include mode, replay a
//!   patch in exclude mode
//! - nothing changed: cache hit

use crate::config::{FunnelConfig, FunnelOptions, Mode};
use crate::error::FunnelError;
use crate::materialize::Materializer;
use crate::resolver::{
    complement_of, list_all_files, resolve_entry, resolve_graph, DependencyWalker,
};
use crate::stats::{BuildOutcome, BuildStats};
use funnel_core::{ModuleSet, Patch, Snapshot};
use std::path::PathBuf;
use std::time::Instant;
use tracing::{debug, info, info_span};

/// Everything remembered between builds
///
/// Set as a whole after a successful rebuild, never piecemeal.
#[derive(Debug, Clone)]
struct FunnelState {
    graph: ModuleSet,
    graph_snapshot: Snapshot,
    complement: ModuleSet,
    complement_snapshot: Snapshot,
}

/// Filters an input tree down to (or away from) an entry's dependency graph
pub struct Funnel<W> {
    config: FunnelConfig,
    walker: W,
    materializer: Materializer,
    state: Option<FunnelState>,
    stats: BuildStats,
}

impl<W: DependencyWalker> Funnel<W> {
    /// Create a funnel; nothing is read until the first build
    pub fn new(config: FunnelConfig, walker: W) -> Self {
        let materializer = Materializer::new(config.link);
        Self {
            config,
            walker,
            materializer,
            state: None,
            stats: BuildStats::default(),
        }
    }

    /// Validate raw options and create a funnel
    pub fn from_options(
        input_root: impl Into<PathBuf>,
        output_root: impl Into<PathBuf>,
        options: FunnelOptions,
        walker: W,
    ) -> Result<Self, FunnelError> {
        let config = FunnelConfig::new(input_root, output_root, options)?;
        Ok(Self::new(config, walker))
    }

    pub fn config(&self) -> &FunnelConfig {
        &self.config
    }

    pub fn walker(&self) -> &W {
        &self.walker
    }

    /// Counters accumulated over every successful build
    pub fn stats(&self) -> &BuildStats {
        &self.stats
    }

    /// The held dependency graph, if a rebuild has completed
    pub fn dependency_graph(&self) -> Option<&ModuleSet> {
        self.state.as_ref().map(|state| &state.graph)
    }

    /// The held complement, if a rebuild has completed
    pub fn complement(&self) -> Option<&ModuleSet> {
        self.state.as_ref().map(|state| &state.complement)
    }

    /// Bring the output root up to date with the input root
    ///
    /// A rebuild that fails after clearing the output drops the held state,
    /// so the next build starts cold. Any earlier failure keeps it.
    pub fn build(&mut self) -> Result<BuildOutcome, FunnelError> {
        let span = info_span!(
            "funnel_build",
            label = %self.config.label,
            mode = ?self.config.mode
        );
        let _enter = span.enter();

        if let Some(outcome) = self.try_incremental()? {
            return Ok(outcome);
        }
        self.rebuild()
    }

    /// Outcomes that reuse the held graph; `None` means a rebuild is needed
    fn try_incremental(&mut self) -> Result<Option<BuildOutcome>, FunnelError> {
        let input_root = &self.config.input_root;
        let Some(state) = self.state.as_mut() else {
            debug!("no held state, cold start");
            return Ok(None);
        };

        let graph_snapshot = Snapshot::capture(input_root, &state.graph)?;
        let graph_patch = Patch::between(&state.graph_snapshot, &graph_snapshot);
        if !graph_patch.is_empty() {
            debug!("dependency graph changed ({} ops), rebuilding", graph_patch.len());
            return Ok(None);
        }

        let complement = complement_of(&list_all_files(input_root)?, &state.graph);
        let complement_snapshot = Snapshot::capture(input_root, &complement)?;
        let complement_patch = Patch::between(&state.complement_snapshot, &complement_snapshot);

        let outcome = if complement_patch.is_empty() {
            debug!("cache hit, no changes");
            self.stats.cache_hit += 1;
            BuildOutcome::CacheHit
        } else {
            match self.config.mode {
                Mode::Include => {
                    debug!("cache hit, no changes in dependency graph");
                    self.stats.cache_hit += 1;
                    BuildOutcome::GraphUnaffected
                }
                Mode::Exclude => {
                    debug!("applying patch ({} ops)", complement_patch.len());
                    complement_patch.apply(
                        input_root,
                        &self.config.output_root,
                        self.materializer.strategy(),
                    )?;
                    self.stats.patch_applied += 1;
                    BuildOutcome::PatchApplied {
                        ops: complement_patch.len(),
                    }
                }
            }
        };

        state.complement = complement;
        state.complement_snapshot = complement_snapshot;
        Ok(Some(outcome))
    }

    /// Resolve the entry, walk its dependencies and rewrite the output
    fn rebuild(&mut self) -> Result<BuildOutcome, FunnelError> {
        let input_root = self.config.input_root.clone();
        let output_root = self.config.output_root.clone();

        let Some(entry) = resolve_entry(&input_root, &self.config.entry)? else {
            return self.no_entry();
        };

        let started = Instant::now();
        let graph = resolve_graph(&self.walker, &input_root, &entry, &self.config.external)?;
        let walk_duration = started.elapsed();
        self.stats.dependency_walk += 1;
        self.stats.walk_duration += walk_duration;
        debug!(
            "dependency walk found {} modules in {:?}",
            graph.len(),
            walk_duration
        );

        let complement = complement_of(&list_all_files(&input_root)?, &graph);
        let graph_snapshot = Snapshot::capture(&input_root, &graph)?;
        let complement_snapshot = Snapshot::capture(&input_root, &complement)?;

        // The output stops matching any held state from here on
        self.state = None;
        self.materializer.clear(&output_root)?;
        let selected = match self.config.mode {
            Mode::Include => &graph,
            Mode::Exclude => &complement,
        };
        let report = self.materializer.materialize(&input_root, &output_root, selected)?;

        info!(
            "Rebuilt {}: {} modules in graph, {} in complement, {} files written",
            self.config.label,
            graph.len(),
            complement.len(),
            report.placed()
        );
        self.stats.full_rebuild += 1;

        let outcome = BuildOutcome::Rebuilt {
            graph: graph.len(),
            materialized: report.placed(),
        };
        self.state = Some(FunnelState {
            graph,
            graph_snapshot,
            complement,
            complement_snapshot,
        });
        Ok(outcome)
    }

    /// Entry not found: empty output for include, whole input for exclude
    fn no_entry(&mut self) -> Result<BuildOutcome, FunnelError> {
        let input_root = &self.config.input_root;
        let output_root = &self.config.output_root;
        debug!("entry did not exist: {}", self.config.entry);

        self.state = None;
        self.materializer.clear(output_root)?;

        let copied_all = match self.config.mode {
            Mode::Include => false,
            Mode::Exclude => {
                debug!("copying all modules");
                let all_files = list_all_files(input_root)?;
                self.materializer.materialize(input_root, output_root, &all_files)?;
                self.stats.copy_all += 1;
                true
            }
        };

        self.stats.no_entry += 1;
        Ok(BuildOutcome::NoEntry { copied_all })
    }
}
