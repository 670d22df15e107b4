//! Materialize a set of modules into the output tree
//!
//! Parent directories are created up front, then files are placed in
//! parallel. Placement is per-file atomic (see [`funnel_core::place_file`]).

use crate::error::FunnelError;
use funnel_core::{place_file, stat_or_none, LinkStrategy, ModulePath, ModuleSet, Placement};
use rayon::prelude::*;
use std::collections::BTreeSet;
use std::fs;
use std::path::Path;
use tracing::{debug, trace};

/// Counts of what one materialization wrote
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MaterializeReport {
    /// Files placed as symlinks
    pub linked: usize,
    /// Files placed as byte copies
    pub copied: usize,
    /// Modules skipped because their source does not exist
    pub skipped: usize,
}

impl MaterializeReport {
    /// Files written to the output
    pub fn placed(&self) -> usize {
        self.linked + self.copied
    }

    fn record(&mut self, placement: Placement) {
        match placement {
            Placement::Linked => self.linked += 1,
            Placement::Copied => self.copied += 1,
            Placement::SkippedMissing => self.skipped += 1,
        }
    }
}

/// Places modules from an input root into an output root
#[derive(Debug, Clone, Copy, Default)]
pub struct Materializer {
    strategy: LinkStrategy,
}

impl Materializer {
    pub fn new(strategy: LinkStrategy) -> Self {
        Self { strategy }
    }

    pub fn strategy(&self) -> LinkStrategy {
        self.strategy
    }

    /// Empty `output_root`, creating it if missing
    ///
    /// The root directory itself is kept.
    pub fn clear(&self, output_root: &Path) -> Result<(), FunnelError> {
        if stat_or_none(output_root)?.is_none() {
            fs::create_dir_all(output_root).map_err(|e| FunnelError::io(output_root, e))?;
            return Ok(());
        }

        let entries = fs::read_dir(output_root).map_err(|e| FunnelError::io(output_root, e))?;
        for entry in entries {
            let entry = entry.map_err(|e| FunnelError::io(output_root, e))?;
            let path = entry.path();
            let file_type = entry.file_type().map_err(|e| FunnelError::io(&path, e))?;

            let result = if file_type.is_dir() {
                fs::remove_dir_all(&path)
            } else {
                fs::remove_file(&path)
            };
            result.map_err(|e| FunnelError::io(&path, e))?;
        }

        trace!("cleared {}", output_root.display());
        Ok(())
    }

    /// Place every existing module of `modules` under `output_root`
    ///
    /// Modules whose source is missing are skipped silently.
    pub fn materialize(
        &self,
        input_root: &Path,
        output_root: &Path,
        modules: &ModuleSet,
    ) -> Result<MaterializeReport, FunnelError> {
        let mut report = MaterializeReport::default();

        let mut present: Vec<&ModulePath> = Vec::with_capacity(modules.len());
        for module in modules {
            match stat_or_none(&module.to_fs_path(input_root))? {
                Some(stat) if !stat.is_dir => present.push(module),
                Some(_) => {
                    trace!("skipping directory module: {}", module);
                    report.skipped += 1;
                }
                None => report.skipped += 1,
            }
        }

        // Each directory once, shallowest first
        let dirs: BTreeSet<ModulePath> = present.iter().filter_map(|m| m.parent()).collect();
        for dir in &dirs {
            let path = dir.to_fs_path(output_root);
            fs::create_dir_all(&path).map_err(|e| FunnelError::io(&path, e))?;
        }

        let strategy = self.strategy;
        let placements: Vec<Result<Placement, FunnelError>> = present
            .par_iter()
            .map(|module| {
                let source = module.to_fs_path(input_root);
                let dest = module.to_fs_path(output_root);
                place_file(&source, &dest, strategy).map_err(FunnelError::from)
            })
            .collect();

        for placement in placements {
            report.record(placement?);
        }

        debug!(
            "materialized {} files into {} ({} linked, {} copied, {} skipped)",
            report.placed(),
            output_root.display(),
            report.linked,
            report.copied,
            report.skipped
        );
        Ok(report)
    }
}
