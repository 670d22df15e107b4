//! Funnel configuration
//!
//! Raw options mirror what a host pipeline passes in (`include`/`exclude`
//! flags, entry, externals). They are validated once into a [`FunnelConfig`];
//! a funnel never runs with an unvalidated mode.

use crate::error::FunnelError;
use funnel_core::{LinkStrategy, ModulePath};
use serde::Deserialize;
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

/// Which side of the partition is materialized
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    /// Output is the entry's dependency graph
    Include,
    /// Output is everything outside the dependency graph
    Exclude,
}

impl Mode {
    /// Convert raw include/exclude flags, requiring exactly one
    pub fn from_flags(include: bool, exclude: bool) -> Result<Self, FunnelError> {
        match (include, exclude) {
            (true, false) => Ok(Mode::Include),
            (false, true) => Ok(Mode::Exclude),
            _ => Err(FunnelError::Config(
                "must specify exactly one of `include` or `exclude`".to_string(),
            )),
        }
    }
}

/// Raw funnel options, as written in a host's options file
///
/// ```toml
/// include = true
/// entry = "routes.js"
/// external = ["ember-engines/routes"]
/// link = "symlink"
/// ```
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FunnelOptions {
    /// Materialize the dependency graph
    pub include: bool,
    /// Materialize everything outside the dependency graph
    pub exclude: bool,
    /// Entry module, relative to the input root
    pub entry: String,
    /// Module names resolved outside the input tree
    pub external: BTreeSet<String>,
    /// How files are placed in the output
    pub link: LinkStrategy,
    /// Instance name used in logs
    pub name: Option<String>,
    /// Free-form annotation used in logs
    pub annotation: Option<String>,
}

impl FunnelOptions {
    /// Options selecting the entry's dependency graph
    pub fn include(entry: impl Into<String>) -> Self {
        Self {
            include: true,
            entry: entry.into(),
            ..Self::default()
        }
    }

    /// Options selecting everything outside the entry's dependency graph
    pub fn exclude(entry: impl Into<String>) -> Self {
        Self {
            exclude: true,
            entry: entry.into(),
            ..Self::default()
        }
    }

    /// Add externally resolved module names
    pub fn with_external<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.external.extend(names.into_iter().map(Into::into));
        self
    }

    /// Set the placement strategy
    pub fn with_link(mut self, link: LinkStrategy) -> Self {
        self.link = link;
        self
    }

    /// Set the instance name
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Check the flags and entry, returning the selected mode
    pub fn validate(&self) -> Result<Mode, FunnelError> {
        let mode = Mode::from_flags(self.include, self.exclude)?;
        if self.entry.trim().is_empty() {
            return Err(FunnelError::Config("`entry` must not be empty".to_string()));
        }
        Ok(mode)
    }

    /// Parse options from TOML
    pub fn from_toml_str(source: &str) -> Result<Self, FunnelError> {
        Ok(toml::from_str(source)?)
    }

    /// Load options from a TOML file
    pub fn load(path: &Path) -> Result<Self, FunnelError> {
        let source = std::fs::read_to_string(path).map_err(|e| FunnelError::io(path, e))?;
        Self::from_toml_str(&source)
    }
}

/// Validated, immutable configuration of one funnel instance
#[derive(Debug, Clone)]
pub struct FunnelConfig {
    /// Directory the modules are read from
    pub input_root: PathBuf,
    /// Directory the selected modules are materialized into
    pub output_root: PathBuf,
    /// Which side of the partition is materialized
    pub mode: Mode,
    /// Entry module as configured (before nested-root resolution)
    pub entry: ModulePath,
    /// Module names resolved outside the input tree
    pub external: BTreeSet<String>,
    /// How files are placed in the output
    pub link: LinkStrategy,
    /// Label for logs (`name`, then `annotation`, then "funnel")
    pub label: String,
}

impl FunnelConfig {
    /// Validate raw options for the given roots
    pub fn new(
        input_root: impl Into<PathBuf>,
        output_root: impl Into<PathBuf>,
        options: FunnelOptions,
    ) -> Result<Self, FunnelError> {
        let mode = options.validate()?;
        let entry = ModulePath::new(&options.entry)
            .map_err(|e| FunnelError::Config(e.to_string()))?;

        let input_root = input_root.into();
        let output_root = output_root.into();
        check_disjoint_roots(&input_root, &output_root)?;

        let label = options
            .name
            .or(options.annotation)
            .unwrap_or_else(|| "funnel".to_string());

        Ok(Self {
            input_root,
            output_root,
            mode,
            entry,
            external: options.external,
            link: options.link,
            label,
        })
    }
}

/// Neither root may equal or contain the other, compared lexically
fn check_disjoint_roots(input_root: &Path, output_root: &Path) -> Result<(), FunnelError> {
    let input = std::path::absolute(input_root).unwrap_or_else(|_| input_root.to_path_buf());
    let output = std::path::absolute(output_root).unwrap_or_else(|_| output_root.to_path_buf());

    if input == output {
        return Err(FunnelError::Config(format!(
            "input and output roots must differ: {}",
            input_root.display()
        )));
    }
    if input.starts_with(&output) {
        return Err(FunnelError::Config(format!(
            "input root {} is inside output root {}",
            input_root.display(),
            output_root.display()
        )));
    }
    if output.starts_with(&input) {
        return Err(FunnelError::Config(format!(
            "output root {} is inside input root {}",
            output_root.display(),
            input_root.display()
        )));
    }
    Ok(())
}
