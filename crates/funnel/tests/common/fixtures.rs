//! Fixture trees and output inspection helpers

use dependency_funnel::{Funnel, FunnelOptions};
use filetime::FileTime;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicI64, Ordering};
use std::time::SystemTime;
use tempfile::TempDir;
use walkdir::WalkDir;

use super::ImportWalker;

/// Externals configured for every scenario
pub const EXTERNAL: &[&str] = &["ember-engines/routes"];

const ROUTES: &str = r#"
import buildRoutes from "ember-engines/routes";
import foo from "utils/foo";
import bar from "some-external/thing";
"#;

/// Distinct mtimes for rewritten files, far from "now"
static NEXT_MTIME: AtomicI64 = AtomicI64::new(1_500_000_000);

/// Where the modules of a fixture live
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Layout {
    /// Modules directly under the input root
    Flat,
    /// Modules under `modules/`
    Nested,
}

impl Layout {
    pub const ALL: [Layout; 2] = [Layout::Flat, Layout::Nested];

    fn prefix(self) -> &'static str {
        match self {
            Layout::Flat => "",
            Layout::Nested => "modules",
        }
    }
}

/// Input and output roots for one scenario
pub struct Fixture {
    _temp_dir: TempDir,
    pub input: PathBuf,
    pub output: PathBuf,
    pub layout: Layout,
}

impl Fixture {
    /// Write the standard module tree
    ///
    /// `routes.js -> [ember-engines/routes, utils/foo, some-external/thing]`,
    /// `utils/foo.js -> [./derp]`, `utils/derp.js`, `utils/herp.js`,
    /// `engine.js -> [./utils/herp]`.
    pub fn new(layout: Layout) -> Self {
        init_tracing();

        let temp_dir = TempDir::new().unwrap();
        let input = temp_dir.path().join("input");
        let output = temp_dir.path().join("output");
        fs::create_dir_all(&input).unwrap();

        let fixture = Self {
            _temp_dir: temp_dir,
            input,
            output,
            layout,
        };
        fixture.write("routes.js", ROUTES);
        fixture.write("utils/foo.js", r#"import derp from "./derp"; export default {};"#);
        fixture.write("utils/derp.js", "export default {};");
        fixture.write("utils/herp.js", "export default {};");
        fixture.write("engine.js", r#"import herp from "./utils/herp";"#);
        fixture
    }

    /// Module directory inside the input root
    pub fn modules_dir(&self) -> PathBuf {
        join(&self.input, self.layout.prefix())
    }

    /// Module directory inside the output root
    pub fn output_modules_dir(&self) -> PathBuf {
        join(&self.output, self.layout.prefix())
    }

    /// Path of a module in the input tree
    pub fn module(&self, rel: &str) -> PathBuf {
        join(&self.modules_dir(), rel)
    }

    /// Path of a module in the output tree
    pub fn output_module(&self, rel: &str) -> PathBuf {
        join(&self.output_modules_dir(), rel)
    }

    /// Write a module, creating parent directories
    pub fn write(&self, rel: &str, contents: &str) {
        let path = self.module(rel);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, contents).unwrap();
    }

    /// Write a module and move its mtime to a value no other write used
    pub fn rewrite(&self, rel: &str, contents: &str) {
        self.write(rel, contents);
        let secs = NEXT_MTIME.fetch_add(10, Ordering::SeqCst);
        filetime::set_file_mtime(self.module(rel), FileTime::from_unix_time(secs, 0)).unwrap();
    }

    pub fn remove(&self, rel: &str) {
        fs::remove_file(self.module(rel)).unwrap();
    }

    /// A funnel over this fixture using the import walker
    pub fn funnel(&self, options: FunnelOptions) -> Funnel<ImportWalker> {
        let options = options.with_external(EXTERNAL.iter().copied());
        Funnel::from_options(&self.input, &self.output, options, ImportWalker).unwrap()
    }

    /// Listing of the output module directory
    pub fn output_listing(&self) -> Vec<String> {
        listing(&self.output_modules_dir())
    }
}

fn join(root: &Path, rel: &str) -> PathBuf {
    rel.split('/').filter(|s| !s.is_empty()).fold(root.to_path_buf(), |p, s| p.join(s))
}

/// Sorted relative paths below `root`, directories suffixed with `/`
///
/// Symlinks are listed as files and not followed. A missing root lists
/// nothing.
pub fn listing(root: &Path) -> Vec<String> {
    if !root.exists() {
        return Vec::new();
    }

    let mut paths: Vec<String> = WalkDir::new(root)
        .min_depth(1)
        .into_iter()
        .map(|entry| {
            let entry = entry.unwrap();
            let rel = entry.path().strip_prefix(root).unwrap();
            let rel = rel
                .components()
                .map(|c| c.as_os_str().to_string_lossy().into_owned())
                .collect::<Vec<_>>()
                .join("/");
            if entry.file_type().is_dir() {
                format!("{}/", rel)
            } else {
                rel
            }
        })
        .collect();
    paths.sort();
    paths
}

/// Modification time without following symlinks
pub fn mtime(path: &Path) -> SystemTime {
    fs::symlink_metadata(path).unwrap().modified().unwrap()
}

/// Pin a path's times to a fixed past value, without following symlinks
///
/// A symlinked output keeps pointing at an untouched input file.
pub fn pin_mtime(path: &Path) -> SystemTime {
    let pinned = FileTime::from_unix_time(1_000_000_000, 0);
    filetime::set_symlink_file_times(path, pinned, pinned).unwrap();
    mtime(path)
}

/// Route funnel logs to the test harness
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_test_writer()
        .with_max_level(tracing::Level::DEBUG)
        .try_init();
}
