//! A small import walker for fixture trees
//!
//! Understands `import x from "name";` statements only. Names starting with
//! `./` are relative to the importing module, all others to the module root.

use anyhow::{bail, Context};
use dependency_funnel::{DependencyWalker, EntryLocation, ModulePath};
use std::collections::BTreeSet;
use std::fs;
use std::io::ErrorKind;
use std::path::Path;

pub struct ImportWalker;

impl DependencyWalker for ImportWalker {
    fn walk(
        &self,
        root: &Path,
        entry: &EntryLocation,
        external: &BTreeSet<String>,
    ) -> anyhow::Result<Vec<ModulePath>> {
        let mut seen: BTreeSet<ModulePath> = BTreeSet::new();
        let mut found = Vec::new();
        let mut queue = vec![entry.path.clone()];

        while let Some(module) = queue.pop() {
            let source = match fs::read_to_string(module.to_fs_path(root)) {
                Ok(source) => source,
                Err(e) if e.kind() == ErrorKind::NotFound => continue,
                Err(e) => return Err(e).with_context(|| format!("reading {}", module)),
            };

            let names = imports(&source).with_context(|| format!("parsing {}", module))?;
            for name in names {
                if external.contains(&name) {
                    continue;
                }
                let dep = resolve(&module, entry.module_root.as_ref(), &name)?;
                if seen.insert(dep.clone()) {
                    found.push(dep.clone());
                    queue.push(dep);
                }
            }
        }

        Ok(found)
    }
}

fn imports(source: &str) -> anyhow::Result<Vec<String>> {
    let mut names = Vec::new();
    for statement in source.split(|c| c == ';' || c == '\n') {
        let statement = statement.trim();
        if !statement.starts_with("import") {
            continue;
        }
        let mut quoted = statement.split('"');
        match (quoted.next(), quoted.next(), quoted.next()) {
            (Some(_), Some(name), Some(_)) if !name.is_empty() => names.push(name.to_string()),
            _ => bail!("malformed import: {:?}", statement),
        }
    }
    Ok(names)
}

fn resolve(
    importer: &ModulePath,
    module_root: Option<&ModulePath>,
    name: &str,
) -> anyhow::Result<ModulePath> {
    let (base, rel) = match name.strip_prefix("./") {
        Some(rel) => (importer.parent(), rel),
        None => (module_root.cloned(), name),
    };
    let joined = match base {
        Some(dir) => format!("{}/{}", dir, rel),
        None => rel.to_string(),
    };
    let with_ext = if joined.ends_with(".js") {
        joined
    } else {
        format!("{}.js", joined)
    };
    Ok(ModulePath::new(&with_ext)?)
}
