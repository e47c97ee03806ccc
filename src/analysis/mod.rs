// Analysis module: discovering, loading and classifying Python modules

pub mod classify;
pub mod loader;
pub mod modules;
pub mod realize;
pub mod search;
pub mod walker;

pub use classify::{classify, Classifier};
pub use loader::{ModuleLoader, PythonLoader};
pub use modules::*;
pub use realize::{ModuleRealizer, SkippedModule};
pub use search::SearchPath;
pub use walker::{is_package_dir, package_name, ModuleDescriptor, ModuleWalker};

use crate::config::Config;
use crate::error::{Error, Result};
use std::path::{Component, Path, PathBuf};
use tracing::{info, warn};

/// Lazy stream of documented modules for one source directory
pub type Introspection = ModuleRealizer<ModuleWalker, PythonLoader>;

/// Sets up the walk, search path and root package for a source directory
pub struct Introspector {
    exclude: Vec<glob::Pattern>,
}

impl Introspector {
    /// Create an introspector with the configuration's exclude patterns
    pub fn new(config: &Config) -> Result<Self> {
        Ok(Self {
            exclude: config.exclude_patterns()?,
        })
    }

    /// Start introspecting `src_dir`, resolved against `cwd`.
    ///
    /// When the source directory is a package its `__init__.py` is loaded up
    /// front and yielded first. A root that can't be loaded because of a
    /// missing module is reported as skipped and the directory is walked as a
    /// plain source directory instead. An excluded root package yields
    /// nothing.
    pub fn introspect(&self, cwd: &Path, src_dir: &Path) -> Result<Introspection> {
        let source = cwd.join(src_dir);
        if !source.is_dir() {
            return Err(Error::PathNotFound(source));
        }

        let (base, rel) = split_source(cwd, src_dir)?;
        let mut search = SearchPath::new([base.clone()]);
        let mut loader = PythonLoader::new()?;
        let mut skipped = Vec::new();
        let mut root = None;

        let mut is_package = is_package_dir(&base.join(&rel));
        let root_name = package_name(&rel);
        let root_excluded = is_package && self.exclude.iter().any(|p| p.matches(&root_name));
        if root_excluded {
            info!(module = %root_name, "source package excluded");
        } else if is_package {
            let descriptor = ModuleDescriptor::package(root_name, &base.join(&rel));
            match loader.load(&descriptor, &search) {
                Ok(table) => root = Some(table),
                Err(e) if e.is_module_not_found() => {
                    warn!(module = %descriptor.name, error = %e, "skipping root package");
                    skipped.push(SkippedModule {
                        name: descriptor.name.clone(),
                        reason: e.to_string(),
                    });
                    is_package = false;
                }
                Err(e) => return Err(e),
            }
        }

        if !is_package {
            search.register(&base.join(&rel));
        }

        info!(
            source = %base.join(&rel).display(),
            package = is_package,
            "introspecting"
        );

        let walker = ModuleWalker::new(&base, &rel, is_package)?.with_exclude(self.exclude.clone());
        let realizer = ModuleRealizer::new(walker, loader, search).with_skipped(skipped);
        Ok(match root {
            Some(table) => realizer.with_root(table),
            None => realizer,
        })
    }
}

/// Split a source directory into the directory it is imported from and its
/// relative path. Absolute paths and paths climbing out of `cwd` are
/// canonicalized and imported from their parent.
pub fn split_source(cwd: &Path, src_dir: &Path) -> Result<(PathBuf, PathBuf)> {
    let escapes = src_dir.is_absolute()
        || src_dir
            .components()
            .any(|c| matches!(c, Component::ParentDir | Component::RootDir | Component::Prefix(_)));

    if !escapes {
        let rel: PathBuf = src_dir
            .components()
            .filter(|c| matches!(c, Component::Normal(_)))
            .collect();
        if !rel.as_os_str().is_empty() {
            return Ok((cwd.to_path_buf(), rel));
        }
    }

    let source = cwd.join(src_dir).canonicalize()?;
    match (source.parent(), source.file_name()) {
        (Some(parent), Some(name)) => Ok((parent.to_path_buf(), PathBuf::from(name))),
        _ => Err(Error::other(format!(
            "Cannot document the filesystem root: {}",
            source.display()
        ))),
    }
}
