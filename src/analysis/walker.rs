// Module discovery
//
// Enumerates the modules and sub-packages under a source directory in a
// fixed order: depth first, directory entries sorted by file name, each
// package yielded before its children.

use crate::error::{Error, Result};
use std::collections::HashSet;
use std::path::{Component, Path, PathBuf};
use tracing::debug;
use walkdir::{DirEntry, FilterEntry, WalkDir};

/// A discovered module, ready to be loaded
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModuleDescriptor {
    /// Dotted module name
    pub name: String,
    /// Source file: the module file, or `__init__.py` for packages
    pub path: PathBuf,
    pub is_package: bool,
}

impl ModuleDescriptor {
    pub fn module(name: impl Into<String>, path: PathBuf) -> Self {
        Self {
            name: name.into(),
            path,
            is_package: false,
        }
    }

    pub fn package(name: impl Into<String>, dir: &Path) -> Self {
        Self {
            name: name.into(),
            path: dir.join("__init__.py"),
            is_package: true,
        }
    }

    /// Directory the module was found in (the parent of a package's directory)
    pub fn containing_dir(&self) -> Option<&Path> {
        let parent = self.path.parent()?;
        if self.is_package {
            parent.parent()
        } else {
            Some(parent)
        }
    }
}

/// Whether a directory is a regular package
pub fn is_package_dir(dir: &Path) -> bool {
    dir.join("__init__.py").is_file()
}

/// Dotted name of a relative source directory (`src/pkg` -> `src.pkg`)
pub fn package_name(src_dir: &Path) -> String {
    src_dir
        .components()
        .filter_map(|c| match c {
            Component::Normal(part) => Some(part.to_string_lossy().to_string()),
            _ => None,
        })
        .collect::<Vec<_>>()
        .join(".")
}

type EntryFilter = fn(&DirEntry) -> bool;

/// Lazy walk over the modules of a source directory
pub struct ModuleWalker {
    root: PathBuf,
    import_root: PathBuf,
    package: Option<String>,
    prefix: String,
    entries: FilterEntry<walkdir::IntoIter, EntryFilter>,
    seen: HashSet<String>,
    exclude: Vec<glob::Pattern>,
    root_excluded: bool,
}

impl ModuleWalker {
    /// Walk `cwd/src_dir`. Names get the source's dotted name as prefix when
    /// it is a package, no prefix otherwise.
    pub fn new(cwd: &Path, src_dir: &Path, is_package: bool) -> Result<Self> {
        let root = cwd.join(src_dir);
        if !root.is_dir() {
            return Err(Error::PathNotFound(root));
        }

        let package = is_package.then(|| package_name(src_dir));
        let prefix = match &package {
            Some(name) => format!("{}.", name),
            None => String::new(),
        };
        let import_root = if is_package { cwd.to_path_buf() } else { root.clone() };

        let entries = WalkDir::new(&root)
            .min_depth(1)
            .follow_links(true)
            .sort_by_file_name()
            .into_iter()
            .filter_entry(is_module_entry as EntryFilter);

        Ok(Self {
            root,
            import_root,
            package,
            prefix,
            entries,
            seen: HashSet::new(),
            exclude: Vec::new(),
            root_excluded: false,
        })
    }

    /// Drop modules whose dotted name matches any pattern; an excluded
    /// package takes its subtree with it
    pub fn with_exclude(mut self, patterns: Vec<glob::Pattern>) -> Self {
        self.exclude = patterns;
        self.root_excluded = self
            .package
            .as_deref()
            .is_some_and(|name| self.is_excluded(name));
        self
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Directory the walked names are importable from: the parent of the
    /// package, or the source directory itself when names carry no prefix
    pub fn import_root(&self) -> &Path {
        &self.import_root
    }

    /// Whether the source package itself matches an exclude pattern
    pub fn is_root_excluded(&self) -> bool {
        self.root_excluded
    }

    fn descriptor(&self, entry: &DirEntry) -> Option<ModuleDescriptor> {
        let relative = entry.path().strip_prefix(&self.root).ok()?;
        let mut parts: Vec<String> = relative
            .components()
            .map(|c| c.as_os_str().to_string_lossy().to_string())
            .collect();

        let is_package = entry.file_type().is_dir();
        if !is_package {
            let last = parts.pop()?;
            parts.push(last.strip_suffix(".py")?.to_string());
        }
        if parts.iter().any(|p| p.is_empty() || p.contains('.')) {
            return None;
        }

        let name = format!("{}{}", self.prefix, parts.join("."));
        Some(if is_package {
            ModuleDescriptor::package(name, entry.path())
        } else {
            ModuleDescriptor::module(name, entry.path().to_path_buf())
        })
    }

    fn is_excluded(&self, name: &str) -> bool {
        self.exclude.iter().any(|p| p.matches(name))
    }
}

impl Iterator for ModuleWalker {
    type Item = Result<ModuleDescriptor>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.root_excluded {
            return None;
        }

        loop {
            let entry = match self.entries.next()? {
                Ok(entry) => entry,
                Err(e) => return Some(Err(e.into())),
            };

            let Some(descriptor) = self.descriptor(&entry) else {
                continue;
            };

            // a package shadows a module of the same name
            if !self.seen.insert(descriptor.name.clone()) {
                debug!(module = %descriptor.name, "shadowed by an earlier entry");
                continue;
            }

            if self.is_excluded(&descriptor.name) {
                debug!(module = %descriptor.name, "excluded");
                if descriptor.is_package {
                    self.entries.skip_current_dir();
                }
                continue;
            }

            return Some(Ok(descriptor));
        }
    }
}

/// Module files and package directories; nothing else is descended into
fn is_module_entry(entry: &DirEntry) -> bool {
    if entry.depth() == 0 {
        return true;
    }

    let name = entry.file_name().to_string_lossy();
    if entry.file_type().is_dir() {
        !name.contains('.') && is_package_dir(entry.path())
    } else {
        name.ends_with(".py") && name != "__init__.py"
    }
}
