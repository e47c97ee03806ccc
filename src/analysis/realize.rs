// Turning discovered modules into documentation data

use crate::analysis::loader::ModuleLoader;
use crate::analysis::modules::ModuleData;
use crate::analysis::search::SearchPath;
use crate::analysis::walker::{ModuleDescriptor, ModuleWalker};
use crate::error::Result;
use crate::parser::SymbolTable;
use std::path::Path;
use tracing::{debug, warn};

/// A module left out because it (or one of its internal imports) could not
/// be found
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedModule {
    pub name: String,
    pub reason: String,
}

/// Lazily loads and classifies the modules of a walk.
///
/// Yields the root module first when one was given, then every non-empty
/// module in walk order. Module-not-found failures are recorded in
/// [`skipped`](Self::skipped) instead of being yielded.
pub struct ModuleRealizer<W, L> {
    modules: W,
    loader: L,
    search: SearchPath,
    root: Option<SymbolTable>,
    skipped: Vec<SkippedModule>,
}

impl<W, L> ModuleRealizer<W, L>
where
    W: Iterator<Item = Result<ModuleDescriptor>>,
    L: ModuleLoader,
{
    pub fn new(modules: W, loader: L, search: SearchPath) -> Self {
        Self {
            modules,
            loader,
            search,
            root: None,
            skipped: Vec::new(),
        }
    }

    /// Yield an already loaded root package ahead of the walk
    pub fn with_root(mut self, root: SymbolTable) -> Self {
        self.root = Some(root);
        self
    }

    /// Record modules skipped before the walk started
    pub fn with_skipped(mut self, skipped: Vec<SkippedModule>) -> Self {
        self.skipped = skipped;
        self
    }

    pub fn search_path(&self) -> &SearchPath {
        &self.search
    }

    pub fn skipped(&self) -> &[SkippedModule] {
        &self.skipped
    }

    pub fn into_skipped(self) -> Vec<SkippedModule> {
        self.skipped
    }

    fn realize(&mut self, descriptor: &ModuleDescriptor) -> Result<Option<ModuleData>> {
        if descriptor.is_package {
            if let Some(dir) = descriptor.containing_dir() {
                self.search.register(dir);
            }
        }

        let table = match self.loader.load(descriptor, &self.search) {
            Ok(table) => table,
            Err(e) if e.is_module_not_found() => {
                warn!(module = %descriptor.name, error = %e, "skipping module");
                self.skipped.push(SkippedModule {
                    name: descriptor.name.clone(),
                    reason: e.to_string(),
                });
                return Ok(None);
            }
            Err(e) => return Err(e),
        };

        let data = ModuleData::from_table(&table);
        if data.is_empty() {
            debug!(module = %descriptor.name, "nothing to document");
            return Ok(None);
        }
        Ok(Some(data))
    }
}

impl<L> ModuleRealizer<ModuleWalker, L> {
    /// Directory the yielded module names are importable from
    pub fn import_root(&self) -> &Path {
        self.modules.import_root()
    }
}

impl<W, L> Iterator for ModuleRealizer<W, L>
where
    W: Iterator<Item = Result<ModuleDescriptor>>,
    L: ModuleLoader,
{
    type Item = Result<ModuleData>;

    fn next(&mut self) -> Option<Self::Item> {
        if let Some(root) = self.root.take() {
            return Some(Ok(ModuleData::from_table(&root)));
        }

        loop {
            let descriptor = match self.modules.next()? {
                Ok(descriptor) => descriptor,
                Err(e) => return Some(Err(e)),
            };

            match self.realize(&descriptor) {
                Ok(Some(data)) => return Some(Ok(data)),
                Ok(None) => continue,
                Err(e) => return Some(Err(e)),
            }
        }
    }
}
