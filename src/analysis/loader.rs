// Module loading
//
// Turns a discovered module into its symbol table. Loading reads and parses
// the source; nothing is executed.

use crate::analysis::search::SearchPath;
use crate::analysis::walker::ModuleDescriptor;
use crate::error::{Error, Result};
use crate::parser::{PythonParser, SymbolTable};
use tracing::debug;

/// Loads modules for the realizer
pub trait ModuleLoader {
    /// Load one module.
    ///
    /// A module whose own file or internal imports cannot be found fails with
    /// [`Error::ModuleNotFound`]; any other failure is fatal to the caller.
    fn load(&mut self, descriptor: &ModuleDescriptor, search: &SearchPath) -> Result<SymbolTable>;
}

/// Loader backed by the tree-sitter front end
pub struct PythonLoader {
    parser: PythonParser,
}

impl PythonLoader {
    pub fn new() -> Result<Self> {
        Ok(Self {
            parser: PythonParser::new()?,
        })
    }
}

impl ModuleLoader for PythonLoader {
    fn load(&mut self, descriptor: &ModuleDescriptor, search: &SearchPath) -> Result<SymbolTable> {
        if !descriptor.path.is_file() {
            return Err(Error::module_not_found(&descriptor.name, &descriptor.name));
        }

        let table = self
            .parser
            .parse_file(&descriptor.path, &descriptor.name, descriptor.is_package)?;
        search.check_imports(&table)?;

        debug!(
            module = %descriptor.name,
            symbols = table.len(),
            imports = table.imports.len(),
            "loaded module"
        );
        Ok(table)
    }
}
