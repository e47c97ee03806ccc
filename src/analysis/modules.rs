// Per-module documentation data
//
// One ModuleData is produced for every loaded module and handed to the
// renderers; templates address its fields by name.

use crate::analysis::classify::classify;
use crate::parser::SymbolTable;
use serde::{Deserialize, Serialize};

/// Public members of a module, bucketed by kind
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct ModuleContents {
    pub variables: Vec<String>,
    pub functions: Vec<String>,
    pub classes: Vec<String>,
}

impl ModuleContents {
    pub fn is_empty(&self) -> bool {
        self.variables.is_empty() && self.functions.is_empty() && self.classes.is_empty()
    }

    /// Total number of classified members
    pub fn len(&self) -> usize {
        self.variables.len() + self.functions.len() + self.classes.len()
    }
}

/// A documented module
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ModuleData {
    /// Fully-qualified dotted name
    pub name: String,
    pub docstring: Option<String>,
    pub contents: ModuleContents,
}

impl ModuleData {
    pub fn new(
        name: impl Into<String>,
        docstring: Option<String>,
        contents: ModuleContents,
    ) -> Self {
        Self {
            name: name.into(),
            docstring,
            contents,
        }
    }

    /// Classify a loaded module
    pub fn from_table(table: &SymbolTable) -> Self {
        Self::new(table.module.clone(), table.docstring.clone(), classify(table))
    }

    /// No docstring worth showing and nothing classified
    pub fn is_empty(&self) -> bool {
        let blank_doc = self
            .docstring
            .as_deref()
            .map_or(true, |doc| doc.trim().is_empty());
        blank_doc && self.contents.is_empty()
    }

    /// File name of this module's page
    pub fn page_file_name(&self, extension: &str) -> String {
        format!("{}.{}", self.name, extension)
    }
}
