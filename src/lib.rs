//! apidocgen - API reference pages for Python packages
//!
//! Walks a Python source tree, reads each module's public members from a
//! static symbol table and writes reStructuredText pages for Sphinx autodoc.

pub mod analysis;
pub mod cli;
pub mod config;
pub mod error;
pub mod logging;
pub mod output;
pub mod parser;

// Re-export main types
pub use analysis::{Introspector, ModuleContents, ModuleData, SkippedModule};
pub use config::Config;
pub use error::{Error, Result};
pub use output::{GenerationReport, RstConfig, RstGenerator, TemplateEngine};
