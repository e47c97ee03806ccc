// Parser module for extracting module symbol tables from source files

mod python;
pub mod symbols;

pub use python::{clean_docstring, PythonParser};
pub use symbols::*;
