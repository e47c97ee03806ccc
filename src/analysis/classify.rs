// Member classification
//
// Visits a module's symbol table and keeps the public names the module
// itself declares, bucketed into variables, functions and classes.

use crate::analysis::modules::ModuleContents;
use crate::parser::{Symbol, SymbolKind, SymbolTable, SymbolVisitor};

/// Collects classified member names while visiting a symbol table
#[derive(Debug, Default)]
pub struct Classifier {
    contents: ModuleContents,
}

impl Classifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn finish(self) -> ModuleContents {
        self.contents
    }
}

impl SymbolVisitor for Classifier {
    fn visit_symbol(&mut self, module: &str, symbol: &Symbol) {
        if symbol.is_private() || !symbol.is_owned_by(module) {
            return;
        }

        // literals first: a literal is never reported as anything else
        let bucket = match symbol.kind {
            SymbolKind::Literal(_) => &mut self.contents.variables,
            SymbolKind::Function => &mut self.contents.functions,
            SymbolKind::Class => &mut self.contents.classes,
            SymbolKind::Module | SymbolKind::Instance | SymbolKind::Unknown => return,
        };
        bucket.push(symbol.name.clone());
    }
}

/// Classify the public, locally owned members of a module
pub fn classify(table: &SymbolTable) -> ModuleContents {
    let mut classifier = Classifier::new();
    table.accept(&mut classifier);
    classifier.finish()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::{LiteralKind, PythonParser};
    use std::path::Path;

    fn local(module: &str, name: &str, kind: SymbolKind) -> Symbol {
        Symbol::new(name, kind, Some(module.to_string()), 1)
    }

    #[test]
    fn test_one_of_each() {
        let mut table = SymbolTable::new("foo_module", false);
        table.bind(Symbol::literal("my_variable", LiteralKind::Int, 1));
        table.bind(local("foo_module", "my_function", SymbolKind::Function));
        table.bind(local("foo_module", "MyClass", SymbolKind::Class));

        let contents = classify(&table);
        assert_eq!(contents.variables, vec!["my_variable"]);
        assert_eq!(contents.functions, vec!["my_function"]);
        assert_eq!(contents.classes, vec!["MyClass"]);
    }

    #[test]
    fn test_imported_members_skipped() {
        let mut table = SymbolTable::new("pkg.a", false);
        table.bind(local("pkg.b", "helper", SymbolKind::Function));
        table.bind(local("pkg.b", "Model", SymbolKind::Class));
        table.bind(Symbol::new(
            "CONST",
            SymbolKind::Literal(LiteralKind::Str),
            Some("pkg.b".into()),
            1,
        ));
        table.bind(local("os", "path", SymbolKind::Unknown));

        assert!(classify(&table).is_empty());
    }

    #[test]
    fn test_private_members_skipped() {
        let mut table = SymbolTable::new("m", false);
        table.bind(Symbol::literal("_cache", LiteralKind::Dict, 1));
        table.bind(local("m", "_helper", SymbolKind::Function));
        table.bind(local("m", "__Meta", SymbolKind::Class));
        table.bind(Symbol::literal("__all__", LiteralKind::List, 1));

        assert!(classify(&table).is_empty());
    }

    #[test]
    fn test_unclassifiable_kinds_omitted() {
        let mut table = SymbolTable::new("m", false);
        table.bind(Symbol::new("os", SymbolKind::Module, None, 1));
        table.bind(Symbol::new("logger", SymbolKind::Instance, None, 2));
        table.bind(Symbol::new("mystery", SymbolKind::Unknown, None, 3));

        assert!(classify(&table).is_empty());
    }

    #[test]
    fn test_alphabetical_order_within_bucket() {
        let mut table = SymbolTable::new("m", false);
        for name in ["zeta", "alpha", "Mid"] {
            table.bind(local("m", name, SymbolKind::Function));
        }
        assert_eq!(classify(&table).functions, vec!["Mid", "alpha", "zeta"]);
    }

    #[test]
    fn test_classify_parsed_module() {
        let source = r#""""Foo module."""
import os
from collections import OrderedDict
from .sibling import shared

my_variable = 42
_private_variable = 1


def my_function():
    pass


def _private_function():
    pass


class MyClass:
    pass
"#;
        let mut parser = PythonParser::new().unwrap();
        let table = parser
            .parse_source(source, Path::new("foo_module.py"), "pkg.foo_module", false)
            .unwrap();

        let contents = classify(&table);
        assert_eq!(contents.variables, vec!["my_variable"]);
        assert_eq!(contents.functions, vec!["my_function"]);
        assert_eq!(contents.classes, vec!["MyClass"]);
    }
}
