// Symbol table types for parsed Python modules
//
// A symbol table is the statically extracted namespace of one module:
// every module-level name, what kind of object it is bound to, and which
// module declared that object.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// The module-level namespace of one parsed module
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SymbolTable {
    /// Dotted module name
    pub module: String,
    /// Whether the module is a package (`__init__.py`)
    pub is_package: bool,
    /// Cleaned module docstring
    pub docstring: Option<String>,
    /// Import statements in source order
    pub imports: Vec<Import>,
    /// Bindings keyed by name; the last binding of a name wins
    symbols: BTreeMap<String, Symbol>,
}

impl SymbolTable {
    pub fn new(module: impl Into<String>, is_package: bool) -> Self {
        Self {
            module: module.into(),
            is_package,
            docstring: None,
            imports: Vec::new(),
            symbols: BTreeMap::new(),
        }
    }

    /// Bind a symbol, replacing any earlier binding of the same name
    pub fn bind(&mut self, symbol: Symbol) {
        self.symbols.insert(symbol.name.clone(), symbol);
    }

    /// Remove a binding (`del name`)
    pub fn unbind(&mut self, name: &str) -> Option<Symbol> {
        self.symbols.remove(name)
    }

    pub fn get(&self, name: &str) -> Option<&Symbol> {
        self.symbols.get(name)
    }

    /// Symbols in namespace enumeration order (alphabetical)
    pub fn symbols(&self) -> impl Iterator<Item = &Symbol> {
        self.symbols.values()
    }

    pub fn len(&self) -> usize {
        self.symbols.len()
    }

    pub fn is_empty(&self) -> bool {
        self.symbols.is_empty()
    }

    /// The package that relative imports in this module are resolved against
    pub fn package(&self) -> &str {
        if self.is_package {
            &self.module
        } else {
            self.module
                .rsplit_once('.')
                .map(|(parent, _)| parent)
                .unwrap_or("")
        }
    }

    /// Walk every symbol with a visitor
    pub fn accept<V: SymbolVisitor>(&self, visitor: &mut V) {
        for symbol in self.symbols() {
            visitor.visit_symbol(&self.module, symbol);
        }
    }
}

/// Visitor over the symbols of a table
pub trait SymbolVisitor {
    /// Called once per binding, in enumeration order
    fn visit_symbol(&mut self, module: &str, symbol: &Symbol);
}

/// One module-level binding
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Symbol {
    pub name: String,
    pub kind: SymbolKind,
    /// Declaring module, when the bound object carries one
    pub owner: Option<String>,
    /// Line of the binding statement
    pub line: usize,
}

impl Symbol {
    pub fn new(name: &str, kind: SymbolKind, owner: Option<String>, line: usize) -> Self {
        Self {
            name: name.to_string(),
            kind,
            owner,
            line,
        }
    }

    /// A literal value; literals carry no owning module
    pub fn literal(name: &str, kind: LiteralKind, line: usize) -> Self {
        Self::new(name, SymbolKind::Literal(kind), None, line)
    }

    /// Check if this is a private name (starts with _)
    pub fn is_private(&self) -> bool {
        self.name.starts_with('_')
    }

    /// Whether the bound object is declared by `module`.
    /// Objects without an identifiable owner count as local.
    pub fn is_owned_by(&self, module: &str) -> bool {
        self.owner.as_deref().map_or(true, |owner| owner == module)
    }
}

/// What a name is bound to
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum SymbolKind {
    Literal(LiteralKind),
    Function,
    Class,
    Module,
    /// Any other runtime object (None, bytes, call results)
    Instance,
    /// The value could not be determined statically
    Unknown,
}

/// Builtin literal value types
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum LiteralKind {
    Int,
    Float,
    Bool,
    Str,
    Tuple,
    List,
    Dict,
    Set,
}

impl LiteralKind {
    /// Literal produced by calling a builtin constructor
    pub fn from_constructor(name: &str) -> Option<Self> {
        match name {
            "int" => Some(LiteralKind::Int),
            "float" => Some(LiteralKind::Float),
            "bool" => Some(LiteralKind::Bool),
            "str" => Some(LiteralKind::Str),
            "tuple" => Some(LiteralKind::Tuple),
            "list" => Some(LiteralKind::List),
            "dict" => Some(LiteralKind::Dict),
            "set" | "frozenset" => Some(LiteralKind::Set),
            _ => None,
        }
    }

    pub fn is_numeric(self) -> bool {
        matches!(self, LiteralKind::Int | LiteralKind::Float | LiteralKind::Bool)
    }
}

/// An import statement
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Import {
    /// The module being imported (without leading dots)
    pub module: String,
    /// Specific names imported (for `from x import y`)
    pub names: Vec<ImportedName>,
    pub kind: ImportKind,
    pub line: usize,
    /// Inside a `try` whose handlers catch import errors
    #[serde(default)]
    pub guarded: bool,
}

impl Import {
    /// Create a simple `import x` style import
    pub fn simple(module: &str, line: usize) -> Self {
        Self {
            module: module.to_string(),
            names: Vec::new(),
            kind: ImportKind::Direct,
            line,
            guarded: false,
        }
    }

    /// Create a `from x import y` style import
    pub fn from_import(module: &str, names: Vec<ImportedName>, line: usize) -> Self {
        Self {
            module: module.to_string(),
            names,
            kind: ImportKind::From,
            line,
            guarded: false,
        }
    }

    /// Create a relative import
    pub fn relative(module: &str, names: Vec<ImportedName>, level: usize, line: usize) -> Self {
        Self {
            module: module.to_string(),
            names,
            kind: ImportKind::Relative { level },
            line,
            guarded: false,
        }
    }

    /// Absolute dotted name of the imported module.
    ///
    /// `package` is the package of the importing module. Returns `None` for a
    /// relative import that climbs above the top-level package.
    pub fn absolute_target(&self, package: &str) -> Option<String> {
        let level = match self.kind {
            ImportKind::Relative { level } => level,
            _ => return Some(self.module.clone()),
        };

        let mut parts: Vec<&str> = if package.is_empty() {
            Vec::new()
        } else {
            package.split('.').collect()
        };
        if parts.len() < level {
            return None;
        }
        parts.truncate(parts.len() + 1 - level);
        if parts.is_empty() {
            return None;
        }

        if !self.module.is_empty() {
            parts.push(&self.module);
        }
        Some(parts.join("."))
    }
}

/// A single imported name with optional alias
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ImportedName {
    /// Original name
    pub name: String,
    /// Alias (from `as` clause)
    pub alias: Option<String>,
}

impl ImportedName {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            alias: None,
        }
    }

    pub fn with_alias(name: &str, alias: &str) -> Self {
        Self {
            name: name.to_string(),
            alias: Some(alias.to_string()),
        }
    }

    /// Get the name as used in code (alias if present, otherwise original)
    pub fn used_name(&self) -> &str {
        self.alias.as_deref().unwrap_or(&self.name)
    }

    pub fn is_wildcard(&self) -> bool {
        self.name == "*"
    }
}

/// Kind of import statement
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub enum ImportKind {
    /// `import x` or `import x as y`
    Direct,
    /// `from x import y`
    From,
    /// `from . import y` or `from ..x import y`
    Relative { level: usize },
}

impl ImportKind {
    pub fn is_relative(&self) -> bool {
        matches!(self, ImportKind::Relative { .. })
    }
}
