// Python front end using tree-sitter
//
// Builds the symbol table of one module: docstring, imports and every
// module-level binding. Function and class bodies are never entered.

use crate::error::{Error, Result};
use crate::parser::symbols::*;
use std::path::Path;
use tree_sitter::{Node, Parser};

/// Parser for Python source files
pub struct PythonParser {
    parser: Parser,
}

impl PythonParser {
    /// Create a new Python parser
    pub fn new() -> Result<Self> {
        let mut parser = Parser::new();
        let language = tree_sitter_python::language();
        parser
            .set_language(&language)
            .map_err(|e| Error::parser(format!("Failed to set Python language: {}", e)))?;
        Ok(Self { parser })
    }

    /// Parse a Python file into the symbol table of `module`
    pub fn parse_file(
        &mut self,
        path: &Path,
        module: &str,
        is_package: bool,
    ) -> Result<SymbolTable> {
        let source = std::fs::read_to_string(path).map_err(|e| {
            Error::Io(std::io::Error::new(e.kind(), format!("{}: {}", path.display(), e)))
        })?;

        self.parse_source(&source, path, module, is_package)
    }

    /// Parse Python source code.
    ///
    /// Source with syntax errors is rejected, the way a failing import would
    /// abort the caller.
    pub fn parse_source(
        &mut self,
        source: &str,
        path: &Path,
        module: &str,
        is_package: bool,
    ) -> Result<SymbolTable> {
        let tree = self
            .parser
            .parse(source, None)
            .ok_or_else(|| Error::parser("Failed to parse source"))?;

        let root = tree.root_node();
        if root.has_error() {
            let line = first_error_line(&root).unwrap_or(1);
            return Err(Error::parse(path, format!("invalid syntax at line {}", line)));
        }

        let mut table = SymbolTable::new(module, is_package);
        table.docstring = extract_module_docstring(&root, source.as_bytes());

        let mut binder = Binder {
            table,
            source: source.as_bytes(),
            guarded: false,
        };
        binder.visit_block(&root);

        Ok(binder.table)
    }
}

/// Line of the first ERROR or MISSING node
fn first_error_line(node: &Node) -> Option<usize> {
    if node.is_error() || node.is_missing() {
        return Some(line_of(node));
    }
    let mut cursor = node.walk();
    for child in node.children(&mut cursor) {
        if child.has_error() {
            if let Some(line) = first_error_line(&child) {
                return Some(line);
            }
        }
    }
    None
}

fn line_of(node: &Node) -> usize {
    node.start_position().row + 1
}

fn named_children<'t>(node: &Node<'t>) -> Vec<Node<'t>> {
    let mut cursor = node.walk();
    node.named_children(&mut cursor)
        .filter(|c| c.kind() != "comment")
        .collect()
}

/// Exception names whose handlers swallow a failed import
const IMPORT_ERROR_HANDLERS: &[&str] = &[
    "ImportError",
    "ModuleNotFoundError",
    "Exception",
    "BaseException",
];

/// Walks module-level statements and records bindings
struct Binder<'s> {
    table: SymbolTable,
    source: &'s [u8],
    /// Inside a `try` body whose handlers catch import errors
    guarded: bool,
}

impl<'s> Binder<'s> {
    fn text(&self, node: &Node) -> &'s str {
        node.utf8_text(self.source).unwrap_or("")
    }

    fn local_owner(&self) -> Option<String> {
        Some(self.table.module.clone())
    }

    fn visit_block(&mut self, node: &Node) {
        let mut cursor = node.walk();
        for child in node.children(&mut cursor) {
            self.visit_statement(&child);
        }
    }

    fn visit_statement(&mut self, node: &Node) {
        match node.kind() {
            "function_definition" => self.bind_definition(node, SymbolKind::Function),
            "class_definition" => self.bind_definition(node, SymbolKind::Class),
            "decorated_definition" => {
                if let Some(definition) = node.child_by_field_name("definition") {
                    self.visit_statement(&definition);
                }
            }
            "expression_statement" => {
                for child in named_children(node) {
                    if child.kind() == "assignment" {
                        self.visit_assignment(&child);
                    }
                }
            }
            "import_statement" => self.visit_import(node),
            "import_from_statement" => self.visit_import_from(node),
            "delete_statement" => self.visit_delete(node),
            "if_statement" => self.visit_if(node),
            "try_statement" => self.visit_try(node),
            "for_statement" => self.visit_for(node),
            "with_statement" | "while_statement" => self.visit_compound(node),
            _ => {}
        }
    }

    /// Module-level compound statements still bind into the module namespace
    fn visit_compound(&mut self, node: &Node) {
        for child in named_children(node) {
            match child.kind() {
                "block" => self.visit_block(&child),
                "elif_clause" | "else_clause" | "except_clause" | "except_group_clause"
                | "finally_clause" => self.visit_compound(&child),
                _ => {}
            }
        }
    }

    /// The body of `if __name__ == "__main__":` never runs on import
    fn visit_if(&mut self, node: &Node) {
        let is_main_guard = node
            .child_by_field_name("condition")
            .is_some_and(|condition| self.is_main_guard(&condition));
        if !is_main_guard {
            self.visit_compound(node);
            return;
        }

        let mut cursor = node.walk();
        for alternative in node.children_by_field_name("alternative", &mut cursor) {
            self.visit_compound(&alternative);
        }
    }

    fn is_main_guard(&self, condition: &Node) -> bool {
        if condition.kind() != "comparison_operator" {
            return false;
        }
        let text: String = self
            .text(condition)
            .chars()
            .filter(|c| !c.is_whitespace())
            .map(|c| if c == '\'' { '"' } else { c })
            .collect();
        text == r#"__name__=="__main__""# || text == r#""__main__"==__name__"#
    }

    /// Imports in the body of a `try` that handles import errors are guarded
    fn visit_try(&mut self, node: &Node) {
        let children = named_children(node);
        let catches = children.iter().any(|c| self.catches_import_error(c));

        for child in &children {
            match child.kind() {
                "block" => {
                    let outer = self.guarded;
                    self.guarded = outer || catches;
                    self.visit_block(child);
                    self.guarded = outer;
                }
                "except_clause" | "except_group_clause" | "else_clause" | "finally_clause" => {
                    self.visit_compound(child)
                }
                _ => {}
            }
        }
    }

    fn catches_import_error(&self, clause: &Node) -> bool {
        if !matches!(clause.kind(), "except_clause" | "except_group_clause") {
            return false;
        }
        let caught: Vec<Node> = named_children(clause)
            .into_iter()
            .filter(|c| c.kind() != "block")
            .collect();
        let Some(first) = caught.first() else {
            // bare `except:`
            return true;
        };

        let mut names = Vec::new();
        self.handler_names(first, &mut names);
        names.iter().any(|name| IMPORT_ERROR_HANDLERS.contains(name))
    }

    fn handler_names(&self, node: &Node, names: &mut Vec<&'s str>) {
        match node.kind() {
            "identifier" => names.push(self.text(node)),
            "attribute" => {
                if let Some(attribute) = node.child_by_field_name("attribute") {
                    names.push(self.text(&attribute));
                }
            }
            // `except ImportError as e` may parse as a single pattern
            "as_pattern" => {
                if let Some(inner) = named_children(node).first() {
                    self.handler_names(inner, names);
                }
            }
            "tuple" | "parenthesized_expression" => {
                for child in named_children(node) {
                    self.handler_names(&child, names);
                }
            }
            _ => {}
        }
    }

    /// Loop targets keep the last element once the loop has run
    fn visit_for(&mut self, node: &Node) {
        let left = node.child_by_field_name("left");
        let right = node.child_by_field_name("right");
        if let (Some(left), Some(right)) = (left, right) {
            if let Some((kind, owner)) = self.element_kind(&right) {
                if left.kind() == "identifier" {
                    let name = self.text(&left);
                    self.table.bind(Symbol::new(name, kind, owner, line_of(node)));
                } else {
                    self.bind_unknown(&left, line_of(node));
                }
            }
        }
        self.visit_compound(node);
    }

    /// Kind of the last element of an iterable; `None` for an empty literal
    fn element_kind(&self, iterable: &Node) -> Option<(SymbolKind, Option<String>)> {
        match iterable.kind() {
            "call" => {
                let function = iterable.child_by_field_name("function");
                let is_range = function.is_some_and(|f| {
                    f.kind() == "identifier"
                        && self.text(&f) == "range"
                        && self.table.get("range").is_none()
                });
                if is_range {
                    Some((SymbolKind::Literal(LiteralKind::Int), None))
                } else {
                    Some((SymbolKind::Unknown, None))
                }
            }
            "list" | "tuple" | "set" | "expression_list" => {
                let last = named_children(iterable).pop()?;
                Some(self.value_kind(&last))
            }
            "string" | "concatenated_string" => {
                let kind = if self.is_bytes(iterable) {
                    LiteralKind::Int
                } else {
                    LiteralKind::Str
                };
                Some((SymbolKind::Literal(kind), None))
            }
            "parenthesized_expression" => match named_children(iterable).first() {
                Some(inner) => self.element_kind(inner),
                None => None,
            },
            _ => Some((SymbolKind::Unknown, None)),
        }
    }

    fn bind_definition(&mut self, node: &Node, kind: SymbolKind) {
        if let Some(name) = node.child_by_field_name("name") {
            let name = self.text(&name);
            if !name.is_empty() {
                let owner = self.local_owner();
                self.table.bind(Symbol::new(name, kind, owner, line_of(node)));
            }
        }
    }

    fn visit_assignment(&mut self, node: &Node) {
        let Some(left) = node.child_by_field_name("left") else {
            return;
        };
        // `x: int` declares without binding
        let Some(mut value) = node.child_by_field_name("right") else {
            return;
        };

        if value.kind() == "assignment" {
            self.visit_assignment(&value);
        }
        while value.kind() == "assignment" {
            match value.child_by_field_name("right") {
                Some(right) => value = right,
                None => return,
            }
        }

        self.bind_target(&left, &value, line_of(node));
    }

    fn bind_target(&mut self, target: &Node, value: &Node, line: usize) {
        match target.kind() {
            "identifier" => {
                let (kind, owner) = self.value_kind(value);
                let name = self.text(target);
                self.table.bind(Symbol::new(name, kind, owner, line));
            }
            "pattern_list" | "tuple_pattern" | "list_pattern" => {
                let targets = named_children(target);
                let values = match value.kind() {
                    "expression_list" | "tuple" | "list" => Some(named_children(value)),
                    _ => None,
                };

                match values {
                    Some(values) if values.len() == targets.len() => {
                        // the right-hand side is evaluated before anything is bound
                        let evaluated: Vec<_> = values.iter().map(|v| self.value_kind(v)).collect();
                        for ((target, value), (kind, owner)) in
                            targets.iter().zip(values.iter()).zip(evaluated)
                        {
                            if target.kind() == "identifier" {
                                let name = self.text(target);
                                self.table.bind(Symbol::new(name, kind, owner, line));
                            } else {
                                self.bind_target(target, value, line);
                            }
                        }
                    }
                    _ => {
                        for target in &targets {
                            self.bind_unknown(target, line);
                        }
                    }
                }
            }
            // attribute and subscript targets don't bind module names
            _ => {}
        }
    }

    fn bind_unknown(&mut self, target: &Node, line: usize) {
        match target.kind() {
            "identifier" => {
                let name = self.text(target);
                self.table
                    .bind(Symbol::new(name, SymbolKind::Unknown, None, line));
            }
            "pattern_list" | "tuple_pattern" | "list_pattern" | "list_splat_pattern" => {
                for child in named_children(target) {
                    self.bind_unknown(&child, line);
                }
            }
            _ => {}
        }
    }

    /// Kind and owner of the object an expression evaluates to
    fn value_kind(&self, node: &Node) -> (SymbolKind, Option<String>) {
        let kind = match node.kind() {
            "integer" | "float" => {
                let text = self.text(node);
                if text.ends_with('j') || text.ends_with('J') {
                    SymbolKind::Instance
                } else if node.kind() == "integer" {
                    SymbolKind::Literal(LiteralKind::Int)
                } else {
                    SymbolKind::Literal(LiteralKind::Float)
                }
            }
            "true" | "false" | "not_operator" | "comparison_operator" => {
                SymbolKind::Literal(LiteralKind::Bool)
            }
            "string" | "concatenated_string" => {
                if self.is_bytes(node) {
                    SymbolKind::Instance
                } else {
                    SymbolKind::Literal(LiteralKind::Str)
                }
            }
            "list" | "list_comprehension" => SymbolKind::Literal(LiteralKind::List),
            "tuple" | "expression_list" => SymbolKind::Literal(LiteralKind::Tuple),
            "dictionary" | "dictionary_comprehension" => SymbolKind::Literal(LiteralKind::Dict),
            "set" | "set_comprehension" => SymbolKind::Literal(LiteralKind::Set),
            "none" => SymbolKind::Instance,
            "parenthesized_expression" => {
                return match named_children(node).first() {
                    Some(inner) => self.value_kind(inner),
                    None => (SymbolKind::Literal(LiteralKind::Tuple), None),
                };
            }
            "unary_operator" => match node.child_by_field_name("argument") {
                Some(argument) => match self.value_kind(&argument).0 {
                    SymbolKind::Literal(LiteralKind::Bool) => SymbolKind::Literal(LiteralKind::Int),
                    SymbolKind::Literal(k) if k.is_numeric() => SymbolKind::Literal(k),
                    _ => SymbolKind::Unknown,
                },
                None => SymbolKind::Unknown,
            },
            "binary_operator" => self.binary_kind(node),
            "lambda" => return (SymbolKind::Function, self.local_owner()),
            "identifier" => {
                return match self.table.get(self.text(node)) {
                    Some(symbol) => (symbol.kind, symbol.owner.clone()),
                    None => (SymbolKind::Unknown, None),
                };
            }
            "call" => self.call_kind(node),
            _ => SymbolKind::Unknown,
        };
        (kind, None)
    }

    fn literal_of(&self, node: Option<Node>) -> Option<LiteralKind> {
        match self.value_kind(&node?).0 {
            SymbolKind::Literal(kind) => Some(kind),
            _ => None,
        }
    }

    fn binary_kind(&self, node: &Node) -> SymbolKind {
        use LiteralKind::*;

        let left = self.literal_of(node.child_by_field_name("left"));
        let right = self.literal_of(node.child_by_field_name("right"));
        let op = node
            .child_by_field_name("operator")
            .map(|o| o.kind())
            .unwrap_or("");

        let kind = match (left, right) {
            (Some(a), Some(b)) if a.is_numeric() && b.is_numeric() => {
                if op == "/" || a == Float || b == Float {
                    Some(Float)
                } else {
                    Some(Int)
                }
            }
            (Some(Str), Some(_)) if op == "%" => Some(Str),
            (Some(a), Some(b)) if a == b && op == "+" && matches!(a, Str | List | Tuple) => Some(a),
            (Some(seq @ (Str | List | Tuple)), Some(Int | Bool))
            | (Some(Int | Bool), Some(seq @ (Str | List | Tuple)))
                if op == "*" =>
            {
                Some(seq)
            }
            (Some(Set), Some(Set)) if matches!(op, "|" | "&" | "-" | "^") => Some(Set),
            (Some(Dict), Some(Dict)) if op == "|" => Some(Dict),
            _ => None,
        };

        kind.map_or(SymbolKind::Unknown, SymbolKind::Literal)
    }

    fn call_kind(&self, node: &Node) -> SymbolKind {
        let Some(function) = node.child_by_field_name("function") else {
            return SymbolKind::Instance;
        };
        if function.kind() == "identifier" {
            let name = self.text(&function);
            // a local rebinding shadows the builtin
            if self.table.get(name).is_none() {
                if let Some(kind) = LiteralKind::from_constructor(name) {
                    return SymbolKind::Literal(kind);
                }
            }
        }
        SymbolKind::Instance
    }

    fn is_bytes(&self, node: &Node) -> bool {
        let text = if node.kind() == "concatenated_string" {
            named_children(node)
                .first()
                .map(|first| self.text(first))
                .unwrap_or("")
        } else {
            self.text(node)
        };
        string_prefix(text).contains(['b', 'B'])
    }

    fn visit_import(&mut self, node: &Node) {
        let line = line_of(node);
        for child in named_children(node) {
            match child.kind() {
                "dotted_name" => {
                    let module = self.text(&child);
                    let mut import = Import::simple(module, line);
                    import.guarded = self.guarded;
                    self.table.imports.push(import);
                    let top = module.split('.').next().unwrap_or(module);
                    self.table
                        .bind(Symbol::new(top, SymbolKind::Module, None, line));
                }
                "aliased_import" => {
                    let name = child.child_by_field_name("name").map(|n| self.text(&n));
                    let alias = child.child_by_field_name("alias").map(|n| self.text(&n));
                    if let (Some(name), Some(alias)) = (name, alias) {
                        let mut import = Import::simple(name, line);
                        import.names.push(ImportedName::with_alias(name, alias));
                        import.guarded = self.guarded;
                        self.table.imports.push(import);
                        self.table
                            .bind(Symbol::new(alias, SymbolKind::Module, None, line));
                    }
                }
                _ => {}
            }
        }
    }

    fn visit_import_from(&mut self, node: &Node) {
        let line = line_of(node);
        let mut module = "";
        let mut relative_level = 0;

        if let Some(module_name) = node.child_by_field_name("module_name") {
            if module_name.kind() == "relative_import" {
                for inner in named_children(&module_name) {
                    match inner.kind() {
                        "import_prefix" => {
                            relative_level =
                                self.text(&inner).chars().filter(|c| *c == '.').count();
                        }
                        "dotted_name" => module = self.text(&inner),
                        _ => {}
                    }
                }
            } else {
                module = self.text(&module_name);
            }
        }

        let mut names = Vec::new();
        let mut cursor = node.walk();
        for child in node.children_by_field_name("name", &mut cursor) {
            match child.kind() {
                "dotted_name" => names.push(ImportedName::new(self.text(&child))),
                "aliased_import" => {
                    let name = child.child_by_field_name("name").map(|n| self.text(&n));
                    let alias = child.child_by_field_name("alias").map(|n| self.text(&n));
                    match (name, alias) {
                        (Some(name), Some(alias)) => {
                            names.push(ImportedName::with_alias(name, alias))
                        }
                        (Some(name), None) => names.push(ImportedName::new(name)),
                        _ => {}
                    }
                }
                _ => {}
            }
        }
        if named_children(node).iter().any(|c| c.kind() == "wildcard_import") {
            names.push(ImportedName::new("*"));
        }

        let mut import = if relative_level > 0 {
            Import::relative(module, names, relative_level, line)
        } else {
            Import::from_import(module, names, line)
        };
        import.guarded = self.guarded;

        let owner = import
            .absolute_target(self.table.package())
            .unwrap_or_else(|| format!("{}{}", ".".repeat(relative_level), module));
        for name in import.names.iter().filter(|n| !n.is_wildcard()) {
            self.table.bind(Symbol::new(
                name.used_name(),
                SymbolKind::Unknown,
                Some(owner.clone()),
                line,
            ));
        }

        self.table.imports.push(import);
    }

    fn visit_delete(&mut self, node: &Node) {
        for child in named_children(node) {
            match child.kind() {
                "identifier" => {
                    self.table.unbind(self.text(&child));
                }
                "expression_list" => {
                    for target in named_children(&child) {
                        if target.kind() == "identifier" {
                            self.table.unbind(self.text(&target));
                        }
                    }
                }
                _ => {}
            }
        }
    }
}

/// Extract module docstring from root node
fn extract_module_docstring(root: &Node, source: &[u8]) -> Option<String> {
    let first = named_children(root).into_iter().next()?;
    if first.kind() != "expression_statement" {
        return None;
    }
    let expr = named_children(&first).into_iter().next()?;
    match expr.kind() {
        "string" | "concatenated_string" => {
            let raw = string_value(&expr, source)?;
            Some(clean_docstring(&raw))
        }
        _ => None,
    }
}

/// Prefix letters before the opening quote (`r`, `b`, `f`, `u`)
fn string_prefix(text: &str) -> &str {
    let end = text.find(['"', '\'']).unwrap_or(0);
    &text[..end]
}

/// Value of a string literal, handling prefixes and triple quotes
fn string_value(node: &Node, source: &[u8]) -> Option<String> {
    if node.kind() == "concatenated_string" {
        let parts: Option<Vec<String>> = named_children(node)
            .iter()
            .map(|part| string_value(part, source))
            .collect();
        return parts.map(|p| p.concat());
    }

    let text = node.utf8_text(source).ok()?;
    let prefix = string_prefix(text);
    let quoted = &text[prefix.len()..];

    let quote_len = if quoted.starts_with("\"\"\"") || quoted.starts_with("'''") {
        3
    } else {
        1
    };
    if quoted.len() < quote_len * 2 {
        return Some(String::new());
    }
    let body = &quoted[quote_len..quoted.len() - quote_len];

    if prefix.contains(['r', 'R']) {
        Some(body.to_string())
    } else {
        Some(unescape(body))
    }
}

/// Decode the common backslash escapes; unknown escapes are kept verbatim
fn unescape(body: &str) -> String {
    let mut out = String::with_capacity(body.len());
    let mut chars = body.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('n') => out.push('\n'),
            Some('t') => out.push('\t'),
            Some('r') => out.push('\r'),
            Some('\\') => out.push('\\'),
            Some('\'') => out.push('\''),
            Some('"') => out.push('"'),
            Some('\n') => {}
            Some(other) => {
                out.push('\\');
                out.push(other);
            }
            None => out.push('\\'),
        }
    }
    out
}

/// Normalize docstring indentation: tabs expanded, first line stripped,
/// common indentation of the following lines removed, blank edges dropped.
pub fn clean_docstring(raw: &str) -> String {
    let expanded = raw.replace('\t', "        ");
    let lines: Vec<&str> = expanded.split('\n').collect();

    // margin counted in chars, not bytes
    let margin = lines
        .iter()
        .skip(1)
        .filter(|l| !l.trim().is_empty())
        .map(|l| l.chars().take_while(|c| c.is_whitespace()).count())
        .min()
        .unwrap_or(0);

    let mut cleaned: Vec<&str> = Vec::with_capacity(lines.len());
    if let Some(first) = lines.first() {
        cleaned.push(first.trim());
    }
    for line in lines.iter().skip(1) {
        let rest = match line.char_indices().nth(margin) {
            Some((start, _)) => &line[start..],
            None => "",
        };
        cleaned.push(rest.trim_end());
    }

    while cleaned.last().is_some_and(|l| l.is_empty()) {
        cleaned.pop();
    }
    let leading = cleaned.iter().take_while(|l| l.is_empty()).count();

    cleaned[leading..].join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse_as(source: &str, module: &str, is_package: bool) -> SymbolTable {
        let mut parser = PythonParser::new().unwrap();
        parser
            .parse_source(source, Path::new("test.py"), module, is_package)
            .unwrap()
    }

    fn parse(source: &str) -> SymbolTable {
        parse_as(source, "pkg.mod", false)
    }

    fn kind(table: &SymbolTable, name: &str) -> SymbolKind {
        table.get(name).unwrap_or_else(|| panic!("{} not bound", name)).kind
    }

    #[test]
    fn test_parser_new() {
        assert!(PythonParser::new().is_ok());
    }

    #[test]
    fn test_empty_file() {
        let table = parse("");
        assert!(table.is_empty());
        assert!(table.docstring.is_none());
    }

    #[test]
    fn test_module_docstring() {
        let table = parse("\"\"\"Module docstring.\"\"\"\n\nx = 1\n");
        assert_eq!(table.docstring.as_deref(), Some("Module docstring."));
    }

    #[test]
    fn test_docstring_after_comment() {
        let table = parse("# coding: utf-8\n'''Doc.'''\n");
        assert_eq!(table.docstring.as_deref(), Some("Doc."));
    }

    #[test]
    fn test_no_docstring_after_statement() {
        let table = parse("import os\n\"\"\"Not a docstring.\"\"\"\n");
        assert!(table.docstring.is_none());
    }

    #[test]
    fn test_docstring_is_cleaned() {
        let source = "\"\"\"Summary line.\n\n    Indented body\n      more\n    \"\"\"\n";
        let table = parse(source);
        assert_eq!(
            table.docstring.as_deref(),
            Some("Summary line.\n\nIndented body\n  more")
        );
    }

    #[test]
    fn test_raw_docstring_keeps_backslashes() {
        let table = parse("r\"\"\"Match \\d+ digits.\"\"\"\n");
        assert_eq!(table.docstring.as_deref(), Some("Match \\d+ digits."));
    }

    #[test]
    fn test_definitions_are_locally_owned() {
        let table = parse("def my_function():\n    pass\n\nclass MyClass:\n    pass\n");
        let func = table.get("my_function").unwrap();
        assert_eq!(func.kind, SymbolKind::Function);
        assert_eq!(func.owner.as_deref(), Some("pkg.mod"));
        assert_eq!(kind(&table, "MyClass"), SymbolKind::Class);
    }

    #[test]
    fn test_async_and_decorated_definitions() {
        let source = "\
import functools

@functools.lru_cache
async def fetch(url):
    pass

@dataclass
class Point:
    x: int
";
        let table = parse(source);
        assert_eq!(kind(&table, "fetch"), SymbolKind::Function);
        assert_eq!(kind(&table, "Point"), SymbolKind::Class);
    }

    #[test]
    fn test_literal_kinds() {
        let source = "\
A = 1
B = 2.5
C = True
D = 'text'
E = (1, 2)
F = [1]
G = {'k': 1}
H = {1, 2}
I = 1, 2
J = -3
K = [x for x in range(3)]
L = 'a' 'b'
M = 60 * 60
N = 'x' * 3
O = dict(a=1)
";
        let table = parse(source);
        assert_eq!(kind(&table, "A"), SymbolKind::Literal(LiteralKind::Int));
        assert_eq!(kind(&table, "B"), SymbolKind::Literal(LiteralKind::Float));
        assert_eq!(kind(&table, "C"), SymbolKind::Literal(LiteralKind::Bool));
        assert_eq!(kind(&table, "D"), SymbolKind::Literal(LiteralKind::Str));
        assert_eq!(kind(&table, "E"), SymbolKind::Literal(LiteralKind::Tuple));
        assert_eq!(kind(&table, "F"), SymbolKind::Literal(LiteralKind::List));
        assert_eq!(kind(&table, "G"), SymbolKind::Literal(LiteralKind::Dict));
        assert_eq!(kind(&table, "H"), SymbolKind::Literal(LiteralKind::Set));
        assert_eq!(kind(&table, "I"), SymbolKind::Literal(LiteralKind::Tuple));
        assert_eq!(kind(&table, "J"), SymbolKind::Literal(LiteralKind::Int));
        assert_eq!(kind(&table, "K"), SymbolKind::Literal(LiteralKind::List));
        assert_eq!(kind(&table, "L"), SymbolKind::Literal(LiteralKind::Str));
        assert_eq!(kind(&table, "M"), SymbolKind::Literal(LiteralKind::Int));
        assert_eq!(kind(&table, "N"), SymbolKind::Literal(LiteralKind::Str));
        assert_eq!(kind(&table, "O"), SymbolKind::Literal(LiteralKind::Dict));
    }

    #[test]
    fn test_non_literal_values() {
        let source = "NOTHING = None\nRAW = b'bytes'\nOBJ = object()\nCPLX = 2j\n";
        let table = parse(source);
        assert_eq!(kind(&table, "NOTHING"), SymbolKind::Instance);
        assert_eq!(kind(&table, "RAW"), SymbolKind::Instance);
        assert_eq!(kind(&table, "OBJ"), SymbolKind::Instance);
        assert_eq!(kind(&table, "CPLX"), SymbolKind::Instance);
    }

    #[test]
    fn test_annotated_assignment() {
        let table = parse("limit: int = 10\ndeclared_only: str\n");
        assert_eq!(kind(&table, "limit"), SymbolKind::Literal(LiteralKind::Int));
        assert!(table.get("declared_only").is_none());
    }

    #[test]
    fn test_chained_and_unpacked_assignment() {
        let table = parse("a = b = 'same'\nx, y = 1, [2]\np, q = pair()\n");
        assert_eq!(kind(&table, "a"), SymbolKind::Literal(LiteralKind::Str));
        assert_eq!(kind(&table, "b"), SymbolKind::Literal(LiteralKind::Str));
        assert_eq!(kind(&table, "x"), SymbolKind::Literal(LiteralKind::Int));
        assert_eq!(kind(&table, "y"), SymbolKind::Literal(LiteralKind::List));
        assert_eq!(kind(&table, "p"), SymbolKind::Unknown);
        assert_eq!(kind(&table, "q"), SymbolKind::Unknown);
    }

    #[test]
    fn test_lambda_and_alias() {
        let source = "square = lambda x: x * x\n\ndef run():\n    pass\n\nstart = run\n";
        let table = parse(source);
        let square = table.get("square").unwrap();
        assert_eq!(square.kind, SymbolKind::Function);
        assert_eq!(square.owner.as_deref(), Some("pkg.mod"));
        let start = table.get("start").unwrap();
        assert_eq!(start.kind, SymbolKind::Function);
        assert_eq!(start.owner.as_deref(), Some("pkg.mod"));
    }

    #[test]
    fn test_rebinding_and_del() {
        let source = "value = 1\ndef value():\n    pass\ntemp = 2\ndel temp\n";
        let table = parse(source);
        assert_eq!(kind(&table, "value"), SymbolKind::Function);
        assert!(table.get("temp").is_none());
    }

    #[test]
    fn test_function_bodies_not_entered() {
        let source = "\
def outer():
    inner = 1
    def nested():
        pass

class C:
    attr = 2
";
        let table = parse(source);
        assert!(table.get("inner").is_none());
        assert!(table.get("nested").is_none());
        assert!(table.get("attr").is_none());
        assert_eq!(table.len(), 2);
    }

    #[test]
    fn test_top_level_blocks_bind() {
        let source = "\
try:
    import json
    FAST = True
except ImportError:
    FAST = False

if FAST:
    def loads(s):
        pass
else:
    LIMIT = 3
";
        let table = parse(source);
        assert_eq!(kind(&table, "json"), SymbolKind::Module);
        assert_eq!(kind(&table, "FAST"), SymbolKind::Literal(LiteralKind::Bool));
        assert_eq!(kind(&table, "loads"), SymbolKind::Function);
        assert_eq!(kind(&table, "LIMIT"), SymbolKind::Literal(LiteralKind::Int));
    }

    #[test]
    fn test_guarded_imports() {
        let source = "\
try:
    from ._speedups import fast_sum
except ImportError:
    fast_sum = None

try:
    import ujson as json
except (ValueError, ModuleNotFoundError) as e:
    import json

try:
    import yaml
except ValueError:
    yaml = None
";
        let table = parse_as(source, "pkg.fast", false);
        let guarded: Vec<(&str, bool)> = table
            .imports
            .iter()
            .map(|i| (i.module.as_str(), i.guarded))
            .collect();
        assert_eq!(
            guarded,
            vec![
                ("_speedups", true),
                ("ujson", true),
                ("json", false),
                ("yaml", false),
            ]
        );
    }

    #[test]
    fn test_bare_except_guards_imports() {
        let table = parse("try:\n    import missing_dep\nexcept:\n    pass\n");
        assert!(table.imports[0].guarded);
    }

    #[test]
    fn test_for_loop_targets_bind() {
        let source = "\
for i in range(3):
    pass

for name in ['a', 'b']:
    pass

for byte in b'xy':
    pass

for key, value in pairs():
    pass

for never in []:
    pass
";
        let table = parse(source);
        assert_eq!(kind(&table, "i"), SymbolKind::Literal(LiteralKind::Int));
        assert_eq!(kind(&table, "name"), SymbolKind::Literal(LiteralKind::Str));
        assert_eq!(kind(&table, "byte"), SymbolKind::Literal(LiteralKind::Int));
        assert_eq!(kind(&table, "key"), SymbolKind::Unknown);
        assert_eq!(kind(&table, "value"), SymbolKind::Unknown);
        assert!(table.get("never").is_none());
    }

    #[test]
    fn test_main_guard_not_bound() {
        let source = "\
if __name__ == '__main__':
    import sys
    EXIT_CODE = 0
else:
    IMPORTED = True
";
        let table = parse(source);
        assert!(table.get("sys").is_none());
        assert!(table.get("EXIT_CODE").is_none());
        assert!(table.imports.is_empty());
        assert_eq!(kind(&table, "IMPORTED"), SymbolKind::Literal(LiteralKind::Bool));
    }

    #[test]
    fn test_simple_import() {
        let table = parse("import os.path\nimport numpy as np\n");
        assert_eq!(table.imports.len(), 2);
        assert_eq!(table.imports[0].module, "os.path");
        assert_eq!(table.imports[0].kind, ImportKind::Direct);
        assert_eq!(kind(&table, "os"), SymbolKind::Module);
        assert_eq!(kind(&table, "np"), SymbolKind::Module);
        assert!(table.get("os").unwrap().owner.is_none());
    }

    #[test]
    fn test_from_import_owner() {
        let table = parse("from os import path, getcwd as cwd\n");
        assert_eq!(table.imports.len(), 1);
        assert_eq!(table.imports[0].kind, ImportKind::From);
        let path = table.get("path").unwrap();
        assert_eq!(path.owner.as_deref(), Some("os"));
        assert!(table.get("cwd").is_some());
        assert!(table.get("getcwd").is_none());
    }

    #[test]
    fn test_relative_import_owner() {
        let table = parse_as(
            "from ..utils import helper\nfrom . import sibling\n",
            "pkg.sub.mod",
            false,
        );
        assert_eq!(table.imports.len(), 2);
        assert_eq!(table.imports[0].kind, ImportKind::Relative { level: 2 });
        assert_eq!(table.get("helper").unwrap().owner.as_deref(), Some("pkg.utils"));
        assert_eq!(table.get("sibling").unwrap().owner.as_deref(), Some("pkg.sub"));
    }

    #[test]
    fn test_relative_import_in_package() {
        let table = parse_as("from .core import Engine\n", "pkg", true);
        assert_eq!(table.get("Engine").unwrap().owner.as_deref(), Some("pkg.core"));
    }

    #[test]
    fn test_wildcard_import_binds_nothing() {
        let table = parse("from os.path import *\n");
        assert_eq!(table.imports.len(), 1);
        assert!(table.imports[0].names[0].is_wildcard());
        assert!(table.is_empty());
    }

    #[test]
    fn test_syntax_error_rejected() {
        let mut parser = PythonParser::new().unwrap();
        let result =
            parser.parse_source("def broken(:\n    pass\n", Path::new("bad.py"), "bad", false);
        match result {
            Err(Error::Parse { path, message }) => {
                assert_eq!(path, Path::new("bad.py"));
                assert!(message.contains("invalid syntax"));
            }
            other => panic!("expected parse error, got {:?}", other),
        }
    }

    #[test]
    fn test_clean_docstring() {
        assert_eq!(clean_docstring("  One line.  "), "One line.");
        assert_eq!(clean_docstring("\n    Body\n    text\n    "), "Body\ntext");
        assert_eq!(clean_docstring(""), "");
        assert_eq!(clean_docstring("   "), "");
    }

    #[test]
    fn test_clean_docstring_unicode_indent() {
        // NBSP is whitespace but two bytes wide
        let raw = "Summary.\n\u{a0}\u{a0}first\n  second";
        assert_eq!(clean_docstring(raw), "Summary.\nfirst\nsecond");

        let raw = "Summary.\n  \u{a0}nested\n  flat";
        assert_eq!(clean_docstring(raw), "Summary.\n\u{a0}nested\nflat");
    }

    #[test]
    fn test_unescape() {
        assert_eq!(unescape("a\\nb"), "a\nb");
        assert_eq!(unescape("quote \\\" here"), "quote \" here");
        assert_eq!(unescape("keep \\d"), "keep \\d");
    }
}
