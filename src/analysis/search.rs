// Module search path and import resolution
//
// The search path is an ordered list of directories owned by whoever drives
// the walk. Imports are resolved against it to decide whether a module's
// internal imports are intact:
// - relative imports are always checked
// - absolute imports are checked when their top-level name is on the path
// - everything else (stdlib, third-party) is left alone
// - imports guarded by an `except ImportError` handler are never checked
//
// Roots given up front come before the standard library; roots registered
// during the walk come after it, so they never shadow a stdlib module.

use crate::error::{Error, Result};
use crate::parser::{Import, ImportKind, SymbolTable};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Top-level modules of the Python standard library
const STDLIB_MODULES: &[&str] = &[
    "__future__", "_thread", "abc", "aifc", "argparse", "array", "ast", "asynchat",
    "asyncio", "asyncore", "atexit", "audioop", "base64", "bdb", "binascii", "bisect",
    "builtins", "bz2", "calendar", "cgi", "cgitb", "chunk", "cmath", "cmd", "code",
    "codecs", "codeop", "collections", "colorsys", "compileall", "concurrent",
    "configparser", "contextlib", "contextvars", "copy", "copyreg", "cProfile", "crypt",
    "csv", "ctypes", "curses", "dataclasses", "datetime", "dbm", "decimal", "difflib",
    "dis", "distutils", "doctest", "email", "encodings", "ensurepip", "enum", "errno",
    "faulthandler", "fcntl", "filecmp", "fileinput", "fnmatch", "fractions", "ftplib",
    "functools", "gc", "getopt", "getpass", "gettext", "glob", "graphlib", "grp", "gzip",
    "hashlib", "heapq", "hmac", "html", "http", "idlelib", "imaplib", "imghdr", "imp",
    "importlib", "inspect", "io", "ipaddress", "itertools", "json", "keyword", "lib2to3",
    "linecache", "locale", "logging", "lzma", "mailbox", "mailcap", "marshal", "math",
    "mimetypes", "mmap", "modulefinder", "msilib", "msvcrt", "multiprocessing", "netrc",
    "nis", "nntplib", "ntpath", "numbers", "operator", "optparse", "os", "ossaudiodev",
    "pathlib", "pdb", "pickle", "pickletools", "pipes", "pkgutil", "platform", "plistlib",
    "poplib", "posix", "posixpath", "pprint", "profile", "pstats", "pty", "pwd",
    "py_compile", "pyclbr", "pydoc", "queue", "quopri", "random", "re", "readline",
    "reprlib", "resource", "rlcompleter", "runpy", "sched", "secrets", "select",
    "selectors", "shelve", "shlex", "shutil", "signal", "site", "smtpd", "smtplib",
    "sndhdr", "socket", "socketserver", "spwd", "sqlite3", "sre_compile",
    "sre_constants", "sre_parse", "ssl", "stat", "statistics", "string", "stringprep",
    "struct", "subprocess", "sunau", "symtable", "sys", "sysconfig", "syslog",
    "tabnanny", "tarfile", "telnetlib", "tempfile", "termios", "textwrap", "threading",
    "time", "timeit", "tkinter", "token", "tokenize", "tomllib", "trace", "traceback",
    "tracemalloc", "tty", "turtle", "turtledemo", "types", "typing", "unicodedata",
    "unittest", "urllib", "uu", "uuid", "venv", "warnings", "wave", "weakref",
    "webbrowser", "winreg", "winsound", "wsgiref", "xdrlib", "xml", "xmlrpc", "zipapp",
    "zipfile", "zipimport", "zlib", "zoneinfo",
];

/// Suffixes of compiled extension modules
const EXTENSION_SUFFIXES: &[&str] = &["so", "pyd"];

/// Whether a top-level module name belongs to the standard library
pub fn is_stdlib(top: &str) -> bool {
    STDLIB_MODULES.contains(&top)
}

/// Ordered module search roots
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchPath {
    roots: Vec<PathBuf>,
    /// Number of leading roots searched ahead of the standard library
    leading: usize,
}

impl SearchPath {
    /// Search path whose `roots` take precedence over the standard library
    pub fn new(roots: impl IntoIterator<Item = PathBuf>) -> Self {
        let mut search = Self::default();
        for root in roots {
            search.register(&root);
        }
        search.leading = search.roots.len();
        search
    }

    /// Append a root unless it is already present; returns whether it was added
    pub fn register(&mut self, dir: &Path) -> bool {
        if self.roots.iter().any(|r| r == dir) {
            return false;
        }
        debug!(root = %dir.display(), "registered search root");
        self.roots.push(dir.to_path_buf());
        true
    }

    pub fn roots(&self) -> &[PathBuf] {
        &self.roots
    }

    /// Locate a dotted module name.
    ///
    /// Within one root a regular package (`a/b/__init__.py`) wins over a
    /// source module (`a/b.py`), which wins over a compiled extension
    /// (`a/b.*.so`, `a/b.*.pyd`). A directory without `__init__.py` is a
    /// namespace package, used only when no root has a regular match.
    /// Names from the standard library are not looked up in appended roots.
    pub fn find_module(&self, dotted: &str) -> Option<PathBuf> {
        self.locate(dotted, true)
    }

    fn locate(&self, dotted: &str, namespaces: bool) -> Option<PathBuf> {
        let parts: Vec<&str> = dotted.split('.').collect();
        if parts.iter().any(|p| p.is_empty()) {
            return None;
        }
        let (last, parents) = parts.split_last()?;

        let roots = if is_stdlib(parts[0]) {
            &self.roots[..self.leading]
        } else {
            &self.roots[..]
        };

        let mut namespace = None;
        for root in roots {
            let parent = parents.iter().fold(root.clone(), |dir, part| dir.join(part));
            let dir = parent.join(last);

            let package_init = dir.join("__init__.py");
            if package_init.is_file() {
                return Some(package_init);
            }

            let module_file = parent.join(format!("{}.py", last));
            if module_file.is_file() {
                return Some(module_file);
            }

            if let Some(extension) = extension_module(&parent, last) {
                return Some(extension);
            }

            if namespaces && namespace.is_none() && dir.is_dir() {
                namespace = Some(dir);
            }
        }

        namespace
    }

    /// Check that every internal import of a loaded module resolves.
    ///
    /// Fails with [`Error::ModuleNotFound`] naming the first import that
    /// doesn't.
    pub fn check_imports(&self, table: &SymbolTable) -> Result<()> {
        for import in &table.imports {
            if import.guarded {
                debug!(module = %table.module, import = %import.module, "guarded import");
                continue;
            }

            let target = match import.absolute_target(table.package()) {
                Some(target) => target,
                None => return Err(Error::module_not_found(&table.module, relative_text(import))),
            };

            // only names with a regular top-level module on the path are internal
            if !import.kind.is_relative() {
                let top = target.split('.').next().unwrap_or(&target);
                if self.locate(top, false).is_none() {
                    continue;
                }
            }

            if self.find_module(&target).is_none() {
                return Err(Error::module_not_found(&table.module, target));
            }
        }

        Ok(())
    }
}

/// Compiled extension module `name` in `dir`, with or without an ABI tag
fn extension_module(dir: &Path, name: &str) -> Option<PathBuf> {
    let entries = fs::read_dir(dir).ok()?;
    let prefix = format!("{}.", name);

    let mut matches: Vec<PathBuf> = entries
        .filter_map(|entry| entry.ok())
        .filter(|entry| entry.file_type().is_ok_and(|t| t.is_file()))
        .filter(|entry| {
            let file_name = entry.file_name();
            let file_name = file_name.to_string_lossy();
            let Some(rest) = file_name.strip_prefix(&prefix) else {
                return false;
            };
            let (tag, suffix) = match rest.rsplit_once('.') {
                Some((tag, suffix)) => (Some(tag), suffix),
                None => (None, rest),
            };
            EXTENSION_SUFFIXES.contains(&suffix) && tag.map_or(true, |t| !t.is_empty())
        })
        .map(|entry| entry.path())
        .collect();
    matches.sort();
    matches.into_iter().next()
}

fn relative_text(import: &Import) -> String {
    let level = match import.kind {
        ImportKind::Relative { level } => level,
        _ => 0,
    };
    format!("{}{}", ".".repeat(level), import.module)
}
