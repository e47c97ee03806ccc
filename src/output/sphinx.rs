// Sphinx project scaffolding: conf.py and the build wrappers

use crate::error::Result;
use crate::output::templates::{TemplateEngine, CONF_TEMPLATE, MAKEFILE_TEMPLATE, MAKE_BAT_TEMPLATE};
use std::fs;
use std::path::{Component, Path, PathBuf};
use tera::Context;
use tracing::debug;

/// Project metadata written into `conf.py`
#[derive(Debug, Clone, Default)]
pub struct SphinxProject {
    pub project: String,
    pub author: String,
    pub version: String,
    /// Page file extension, without the dot
    pub extension: String,
    /// Directory the documented package is imported from
    pub import_root: PathBuf,
}

impl SphinxProject {
    /// Write `conf.py`, `Makefile` and `make.bat` into `output_dir`,
    /// creating it if needed. Returns the written paths.
    pub fn write(&self, templates: &TemplateEngine, output_dir: &Path) -> Result<Vec<PathBuf>> {
        fs::create_dir_all(output_dir)?;

        let mut context = Context::new();
        context.insert("project", &self.project);
        context.insert("author", &self.author);
        context.insert("version", &self.version);
        context.insert("extension", &self.extension);
        context.insert(
            "import_root",
            &relative_path(output_dir, &self.import_root).to_string_lossy(),
        );

        let mut written = Vec::new();
        for (template, file_name) in [
            (CONF_TEMPLATE, "conf.py"),
            (MAKEFILE_TEMPLATE, "Makefile"),
            (MAKE_BAT_TEMPLATE, "make.bat"),
        ] {
            let path = output_dir.join(file_name);
            fs::write(&path, templates.render(template, &context)?)?;
            debug!(path = %path.display(), "wrote sphinx file");
            written.push(path);
        }

        Ok(written)
    }
}

/// Path leading from directory `from` to `to`, using `..` where needed.
/// Falls back to `to` when the two share no root.
pub fn relative_path(from: &Path, to: &Path) -> PathBuf {
    let from: Vec<Component> = from.components().filter(|c| *c != Component::CurDir).collect();
    let to_parts: Vec<Component> = to.components().filter(|c| *c != Component::CurDir).collect();

    let common = from
        .iter()
        .zip(&to_parts)
        .take_while(|(a, b)| a == b)
        .count();
    let anchored = from
        .first()
        .is_some_and(|c| !matches!(c, Component::Normal(_)));
    if common == 0 && (to.has_root() || anchored) {
        return to.to_path_buf();
    }

    let mut path = PathBuf::new();
    for _ in common..from.len() {
        path.push("..");
    }
    for part in &to_parts[common..] {
        path.push(part.as_os_str());
    }
    if path.as_os_str().is_empty() {
        path.push(".");
    }
    path
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn project(import_root: PathBuf) -> SphinxProject {
        SphinxProject {
            project: "Demo".to_string(),
            author: "Jane \"JD\" Doe".to_string(),
            version: "1.0".to_string(),
            extension: "rst".to_string(),
            import_root,
        }
    }

    #[test]
    fn test_relative_path() {
        assert_eq!(relative_path(Path::new("/w/docs"), Path::new("/w")), PathBuf::from(".."));
        assert_eq!(
            relative_path(Path::new("/w/build/docs"), Path::new("/w")),
            PathBuf::from("../..")
        );
        assert_eq!(
            relative_path(Path::new("/w/docs"), Path::new("/w/src")),
            PathBuf::from("../src")
        );
        assert_eq!(relative_path(Path::new("/w"), Path::new("/w")), PathBuf::from("."));
        assert_eq!(relative_path(Path::new("docs"), Path::new("")), PathBuf::from(".."));
    }

    #[test]
    fn test_write_sphinx_files() {
        let dir = TempDir::new().unwrap();
        let docs = dir.path().join("docs");
        let templates = TemplateEngine::new().unwrap();

        let written = project(dir.path().to_path_buf()).write(&templates, &docs).unwrap();
        assert_eq!(written.len(), 3);

        let conf = fs::read_to_string(docs.join("conf.py")).unwrap();
        assert!(conf.contains("project = \"Demo\""));
        assert!(conf.contains("author = \"Jane \\\"JD\\\" Doe\""));
        assert!(conf.contains("version = \"1.0\""));
        assert!(conf.contains("sys.path.insert(0, os.path.abspath(\"..\"))"));
        assert!(conf.contains("'sphinx.ext.autodoc'"));

        let makefile = fs::read_to_string(docs.join("Makefile")).unwrap();
        assert!(makefile.contains("\n\t@$(SPHINXBUILD) -M $@"));

        let bat = fs::read_to_string(docs.join("make.bat")).unwrap();
        assert!(bat.contains("%SPHINXBUILD% -M %1"));
    }
}
