// Template engine for generating reStructuredText output

use crate::analysis::ModuleData;
use crate::error::{Error, Result};
use std::collections::HashMap;
use std::path::Path;
use tera::{Context, Tera, Value};

/// Character used to underline page titles
pub const TITLE_RULE: char = '=';

pub const MODULE_TEMPLATE: &str = "module.rst.tera";
pub const LISTING_TEMPLATE: &str = "modules.rst.tera";
pub const INDEX_TEMPLATE: &str = "index.rst.tera";
pub const CONF_TEMPLATE: &str = "conf.py.tera";
pub const MAKEFILE_TEMPLATE: &str = "Makefile.tera";
pub const MAKE_BAT_TEMPLATE: &str = "make.bat.tera";

/// Which of the two index pages to render
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IndexPage {
    /// Module listing: no header, no readme
    Listing,
    /// Top-level index: header and readme when given
    Index,
}

/// Template engine wrapping Tera with the embedded page templates
pub struct TemplateEngine {
    tera: Tera,
}

impl TemplateEngine {
    /// Create a new template engine with embedded templates
    pub fn new() -> Result<Self> {
        Ok(Self {
            tera: embedded()?,
        })
    }

    /// Create a template engine from a custom directory.
    ///
    /// Templates found there replace the embedded ones of the same name;
    /// anything missing falls back to the embedded set.
    pub fn from_dir(template_dir: &Path) -> Result<Self> {
        if !template_dir.is_dir() {
            return Err(Error::PathNotFound(template_dir.to_path_buf()));
        }

        let pattern = format!("{}/**/*.tera", template_dir.display());
        let mut tera = Tera::new(&pattern)?;
        tera.register_filter("underline", underline);
        tera.extend(&embedded()?)?;

        Ok(Self { tera })
    }

    /// Render the page of one module
    pub fn render_module(&self, module: &ModuleData) -> Result<String> {
        let mut context = Context::new();
        context.insert("module", module);
        context.insert("underline", &rule(TITLE_RULE, &module.name));

        self.render(MODULE_TEMPLATE, &context)
    }

    /// Render the module listing or the top-level index page
    pub fn render_index(
        &self,
        modules: &[ModuleData],
        project_name: Option<&str>,
        readme: Option<&str>,
        page: IndexPage,
    ) -> Result<String> {
        let (project_name, readme, template) = match page {
            IndexPage::Listing => (None, None, LISTING_TEMPLATE),
            IndexPage::Index => (project_name, readme, INDEX_TEMPLATE),
        };

        let header = project_name
            .map(|name| format!("Welcome to {} documentation!", name))
            .unwrap_or_default();

        let mut context = Context::new();
        context.insert("underline", &rule(TITLE_RULE, &header));
        context.insert("header", &header);
        context.insert("modules", modules);
        context.insert("readme", &readme);

        self.render(template, &context)
    }

    /// Render a custom template with context
    pub fn render(&self, template_name: &str, context: &Context) -> Result<String> {
        Ok(self.tera.render(template_name, context)?)
    }

    /// Get the underlying Tera instance for advanced usage
    pub fn tera(&self) -> &Tera {
        &self.tera
    }
}

fn embedded() -> Result<Tera> {
    let mut tera = Tera::default();

    tera.add_raw_templates(vec![
        (MODULE_TEMPLATE, include_str!("../../templates/module.rst.tera")),
        (LISTING_TEMPLATE, include_str!("../../templates/modules.rst.tera")),
        (INDEX_TEMPLATE, include_str!("../../templates/index.rst.tera")),
        (CONF_TEMPLATE, include_str!("../../templates/conf.py.tera")),
        (MAKEFILE_TEMPLATE, include_str!("../../templates/Makefile.tera")),
        (MAKE_BAT_TEMPLATE, include_str!("../../templates/make.bat.tera")),
    ])?;
    tera.register_filter("underline", underline);

    Ok(tera)
}

/// `ch` repeated once per character of `title`
pub fn rule(ch: char, title: &str) -> String {
    std::iter::repeat(ch).take(title.chars().count()).collect()
}

/// Turn a value into a section title with a matching underline
fn underline(value: &Value, args: &HashMap<String, Value>) -> tera::Result<Value> {
    let title = value.as_str().unwrap_or("");
    let ch = args
        .get("char")
        .and_then(|v| v.as_str())
        .and_then(|s| s.chars().next())
        .unwrap_or('-');

    Ok(Value::String(format!("{}\n{}", title, rule(ch, title))))
}
