// reStructuredText page writer
//
// Writes one page per documented module, then the module listing and the
// top-level index into the output directory.

use crate::analysis::ModuleData;
use crate::error::Result;
use crate::output::templates::{IndexPage, TemplateEngine};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Configuration for page generation
#[derive(Debug, Clone)]
pub struct RstConfig {
    /// Output directory
    pub output_dir: PathBuf,
    /// Page file extension, without the dot
    pub extension: String,
    /// Project name for the index header; no header when unset
    pub project_name: Option<String>,
    /// File whose text goes on the index page
    pub readme: Option<PathBuf>,
    /// Whether to write the top-level index page
    pub write_index: bool,
}

impl Default for RstConfig {
    fn default() -> Self {
        Self {
            output_dir: PathBuf::from("docs"),
            extension: "rst".to_string(),
            project_name: None,
            readme: None,
            write_index: true,
        }
    }
}

/// Writes the documentation pages of a project
pub struct RstGenerator {
    config: RstConfig,
    template_engine: TemplateEngine,
}

impl RstGenerator {
    /// Create a new generator with the embedded templates
    pub fn new(config: RstConfig) -> Result<Self> {
        Self::with_templates(config, TemplateEngine::new()?)
    }

    pub fn with_templates(config: RstConfig, template_engine: TemplateEngine) -> Result<Self> {
        Ok(Self {
            config,
            template_engine,
        })
    }

    /// Write every page.
    ///
    /// All modules are collected before anything is written, so a failing
    /// module leaves the output directory untouched. Empty modules are
    /// dropped.
    pub fn generate<I>(&self, modules: I) -> Result<GenerationReport>
    where
        I: IntoIterator<Item = Result<ModuleData>>,
    {
        let mut documented = Vec::new();
        for module in modules {
            let module = module?;
            if !module.is_empty() {
                documented.push(module);
            }
        }

        let mut report = GenerationReport {
            output_dir: self.config.output_dir.clone(),
            ..Default::default()
        };

        fs::create_dir_all(&self.config.output_dir)?;

        for module in &documented {
            self.write_module_page(module)?;
            report.pages_written.push(module.name.clone());
        }

        let readme = match &self.config.readme {
            Some(path) => Some(read_readme(path)?),
            None => None,
        };

        let listing = self
            .template_engine
            .render_index(&documented, None, None, IndexPage::Listing)?;
        self.write_page("modules", &listing)?;
        report.listing_written = true;

        if self.config.write_index {
            let index = self.template_engine.render_index(
                &documented,
                self.config.project_name.as_deref(),
                readme.as_deref(),
                IndexPage::Index,
            )?;
            self.write_page("index", &index)?;
            report.index_written = true;
        }

        info!(
            pages = report.pages_written.len(),
            output = %self.config.output_dir.display(),
            "documentation written"
        );
        Ok(report)
    }

    fn write_module_page(&self, module: &ModuleData) -> Result<()> {
        let page = self.template_engine.render_module(module)?;
        self.write_page(&module.name, &page)
    }

    fn write_page(&self, stem: &str, content: &str) -> Result<()> {
        let path = self.page_path(stem);
        fs::write(&path, content)?;
        debug!(path = %path.display(), "wrote page");
        Ok(())
    }

    /// Path of the page named `stem`
    pub fn page_path(&self, stem: &str) -> PathBuf {
        self.config
            .output_dir
            .join(format!("{}.{}", stem, self.config.extension))
    }

    /// Get the output directory
    pub fn output_dir(&self) -> &Path {
        &self.config.output_dir
    }
}

fn read_readme(path: &Path) -> Result<String> {
    fs::read_to_string(path).map_err(|e| {
        std::io::Error::new(e.kind(), format!("{}: {}", path.display(), e)).into()
    })
}

/// Report of what was written
#[derive(Debug, Default)]
pub struct GenerationReport {
    pub output_dir: PathBuf,
    /// Module names, in the order their pages were written
    pub pages_written: Vec<String>,
    pub listing_written: bool,
    pub index_written: bool,
}

impl GenerationReport {
    pub fn summary(&self) -> String {
        format!(
            "Wrote {} module pages to {}, listing: {}, index: {}",
            self.pages_written.len(),
            self.output_dir.display(),
            if self.listing_written { "yes" } else { "no" },
            if self.index_written { "yes" } else { "no" }
        )
    }
}
