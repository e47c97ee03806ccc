use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Main configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub project: ProjectConfig,
    pub analysis: AnalysisConfig,
    pub output: OutputConfig,
    pub build: BuildConfig,
}

/// Project metadata
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ProjectConfig {
    /// Project name; derived from the source directory when unset
    pub name: Option<String>,
    pub author: String,
    pub version: String,
}

/// Walk settings
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    /// Glob patterns over dotted module names
    pub exclude: Vec<String>,
}

/// Output settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    pub directory: PathBuf,
    /// Extension of every written page
    pub extension: String,
    /// Directory of `*.tera` files overriding the embedded templates
    pub templates: Option<PathBuf>,
    pub readme: Option<PathBuf>,
    /// Put the welcome header on the index page
    pub header: bool,
    /// Write the index page at all
    pub index: bool,
}

/// Sphinx project and build settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BuildConfig {
    /// Generate conf.py and makefiles
    pub conf: bool,
    /// Target passed to the build command after writing
    pub target: Option<String>,
    pub command: String,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            directory: PathBuf::from("docs"),
            extension: "rst".to_string(),
            templates: None,
            readme: None,
            header: true,
            index: true,
        }
    }
}

impl Default for BuildConfig {
    fn default() -> Self {
        Self {
            conf: false,
            target: None,
            command: "make".to_string(),
        }
    }
}

/// Values given on the command line; `None`/`false` leaves the file value alone
#[derive(Debug, Clone, Default)]
pub struct CliOverrides {
    pub output: Option<PathBuf>,
    pub name: Option<String>,
    pub author: Option<String>,
    pub version: Option<String>,
    pub conf: bool,
    pub make: Option<String>,
    pub readme: Option<PathBuf>,
    pub no_header: bool,
    pub no_index: bool,
    pub exclude: Vec<String>,
}

impl Config {
    /// Load config from a TOML file
    pub fn load(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Load config from file or return defaults
    pub fn load_or_default(path: &Path) -> Self {
        Self::load(path).unwrap_or_default()
    }

    /// Merge CLI arguments into config (CLI takes precedence)
    pub fn merge_cli(&mut self, cli: CliOverrides) {
        if let Some(out) = cli.output {
            self.output.directory = out;
        }

        if cli.name.is_some() {
            self.project.name = cli.name;
        }

        if let Some(author) = cli.author {
            self.project.author = author;
        }

        if let Some(version) = cli.version {
            self.project.version = version;
        }

        if cli.conf {
            self.build.conf = true;
        }

        if cli.make.is_some() {
            self.build.target = cli.make;
        }

        if cli.readme.is_some() {
            self.output.readme = cli.readme;
        }

        if cli.no_header {
            self.output.header = false;
        }

        if cli.no_index {
            self.output.index = false;
        }

        if !cli.exclude.is_empty() {
            self.analysis.exclude.extend(cli.exclude);
        }
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        if self.output.directory.as_os_str().is_empty() {
            return Err(Error::config_validation("output directory must not be empty"));
        }

        let ext = &self.output.extension;
        if ext.is_empty() {
            return Err(Error::config_validation("extension must not be empty"));
        }
        if ext.contains('.') || ext.contains('/') || ext.contains('\\') {
            return Err(Error::config_validation(format!(
                "extension '{}' must be a bare suffix",
                ext
            )));
        }

        if self.build.command.trim().is_empty() {
            return Err(Error::config_validation("build command must not be empty"));
        }

        self.exclude_patterns()?;

        Ok(())
    }

    /// Compile the exclude globs
    pub fn exclude_patterns(&self) -> Result<Vec<glob::Pattern>> {
        self.analysis
            .exclude
            .iter()
            .map(|p| glob::Pattern::new(p).map_err(Error::from))
            .collect()
    }

    /// Project name, falling back to the capitalized source directory name
    pub fn project_name(&self, source_dir: &Path) -> String {
        match &self.project.name {
            Some(name) if !name.is_empty() => name.clone(),
            _ => capitalize(
                &source_dir
                    .file_name()
                    .map(|n| n.to_string_lossy().to_string())
                    .unwrap_or_default(),
            ),
        }
    }
}

/// Upper-case the first character and lower-case the rest
pub fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first
            .to_uppercase()
            .chain(chars.flat_map(char::to_lowercase))
            .collect(),
        None => String::new(),
    }
}
