//! CLI argument parsing

use crate::config::CliOverrides;
use clap::Parser;
use std::path::PathBuf;

/// Automated API documentation generator for Python programs
#[derive(Parser, Debug)]
#[command(name = "apidocgen")]
#[command(about = "Automated API documentation generator for Python programs")]
pub struct Args {
    /// Source directory, relative to the working directory (required)
    pub source_dir: Option<PathBuf>,

    /// Output directory [default: docs]
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Project name [default: source directory name, capitalized]
    #[arg(short, long)]
    pub name: Option<String>,

    /// Project author
    #[arg(short, long)]
    pub author: Option<String>,

    /// Project version
    #[arg(short = 'v', long = "version")]
    pub project_version: Option<String>,

    /// Generate the project's conf.py and makefiles
    #[arg(short, long)]
    pub conf: bool,

    /// Run `make <TARGET>` in the output directory afterwards
    #[arg(short, long, value_name = "TARGET")]
    pub make: Option<String>,

    /// Add the readme file's contents to the index page
    #[arg(short, long)]
    pub readme: Option<PathBuf>,

    /// Do not add a header to the index page
    #[arg(long)]
    pub no_header: bool,

    /// Do not generate the index page
    #[arg(long)]
    pub no_index: bool,

    /// Config file path [default: apidocgen.toml when present]
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Glob over dotted module names to leave out (can be repeated)
    #[arg(long)]
    pub exclude: Vec<String>,

    /// Verbose logging
    #[arg(long)]
    pub verbose: bool,
}

impl Args {
    pub fn parse_args() -> Self {
        Parser::parse()
    }

    /// Settings that override the config file
    pub fn overrides(&self) -> CliOverrides {
        CliOverrides {
            output: self.output.clone(),
            name: self.name.clone(),
            author: self.author.clone(),
            version: self.project_version.clone(),
            conf: self.conf,
            make: self.make.clone(),
            readme: self.readme.clone(),
            no_header: self.no_header,
            no_index: self.no_index,
            exclude: self.exclude.clone(),
        }
    }
}
