//! CLI module for apidocgen

mod args;

pub use args::Args;

use crate::analysis::Introspector;
use crate::config::Config;
use crate::error::{Error, Result};
use crate::logging;
use crate::output::{
    failure_code, BuildRunner, RstConfig, RstGenerator, SphinxProject, TemplateEngine,
};
use std::path::Path;
use std::process::ExitCode;
use tracing::info;

const DEFAULT_CONFIG: &str = "apidocgen.toml";

/// Run the CLI application
pub fn run() -> ExitCode {
    let args = Args::parse_args();
    logging::init(args.verbose);

    let result = std::env::current_dir()
        .map_err(Error::from)
        .and_then(|cwd| execute(args, &cwd));

    match result {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}

/// Generate the documentation of `args.source_dir`, resolving every relative
/// path against `cwd`
pub fn execute(args: Args, cwd: &Path) -> Result<ExitCode> {
    let source_dir = args.source_dir.clone().ok_or(Error::MissingSourceDir)?;

    let mut cfg = match &args.config {
        Some(path) => Config::load(&cwd.join(path))?,
        None => Config::load_or_default(&cwd.join(DEFAULT_CONFIG)),
    };
    cfg.merge_cli(args.overrides());
    cfg.validate()?;

    let output_dir = cwd.join(&cfg.output.directory);
    let templates = match &cfg.output.templates {
        Some(dir) => TemplateEngine::from_dir(&cwd.join(dir))?,
        None => TemplateEngine::new()?,
    };

    let project_name = cfg.project_name(&source_dir);
    info!(source = %source_dir.display(), output = %output_dir.display(), "generating docs");

    let introspector = Introspector::new(&cfg)?;
    let mut modules = introspector.introspect(cwd, &source_dir)?;

    if cfg.build.conf {
        let sphinx = SphinxProject {
            project: project_name.clone(),
            author: cfg.project.author.clone(),
            version: cfg.project.version.clone(),
            extension: cfg.output.extension.clone(),
            import_root: modules.import_root().to_path_buf(),
        };
        let written = sphinx.write(&templates, &output_dir)?;
        info!(files = written.len(), "wrote sphinx project files");
    }

    let generator = RstGenerator::with_templates(
        RstConfig {
            output_dir: output_dir.clone(),
            extension: cfg.output.extension.clone(),
            project_name: cfg.output.header.then_some(project_name),
            readme: cfg.output.readme.as_ref().map(|p| cwd.join(p)),
            write_index: cfg.output.index,
        },
        templates,
    )?;
    let report = generator.generate(&mut modules)?;

    println!("{}", report.summary());
    for skipped in modules.skipped() {
        println!("Skipped {}: {}", skipped.name, skipped.reason);
    }

    if let Some(target) = &cfg.build.target {
        let status =
            BuildRunner::new(cfg.build.command.as_str(), target.as_str(), &output_dir).run()?;
        if let Some(code) = failure_code(&status) {
            return Ok(ExitCode::from(code));
        }
    }

    Ok(ExitCode::SUCCESS)
}
