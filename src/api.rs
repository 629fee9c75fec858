use crate::{
    config::{self, RestructureConfig},
    errors::{FileOperation, IoError},
    phases::{Report, Restructure},
    plan::Plan,
    preview::preview_as_tree,
    relocate,
};
use colored::Colorize;
use std::path::{Path, PathBuf};

#[derive(Debug, thiserror::Error, miette::Diagnostic)]
pub enum RefoldError {
    #[error(transparent)]
    #[diagnostic(transparent)]
    Config(#[from] config::ConfigError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Io(#[from] IoError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Relocate(#[from] relocate::RelocateError),
}

/// Turns `root` into an absolute path without requiring it to exist.
pub fn absolute_root(root: &Path) -> Result<PathBuf, RefoldError> {
    let absolute = std::path::absolute(root)
        .map_err(|error| IoError::new(FileOperation::Inspect, root.to_path_buf(), error))?;

    Ok(absolute)
}

/// Runs directories, moves and creates against `root`, then prints a completion line.
///
/// # Errors
///
/// Returns a [`RefoldError`] on the first failure. Work done by earlier steps is left
/// on disk.
pub fn restructure(root: &Path, config: &RestructureConfig) -> Result<Report, RefoldError> {
    let root = absolute_root(root)?;

    log::debug!("restructuring {}", root.display());

    let report = Restructure::new(root, config)
        .materialize()?
        .relocate()?
        .create()?
        .finish();

    println!("{}", "Project restructured successfully.".bold().green());

    Ok(report)
}

/// Prints what [`restructure`] would do to `root` without changing anything.
pub fn dry_run(root: &Path, config: &RestructureConfig) -> Result<Plan, RefoldError> {
    let root = absolute_root(root)?;

    let plan = Plan::build(config, &root);

    if plan.is_empty() {
        log::debug!("nothing to do in {}", root.display());
    }

    preview_as_tree(&plan, &root);

    Ok(plan)
}

/// Loads the manifest at `path`, or the built-in portfolio layout when `None`.
pub fn load_config(path: Option<&Path>) -> Result<RestructureConfig, RefoldError> {
    let config = match path {
        Some(path) => RestructureConfig::from_file(path)?,
        None => RestructureConfig::builtin()?,
    };

    Ok(config)
}
