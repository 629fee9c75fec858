use crate::{
    errors::{FileOperation, IoError},
    utils::RelPath,
};
use colored::Colorize;
use serde::Deserialize;
use std::{
    fs,
    path::{Path, PathBuf},
};

/// A fixed path and the exact text to write there.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileTemplate {
    pub path: RelPath,
    pub content: String,
}

/// What to do when a template's path already holds a file.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum OverwritePolicy {
    /// Replace the file. Local edits are discarded with a warning.
    #[default]
    Overwrite,
    /// Leave the existing file alone.
    Skip,
}

/// Outcome of [`create`].
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Created {
    pub written: Vec<PathBuf>,
    pub skipped: Vec<PathBuf>,
}

/// Writes every template below `root`, creating parent directories on the way.
///
/// # Errors
///
/// Returns an [`IoError`] on the first directory or file that cannot be written.
/// Files written before the failure stay on disk.
pub fn create(
    templates: &[FileTemplate],
    root: &Path,
    policy: OverwritePolicy,
) -> Result<Created, IoError> {
    let mut created = Created::default();

    for template in templates {
        let path = template.path.resolve(root);

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .map_err(|error| IoError::new(FileOperation::Mkdir, parent.to_path_buf(), error))?;
        }

        if path.is_file() {
            match policy {
                OverwritePolicy::Skip => {
                    log::warn!("keeping existing file {}", path.display());
                    created.skipped.push(path);
                    continue;
                }
                OverwritePolicy::Overwrite => {
                    if has_local_changes(&path, &template.content) {
                        log::warn!(
                            "overwriting {}, its current content will be lost",
                            path.display()
                        );
                    }
                }
            }
        }

        write_file(&path, &template.content)?;

        created.written.push(path);
    }

    Ok(created)
}

fn has_local_changes(path: &Path, content: &str) -> bool {
    match fs::read(path) {
        Ok(existing) => existing != content.as_bytes(),
        Err(error) => {
            log::debug!("could not compare {}: {}", path.display(), error);
            true
        }
    }
}

/// Writes a file with the provided contents, truncating whatever was there.
fn write_file(path: &Path, contents: &str) -> Result<(), IoError> {
    fs::write(path, contents)
        .map_err(|error| IoError::new(FileOperation::Write, path.to_path_buf(), error))?;

    let msg = format!("{} {}", "Created file:".green(), path.display());

    println!("{}", &msg);

    Ok(())
}
