use crate::{
    blueprint::{self, Blueprint, BlueprintError, DirectoryBlueprint, EmbeddedBlueprint, SiteInfo},
    create::{FileTemplate, OverwritePolicy},
    errors::{FileFormat, FileOperation, IoError, ParseError},
    relocate::FileMapping,
    transform::{PatternError, TransformSpec},
    tree::DirectoryTree,
    utils::RelPath,
};
use miette::Diagnostic;
use serde::Deserialize;
use std::{
    fs,
    path::{Path, PathBuf},
};
use thiserror::Error;

#[derive(Debug, Error, Diagnostic)]
pub enum ConfigError {
    #[error(transparent)]
    #[diagnostic(transparent)]
    Io(#[from] IoError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Parse(#[from] ParseError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Pattern(#[from] PatternError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Blueprint(#[from] BlueprintError),

    #[error("invalid entry for '{path}': {reason}")]
    #[diagnostic(
        code(refold::config::invalid_entry),
        help("Each [[files]] entry needs exactly one of `content` or `blueprint`, and paths must name a file")
    )]
    InvalidEntry { path: String, reason: &'static str },
}

/// A `[[moves]]` entry.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct MoveEntry {
    pub from: RelPath,
    pub to: RelPath,
    pub transform: Option<TransformSpec>,
}

/// A `[[files]]` entry.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FileEntry {
    pub path: RelPath,
    pub content: Option<String>,
    pub blueprint: Option<RelPath>,
}

/// The manifest as written on disk, before blueprints are rendered.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Manifest {
    #[serde(default)]
    pub site: SiteInfo,
    #[serde(default)]
    pub overwrite: OverwritePolicy,
    pub blueprint_dir: Option<PathBuf>,
    #[serde(default)]
    pub dirs: DirectoryTree,
    #[serde(default)]
    pub moves: Vec<MoveEntry>,
    #[serde(default)]
    pub files: Vec<FileEntry>,
}
impl Manifest {
    pub fn parse(content: &str, path: &Path) -> Result<Self, ConfigError> {
        let parsed = toml::from_str(content)
            .map_err(|error| ParseError::new(FileFormat::Toml, path.to_path_buf(), error))?;

        Ok(parsed)
    }

    /// Compiles transforms and renders every file body, producing the configuration
    /// the engine runs.
    pub fn resolve(self, bodies: &dyn Blueprint) -> Result<RestructureConfig, ConfigError> {
        let mut moves = Vec::with_capacity(self.moves.len());
        for entry in self.moves {
            if entry.from.is_root() || entry.to.is_root() {
                return Err(ConfigError::InvalidEntry {
                    path: entry.from.to_string(),
                    reason: "a move cannot name the root itself",
                });
            }

            let mut mapping = FileMapping::new(entry.from, entry.to);
            if let Some(spec) = entry.transform {
                mapping = mapping.with_transform(spec.compile()?);
            }
            moves.push(mapping);
        }

        let mut files = Vec::with_capacity(self.files.len());
        for entry in self.files {
            if entry.path.is_root() {
                return Err(ConfigError::InvalidEntry {
                    path: entry.path.to_string(),
                    reason: "a file path cannot name the root itself",
                });
            }

            let content = match (entry.content, entry.blueprint) {
                (Some(content), None) => content,
                (None, Some(name)) => {
                    let body = bodies.read(&name)?;
                    blueprint::render(&name, body, &self.site)?
                }
                (Some(_), Some(_)) => {
                    return Err(ConfigError::InvalidEntry {
                        path: entry.path.to_string(),
                        reason: "both `content` and `blueprint` are set",
                    })
                }
                (None, None) => {
                    return Err(ConfigError::InvalidEntry {
                        path: entry.path.to_string(),
                        reason: "neither `content` nor `blueprint` is set",
                    })
                }
            };

            files.push(FileTemplate {
                path: entry.path,
                content,
            });
        }

        Ok(RestructureConfig {
            dirs: self.dirs,
            moves,
            files,
            overwrite: self.overwrite,
        })
    }
}

/// Everything one restructure run needs, fully resolved.
#[derive(Debug, Clone)]
pub struct RestructureConfig {
    pub dirs: DirectoryTree,
    pub moves: Vec<FileMapping>,
    pub files: Vec<FileTemplate>,
    pub overwrite: OverwritePolicy,
}
impl RestructureConfig {
    /// The portfolio layout compiled into the binary.
    pub fn builtin() -> Result<Self, ConfigError> {
        let manifest = Manifest::parse(
            blueprint::PORTFOLIO_MANIFEST,
            Path::new("blueprint/portfolio.toml"),
        )?;

        manifest.resolve(&EmbeddedBlueprint)
    }

    /// Loads a manifest from disk. A `blueprint_dir` is resolved against the
    /// manifest's own directory; without one the embedded blueprint is used.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();

        let content = fs::read_to_string(path)
            .map_err(|error| IoError::new(FileOperation::Read, path.to_path_buf(), error))?;

        let manifest = Manifest::parse(&content, path)?;

        match &manifest.blueprint_dir {
            Some(dir) => {
                let base = path.parent().unwrap_or_else(|| Path::new("."));
                let blueprint = DirectoryBlueprint::new(base.join(dir));

                log::debug!("using blueprint directory {}", blueprint.root.display());

                manifest.resolve(&blueprint)
            }
            None => manifest.resolve(&EmbeddedBlueprint),
        }
    }
}
