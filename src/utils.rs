use miette::Diagnostic;
use serde::Deserialize;
use std::{
    fmt,
    path::{Component, Path, PathBuf},
};
use thiserror::Error;

#[derive(Debug, Error, Diagnostic, Clone, PartialEq, Eq)]
#[error("path '{path}' {reason}")]
#[diagnostic(
    code(refold::unsafe_path),
    help("Paths in a manifest are relative to the root and may not leave it")
)]
pub struct UnsafePathError {
    pub path: String,
    pub reason: &'static str,
}

/// Folds `.` and `..` out of a relative path.
///
/// Returns `None` for absolute paths and for paths whose `..` segments climb above
/// the starting point.
pub fn normalize_path(source: &str) -> Option<PathBuf> {
    let input = Path::new(source);

    let mut new_path = PathBuf::new();

    for component in input.components() {
        match component {
            Component::CurDir => {}

            // ".." may only undo a segment we pushed ourselves
            Component::ParentDir => {
                if !new_path.pop() {
                    return None;
                }
            }

            Component::Normal(segment) => new_path.push(segment),

            Component::RootDir | Component::Prefix(_) => return None,
        }
    }

    Some(new_path)
}

/// A path relative to the restructuring root that is guaranteed not to escape it.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Deserialize)]
#[serde(try_from = "String")]
pub struct RelPath {
    raw: String,
    normalized: PathBuf,
}
impl RelPath {
    pub fn parse(raw: &str) -> Result<Self, UnsafePathError> {
        if Path::new(raw).is_absolute() || raw.starts_with('/') || raw.starts_with('\\') {
            return Err(UnsafePathError {
                path: raw.to_string(),
                reason: "is absolute",
            });
        }

        let normalized = normalize_path(raw).ok_or_else(|| UnsafePathError {
            path: raw.to_string(),
            reason: "escapes the root",
        })?;

        Ok(Self {
            raw: raw.to_string(),
            normalized,
        })
    }
    /// The path as it was written.
    pub fn as_str(&self) -> &str {
        &self.raw
    }
    pub fn as_path(&self) -> &Path {
        &self.normalized
    }
    /// `true` when the path names the root itself (`""`, `"."`, `"a/.."`).
    pub fn is_root(&self) -> bool {
        self.normalized.as_os_str().is_empty()
    }
    pub fn resolve(&self, root: &Path) -> PathBuf {
        root.join(&self.normalized)
    }
}
impl TryFrom<String> for RelPath {
    type Error = UnsafePathError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        RelPath::parse(&value)
    }
}
impl TryFrom<&str> for RelPath {
    type Error = UnsafePathError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        RelPath::parse(value)
    }
}
impl fmt::Display for RelPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.raw)
    }
}
