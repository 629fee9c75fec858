use miette::Diagnostic;
use std::{fmt, path::PathBuf};
use thiserror::Error;

/// The filesystem step an [`IoError`] happened in.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum FileOperation {
    #[error("reading a file")]
    Read,
    #[error("writing a file")]
    Write,
    #[error("creating a directory")]
    Mkdir,
    #[error("moving a path")]
    Rename,
    #[error("removing a file")]
    Remove,
    #[error("inspecting a path")]
    Inspect,
}
impl FileOperation {
    fn hint(self) -> &'static str {
        match self {
            FileOperation::Read => "Check that the file exists, is readable and holds UTF-8 text",
            FileOperation::Write => "Check write permissions and free space in the target directory",
            FileOperation::Mkdir => {
                "A file may already occupy the directory's path; move it aside and run again"
            }
            FileOperation::Rename => {
                "The destination may be a non-empty directory or sit on another filesystem"
            }
            FileOperation::Remove => {
                "The source was copied but could not be deleted; remove it by hand"
            }
            FileOperation::Inspect => "Check that every parent directory is searchable",
        }
    }
}

/// A failed filesystem call, tagged with what was being attempted and where.
#[derive(Debug, Error)]
#[error("I/O error: {operation} on path '{path}'")]
pub struct IoError {
    pub operation: FileOperation,
    pub path: PathBuf,
    #[source]
    pub source: std::io::Error,
}
impl IoError {
    pub fn new(operation: FileOperation, path: PathBuf, error: std::io::Error) -> Self {
        Self {
            operation,
            path,
            source: error,
        }
    }
}
impl Diagnostic for IoError {
    fn code<'a>(&'a self) -> Option<Box<dyn fmt::Display + 'a>> {
        Some(Box::new("refold::io"))
    }

    fn help<'a>(&'a self) -> Option<Box<dyn fmt::Display + 'a>> {
        Some(Box::new(self.operation.hint()))
    }
}

#[derive(Debug, Error)]
pub enum FileFormat {
    #[error("toml")]
    Toml,
}

/// A manifest that could not be deserialized.
#[derive(Debug, Error, Diagnostic)]
#[error("could not parse {file_format} manifest '{path}'")]
#[diagnostic(code(refold::parse), help("Review the manifest against blueprint/portfolio.toml"))]
pub struct ParseError {
    pub file_format: FileFormat,
    pub path: PathBuf,
    #[source]
    pub source: toml::de::Error,
}
impl ParseError {
    pub fn new(file_format: FileFormat, path: PathBuf, error: toml::de::Error) -> Self {
        Self {
            file_format,
            path,
            source: error,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io;

    #[test]
    fn io_error_names_the_operation_and_path() {
        let error = IoError::new(
            FileOperation::Mkdir,
            PathBuf::from("/site/public"),
            io::Error::from(io::ErrorKind::AlreadyExists),
        );

        assert_eq!(
            error.to_string(),
            "I/O error: creating a directory on path '/site/public'"
        );
        assert_eq!(error.code().unwrap().to_string(), "refold::io");
    }

    #[test]
    fn help_depends_on_the_operation() {
        let help = |operation| {
            IoError::new(operation, PathBuf::from("x"), io::Error::from(io::ErrorKind::Other))
                .help()
                .unwrap()
                .to_string()
        };

        assert!(help(FileOperation::Mkdir).contains("file may already occupy"));
        assert!(help(FileOperation::Remove).contains("remove it by hand"));
        assert_ne!(help(FileOperation::Read), help(FileOperation::Write));
    }
}
