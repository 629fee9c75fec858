use miette::Diagnostic;
use regex::{NoExpand, Regex};
use serde::Deserialize;
use thiserror::Error;

lazy_static::lazy_static! {
    static ref BODY_REGEX: Regex = Regex::new(r"<body>([\s\S]*?)</body>")
        .expect("a valid regex pattern");
}

#[derive(Debug, Error, Diagnostic)]
#[error("invalid transform pattern: {pattern}")]
#[diagnostic(
    code(refold::transform::pattern),
    help("Patterns use the `regex` crate syntax")
)]
pub struct PatternError {
    pub pattern: String,
    #[source]
    pub source: regex::Error,
}

/// How a transform is written in a manifest.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum TransformSpec {
    /// Swap the contents of the first `<body>` element.
    ReplaceBody { body: String },
    /// Replace every match of `pattern`; `$1` style groups are expanded.
    Replace {
        pattern: String,
        replacement: String,
    },
}
impl TransformSpec {
    pub fn compile(&self) -> Result<Transform, PatternError> {
        match self {
            TransformSpec::ReplaceBody { body } => Ok(Transform::ReplaceBody { body: body.clone() }),
            TransformSpec::Replace {
                pattern,
                replacement,
            } => {
                let regex = Regex::new(pattern).map_err(|source| PatternError {
                    pattern: pattern.clone(),
                    source,
                })?;

                Ok(Transform::Replace {
                    regex,
                    replacement: replacement.clone(),
                })
            }
        }
    }
}

/// A content rewrite applied while a file is relocated.
#[derive(Debug, Clone)]
pub enum Transform {
    ReplaceBody { body: String },
    Replace { regex: Regex, replacement: String },
}
impl Transform {
    pub fn apply(&self, content: &str) -> String {
        match self {
            Transform::ReplaceBody { body } => {
                let element = format!("<body>{body}</body>");

                BODY_REGEX
                    .replacen(content, 1, NoExpand(&element))
                    .into_owned()
            }
            Transform::Replace { regex, replacement } => regex
                .replace_all(content, replacement.as_str())
                .into_owned(),
        }
    }
}
