use crate::{
    errors::{FileOperation, IoError},
    utils::RelPath,
};
use miette::Diagnostic;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tera::{Context, Tera};
use thiserror::Error;

#[derive(Debug, Error, Diagnostic)]
pub enum BlueprintError {
    #[error(transparent)]
    #[diagnostic(transparent)]
    Io(#[from] IoError),

    #[error("Blueprint file not found: {name} (looked in {origin})")]
    #[diagnostic(
        code(refold::blueprint::not_found),
        help("Blueprint names are paths relative to the blueprint directory")
    )]
    NotFound { name: String, origin: String },

    #[error("Error occurred attempting to render blueprint '{name}'")]
    #[diagnostic(code(refold::blueprint::render))]
    Render {
        name: String,
        #[source]
        source: tera::Error,
    },
}

const TERA_FILE_EXTENSION: &str = "tera";

/// The manifest describing the portfolio layout, compiled into the binary.
pub const PORTFOLIO_MANIFEST: &str = include_str!("../blueprint/portfolio.toml");

macro_rules! embed_blueprint {
    ($($name:literal),* $(,)?) => {
        &[$(($name, include_str!(concat!("../blueprint/portfolio/", $name)))),*]
    };
}

static PORTFOLIO_FILES: &[(&str, &str)] = embed_blueprint![
    ".github/workflows/deploy.yml",
    "index.html.tera",
    "package.json.tera",
    "src/App.jsx",
    "src/components/common/ProjectCard.jsx",
    "src/components/layout/Footer.jsx.tera",
    "src/components/layout/Header.jsx.tera",
    "src/components/projects/CytoscapeViewer.jsx",
    "src/components/projects/EventAnalyzer.jsx",
    "src/components/projects/GdeltViewer.jsx",
    "src/components/projects/SituationalAwareness.jsx",
    "src/main.jsx",
    "src/pages/home/index.jsx.tera",
    "src/pages/projectDetail/index.jsx",
    "src/pages/projects/index.jsx",
    "src/services/projectService.ts",
    "src/types/index.ts",
    "tsconfig.json",
    "tsconfig.node.json",
    "vite.config.js.tera",
];

/// Site details exposed to `.tera` blueprints as `site`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SiteInfo {
    pub author: String,
    pub headline: String,
    pub package_name: String,
    pub base_path: String,
}
impl Default for SiteInfo {
    fn default() -> Self {
        Self {
            author: "Don Branson".to_string(),
            headline: "AI Engineer & Solutions Architect".to_string(),
            package_name: "donbr-github-io".to_string(),
            base_path: "/donbr.github.io/".to_string(),
        }
    }
}

/// A named collection of template bodies a manifest can point at.
pub trait Blueprint {
    /// Where the bodies come from, for error messages.
    fn origin(&self) -> String;

    /// Returns the raw (unrendered) body stored under `name`.
    fn read(&self, name: &RelPath) -> Result<String, BlueprintError>;
}

/// The portfolio blueprint shipped inside the binary.
#[derive(Debug, Clone, Copy, Default)]
pub struct EmbeddedBlueprint;
impl EmbeddedBlueprint {
    pub fn names(&self) -> impl Iterator<Item = &'static str> {
        PORTFOLIO_FILES.iter().map(|(name, _)| *name)
    }
}
impl Blueprint for EmbeddedBlueprint {
    fn origin(&self) -> String {
        "embedded portfolio blueprint".to_string()
    }

    fn read(&self, name: &RelPath) -> Result<String, BlueprintError> {
        PORTFOLIO_FILES
            .iter()
            .find(|(embedded, _)| Path::new(embedded) == name.as_path())
            .map(|(_, body)| body.to_string())
            .ok_or_else(|| BlueprintError::NotFound {
                name: name.to_string(),
                origin: self.origin(),
            })
    }
}

/// Blueprint bodies read from a directory on disk.
#[derive(Debug, Clone)]
pub struct DirectoryBlueprint {
    pub root: PathBuf,
}
impl DirectoryBlueprint {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }
}
impl Blueprint for DirectoryBlueprint {
    fn origin(&self) -> String {
        self.root.display().to_string()
    }

    fn read(&self, name: &RelPath) -> Result<String, BlueprintError> {
        let path = name.resolve(&self.root);

        if !path.is_file() {
            return Err(BlueprintError::NotFound {
                name: name.to_string(),
                origin: self.origin(),
            });
        }

        let body = std::fs::read_to_string(&path)
            .map_err(|error| IoError::new(FileOperation::Read, path, error))?;

        Ok(body)
    }
}

/// Produces the final text for a blueprint body.
///
/// Bodies whose name ends in `.tera` are rendered with `site` in context; every other
/// body is returned untouched so JSX and workflow expressions survive verbatim.
pub fn render(name: &RelPath, body: String, site: &SiteInfo) -> Result<String, BlueprintError> {
    let is_tera = name
        .as_path()
        .extension()
        .map(|ext| ext == TERA_FILE_EXTENSION)
        .unwrap_or(false);

    if !is_tera {
        return Ok(body);
    }

    let mut context = Context::new();
    context.insert("site", site);

    Tera::one_off(&body, &context, false).map_err(|error| BlueprintError::Render {
        name: name.to_string(),
        source: error,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn name(raw: &str) -> RelPath {
        RelPath::parse(raw).unwrap()
    }

    #[test]
    fn embedded_lookup_uses_normalized_names() {
        let body = EmbeddedBlueprint.read(&name("./src/main.jsx")).unwrap();
        assert!(body.contains("ReactDOM"));
    }

    #[test]
    fn embedded_lookup_reports_missing_names() {
        let error = EmbeddedBlueprint.read(&name("src/missing.jsx")).unwrap_err();
        assert!(matches!(error, BlueprintError::NotFound { .. }));
    }

    #[test]
    fn every_embedded_body_renders_with_defaults() {
        let site = SiteInfo::default();
        for embedded in EmbeddedBlueprint.names() {
            let body = EmbeddedBlueprint.read(&name(embedded)).unwrap();
            let rendered = render(&name(embedded), body, &site).unwrap();
            assert!(!rendered.contains("{{ site."), "{embedded} left a placeholder");
        }
    }

    #[test]
    fn tera_bodies_are_rendered_without_escaping() {
        let rendered = render(
            &name("index.html.tera"),
            "<title>{{ site.author }} - {{ site.headline }}</title>".to_string(),
            &SiteInfo::default(),
        )
        .unwrap();

        assert_eq!(
            rendered,
            "<title>Don Branson - AI Engineer & Solutions Architect</title>"
        );
    }

    #[test]
    fn plain_bodies_keep_braces() {
        let body = "key: ${{ runner.os }}-node".to_string();
        let rendered = render(
            &name(".github/workflows/deploy.yml"),
            body.clone(),
            &SiteInfo::default(),
        )
        .unwrap();

        assert_eq!(rendered, body);
    }

    #[test]
    fn broken_tera_body_fails_to_render() {
        let error = render(
            &name("broken.txt.tera"),
            "{{ site.author".to_string(),
            &SiteInfo::default(),
        )
        .unwrap_err();

        assert!(matches!(error, BlueprintError::Render { .. }));
    }

    #[test]
    fn directory_blueprint_reads_from_disk() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir_all(dir.path().join("src")).unwrap();
        std::fs::write(dir.path().join("src/main.jsx"), "custom").unwrap();

        let blueprint = DirectoryBlueprint::new(dir.path());

        assert_eq!(blueprint.read(&name("src/main.jsx")).unwrap(), "custom");
        assert!(matches!(
            blueprint.read(&name("src/absent.jsx")),
            Err(BlueprintError::NotFound { .. })
        ));
    }
}
