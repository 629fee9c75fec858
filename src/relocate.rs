use crate::{
    errors::{FileOperation, IoError},
    transform::Transform,
    utils::RelPath,
};
use colored::Colorize;
use miette::Diagnostic;
use std::{
    fs,
    io::Write,
    path::{Path, PathBuf},
};
use thiserror::Error;

#[derive(Debug, Error, Diagnostic)]
pub enum RelocateError {
    #[error(transparent)]
    #[diagnostic(transparent)]
    Io(#[from] IoError),

    #[error("cannot transform '{path}': it is a directory")]
    #[diagnostic(
        code(refold::relocate::transform_on_directory),
        help("Transforms rewrite file contents; drop the transform or point the mapping at a file")
    )]
    TransformOnDirectory { path: PathBuf },
}

/// Moves `source` to `destination`, both relative to the root.
#[derive(Debug, Clone)]
pub struct FileMapping {
    pub source: RelPath,
    pub destination: RelPath,
    pub transform: Option<Transform>,
}
impl FileMapping {
    pub fn new(source: RelPath, destination: RelPath) -> Self {
        Self {
            source,
            destination,
            transform: None,
        }
    }
    pub fn with_transform(mut self, transform: Transform) -> Self {
        self.transform = Some(transform);
        self
    }
}

/// Relocates every mapping whose source exists, in order.
///
/// Absent sources are skipped without a word so a half-finished run can simply be
/// started again. A plain mapping is a rename and works for directories as well as
/// files. A mapping with a [`Transform`] reads the source, rewrites it, writes it to
/// the destination and then deletes the source.
///
/// Returns the `(from, to)` pairs that were moved.
///
/// # Errors
///
/// Returns a [`RelocateError`] on the first filesystem failure, or when a transform
/// is attached to a directory.
pub fn relocate(
    mappings: &[FileMapping],
    root: &Path,
) -> Result<Vec<(PathBuf, PathBuf)>, RelocateError> {
    let mut moved = Vec::new();

    for mapping in mappings {
        let from = mapping.source.resolve(root);
        let to = mapping.destination.resolve(root);

        let exists = from
            .try_exists()
            .map_err(|error| IoError::new(FileOperation::Inspect, from.clone(), error))?;

        if !exists {
            log::debug!("nothing to move at {}", from.display());
            continue;
        }

        if let Some(parent) = to.parent() {
            fs::create_dir_all(parent)
                .map_err(|error| IoError::new(FileOperation::Mkdir, parent.to_path_buf(), error))?;
        }

        match &mapping.transform {
            Some(transform) => rewrite(&from, &to, transform)?,
            None => fs::rename(&from, &to)
                .map_err(|error| IoError::new(FileOperation::Rename, from.clone(), error))?,
        }

        println!(
            "{} {} -> {}",
            "Moved:".yellow(),
            from.display(),
            to.display()
        );

        moved.push((from, to));
    }

    Ok(moved)
}

/// Copy, transform, write, delete. The write goes through a temporary file next to
/// the destination so a failure never leaves a half-written target behind.
fn rewrite(from: &Path, to: &Path, transform: &Transform) -> Result<(), RelocateError> {
    if from.is_dir() {
        return Err(RelocateError::TransformOnDirectory {
            path: from.to_path_buf(),
        });
    }

    let content = fs::read_to_string(from)
        .map_err(|error| IoError::new(FileOperation::Read, from.to_path_buf(), error))?;

    let rewritten = transform.apply(&content);

    let directory = to.parent().unwrap_or_else(|| Path::new("."));

    let mut staged = tempfile::NamedTempFile::new_in(directory)
        .map_err(|error| IoError::new(FileOperation::Write, directory.to_path_buf(), error))?;

    let staged_path = staged.path().to_path_buf();

    staged
        .write_all(rewritten.as_bytes())
        .map_err(|error| IoError::new(FileOperation::Write, staged_path.clone(), error))?;

    let permissions = fs::metadata(from)
        .map_err(|error| IoError::new(FileOperation::Inspect, from.to_path_buf(), error))?
        .permissions();

    // the staged file starts out owner-only; the target keeps the source's mode
    fs::set_permissions(&staged_path, permissions)
        .map_err(|error| IoError::new(FileOperation::Write, staged_path.clone(), error))?;

    staged
        .persist(to)
        .map_err(|error| IoError::new(FileOperation::Write, to.to_path_buf(), error.error))?;

    // an in-place rewrite has nothing left to delete
    if from != to {
        fs::remove_file(from)
            .map_err(|error| IoError::new(FileOperation::Remove, from.to_path_buf(), error))?;
    }

    log::debug!("rewrote {} while moving it", from.display());

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mapping(source: &str, destination: &str) -> FileMapping {
        FileMapping::new(
            RelPath::parse(source).unwrap(),
            RelPath::parse(destination).unwrap(),
        )
    }

    #[test]
    fn missing_source_is_a_silent_no_op() {
        let root = tempfile::tempdir().unwrap();

        let moved = relocate(&[mapping("assets/js/gone.js", "public/js/gone.js")], root.path())
            .unwrap();

        assert!(moved.is_empty());
        assert!(!root.path().join("public/js/gone.js").exists());
        assert!(!root.path().join("public").exists());
    }

    #[test]
    fn present_source_is_renamed_with_its_bytes() {
        let root = tempfile::tempdir().unwrap();
        fs::create_dir_all(root.path().join("assets/css")).unwrap();
        fs::write(root.path().join("assets/css/styles.css"), b"body { margin: 0 }").unwrap();

        let moved = relocate(
            &[mapping("assets/css/styles.css", "src/assets/styles/main.css")],
            root.path(),
        )
        .unwrap();

        assert_eq!(moved.len(), 1);
        assert!(!root.path().join("assets/css/styles.css").exists());
        assert_eq!(
            fs::read(root.path().join("src/assets/styles/main.css")).unwrap(),
            b"body { margin: 0 }"
        );
    }

    #[test]
    fn directories_move_with_their_contents() {
        let root = tempfile::tempdir().unwrap();
        let demo = root.path().join("assets/projects/transformers-demo");
        fs::create_dir_all(demo.join("models")).unwrap();
        fs::write(demo.join("models/config.json"), "{}").unwrap();

        relocate(
            &[mapping(
                "assets/projects/transformers-demo",
                "public/projects/transformers-demo",
            )],
            root.path(),
        )
        .unwrap();

        assert!(!demo.exists());
        assert_eq!(
            fs::read_to_string(
                root.path()
                    .join("public/projects/transformers-demo/models/config.json")
            )
            .unwrap(),
            "{}"
        );
    }

    #[test]
    fn transform_rewrites_and_removes_source() {
        let root = tempfile::tempdir().unwrap();
        fs::write(root.path().join("legacy.html"), "<body><h1>hi</h1></body>").unwrap();

        let moved = relocate(
            &[mapping("legacy.html", "site/index.html").with_transform(Transform::ReplaceBody {
                body: "<div id=\"root\"></div>".to_string(),
            })],
            root.path(),
        )
        .unwrap();

        assert_eq!(moved.len(), 1);
        assert!(!root.path().join("legacy.html").exists());
        assert_eq!(
            fs::read_to_string(root.path().join("site/index.html")).unwrap(),
            "<body><div id=\"root\"></div></body>"
        );
    }

    #[test]
    fn transform_in_place_keeps_the_file() {
        let root = tempfile::tempdir().unwrap();
        fs::write(root.path().join("index.html"), "<body>\n<p>old</p>\n</body>").unwrap();

        relocate(
            &[mapping("index.html", "./index.html").with_transform(Transform::ReplaceBody {
                body: "new".to_string(),
            })],
            root.path(),
        )
        .unwrap();

        assert_eq!(
            fs::read_to_string(root.path().join("index.html")).unwrap(),
            "<body>new</body>"
        );
    }

    #[cfg(unix)]
    #[test]
    fn transform_keeps_the_source_mode() {
        use std::os::unix::fs::PermissionsExt;

        let root = tempfile::tempdir().unwrap();
        let index = root.path().join("index.html");
        fs::write(&index, "<body>old</body>").unwrap();
        fs::set_permissions(&index, fs::Permissions::from_mode(0o644)).unwrap();
        fs::write(root.path().join("run.sh"), "<body>echo</body>").unwrap();
        fs::set_permissions(root.path().join("run.sh"), fs::Permissions::from_mode(0o755))
            .unwrap();

        let body = Transform::ReplaceBody {
            body: "new".to_string(),
        };
        relocate(
            &[
                mapping("index.html", "index.html").with_transform(body.clone()),
                mapping("run.sh", "scripts/run.sh").with_transform(body),
            ],
            root.path(),
        )
        .unwrap();

        let mode = |path: &Path| fs::metadata(path).unwrap().permissions().mode() & 0o777;
        assert_eq!(mode(&index), 0o644);
        assert_eq!(mode(&root.path().join("scripts/run.sh")), 0o755);
        assert_eq!(fs::read_to_string(&index).unwrap(), "<body>new</body>");
    }

    #[test]
    fn transform_on_directory_is_rejected() {
        let root = tempfile::tempdir().unwrap();
        fs::create_dir_all(root.path().join("assets")).unwrap();

        let error = relocate(
            &[mapping("assets", "moved").with_transform(Transform::ReplaceBody {
                body: String::new(),
            })],
            root.path(),
        )
        .unwrap_err();

        assert!(matches!(error, RelocateError::TransformOnDirectory { .. }));
        assert!(root.path().join("assets").is_dir());
    }

    #[test]
    fn later_mappings_see_earlier_moves() {
        let root = tempfile::tempdir().unwrap();
        fs::write(root.path().join("a.txt"), "payload").unwrap();

        let moved = relocate(
            &[mapping("a.txt", "stage/b.txt"), mapping("stage/b.txt", "final/c.txt")],
            root.path(),
        )
        .unwrap();

        assert_eq!(moved.len(), 2);
        assert_eq!(
            fs::read_to_string(root.path().join("final/c.txt")).unwrap(),
            "payload"
        );
    }
}
