use crate::{
    config::RestructureConfig,
    create::{self, Created},
    errors::IoError,
    relocate::{self, RelocateError},
    tree,
};
use std::{marker::PhantomData, path::PathBuf};

/// Directories are materialized next
pub struct Directories;
/// Files are relocated next
pub struct Moves;
/// Templates are written next
pub struct Creates;
/// Every phase ran
pub struct Done;

/// Marker for the stage a [`Restructure`] is in.
pub trait Phase {
    const NAME: &'static str;
}
impl Phase for Directories {
    const NAME: &'static str = "directories";
}
impl Phase for Moves {
    const NAME: &'static str = "moves";
}
impl Phase for Creates {
    const NAME: &'static str = "creates";
}
impl Phase for Done {
    const NAME: &'static str = "done";
}

/// What a finished run changed on disk.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Report {
    pub created_dirs: Vec<PathBuf>,
    pub moved: Vec<(PathBuf, PathBuf)>,
    pub written: Vec<PathBuf>,
    pub skipped: Vec<PathBuf>,
}

/// A restructure run, parameterized over the phase it is in.
///
/// The phases only ever go `Directories → Moves → Creates → Done`. Each step consumes
/// the previous state, so a phase can be neither skipped nor repeated, and an error
/// simply ends the run where it stands. Nothing is undone: whatever the finished
/// steps wrote stays on disk, and running again relies on directory creation being
/// idempotent and on moves skipping sources that are already gone.
///
/// # Example
///
/// ```no_run
/// use refold::{config::RestructureConfig, phases::Restructure};
///
/// let config = RestructureConfig::builtin()?;
/// let report = Restructure::new("site".into(), &config)
///     .materialize()?
///     .relocate()?
///     .create()?
///     .finish();
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
pub struct Restructure<'a, P: Phase> {
    root: PathBuf,
    config: &'a RestructureConfig,
    report: Report,
    phase: PhantomData<P>,
}
impl<'a, P: Phase> Restructure<'a, P> {
    pub fn root(&self) -> &std::path::Path {
        &self.root
    }

    pub fn report(&self) -> &Report {
        &self.report
    }

    fn advance<Next: Phase>(self) -> Restructure<'a, Next> {
        log::debug!("phase {} -> {}", P::NAME, Next::NAME);

        Restructure {
            root: self.root,
            config: self.config,
            report: self.report,
            phase: PhantomData,
        }
    }
}
impl<'a> Restructure<'a, Directories> {
    /// Starts a run against `root`, which should already be absolute.
    pub fn new(root: PathBuf, config: &'a RestructureConfig) -> Self {
        Restructure {
            root,
            config,
            report: Report::default(),
            phase: PhantomData,
        }
    }

    pub fn materialize(mut self) -> Result<Restructure<'a, Moves>, IoError> {
        self.report.created_dirs = tree::materialize(&self.config.dirs, &self.root)?;

        Ok(self.advance())
    }
}
impl<'a> Restructure<'a, Moves> {
    pub fn relocate(mut self) -> Result<Restructure<'a, Creates>, RelocateError> {
        self.report.moved = relocate::relocate(&self.config.moves, &self.root)?;

        Ok(self.advance())
    }
}
impl<'a> Restructure<'a, Creates> {
    pub fn create(mut self) -> Result<Restructure<'a, Done>, IoError> {
        let Created { written, skipped } =
            create::create(&self.config.files, &self.root, self.config.overwrite)?;

        self.report.written = written;
        self.report.skipped = skipped;

        Ok(self.advance())
    }
}
impl Restructure<'_, Done> {
    pub fn finish(self) -> Report {
        self.report
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        create::{FileTemplate, OverwritePolicy},
        relocate::FileMapping,
        tree::DirectoryTree,
        utils::RelPath,
    };

    fn small_config() -> RestructureConfig {
        RestructureConfig {
            dirs: DirectoryTree::Leaf(RelPath::parse("public/js").unwrap()),
            moves: vec![FileMapping::new(
                RelPath::parse("viewer.js").unwrap(),
                RelPath::parse("public/js/viewer.js").unwrap(),
            )],
            files: vec![FileTemplate {
                path: RelPath::parse("public/js/viewer.js").unwrap(),
                content: "// generated".to_string(),
            }],
            overwrite: OverwritePolicy::Skip,
        }
    }

    #[test]
    fn phases_run_in_order_and_fill_the_report() {
        let root = tempfile::tempdir().unwrap();
        std::fs::write(root.path().join("viewer.js"), "// legacy").unwrap();
        let config = small_config();

        let report = Restructure::new(root.path().to_path_buf(), &config)
            .materialize()
            .unwrap()
            .relocate()
            .unwrap()
            .create()
            .unwrap()
            .finish();

        assert_eq!(report.created_dirs, vec![root.path().join("public/js")]);
        assert_eq!(report.moved.len(), 1);
        // the moved file already sits where the template wants to write
        assert_eq!(report.skipped, vec![root.path().join("public/js/viewer.js")]);
        assert!(report.written.is_empty());
        assert_eq!(
            std::fs::read_to_string(root.path().join("public/js/viewer.js")).unwrap(),
            "// legacy"
        );
    }

    #[test]
    fn a_failed_phase_leaves_earlier_work_in_place() {
        let root = tempfile::tempdir().unwrap();
        let mut config = small_config();
        std::fs::create_dir_all(root.path().join("public/js/viewer.js")).unwrap();
        config.overwrite = OverwritePolicy::Overwrite;

        let moves = Restructure::new(root.path().to_path_buf(), &config)
            .materialize()
            .unwrap();
        let creates = moves.relocate().unwrap();
        assert!(creates.report().moved.is_empty());

        assert!(creates.create().is_err());
        assert!(root.path().join("public/js").is_dir());
    }
}
