use crate::{config::RestructureConfig, create::OverwritePolicy};
use std::{
    collections::{HashMap, HashSet},
    path::{Path, PathBuf},
};

/// What a run would do to one path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlannedAction {
    CreateDirectory,
    /// Arrives from `from`, relative to the root.
    Move { from: PathBuf },
    /// Writes a template; `replaces` is set when a file is already there.
    Write { replaces: bool },
    /// Left alone because of [`OverwritePolicy::Skip`].
    Keep,
}

/// A single staged change, relative to the root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlannedEntry {
    pub destination: PathBuf,
    pub action: PlannedAction,
}

/// The changes a restructure would make, computed without touching the disk.
#[derive(Debug, Clone, Default)]
pub struct Plan {
    pub entries: Vec<PlannedEntry>,
}
impl Plan {
    /// Walks the three phases against the current state of `root`.
    ///
    /// Earlier phases are simulated so later ones see their effects: a directory
    /// planned for creation is not planned twice, and a path that an earlier move
    /// brings in, or takes away along with its parent directory, is seen that way by
    /// later moves and templates.
    pub fn build(config: &RestructureConfig, root: &Path) -> Self {
        let mut plan = Plan::default();
        let mut planned_dirs: HashSet<PathBuf> = HashSet::new();
        let mut staged = Staging::new(root);

        for path in config.dirs.paths() {
            let relative = path.as_path().to_path_buf();
            if root.join(&relative).is_dir() || !planned_dirs.insert(relative.clone()) {
                continue;
            }
            plan.push(relative, PlannedAction::CreateDirectory);
        }

        for mapping in &config.moves {
            let from = mapping.source.as_path().to_path_buf();
            let to = mapping.destination.as_path().to_path_buf();

            let carried = match staged.origin(&from) {
                Origin::Disk(source) if root.join(&source).exists() => Staged::MovedFrom(source),
                Origin::Written => Staged::Written,
                Origin::Disk(_) | Origin::Gone => continue,
            };

            staged.record(from.clone(), Staged::Departed);
            staged.record(to.clone(), carried);

            plan.push(to, PlannedAction::Move { from });
        }

        for template in &config.files {
            let destination = template.path.as_path().to_path_buf();
            let exists = staged.present(&destination);

            let action = match (exists, config.overwrite) {
                (true, OverwritePolicy::Skip) => PlannedAction::Keep,
                (replaces, _) => PlannedAction::Write { replaces },
            };

            staged.record(destination.clone(), Staged::Written);

            plan.push(destination, action);
        }

        plan
    }

    fn push(&mut self, destination: PathBuf, action: PlannedAction) {
        self.entries.push(PlannedEntry {
            destination,
            action,
        });
    }

    pub fn count(&self, matches: impl Fn(&PlannedAction) -> bool) -> usize {
        self.entries.iter().filter(|e| matches(&e.action)).count()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// What the simulated run last did at a path. Covers everything below it too.
#[derive(Debug, Clone)]
enum Staged {
    /// Now holds what was on disk at this root-relative path.
    MovedFrom(PathBuf),
    Written,
    Departed,
}

/// Where the content at a path would come from after the simulated steps.
enum Origin {
    Disk(PathBuf),
    Written,
    Gone,
}

struct Staging<'a> {
    root: &'a Path,
    changes: HashMap<PathBuf, Staged>,
}
impl<'a> Staging<'a> {
    fn new(root: &'a Path) -> Self {
        Self {
            root,
            changes: HashMap::new(),
        }
    }

    /// A change at `path` replaces whatever was recorded at or below it.
    fn record(&mut self, path: PathBuf, change: Staged) {
        self.changes.retain(|recorded, _| !recorded.starts_with(&path));
        self.changes.insert(path, change);
    }

    /// The nearest recorded ancestor decides; with none, the disk does.
    fn origin(&self, relative: &Path) -> Origin {
        for ancestor in relative.ancestors() {
            let (Some(change), Ok(rest)) =
                (self.changes.get(ancestor), relative.strip_prefix(ancestor))
            else {
                continue;
            };

            return match change {
                Staged::Departed => Origin::Gone,
                Staged::MovedFrom(source) if rest.as_os_str().is_empty() => {
                    Origin::Disk(source.clone())
                }
                Staged::MovedFrom(source) => Origin::Disk(source.join(rest)),
                Staged::Written if rest.as_os_str().is_empty() => Origin::Written,
                // a written file has no children
                Staged::Written => Origin::Gone,
            };
        }

        Origin::Disk(relative.to_path_buf())
    }

    fn present(&self, relative: &Path) -> bool {
        match self.origin(relative) {
            Origin::Disk(source) => self.root.join(source).exists(),
            Origin::Written => true,
            Origin::Gone => false,
        }
    }
}
