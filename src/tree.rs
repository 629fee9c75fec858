use crate::{
    errors::{FileOperation, IoError},
    utils::RelPath,
};
use colored::Colorize;
use indexmap::IndexMap;
use serde::{
    de::{self, MapAccess, Visitor},
    Deserialize, Deserializer,
};
use std::{
    fmt,
    path::{Path, PathBuf},
};

/// Key a manifest table uses to name the directory the table itself stands for.
pub const SELF_KEY: &str = "_self";

/// Declarative description of the directories a restructure should produce.
///
/// Every path in the tree is relative to the root, never to the parent node, so
/// nesting only groups entries for readability.
#[derive(Debug, Clone, PartialEq)]
pub enum DirectoryTree {
    Leaf(RelPath),
    Node(TreeNode),
}
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TreeNode {
    pub self_path: Option<RelPath>,
    pub children: IndexMap<String, DirectoryTree>,
}
impl TryFrom<IndexMap<String, DirectoryTree>> for TreeNode {
    type Error = String;

    fn try_from(mut entries: IndexMap<String, DirectoryTree>) -> Result<Self, Self::Error> {
        let self_path = match entries.shift_remove(SELF_KEY) {
            None => None,
            Some(DirectoryTree::Leaf(path)) => Some(path),
            Some(DirectoryTree::Node(_)) => {
                return Err(format!("`{SELF_KEY}` must be a path string, found a table"))
            }
        };

        Ok(TreeNode {
            self_path,
            children: entries,
        })
    }
}

// a string is a leaf, a table is a node
impl<'de> Deserialize<'de> for DirectoryTree {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_any(TreeVisitor)
    }
}

struct TreeVisitor;

impl<'de> Visitor<'de> for TreeVisitor {
    type Value = DirectoryTree;

    fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
        formatter.write_str("a directory path or a table of directories")
    }

    fn visit_str<E: de::Error>(self, value: &str) -> Result<Self::Value, E> {
        RelPath::parse(value)
            .map(DirectoryTree::Leaf)
            .map_err(E::custom)
    }

    fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> Result<Self::Value, A::Error> {
        let mut entries = IndexMap::new();
        while let Some((key, value)) = map.next_entry::<String, DirectoryTree>()? {
            entries.insert(key, value);
        }

        TreeNode::try_from(entries)
            .map(DirectoryTree::Node)
            .map_err(de::Error::custom)
    }
}

impl Default for DirectoryTree {
    fn default() -> Self {
        DirectoryTree::Node(TreeNode::default())
    }
}
impl DirectoryTree {
    /// Every path the tree names, depth-first in insertion order.
    pub fn paths(&self) -> Vec<&RelPath> {
        let mut out = Vec::new();
        self.collect_paths(&mut out);
        out
    }

    fn collect_paths<'a>(&'a self, out: &mut Vec<&'a RelPath>) {
        match self {
            DirectoryTree::Leaf(path) => out.push(path),
            DirectoryTree::Node(node) => {
                if let Some(path) = &node.self_path {
                    out.push(path);
                }
                for child in node.children.values() {
                    child.collect_paths(out);
                }
            }
        }
    }
}

/// Ensures every directory named by `tree` exists below `root`.
///
/// Directories that are already present are left alone and not reported, so running
/// this twice is harmless. Returns the directories this call actually created.
///
/// # Errors
///
/// Returns an [`IoError`] if a directory cannot be created, including when a file
/// already occupies the path.
pub fn materialize(tree: &DirectoryTree, root: &Path) -> Result<Vec<PathBuf>, IoError> {
    let mut created = Vec::new();

    materialize_into(tree, root, &mut created)?;

    Ok(created)
}

fn materialize_into(
    tree: &DirectoryTree,
    root: &Path,
    created: &mut Vec<PathBuf>,
) -> Result<(), IoError> {
    match tree {
        DirectoryTree::Leaf(path) => ensure_directory(&path.resolve(root), created),
        DirectoryTree::Node(node) => {
            if let Some(path) = &node.self_path {
                ensure_directory(&path.resolve(root), created)?;
            }
            // children resolve against the root, not against the node's own path
            for child in node.children.values() {
                materialize_into(child, root, created)?;
            }
            Ok(())
        }
    }
}

fn ensure_directory(path: &Path, created: &mut Vec<PathBuf>) -> Result<(), IoError> {
    if path.is_dir() {
        log::debug!("directory exists: {}", path.display());
        return Ok(());
    }

    std::fs::create_dir_all(path)
        .map_err(|error| IoError::new(FileOperation::Mkdir, path.to_path_buf(), error))?;

    println!("{} {}", "Created directory:".blue(), path.display());

    created.push(path.to_path_buf());

    Ok(())
}
