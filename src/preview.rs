use crate::plan::{Plan, PlannedAction};
use colored::Colorize;
use std::path::{Component, Path};

#[derive(Debug, Clone, PartialEq, Eq)]
enum Label {
    /// Only here to hold planned children
    Existing,
    Directory,
    Moved(String),
    File,
    Replaced,
    Kept,
}

/// Represents a node in the preview (an existing parent, or a planned change).
#[derive(Debug)]
struct TreeNode {
    name: String,
    label: Label,
    children: Vec<TreeNode>,
}
impl TreeNode {
    fn new(name: String, label: Label) -> Self {
        Self {
            name,
            label,
            children: Vec::new(),
        }
    }

    /// Walks `segments` down from this node, adding parents as needed, and labels
    /// the last one. A later label for the same path wins.
    fn insert(&mut self, segments: &[String], label: Label) {
        let Some((first, rest)) = segments.split_first() else {
            return;
        };

        let index = match self.children.iter().position(|c| &c.name == first) {
            Some(index) => index,
            None => {
                self.children.push(TreeNode::new(first.clone(), Label::Existing));
                self.children.len() - 1
            }
        };

        let child = &mut self.children[index];
        if rest.is_empty() {
            child.label = label;
        } else {
            child.insert(rest, label);
        }
    }

    fn decorated_name(&self) -> String {
        match &self.label {
            Label::Existing => self.name.normal().to_string(),
            Label::Directory => format!("{}/", self.name).blue().to_string(),
            Label::Moved(from) => format!("{} {}", self.name.yellow(), format!("(from {from})").dimmed()),
            Label::File => self.name.green().to_string(),
            Label::Replaced => format!("{} {}", self.name.red(), "(overwrite)".dimmed()),
            Label::Kept => format!("{} {}", self.name.dimmed(), "(kept)".dimmed()),
        }
    }
}

fn segments(path: &Path) -> Vec<String> {
    path.components()
        .filter_map(|c| match c {
            Component::Normal(segment) => Some(segment.to_string_lossy().to_string()),
            _ => None,
        })
        .collect()
}

/// Build the preview tree from the plan entries, returning the root node.
fn build_tree(plan: &Plan, root: &Path) -> TreeNode {
    let root_name = root
        .file_name()
        .map(|os| os.to_string_lossy().to_string())
        .unwrap_or_else(|| root.display().to_string());

    let mut tree = TreeNode::new(root_name, Label::Existing);

    for entry in &plan.entries {
        let label = match &entry.action {
            PlannedAction::CreateDirectory => Label::Directory,
            PlannedAction::Move { from } => Label::Moved(from.display().to_string()),
            PlannedAction::Write { replaces: false } => Label::File,
            PlannedAction::Write { replaces: true } => Label::Replaced,
            PlannedAction::Keep => Label::Kept,
        };

        tree.insert(&segments(&entry.destination), label);
    }

    tree
}

fn draw(node: &TreeNode, prefix: &str, is_last: bool, out: &mut Vec<String>) {
    let connector = if is_last { "└── " } else { "├── " };

    out.push(format!(
        "{}{}{}",
        prefix.yellow(),
        connector.yellow(),
        node.decorated_name()
    ));

    let child_prefix = if is_last {
        format!("{}    ", prefix)
    } else {
        format!("{}│   ", prefix)
    };

    let len = node.children.len();
    for (i, child) in node.children.iter().enumerate() {
        draw(child, &child_prefix, i == len - 1, out);
    }
}

/// Renders the plan as an ASCII tree rooted at `root`.
pub fn render_tree(plan: &Plan, root: &Path) -> String {
    let mut lines = Vec::new();

    draw(&build_tree(plan, root), "", true, &mut lines);

    lines.join("\n")
}

pub fn preview_as_tree(plan: &Plan, root: &Path) {
    println!(
        "Legend: {} = (new directory), {} = (moved), {} = (new file), {} = (overwritten)",
        "blue".blue(),
        "yellow".yellow(),
        "green".green(),
        "red".red()
    );

    let fancy_prompt = format!(
        "{} {}\n",
        "┌─".bold().bright_blue(),
        "Preview".bold().bright_blue(),
    );

    println!("{}", fancy_prompt);

    println!("{}", render_tree(plan, root));

    let summary = format!(
        "{} directories, {} moves, {} files ({} overwritten, {} kept)",
        plan.count(|a| *a == PlannedAction::CreateDirectory),
        plan.count(|a| matches!(a, PlannedAction::Move { .. })),
        plan.count(|a| matches!(a, PlannedAction::Write { .. })),
        plan.count(|a| *a == PlannedAction::Write { replaces: true }),
        plan.count(|a| *a == PlannedAction::Keep),
    );

    let fancy_prompt = format!(
        "\n{} {}\n",
        "└─".bold().bright_blue(),
        format!("Dry run: {summary}. Nothing was changed.").bright_green()
    );

    println!("{}", fancy_prompt);
}
