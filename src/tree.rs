//! Hierarchical view of the matched files and its `tree`-style rendering.

use serde::{Deserialize, Serialize};
use std::path::{Component, Path, PathBuf};

const BRANCH: &str = "├── ";
const LAST_BRANCH: &str = "└── ";
const PIPE: &str = "│   ";
const SPACE: &str = "    ";

/// A directory or file in the rendered hierarchy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum TreeNode {
    Directory { name: String, children: Vec<TreeNode> },
    File { name: String },
}

impl TreeNode {
    pub fn directory(name: impl Into<String>, children: Vec<TreeNode>) -> Self {
        TreeNode::Directory {
            name: name.into(),
            children,
        }
    }

    pub fn file(name: impl Into<String>) -> Self {
        TreeNode::File { name: name.into() }
    }

    pub fn name(&self) -> &str {
        match self {
            TreeNode::Directory { name, .. } | TreeNode::File { name } => name,
        }
    }

    pub fn is_dir(&self) -> bool {
        matches!(self, TreeNode::Directory { .. })
    }

    /// Children in insertion order. Always empty for files.
    pub fn children(&self) -> &[TreeNode] {
        match self {
            TreeNode::Directory { children, .. } => children,
            TreeNode::File { .. } => &[],
        }
    }

    /// Number of file leaves in this subtree.
    pub fn file_count(&self) -> usize {
        match self {
            TreeNode::Directory { children, .. } => children.iter().map(TreeNode::file_count).sum(),
            TreeNode::File { .. } => 1,
        }
    }

    /// A node can be rendered on one line only if its name is a single,
    /// non-empty path segment.
    fn is_well_formed(&self) -> bool {
        let name = self.name();
        !name.is_empty() && !name.contains(['\n', '\r']) && !name.chars().any(std::path::is_separator)
    }

    /// Lines for every descendant of this node. The node's own name is not
    /// included.
    pub fn render(&self) -> TreeLines<'_> {
        TreeLines {
            stack: vec![Frame {
                children: self.children(),
                index: 0,
                prefix: String::new(),
            }],
        }
    }

    /// The node's name followed by its rendered descendants, newline-joined.
    pub fn to_tree_string(&self) -> String {
        std::iter::once(self.name().to_string())
            .chain(self.render())
            .collect::<Vec<_>>()
            .join("\n")
    }
}

/// Builds the tree of `files` relative to `root`.
///
/// Children keep the order in which their first file was supplied.
/// Paths equal to `root`, or outside it, never become nodes.
pub fn build_tree(root: &Path, files: &[PathBuf]) -> TreeNode {
    let root_name = root
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| root.display().to_string());
    let mut children = Vec::new();

    for file in files {
        let Ok(relative) = file.strip_prefix(root) else {
            #[cfg(feature = "logging")]
            tracing::debug!("Skipping {} outside of {}", file.display(), root.display());
            continue;
        };
        let segments: Vec<String> = relative
            .components()
            .filter_map(|c| match c {
                Component::Normal(part) => Some(part.to_string_lossy().into_owned()),
                _ => None,
            })
            .collect();
        let Some((leaf, dirs)) = segments.split_last() else {
            continue;
        };
        insert(&mut children, dirs, leaf);
    }

    TreeNode::directory(root_name, children)
}

fn insert(mut level: &mut Vec<TreeNode>, dirs: &[String], leaf: &str) {
    for dir in dirs {
        let index = match level.iter().position(|c| c.name() == dir) {
            Some(index) => index,
            None => {
                level.push(TreeNode::directory(dir.as_str(), Vec::new()));
                level.len() - 1
            }
        };
        match &mut level[index] {
            TreeNode::Directory { children, .. } => level = children,
            TreeNode::File { .. } => return,
        }
    }
    if !level.iter().any(|c| c.name() == leaf) {
        level.push(TreeNode::file(leaf));
    }
}

struct Frame<'a> {
    children: &'a [TreeNode],
    index: usize,
    prefix: String,
}

/// Lazy depth-first rendering of a [`TreeNode`]'s descendants.
pub struct TreeLines<'a> {
    stack: Vec<Frame<'a>>,
}

impl Iterator for TreeLines<'_> {
    type Item = String;

    fn next(&mut self) -> Option<String> {
        loop {
            let frame = self.stack.last_mut()?;
            let children = frame.children;
            let Some(child) = children.get(frame.index) else {
                self.stack.pop();
                continue;
            };
            frame.index += 1;
            let is_last = frame.index == children.len();

            if !child.is_well_formed() {
                let raw = serde_json::to_string(child).unwrap_or_else(|_| format!("{child:?}"));
                return Some(format!("{}[INVALID NODE: {}]", frame.prefix, raw));
            }

            let (connector, extension) = if is_last { (LAST_BRANCH, SPACE) } else { (BRANCH, PIPE) };
            let line = format!("{}{}{}", frame.prefix, connector, child.name());
            let grandchildren = child.children();
            if !grandchildren.is_empty() {
                let prefix = format!("{}{}", frame.prefix, extension);
                self.stack.push(Frame {
                    children: grandchildren,
                    index: 0,
                    prefix,
                });
            }
            return Some(line);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn paths(root: &Path, rel: &[&str]) -> Vec<PathBuf> {
        rel.iter().map(|r| root.join(r)).collect()
    }

    #[test]
    fn builds_in_supplied_order() {
        let root = Path::new("/proj");
        let tree = build_tree(root, &paths(root, &["z.txt", "src/main.rs", "a.txt", "src/lib.rs"]));
        assert_eq!(tree.name(), "proj");
        let names: Vec<_> = tree.children().iter().map(TreeNode::name).collect();
        assert_eq!(names, ["z.txt", "src", "a.txt"]);
        let src: Vec<_> = tree.children()[1].children().iter().map(TreeNode::name).collect();
        assert_eq!(src, ["main.rs", "lib.rs"]);
    }

    #[test]
    fn leaf_count_matches_input_and_root_is_skipped() {
        let root = Path::new("/proj");
        let mut files = paths(root, &["a", "b/c", "b/d/e", "f/g"]);
        files.push(root.to_path_buf());
        let tree = build_tree(root, &files);
        assert_eq!(tree.file_count(), 4);
    }

    #[test]
    fn duplicates_are_not_inserted_twice() {
        let root = Path::new("/proj");
        let tree = build_tree(root, &paths(root, &["d/x.rs", "d/x.rs"]));
        assert_eq!(tree.file_count(), 1);
        assert_eq!(tree.children().len(), 1);
    }

    #[test]
    fn renders_connectors_and_continuations() {
        let root = Path::new("/root");
        let tree = build_tree(root, &paths(root, &["a.txt", "sub/b.txt", "sub/c.txt"]));
        let lines: Vec<String> = tree.render().collect();
        assert_eq!(lines, ["├── a.txt", "└── sub", "    ├── b.txt", "    └── c.txt"]);
    }

    #[test]
    fn interior_directories_continue_with_a_pipe() {
        let root = Path::new("/root");
        let tree = build_tree(root, &paths(root, &["sub/b.txt", "sub/c.txt", "a.txt"]));
        let lines: Vec<String> = tree.render().collect();
        assert_eq!(lines, ["├── sub", "│   ├── b.txt", "│   └── c.txt", "└── a.txt"]);
    }

    #[test]
    fn rendering_is_repeatable() {
        let root = Path::new("/r");
        let tree = build_tree(root, &paths(root, &["a/b/c.rs", "a/d.rs", "e.rs"]));
        assert_eq!(tree.to_tree_string(), tree.to_tree_string());
        assert_eq!(
            tree.to_tree_string(),
            "r\n├── a\n│   ├── b\n│   │   └── c.rs\n│   └── d.rs\n└── e.rs"
        );
    }

    #[test]
    fn malformed_node_gets_a_placeholder_and_siblings_still_render() {
        let tree = TreeNode::directory(
            "root",
            vec![
                TreeNode::file("ok.txt"),
                TreeNode::directory("bad\nname", vec![TreeNode::file("hidden.txt")]),
                TreeNode::file(""),
                TreeNode::file("last.txt"),
            ],
        );
        let lines: Vec<String> = tree.render().collect();
        assert_eq!(lines.len(), 4);
        assert_eq!(lines[0], "├── ok.txt");
        assert!(lines[1].starts_with("[INVALID NODE: "));
        assert!(lines[2].starts_with("[INVALID NODE: "));
        assert_eq!(lines[3], "└── last.txt");
    }

    #[test]
    fn empty_tree_renders_nothing() {
        let tree = build_tree(Path::new("/r"), &[]);
        assert_eq!(tree.render().count(), 0);
        assert_eq!(tree.to_tree_string(), "r");
    }
}
