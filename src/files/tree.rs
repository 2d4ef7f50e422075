use std::collections::HashSet;

use thiserror::Error;

use super::size::format_bytes;
use crate::api::FileEntry;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TreeError {
    #[error("`{path}` is listed both as a file and as a directory")]
    Conflict { path: String },
    #[error("file entry with an empty path")]
    EmptyPath,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TreeNode {
    Directory(Directory),
    Leaf(u64),
}

/// Children keep the order in which their names were first seen.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Directory {
    children: Vec<(String, TreeNode)>,
}

impl Directory {
    pub fn children(&self) -> impl Iterator<Item = (&str, &TreeNode)> {
        self.children.iter().map(|(name, node)| (name.as_str(), node))
    }

    pub fn get(&self, name: &str) -> Option<&TreeNode> {
        self.position(name).map(|idx| &self.children[idx].1)
    }

    pub fn len(&self) -> usize {
        self.children.len()
    }

    pub fn is_empty(&self) -> bool {
        self.children.is_empty()
    }

    fn position(&self, name: &str) -> Option<usize> {
        self.children.iter().position(|(child, _)| child == name)
    }

    fn insert(&mut self, entry: &FileEntry) -> Result<(), TreeError> {
        if entry.path.is_empty() {
            return Err(TreeError::EmptyPath);
        }
        let segments: Vec<&str> = entry.path.split('/').collect();
        let Some((last, parents)) = segments.split_last() else {
            return Err(TreeError::EmptyPath);
        };

        let mut current = self;
        for (depth, segment) in parents.iter().enumerate() {
            let idx = match current.position(segment) {
                Some(idx) => idx,
                None => {
                    current
                        .children
                        .push((segment.to_string(), TreeNode::Directory(Directory::default())));
                    current.children.len() - 1
                }
            };
            current = match &mut current.children[idx].1 {
                TreeNode::Directory(dir) => dir,
                TreeNode::Leaf(_) => {
                    return Err(TreeError::Conflict {
                        path: segments[..=depth].join("/"),
                    });
                }
            };
        }

        match current.position(last) {
            None => current
                .children
                .push((last.to_string(), TreeNode::Leaf(entry.size_bytes))),
            Some(idx) => {
                if let TreeNode::Directory(_) = current.children[idx].1 {
                    return Err(TreeError::Conflict {
                        path: entry.path.clone(),
                    });
                }
                // repeated file path: the first size stays
            }
        }
        Ok(())
    }
}

/// Groups `entries` by their `/`-separated paths under an implicit root.
pub fn build(entries: &[FileEntry]) -> Result<Directory, TreeError> {
    let mut root = Directory::default();
    for entry in entries {
        root.insert(entry)?;
    }
    Ok(root)
}

/// Directory paths (segments joined by `/`) that are currently open.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExpansionState {
    paths: HashSet<String>,
}

impl ExpansionState {
    pub fn is_expanded(&self, path: &str) -> bool {
        self.paths.contains(path)
    }

    /// Flips `path` and returns whether it is now expanded.
    pub fn toggle(&mut self, path: &str) -> bool {
        if self.paths.remove(path) {
            false
        } else {
            self.paths.insert(path.to_string());
            true
        }
    }

    pub fn clear(&mut self) {
        self.paths.clear();
    }

    pub fn len(&self) -> usize {
        self.paths.len()
    }

    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RowKind {
    File { size_bytes: u64 },
    Directory { path: String, expanded: bool },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TreeRow {
    pub depth: usize,
    pub name: String,
    pub kind: RowKind,
}

impl TreeRow {
    pub fn label(&self) -> String {
        match &self.kind {
            RowKind::File { size_bytes } => format!("{} - {}", self.name, format_bytes(*size_bytes)),
            RowKind::Directory { expanded, .. } => {
                let marker = if *expanded { "▼" } else { "▶" };
                format!("{marker} {}", self.name)
            }
        }
    }

    pub fn directory_path(&self) -> Option<&str> {
        match &self.kind {
            RowKind::Directory { path, .. } => Some(path),
            RowKind::File { .. } => None,
        }
    }
}

/// Flattens `dir` into display rows. Collapsed directories contribute
/// their own row only.
pub fn render(dir: &Directory, prefix: &[&str], expanded: &ExpansionState) -> Vec<TreeRow> {
    let mut path: Vec<&str> = prefix.to_vec();
    let mut rows = Vec::new();
    render_into(dir, &mut path, 0, expanded, &mut rows);
    rows
}

fn render_into<'a>(
    dir: &'a Directory,
    path: &mut Vec<&'a str>,
    depth: usize,
    expanded: &ExpansionState,
    rows: &mut Vec<TreeRow>,
) {
    for (name, node) in dir.children() {
        match node {
            TreeNode::Leaf(size_bytes) => rows.push(TreeRow {
                depth,
                name: name.to_string(),
                kind: RowKind::File {
                    size_bytes: *size_bytes,
                },
            }),
            TreeNode::Directory(child) => {
                path.push(name);
                let current = path.join("/");
                let is_open = expanded.is_expanded(&current);
                rows.push(TreeRow {
                    depth,
                    name: name.to_string(),
                    kind: RowKind::Directory {
                        path: current,
                        expanded: is_open,
                    },
                });
                if is_open {
                    render_into(child, path, depth + 1, expanded, rows);
                }
                path.pop();
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entries(list: &[(&str, u64)]) -> Vec<FileEntry> {
        list.iter()
            .map(|(path, size)| FileEntry::new(*path, *size))
            .collect()
    }

    fn labels(rows: &[TreeRow]) -> Vec<String> {
        rows.iter()
            .map(|r| format!("{}{}", "  ".repeat(r.depth), r.label()))
            .collect()
    }

    #[test]
    fn siblings_share_one_directory() {
        let root = build(&entries(&[("a/b.txt", 10), ("a/c.txt", 20)])).unwrap();
        assert_eq!(root.len(), 1);
        let Some(TreeNode::Directory(a)) = root.get("a") else {
            panic!("expected directory a");
        };
        let children: Vec<_> = a.children().collect();
        assert_eq!(
            children,
            vec![("b.txt", &TreeNode::Leaf(10)), ("c.txt", &TreeNode::Leaf(20))]
        );
    }

    #[test]
    fn single_file_is_root_leaf() {
        let root = build(&entries(&[("x.txt", 5)])).unwrap();
        assert_eq!(root.children().collect::<Vec<_>>(), vec![("x.txt", &TreeNode::Leaf(5))]);
    }

    #[test]
    fn children_keep_first_seen_order() {
        let input = entries(&[("z/1", 1), ("a/2", 2), ("z/3", 3), ("m", 4)]);
        let first = build(&input).unwrap();
        let second = build(&input).unwrap();
        assert_eq!(first, second);
        let names: Vec<_> = first.children().map(|(n, _)| n).collect();
        assert_eq!(names, vec!["z", "a", "m"]);
    }

    #[test]
    fn descending_into_a_file_is_a_conflict() {
        let err = build(&entries(&[("a/b", 1), ("a/b/c", 2)])).unwrap_err();
        assert_eq!(
            err,
            TreeError::Conflict {
                path: "a/b".to_string()
            }
        );
    }

    #[test]
    fn ending_on_a_directory_is_a_conflict() {
        let err = build(&entries(&[("a/b/c", 1), ("a/b", 2)])).unwrap_err();
        assert_eq!(
            err,
            TreeError::Conflict {
                path: "a/b".to_string()
            }
        );
    }

    #[test]
    fn duplicate_file_keeps_first_size() {
        let root = build(&entries(&[("f", 1), ("f", 99)])).unwrap();
        assert_eq!(root.get("f"), Some(&TreeNode::Leaf(1)));
        assert_eq!(root.len(), 1);
    }

    #[test]
    fn empty_path_is_rejected() {
        assert_eq!(build(&entries(&[("", 1)])), Err(TreeError::EmptyPath));
    }

    #[test]
    fn collapsed_tree_renders_top_level_only() {
        let root = build(&entries(&[("docs/readme.md", 1536), ("setup.exe", 0)])).unwrap();
        let rows = render(&root, &[], &ExpansionState::default());
        assert_eq!(labels(&rows), vec!["▶ docs", "setup.exe - 0 Bytes"]);
    }

    #[test]
    fn expanded_directory_shows_children_indented() {
        let root = build(&entries(&[
            ("show/s01/e01.mkv", 1_048_576),
            ("show/s01/e02.mkv", 1024),
            ("show/info.nfo", 10),
        ]))
        .unwrap();
        let mut expanded = ExpansionState::default();
        expanded.toggle("show");
        let rows = render(&root, &[], &expanded);
        assert_eq!(
            labels(&rows),
            vec!["▼ show", "  ▶ s01", "  info.nfo - 10 Bytes"]
        );

        expanded.toggle("show/s01");
        let rows = render(&root, &[], &expanded);
        assert_eq!(
            labels(&rows),
            vec![
                "▼ show",
                "  ▼ s01",
                "    e01.mkv - 1 MB",
                "    e02.mkv - 1 KB",
                "  info.nfo - 10 Bytes",
            ]
        );
    }

    #[test]
    fn expansion_is_keyed_by_full_path() {
        let root = build(&entries(&[("a/data/x", 1), ("b/data/y", 2)])).unwrap();
        let mut expanded = ExpansionState::default();
        expanded.toggle("a");
        expanded.toggle("b");
        expanded.toggle("a/data");
        let rows = render(&root, &[], &expanded);
        assert_eq!(
            labels(&rows),
            vec!["▼ a", "  ▼ data", "    x - 1 Bytes", "▼ b", "  ▶ data"]
        );
    }

    #[test]
    fn prefix_feeds_into_directory_paths() {
        let root = build(&entries(&[("inner/f", 1)])).unwrap();
        let rows = render(&root, &["outer"], &ExpansionState::default());
        assert_eq!(rows[0].directory_path(), Some("outer/inner"));
    }

    #[test]
    fn toggling_twice_restores_state() {
        let mut expanded = ExpansionState::default();
        expanded.toggle("keep");
        let before = expanded.clone();
        assert!(expanded.toggle("a/b"));
        assert!(!expanded.toggle("a/b"));
        assert_eq!(expanded, before);
    }
}
