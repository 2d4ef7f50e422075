use std::{
    collections::hash_map::DefaultHasher,
    hash::{Hash, Hasher},
};

use log::{debug, warn};

use super::tree::{Directory, ExpansionState, TreeError, TreeRow, build, render};
use crate::api::FileEntry;

/// State behind one file-tree panel: the tree built from the last file
/// list, which directories are open, and the highlighted row.
#[derive(Debug, Clone)]
pub struct FileTreeView {
    fingerprint: Option<u64>,
    tree: Result<Directory, TreeError>,
    expanded: ExpansionState,
    cursor: usize,
}

impl Default for FileTreeView {
    fn default() -> Self {
        Self {
            fingerprint: None,
            tree: Ok(Directory::default()),
            expanded: ExpansionState::default(),
            cursor: 0,
        }
    }
}

impl FileTreeView {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuilds the tree when `entries` differ from the list seen by the
    /// previous call. Returns whether a rebuild happened.
    pub fn load(&mut self, entries: &[FileEntry]) -> bool {
        let fingerprint = fingerprint(entries);
        if self.fingerprint == Some(fingerprint) {
            return false;
        }
        self.tree = build(entries);
        match &self.tree {
            Ok(root) => debug!("built file tree: {} top-level entries", root.len()),
            Err(err) => warn!("cannot build file tree: {err}"),
        }
        self.fingerprint = Some(fingerprint);
        self.clamp_cursor();
        true
    }

    /// Forgets expansion and cursor; the cached tree stays.
    pub fn reset(&mut self) {
        self.expanded.clear();
        self.cursor = 0;
    }

    pub fn tree(&self) -> Result<&Directory, &TreeError> {
        self.tree.as_ref()
    }

    pub fn expansion(&self) -> &ExpansionState {
        &self.expanded
    }

    pub fn rows(&self) -> Vec<TreeRow> {
        match &self.tree {
            Ok(root) => render(root, &[], &self.expanded),
            Err(_) => Vec::new(),
        }
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn move_cursor(&mut self, delta: isize) {
        let len = self.rows().len();
        if len == 0 {
            self.cursor = 0;
            return;
        }
        self.cursor = (self.cursor as isize + delta).clamp(0, len as isize - 1) as usize;
    }

    pub fn toggle(&mut self, path: &str) -> bool {
        let open = self.expanded.toggle(path);
        self.clamp_cursor();
        open
    }

    /// Toggles the directory under the cursor. `None` when the cursor is
    /// on a file or the tree is empty.
    pub fn toggle_at_cursor(&mut self) -> Option<bool> {
        let rows = self.rows();
        let path = rows.get(self.cursor)?.directory_path()?.to_string();
        Some(self.toggle(&path))
    }

    fn clamp_cursor(&mut self) {
        let len = self.rows().len();
        self.cursor = self.cursor.min(len.saturating_sub(1));
    }
}

fn fingerprint(entries: &[FileEntry]) -> u64 {
    let mut hasher = DefaultHasher::new();
    entries.hash(&mut hasher);
    hasher.finish()
}
