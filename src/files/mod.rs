//! Grouping of a torrent's flat file list into a collapsible tree.

mod size;
mod tree;
mod view;

pub use size::{format_bytes, human_size};
pub use tree::{Directory, ExpansionState, RowKind, TreeError, TreeNode, TreeRow, build, render};
pub use view::FileTreeView;
