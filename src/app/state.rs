use std::path::PathBuf;

use chrono::{DateTime, Local};
use log::warn;
use tokio::sync::mpsc::UnboundedSender;

use crate::{
    api::{ApiClient, ListMode, PageRequest, TorrentDetail, TorrentSummary},
    config::Config,
    files::FileTreeView,
};

use super::action::Action;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Normal,
    EditQuery,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dialog {
    None,
    Detail,
    ConfirmDelete,
    Help,
}

/// The torrent shown in the detail modal together with its file tree.
#[derive(Debug, Clone)]
pub struct DetailState {
    pub torrent: TorrentDetail,
    pub files: FileTreeView,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeleteTarget {
    pub hash: String,
    pub name: String,
}

pub struct App {
    pub(crate) client: ApiClient,
    pub(crate) tx: UnboundedSender<Action>,
    pub(crate) query: String,
    pub(crate) input: String,
    pub(crate) input_cursor: usize,
    pub(crate) list_mode: ListMode,
    pub(crate) page: usize,
    pub(crate) page_size: usize,
    pub(crate) results: Vec<TorrentSummary>,
    pub(crate) selected: usize,
    pub(crate) total_count: Option<u64>,
    pub(crate) trackers: Vec<String>,
    pub(crate) detail: Option<DetailState>,
    pub(crate) next_seq: u64,
    pub(crate) list_seq: u64,
    pub(crate) detail_seq: u64,
    pub(crate) list_loading: bool,
    pub(crate) detail_loading: Option<String>,
    pub(crate) mode: Mode,
    pub(crate) dialog: Dialog,
    pub(crate) return_dialog: Dialog,
    pub(crate) delete_target: Option<DeleteTarget>,
    pub(crate) delete_choice: bool,
    pub(crate) help_scroll: u16,
    pub(crate) status: String,
    pub(crate) last_error: Option<String>,
    pub(crate) last_updated: Option<DateTime<Local>>,
    pub(crate) download_dir: PathBuf,
}

impl App {
    pub fn new(client: ApiClient, config: &Config, tx: UnboundedSender<Action>) -> Self {
        Self {
            client,
            tx,
            query: String::new(),
            input: String::new(),
            input_cursor: 0,
            list_mode: ListMode::All,
            page: 0,
            page_size: config.page_size.max(1),
            results: Vec::new(),
            selected: 0,
            total_count: None,
            trackers: Vec::new(),
            detail: None,
            next_seq: 0,
            list_seq: 0,
            detail_seq: 0,
            list_loading: false,
            detail_loading: None,
            mode: Mode::Normal,
            dialog: Dialog::None,
            return_dialog: Dialog::None,
            delete_target: None,
            delete_choice: false,
            help_scroll: 0,
            status: "Ready".to_string(),
            last_error: None,
            last_updated: None,
            download_dir: config.resolved_download_dir(),
        }
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    pub fn dialog(&self) -> Dialog {
        self.dialog
    }

    pub fn query(&self) -> &str {
        &self.query
    }

    pub fn input(&self) -> &str {
        &self.input
    }

    pub fn input_cursor(&self) -> usize {
        self.input_cursor
    }

    pub fn list_mode(&self) -> ListMode {
        self.list_mode
    }

    pub fn page(&self) -> usize {
        self.page
    }

    pub fn page_size(&self) -> usize {
        self.page_size
    }

    pub fn results(&self) -> &[TorrentSummary] {
        &self.results
    }

    pub fn selected_index(&self) -> usize {
        self.selected
    }

    pub fn selected_torrent(&self) -> Option<&TorrentSummary> {
        self.results.get(self.selected)
    }

    /// Guess based on the last page coming back full; the server has no
    /// total for a filtered query.
    pub fn has_more(&self) -> bool {
        self.results.len() == self.page_size
    }

    pub fn total_count(&self) -> Option<u64> {
        self.total_count
    }

    pub fn trackers(&self) -> &[String] {
        &self.trackers
    }

    pub fn detail(&self) -> Option<&DetailState> {
        self.detail.as_ref()
    }

    pub fn is_loading(&self) -> bool {
        self.list_loading || self.detail_loading.is_some()
    }

    pub fn delete_target(&self) -> Option<&DeleteTarget> {
        self.delete_target.as_ref()
    }

    /// Whether the confirm dialog sits on top of the detail modal of the
    /// torrent it would delete.
    pub fn detail_behind_confirm(&self) -> bool {
        self.dialog == Dialog::ConfirmDelete
            && self.return_dialog == Dialog::Detail
            && match (&self.detail, &self.delete_target) {
                (Some(detail), Some(target)) => detail.torrent.infohash_hex == target.hash,
                _ => false,
            }
    }

    pub fn delete_choice(&self) -> bool {
        self.delete_choice
    }

    pub fn help_scroll(&self) -> u16 {
        self.help_scroll
    }

    pub fn status(&self) -> &str {
        &self.status
    }

    pub fn last_updated(&self) -> Option<DateTime<Local>> {
        self.last_updated
    }

    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    pub fn server_url(&self) -> &str {
        self.client.base_url().as_str()
    }

    pub fn set_error(&mut self, err: impl ToString) {
        let message = err.to_string();
        warn!("{message}");
        self.last_error = Some(message);
        self.status = "Error".to_string();
    }

    pub fn clear_error(&mut self) {
        self.last_error = None;
        self.status = "Ready".to_string();
    }

    pub(crate) fn page_request(&self) -> PageRequest {
        PageRequest {
            mode: self.list_mode,
            query: self.query.clone(),
            page: self.page,
            page_size: self.page_size,
        }
    }

    pub(crate) fn issue_seq(&mut self) -> u64 {
        self.next_seq += 1;
        self.next_seq
    }

    pub(crate) fn insert_char(&mut self, c: char) {
        let idx = super::util::cursor_to_byte_index(&self.input, self.input_cursor);
        self.input.insert(idx, c);
        self.input_cursor += 1;
    }

    pub(crate) fn backspace(&mut self) {
        if self.input_cursor == 0 {
            return;
        }
        let end = super::util::cursor_to_byte_index(&self.input, self.input_cursor);
        let start = super::util::cursor_to_byte_index(&self.input, self.input_cursor - 1);
        self.input.replace_range(start..end, "");
        self.input_cursor -= 1;
    }

    pub(crate) fn delete(&mut self) {
        let len = self.input.chars().count();
        if self.input_cursor >= len {
            return;
        }
        let start = super::util::cursor_to_byte_index(&self.input, self.input_cursor);
        let end = super::util::cursor_to_byte_index(&self.input, self.input_cursor + 1);
        self.input.replace_range(start..end, "");
    }

    pub(crate) fn move_cursor_left(&mut self) {
        self.input_cursor = self.input_cursor.saturating_sub(1);
    }

    pub(crate) fn move_cursor_right(&mut self) {
        let len = self.input.chars().count();
        self.input_cursor = (self.input_cursor + 1).min(len);
    }

    pub(crate) fn move_selection(&mut self, delta: isize) {
        if self.results.is_empty() {
            self.selected = 0;
            return;
        }
        let last = self.results.len() as isize - 1;
        self.selected = (self.selected as isize + delta).clamp(0, last) as usize;
    }
}
