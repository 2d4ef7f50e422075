use std::path::PathBuf;

use crate::api::{PageRequest, TorrentDetail, TorrentSummary};

use super::effect::Effect;

#[derive(Debug)]
pub enum Action {
    Paste(String),
    EditQueryOpen,
    InputChar(char),
    InputBackspace,
    InputDelete,
    InputLeft,
    InputRight,
    InputHome,
    InputEnd,
    InputEnter,
    InputCancel,
    BrowseAll,
    Refresh,
    PageMove(isize),
    MoveSelection(isize),
    OpenSelected,
    DetailClose,
    TreeMove(isize),
    TreeToggle,
    OpenMagnet,
    SaveTorrentFile,
    ConfirmDeleteOpen,
    ConfirmDeleteSelect(bool),
    ConfirmDeleteConfirm,
    ConfirmDeleteCancel,
    HelpOpen,
    HelpClose,
    HelpScroll(i16),
    ErrorClear,
    PollCount,
    Quit,
    RunEffect(Effect),
    PageLoaded {
        seq: u64,
        request: PageRequest,
        result: Result<Vec<TorrentSummary>, String>,
    },
    DetailLoaded {
        seq: u64,
        hash: String,
        result: Result<Option<TorrentDetail>, String>,
    },
    Deleted {
        hash: String,
        result: Result<(), String>,
    },
    TrackersLoaded(Result<Vec<String>, String>),
    CountLoaded(Result<u64, String>),
    TorrentFileSaved(Result<PathBuf, String>),
}
