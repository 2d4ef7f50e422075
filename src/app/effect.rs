use std::path::PathBuf;

use crate::api::PageRequest;

#[derive(Debug, Clone)]
pub enum Effect {
    FetchPage {
        seq: u64,
        request: PageRequest,
    },
    FetchDetail {
        seq: u64,
        hash: String,
    },
    Delete {
        hash: String,
    },
    FetchTrackers,
    FetchCount,
    OpenLink {
        link: String,
    },
    SaveTorrentFile {
        hash: String,
        name: String,
        dir: PathBuf,
    },
}
