use serde::{Deserialize, Deserializer, Serialize};

/// One file inside a torrent, as the server lists it.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FileEntry {
    #[serde(rename = "name")]
    pub path: String,
    #[serde(rename = "length")]
    pub size_bytes: u64,
}

impl FileEntry {
    pub fn new(path: impl Into<String>, size_bytes: u64) -> Self {
        Self {
            path: path.into(),
            size_bytes,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TorrentSummary {
    pub infohash_hex: String,
    pub name: String,
    pub length: u64,
    #[serde(default)]
    pub seeds: u32,
    #[serde(default)]
    pub leechers: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TorrentDetail {
    pub infohash_hex: String,
    pub name: String,
    pub length: u64,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub files: Vec<FileEntry>,
}

/// Body of `/query`, `/all` and `/torrent`. The server encodes an empty
/// result as `null`.
#[derive(Debug, Deserialize)]
#[serde(bound(deserialize = "T: Deserialize<'de>"))]
pub(crate) struct TorrentList<T> {
    #[serde(default, deserialize_with = "null_as_empty")]
    pub torrents: Vec<T>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct TrackerList {
    #[serde(default, deserialize_with = "null_as_empty")]
    pub trackers: Vec<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct CountResponse {
    pub total_count: u64,
}

fn null_as_empty<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Ok(Option::<Vec<T>>::deserialize(deserializer)?.unwrap_or_default())
}
