//! Client for the search service's HTTP API.

mod types;

use std::time::Duration;

use bytes::Bytes;
use log::debug;
use reqwest::{Client, StatusCode, Url};
use serde::de::DeserializeOwned;
use thiserror::Error;

pub use types::{FileEntry, TorrentDetail, TorrentSummary};
use types::{CountResponse, TorrentList, TrackerList};

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("invalid server url {url}: {reason}")]
    InvalidUrl { url: String, reason: String },
    #[error("failed to build http client: {source}")]
    Client {
        #[source]
        source: reqwest::Error,
    },
    #[error("/{endpoint}: request failed: {source}")]
    Transport {
        endpoint: &'static str,
        #[source]
        source: reqwest::Error,
    },
    #[error("/{endpoint}: server returned {status}")]
    Status {
        endpoint: &'static str,
        status: StatusCode,
    },
    #[error("/{endpoint}: malformed response: {source}")]
    Decode {
        endpoint: &'static str,
        #[source]
        source: serde_json::Error,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListMode {
    Search,
    All,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageRequest {
    pub mode: ListMode,
    pub query: String,
    pub page: usize,
    pub page_size: usize,
}

impl PageRequest {
    /// Row offset sent as `f`; the server pages by offset, not page number.
    pub fn offset(&self) -> usize {
        self.page.saturating_mul(self.page_size)
    }
}

#[derive(Debug, Clone)]
pub struct ApiClient {
    http: Client,
    base: Url,
}

impl ApiClient {
    pub fn new(server_url: &str, timeout: Duration) -> Result<Self, ApiError> {
        let mut base = Url::parse(server_url).map_err(|err| ApiError::InvalidUrl {
            url: server_url.to_string(),
            reason: err.to_string(),
        })?;
        if base.cannot_be_a_base() || !matches!(base.scheme(), "http" | "https") {
            return Err(ApiError::InvalidUrl {
                url: server_url.to_string(),
                reason: "expected an http(s) base url".to_string(),
            });
        }
        if !base.path().ends_with('/') {
            let path = format!("{}/", base.path());
            base.set_path(&path);
        }
        let http = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|source| ApiError::Client { source })?;
        Ok(Self { http, base })
    }

    pub fn base_url(&self) -> &Url {
        &self.base
    }

    pub async fn list(&self, request: &PageRequest) -> Result<Vec<TorrentSummary>, ApiError> {
        let from = request.offset().to_string();
        let size = request.page_size.to_string();
        let body: TorrentList<TorrentSummary> = match request.mode {
            ListMode::Search => {
                self.get_json(
                    "query",
                    &[
                        ("q", request.query.as_str()),
                        ("f", from.as_str()),
                        ("s", size.as_str()),
                    ],
                )
                .await?
            }
            ListMode::All => {
                self.get_json("all", &[("f", from.as_str()), ("s", size.as_str())])
                    .await?
            }
        };
        Ok(body.torrents)
    }

    /// Fetches one torrent with its file list. `None` when the server
    /// does not know the hash.
    pub async fn torrent(&self, hash: &str) -> Result<Option<TorrentDetail>, ApiError> {
        let body: TorrentList<TorrentDetail> = self.get_json("torrent", &[("h", hash)]).await?;
        Ok(body.torrents.into_iter().next())
    }

    pub async fn delete(&self, hash: &str) -> Result<(), ApiError> {
        let endpoint = "delete";
        let url = self.endpoint(endpoint)?;
        debug!("DELETE {url} h={hash}");
        let response = self
            .http
            .delete(url)
            .query(&[("h", hash)])
            .send()
            .await
            .map_err(|source| ApiError::Transport { endpoint, source })?;
        check_status(endpoint, response.status())
    }

    pub async fn trackers(&self) -> Result<Vec<String>, ApiError> {
        let body: TrackerList = self.get_json("trackers", &[]).await?;
        Ok(body.trackers)
    }

    pub async fn count(&self) -> Result<u64, ApiError> {
        let body: CountResponse = self.get_json("count", &[]).await?;
        Ok(body.total_count)
    }

    /// Raw `.torrent` metainfo with the server's tracker list attached.
    pub async fn torrent_file(&self, hash: &str) -> Result<Bytes, ApiError> {
        self.get_bytes("torrentfile", &[("h", hash)]).await
    }

    fn endpoint(&self, endpoint: &'static str) -> Result<Url, ApiError> {
        self.base
            .join(endpoint)
            .map_err(|err| ApiError::InvalidUrl {
                url: format!("{}{endpoint}", self.base),
                reason: err.to_string(),
            })
    }

    async fn get_bytes(
        &self,
        endpoint: &'static str,
        query: &[(&str, &str)],
    ) -> Result<Bytes, ApiError> {
        let url = self.endpoint(endpoint)?;
        debug!("GET {url} {query:?}");
        let response = self
            .http
            .get(url)
            .query(query)
            .send()
            .await
            .map_err(|source| ApiError::Transport { endpoint, source })?;
        check_status(endpoint, response.status())?;
        response
            .bytes()
            .await
            .map_err(|source| ApiError::Transport { endpoint, source })
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        endpoint: &'static str,
        query: &[(&str, &str)],
    ) -> Result<T, ApiError> {
        let body = self.get_bytes(endpoint, query).await?;
        serde_json::from_slice(&body).map_err(|source| ApiError::Decode { endpoint, source })
    }
}

fn check_status(endpoint: &'static str, status: StatusCode) -> Result<(), ApiError> {
    if status.is_success() {
        Ok(())
    } else {
        Err(ApiError::Status { endpoint, status })
    }
}
