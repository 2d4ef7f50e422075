use std::path::PathBuf;

use anyhow::{Context, Result};
use log::{debug, info};

use crate::api::{ApiClient, ListMode};

use super::{action::Action, effect::Effect, state::App, util::torrent_file_name};

impl App {
    /// Network effects are spawned and answer with an [`Action`] on the app
    /// channel; everything else runs inline.
    pub fn run_effect(&mut self, effect: Effect) -> Result<()> {
        match effect {
            Effect::OpenLink { link } => {
                open::that(&link).with_context(|| format!("failed to open link: {link}"))?;
                self.status = "Opened magnet link".to_string();
            }
            other => self.spawn_request(other),
        }
        Ok(())
    }

    /// Initial load: first page of everything plus the tracker list and count.
    pub fn start(&mut self) {
        self.browse_all();
        self.spawn_request(Effect::FetchTrackers);
        self.spawn_request(Effect::FetchCount);
    }

    pub fn search(&mut self, query: &str) {
        self.list_mode = ListMode::Search;
        self.query = query.trim().to_string();
        self.page = 0;
        self.selected = 0;
        info!("search {:?}", self.query);
        self.fetch_page();
    }

    pub fn browse_all(&mut self) {
        self.list_mode = ListMode::All;
        self.page = 0;
        self.selected = 0;
        info!("browse all");
        self.fetch_page();
    }

    /// Negative pages clamp to the first one.
    pub fn go_to_page(&mut self, page: isize) {
        self.page = page.max(0) as usize;
        self.fetch_page();
    }

    pub fn next_page(&mut self) {
        if !self.has_more() {
            self.status = "No more results".to_string();
            return;
        }
        self.go_to_page(self.page as isize + 1);
    }

    pub fn prev_page(&mut self) {
        self.go_to_page(self.page as isize - 1);
    }

    pub fn refresh(&mut self) {
        self.fetch_page();
    }

    pub fn select_torrent(&mut self, hash: &str) {
        let seq = self.issue_seq();
        self.detail_seq = seq;
        self.detail_loading = Some(hash.to_string());
        self.status = "Loading torrent...".to_string();
        debug!("fetch detail {hash} (seq {seq})");
        self.spawn_request(Effect::FetchDetail {
            seq,
            hash: hash.to_string(),
        });
    }

    pub fn delete_torrent(&mut self, hash: &str) {
        info!("delete {hash}");
        self.status = "Deleting...".to_string();
        self.spawn_request(Effect::Delete {
            hash: hash.to_string(),
        });
    }

    pub(crate) fn poll_count(&mut self) {
        self.spawn_request(Effect::FetchCount);
    }

    fn fetch_page(&mut self) {
        let seq = self.issue_seq();
        self.list_seq = seq;
        self.list_loading = true;
        self.status = "Loading...".to_string();
        let request = self.page_request();
        debug!(
            "fetch {:?} page {} (offset {}, seq {seq})",
            request.mode,
            request.page,
            request.offset()
        );
        self.spawn_request(Effect::FetchPage { seq, request });
    }

    fn spawn_request(&self, effect: Effect) {
        let client = self.client.clone();
        let tx = self.tx.clone();
        tokio::spawn(async move {
            let action = match effect {
                Effect::FetchPage { seq, request } => {
                    let result = client.list(&request).await.map_err(|e| e.to_string());
                    Action::PageLoaded {
                        seq,
                        request,
                        result,
                    }
                }
                Effect::FetchDetail { seq, hash } => {
                    let result = client.torrent(&hash).await.map_err(|e| e.to_string());
                    Action::DetailLoaded { seq, hash, result }
                }
                Effect::Delete { hash } => {
                    let result = client.delete(&hash).await.map_err(|e| e.to_string());
                    Action::Deleted { hash, result }
                }
                Effect::FetchTrackers => {
                    Action::TrackersLoaded(client.trackers().await.map_err(|e| e.to_string()))
                }
                Effect::FetchCount => {
                    Action::CountLoaded(client.count().await.map_err(|e| e.to_string()))
                }
                Effect::SaveTorrentFile { hash, name, dir } => Action::TorrentFileSaved(
                    save_torrent_file(&client, &hash, &name, dir)
                        .await
                        .map_err(|e| format!("{e:#}")),
                ),
                Effect::OpenLink { .. } => return,
            };
            // The receiver only goes away on shutdown.
            let _ = tx.send(action);
        });
    }
}

async fn save_torrent_file(
    client: &ApiClient,
    hash: &str,
    name: &str,
    dir: PathBuf,
) -> Result<PathBuf> {
    let body = client.torrent_file(hash).await?;
    tokio::fs::create_dir_all(&dir)
        .await
        .with_context(|| format!("failed to create {}", dir.display()))?;
    let path = dir.join(torrent_file_name(name));
    tokio::fs::write(&path, &body)
        .await
        .with_context(|| format!("failed to write {}", path.display()))?;
    Ok(path)
}
