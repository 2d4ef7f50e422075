use std::collections::VecDeque;

use anyhow::Result;
use chrono::Local;
use log::{debug, info, warn};

use super::{
    Mode,
    action::Action,
    effect::Effect,
    state::{App, DeleteTarget, DetailState, Dialog},
    util::magnet_link,
};
use crate::files::FileTreeView;

impl App {
    pub fn handle_event(&mut self, ev: crossterm::event::Event) -> Result<bool> {
        let actions = self.actions_from_event(ev);
        self.run_actions(actions.into())
    }

    /// Entry point for actions that arrive on the app channel.
    pub fn dispatch(&mut self, action: Action) -> Result<bool> {
        self.run_actions(VecDeque::from([action]))
    }

    fn run_actions(&mut self, mut queue: VecDeque<Action>) -> Result<bool> {
        while let Some(action) = queue.pop_front() {
            if let Some(quit) = self.apply_action(action, &mut queue)? {
                return Ok(quit);
            }
        }
        Ok(false)
    }

    fn apply_action(
        &mut self,
        action: Action,
        queue: &mut VecDeque<Action>,
    ) -> Result<Option<bool>> {
        match action {
            Action::Paste(text) => {
                if self.mode == Mode::EditQuery {
                    let text: String = text.chars().filter(|c| !c.is_control()).collect();
                    for c in text.chars() {
                        self.insert_char(c);
                    }
                } else {
                    self.status = "Paste ignored".to_string();
                }
            }
            Action::EditQueryOpen => {
                self.mode = Mode::EditQuery;
                self.input = self.query.clone();
                self.input_cursor = self.input.chars().count();
                self.status = "Type a query and press Enter".to_string();
            }
            Action::InputChar(c) => {
                self.insert_char(c);
            }
            Action::InputBackspace => {
                self.backspace();
            }
            Action::InputDelete => {
                self.delete();
            }
            Action::InputLeft => {
                self.move_cursor_left();
            }
            Action::InputRight => {
                self.move_cursor_right();
            }
            Action::InputHome => {
                self.input_cursor = 0;
            }
            Action::InputEnd => {
                self.input_cursor = self.input.chars().count();
            }
            Action::InputEnter => {
                let value = std::mem::take(&mut self.input);
                self.input_cursor = 0;
                self.mode = Mode::Normal;
                self.search(&value);
            }
            Action::InputCancel => {
                self.mode = Mode::Normal;
                self.input.clear();
                self.input_cursor = 0;
                self.status = "Cancelled".to_string();
            }
            Action::BrowseAll => {
                self.browse_all();
            }
            Action::Refresh => {
                self.refresh();
            }
            Action::PageMove(delta) => {
                if delta > 0 {
                    self.next_page();
                } else if delta < 0 {
                    self.prev_page();
                }
            }
            Action::MoveSelection(delta) => {
                self.move_selection(delta);
            }
            Action::OpenSelected => {
                if let Some(hash) = self.selected_torrent().map(|t| t.infohash_hex.clone()) {
                    self.select_torrent(&hash);
                }
            }
            Action::DetailClose => {
                self.dialog = Dialog::None;
            }
            Action::TreeMove(delta) => {
                if let Some(detail) = &mut self.detail {
                    detail.files.move_cursor(delta);
                }
            }
            Action::TreeToggle => {
                if let Some(detail) = &mut self.detail {
                    detail.files.toggle_at_cursor();
                }
            }
            Action::OpenMagnet => {
                if let Some(hash) = self.focused_hash() {
                    let link = magnet_link(&hash, &self.trackers);
                    queue.push_back(Action::RunEffect(Effect::OpenLink { link }));
                }
            }
            Action::SaveTorrentFile => {
                if let Some(target) = self.focused_target() {
                    self.status = format!("Saving {}...", target.name);
                    queue.push_back(Action::RunEffect(Effect::SaveTorrentFile {
                        hash: target.hash,
                        name: target.name,
                        dir: self.download_dir.clone(),
                    }));
                }
            }
            Action::ConfirmDeleteOpen => {
                if let Some(target) = self.focused_target() {
                    self.delete_target = Some(target);
                    self.delete_choice = false;
                    self.return_dialog = self.dialog;
                    self.dialog = Dialog::ConfirmDelete;
                }
            }
            Action::ConfirmDeleteSelect(choice) => {
                self.delete_choice = choice;
            }
            Action::ConfirmDeleteConfirm => {
                let target = self.delete_target.take();
                let confirmed = std::mem::take(&mut self.delete_choice);
                self.dialog = self.return_dialog;
                match target {
                    Some(target) if confirmed => self.delete_torrent(&target.hash),
                    _ => self.status = "Delete cancelled".to_string(),
                }
            }
            Action::ConfirmDeleteCancel => {
                self.delete_target = None;
                self.delete_choice = false;
                self.dialog = self.return_dialog;
                self.status = "Delete cancelled".to_string();
            }
            Action::HelpOpen => {
                self.help_scroll = 0;
                self.return_dialog = self.dialog;
                self.dialog = Dialog::Help;
            }
            Action::HelpClose => {
                self.help_scroll = 0;
                self.dialog = self.return_dialog;
            }
            Action::HelpScroll(delta) => {
                if delta.is_negative() {
                    self.help_scroll = self.help_scroll.saturating_sub(delta.unsigned_abs());
                } else {
                    self.help_scroll = self.help_scroll.saturating_add(delta as u16);
                }
            }
            Action::ErrorClear => {
                self.clear_error();
            }
            Action::PollCount => {
                self.poll_count();
            }
            Action::Quit => {
                return Ok(Some(true));
            }
            Action::RunEffect(effect) => {
                self.run_effect(effect)?;
            }
            Action::PageLoaded {
                seq,
                request,
                result,
            } => {
                if seq != self.list_seq {
                    debug!("dropping stale page response (seq {seq}, want {})", self.list_seq);
                    return Ok(None);
                }
                self.list_loading = false;
                match result {
                    Ok(rows) => {
                        info!("page {} loaded: {} rows", request.page, rows.len());
                        self.results = rows;
                        self.selected = self.selected.min(self.results.len().saturating_sub(1));
                        self.last_error = None;
                        self.last_updated = Some(Local::now());
                        self.status = if self.results.is_empty() {
                            "No results".to_string()
                        } else {
                            format!("{} results", self.results.len())
                        };
                    }
                    Err(err) => self.set_error(err),
                }
            }
            Action::DetailLoaded { seq, hash, result } => {
                if seq != self.detail_seq {
                    debug!("dropping stale detail response for {hash} (seq {seq})");
                    return Ok(None);
                }
                self.detail_loading = None;
                match result {
                    Ok(Some(torrent)) => {
                        let same = self
                            .detail
                            .as_ref()
                            .is_some_and(|d| d.torrent.infohash_hex == torrent.infohash_hex);
                        let mut files = match self.detail.take() {
                            Some(detail) if same => detail.files,
                            _ => FileTreeView::new(),
                        };
                        files.load(&torrent.files);
                        self.status = torrent.name.clone();
                        self.detail = Some(DetailState { torrent, files });
                        // an open confirm or help dialog keeps focus and
                        // returns to the detail when closed
                        match self.dialog {
                            Dialog::ConfirmDelete | Dialog::Help => {
                                self.return_dialog = Dialog::Detail;
                            }
                            Dialog::None | Dialog::Detail => self.dialog = Dialog::Detail,
                        }
                    }
                    Ok(None) => self.set_error(format!("torrent {hash} not found")),
                    Err(err) => self.set_error(err),
                }
            }
            Action::Deleted { hash, result } => match result {
                Ok(()) => {
                    info!("deleted {hash}");
                    let showing = self
                        .detail
                        .as_ref()
                        .is_some_and(|d| d.torrent.infohash_hex == hash);
                    if showing {
                        self.detail = None;
                        if self.dialog == Dialog::Detail {
                            self.dialog = Dialog::None;
                        }
                        self.return_dialog = Dialog::None;
                    }
                    queue.push_back(Action::Refresh);
                }
                Err(err) => self.set_error(err),
            },
            Action::TrackersLoaded(result) => match result {
                Ok(trackers) => {
                    debug!("{} trackers", trackers.len());
                    self.trackers = trackers;
                }
                Err(err) => warn!("tracker list unavailable: {err}"),
            },
            Action::CountLoaded(result) => match result {
                Ok(count) => self.total_count = Some(count),
                Err(err) => warn!("count unavailable: {err}"),
            },
            Action::TorrentFileSaved(result) => match result {
                Ok(path) => {
                    info!("saved {}", path.display());
                    self.status = format!("Saved {}", path.display());
                }
                Err(err) => self.set_error(err),
            },
        }
        Ok(None)
    }

    /// The torrent the user is looking at: the open detail, else the
    /// highlighted row.
    fn focused_target(&self) -> Option<DeleteTarget> {
        if self.dialog == Dialog::Detail
            && let Some(detail) = &self.detail
        {
            return Some(DeleteTarget {
                hash: detail.torrent.infohash_hex.clone(),
                name: detail.torrent.name.clone(),
            });
        }
        self.selected_torrent().map(|t| DeleteTarget {
            hash: t.infohash_hex.clone(),
            name: t.name.clone(),
        })
    }

    fn focused_hash(&self) -> Option<String> {
        self.focused_target().map(|t| t.hash)
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use tokio::sync::mpsc::{self, UnboundedReceiver};

    use super::*;
    use crate::{
        api::{ApiClient, FileEntry, ListMode, TorrentDetail, TorrentSummary},
        config::Config,
        test_support::FakeServer,
    };

    fn app_for(url: &str) -> (App, UnboundedReceiver<Action>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let client = ApiClient::new(url, Duration::from_secs(2)).unwrap();
        let config = Config {
            page_size: 2,
            download_dir: Some(std::env::temp_dir()),
            ..Config::default()
        };
        (App::new(client, &config, tx), rx)
    }

    fn summary(hash: &str) -> TorrentSummary {
        TorrentSummary {
            infohash_hex: hash.to_string(),
            name: format!("name-{hash}"),
            length: 1,
            seeds: 0,
            leechers: 0,
        }
    }

    fn detail(hash: &str, files: &[&str]) -> TorrentDetail {
        TorrentDetail {
            infohash_hex: hash.to_string(),
            name: format!("name-{hash}"),
            length: 10,
            files: files.iter().map(|p| FileEntry::new(*p, 5)).collect(),
        }
    }

    async fn next_action(rx: &mut UnboundedReceiver<Action>) -> Action {
        tokio::time::timeout(Duration::from_secs(5), rx.recv())
            .await
            .expect("timed out waiting for action")
            .expect("channel closed")
    }

    fn list_body(hashes: &[&str]) -> String {
        let rows: Vec<String> = hashes
            .iter()
            .map(|h| format!(r#"{{"infohashHex":"{h}","name":"n{h}","length":1}}"#))
            .collect();
        format!(r#"{{"torrents":[{}]}}"#, rows.join(","))
    }

    #[tokio::test]
    async fn search_resets_page_and_fetches() {
        let server = FakeServer::start(|_, _| (200, list_body(&["aa", "bb"])));
        let (mut app, mut rx) = app_for(&server.url);
        app.page = 4;

        app.search("  ubuntu ");
        assert_eq!(app.list_mode(), ListMode::Search);
        assert_eq!(app.page(), 0);
        assert_eq!(app.query(), "ubuntu");
        assert!(app.is_loading());

        let action = next_action(&mut rx).await;
        app.dispatch(action).unwrap();
        assert!(!app.is_loading());
        assert_eq!(app.results().len(), 2);
        assert!(app.has_more());
        assert!(app.last_updated().is_some());
        assert_eq!(server.requests(), vec!["GET /query?q=ubuntu&f=0&s=2"]);
    }

    #[tokio::test]
    async fn go_to_page_clamps_below_zero() {
        let server = FakeServer::start(|_, _| (200, list_body(&[])));
        let (mut app, mut rx) = app_for(&server.url);

        app.go_to_page(-3);
        assert_eq!(app.page(), 0);
        app.dispatch(next_action(&mut rx).await).unwrap();

        app.go_to_page(3);
        assert_eq!(app.page(), 3);
        app.dispatch(next_action(&mut rx).await).unwrap();
        assert_eq!(
            server.requests(),
            vec!["GET /all?f=0&s=2", "GET /all?f=6&s=2"]
        );
    }

    #[tokio::test]
    async fn next_page_needs_a_full_page() {
        let server = FakeServer::start(|_, _| (200, list_body(&[])));
        let (mut app, _rx) = app_for(&server.url);
        app.results = vec![summary("aa")];

        app.next_page();
        assert_eq!(app.page(), 0);
        assert_eq!(app.status(), "No more results");
        assert!(!app.is_loading());
    }

    #[tokio::test]
    async fn stale_page_response_is_discarded() {
        let (mut app, _rx) = app_for("http://127.0.0.1:9");
        app.list_seq = 7;
        app.list_loading = true;
        app.results = vec![summary("keep")];

        app.dispatch(Action::PageLoaded {
            seq: 6,
            request: app.page_request(),
            result: Ok(vec![summary("stale")]),
        })
        .unwrap();
        assert_eq!(app.results()[0].infohash_hex, "keep");
        assert!(app.is_loading());
    }

    #[tokio::test]
    async fn stale_detail_response_is_discarded() {
        let (mut app, _rx) = app_for("http://127.0.0.1:9");
        app.detail_seq = 2;
        app.detail_loading = Some("bb".into());

        app.dispatch(Action::DetailLoaded {
            seq: 1,
            hash: "aa".into(),
            result: Ok(Some(detail("aa", &["a.txt"]))),
        })
        .unwrap();
        assert!(app.detail().is_none());
        assert_eq!(app.dialog(), Dialog::None);
        assert!(app.is_loading());
    }

    #[tokio::test]
    async fn detail_arriving_under_confirm_keeps_the_dialog() {
        let (mut app, _rx) = app_for("http://127.0.0.1:9");
        app.results = vec![summary("aa"), summary("bb")];
        app.detail_seq = 1;
        app.detail_loading = Some("aa".into());
        app.selected = 1;

        app.dispatch(Action::ConfirmDeleteOpen).unwrap();
        app.dispatch(Action::ConfirmDeleteSelect(true)).unwrap();
        app.dispatch(Action::DetailLoaded {
            seq: 1,
            hash: "aa".into(),
            result: Ok(Some(detail("aa", &["a.txt"]))),
        })
        .unwrap();
        assert_eq!(app.dialog(), Dialog::ConfirmDelete);
        assert_eq!(app.delete_target().unwrap().hash, "bb");
        assert!(app.delete_choice());
        assert!(!app.detail_behind_confirm());

        app.dispatch(Action::ConfirmDeleteCancel).unwrap();
        assert_eq!(app.dialog(), Dialog::Detail);
        assert_eq!(app.detail().unwrap().torrent.infohash_hex, "aa");
    }

    #[tokio::test]
    async fn detail_arriving_under_help_returns_to_detail() {
        let (mut app, _rx) = app_for("http://127.0.0.1:9");
        app.detail_seq = 1;
        app.dispatch(Action::HelpOpen).unwrap();
        app.dispatch(Action::DetailLoaded {
            seq: 1,
            hash: "aa".into(),
            result: Ok(Some(detail("aa", &["a.txt"]))),
        })
        .unwrap();
        assert_eq!(app.dialog(), Dialog::Help);
        app.dispatch(Action::HelpClose).unwrap();
        assert_eq!(app.dialog(), Dialog::Detail);
    }

    #[tokio::test]
    async fn new_search_resets_selection() {
        let (mut app, _rx) = app_for("http://127.0.0.1:9");
        app.results = vec![summary("aa"), summary("bb")];
        app.selected = 1;
        app.search("other");
        assert_eq!(app.selected_index(), 0);

        app.selected = 1;
        app.browse_all();
        assert_eq!(app.selected_index(), 0);
    }

    #[tokio::test]
    async fn failed_fetch_keeps_results_and_sets_error() {
        let (mut app, mut rx) = app_for("http://127.0.0.1:9");
        app.results = vec![summary("keep")];

        app.refresh();
        app.dispatch(next_action(&mut rx).await).unwrap();
        assert_eq!(app.results().len(), 1);
        assert!(app.last_error().is_some_and(|e| e.starts_with("/all")));
        assert_eq!(app.status(), "Error");

        app.dispatch(Action::ErrorClear).unwrap();
        assert!(app.last_error().is_none());
    }

    #[tokio::test]
    async fn null_list_gives_no_rows() {
        let server = FakeServer::start(|_, _| (200, r#"{"torrents":null}"#.to_string()));
        let (mut app, mut rx) = app_for(&server.url);
        app.results = vec![summary("old")];

        app.browse_all();
        app.dispatch(next_action(&mut rx).await).unwrap();
        assert!(app.results().is_empty());
        assert!(!app.has_more());
        assert_eq!(app.status(), "No results");
    }

    #[tokio::test]
    async fn expansion_survives_reload_of_same_torrent_only() {
        let (mut app, _rx) = app_for("http://127.0.0.1:9");

        app.detail_seq = 1;
        app.dispatch(Action::DetailLoaded {
            seq: 1,
            hash: "aa".into(),
            result: Ok(Some(detail("aa", &["dir/a.txt", "top.txt"]))),
        })
        .unwrap();
        assert_eq!(app.dialog(), Dialog::Detail);
        app.dispatch(Action::TreeToggle).unwrap();
        assert_eq!(app.detail().unwrap().files.rows().len(), 3);

        app.detail_seq = 2;
        app.dispatch(Action::DetailLoaded {
            seq: 2,
            hash: "aa".into(),
            result: Ok(Some(detail("aa", &["dir/a.txt", "top.txt"]))),
        })
        .unwrap();
        assert_eq!(app.detail().unwrap().files.rows().len(), 3);

        app.detail_seq = 3;
        app.dispatch(Action::DetailLoaded {
            seq: 3,
            hash: "bb".into(),
            result: Ok(Some(detail("bb", &["dir/a.txt", "top.txt"]))),
        })
        .unwrap();
        assert_eq!(app.detail().unwrap().files.rows().len(), 2);
        assert!(app.detail().unwrap().files.expansion().is_empty());
    }

    #[tokio::test]
    async fn missing_torrent_is_an_error() {
        let (mut app, _rx) = app_for("http://127.0.0.1:9");
        app.detail_seq = 1;
        app.dispatch(Action::DetailLoaded {
            seq: 1,
            hash: "zz".into(),
            result: Ok(None),
        })
        .unwrap();
        assert_eq!(app.dialog(), Dialog::None);
        assert_eq!(app.last_error(), Some("torrent zz not found"));
    }

    #[tokio::test]
    async fn select_torrent_opens_detail() {
        let server = FakeServer::start(|_, _| {
            (
                200,
                r#"{"torrents":[{"infohashHex":"aa","name":"x","length":3,"files":[{"name":"a/b","length":3}]}]}"#
                    .to_string(),
            )
        });
        let (mut app, mut rx) = app_for(&server.url);
        app.results = vec![summary("aa")];

        app.dispatch(Action::OpenSelected).unwrap();
        assert!(app.is_loading());
        app.dispatch(next_action(&mut rx).await).unwrap();
        assert_eq!(app.dialog(), Dialog::Detail);
        assert_eq!(app.detail().unwrap().files.rows().len(), 1);
        assert_eq!(server.requests(), vec!["GET /torrent?h=aa"]);
    }

    #[tokio::test]
    async fn confirmed_delete_closes_detail_and_refreshes() {
        let server = FakeServer::start(|method, _| match method {
            "DELETE" => (200, String::new()),
            _ => (200, list_body(&[])),
        });
        let (mut app, mut rx) = app_for(&server.url);
        app.detail_seq = 1;
        app.dispatch(Action::DetailLoaded {
            seq: 1,
            hash: "cc".into(),
            result: Ok(Some(detail("cc", &["f"]))),
        })
        .unwrap();

        app.dispatch(Action::ConfirmDeleteOpen).unwrap();
        assert_eq!(app.dialog(), Dialog::ConfirmDelete);
        assert_eq!(app.delete_target().unwrap().hash, "cc");
        app.dispatch(Action::ConfirmDeleteSelect(true)).unwrap();
        app.dispatch(Action::ConfirmDeleteConfirm).unwrap();
        assert_eq!(app.dialog(), Dialog::Detail);

        app.dispatch(next_action(&mut rx).await).unwrap();
        assert!(app.detail().is_none());
        assert_eq!(app.dialog(), Dialog::None);
        assert!(app.is_loading());

        app.dispatch(next_action(&mut rx).await).unwrap();
        assert_eq!(
            server.requests(),
            vec!["DELETE /delete?h=cc", "GET /all?f=0&s=2"]
        );
    }

    #[tokio::test]
    async fn declined_delete_sends_nothing() {
        let server = FakeServer::start(|_, _| (200, String::new()));
        let (mut app, _rx) = app_for(&server.url);
        app.results = vec![summary("aa")];

        app.dispatch(Action::ConfirmDeleteOpen).unwrap();
        app.dispatch(Action::ConfirmDeleteConfirm).unwrap();
        assert_eq!(app.dialog(), Dialog::None);
        assert_eq!(app.status(), "Delete cancelled");
        tokio::time::sleep(Duration::from_millis(100)).await;
        assert!(server.requests().is_empty());
    }

    #[tokio::test]
    async fn count_failure_is_not_shown() {
        let (mut app, _rx) = app_for("http://127.0.0.1:9");
        app.dispatch(Action::CountLoaded(Ok(42))).unwrap();
        app.dispatch(Action::CountLoaded(Err("down".into()))).unwrap();
        assert_eq!(app.total_count(), Some(42));
        assert!(app.last_error().is_none());
    }

    #[tokio::test]
    async fn save_writes_torrent_into_download_dir() {
        let server = FakeServer::start(|_, _| (200, "d4:infoe".to_string()));
        let (mut app, mut rx) = app_for(&server.url);
        let dir = tempfile::tempdir().unwrap();
        app.download_dir = dir.path().to_path_buf();
        app.results = vec![TorrentSummary {
            name: "a/b".into(),
            ..summary("aa")
        }];

        app.dispatch(Action::SaveTorrentFile).unwrap();
        app.dispatch(next_action(&mut rx).await).unwrap();
        let saved = dir.path().join("a_b.torrent");
        assert_eq!(std::fs::read(&saved).unwrap(), b"d4:infoe");
        assert!(app.status().starts_with("Saved "));
    }

    #[tokio::test]
    async fn edit_query_enter_runs_search() {
        let server = FakeServer::start(|_, _| (200, list_body(&[])));
        let (mut app, mut rx) = app_for(&server.url);

        app.dispatch(Action::EditQueryOpen).unwrap();
        assert_eq!(app.mode(), Mode::EditQuery);
        app.dispatch(Action::Paste("deb ian\n".into())).unwrap();
        app.dispatch(Action::InputEnter).unwrap();
        assert_eq!(app.mode(), Mode::Normal);
        assert_eq!(app.query(), "deb ian");
        app.dispatch(next_action(&mut rx).await).unwrap();
        assert_eq!(server.requests(), vec!["GET /query?q=deb+ian&f=0&s=2"]);
    }
}
