/// `magnet:` URI for `info_hash`, announcing to each tracker in order.
pub fn magnet_link(info_hash: &str, trackers: &[String]) -> String {
    let mut link = format!("magnet:?xt=urn:btih:{info_hash}");
    for tracker in trackers {
        link.push_str("&tr=");
        link.push_str(&urlencoding::encode(tracker));
    }
    link
}

/// File name for a saved `.torrent`, with characters that are not valid
/// in file names replaced by `_`.
pub fn torrent_file_name(name: &str) -> String {
    let mut out: String = name
        .trim()
        .chars()
        .map(|ch| match ch {
            '/' | '\\' | ':' | '*' | '?' | '"' | '<' | '>' | '|' => '_',
            c if c.is_control() => '_',
            c => c,
        })
        .collect();
    if out.is_empty() {
        out.push_str("download");
    }
    out.push_str(".torrent");
    out
}

pub fn cursor_to_byte_index(s: &str, cursor: usize) -> usize {
    s.char_indices()
        .nth(cursor)
        .map(|(idx, _)| idx)
        .unwrap_or(s.len())
}
