//! Playlist (HLS manifest) detection and rewriting.
//!
//! Every URI line of a manifest is pointed back at the relay so that the
//! player fetches segments and keys through it too. Tags and comments
//! (`#...`) are left alone, including URIs embedded in tag attributes.

use url::Url;

/// Content type forced on rewritten playlists.
pub const PLAYLIST_CONTENT_TYPE: &str = "application/vnd.apple.mpegurl; charset=utf-8";

const PLAYLIST_MEDIA_TOKEN: &str = "mpegurl";
const PLAYLIST_EXTENSION: &str = ".m3u8";

/// Whether an upstream answer should be treated as a playlist.
///
/// Matches any `*mpegurl` media type (`application/vnd.apple.mpegurl`,
/// `audio/x-mpegurl`, ...) or, failing that, a target whose path ends in
/// `.m3u8` once the query string is removed.
pub fn is_playlist(content_type: &str, target: &str) -> bool {
    if content_type.to_ascii_lowercase().contains(PLAYLIST_MEDIA_TOKEN) {
        return true;
    }
    let without_query = target.split('?').next().unwrap_or(target);
    without_query.ends_with(PLAYLIST_EXTENSION)
}

/// Rewrite a manifest so each URI line routes through `relay_path`.
///
/// Input lines may end in `\n` or `\r\n`; output is joined with `\n`.
pub fn rewrite(text: &str, base: &Url, relay_path: &str) -> String {
    let mut lines: Vec<&str> = text.split('\n').collect();
    let last = lines.len() - 1;
    for line in &mut lines[..last] {
        *line = line.strip_suffix('\r').unwrap_or(line);
    }

    let rewritten: Vec<String> = lines
        .into_iter()
        .map(|line| rewrite_line(line, base, relay_path))
        .collect();
    rewritten.join("\n")
}

fn rewrite_line(line: &str, base: &Url, relay_path: &str) -> String {
    if line.is_empty() || line.starts_with('#') {
        return line.to_string();
    }
    match base.join(line) {
        Ok(absolute) => relay_reference(relay_path, &absolute),
        Err(e) => {
            tracing::debug!(line = %line, error = %e, "Leaving unresolvable playlist line as-is");
            line.to_string()
        }
    }
}

/// `<relay_path>?url=<percent-encoded absolute URL>`
pub fn relay_reference(relay_path: &str, absolute: &Url) -> String {
    format!("{}?url={}", relay_path, urlencoding::encode(absolute.as_str()))
}
