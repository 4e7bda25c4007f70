//! YouTube link handling.
//!
//! Video folders store whatever link the admin pasted. Rendering needs the
//! bare video id, so every consumer goes through [`parse_youtube_id`]:
//!
//! 1. Parse as a URL. On a `youtube.com` host the id is the `v` query
//!    parameter, or the segment after `/embed/`. On `youtu.be` it is the
//!    first path segment.
//! 2. If the string is not a parseable URL (no scheme, stray spaces), scan it
//!    for `v=`, `youtu.be/` or `/embed/` followed by an id.
//!
//! An id is at least six characters of `[A-Za-z0-9_-]`. Anything else yields
//! `None`; none of these functions panic on malformed input.

use regex::Regex;
use reqwest::Url;
use std::sync::LazyLock;

static FALLBACK_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?:v=|youtu\.be/|/embed/)([A-Za-z0-9_-]{6,})").expect("static pattern")
});

static ID_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z0-9_-]{6,}$").expect("static pattern"));

/// Extract the video id from a YouTube link.
pub fn parse_youtube_id(url: &str) -> Option<String> {
    let url = url.trim();
    match Url::parse(url) {
        Ok(parsed) => id_from_url(&parsed),
        Err(_) => FALLBACK_PATTERN
            .captures(url)
            .and_then(|caps| caps.get(1))
            .map(|m| m.as_str().to_string()),
    }
}

fn id_from_url(url: &Url) -> Option<String> {
    let host = url.host_str()?;
    let candidate = if host.contains("youtube.com") {
        url.query_pairs()
            .find(|(key, _)| key == "v")
            .map(|(_, value)| value.into_owned())
            .or_else(|| {
                let mut segments = url.path_segments()?;
                match segments.next() {
                    Some("embed") => segments.next().map(String::from),
                    _ => None,
                }
            })
    } else if host.contains("youtu.be") {
        url.path_segments()
            .and_then(|mut segments| segments.next())
            .map(String::from)
    } else {
        None
    }?;
    ID_PATTERN.is_match(&candidate).then_some(candidate)
}

/// Player URL for embedding, or `None` if no id is recoverable.
pub fn embed_url(url: &str) -> Option<String> {
    parse_youtube_id(url).map(|id| format!("https://www.youtube.com/embed/{id}"))
}

/// High-quality poster frame, or `None` if no id is recoverable.
pub fn thumbnail_url(url: &str) -> Option<String> {
    parse_youtube_id(url).map(|id| format!("https://img.youtube.com/vi/{id}/hqdefault.jpg"))
}
