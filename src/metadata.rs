//! Field resolution for media items.
//!
//! The Gallery Service stores items written by several generations of the
//! admin tooling, so the same information can live under different keys.
//! Every consumer picks "the first usable value" from a priority list; this
//! module holds those lists and the two merge rules used with them.
//!
//! ## Renditions
//!
//! An image may carry up to four locators. Which one wins depends on the
//! purpose:
//!
//! | Purpose | Priority |
//! |---------|----------|
//! | Identity (effective URL, hero matching, deletion) | `original` → `optimized` → `thumb` → `url` |
//! | Folder preview tile | `thumb` → `optimized` → `original` → `url` |
//! | Lightbox | `optimized` → `thumb` → `original` → `url` |
//!
//! ## Captions
//!
//! Carousel slides take a name from `title` → `name` → `caption` and a
//! blurb from `about` → `description` → `alt`.
//!
//! ## Merge rules
//!
//! - [`first_present`]: first value that is a non-empty string, *untrimmed*.
//!   A whitespace-only value still wins (and is then rejected by the caller).
//! - [`resolve`]: first value that is non-empty after trimming, trimmed.
//!   Used for display text, where stray whitespace carries no meaning.

use crate::types::MediaItem;

/// Which rendition an image locator is wanted for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rendition {
    Identity,
    Preview,
    Lightbox,
}

impl Rendition {
    /// Candidate locators in priority order.
    pub fn sources(self, item: &MediaItem) -> [Option<&str>; 4] {
        let original = item.original.as_deref();
        let optimized = item.optimized.as_deref();
        let thumb = item.thumb.as_deref();
        let url = item.url.as_deref();
        match self {
            Rendition::Identity => [original, optimized, thumb, url],
            Rendition::Preview => [thumb, optimized, original, url],
            Rendition::Lightbox => [optimized, thumb, original, url],
        }
    }
}

/// First source that is present and non-empty, returned as stored.
pub fn first_present<'a>(sources: &[Option<&'a str>]) -> Option<&'a str> {
    sources.iter().flatten().copied().find(|s| !s.is_empty())
}

/// First source that is non-empty after trimming, returned trimmed.
pub fn resolve(sources: &[Option<&str>]) -> Option<String> {
    sources
        .iter()
        .filter_map(|opt| {
            opt.map(str::trim)
                .filter(|s| !s.is_empty())
                .map(String::from)
        })
        .next()
}

/// Slide name: `title` → `name` → `caption`, defaulting to empty.
pub fn slide_name(item: &MediaItem) -> String {
    resolve(&[
        item.title.as_deref(),
        item.name.as_deref(),
        item.caption.as_deref(),
    ])
    .unwrap_or_default()
}

/// Slide blurb: `about` → `description` → `alt`, defaulting to empty.
pub fn slide_about(item: &MediaItem) -> String {
    resolve(&[
        item.about.as_deref(),
        item.description.as_deref(),
        item.alt.as_deref(),
    ])
    .unwrap_or_default()
}
