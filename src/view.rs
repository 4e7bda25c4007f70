//! Gallery view model.
//!
//! Pure functions from a [`GalleryState`] to display-ready structures. No I/O,
//! no mutation of input; the same state always derives the same view.
//!
//! # Hero / folder disjointness
//!
//! The Gallery Service does not stop an image from being registered both in
//! the hero sequence and in an event folder. Every view hides such an image
//! from the folder: [`partition_against_hero`] drops any folder item whose
//! effective URL also appears in the hero sequence, and folder counts are
//! taken *after* that filter.
//!
//! # Folder classification
//!
//! [`classify_folder`] looks at the first item only. A folder whose first
//! item is a YouTube link is a video folder no matter what follows. This
//! matches how the stored data has always been read; folders whose later
//! items disagree are reported by [`folder_inconsistencies`] rather than
//! reclassified.

use crate::metadata::{self, Rendition};
use crate::naming;
use crate::types::{FolderKind, GalleryState, HeroSlide, MediaItem};
use crate::youtube;
use serde::Serialize;
use serde_json::Value;
use std::collections::HashSet;

/// The item's identity locator: first non-empty of `original`, `optimized`,
/// `thumb`, `url`. `None` when absent or whitespace-only.
pub fn effective_url(item: &MediaItem) -> Option<&str> {
    metadata::first_present(&Rendition::Identity.sources(item)).filter(|s| !s.trim().is_empty())
}

/// [`effective_url`] for a raw JSON value: a string is its own locator, an
/// object is read like a stored item, anything else has none.
pub fn effective_url_value(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()).filter(|s| !s.trim().is_empty()),
        Value::Object(_) => {
            let item = crate::response::decode_item(value)?;
            effective_url(&item).map(String::from)
        }
        _ => None,
    }
}

/// Classify a folder by its first item.
pub fn classify_folder(items: &[MediaItem]) -> FolderKind {
    match items.first() {
        None => FolderKind::Empty,
        Some(first) if first.is_video() => FolderKind::Video,
        Some(_) => FolderKind::Photo,
    }
}

/// Effective URLs of the hero sequence.
pub fn hero_url_set(hero: &[MediaItem]) -> HashSet<&str> {
    hero.iter().filter_map(effective_url).collect()
}

/// Folder items whose effective URL is not in the hero sequence, in order.
pub fn partition_against_hero<'a>(
    folder: &'a [MediaItem],
    hero: &[MediaItem],
) -> Vec<&'a MediaItem> {
    let hero_urls = hero_url_set(hero);
    folder
        .iter()
        .filter(|item| effective_url(item).is_none_or(|url| !hero_urls.contains(url)))
        .collect()
}

/// Number of items a folder shows once hero images are hidden.
pub fn visible_count(folder: &[MediaItem], hero: &[MediaItem]) -> usize {
    partition_against_hero(folder, hero).len()
}

/// Carousel entry for a hero item; `None` drops the entry silently.
pub fn normalize_hero_item(item: &MediaItem) -> Option<HeroSlide> {
    let src = effective_url(item)?;
    Some(HeroSlide {
        src: src.to_string(),
        name: metadata::slide_name(item),
        about: metadata::slide_about(item),
    })
}

/// The renderable hero sequence.
pub fn hero_slides(state: &GalleryState) -> Vec<HeroSlide> {
    state.hero.iter().filter_map(normalize_hero_item).collect()
}

/// Whether an item can be shown at all. Video links need a non-blank
/// `url`; images need an effective URL.
pub fn is_displayable(item: &MediaItem) -> bool {
    if item.is_video() {
        item.url.as_deref().is_some_and(|u| !u.trim().is_empty())
    } else {
        effective_url(item).is_some()
    }
}

/// Folder tile image: the first non-hero image item, thumbnail preferred.
pub fn preview_src<'a>(items: &[&'a MediaItem], hero: &HashSet<&str>) -> Option<&'a str> {
    items.iter().copied().find_map(|item| {
        if effective_url(item).is_some_and(|u| hero.contains(u)) || item.is_video() {
            return None;
        }
        metadata::first_present(&Rendition::Preview.sources(item)).filter(|s| !s.trim().is_empty())
    })
}

/// Full-size source for the lightbox.
pub fn lightbox_src(item: &MediaItem) -> Option<&str> {
    metadata::first_present(&Rendition::Lightbox.sources(item)).filter(|s| !s.trim().is_empty())
}

/// Keys of folders whose items do not all share the first item's kind.
pub fn folder_inconsistencies(state: &GalleryState) -> Vec<&str> {
    state
        .folders
        .iter()
        .filter(|(key, _)| !naming::is_hero_key(key))
        .filter(|(_, items)| match items.split_first() {
            Some((first, rest)) => rest.iter().any(|i| i.is_video() != first.is_video()),
            None => false,
        })
        .map(|(key, _)| key.as_str())
        .collect()
}

/// One row of the admin folder listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FolderSummary {
    pub key: String,
    pub display_name: String,
    pub kind: FolderKind,
    /// Item count after hiding hero images.
    pub count: usize,
}

/// Admin listing: every non-hero folder, sorted, empty folders included.
pub fn admin_folders(state: &GalleryState) -> Vec<FolderSummary> {
    let mut rows: Vec<FolderSummary> = state
        .folders
        .iter()
        .filter(|(key, _)| !naming::is_hero_key(key))
        .map(|(key, items)| FolderSummary {
            key: key.clone(),
            display_name: naming::display_name(key),
            kind: classify_folder(items),
            count: visible_count(items, &state.hero),
        })
        .collect();
    rows.sort_by(|a, b| naming::compare_keys(&a.key, &b.key));
    rows
}

/// A folder as the public gallery shows it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FolderView {
    pub key: String,
    pub display_name: String,
    pub kind: FolderKind,
    /// Displayable, hero-filtered items.
    pub items: Vec<MediaItem>,
    pub preview: Option<String>,
    /// Player URLs for video folders; empty for photo folders.
    pub embeds: Vec<String>,
}

impl FolderView {
    pub fn count(&self) -> usize {
        self.items.len()
    }
}

/// Everything the public gallery and home pages render.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct GalleryView {
    pub hero: Vec<HeroSlide>,
    pub photo_folders: Vec<FolderView>,
    pub video_folders: Vec<FolderView>,
}

impl GalleryView {
    /// Derive the public view.
    ///
    /// Invalid items are dropped, hero images are hidden from folders,
    /// folders left empty disappear, and the rest are sorted by key and
    /// split by classification.
    pub fn build(state: &GalleryState) -> Self {
        let hero_urls = hero_url_set(&state.hero);
        let mut keys: Vec<&String> = state
            .folders
            .keys()
            .filter(|k| !naming::is_hero_key(k))
            .collect();
        keys.sort_by(|a, b| naming::compare_keys(a, b));

        let mut photo_folders = Vec::new();
        let mut video_folders = Vec::new();
        for key in keys {
            let displayable: Vec<MediaItem> = state.folders[key]
                .iter()
                .filter(|item| is_displayable(item))
                .cloned()
                .collect();
            let items: Vec<MediaItem> = partition_against_hero(&displayable, &state.hero)
                .into_iter()
                .cloned()
                .collect();
            if items.is_empty() {
                continue;
            }
            let kind = classify_folder(&state.folders[key]);
            let refs: Vec<&MediaItem> = items.iter().collect();
            let preview = preview_src(&refs, &hero_urls).map(String::from);
            let embeds = if kind == FolderKind::Video {
                items
                    .iter()
                    .filter_map(|item| item.url.as_deref().and_then(youtube::embed_url))
                    .collect()
            } else {
                Vec::new()
            };
            let folder = FolderView {
                key: key.clone(),
                display_name: naming::display_name(key),
                kind,
                items,
                preview,
                embeds,
            };
            match kind {
                FolderKind::Video => video_folders.push(folder),
                _ => photo_folders.push(folder),
            }
        }

        Self {
            hero: hero_slides(state),
            photo_folders,
            video_folders,
        }
    }

    /// Folders whose display name contains the query, keeping the split.
    pub fn search(&self, query: &str) -> GalleryView {
        let keep = |folders: &[FolderView]| {
            folders
                .iter()
                .filter(|f| naming::matches_query(&f.key, query))
                .cloned()
                .collect()
        };
        GalleryView {
            hero: self.hero.clone(),
            photo_folders: keep(&self.photo_folders),
            video_folders: keep(&self.video_folders),
        }
    }

    pub fn folder(&self, key: &str) -> Option<&FolderView> {
        self.photo_folders
            .iter()
            .chain(&self.video_folders)
            .find(|f| f.key == key)
    }
}

/// Position in an auto-advancing hero carousel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Carousel {
    len: usize,
    index: usize,
}

impl Carousel {
    pub fn new(len: usize) -> Self {
        Self { len, index: 0 }
    }

    pub fn index(&self) -> usize {
        self.index
    }

    /// A single slide (or none) never rotates.
    pub fn auto_advances(&self) -> bool {
        self.len > 1
    }

    pub fn advance(&mut self) -> usize {
        if self.len > 0 {
            self.index = (self.index + 1) % self.len;
        }
        self.index
    }

    pub fn retreat(&mut self) -> usize {
        if self.len > 0 {
            self.index = (self.index + self.len - 1) % self.len;
        }
        self.index
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::response::decode;
    use crate::test_helpers::*;
    use serde_json::json;

    // =========================================================================
    // effective_url
    // =========================================================================

    #[test]
    fn effective_url_precedence() {
        let mut item = MediaItem {
            original: Some("O".into()),
            optimized: Some("P".into()),
            thumb: Some("T".into()),
            url: Some("U".into()),
            ..MediaItem::default()
        };
        assert_eq!(effective_url(&item), Some("O"));
        item.original = None;
        assert_eq!(effective_url(&item), Some("P"));
        item.optimized = Some(String::new());
        assert_eq!(effective_url(&item), Some("T"));
        item.thumb = None;
        assert_eq!(effective_url(&item), Some("U"));
        item.url = None;
        assert_eq!(effective_url(&item), None);
    }

    #[test]
    fn effective_url_whitespace_is_none() {
        let item = MediaItem {
            original: Some("   ".into()),
            url: Some("U".into()),
            ..MediaItem::default()
        };
        assert_eq!(effective_url(&item), None);
    }

    #[test]
    fn effective_url_of_raw_values() {
        assert_eq!(effective_url_value(&json!("A")).as_deref(), Some("A"));
        assert_eq!(effective_url_value(&json!("  ")), None);
        assert_eq!(effective_url_value(&json!("")), None);
        assert_eq!(effective_url_value(&Value::Null), None);
        assert_eq!(effective_url_value(&json!(12)), None);
        assert_eq!(
            effective_url_value(&json!({"thumb": "T", "url": "U"})).as_deref(),
            Some("T")
        );
        assert_eq!(effective_url_value(&json!({"title": "no locator"})), None);
    }

    // =========================================================================
    // classify_folder
    // =========================================================================

    #[test]
    fn classification_reads_first_item_only() {
        let items = vec![MediaItem::youtube("https://youtu.be/abc123XYZ"), MediaItem::image("A")];
        assert_eq!(classify_folder(&items), FolderKind::Video);

        let items = vec![MediaItem::image("A"), MediaItem::youtube("https://youtu.be/abc123XYZ")];
        assert_eq!(classify_folder(&items), FolderKind::Photo);
    }

    #[test]
    fn empty_folder_classification() {
        assert_eq!(classify_folder(&[]), FolderKind::Empty);
    }

    // =========================================================================
    // partition_against_hero
    // =========================================================================

    #[test]
    fn hero_urls_hidden_from_folder() {
        let hero = vec![MediaItem::image("A")];
        let folder = vec![MediaItem::image("A"), MediaItem::image("B")];
        let filtered = partition_against_hero(&folder, &hero);
        assert_eq!(filtered, vec![&MediaItem::image("B")]);
    }

    #[test]
    fn hero_match_uses_effective_url() {
        let hero = vec![MediaItem {
            original: Some("full.jpg".into()),
            url: Some("other.jpg".into()),
            ..MediaItem::default()
        }];
        let folder = vec![
            MediaItem {
                original: Some("full.jpg".into()),
                ..MediaItem::default()
            },
            MediaItem::image("other.jpg"),
        ];
        let filtered = partition_against_hero(&folder, &hero);
        assert_eq!(filtered.len(), 1);
        assert_eq!(filtered[0].url.as_deref(), Some("other.jpg"));
    }

    #[test]
    fn partition_preserves_order() {
        let hero = vec![MediaItem::image("B")];
        let folder = images(&["A", "B", "C", "D"]);
        let urls: Vec<_> = partition_against_hero(&folder, &hero)
            .into_iter()
            .filter_map(effective_url)
            .collect();
        assert_eq!(urls, vec!["A", "C", "D"]);
    }

    #[test]
    fn disjointness_holds_for_every_folder() {
        let state = decode(&json!({
            "gallery": {
                "X": ["A", "B", {"original": "C"}],
                "Y": ["C", "D"],
                "Z": ["A"]
            },
            "slider": ["A", {"thumb": "C"}]
        }));
        let hero = hero_url_set(&state.hero);
        for items in state.folders.values() {
            for item in partition_against_hero(items, &state.hero) {
                assert!(!hero.contains(effective_url(item).unwrap()));
            }
        }
    }

    #[test]
    fn counts_use_filtered_length() {
        let hero = vec![MediaItem::image("A")];
        let folder = images(&["A", "B", "C"]);
        assert_eq!(visible_count(&folder, &hero), 2);
    }

    // =========================================================================
    // normalize_hero_item / hero_slides
    // =========================================================================

    #[test]
    fn hero_item_normalized() {
        let item = MediaItem {
            optimized: Some("opt.jpg".into()),
            caption: Some("Opening dance".into()),
            description: Some("Performed at the temple".into()),
            ..MediaItem::default()
        };
        assert_eq!(
            normalize_hero_item(&item),
            Some(HeroSlide {
                src: "opt.jpg".into(),
                name: "Opening dance".into(),
                about: "Performed at the temple".into(),
            })
        );
    }

    #[test]
    fn invalid_hero_items_dropped_silently() {
        let state = decode(&json!({
            "gallery": {},
            "slider": ["A", {"title": "no image"}, "  ", {"thumb": "T"}]
        }));
        let srcs: Vec<String> = hero_slides(&state).into_iter().map(|s| s.src).collect();
        assert_eq!(srcs, vec!["A", "T"]);
    }

    // =========================================================================
    // GalleryView
    // =========================================================================

    fn sample_state() -> GalleryState {
        decode(&json!({
            "gallery": {
                "Temple_Festival": [
                    {"url": "hero.jpg"},
                    {"url": "t1.jpg", "thumb": "t1-thumb.jpg"},
                    {"title": "broken"}
                ],
                "Videos": [
                    {"url": "https://youtu.be/abc123XYZ", "youtube": true},
                    {"url": "  ", "youtube": true}
                ],
                "annual_day": ["a1.jpg"],
                "OnlyHero": ["hero.jpg"],
                "Empty": [],
                "home_slider": ["stray.jpg"]
            },
            "slider": ["hero.jpg"]
        }))
    }

    #[test]
    fn view_splits_and_sorts_folders() {
        let view = GalleryView::build(&sample_state());
        let photo: Vec<&str> = view.photo_folders.iter().map(|f| f.key.as_str()).collect();
        let video: Vec<&str> = view.video_folders.iter().map(|f| f.key.as_str()).collect();
        assert_eq!(photo, vec!["annual_day", "Temple_Festival"]);
        assert_eq!(video, vec!["Videos"]);
    }

    #[test]
    fn view_drops_invalid_hero_and_empty() {
        let view = GalleryView::build(&sample_state());
        let temple = view.folder("Temple_Festival").unwrap();
        assert_eq!(temple.count(), 1);
        assert_eq!(temple.display_name, "Temple Festival");
        assert_eq!(temple.preview.as_deref(), Some("t1-thumb.jpg"));
        assert!(view.folder("OnlyHero").is_none());
        assert!(view.folder("Empty").is_none());
        assert!(view.folder("home_slider").is_none());
    }

    #[test]
    fn video_folder_has_embeds() {
        let view = GalleryView::build(&sample_state());
        let videos = view.folder("Videos").unwrap();
        assert_eq!(videos.count(), 1);
        assert_eq!(videos.embeds, vec!["https://www.youtube.com/embed/abc123XYZ"]);
        assert_eq!(videos.preview, None);
    }

    #[test]
    fn kind_follows_first_stored_item_even_when_hidden() {
        let state = decode(&json!({
            "gallery": {
                "Mixed": [
                    {"url": "hero.jpg"},
                    {"url": "https://youtu.be/abc123XYZ", "youtube": true}
                ]
            },
            "slider": ["hero.jpg"]
        }));
        let view = GalleryView::build(&state);
        assert!(view.video_folders.is_empty());
        let mixed = view.folder("Mixed").unwrap();
        assert_eq!(mixed.kind, FolderKind::Photo);
        assert_eq!(mixed.kind, admin_folders(&state)[0].kind);
        assert!(mixed.embeds.is_empty());
    }

    #[test]
    fn search_filters_by_display_name() {
        let view = GalleryView::build(&sample_state()).search("temple fest");
        assert_eq!(view.photo_folders.len(), 1);
        assert!(view.video_folders.is_empty());
        assert_eq!(view.hero.len(), 1);
    }

    #[test]
    fn building_twice_is_identical() {
        let body = json!({
            "gallery": {"A": ["1", "2"], "B": [{"url": "https://youtu.be/abc123XYZ", "youtube": true}]},
            "slider": ["1"]
        });
        let first = decode(&body);
        let second = decode(&body);
        assert_eq!(first, second);
        assert_eq!(GalleryView::build(&first), GalleryView::build(&second));
    }

    // =========================================================================
    // preview / lightbox
    // =========================================================================

    #[test]
    fn preview_skips_hero_and_video_items() {
        let items = vec![
            MediaItem::image("hero.jpg"),
            MediaItem::youtube("https://youtu.be/abc123XYZ"),
            MediaItem::image("second.jpg"),
        ];
        let refs: Vec<&MediaItem> = items.iter().collect();
        let hero: HashSet<&str> = ["hero.jpg"].into_iter().collect();
        assert_eq!(preview_src(&refs, &hero), Some("second.jpg"));
    }

    #[test]
    fn lightbox_prefers_optimized() {
        let item = MediaItem {
            original: Some("O".into()),
            optimized: Some("P".into()),
            ..MediaItem::default()
        };
        assert_eq!(lightbox_src(&item), Some("P"));
    }

    // =========================================================================
    // admin listing / inconsistencies
    // =========================================================================

    #[test]
    fn admin_folders_include_empty_and_skip_hero_keys() {
        let rows = admin_folders(&sample_state());
        let keys: Vec<&str> = rows.iter().map(|r| r.key.as_str()).collect();
        assert_eq!(
            keys,
            vec!["annual_day", "Empty", "OnlyHero", "Temple_Festival", "Videos"]
        );
        let only_hero = rows.iter().find(|r| r.key == "OnlyHero").unwrap();
        assert_eq!(only_hero.count, 0);
        assert_eq!(only_hero.kind, FolderKind::Photo);
        let empty = rows.iter().find(|r| r.key == "Empty").unwrap();
        assert_eq!(empty.kind, FolderKind::Empty);
    }

    #[test]
    fn inconsistencies_reported_not_coerced() {
        let state = decode(&json!({
            "gallery": {
                "Mixed": [{"url": "https://youtu.be/abc123XYZ", "youtube": true}, "img.jpg"],
                "Clean": ["a.jpg", "b.jpg"]
            }
        }));
        assert_eq!(folder_inconsistencies(&state), vec!["Mixed"]);
        assert_eq!(classify_folder(state.folder("Mixed").unwrap()), FolderKind::Video);
    }

    // =========================================================================
    // Carousel
    // =========================================================================

    #[test]
    fn carousel_wraps_both_ways() {
        let mut c = Carousel::new(3);
        assert!(c.auto_advances());
        assert_eq!(c.advance(), 1);
        assert_eq!(c.advance(), 2);
        assert_eq!(c.advance(), 0);
        assert_eq!(c.retreat(), 2);
    }

    #[test]
    fn carousel_single_or_empty_is_static() {
        let mut single = Carousel::new(1);
        assert!(!single.auto_advances());
        assert_eq!(single.advance(), 0);

        let mut empty = Carousel::new(0);
        assert_eq!(empty.advance(), 0);
        assert_eq!(empty.retreat(), 0);
        assert_eq!(empty.index(), 0);
    }
}
