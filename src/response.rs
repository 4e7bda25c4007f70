//! Decoding of Gallery Service responses.
//!
//! The service has changed shape over time and different endpoints answer
//! with slightly different envelopes, so decoding accepts all of them:
//!
//! ```text
//! { "gallery": { "Event_A": [...] }, "slider": [...] }      current
//! { "gallery": { "gallery": {...} }, "home_slider": [...] } nested, old alias
//! { "Event_A": [...], "homeSlider": [...] }                 bare map
//! ```
//!
//! - Hero array: `slider`, else `home_slider`, else `homeSlider`, else empty.
//! - Folder map: `gallery` (unwrapped once more if it has its own `gallery`
//!   key); without a `gallery` key the body itself is the map, minus the
//!   slider keys.
//! - Folder values that are not arrays are skipped.
//! - Items: a bare string is an image URL; an object is read field by field,
//!   ignoring non-string values; anything else is dropped.
//!
//! Decoding never fails. A body that is not an object decodes to an empty
//! gallery. Invalid-but-representable items (objects without any locator)
//! are kept so the admin view mirrors what is stored; the
//! [`view`](crate::view) layer decides what is displayable.

use crate::types::{GalleryState, MediaItem, MediaKind};
use serde_json::{Map, Value};
use std::collections::BTreeMap;

/// Top-level keys that may carry the hero array, in priority order.
const SLIDER_KEYS: [&str; 3] = ["slider", "home_slider", "homeSlider"];

/// Decode a Gallery Service body into a [`GalleryState`].
pub fn decode(body: &Value) -> GalleryState {
    let Some(root) = body.as_object() else {
        return GalleryState::default();
    };

    let hero = SLIDER_KEYS
        .iter()
        .find_map(|key| root.get(*key).filter(|v| !v.is_null()))
        .and_then(Value::as_array)
        .map(|items| decode_items(items))
        .unwrap_or_default();

    let folders = match root.get("gallery") {
        Some(gallery) => {
            let inner = gallery.get("gallery").unwrap_or(gallery);
            inner.as_object().map(decode_folders).unwrap_or_default()
        }
        None => {
            let mut bare = root.clone();
            for key in SLIDER_KEYS {
                bare.remove(key);
            }
            decode_folders(&bare)
        }
    };

    GalleryState { folders, hero }
}

/// Error message carried by a `{ "error": "..." }` body, if any.
pub fn error_message(body: &Value) -> Option<String> {
    body.get("error")
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(String::from)
}

fn decode_folders(map: &Map<String, Value>) -> BTreeMap<String, Vec<MediaItem>> {
    map.iter()
        .filter_map(|(key, value)| {
            value
                .as_array()
                .map(|items| (key.clone(), decode_items(items)))
        })
        .collect()
}

fn decode_items(items: &[Value]) -> Vec<MediaItem> {
    items.iter().filter_map(decode_item).collect()
}

/// Decode one stored item.
pub fn decode_item(value: &Value) -> Option<MediaItem> {
    match value {
        Value::String(url) => Some(MediaItem::image(url.clone())),
        Value::Object(obj) => {
            let field = |key: &str| obj.get(key).and_then(Value::as_str).map(String::from);
            let is_video = obj.get("youtube").and_then(Value::as_bool) == Some(true)
                || obj.get("kind").and_then(Value::as_str) == Some("youtubeLink");
            Some(MediaItem {
                kind: if is_video {
                    MediaKind::YoutubeLink
                } else {
                    MediaKind::Image
                },
                url: field("url"),
                original: field("original"),
                optimized: field("optimized"),
                thumb: field("thumb"),
                public_id: field("public_id").or_else(|| field("publicId")),
                title: field("title"),
                name: field("name"),
                caption: field("caption"),
                about: field("about"),
                description: field("description"),
                alt: field("alt"),
            })
        }
        _ => None,
    }
}
