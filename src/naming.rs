//! Centralized folder-key convention.
//!
//! Folders (events) are stored under a key derived from the name an admin
//! types. Whitespace runs become a single underscore for storage, and
//! underscores become spaces again for display:
//!
//! - `"Diwali Night 2024"` → `Diwali_Night_2024` (storage key)
//! - `Diwali_Night_2024` → `"Diwali Night 2024"` (display name)
//!
//! A small set of reserved keys names the home-page hero sequence instead of
//! an ordinary folder. They are never listed, counted or deleted as folders.

/// Keys that address the hero sequence rather than an ordinary folder.
pub const HERO_KEYS: [&str; 3] = ["home_slider", "home-slider", "homeSlider"];

/// Key used on the wire when a request targets the hero sequence.
pub const HERO_WIRE_KEY: &str = "home_slider";

/// Whether `key` is one of the reserved hero aliases.
pub fn is_hero_key(key: &str) -> bool {
    HERO_KEYS.contains(&key)
}

/// Derive the storage key for a folder name.
///
/// - `"  Ugadi  Utsav "` → `"Ugadi_Utsav"`
/// - `"Ugadi\tUtsav"` → `"Ugadi_Utsav"`
/// - `"already_keyed"` → `"already_keyed"`
/// - `"   "` → `""`
pub fn storage_key(name: &str) -> String {
    name.split_whitespace().collect::<Vec<_>>().join("_")
}

/// Display name for a storage key: underscores become spaces.
pub fn display_name(key: &str) -> String {
    key.replace('_', " ")
}

/// Case-insensitive substring match of a search query against a folder's
/// display name. The query is trimmed; an empty query matches everything.
pub fn matches_query(key: &str, query: &str) -> bool {
    let needle = query.trim().to_lowercase();
    display_name(key).to_lowercase().contains(&needle)
}

/// Ordering used for folder listings: case-insensitive first, exact second
/// so keys differing only by case still sort deterministically.
pub fn compare_keys(a: &str, b: &str) -> std::cmp::Ordering {
    a.to_lowercase()
        .cmp(&b.to_lowercase())
        .then_with(|| a.cmp(b))
}
