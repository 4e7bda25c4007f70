//! Shared types used across the view model, the service client and the
//! admin workflow.
//!
//! `MediaItem` and `GalleryState` mirror what the Gallery Service stores.
//! Decoding from the service's loosely-shaped JSON lives in
//! [`response`](crate::response); these types serialize in a tidy form for
//! `event-gal list --json`.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

/// What a media item points at.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum MediaKind {
    #[default]
    Image,
    YoutubeLink,
}

/// A single photo or video reference.
///
/// Images may carry several renditions; the one used for identity and
/// display is the item's effective URL (see
/// [`view::effective_url`](crate::view::effective_url)).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MediaItem {
    pub kind: MediaKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub original: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub optimized: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub thumb: Option<String>,
    /// Upload provider identifier, used for later deletion (images only).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub public_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub caption: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub about: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alt: Option<String>,
}

impl MediaItem {
    /// An image item addressed by a single URL.
    pub fn image(url: impl Into<String>) -> Self {
        Self {
            kind: MediaKind::Image,
            url: Some(url.into()),
            ..Self::default()
        }
    }

    /// A YouTube link item.
    pub fn youtube(url: impl Into<String>) -> Self {
        Self {
            kind: MediaKind::YoutubeLink,
            url: Some(url.into()),
            ..Self::default()
        }
    }

    pub fn is_video(&self) -> bool {
        self.kind == MediaKind::YoutubeLink
    }
}

/// Classification of a folder, decided by its first item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FolderKind {
    Video,
    Photo,
    Empty,
}

impl std::fmt::Display for FolderKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            FolderKind::Video => "video",
            FolderKind::Photo => "photo",
            FolderKind::Empty => "empty",
        };
        f.write_str(label)
    }
}

/// The whole gallery as last confirmed by the Gallery Service.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GalleryState {
    /// Ordinary folders by storage key.
    pub folders: BTreeMap<String, Vec<MediaItem>>,
    /// Home-page hero sequence.
    pub hero: Vec<MediaItem>,
}

impl GalleryState {
    pub fn folder(&self, key: &str) -> Option<&[MediaItem]> {
        self.folders.get(key).map(Vec::as_slice)
    }
}

/// One carousel entry, ready to render.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HeroSlide {
    pub src: String,
    pub name: String,
    pub about: String,
}

/// Descriptor returned by the Media Upload Service for a stored asset.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredAsset {
    pub url: String,
    pub public_id: String,
}

/// A file queued for upload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadFile {
    /// File name as the admin picked it; used for the extension check.
    pub file_name: String,
    /// MIME type when known. Files with a non-`image/` type are rejected.
    pub content_type: Option<String>,
    pub data: Vec<u8>,
}

impl UploadFile {
    pub fn new(file_name: impl Into<String>, content_type: Option<&str>, data: Vec<u8>) -> Self {
        Self {
            file_name: file_name.into(),
            content_type: content_type.map(String::from),
            data,
        }
    }

    /// Read a file from disk, guessing its MIME type from the extension.
    pub fn from_path(path: &Path) -> std::io::Result<Self> {
        let data = std::fs::read(path)?;
        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        let content_type = guess_content_type(&file_name).map(String::from);
        Ok(Self {
            file_name,
            content_type,
            data,
        })
    }
}

/// MIME type for common image extensions. Unknown extensions yield `None`,
/// leaving the decision to the extension allow-list.
pub fn guess_content_type(file_name: &str) -> Option<&'static str> {
    let ext = Path::new(file_name)
        .extension()?
        .to_string_lossy()
        .to_lowercase();
    match ext.as_str() {
        "jpg" | "jpeg" => Some("image/jpeg"),
        "png" => Some("image/png"),
        "webp" => Some("image/webp"),
        "gif" => Some("image/gif"),
        "avif" => Some("image/avif"),
        "mp4" => Some("video/mp4"),
        "pdf" => Some("application/pdf"),
        "txt" => Some("text/plain"),
        _ => None,
    }
}
