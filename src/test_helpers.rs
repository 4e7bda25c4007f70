//! Shared test utilities for the event-gal test suite.
//!
//! Provides fixture builders for gallery state plus in-memory stand-ins for
//! the two collaborators, so admin workflow tests run without a network.
//!
//! # Usage
//!
//! ```rust
//! use crate::test_helpers::*;
//!
//! let state = gallery(&[("Ugadi", images(&["a.jpg"]))], images(&["hero.jpg"]));
//! let service = FakeService::new(state);
//! service.reject_when(|r| matches!(r, GalleryRequest::Register { .. }), "Database unavailable");
//!
//! let uploader = FakeUploader::default();
//! uploader.fail_upload_at(1);
//! ```

use std::cell::{Cell, RefCell};

use crate::naming;
use crate::service::{GalleryRequest, GalleryService, ServiceError};
use crate::types::{GalleryState, MediaItem, StoredAsset, UploadFile};
use crate::upload::{MediaUploader, UploadError};
use crate::view::effective_url;
use crate::youtube;

// =========================================================================
// Fixture builders
// =========================================================================

/// Image items with the given URLs.
pub fn images(urls: &[&str]) -> Vec<MediaItem> {
    urls.iter().map(|u| MediaItem::image(*u)).collect()
}

/// Video link items with the given URLs.
pub fn videos(urls: &[&str]) -> Vec<MediaItem> {
    urls.iter().map(|u| MediaItem::youtube(*u)).collect()
}

/// Gallery state from `(key, items)` pairs and a hero sequence.
pub fn gallery(folders: &[(&str, Vec<MediaItem>)], hero: Vec<MediaItem>) -> GalleryState {
    GalleryState {
        folders: folders
            .iter()
            .map(|(key, items)| (key.to_string(), items.clone()))
            .collect(),
        hero,
    }
}

/// A small JPEG-named upload.
pub fn jpg(name: &str) -> UploadFile {
    UploadFile::new(name, Some("image/jpeg"), vec![0xFF, 0xD8, 0xFF])
}

// =========================================================================
// Gallery Service
// =========================================================================

type Rule = (Box<dyn Fn(&GalleryRequest) -> bool>, String);

/// In-memory Gallery Service applying mutations the way the real one does.
///
/// Refuses duplicate creates and renames onto an existing key, rejects
/// malformed YouTube URLs, and answers every success with the full state.
#[derive(Default)]
pub struct FakeService {
    state: RefCell<GalleryState>,
    requests: RefCell<Vec<GalleryRequest>>,
    rules: RefCell<Vec<Rule>>,
    fetches: Cell<usize>,
    offline: Cell<bool>,
    drop_hero: Cell<bool>,
}

impl FakeService {
    pub fn new(state: GalleryState) -> Self {
        Self {
            state: RefCell::new(state),
            ..Self::default()
        }
    }

    /// Every mutation received, in order.
    pub fn requests(&self) -> Vec<GalleryRequest> {
        self.requests.borrow().clone()
    }

    pub fn fetch_count(&self) -> usize {
        self.fetches.get()
    }

    pub fn set_offline(&self, offline: bool) {
        self.offline.set(offline);
    }

    /// Answer mutations without the hero sequence, like a create response.
    pub fn drop_hero_from_responses(&self) {
        self.drop_hero.set(true);
    }

    /// Refuse matching requests with `message` (status 500).
    pub fn reject_when(&self, matches: impl Fn(&GalleryRequest) -> bool + 'static, message: &str) {
        self.rules
            .borrow_mut()
            .push((Box::new(matches), message.to_string()));
    }

    fn apply(&self, request: &GalleryRequest) -> Result<(), ServiceError> {
        let mut state = self.state.borrow_mut();
        match request {
            GalleryRequest::CreateEvent { event_name } => {
                if state.folders.contains_key(event_name) {
                    return Err(rejected(409, format!("Event {event_name} already exists")));
                }
                state.folders.insert(event_name.clone(), Vec::new());
            }
            GalleryRequest::Register {
                uploaded,
                event_name,
                hero,
            } => {
                let items = uploaded.iter().map(|a| MediaItem {
                    public_id: Some(a.public_id.clone()),
                    ..MediaItem::image(a.url.clone())
                });
                match (hero, event_name) {
                    (true, _) => state.hero.extend(items),
                    (false, Some(name)) => state.folders.entry(name.clone()).or_default().extend(items),
                    (false, None) => return Err(rejected(400, "eventName is required".into())),
                }
            }
            GalleryRequest::RenameEvent { old_name, new_name } => {
                if state.folders.contains_key(new_name) {
                    return Err(rejected(409, format!("Event {new_name} already exists")));
                }
                let items = state
                    .folders
                    .remove(old_name)
                    .ok_or_else(|| rejected(404, format!("Event {old_name} not found")))?;
                state.folders.insert(new_name.clone(), items);
            }
            GalleryRequest::AddYoutube { event_name, url } => {
                if youtube::parse_youtube_id(url).is_none() {
                    return Err(rejected(400, "Invalid YouTube URL".into()));
                }
                state
                    .folders
                    .entry(event_name.clone())
                    .or_default()
                    .push(MediaItem::youtube(url.clone()));
            }
            GalleryRequest::DeleteEvent { event_name } => {
                state
                    .folders
                    .remove(event_name)
                    .ok_or_else(|| rejected(404, format!("Event {event_name} not found")))?;
            }
            GalleryRequest::DeleteItem {
                event_name,
                url,
                hero,
            } => {
                let items = if *hero || naming::is_hero_key(event_name) {
                    &mut state.hero
                } else {
                    state
                        .folders
                        .get_mut(event_name)
                        .ok_or_else(|| rejected(404, format!("Event {event_name} not found")))?
                };
                let position = items
                    .iter()
                    .position(|i| effective_url(i) == Some(url.as_str()))
                    .ok_or_else(|| rejected(404, "Item not found".into()))?;
                items.remove(position);
            }
        }
        Ok(())
    }
}

fn rejected(status: u16, message: String) -> ServiceError {
    ServiceError::Rejected { status, message }
}

impl GalleryService for FakeService {
    fn fetch(&self) -> Result<GalleryState, ServiceError> {
        self.fetches.set(self.fetches.get() + 1);
        if self.offline.get() {
            return Err(ServiceError::InvalidResponse("offline".into()));
        }
        Ok(self.state.borrow().clone())
    }

    fn submit(&self, request: &GalleryRequest) -> Result<GalleryState, ServiceError> {
        self.requests.borrow_mut().push(request.clone());
        if let Some((_, message)) = self.rules.borrow().iter().find(|(m, _)| m(request)) {
            return Err(rejected(500, message.clone()));
        }
        self.apply(request)?;
        let mut answer = self.state.borrow().clone();
        if self.drop_hero.get() {
            answer.hero.clear();
        }
        Ok(answer)
    }
}

// =========================================================================
// Media Upload Service
// =========================================================================

/// Scripted uploader recording what it was asked to store and discard.
///
/// Stored assets get `https://media.test/<folder>/<file>` URLs and
/// `<folder>/<file stem>` public ids.
#[derive(Default)]
pub struct FakeUploader {
    uploads: RefCell<Vec<(String, String)>>,
    discarded: RefCell<Vec<String>>,
    fail_at: Cell<Option<usize>>,
    fail_discards: Cell<bool>,
}

impl FakeUploader {
    /// `(file name, folder)` of every attempted upload.
    pub fn uploads(&self) -> Vec<(String, String)> {
        self.uploads.borrow().clone()
    }

    pub fn upload_count(&self) -> usize {
        self.uploads.borrow().len()
    }

    /// Public ids of discarded assets.
    pub fn discarded(&self) -> Vec<String> {
        self.discarded.borrow().clone()
    }

    /// Fail the upload attempt with this zero-based index.
    pub fn fail_upload_at(&self, index: usize) {
        self.fail_at.set(Some(index));
    }

    pub fn fail_discards(&self) {
        self.fail_discards.set(true);
    }
}

impl MediaUploader for FakeUploader {
    fn upload(&self, file: &UploadFile, folder: &str) -> Result<StoredAsset, UploadError> {
        let attempt = self.upload_count();
        self.uploads
            .borrow_mut()
            .push((file.file_name.clone(), folder.to_string()));
        if self.fail_at.get() == Some(attempt) {
            return Err(UploadError::Rejected {
                file: file.file_name.clone(),
                status: 500,
            });
        }
        let stem = file
            .file_name
            .rsplit_once('.')
            .map_or(file.file_name.as_str(), |(stem, _)| stem);
        Ok(StoredAsset {
            url: format!("https://media.test/{folder}/{}", file.file_name),
            public_id: format!("{folder}/{stem}"),
        })
    }

    fn discard(&self, asset: &StoredAsset) -> Result<(), UploadError> {
        if self.fail_discards.get() {
            return Err(UploadError::Discard {
                public_id: asset.public_id.clone(),
                status: 500,
            });
        }
        self.discarded.borrow_mut().push(asset.public_id.clone());
        Ok(())
    }
}
