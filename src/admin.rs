//! Gallery admin workflow.
//!
//! [`AdminWorkflow`] sequences Media Upload Service and Gallery Service calls
//! on behalf of one admin session. It keeps the last known [`GalleryState`]
//! and the selected folder, and every successful mutation replaces that state
//! with the service's answer.
//!
//! ## Guards
//!
//! Each mutation asks the injected [`Authorizer`] first, then validates its
//! input against the current state before any network call:
//!
//! - folder names must be non-empty once trimmed
//! - the hero aliases are never treated as ordinary folders
//! - images never go into a video folder, video links never into a photo
//!   folder (classification is by first item, see [`view::classify_folder`])
//! - uploads keep only files passing the image allow-list
//!
//! ## Progress
//!
//! When built [`with_events`](AdminWorkflow::with_events), the workflow pushes
//! [`AdminEvent`]s over an `mpsc` channel as it goes. The CLI prints them from
//! a separate thread.
//!
//! ## Failure handling
//!
//! - A batch of video links is not atomic. Each link is its own request;
//!   failures are collected in the [`BatchReport`].
//! - An image batch uploads every file, then registers them in one request.
//!   If an upload or the registration fails, the assets already stored at the
//!   media host are discarded. Any that cannot be discarded come back in
//!   [`AdminError::OrphanedUpload`].
//! - Editing a video link is delete-then-add. If the add fails, the old link
//!   is re-added (at the end of the folder) and [`AdminError::EditFailed`]
//!   says whether that worked.

use crate::auth::Authorizer;
use crate::config::UploadsConfig;
use crate::naming::{self, HERO_WIRE_KEY};
use crate::service::{GalleryRequest, GalleryService, ServiceError};
use crate::types::{FolderKind, GalleryState, StoredAsset, UploadFile};
use crate::upload::{self, MediaUploader, UploadError};
use crate::view;
use std::sync::mpsc::Sender;
use thiserror::Error;

/// Input rejected before anything was sent.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Folder name is required")]
    EmptyName,
    #[error("Select a folder first")]
    NoTarget,
    #[error("Choose at least one image")]
    NoFiles,
    #[error("None of the selected files is an allowed image")]
    NoValidFiles,
    #[error("{} is a {existing} folder; photos and videos cannot be mixed", naming::display_name(.folder))]
    MixedKinds { folder: String, existing: FolderKind },
    #[error("The hero slider is not an ordinary folder")]
    HeroFolder,
    #[error("Enter at least one YouTube URL")]
    NoUrls,
    #[error("No item URL to delete")]
    NoItemUrl,
    #[error("No item at position {index} in {}", naming::display_name(.folder))]
    ItemNotFound { folder: String, index: usize },
    #[error("Item at position {index} in {} is not a video link", naming::display_name(.folder))]
    NotAVideo { folder: String, index: usize },
}

#[derive(Error, Debug)]
pub enum AdminError {
    #[error("Not authorized")]
    Unauthorized,
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error(transparent)]
    Service(#[from] ServiceError),
    #[error(transparent)]
    Upload(#[from] UploadError),
    /// The batch failed and some stored assets could not be discarded.
    #[error("{source} ({} uploaded image(s) left unregistered)", .orphaned.len())]
    OrphanedUpload {
        source: Box<AdminError>,
        orphaned: Vec<StoredAsset>,
    },
    /// The old link was deleted but the new one was refused.
    #[error("{source}; original link {}", restore_note(.restored))]
    EditFailed { source: ServiceError, restored: bool },
}

fn restore_note(restored: &bool) -> &'static str {
    if *restored { "restored" } else { "lost" }
}

/// Incremental status pushed while an operation runs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AdminEvent {
    Status(String),
    Progress {
        action: &'static str,
        item: String,
        done: usize,
        total: usize,
    },
}

/// Asks the operator to approve an irreversible action.
pub trait Confirm {
    fn confirm(&mut self, prompt: &str) -> bool;
}

impl<F: FnMut(&str) -> bool> Confirm for F {
    fn confirm(&mut self, prompt: &str) -> bool {
        self(prompt)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Deletion {
    Deleted,
    Cancelled,
}

/// Collection a single item is deleted from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ItemTarget {
    Folder(String),
    Hero,
}

/// One video link the service refused.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinkFailure {
    pub url: String,
    pub message: String,
}

/// Outcome of a batch of video links.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchReport {
    pub added: usize,
    pub total: usize,
    pub failures: Vec<LinkFailure>,
}

impl BatchReport {
    pub fn is_complete(&self) -> bool {
        self.failures.is_empty()
    }

    pub fn status(&self) -> String {
        if self.is_complete() {
            format!("Added {} link(s)", self.added)
        } else {
            format!("Added {}/{}", self.added, self.total)
        }
    }
}

/// Outcome of an image batch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadReport {
    pub uploaded: usize,
    /// Files dropped by the allow-list.
    pub rejected: usize,
}

impl UploadReport {
    pub fn status(&self) -> String {
        match self.rejected {
            0 => format!("Uploaded {} image(s)", self.uploaded),
            n => format!("Uploaded {} image(s), skipped {n}", self.uploaded),
        }
    }
}

/// Split a pasted batch of links on newlines and commas.
pub fn split_urls(input: &str) -> Vec<String> {
    input
        .split(['\n', ','])
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(String::from)
        .collect()
}

pub struct AdminWorkflow<S, U> {
    service: S,
    uploader: U,
    authorizer: Box<dyn Authorizer>,
    uploads: UploadsConfig,
    events: Option<Sender<AdminEvent>>,
    state: GalleryState,
    selected: Option<String>,
}

impl<S: GalleryService, U: MediaUploader> AdminWorkflow<S, U> {
    pub fn new(
        service: S,
        uploader: U,
        authorizer: impl Authorizer + 'static,
        uploads: UploadsConfig,
    ) -> Self {
        Self {
            service,
            uploader,
            authorizer: Box::new(authorizer),
            uploads,
            events: None,
            state: GalleryState::default(),
            selected: None,
        }
    }

    pub fn with_events(mut self, events: Sender<AdminEvent>) -> Self {
        self.events = Some(events);
        self
    }

    pub fn state(&self) -> &GalleryState {
        &self.state
    }

    pub fn selected(&self) -> Option<&str> {
        self.selected.as_deref()
    }

    pub fn select(&mut self, key: impl Into<String>) {
        self.selected = Some(key.into());
    }

    pub fn service(&self) -> &S {
        &self.service
    }

    pub fn uploader(&self) -> &U {
        &self.uploader
    }

    /// Fetch the gallery. A failed fetch leaves an empty state behind.
    pub fn load(&mut self) -> Result<&GalleryState, AdminError> {
        match self.service.fetch() {
            Ok(state) => {
                self.replace_state(state);
                Ok(&self.state)
            }
            Err(e) => {
                self.state = GalleryState::default();
                self.selected = None;
                Err(e.into())
            }
        }
    }

    /// Create an empty folder and select it. Returns the storage key.
    pub fn create_folder(&mut self, name: &str) -> Result<String, AdminError> {
        self.ensure_authorized()?;
        let key = naming::storage_key(name);
        if key.is_empty() {
            return Err(ValidationError::EmptyName.into());
        }
        if naming::is_hero_key(&key) {
            return Err(ValidationError::HeroFolder.into());
        }

        let next = self.service.submit(&GalleryRequest::CreateEvent {
            event_name: key.clone(),
        })?;
        // The create response is only trusted for folders.
        self.state.folders = next.folders;
        self.selected = Some(key.clone());
        tracing::info!(folder = %key, "Created folder");
        self.status(format!("Created folder {}", naming::display_name(&key)));
        Ok(key)
    }

    /// Upload images into an event folder, then register them in one request.
    pub fn upload_images(
        &mut self,
        target: &str,
        files: Vec<UploadFile>,
    ) -> Result<UploadReport, AdminError> {
        self.ensure_authorized()?;
        let target = self.folder_key(target)?;
        self.ensure_kind(&target, FolderKind::Video)?;
        let (files, rejected) = self.allowed_files(files)?;

        let folder = self.uploads.event_folder(&target);
        let uploaded = self.upload_batch(&files, &folder)?;
        let count = uploaded.len();
        let request = GalleryRequest::Register {
            uploaded: uploaded.clone(),
            event_name: Some(target.clone()),
            hero: false,
        };
        let next = self.register(&request, uploaded)?;
        self.replace_state(next);
        self.selected = Some(target.clone());

        let report = UploadReport {
            uploaded: count,
            rejected,
        };
        tracing::info!(folder = %target, uploaded = count, rejected, "Registered images");
        self.status(report.status());
        Ok(report)
    }

    /// Upload images into the hero sequence.
    pub fn upload_hero_images(&mut self, files: Vec<UploadFile>) -> Result<UploadReport, AdminError> {
        self.ensure_authorized()?;
        let (files, rejected) = self.allowed_files(files)?;

        let folder = self.uploads.hero_folder.clone();
        let uploaded = self.upload_batch(&files, &folder)?;
        let count = uploaded.len();
        let request = GalleryRequest::Register {
            uploaded: uploaded.clone(),
            event_name: None,
            hero: true,
        };
        let next = self.register(&request, uploaded)?;
        self.replace_state(next);

        let report = UploadReport {
            uploaded: count,
            rejected,
        };
        tracing::info!(uploaded = count, rejected, "Registered hero images");
        self.status(report.status());
        Ok(report)
    }

    /// Rename a folder. The service's refusal message is passed through as is.
    pub fn rename_folder(&mut self, old: &str, new_name: &str) -> Result<String, AdminError> {
        self.ensure_authorized()?;
        let old = self.folder_key(old)?;
        let new_key = naming::storage_key(new_name);
        if new_key.is_empty() {
            return Err(ValidationError::EmptyName.into());
        }
        if naming::is_hero_key(&new_key) {
            return Err(ValidationError::HeroFolder.into());
        }

        let next = self.service.submit(&GalleryRequest::RenameEvent {
            old_name: old.clone(),
            new_name: new_key.clone(),
        })?;
        self.replace_state(next);
        self.selected = Some(new_key.clone());
        tracing::info!(from = %old, to = %new_key, "Renamed folder");
        self.status(format!("Renamed to {}", naming::display_name(&new_key)));
        Ok(new_key)
    }

    /// Delete a whole folder after confirmation.
    pub fn delete_folder(
        &mut self,
        name: &str,
        confirm: &mut impl Confirm,
    ) -> Result<Deletion, AdminError> {
        self.ensure_authorized()?;
        let name = self.folder_key(name)?;
        let prompt = format!(
            "Delete folder \"{}\" and everything in it?",
            naming::display_name(&name)
        );
        if !confirm.confirm(&prompt) {
            return Ok(Deletion::Cancelled);
        }

        let next = self.service.submit(&GalleryRequest::DeleteEvent {
            event_name: name.clone(),
        })?;
        self.replace_state(next);
        if self.selected.as_deref() == Some(name.as_str()) {
            self.selected = None;
        }
        tracing::info!(folder = %name, "Deleted folder");
        self.status(format!("Deleted folder {}", naming::display_name(&name)));
        Ok(Deletion::Deleted)
    }

    /// Add one or more video links, one request each.
    pub fn add_video_links(&mut self, folder: &str, input: &str) -> Result<BatchReport, AdminError> {
        self.ensure_authorized()?;
        let folder = self.folder_key(folder)?;
        let urls = split_urls(input);
        if urls.is_empty() {
            return Err(ValidationError::NoUrls.into());
        }
        self.ensure_kind(&folder, FolderKind::Photo)?;

        let total = urls.len();
        let mut last = None;
        let mut failures = Vec::new();
        for (i, url) in urls.into_iter().enumerate() {
            let request = GalleryRequest::AddYoutube {
                event_name: folder.clone(),
                url: url.clone(),
            };
            match self.service.submit(&request) {
                Ok(next) => last = Some(next),
                Err(e) => {
                    tracing::warn!(%url, error = %e, "Video link refused");
                    failures.push(LinkFailure {
                        url: url.clone(),
                        message: e.to_string(),
                    });
                }
            }
            self.emit(AdminEvent::Progress {
                action: "Adding",
                item: url,
                done: i + 1,
                total,
            });
        }

        match last {
            Some(next) => self.replace_state(next),
            None => match self.service.fetch() {
                Ok(next) => self.replace_state(next),
                Err(e) => tracing::warn!(error = %e, "Reload after failed batch failed"),
            },
        }
        self.selected = Some(folder.clone());

        let report = BatchReport {
            added: total - failures.len(),
            total,
            failures,
        };
        tracing::info!(folder = %folder, added = report.added, total, "Video batch finished");
        self.status(report.status());
        Ok(report)
    }

    /// Replace the video link at `index` with `new_url`.
    pub fn edit_video_link(
        &mut self,
        folder: &str,
        index: usize,
        new_url: &str,
    ) -> Result<(), AdminError> {
        self.ensure_authorized()?;
        let folder = self.folder_key(folder)?;
        let new_url = new_url.trim();
        if new_url.is_empty() {
            return Err(ValidationError::NoUrls.into());
        }
        self.ensure_kind(&folder, FolderKind::Photo)?;
        let item = self
            .state
            .folder(&folder)
            .and_then(|items| items.get(index))
            .ok_or_else(|| ValidationError::ItemNotFound {
                folder: folder.clone(),
                index,
            })?;
        if !item.is_video() {
            return Err(ValidationError::NotAVideo {
                folder: folder.clone(),
                index,
            }
            .into());
        }
        let old_url = item
            .url
            .as_deref()
            .map(str::trim)
            .filter(|u| !u.is_empty())
            .ok_or(ValidationError::NoItemUrl)?
            .to_string();

        let next = self.service.submit(&GalleryRequest::DeleteItem {
            event_name: folder.clone(),
            url: old_url.clone(),
            hero: false,
        })?;
        self.replace_state(next);

        let add = GalleryRequest::AddYoutube {
            event_name: folder.clone(),
            url: new_url.to_string(),
        };
        match self.service.submit(&add) {
            Ok(next) => {
                self.replace_state(next);
                tracing::info!(folder = %folder, from = %old_url, to = %new_url, "Edited video link");
                self.status("Updated link".to_string());
                Ok(())
            }
            Err(source) => {
                let restore = GalleryRequest::AddYoutube {
                    event_name: folder.clone(),
                    url: old_url.clone(),
                };
                let restored = match self.service.submit(&restore) {
                    Ok(next) => {
                        self.replace_state(next);
                        true
                    }
                    Err(e) => {
                        tracing::warn!(url = %old_url, error = %e, "Could not restore video link");
                        false
                    }
                };
                Err(AdminError::EditFailed { source, restored })
            }
        }
    }

    /// Delete one item from a folder or the hero sequence. Without an
    /// explicit URL the first item with a URL is chosen.
    pub fn delete_item(
        &mut self,
        target: &ItemTarget,
        url: Option<&str>,
        confirm: &mut impl Confirm,
    ) -> Result<Deletion, AdminError> {
        self.ensure_authorized()?;
        let (event_name, hero) = match target {
            ItemTarget::Hero => (HERO_WIRE_KEY.to_string(), true),
            ItemTarget::Folder(name) => (self.folder_key(name)?, false),
        };
        let items = if hero {
            self.state.hero.as_slice()
        } else {
            self.state.folder(&event_name).unwrap_or_default()
        };
        let url = match url.map(str::trim).filter(|u| !u.is_empty()) {
            Some(explicit) => explicit.to_string(),
            None => items
                .iter()
                .find_map(view::effective_url)
                .ok_or(ValidationError::NoItemUrl)?
                .to_string(),
        };

        if !confirm.confirm(&format!("Delete {url}?")) {
            return Ok(Deletion::Cancelled);
        }
        let next = self.service.submit(&GalleryRequest::DeleteItem {
            event_name: event_name.clone(),
            url: url.clone(),
            hero,
        })?;
        self.replace_state(next);
        tracing::info!(collection = %event_name, %url, "Deleted item");
        self.status("Deleted item".to_string());
        Ok(Deletion::Deleted)
    }

    fn ensure_authorized(&self) -> Result<(), AdminError> {
        if self.authorizer.is_authorized() {
            Ok(())
        } else {
            tracing::warn!("Refused unauthorized mutation");
            Err(AdminError::Unauthorized)
        }
    }

    /// Resolve a folder argument to the key it is stored under. An existing
    /// key is taken as is; a display name goes through [`naming::storage_key`].
    fn folder_key(&self, name: &str) -> Result<String, AdminError> {
        let name = name.trim();
        let key = if self.state.folders.contains_key(name) {
            name.to_string()
        } else {
            naming::storage_key(name)
        };
        if key.is_empty() {
            return Err(ValidationError::NoTarget.into());
        }
        if naming::is_hero_key(&key) {
            return Err(ValidationError::HeroFolder.into());
        }
        Ok(key)
    }

    /// Refuse writing into `folder` when it is already classified `forbidden`.
    fn ensure_kind(&self, folder: &str, forbidden: FolderKind) -> Result<(), AdminError> {
        let existing = view::classify_folder(self.state.folder(folder).unwrap_or_default());
        if existing == forbidden {
            return Err(ValidationError::MixedKinds {
                folder: folder.to_string(),
                existing,
            }
            .into());
        }
        Ok(())
    }

    fn allowed_files(&self, files: Vec<UploadFile>) -> Result<(Vec<UploadFile>, usize), AdminError> {
        if files.is_empty() {
            return Err(ValidationError::NoFiles.into());
        }
        let (files, rejected) = upload::filter_images(files, &self.uploads.allowed_extensions);
        if files.is_empty() {
            return Err(ValidationError::NoValidFiles.into());
        }
        if rejected > 0 {
            self.status(format!("Skipped {rejected} file(s) that are not allowed images"));
        }
        Ok((files, rejected))
    }

    /// Upload files one at a time. On failure, discard what was stored.
    fn upload_batch(&self, files: &[UploadFile], folder: &str) -> Result<Vec<StoredAsset>, AdminError> {
        let total = files.len();
        let mut uploaded = Vec::with_capacity(total);
        for (i, file) in files.iter().enumerate() {
            match self.uploader.upload(file, folder) {
                Ok(asset) => uploaded.push(asset),
                Err(e) => {
                    tracing::warn!(file = %file.file_name, error = %e, "Upload failed");
                    return Err(self.discard_orphans(e.into(), uploaded));
                }
            }
            self.emit(AdminEvent::Progress {
                action: "Uploaded",
                item: file.file_name.clone(),
                done: i + 1,
                total,
            });
        }
        Ok(uploaded)
    }

    fn register(
        &self,
        request: &GalleryRequest,
        uploaded: Vec<StoredAsset>,
    ) -> Result<GalleryState, AdminError> {
        self.service
            .submit(request)
            .map_err(|e| self.discard_orphans(e.into(), uploaded))
    }

    fn discard_orphans(&self, error: AdminError, assets: Vec<StoredAsset>) -> AdminError {
        if assets.is_empty() {
            return error;
        }
        let total = assets.len();
        let orphaned: Vec<StoredAsset> = assets
            .into_iter()
            .filter(|asset| match self.uploader.discard(asset) {
                Ok(()) => false,
                Err(e) => {
                    tracing::warn!(public_id = %asset.public_id, error = %e, "Could not discard upload");
                    true
                }
            })
            .collect();
        tracing::warn!(
            discarded = total - orphaned.len(),
            orphaned = orphaned.len(),
            "Cleaned up unregistered uploads"
        );
        if orphaned.is_empty() {
            error
        } else {
            AdminError::OrphanedUpload {
                source: Box::new(error),
                orphaned,
            }
        }
    }

    fn replace_state(&mut self, state: GalleryState) {
        for key in view::folder_inconsistencies(&state) {
            tracing::warn!(folder = %key, "Folder mixes photos and videos");
        }
        self.state = state;
    }

    fn status(&self, message: String) {
        self.emit(AdminEvent::Status(message));
    }

    fn emit(&self, event: AdminEvent) {
        if let Some(tx) = &self.events {
            tx.send(event).ok();
        }
    }
}
