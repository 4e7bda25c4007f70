//! Gallery Service client.
//!
//! The Gallery Service is the authoritative store of folders and the hero
//! sequence. It speaks JSON over one endpoint:
//!
//! | Method | Body | Effect |
//! |--------|------|--------|
//! | `GET` | none | current gallery |
//! | `POST` | `{createEvent, eventName}` | create an empty folder |
//! | `POST` | `{uploaded, eventName?, hero}` | register uploaded images |
//! | `POST` | `{renameEvent, oldName, newName}` | rename a folder |
//! | `POST` | `{addYoutube, eventName, url}` | append a video link |
//! | `DELETE` | `{eventName, deleteEvent, hero}` | drop a whole folder |
//! | `DELETE` | `{eventName, url, hero}` | drop one item |
//!
//! Every successful call answers with the full updated gallery, which
//! replaces the caller's state. Failures answer `{error}` with a non-2xx
//! status; the message is surfaced verbatim.
//!
//! The [`GalleryService`] trait is the seam the admin workflow depends on;
//! [`HttpGalleryService`] is the production implementation.

use crate::response;
use crate::types::{GalleryState, StoredAsset};
use serde_json::{Value, json};
use std::time::Duration;
use thiserror::Error;
use tracing::instrument;

#[derive(Error, Debug)]
pub enum ServiceError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
    /// The service answered with a non-2xx status.
    #[error("{message}")]
    Rejected { status: u16, message: String },
    #[error("Invalid server response: {0}")]
    InvalidResponse(String),
}

/// A mutation understood by the Gallery Service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GalleryRequest {
    CreateEvent {
        event_name: String,
    },
    /// Register assets already stored at the media host. Hero registrations
    /// carry no event name.
    Register {
        uploaded: Vec<StoredAsset>,
        event_name: Option<String>,
        hero: bool,
    },
    RenameEvent {
        old_name: String,
        new_name: String,
    },
    AddYoutube {
        event_name: String,
        url: String,
    },
    DeleteEvent {
        event_name: String,
    },
    DeleteItem {
        event_name: String,
        url: String,
        hero: bool,
    },
}

/// HTTP method a request travels with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verb {
    Post,
    Delete,
}

impl GalleryRequest {
    pub fn verb(&self) -> Verb {
        match self {
            GalleryRequest::DeleteEvent { .. } | GalleryRequest::DeleteItem { .. } => Verb::Delete,
            _ => Verb::Post,
        }
    }

    /// JSON body in the service's wire format.
    pub fn body(&self) -> Value {
        match self {
            GalleryRequest::CreateEvent { event_name } => {
                json!({ "createEvent": true, "eventName": event_name })
            }
            GalleryRequest::Register {
                uploaded,
                event_name,
                hero,
            } => {
                let uploaded: Vec<Value> = uploaded
                    .iter()
                    .map(|a| json!({ "url": a.url, "public_id": a.public_id }))
                    .collect();
                let mut body = json!({ "uploaded": uploaded, "hero": hero });
                if let Some(name) = event_name {
                    body["eventName"] = json!(name);
                }
                body
            }
            GalleryRequest::RenameEvent { old_name, new_name } => {
                json!({ "renameEvent": true, "oldName": old_name, "newName": new_name })
            }
            GalleryRequest::AddYoutube { event_name, url } => {
                json!({ "addYoutube": true, "eventName": event_name, "url": url })
            }
            GalleryRequest::DeleteEvent { event_name } => {
                json!({ "eventName": event_name, "deleteEvent": true, "hero": false })
            }
            GalleryRequest::DeleteItem {
                event_name,
                url,
                hero,
            } => json!({ "eventName": event_name, "url": url, "hero": hero }),
        }
    }

    /// Message used when a refusal carries no `error` field.
    pub fn fallback_error(&self) -> &'static str {
        match self {
            GalleryRequest::CreateEvent { .. } => "Failed to create folder",
            GalleryRequest::Register { hero: true, .. } => "Hero upload failed",
            GalleryRequest::Register { .. } => "Failed to register images",
            GalleryRequest::RenameEvent { .. } => "Server refused rename",
            GalleryRequest::AddYoutube { .. } => "Failed to add URL",
            GalleryRequest::DeleteEvent { .. } => "Delete failed",
            GalleryRequest::DeleteItem { .. } => "Delete failed",
        }
    }
}

/// Read/write access to the gallery store.
pub trait GalleryService {
    /// Fetch the whole gallery.
    fn fetch(&self) -> Result<GalleryState, ServiceError>;

    /// Apply a mutation and return the updated gallery.
    fn submit(&self, request: &GalleryRequest) -> Result<GalleryState, ServiceError>;
}

/// Interpret a response body and status the way every endpoint answers.
///
/// An empty body counts as `{}`. A non-2xx status becomes
/// [`ServiceError::Rejected`] with the body's `error` or `fallback (status N)`;
/// a refusal whose body is not JSON still keeps its status.
pub fn interpret(status: u16, text: &str, fallback: &str) -> Result<GalleryState, ServiceError> {
    let parsed: Result<Value, _> = if text.trim().is_empty() {
        Ok(json!({}))
    } else {
        serde_json::from_str(text)
    };
    if !(200..300).contains(&status) {
        let message = parsed
            .ok()
            .and_then(|body| response::error_message(&body))
            .unwrap_or_else(|| format!("{fallback} (status {status})"));
        return Err(ServiceError::Rejected { status, message });
    }
    let body = parsed.map_err(|e| ServiceError::InvalidResponse(e.to_string()))?;
    Ok(response::decode(&body))
}

/// Gallery Service over HTTP.
#[derive(Debug, Clone)]
pub struct HttpGalleryService {
    endpoint: String,
    client: reqwest::blocking::Client,
}

impl HttpGalleryService {
    pub fn new(endpoint: impl Into<String>, timeout: Duration) -> Result<Self, ServiceError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(timeout)
            .build()?;
        Ok(Self {
            endpoint: endpoint.into(),
            client,
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

impl GalleryService for HttpGalleryService {
    #[instrument(skip(self), fields(endpoint = %self.endpoint))]
    fn fetch(&self) -> Result<GalleryState, ServiceError> {
        tracing::debug!("Fetching gallery");
        let response = self.client.get(&self.endpoint).send()?;
        let status = response.status().as_u16();
        let text = response.text()?;
        let state = interpret(status, &text, "Failed to load gallery")?;
        tracing::debug!(
            folders = state.folders.len(),
            hero = state.hero.len(),
            "Gallery fetched"
        );
        Ok(state)
    }

    #[instrument(skip(self, request), fields(endpoint = %self.endpoint, verb = ?request.verb()))]
    fn submit(&self, request: &GalleryRequest) -> Result<GalleryState, ServiceError> {
        tracing::debug!(?request, "Submitting gallery mutation");
        let builder = match request.verb() {
            Verb::Post => self.client.post(&self.endpoint),
            Verb::Delete => self.client.delete(&self.endpoint),
        };
        let response = builder.json(&request.body()).send()?;
        let status = response.status().as_u16();
        let text = response.text()?;
        interpret(status, &text, request.fallback_error()).inspect_err(|e| {
            tracing::warn!(status, error = %e, "Gallery service refused mutation");
        })
    }
}
