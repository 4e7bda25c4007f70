//! # Event Gal
//!
//! The gallery data model and admin tooling for a performance group's
//! website. Event photos and performance videos live in named folders; a
//! separate hero sequence drives the home page carousel.
//!
//! # Architecture: State In, Views Out
//!
//! Nothing here stores the gallery. Two external collaborators do:
//!
//! ```text
//! Gallery Service        GET → {gallery, slider}     POST/DELETE → updated {gallery, slider}
//! Media Upload Service   signed direct upload of image bytes → {secure_url, public_id}
//! ```
//!
//! The crate fetches the whole gallery as one [`types::GalleryState`], derives
//! everything a page shows from it with pure functions, and replaces it
//! wholesale with the service's answer after every mutation:
//!
//! ```text
//! 1. Decode    raw JSON body  →  GalleryState     (response)
//! 2. Derive    GalleryState   →  GalleryView      (view: public pages, carousel, admin counts)
//! 3. Mutate    admin request  →  GalleryState     (admin → service / upload)
//! ```
//!
//! Decoding and derivation never fail on odd data. Malformed items are
//! dropped, and the same body always yields the same state and view.
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`naming`] | Folder key ↔ display name, reserved hero keys, search matching |
//! | [`types`] | `MediaItem`, `GalleryState`, `HeroSlide`, `StoredAsset`, `UploadFile` |
//! | [`metadata`] | Field-priority resolution for URLs and slide captions |
//! | [`response`] | Tolerant decoding of Gallery Service bodies |
//! | [`youtube`] | Video id extraction, embed and thumbnail URLs |
//! | [`view`] | Gallery view model: hero/folder disjointness, classification, previews, carousel |
//! | [`service`] | `GalleryService` trait and its HTTP client |
//! | [`upload`] | `MediaUploader` trait, image allow-list, signed direct uploads |
//! | [`auth`] | `Authorizer` capability and the local credential gate |
//! | [`admin`] | Guarded admin workflow with progress events |
//! | [`config`] | `config.toml` loading, merging, and validation |
//! | [`output`] | CLI output formatting |
//!
//! # Design Decisions
//!
//! ## Hero Images Are Hidden From Folders
//!
//! An image registered both in the hero sequence and in an event folder is
//! shown only in the carousel. Folder listings and counts are taken after
//! that filter, on the public pages and in the admin listing alike.
//!
//! ## First-Item Classification
//!
//! A folder is a video folder if its first item is a video link, a photo
//! folder otherwise. The admin workflow refuses to add the other kind, which
//! keeps the rule honest for new data. Old folders that already mix kinds
//! are reported by `event-gal check`, not rewritten.
//!
//! ## Collaborators Behind Traits
//!
//! [`service::GalleryService`], [`upload::MediaUploader`] and
//! [`auth::Authorizer`] are the seams. The admin workflow is generic over
//! them, so the whole workflow runs in tests against in-memory stand-ins.
//!
//! ## Blocking I/O
//!
//! One admin, one request at a time, uploads strictly in sequence. The HTTP
//! clients are `reqwest::blocking`; progress goes over a plain `mpsc`
//! channel to whoever prints it.

pub mod admin;
pub mod auth;
pub mod config;
pub mod metadata;
pub mod naming;
pub mod output;
pub mod response;
pub mod service;
pub mod types;
pub mod upload;
pub mod view;
pub mod youtube;

#[cfg(test)]
pub(crate) mod test_helpers;
