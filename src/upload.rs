//! Media Upload Service client and the image allow-list.
//!
//! Images never pass through the Gallery Service. Each file goes straight
//! to the media host in two steps:
//!
//! ```text
//! 1. GET  {signature_api}?folder=events/Ugadi      → {timestamp, signature, apiKey, cloudName}
//! 2. POST {upload_host}/{cloudName}/image/upload   multipart: file, folder, timestamp,
//!                                                   signature, api_key
//!                                                  → {secure_url, public_id}
//! ```
//!
//! The returned `(secure_url, public_id)` pair is later registered with the
//! Gallery Service. Assets uploaded but never registered are discarded the
//! same way, with a signature scoped to the asset's `public_id`:
//!
//! ```text
//! GET  {signature_api}?public_id=events/Ugadi/x    → {timestamp, signature, apiKey, cloudName}
//! POST {upload_host}/{cloudName}/image/destroy     form: public_id, timestamp, signature, api_key
//! ```

use crate::types::{StoredAsset, UploadFile};
use reqwest::blocking::multipart;
use serde::Deserialize;
use std::time::Duration;
use thiserror::Error;
use tracing::instrument;

#[derive(Error, Debug)]
pub enum UploadError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("Failed to get upload signature (status {0})")]
    Signature(u16),
    #[error("Upload of {file} failed (status {status})")]
    Rejected { file: String, status: u16 },
    #[error("Discard of {public_id} failed (status {status})")]
    Discard { public_id: String, status: u16 },
}

/// Direct-to-host media storage.
pub trait MediaUploader {
    /// Store a file under `folder` and describe the stored asset.
    fn upload(&self, file: &UploadFile, folder: &str) -> Result<StoredAsset, UploadError>;

    /// Delete an asset that will never be registered.
    fn discard(&self, asset: &StoredAsset) -> Result<(), UploadError>;
}

/// Whether a file may be uploaded as a gallery image.
///
/// A known MIME type must start with `image/`, and the lowercased file name
/// must end with one of `allowed_extensions`. An empty allow-list accepts
/// any name.
pub fn is_allowed_image(file: &UploadFile, allowed_extensions: &[String]) -> bool {
    let content_type = file.content_type.as_deref().unwrap_or_default();
    if !content_type.is_empty() && !content_type.starts_with("image/") {
        return false;
    }
    let name = file.file_name.to_lowercase();
    allowed_extensions.is_empty()
        || allowed_extensions
            .iter()
            .any(|ext| name.ends_with(&ext.to_lowercase()))
}

/// Split files into (allowed, rejected count), preserving order.
pub fn filter_images(files: Vec<UploadFile>, allowed_extensions: &[String]) -> (Vec<UploadFile>, usize) {
    let total = files.len();
    let allowed: Vec<UploadFile> = files
        .into_iter()
        .filter(|f| is_allowed_image(f, allowed_extensions))
        .collect();
    let rejected = total - allowed.len();
    (allowed, rejected)
}

/// Short-lived credentials minted by the signature endpoint.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct UploadSignature {
    timestamp: serde_json::Value,
    signature: String,
    api_key: String,
    cloud_name: String,
}

impl UploadSignature {
    fn timestamp(&self) -> String {
        match &self.timestamp {
            serde_json::Value::String(s) => s.clone(),
            other => other.to_string(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct HostUploadResponse {
    secure_url: String,
    public_id: String,
}

/// Signed direct upload over HTTP.
#[derive(Debug, Clone)]
pub struct SignedUploader {
    signature_api: String,
    upload_host: String,
    client: reqwest::blocking::Client,
}

impl SignedUploader {
    pub fn new(
        signature_api: impl Into<String>,
        upload_host: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, UploadError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(timeout)
            .build()?;
        Ok(Self {
            signature_api: signature_api.into(),
            upload_host: upload_host.into().trim_end_matches('/').to_string(),
            client,
        })
    }

    fn signature(&self, param: (&str, &str)) -> Result<UploadSignature, UploadError> {
        let response = self
            .client
            .get(&self.signature_api)
            .query(&[param])
            .send()?;
        if !response.status().is_success() {
            return Err(UploadError::Signature(response.status().as_u16()));
        }
        Ok(response.json()?)
    }
}

impl MediaUploader for SignedUploader {
    #[instrument(skip(self, file), fields(file = %file.file_name, bytes = file.data.len()))]
    fn upload(&self, file: &UploadFile, folder: &str) -> Result<StoredAsset, UploadError> {
        let sig = self.signature(("folder", folder))?;

        let mut part = multipart::Part::bytes(file.data.clone()).file_name(file.file_name.clone());
        if let Some(content_type) = file.content_type.as_deref() {
            part = part.mime_str(content_type)?;
        }
        let timestamp = sig.timestamp();
        let form = multipart::Form::new()
            .part("file", part)
            .text("folder", folder.to_string())
            .text("timestamp", timestamp)
            .text("signature", sig.signature)
            .text("api_key", sig.api_key);

        let url = format!("{}/{}/image/upload", self.upload_host, sig.cloud_name);
        tracing::debug!(%url, "Uploading to media host");
        let response = self.client.post(&url).multipart(form).send()?;
        if !response.status().is_success() {
            return Err(UploadError::Rejected {
                file: file.file_name.clone(),
                status: response.status().as_u16(),
            });
        }
        let stored: HostUploadResponse = response.json()?;
        tracing::debug!(public_id = %stored.public_id, "Upload stored");
        Ok(StoredAsset {
            url: stored.secure_url,
            public_id: stored.public_id,
        })
    }

    #[instrument(skip(self), fields(public_id = %asset.public_id))]
    fn discard(&self, asset: &StoredAsset) -> Result<(), UploadError> {
        let sig = self.signature(("public_id", &asset.public_id))?;
        let timestamp = sig.timestamp();
        let url = format!("{}/{}/image/destroy", self.upload_host, sig.cloud_name);
        let response = self
            .client
            .post(&url)
            .form(&[
                ("public_id", asset.public_id.as_str()),
                ("timestamp", timestamp.as_str()),
                ("signature", sig.signature.as_str()),
                ("api_key", sig.api_key.as_str()),
            ])
            .send()?;
        if !response.status().is_success() {
            return Err(UploadError::Discard {
                public_id: asset.public_id.clone(),
                status: response.status().as_u16(),
            });
        }
        Ok(())
    }
}
