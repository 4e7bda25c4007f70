//! Configuration module.
//!
//! Handles loading, validating, and merging `config.toml`. Stock defaults
//! are the base layer; a `config.toml` in the config directory overrides
//! any subset of keys.
//!
//! ## Configuration Options
//!
//! ```toml
//! # All options are optional - defaults shown below
//!
//! [service]
//! gallery_api = "http://localhost:3000/api/event-photos"
//! signature_api = "http://localhost:3000/api/upload-signature"
//! upload_host = "https://api.cloudinary.com/v1_1"
//! timeout_secs = 30
//!
//! [uploads]
//! allowed_extensions = [".webp", ".jpg", ".jpeg", ".png"]
//! event_folder_prefix = "events"   # media host folder: events/<folder key>
//! hero_folder = "hero_slider"      # media host folder for hero images
//!
//! [admin]
//! username = "admin"
//! password_sha256 = ""             # empty = admin commands disabled
//!
//! [carousel]
//! interval_ms = 4500
//! ```
//!
//! ## Partial Configuration
//!
//! Config files are sparse: override just the values you want:
//!
//! ```toml
//! [service]
//! gallery_api = "https://troupe.example.org/api/event-photos"
//! ```
//!
//! Unknown keys are rejected to catch typos early.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use std::time::Duration;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("Config validation error: {0}")]
    Validation(String),
}

/// Gallery tooling configuration loaded from `config.toml`.
///
/// All fields have sensible defaults. User config files need only specify
/// the values they want to override. Unknown keys are rejected.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct GalleryConfig {
    /// Collaborator endpoints.
    pub service: ServiceConfig,
    /// Upload allow-list and media host folders.
    pub uploads: UploadsConfig,
    /// Local admin gate credentials.
    pub admin: AdminConfig,
    /// Hero carousel timing.
    pub carousel: CarouselConfig,
}

impl GalleryConfig {
    /// Validate config values are within acceptable ranges.
    pub fn validate(&self) -> Result<(), ConfigError> {
        for (key, value) in [
            ("service.gallery_api", &self.service.gallery_api),
            ("service.signature_api", &self.service.signature_api),
            ("service.upload_host", &self.service.upload_host),
        ] {
            if reqwest::Url::parse(value).is_err() {
                return Err(ConfigError::Validation(format!(
                    "{key} must be an absolute URL, got {value:?}"
                )));
            }
        }
        if self.service.timeout_secs == 0 {
            return Err(ConfigError::Validation(
                "service.timeout_secs must be non-zero".into(),
            ));
        }
        if let Some(ext) = self
            .uploads
            .allowed_extensions
            .iter()
            .find(|e| !e.starts_with('.') || e.len() < 2)
        {
            return Err(ConfigError::Validation(format!(
                "uploads.allowed_extensions entries must look like \".jpg\", got {ext:?}"
            )));
        }
        if self.uploads.hero_folder.trim().is_empty() {
            return Err(ConfigError::Validation(
                "uploads.hero_folder must not be empty".into(),
            ));
        }
        if self.carousel.interval_ms == 0 {
            return Err(ConfigError::Validation(
                "carousel.interval_ms must be non-zero".into(),
            ));
        }
        Ok(())
    }
}

/// Collaborator endpoints.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ServiceConfig {
    /// Gallery Service endpoint (GET / POST / DELETE).
    pub gallery_api: String,
    /// Upload signature endpoint.
    pub signature_api: String,
    /// Media host API base; `/{cloud}/image/upload` is appended.
    pub upload_host: String,
    /// Per-request timeout.
    pub timeout_secs: u64,
}

impl ServiceConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            gallery_api: "http://localhost:3000/api/event-photos".to_string(),
            signature_api: "http://localhost:3000/api/upload-signature".to_string(),
            upload_host: "https://api.cloudinary.com/v1_1".to_string(),
            timeout_secs: 30,
        }
    }
}

/// Upload allow-list and media host folders.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct UploadsConfig {
    /// Accepted file name suffixes (compared case-insensitively).
    pub allowed_extensions: Vec<String>,
    /// Media host folder prefix for event images.
    pub event_folder_prefix: String,
    /// Media host folder for hero images.
    pub hero_folder: String,
}

impl UploadsConfig {
    /// Media host folder for an event's images.
    pub fn event_folder(&self, key: &str) -> String {
        let prefix = self.event_folder_prefix.trim_matches('/');
        if prefix.is_empty() {
            key.to_string()
        } else {
            format!("{prefix}/{key}")
        }
    }
}

impl Default for UploadsConfig {
    fn default() -> Self {
        Self {
            allowed_extensions: [".webp", ".jpg", ".jpeg", ".png"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
            event_folder_prefix: "events".to_string(),
            hero_folder: "hero_slider".to_string(),
        }
    }
}

/// Local admin gate credentials.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AdminConfig {
    pub username: String,
    /// Hex SHA-256 of the admin password. Empty disables admin commands.
    pub password_sha256: String,
}

impl Default for AdminConfig {
    fn default() -> Self {
        Self {
            username: "admin".to_string(),
            password_sha256: String::new(),
        }
    }
}

/// Hero carousel timing.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CarouselConfig {
    /// Auto-advance interval in milliseconds.
    pub interval_ms: u64,
}

impl Default for CarouselConfig {
    fn default() -> Self {
        Self { interval_ms: 4500 }
    }
}

// =============================================================================
// Config loading, merging, and validation
// =============================================================================

/// Returns the stock default config as a `toml::Value::Table`.
///
/// This is the canonical representation of all default values, used as the
/// base layer for merging user overrides on top.
pub fn stock_defaults_value() -> Result<toml::Value, ConfigError> {
    toml::Value::try_from(GalleryConfig::default())
        .map_err(|e| ConfigError::Validation(format!("default config must serialize: {e}")))
}

/// Recursively merge `overlay` on top of `base`.
///
/// - Tables are merged key-by-key (overlay keys override base keys).
/// - Non-table values in overlay replace base values entirely.
/// - Keys in base that are not in overlay are preserved.
pub fn merge_toml(base: toml::Value, overlay: toml::Value) -> toml::Value {
    match (base, overlay) {
        (toml::Value::Table(mut base_table), toml::Value::Table(overlay_table)) => {
            for (key, overlay_val) in overlay_table {
                let merged = match base_table.remove(&key) {
                    Some(base_val) => merge_toml(base_val, overlay_val),
                    None => overlay_val,
                };
                base_table.insert(key, merged);
            }
            toml::Value::Table(base_table)
        }
        (_, overlay) => overlay,
    }
}

/// Load a `config.toml` from a directory as a raw TOML value.
///
/// Returns `Ok(None)` if no `config.toml` exists in the directory.
/// Returns `Err` if the file exists but contains invalid TOML.
pub fn load_raw_config(path: &Path) -> Result<Option<toml::Value>, ConfigError> {
    let config_path = path.join("config.toml");
    if !config_path.exists() {
        return Ok(None);
    }
    let content = fs::read_to_string(&config_path)?;
    let value: toml::Value = toml::from_str(&content)?;
    Ok(Some(value))
}

/// Merge an optional overlay onto a base value, then deserialize and validate.
pub fn resolve_config(
    base: toml::Value,
    overlay: Option<toml::Value>,
) -> Result<GalleryConfig, ConfigError> {
    let merged = match overlay {
        Some(ov) => merge_toml(base, ov),
        None => base,
    };
    let config: GalleryConfig = merged.try_into()?;
    config.validate()?;
    Ok(config)
}

/// Load config from `config.toml` in the given directory.
///
/// Merges user values on top of stock defaults, rejects unknown keys,
/// and validates the result.
pub fn load_config(root: &Path) -> Result<GalleryConfig, ConfigError> {
    let base = stock_defaults_value()?;
    let overlay = load_raw_config(root)?;
    resolve_config(base, overlay)
}

/// Returns a fully-commented stock `config.toml` with all keys and explanations.
///
/// Used by the `gen-config` CLI command.
pub fn stock_config_toml() -> &'static str {
    r##"# Event Gallery Configuration
# ===========================
# All settings are optional. Remove or comment out any you don't need.
# Values shown below are the defaults.
#
# Unknown keys will cause an error.

# ---------------------------------------------------------------------------
# Collaborator endpoints
# ---------------------------------------------------------------------------
[service]
# Gallery Service: GET returns the gallery, POST/DELETE mutate it.
gallery_api = "http://localhost:3000/api/event-photos"

# Mints short-lived upload signatures for a media host folder.
signature_api = "http://localhost:3000/api/upload-signature"

# Media host API base. Uploads go to <upload_host>/<cloud>/image/upload.
upload_host = "https://api.cloudinary.com/v1_1"

# Per-request timeout in seconds.
timeout_secs = 30

# ---------------------------------------------------------------------------
# Uploads
# ---------------------------------------------------------------------------
[uploads]
# File name suffixes accepted for gallery images (case-insensitive).
# Files with a known non-image MIME type are rejected regardless.
allowed_extensions = [".webp", ".jpg", ".jpeg", ".png"]

# Event images are stored under <event_folder_prefix>/<folder key>.
event_folder_prefix = "events"

# Hero (home page carousel) images are stored here.
hero_folder = "hero_slider"

# ---------------------------------------------------------------------------
# Admin gate
# ---------------------------------------------------------------------------
[admin]
username = "admin"

# Hex SHA-256 of the admin password, e.g. from `printf %s 'pw' | sha256sum`.
# Leave empty to disable every command that changes the gallery.
password_sha256 = ""

# ---------------------------------------------------------------------------
# Hero carousel
# ---------------------------------------------------------------------------
[carousel]
# Auto-advance interval in milliseconds (only with two or more slides).
interval_ms = 4500
"##
}
