//! Admin authorization.
//!
//! The admin workflow never reads ambient login state. It is handed an
//! [`Authorizer`] and asks it before every mutation. Real deployments plug
//! in whatever session mechanism fronts the Gallery Service; the CLI uses
//! [`CredentialGate`], a local check of a username and password against
//! the `[admin]` config table.
//!
//! `CredentialGate` only keeps honest admins from fat-fingering the wrong
//! command. It is not a security boundary: whoever can run the binary can
//! read the config. The service must still enforce its own access control.

use crate::config::AdminConfig;
use sha2::{Digest, Sha256};
use thiserror::Error;

#[derive(Error, Debug, PartialEq, Eq)]
pub enum AuthError {
    #[error("Invalid username or password")]
    InvalidCredentials,
    #[error("Admin login is not configured (set admin.password_sha256)")]
    NotConfigured,
}

/// Capability answering "may the caller mutate the gallery right now?".
pub trait Authorizer {
    fn is_authorized(&self) -> bool;
}

impl<F: Fn() -> bool> Authorizer for F {
    fn is_authorized(&self) -> bool {
        self()
    }
}

/// Proof of a successful [`CredentialGate::login`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    username: String,
}

impl Session {
    pub fn username(&self) -> &str {
        &self.username
    }
}

impl Authorizer for Session {
    fn is_authorized(&self) -> bool {
        true
    }
}

/// An authorizer that refuses everything; used before login.
#[derive(Debug, Clone, Copy, Default)]
pub struct Anonymous;

impl Authorizer for Anonymous {
    fn is_authorized(&self) -> bool {
        false
    }
}

/// Username + SHA-256 password check against configured values.
#[derive(Debug, Clone)]
pub struct CredentialGate {
    username: String,
    password_sha256: String,
}

impl CredentialGate {
    pub fn from_config(config: &AdminConfig) -> Self {
        Self {
            username: config.username.clone(),
            password_sha256: config.password_sha256.trim().to_lowercase(),
        }
    }

    /// Check credentials. An unset password hash keeps the gate closed.
    pub fn login(&self, username: &str, password: &str) -> Result<Session, AuthError> {
        if self.password_sha256.is_empty() {
            return Err(AuthError::NotConfigured);
        }
        if username != self.username || password_digest(password) != self.password_sha256 {
            tracing::warn!(username, "Rejected admin login");
            return Err(AuthError::InvalidCredentials);
        }
        Ok(Session {
            username: username.to_string(),
        })
    }
}

/// Lowercase hex SHA-256 of a password, the form stored in config.
pub fn password_digest(password: &str) -> String {
    format!("{:x}", Sha256::digest(password.as_bytes()))
}
