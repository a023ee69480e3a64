//! Token cache for the HTTP backend.
//!
//! Credentials live in a small JSON file. An expired access token is
//! exchanged through a refresh-token grant when a token endpoint is
//! configured, and the refreshed credentials are written back atomically.
//! There is no interactive consent flow: a missing or unusable token is an
//! authorization failure.

use crate::error::TransferError;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Seconds of slack before `expires_at` at which a token counts as expired.
const EXPIRY_SKEW_SECS: i64 = 60;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credentials {
    pub access_token: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub refresh_token: Option<String>,
    /// Unix timestamp (seconds). `None` means the token does not expire.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expires_at: Option<i64>,
}

impl Credentials {
    pub fn is_expired(&self, now: i64) -> bool {
        match self.expires_at {
            Some(expires_at) => now + EXPIRY_SKEW_SECS >= expires_at,
            None => false,
        }
    }
}

/// Refresh-token grant settings.
#[derive(Debug, Clone)]
pub struct RefreshSettings {
    pub token_endpoint: String,
    pub client_id: Option<String>,
}

#[derive(Deserialize)]
struct RefreshResponse {
    access_token: String,
    #[serde(default)]
    refresh_token: Option<String>,
    #[serde(default)]
    expires_in: Option<i64>,
}

pub struct TokenCache {
    path: PathBuf,
    refresh: Option<RefreshSettings>,
}

impl TokenCache {
    pub fn new(path: PathBuf, refresh: Option<RefreshSettings>) -> Self {
        Self { path, refresh }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Sibling file written before the rename in [`TokenCache::save`].
    pub fn temp_path(&self) -> PathBuf {
        let mut name = self.path.as_os_str().to_owned();
        name.push(".tmp");
        PathBuf::from(name)
    }

    /// Read cached credentials; `Ok(None)` when no cache file exists.
    pub fn load(&self) -> Result<Option<Credentials>, TransferError> {
        let text = match fs::read_to_string(&self.path) {
            Ok(text) => text,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(TransferError::Io(e)),
        };
        let credentials = serde_json::from_str(&text).map_err(|e| {
            TransferError::Unauthorized(format!(
                "token cache {} is unreadable: {}",
                self.path.display(),
                e
            ))
        })?;
        Ok(Some(credentials))
    }

    /// Persist credentials via temp file and rename.
    pub fn save(&self, credentials: &Credentials) -> Result<(), TransferError> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        let serialized = serde_json::to_vec_pretty(credentials)
            .map_err(|e| TransferError::Io(std::io::Error::new(ErrorKind::InvalidData, e)))?;
        let temp_path = self.temp_path();
        fs::write(&temp_path, serialized)?;
        fs::rename(&temp_path, &self.path).map_err(|e| {
            let _ = fs::remove_file(&temp_path);
            TransferError::Io(e)
        })?;
        Ok(())
    }

    /// Return a usable access token, refreshing it if needed.
    pub async fn access_token(&self, http: &Client, now: i64) -> Result<String, TransferError> {
        let credentials = self.load()?.ok_or_else(|| {
            TransferError::Unauthorized(format!(
                "no cached token at {}; provision one or set {}",
                self.path.display(),
                super::http::ACCESS_TOKEN_ENV
            ))
        })?;

        if !credentials.is_expired(now) {
            debug!(path = %self.path.display(), "Using cached access token");
            return Ok(credentials.access_token);
        }

        let refresh_token = credentials.refresh_token.clone().ok_or_else(|| {
            TransferError::Unauthorized("access token expired and no refresh token is cached".to_string())
        })?;
        let settings = self.refresh.as_ref().ok_or_else(|| {
            TransferError::Unauthorized(
                "access token expired and no token endpoint is configured".to_string(),
            )
        })?;

        let refreshed = refresh(http, settings, &refresh_token, now).await?;
        let refreshed = Credentials {
            refresh_token: refreshed.refresh_token.or(Some(refresh_token)),
            ..refreshed
        };
        self.save(&refreshed)?;
        info!(path = %self.path.display(), "Refreshed access token");
        Ok(refreshed.access_token)
    }
}

async fn refresh(
    http: &Client,
    settings: &RefreshSettings,
    refresh_token: &str,
    now: i64,
) -> Result<Credentials, TransferError> {
    let mut form = vec![
        ("grant_type", "refresh_token"),
        ("refresh_token", refresh_token),
    ];
    if let Some(client_id) = settings.client_id.as_deref() {
        form.push(("client_id", client_id));
    }

    let response = http
        .post(&settings.token_endpoint)
        .form(&form)
        .send()
        .await
        .map_err(|e| TransferError::Network(format!("token refresh failed: {}", e)))?;

    if !response.status().is_success() {
        let status = response.status();
        let body = response
            .text()
            .await
            .unwrap_or_else(|_| "Unknown error".to_string());
        return Err(TransferError::Unauthorized(format!(
            "token refresh rejected ({}): {}",
            status, body
        )));
    }

    let body: RefreshResponse = response
        .json()
        .await
        .map_err(|e| TransferError::Unauthorized(format!("invalid token response: {}", e)))?;

    Ok(Credentials {
        access_token: body.access_token,
        refresh_token: body.refresh_token,
        expires_at: body.expires_in.map(|secs| now + secs),
    })
}
