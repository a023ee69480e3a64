//! HTTP object-store backend
//!
//! `POST {endpoint}/containers/{destination}/objects?name={basename}` with the
//! file bytes as the body and a bearer token; the response carries the
//! created object's id as `{"id": "..."}`.

use super::auth::{RefreshSettings, TokenCache};
use super::{object_name, Authorizer, TransferClient};
use crate::error::TransferError;
use crate::types::RemoteObjectId;
use async_trait::async_trait;
use reqwest::{Client, StatusCode, Url};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

/// Environment variable that bypasses the token cache.
pub const ACCESS_TOKEN_ENV: &str = "HASHSYNC_ACCESS_TOKEN";

const HTTP_CONNECT_TIMEOUT: Duration = Duration::from_secs(10);
const HTTP_REQUEST_TIMEOUT: Duration = Duration::from_secs(300);

#[derive(Deserialize)]
struct CreatedObject {
    id: String,
}

fn map_http_error(error: reqwest::Error) -> TransferError {
    if error.is_timeout() {
        TransferError::Network(format!("request timeout: {}", error))
    } else if error.is_connect() {
        TransferError::Network(format!("connection error: {}", error))
    } else {
        TransferError::Network(format!("HTTP error: {}", error))
    }
}

fn map_status(status: StatusCode, body: String) -> TransferError {
    match status.as_u16() {
        401 | 403 => TransferError::Unauthorized(format!("{}: {}", status, body)),
        413 | 507 => TransferError::Quota(format!("{}: {}", status, body)),
        _ => TransferError::Rejected(format!("{}: {}", status, body)),
    }
}

pub(crate) fn build_http_client() -> Result<Client, TransferError> {
    Client::builder()
        .connect_timeout(HTTP_CONNECT_TIMEOUT)
        .timeout(HTTP_REQUEST_TIMEOUT)
        .build()
        .map_err(|e| TransferError::Network(format!("failed to create HTTP client: {}", e)))
}

pub struct HttpBackend {
    client: Client,
    endpoint: String,
    access_token: String,
}

impl HttpBackend {
    pub fn new(client: Client, endpoint: String, access_token: String) -> Self {
        Self {
            client,
            endpoint: endpoint.trim_end_matches('/').to_string(),
            access_token,
        }
    }

    /// `{endpoint}/containers/{destination}/objects`, with `destination`
    /// percent-encoded as a single path segment.
    fn objects_url(&self, destination: &str) -> Result<Url, TransferError> {
        let mut url = Url::parse(&self.endpoint).map_err(|e| {
            TransferError::Rejected(format!("invalid endpoint {:?}: {}", self.endpoint, e))
        })?;
        url.path_segments_mut()
            .map_err(|_| {
                TransferError::Rejected(format!("endpoint {:?} cannot carry a path", self.endpoint))
            })?
            .pop_if_empty()
            .extend(["containers", destination, "objects"]);
        Ok(url)
    }
}

#[async_trait]
impl TransferClient for HttpBackend {
    async fn upload(
        &self,
        local_path: &Path,
        destination: &str,
    ) -> Result<RemoteObjectId, TransferError> {
        let name = object_name(local_path)?;
        let body = tokio::fs::read(local_path).await?;

        let response = self
            .client
            .post(self.objects_url(destination)?)
            .query(&[("name", name.as_str())])
            .bearer_auth(&self.access_token)
            .header("Content-Type", "application/octet-stream")
            .body(body)
            .send()
            .await
            .map_err(map_http_error)?;

        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(map_status(status, body));
        }

        let created: CreatedObject = response
            .json()
            .await
            .map_err(|e| TransferError::Rejected(format!("unexpected upload response: {}", e)))?;
        Ok(RemoteObjectId(created.id))
    }

    fn backend_name(&self) -> &str {
        "http"
    }
}

/// Resolves a bearer token (env override, then token cache) and builds an
/// [`HttpBackend`].
pub struct HttpAuthorizer {
    endpoint: String,
    cache: TokenCache,
}

impl HttpAuthorizer {
    pub fn new(endpoint: String, token_path: PathBuf, refresh: Option<RefreshSettings>) -> Self {
        Self {
            endpoint,
            cache: TokenCache::new(token_path, refresh),
        }
    }
}

#[async_trait]
impl Authorizer for HttpAuthorizer {
    async fn authorize(&self) -> Result<Arc<dyn TransferClient>, TransferError> {
        let client = build_http_client()?;
        let token = match std::env::var(ACCESS_TOKEN_ENV) {
            Ok(token) if !token.trim().is_empty() => token,
            _ => {
                let now = chrono::Utc::now().timestamp();
                self.cache.access_token(&client, now).await?
            }
        };
        Ok(Arc::new(HttpBackend::new(
            client,
            self.endpoint.clone(),
            token,
        )))
    }
}
