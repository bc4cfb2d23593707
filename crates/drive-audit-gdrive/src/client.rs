//! Drive v3 REST client.

use async_trait::async_trait;
use backon::{ExponentialBuilder, Retryable};
use serde::de::DeserializeOwned;
use std::sync::Arc;
use std::time::Duration;

use drive_audit_core::{
    ChildPage, DriveSettings, ObjectId, PermissionGrant, StoreClient, StoreError,
};

use crate::auth::TokenSource;
use crate::wire::{ErrorEnvelope, FileList, PermissionList};

/// Drive v3 API root.
pub const DRIVE_API_BASE_URL: &str = "https://www.googleapis.com/drive/v3";

/// MIME type Drive uses for folders.
pub const FOLDER_MIME_TYPE: &str = "application/vnd.google-apps.folder";

/// Fields requested from `files.list`.
const FILE_FIELDS: &str = "nextPageToken, files(id, name, mimeType)";

/// Fields requested from `permissions.list`.
const PERMISSION_FIELDS: &str =
    "nextPageToken, permissions(id, type, emailAddress, role, displayName, permissionDetails)";

/// Largest page `permissions.list` accepts.
const PERMISSION_PAGE_SIZE: u32 = 100;

/// Default delay before the first retry.
const DEFAULT_RETRY_DELAY: Duration = Duration::from_millis(500);

/// Upper bound on a server-requested `Retry-After` wait.
const MAX_RETRY_AFTER: Duration = Duration::from_secs(60);

/// Drive error reasons that signal throttling despite a 403 status.
const RATE_LIMIT_REASONS: &[&str] = &["rateLimitExceeded", "userRateLimitExceeded"];

/// [`StoreClient`] backed by the Google Drive v3 API, scoped to one shared drive.
pub struct DriveClient {
    http: reqwest::Client,
    auth: Arc<dyn TokenSource>,
    base_url: String,
    drive_id: String,
    page_size: u32,
    max_retries: usize,
    retry_delay: Duration,
}

impl DriveClient {
    /// Creates a client for the shared drive `drive_id`.
    pub fn new(drive_id: impl Into<String>, auth: Arc<dyn TokenSource>) -> Self {
        let defaults = DriveSettings::default();
        Self {
            http: reqwest::Client::new(),
            auth,
            base_url: DRIVE_API_BASE_URL.to_string(),
            drive_id: drive_id.into(),
            page_size: defaults.page_size,
            max_retries: defaults.max_retries,
            retry_delay: DEFAULT_RETRY_DELAY,
        }
    }

    /// Creates a client configured from `settings`.
    pub fn from_settings(
        drive_id: impl Into<String>,
        auth: Arc<dyn TokenSource>,
        settings: &DriveSettings,
    ) -> Self {
        let client = Self::new(drive_id, auth)
            .with_page_size(settings.page_size)
            .with_max_retries(settings.max_retries);
        match &settings.api_base_url {
            Some(url) => client.with_base_url(url.clone()),
            None => client,
        }
    }

    /// Overrides the API root (tests, proxies).
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    /// Sets the listing page size.
    pub fn with_page_size(mut self, page_size: u32) -> Self {
        self.page_size = page_size;
        self
    }

    /// Sets how many times a transient failure is retried.
    pub fn with_max_retries(mut self, max_retries: usize) -> Self {
        self.max_retries = max_retries;
        self
    }

    /// Sets the delay before the first retry; later retries back off exponentially.
    pub fn with_retry_delay(mut self, delay: Duration) -> Self {
        self.retry_delay = delay;
        self
    }

    /// GETs `url` and decodes the JSON body, retrying transient failures.
    async fn get_json<T: DeserializeOwned>(
        &self,
        url: &str,
        query: &[(&str, String)],
    ) -> Result<T, StoreError> {
        let backoff = ExponentialBuilder::default()
            .with_min_delay(self.retry_delay)
            .with_max_times(self.max_retries);

        (|| self.get_once(url, query))
            .retry(backoff)
            .when(StoreError::is_retryable)
            // A server hint replaces the computed delay but never adds attempts.
            .adjust(|err, delay| {
                delay.map(|computed| match err.retry_after() {
                    Some(hint) => hint.min(MAX_RETRY_AFTER),
                    None => computed,
                })
            })
            .notify(|err, delay| {
                tracing::warn!(url = %url, error = %err, ?delay, "Retrying Drive request");
            })
            .await
    }

    async fn get_once<T: DeserializeOwned>(
        &self,
        url: &str,
        query: &[(&str, String)],
    ) -> Result<T, StoreError> {
        let token = self.auth.access_token().await?;

        let response = self
            .http
            .get(url)
            .bearer_auth(token)
            .query(query)
            .send()
            .await
            .map_err(|e| StoreError::transport_with_source(format!("GET {url} failed"), e))?;

        let status = response.status();
        if status.is_success() {
            return response
                .json::<T>()
                .await
                .map_err(|e| StoreError::Decode(e.to_string()));
        }

        let retry_after = response
            .headers()
            .get(reqwest::header::RETRY_AFTER)
            .and_then(|value| value.to_str().ok())
            .and_then(parse_retry_after);
        let body = response.text().await.unwrap_or_default();
        Err(classify_failure(status.as_u16(), &body, retry_after))
    }

    /// Builds `{base}/{segments...}`, percent-encoding each segment.
    fn endpoint(&self, segments: &[&str]) -> Result<String, StoreError> {
        let mut url = reqwest::Url::parse(&self.base_url).map_err(|e| {
            StoreError::transport_with_source(format!("invalid API base URL {}", self.base_url), e)
        })?;
        url.path_segments_mut()
            .map_err(|()| {
                StoreError::transport(format!("API base URL {} cannot take a path", self.base_url))
            })?
            .pop_if_empty()
            .extend(segments);
        Ok(url.into())
    }
}

/// Parses a delta-seconds `Retry-After` value. HTTP dates are ignored.
fn parse_retry_after(value: &str) -> Option<Duration> {
    value.trim().parse::<u64>().ok().map(Duration::from_secs)
}

/// Maps a non-success response to a [`StoreError`].
fn classify_failure(status: u16, body: &str, retry_after: Option<Duration>) -> StoreError {
    let envelope = serde_json::from_str::<ErrorEnvelope>(body).ok();
    let message = envelope
        .as_ref()
        .map(|e| e.error.message.clone())
        .filter(|m| !m.is_empty())
        .unwrap_or_else(|| body.to_string());
    let rate_limited = envelope.as_ref().is_some_and(|e| {
        e.error
            .errors
            .iter()
            .any(|r| RATE_LIMIT_REASONS.contains(&r.reason.as_str()))
    });

    match status {
        // Drive reports per-user throttling as 403.
        429 => StoreError::RateLimited {
            message,
            retry_after,
        },
        403 if rate_limited => StoreError::RateLimited {
            message,
            retry_after,
        },
        401 | 403 => StoreError::Auth(message),
        _ => StoreError::Status { status, message },
    }
}

/// Quotes an id for use inside a Drive search query.
fn quote_query_literal(value: &str) -> String {
    value.replace('\\', "\\\\").replace('\'', "\\'")
}

#[async_trait]
impl StoreClient for DriveClient {
    async fn list_children(
        &self,
        parent: &ObjectId,
        page_token: Option<&str>,
    ) -> Result<ChildPage, StoreError> {
        let mut query = vec![
            (
                "q",
                format!(
                    "'{}' in parents and trashed = false",
                    quote_query_literal(parent.as_str())
                ),
            ),
            ("corpora", "drive".to_string()),
            ("driveId", self.drive_id.clone()),
            ("includeItemsFromAllDrives", "true".to_string()),
            ("supportsAllDrives", "true".to_string()),
            ("fields", FILE_FIELDS.to_string()),
            ("pageSize", self.page_size.to_string()),
        ];
        if let Some(token) = page_token {
            query.push(("pageToken", token.to_string()));
        }

        let list: FileList = self.get_json(&self.endpoint(&["files"])?, &query).await?;
        tracing::trace!(parent = %parent, items = list.files.len(), "Listed children page");
        Ok(list.into())
    }

    async fn list_permissions(&self, object: &ObjectId) -> Result<Vec<PermissionGrant>, StoreError> {
        let url = self.endpoint(&["files", object.as_str(), "permissions"])?;
        let mut grants = Vec::new();
        let mut page_token: Option<String> = None;

        loop {
            let mut query = vec![
                ("supportsAllDrives", "true".to_string()),
                ("fields", PERMISSION_FIELDS.to_string()),
                ("pageSize", PERMISSION_PAGE_SIZE.to_string()),
            ];
            if let Some(token) = &page_token {
                query.push(("pageToken", token.clone()));
            }

            let list: PermissionList = self.get_json(&url, &query).await?;
            grants.extend(list.permissions.into_iter().map(PermissionGrant::from));

            match list.next_page_token.filter(|t| !t.is_empty()) {
                Some(token) => page_token = Some(token),
                None => break,
            }
        }

        Ok(grants)
    }

    fn name(&self) -> &str {
        "google-drive"
    }
}
