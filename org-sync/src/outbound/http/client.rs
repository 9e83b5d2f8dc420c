//! Reqwest-backed organization API adapter.
//!
//! This adapter owns transport details only: bearer authentication, timeout
//! and HTTP error mapping, and JSON decoding. Mapping into domain entities
//! happens in the store.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, Method, StatusCode};
use serde_json::{Map, Value};
use url::Url;

use super::token::AccessTokenSource;
use crate::domain::ports::{OrganizationApi, OrganizationApiError};

/// Errors raised while building the HTTP adapter.
#[derive(Debug, thiserror::Error)]
pub enum HttpClientBuildError {
    /// The configured base URL does not parse.
    #[error("invalid api base url {url:?}: {source}")]
    InvalidBaseUrl {
        /// Rejected URL.
        url: String,
        /// Parser failure.
        source: url::ParseError,
    },
    /// The reqwest client could not be constructed.
    #[error("failed to build http client: {0}")]
    Client(#[from] reqwest::Error),
}

/// Organization API adapter issuing JSON requests against one base URL.
pub struct HttpOrganizationApi {
    client: Client,
    base_url: String,
    tokens: Arc<dyn AccessTokenSource>,
}

impl HttpOrganizationApi {
    /// Build an adapter with an explicit per-request timeout.
    ///
    /// # Errors
    ///
    /// Returns an error when `base_url` is not a valid absolute URL or the
    /// reqwest client cannot be constructed.
    pub fn new(
        base_url: &str,
        timeout: Duration,
        tokens: Arc<dyn AccessTokenSource>,
    ) -> Result<Self, HttpClientBuildError> {
        let trimmed = base_url.trim().trim_end_matches('/');
        Url::parse(trimmed).map_err(|source| HttpClientBuildError::InvalidBaseUrl {
            url: base_url.to_owned(),
            source,
        })?;
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            base_url: trimmed.to_owned(),
            tokens,
        })
    }

    fn url_for(&self, path: &str) -> String {
        join_url(&self.base_url, path)
    }

    async fn send(
        &self,
        method: Method,
        path: &str,
        body: Option<&Map<String, Value>>,
    ) -> Result<Value, OrganizationApiError> {
        let token = self
            .tokens
            .access_token()
            .ok_or_else(|| OrganizationApiError::unauthorized("no access token available"))?;

        let mut request = self
            .client
            .request(method, self.url_for(path))
            .bearer_auth(token.as_str())
            .header(reqwest::header::ACCEPT, "application/json");
        if let Some(body) = body {
            request = request.json(body);
        }

        let response = request.send().await.map_err(map_transport_error)?;
        let status = response.status();
        let bytes = response.bytes().await.map_err(map_transport_error)?;
        if !status.is_success() {
            return Err(map_status_error(status, bytes.as_ref()));
        }
        parse_body(status, bytes.as_ref())
    }
}

#[async_trait]
impl OrganizationApi for HttpOrganizationApi {
    async fn get(&self, path: &str) -> Result<Value, OrganizationApiError> {
        self.send(Method::GET, path, None).await
    }

    async fn post(
        &self,
        path: &str,
        body: &Map<String, Value>,
    ) -> Result<Value, OrganizationApiError> {
        self.send(Method::POST, path, Some(body)).await
    }

    async fn patch(
        &self,
        path: &str,
        body: &Map<String, Value>,
    ) -> Result<Value, OrganizationApiError> {
        self.send(Method::PATCH, path, Some(body)).await
    }

    async fn delete(&self, path: &str) -> Result<(), OrganizationApiError> {
        self.send(Method::DELETE, path, None).await.map(|_| ())
    }
}

fn join_url(base_url: &str, path: &str) -> String {
    if path.starts_with('/') {
        format!("{base_url}{path}")
    } else {
        format!("{base_url}/{path}")
    }
}

fn parse_body(status: StatusCode, body: &[u8]) -> Result<Value, OrganizationApiError> {
    if status == StatusCode::NO_CONTENT || body.iter().all(u8::is_ascii_whitespace) {
        return Ok(Value::Null);
    }
    serde_json::from_slice(body).map_err(|error| {
        OrganizationApiError::decode(format!("invalid JSON payload: {error}"))
    })
}

fn map_transport_error(error: reqwest::Error) -> OrganizationApiError {
    if error.is_timeout() {
        OrganizationApiError::timeout(error.to_string())
    } else {
        OrganizationApiError::transport(error.to_string())
    }
}

fn map_status_error(status: StatusCode, body: &[u8]) -> OrganizationApiError {
    let message = error_message(status, body);
    match status {
        StatusCode::UNAUTHORIZED => OrganizationApiError::unauthorized(message),
        StatusCode::REQUEST_TIMEOUT | StatusCode::GATEWAY_TIMEOUT => {
            OrganizationApiError::timeout(message)
        }
        _ => OrganizationApiError::status(status.as_u16(), message),
    }
}

/// Extract a human-readable message from an error body.
///
/// Looks at `detail`, then `message`, then a bare JSON string, then
/// `non_field_errors`, then the raw body, and finally the status code.
fn error_message(status: StatusCode, body: &[u8]) -> String {
    let parsed = serde_json::from_slice::<Value>(body).ok();
    let extracted = parsed.as_ref().and_then(|value| match value {
        Value::String(text) => Some(text.clone()),
        Value::Object(fields) => ["detail", "message"]
            .into_iter()
            .find_map(|key| fields.get(key).and_then(Value::as_str).map(str::to_owned))
            .or_else(|| fields.get("non_field_errors").map(join_messages)),
        _ => None,
    });

    extracted
        .filter(|message| !message.trim().is_empty())
        .unwrap_or_else(|| {
            let preview = body_preview(body);
            if preview.is_empty() {
                format!("status {}", status.as_u16())
            } else {
                preview
            }
        })
}

fn join_messages(value: &Value) -> String {
    match value {
        Value::Array(items) => items
            .iter()
            .map(|item| match item {
                Value::String(text) => text.clone(),
                other => other.to_string(),
            })
            .collect::<Vec<_>>()
            .join(", "),
        Value::String(text) => text.clone(),
        other => other.to_string(),
    }
}

fn body_preview(body: &[u8]) -> String {
    const PREVIEW_CHAR_LIMIT: usize = 160;

    let compact = String::from_utf8_lossy(body)
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ");
    let preview = compact.chars().take(PREVIEW_CHAR_LIMIT).collect::<String>();
    if compact.chars().count() > PREVIEW_CHAR_LIMIT {
        format!("{preview}...")
    } else {
        preview
    }
}
