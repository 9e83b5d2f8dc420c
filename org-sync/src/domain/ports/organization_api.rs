//! Driven port for the organization backend REST API.
//!
//! Paths are relative to the API base (for example `/organization/roles/`).
//! Responses are returned as parsed JSON so mapping stays in the domain.

use async_trait::async_trait;
use serde_json::{Map, Value};

use super::define_port_error;
use crate::domain::{DomainError, ErrorCode};

define_port_error! {
    /// Errors surfaced while calling the organization API.
    pub enum OrganizationApiError {
        /// Network transport failed before receiving a response.
        Transport { message: String } =>
            "organization api transport failed: {message}",
        /// The request exceeded the configured timeout.
        Timeout { message: String } =>
            "organization api timeout: {message}",
        /// No access token was available, or the backend rejected it.
        Unauthorized { message: String } =>
            "organization api rejected credentials: {message}",
        /// The backend answered with a non-success status.
        Status { status: u16, message: String } =>
            "organization api returned status {status}: {message}",
        /// The response body was not valid JSON.
        Decode { message: String } =>
            "organization api response decode failed: {message}",
    }
}

impl From<OrganizationApiError> for DomainError {
    fn from(err: OrganizationApiError) -> Self {
        match err {
            OrganizationApiError::Unauthorized { message } => Self::unauthorized(message),
            OrganizationApiError::Status { status: 404, message } => Self::not_found(message),
            OrganizationApiError::Status { status, message } if (400..500).contains(&status) => {
                Self::new(ErrorCode::InvalidRequest, message)
                    .with_details(serde_json::json!({ "status": status }))
            }
            OrganizationApiError::Status { message, .. }
            | OrganizationApiError::Transport { message }
            | OrganizationApiError::Timeout { message } => Self::service_unavailable(message),
            OrganizationApiError::Decode { message } => Self::internal(message),
        }
    }
}

/// Port for authenticated JSON requests against the organization backend.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait OrganizationApi: Send + Sync {
    /// Fetch a resource or collection.
    async fn get(&self, path: &str) -> Result<Value, OrganizationApiError>;

    /// Create a resource in the collection at `path`.
    async fn post(&self, path: &str, body: &Map<String, Value>)
    -> Result<Value, OrganizationApiError>;

    /// Partially update the resource at `path`.
    async fn patch(
        &self,
        path: &str,
        body: &Map<String, Value>,
    ) -> Result<Value, OrganizationApiError>;

    /// Delete the resource at `path`.
    async fn delete(&self, path: &str) -> Result<(), OrganizationApiError>;
}
