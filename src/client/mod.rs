//! REST client abstraction for the provisioning API.
//!
//! The reconciliation engine only ever talks to the provider through
//! [`RestClient`], which keeps the state machine testable with scripted
//! responses and keeps transport details in [`HttpClient`].

mod http;

use std::fmt;
use std::future::Future;
use std::pin::Pin;

use serde_json::Value;
use thiserror::Error;

pub use http::{DEFAULT_API_BASE_URL, HttpClient};

/// Future returned by client operations.
pub type ClientFuture<'a> = Pin<Box<dyn Future<Output = Result<ApiResponse, ClientError>> + Send + 'a>>;

/// Raw response from the provider: status plus the decoded JSON body.
///
/// A body that is empty or not valid JSON is represented as `None` rather
/// than an error; callers inspect [`ApiResponse::status`] separately.
#[derive(Clone, Debug, PartialEq)]
pub struct ApiResponse {
    /// HTTP status code.
    pub status: u16,
    /// Decoded JSON payload, when there was one.
    pub body: Option<Value>,
}

impl ApiResponse {
    /// Creates a response from a status code and optional body.
    #[must_use]
    pub const fn new(status: u16, body: Option<Value>) -> Self {
        Self { status, body }
    }

    /// Returns true for 2xx statuses.
    #[must_use]
    pub const fn is_success(&self) -> bool {
        self.status >= 200 && self.status < 300
    }

    /// Returns true when the provider reported the resource as missing.
    #[must_use]
    pub const fn is_not_found(&self) -> bool {
        self.status == 404
    }

    /// Returns the provider's `message` field when the body is error-shaped.
    #[must_use]
    pub fn error_message(&self) -> Option<&str> {
        self.body
            .as_ref()
            .and_then(|body| body.get("message"))
            .and_then(Value::as_str)
    }

    /// Returns the top-level field `key` of the body.
    #[must_use]
    pub fn field(&self, key: &str) -> Option<&Value> {
        self.body.as_ref().and_then(|body| body.get(key))
    }
}

/// Bearer credential sent with every request.
///
/// The value never appears in `Debug` output.
#[derive(Clone, Eq, PartialEq)]
pub struct ApiToken(String);

impl ApiToken {
    /// Wraps a raw token.
    #[must_use]
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// Returns the raw token for use in the authorization header.
    #[must_use]
    pub fn expose(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Debug for ApiToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("ApiToken(***)")
    }
}

/// Errors raised before a response could be obtained.
#[derive(Clone, Debug, Error, Eq, PartialEq)]
pub enum ClientError {
    /// Raised when the underlying HTTP client cannot be constructed.
    #[error("failed to build HTTP client: {0}")]
    Build(String),
    /// Raised when a request could not be sent or its body not read.
    #[error("request to {path} failed: {message}")]
    Transport {
        /// Path relative to the API base URL.
        path: String,
        /// Transport error message.
        message: String,
    },
}

/// Minimal REST surface used by the reconciliation engine.
///
/// Paths are relative to a versioned base URL. Implementations must not
/// retry; a failed call surfaces its status and body unchanged.
pub trait RestClient: Send + Sync {
    /// Issues a `GET` request.
    fn get<'a>(&'a self, path: &'a str) -> ClientFuture<'a>;

    /// Issues a `POST` request with a JSON body.
    fn post<'a>(&'a self, path: &'a str, body: &'a Value) -> ClientFuture<'a>;

    /// Issues a `DELETE` request.
    fn delete<'a>(&'a self, path: &'a str) -> ClientFuture<'a>;
}

impl<T: RestClient + ?Sized> RestClient for &T {
    fn get<'a>(&'a self, path: &'a str) -> ClientFuture<'a> {
        (**self).get(path)
    }

    fn post<'a>(&'a self, path: &'a str, body: &'a Value) -> ClientFuture<'a> {
        (**self).post(path, body)
    }

    fn delete<'a>(&'a self, path: &'a str) -> ClientFuture<'a> {
        (**self).delete(path)
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn error_message_reads_provider_message() {
        let response = ApiResponse::new(
            422,
            Some(json!({"id": "unprocessable_entity", "message": "Name is invalid"})),
        );
        assert_eq!(response.error_message(), Some("Name is invalid"));
        assert!(!response.is_success());
    }

    #[test]
    fn error_message_absent_without_body() {
        let response = ApiResponse::new(204, None);
        assert_eq!(response.error_message(), None);
        assert!(response.is_success());
    }

    #[test]
    fn api_token_debug_is_redacted() {
        let token = ApiToken::new("dop_v1_secret");
        let rendered = format!("{token:?}");
        assert!(!rendered.contains("secret"), "token leaked: {rendered}");
        assert_eq!(token.expose(), "dop_v1_secret");
    }
}
