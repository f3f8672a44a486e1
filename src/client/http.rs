//! `reqwest` implementation of [`RestClient`].

use std::time::Duration;

use reqwest::Method;
use reqwest::header::{CONTENT_TYPE, HeaderValue};
use serde_json::Value;

use super::{ApiResponse, ApiToken, ClientError, ClientFuture, RestClient};

/// Versioned base URL of the DigitalOcean API.
pub const DEFAULT_API_BASE_URL: &str = "https://api.digitalocean.com/v2";

const JSON_CONTENT_TYPE: &str = "application/json";

/// HTTP client bound to one base URL and one bearer credential.
#[derive(Clone, Debug)]
pub struct HttpClient {
    inner: reqwest::Client,
    base_url: String,
    token: ApiToken,
}

impl HttpClient {
    /// Builds a client for `base_url` that authenticates with `token`.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::Build`] when the TLS backend or client
    /// configuration cannot be initialised.
    pub fn new(
        base_url: impl Into<String>,
        token: ApiToken,
        timeout: Duration,
    ) -> Result<Self, ClientError> {
        let inner = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|err| ClientError::Build(err.to_string()))?;
        let raw_base = base_url.into();
        Ok(Self {
            inner,
            base_url: raw_base.trim_end_matches('/').to_owned(),
            token,
        })
    }

    /// Joins `path` onto the base URL, ignoring a leading slash.
    #[must_use]
    pub fn url_for(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    async fn send(
        &self,
        method: Method,
        path: &str,
        body: Option<&Value>,
    ) -> Result<ApiResponse, ClientError> {
        let url = self.url_for(path);
        tracing::debug!(%method, %url, "sending request");

        let mut request = self
            .inner
            .request(method, &url)
            .bearer_auth(self.token.expose())
            .header(CONTENT_TYPE, HeaderValue::from_static(JSON_CONTENT_TYPE));
        if let Some(payload) = body {
            request = request.body(payload.to_string());
        }

        let response = request.send().await.map_err(|err| ClientError::Transport {
            path: path.to_owned(),
            message: err.to_string(),
        })?;
        let status = response.status().as_u16();
        let bytes = response
            .bytes()
            .await
            .map_err(|err| ClientError::Transport {
                path: path.to_owned(),
                message: err.to_string(),
            })?;

        tracing::debug!(status, %url, "received response");
        Ok(ApiResponse {
            status,
            body: serde_json::from_slice(&bytes).ok(),
        })
    }
}

impl RestClient for HttpClient {
    fn get<'a>(&'a self, path: &'a str) -> ClientFuture<'a> {
        Box::pin(self.send(Method::GET, path, None))
    }

    fn post<'a>(&'a self, path: &'a str, body: &'a Value) -> ClientFuture<'a> {
        Box::pin(self.send(Method::POST, path, Some(body)))
    }

    fn delete<'a>(&'a self, path: &'a str) -> ClientFuture<'a> {
        Box::pin(self.send(Method::DELETE, path, None))
    }
}
