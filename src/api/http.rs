//! HTTP capability for Finolog REST calls
//!
//! The core only needs something that can execute one request and hand back
//! the status and body. [`ReqwestClient`] is the production implementation;
//! tests substitute their own [`HttpSend`].

use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;
use url::Url;

use super::error::{Error, Result};

/// Maximum length of response body to log (to avoid logging sensitive data)
const MAX_LOG_BODY_LENGTH: usize = 200;

/// Header carrying the static per-session API token
pub const TOKEN_HEADER: &str = "Api-Token";

/// Sanitize response body for logging
/// Truncates long responses and strips control characters
pub(crate) fn sanitize_for_log(body: &str) -> String {
    let truncated = if body.len() > MAX_LOG_BODY_LENGTH {
        let mut end = MAX_LOG_BODY_LENGTH;
        while !body.is_char_boundary(end) {
            end -= 1;
        }
        format!("{}... [truncated, {} bytes total]", &body[..end], body.len())
    } else {
        body.to_string()
    };

    truncated.replace(|c: char| c.is_control(), "")
}

/// HTTP method accepted by the service
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Get,
    Post,
    Put,
    Delete,
}

impl Method {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Get => "GET",
            Self::Post => "POST",
            Self::Put => "PUT",
            Self::Delete => "DELETE",
        }
    }
}

impl std::fmt::Display for Method {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A request described as plain data
#[derive(Debug, Clone, PartialEq)]
pub struct HttpRequest {
    pub method: Method,
    /// Absolute path on the service, already prefixed
    pub path: String,
    pub query: Vec<(String, String)>,
    /// Serialized JSON body
    pub body: Option<String>,
}

/// A response described as plain data
#[derive(Debug, Clone, PartialEq)]
pub struct HttpResponse {
    pub status: u16,
    pub body: String,
}

impl HttpResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Something that can execute one HTTP round trip
///
/// Non-success statuses are not errors at this layer; only network-level
/// failures (connect, timeout, cancellation) are.
#[async_trait]
pub trait HttpSend: Send + Sync {
    async fn execute(&self, request: HttpRequest) -> Result<HttpResponse>;
}

/// Append query pairs to a URL, percent-encoding keys and values
pub fn add_query_params(url: &str, query: &[(String, String)]) -> String {
    if query.is_empty() {
        return url.to_string();
    }

    let parts: Vec<String> = query
        .iter()
        .map(|(k, v)| format!("{}={}", urlencoding::encode(k), urlencoding::encode(v)))
        .collect();

    if url.contains('?') {
        format!("{}&{}", url, parts.join("&"))
    } else {
        format!("{}?{}", url, parts.join("&"))
    }
}

/// reqwest-backed HTTP capability
#[derive(Clone)]
pub struct ReqwestClient {
    client: Client,
    base_url: Url,
    token: String,
}

impl ReqwestClient {
    /// Create a new HTTP client for `base_url`, authenticating with `token`
    pub fn new(base_url: &str, token: &str, user_agent: &str, timeout: Duration) -> Result<Self> {
        let base_url = Url::parse(base_url).map_err(|source| Error::InvalidUrl {
            url: base_url.to_string(),
            source,
        })?;

        let client = Client::builder()
            .user_agent(user_agent)
            .timeout(timeout)
            .build()?;

        Ok(Self {
            client,
            base_url,
            token: token.to_string(),
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    fn url_for(&self, path: &str) -> Result<String> {
        let url = self
            .base_url
            .join(path)
            .map_err(|source| Error::InvalidUrl {
                url: path.to_string(),
                source,
            })?;
        Ok(url.to_string())
    }
}

#[async_trait]
impl HttpSend for ReqwestClient {
    async fn execute(&self, request: HttpRequest) -> Result<HttpResponse> {
        let url = add_query_params(&self.url_for(&request.path)?, &request.query);
        tracing::debug!("{} {}", request.method, url);

        let mut builder = match request.method {
            Method::Get => self.client.get(&url),
            Method::Post => self.client.post(&url),
            Method::Put => self.client.put(&url),
            Method::Delete => self.client.delete(&url),
        }
        .header(TOKEN_HEADER, &self.token);

        if let Some(body) = request.body {
            builder = builder
                .header(reqwest::header::CONTENT_TYPE, "application/json")
                .body(body);
        }

        let response = builder.send().await?;
        let status = response.status().as_u16();
        let body = response.text().await?;

        if !(200..300).contains(&status) {
            // Only log sanitized/truncated error body
            tracing::error!("API error: {} - {}", status, sanitize_for_log(&body));
        }

        Ok(HttpResponse { status, body })
    }
}
