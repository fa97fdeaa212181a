//! Business-scoped transport
//!
//! Wraps an [`HttpSend`] capability with the fixed `/v1/biz/{id}` prefix and
//! turns responses into JSON or a typed error.

use serde_json::Value;
use std::sync::Arc;

use super::error::{Error, Result};
use super::http::{HttpRequest, HttpSend, Method};

/// Transport bound to one business account
#[derive(Clone)]
pub struct Transport {
    biz_id: i64,
    prefix: String,
    http: Arc<dyn HttpSend>,
}

impl std::fmt::Debug for Transport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Transport")
            .field("prefix", &self.prefix)
            .finish_non_exhaustive()
    }
}

impl Transport {
    pub fn new(biz_id: i64, http: Arc<dyn HttpSend>) -> Self {
        Self {
            biz_id,
            prefix: format!("/v1/biz/{}", biz_id),
            http,
        }
    }

    pub fn biz_id(&self) -> i64 {
        self.biz_id
    }

    /// Path prefix prepended to every call
    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// Build the absolute path for a path relative to the business root
    pub fn url_for(&self, path: &str) -> String {
        format!("{}{}", self.prefix, path)
    }

    /// Execute one request and parse the JSON result
    ///
    /// A non-success status fails with [`Error::Remote`]; deciding whether a
    /// 404 means "not found" is left to the caller. An empty body on success
    /// yields `Value::Null`.
    pub async fn send(
        &self,
        method: Method,
        path: &str,
        query: Vec<(String, String)>,
        body: Option<&Value>,
    ) -> Result<Value> {
        let body = body.map(serde_json::to_string).transpose()?;
        let request = HttpRequest {
            method,
            path: self.url_for(path),
            query,
            body,
        };

        let response = self.http.execute(request).await?;

        if !response.is_success() {
            return Err(Error::Remote {
                status: response.status,
                body: response.body,
            });
        }

        if response.body.trim().is_empty() {
            return Ok(Value::Null);
        }

        Ok(serde_json::from_str(&response.body)?)
    }

    pub async fn get(&self, path: &str, query: Vec<(String, String)>) -> Result<Value> {
        self.send(Method::Get, path, query, None).await
    }

    pub async fn post(&self, path: &str, body: &Value) -> Result<Value> {
        self.send(Method::Post, path, Vec::new(), Some(body)).await
    }

    pub async fn put(&self, path: &str, body: &Value) -> Result<Value> {
        self.send(Method::Put, path, Vec::new(), Some(body)).await
    }

    pub async fn delete(&self, path: &str) -> Result<Value> {
        self.send(Method::Delete, path, Vec::new(), None).await
    }
}
