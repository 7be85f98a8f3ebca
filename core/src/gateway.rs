//! HTTP request gateway: the single chokepoint for API calls.
//!
//! # Design
//! Each call is split into `build_request`, which resolves the path and
//! attaches headers, and `parse_response`, which classifies the result. The
//! round-trip in between goes through the injected `Transport`. The bearer
//! token is read from the `SessionStore` at build time, so a login or logout
//! is visible to the very next request without any cache to invalidate.
//!
//! Failure classification:
//! - no response at all -> `ApiError::Connectivity`
//! - non-2xx status -> `ApiError::Http { status }`, body ignored
//! - 2xx with a body that is not JSON -> `ApiError::Deserialization`
//!
//! The gateway returns the decoded body as-is. Checking the `{success, data}`
//! envelope is the caller's job.

use std::sync::Arc;

use serde::Serialize;
use serde_json::Value;
use tracing::debug;

use crate::config::Config;
use crate::error::ApiError;
use crate::http::{HttpMethod, HttpRequest, HttpResponse, Transport};
use crate::session::SessionStore;

pub const SERVER_UNREACHABLE: &str = "server unreachable";

#[derive(Clone)]
pub struct Gateway {
    base_url: String,
    session: Arc<SessionStore>,
    transport: Arc<dyn Transport>,
}

impl Gateway {
    pub fn new(config: &Config, session: Arc<SessionStore>, transport: Arc<dyn Transport>) -> Self {
        Self {
            base_url: config.base_url().to_string(),
            session,
            transport,
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn get(&self, path: &str) -> Result<Value, ApiError> {
        self.send(HttpMethod::Get, path, None)
    }

    pub fn post(&self, path: &str, body: Option<&Value>) -> Result<Value, ApiError> {
        self.send(HttpMethod::Post, path, body)
    }

    pub fn put(&self, path: &str, body: Option<&Value>) -> Result<Value, ApiError> {
        self.send(HttpMethod::Put, path, body)
    }

    pub fn delete(&self, path: &str) -> Result<Value, ApiError> {
        self.send(HttpMethod::Delete, path, None)
    }

    /// Build, execute and parse one request.
    pub fn send(
        &self,
        method: HttpMethod,
        path: &str,
        body: Option<&Value>,
    ) -> Result<Value, ApiError> {
        let request = self.build_request(method, path, body)?;
        debug!(
            %method,
            url = %request.url,
            authenticated = request.header("authorization").is_some(),
            "sending request"
        );

        let response = self.transport.execute(&request).map_err(|e| {
            debug!(%method, url = %request.url, error = %e, "no response");
            ApiError::Connectivity {
                hint: format!("{SERVER_UNREACHABLE} ({e})"),
            }
        })?;

        debug!(%method, url = %request.url, status = response.status, "response received");
        parse_response(response)
    }

    pub fn build_request(
        &self,
        method: HttpMethod,
        path: &str,
        body: Option<&Value>,
    ) -> Result<HttpRequest, ApiError> {
        let mut headers = vec![("Content-Type".to_string(), "application/json".to_string())];
        if let Some(token) = self.session.token() {
            headers.push(("Authorization".to_string(), format!("Bearer {token}")));
        }

        let body = body
            .map(serde_json::to_string)
            .transpose()
            .map_err(|e| ApiError::Serialization(e.to_string()))?;

        Ok(HttpRequest {
            method,
            url: format!("{}{path}", self.base_url),
            headers,
            body,
        })
    }
}

/// Classify a response. An empty 2xx body decodes to `Value::Null`.
pub fn parse_response(response: HttpResponse) -> Result<Value, ApiError> {
    if !response.is_success() {
        return Err(ApiError::Http {
            status: response.status,
        });
    }
    if response.body.iter().all(u8::is_ascii_whitespace) {
        return Ok(Value::Null);
    }
    serde_json::from_slice(&response.body).map_err(|e| ApiError::Deserialization(e.to_string()))
}

/// Serialize a request payload for `post` / `put`.
pub fn to_body<T: Serialize + ?Sized>(payload: &T) -> Result<Value, ApiError> {
    serde_json::to_value(payload).map_err(|e| ApiError::Serialization(e.to_string()))
}
