//! Wire types: the response envelope, auth payloads and resource records.
//!
//! # Design
//! Resource records are passthrough. Only the server id (`_id`) and the
//! favorite flag are typed; every other field is kept verbatim in `fields`
//! and serialized back unchanged.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::ApiError;
use crate::session::User;

/// The `{success, data}` wrapper every endpoint responds with.
#[derive(Debug, Clone, Deserialize)]
pub struct Envelope<T> {
    #[serde(default)]
    pub success: bool,
    pub data: Option<T>,
}

impl<T: DeserializeOwned> Envelope<T> {
    /// Decode a response body into a checked envelope.
    ///
    /// Fails with `InvalidResponse` when the body is not an envelope or when
    /// `success` is not `true`.
    pub fn decode(body: Value) -> Result<Self, ApiError> {
        let envelope: Envelope<T> = serde_json::from_value(body)
            .map_err(|e| ApiError::InvalidResponse(format!("unexpected response shape: {e}")))?;
        if !envelope.success {
            return Err(ApiError::InvalidResponse(
                "request was not successful".to_string(),
            ));
        }
        Ok(envelope)
    }

    /// Decode and require `data` to be present.
    pub fn into_data(body: Value) -> Result<T, ApiError> {
        Self::decode(body)?
            .data
            .ok_or_else(|| ApiError::InvalidResponse("response has no data".to_string()))
    }
}

/// Check only the `success` flag, ignoring whatever `data` holds.
pub fn expect_success(body: Value) -> Result<(), ApiError> {
    Envelope::<Value>::decode(body).map(|_| ())
}

/// Login request body. Never persisted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

impl Credentials {
    pub fn new(email: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            password: password.into(),
        }
    }
}

/// Signup request body. Validated before it is sent.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegistrationRequest {
    pub name: String,
    pub email: String,
    pub password: String,
}

impl RegistrationRequest {
    pub fn new(
        name: impl Into<String>,
        email: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            email: email.into(),
            password: password.into(),
        }
    }
}

/// `data` of a login response. Both fields are optional on the wire so a
/// missing one is reported as an invalid response rather than a decode error.
#[derive(Debug, Clone, Deserialize)]
pub(crate) struct LoginData {
    #[serde(default)]
    pub user: Option<User>,
    #[serde(default)]
    pub token: Option<String>,
}

/// A contact as returned by the server.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Contact {
    #[serde(rename = "_id")]
    pub id: String,
    #[serde(rename = "isFavorite", default)]
    pub is_favorite: bool,
    #[serde(flatten)]
    pub fields: Map<String, Value>,
}

impl Contact {
    pub fn field_str(&self, name: &str) -> Option<&str> {
        self.fields.get(name).and_then(Value::as_str)
    }

    /// Case-insensitive match on name, email and phone.
    pub fn matches(&self, term: &str) -> bool {
        let needle = term.trim().to_lowercase();
        if needle.is_empty() {
            return true;
        }
        ["name", "email", "phone"]
            .iter()
            .filter_map(|field| self.field_str(field))
            .any(|value| value.to_lowercase().contains(&needle))
    }
}

/// A tag as returned by the server.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tag {
    #[serde(rename = "_id")]
    pub id: String,
    #[serde(flatten)]
    pub fields: Map<String, Value>,
}

impl Tag {
    pub fn name(&self) -> Option<&str> {
        self.fields.get("name").and_then(Value::as_str)
    }
}
