//! Persisted session: the token and user pair that survives restarts.
//!
//! # Design
//! A `Session` always carries both a token and a user, so a half-populated
//! session cannot be represented in memory. On disk the two values live under
//! separate keys; `SessionStore::load` treats anything other than "both
//! present and decodable" as no session and clears the remnants. Decode and
//! read failures are logged and swallowed: an unreadable session is the same
//! as an absent one.

use std::sync::{Mutex, PoisonError};

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::{error, warn};

use crate::store::{KeyValueStore, StoreError};

pub const TOKEN_KEY: &str = "token";
pub const USER_KEY: &str = "user";

/// The authenticated user record, kept verbatim as returned by the server.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct User(Map<String, Value>);

impl User {
    /// Server-issued identifier.
    pub fn id(&self) -> Option<&str> {
        self.0.get("_id").and_then(Value::as_str)
    }

    pub fn name(&self) -> Option<&str> {
        self.0.get("name").and_then(Value::as_str)
    }

    pub fn email(&self) -> Option<&str> {
        self.0.get("email").and_then(Value::as_str)
    }

    pub fn get(&self, field: &str) -> Option<&Value> {
        self.0.get(field)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn as_map(&self) -> &Map<String, Value> {
        &self.0
    }
}

impl From<Map<String, Value>> for User {
    fn from(fields: Map<String, Value>) -> Self {
        Self(fields)
    }
}

/// A complete session.
#[derive(Debug, Clone, PartialEq)]
pub struct Session {
    pub token: String,
    pub user: User,
}

/// Owns the persisted token/user pair.
///
/// All access goes through one lock, so a `load` never interleaves with a
/// `save` or `clear` issued through the same store.
pub struct SessionStore {
    backend: Box<dyn KeyValueStore>,
    lock: Mutex<()>,
}

impl SessionStore {
    pub fn new(backend: impl KeyValueStore + 'static) -> Self {
        Self {
            backend: Box::new(backend),
            lock: Mutex::new(()),
        }
    }

    /// Persist both values in a single backend write.
    pub fn save(&self, user: &User, token: &str) -> Result<(), StoreError> {
        let encoded = serde_json::to_string(user)?;
        let _guard = self.lock.lock().unwrap_or_else(PoisonError::into_inner);
        self.backend
            .set_many(&[(TOKEN_KEY, token), (USER_KEY, encoded.as_str())])
    }

    /// Read the session, clearing any partial or corrupt remnants.
    pub fn load(&self) -> Option<Session> {
        let _guard = self.lock.lock().unwrap_or_else(PoisonError::into_inner);

        let token = self.read(TOKEN_KEY);
        let user = self.read(USER_KEY);

        match (token, user) {
            (None, None) => None,
            (Some(token), Some(raw)) if !token.is_empty() => match decode_user(&raw) {
                Some(user) => Some(Session { token, user }),
                None => {
                    self.discard();
                    None
                }
            },
            _ => {
                warn!("partial session found in storage; clearing it");
                self.discard();
                None
            }
        }
    }

    /// Remove both values. Clearing an empty store succeeds.
    pub fn clear(&self) -> Result<(), StoreError> {
        let _guard = self.lock.lock().unwrap_or_else(PoisonError::into_inner);
        self.backend.remove_many(&[TOKEN_KEY, USER_KEY])
    }

    /// True iff a token and a decodable, non-empty user are both stored.
    pub fn is_present(&self) -> bool {
        self.load().is_some()
    }

    /// The bearer token of a valid session.
    pub fn token(&self) -> Option<String> {
        self.load().map(|session| session.token)
    }

    fn read(&self, key: &str) -> Option<String> {
        match self.backend.get(key) {
            Ok(value) => value,
            Err(e) => {
                error!(key, error = %e, "failed to read session value");
                None
            }
        }
    }

    fn discard(&self) {
        if let Err(e) = self.backend.remove_many(&[TOKEN_KEY, USER_KEY]) {
            error!(error = %e, "failed to clear invalid session");
        }
    }
}

fn decode_user(raw: &str) -> Option<User> {
    match serde_json::from_str::<User>(raw) {
        Ok(user) if !user.is_empty() => Some(user),
        Ok(_) => {
            warn!("stored user record is empty");
            None
        }
        Err(e) => {
            error!(error = %e, "stored user record is unreadable");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::store::MemoryStore;

    fn user(value: Value) -> User {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn save_then_load_returns_session() {
        let store = SessionStore::new(MemoryStore::new());
        let u = user(json!({"_id": "u1", "name": "A"}));
        store.save(&u, "tok1").unwrap();

        let session = store.load().unwrap();
        assert_eq!(session.token, "tok1");
        assert_eq!(session.user, u);
        assert!(store.is_present());
    }

    #[test]
    fn empty_store_has_no_session() {
        let store = SessionStore::new(MemoryStore::new());
        assert_eq!(store.load(), None);
        assert!(!store.is_present());
    }

    #[test]
    fn token_without_user_is_cleared() {
        let backend = MemoryStore::with_entries([(TOKEN_KEY, "tok")]);
        let store = SessionStore::new(backend.clone());
        assert_eq!(store.load(), None);
        assert!(backend.is_empty());
    }

    #[test]
    fn user_without_token_is_cleared() {
        let backend = MemoryStore::with_entries([(USER_KEY, r#"{"_id":"u1"}"#)]);
        let store = SessionStore::new(backend.clone());
        assert_eq!(store.load(), None);
        assert!(backend.is_empty());
    }

    #[test]
    fn corrupt_user_fails_closed() {
        let backend = MemoryStore::with_entries([(TOKEN_KEY, "tok"), (USER_KEY, "{not json")]);
        let store = SessionStore::new(backend.clone());
        assert_eq!(store.load(), None);
        assert!(backend.is_empty());
    }

    #[test]
    fn non_object_user_fails_closed() {
        for raw in ["undefined", "null", "\"alice\"", "[]", "{}"] {
            let backend = MemoryStore::with_entries([(TOKEN_KEY, "tok"), (USER_KEY, raw)]);
            let store = SessionStore::new(backend.clone());
            assert!(!store.is_present(), "{raw} should not count as a user");
            assert!(backend.is_empty(), "{raw} should have been cleared");
        }
    }

    #[test]
    fn empty_token_fails_closed() {
        let backend = MemoryStore::with_entries([(TOKEN_KEY, ""), (USER_KEY, r#"{"_id":"u1"}"#)]);
        let store = SessionStore::new(backend.clone());
        assert_eq!(store.load(), None);
        assert!(backend.is_empty());
    }

    #[test]
    fn clear_is_idempotent() {
        let store = SessionStore::new(MemoryStore::new());
        store.save(&user(json!({"_id": "u1"})), "tok").unwrap();
        store.clear().unwrap();
        store.clear().unwrap();
        assert_eq!(store.load(), None);
    }

    #[test]
    fn no_sequence_of_save_and_clear_leaves_half_a_session() {
        let backend = MemoryStore::new();
        let store = SessionStore::new(backend.clone());
        let u = user(json!({"_id": "u1"}));

        for step in 0..20 {
            if step % 3 == 0 {
                store.clear().unwrap();
            } else {
                store.save(&u, &format!("tok{step}")).unwrap();
            }
            let token = backend.get(TOKEN_KEY).unwrap();
            let stored_user = backend.get(USER_KEY).unwrap();
            assert_eq!(token.is_some(), stored_user.is_some(), "step {step}");
            match store.load() {
                Some(session) => assert_eq!(session.token, format!("tok{step}")),
                None => assert_eq!(step % 3, 0),
            }
        }
    }

    #[test]
    fn user_accessors_read_known_fields() {
        let u = user(json!({"_id": "u1", "name": "A", "email": "a@b.com", "age": 3}));
        assert_eq!(u.id(), Some("u1"));
        assert_eq!(u.name(), Some("A"));
        assert_eq!(u.email(), Some("a@b.com"));
        assert_eq!(u.get("age"), Some(&json!(3)));
    }
}
