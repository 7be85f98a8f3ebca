//! Auth service: login, signup and logout over the gateway.
//!
//! # Design
//! This is the only component that writes to the `SessionStore`.
//! - `login` saves a session only after the envelope carries both a user and
//!   a token.
//! - `signup` never touches the session; a new account still has to log in.
//! - `logout` treats the remote call as best effort and always clears the
//!   local session afterwards.

use std::sync::Arc;

use tracing::{info, warn};

use crate::endpoints;
use crate::error::ApiError;
use crate::gateway::{to_body, Gateway};
use crate::session::{SessionStore, User};
use crate::types::{Credentials, Envelope, LoginData, RegistrationRequest};

#[derive(Clone)]
pub struct AuthService {
    gateway: Gateway,
    session: Arc<SessionStore>,
}

impl AuthService {
    pub fn new(gateway: Gateway, session: Arc<SessionStore>) -> Self {
        Self { gateway, session }
    }

    pub fn gateway(&self) -> &Gateway {
        &self.gateway
    }

    /// Authenticate and persist the session. Returns the server's user record.
    pub fn login(&self, credentials: &Credentials) -> Result<User, ApiError> {
        let body = self
            .gateway
            .post(endpoints::auth::LOGIN, Some(&to_body(credentials)?))?;

        let data: LoginData = Envelope::into_data(body).map_err(|_| {
            ApiError::InvalidResponse("Login failed - invalid response from server".to_string())
        })?;

        let (user, token) = match (data.user, data.token) {
            (Some(user), Some(token)) if !user.is_empty() && !token.is_empty() => (user, token),
            _ => {
                return Err(ApiError::InvalidResponse(
                    "Invalid login response - missing user or token".to_string(),
                ))
            }
        };

        self.session.save(&user, &token)?;
        info!(user_id = user.id().unwrap_or("<unknown>"), "logged in");
        Ok(user)
    }

    /// Create an account. Validates locally first and leaves the session
    /// untouched on success.
    pub fn signup(&self, registration: &RegistrationRequest) -> Result<User, ApiError> {
        registration.validate()?;

        let body = self
            .gateway
            .post(endpoints::auth::REGISTER, Some(&to_body(registration)?))?;

        let invalid = || {
            ApiError::InvalidResponse(
                "Registration failed - invalid response from server".to_string(),
            )
        };
        let user: User = Envelope::into_data(body).map_err(|_| invalid())?;
        if user.id().is_none_or(str::is_empty) {
            return Err(ApiError::InvalidResponse(
                "Registration failed - invalid user data".to_string(),
            ));
        }

        info!(user_id = user.id().unwrap_or_default(), "account created");
        Ok(user)
    }

    /// End the session. The remote call may fail; the local session is
    /// cleared regardless.
    pub fn logout(&self) -> Result<(), ApiError> {
        if let Err(e) = self.gateway.post(endpoints::auth::LOGOUT, None) {
            warn!(error = %e, "logout request failed; clearing local session anyway");
        }
        self.session.clear()?;
        info!("logged out");
        Ok(())
    }

    pub fn is_logged_in(&self) -> bool {
        self.session.is_present()
    }

    pub fn current_user(&self) -> Option<User> {
        self.session.load().map(|session| session.user)
    }

    /// Bearer token of the current session.
    pub fn token(&self) -> Option<String> {
        self.session.token()
    }
}

#[cfg(test)]
mod tests {
    use serde_json::{json, Value};

    use super::*;
    use crate::http::TransportError;
    use crate::session::{TOKEN_KEY, USER_KEY};
    use crate::store::KeyValueStore;
    use crate::testing::{json_response, Harness};

    fn login_ok() -> crate::testing::Scripted {
        json_response(
            200,
            json!({"success": true, "data": {"user": {"_id": "u1", "name": "A"}, "token": "tok1"}}),
        )
    }

    #[test]
    fn login_persists_session_and_returns_user() {
        let harness = Harness::new(vec![login_ok()]);
        let auth = harness.auth();

        let user = auth
            .login(&Credentials::new("a@b.com", "secret123"))
            .unwrap();

        assert_eq!(serde_json::to_value(&user).unwrap(), json!({"_id": "u1", "name": "A"}));
        assert_eq!(harness.backend.get(TOKEN_KEY).unwrap().as_deref(), Some("tok1"));
        assert!(auth.is_logged_in());
        assert_eq!(auth.current_user(), Some(user));
    }

    #[test]
    fn token_follows_login_and_logout() {
        let harness = Harness::new(vec![login_ok(), json_response(200, json!({"success": true}))]);
        let auth = harness.auth();
        assert_eq!(auth.token(), None);

        auth.login(&Credentials::new("a@b.com", "secret123")).unwrap();
        assert_eq!(auth.token().as_deref(), Some("tok1"));

        auth.logout().unwrap();
        assert_eq!(auth.token(), None);
    }

    #[test]
    fn login_posts_credentials_to_login_endpoint() {
        let harness = Harness::new(vec![login_ok()]);
        harness
            .auth()
            .login(&Credentials::new("a@b.com", "secret123"))
            .unwrap();

        let sent = harness.transport.requests();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].url, "http://localhost:4000/auth/login");
        let body: Value = serde_json::from_str(sent[0].body.as_deref().unwrap()).unwrap();
        assert_eq!(body, json!({"email": "a@b.com", "password": "secret123"}));
        assert_eq!(sent[0].header("Authorization"), None);
    }

    #[test]
    fn login_without_user_or_token_is_invalid() {
        let harness = Harness::new(vec![json_response(200, json!({"success": true, "data": {}}))]);
        let err = harness
            .auth()
            .login(&Credentials::new("a@b.com", "secret123"))
            .unwrap_err();
        assert!(matches!(err, ApiError::InvalidResponse(_)));
        assert!(harness.backend.is_empty());
    }

    #[test]
    fn login_with_only_token_is_invalid() {
        let harness = Harness::new(vec![json_response(
            200,
            json!({"success": true, "data": {"token": "tok1"}}),
        )]);
        let err = harness
            .auth()
            .login(&Credentials::new("a@b.com", "secret123"))
            .unwrap_err();
        assert!(matches!(err, ApiError::InvalidResponse(_)));
        assert!(!harness.auth().is_logged_in());
    }

    #[test]
    fn login_success_false_is_invalid() {
        let harness = Harness::new(vec![json_response(
            200,
            json!({"success": false, "data": {"user": {"_id": "u1"}, "token": "tok1"}}),
        )]);
        let err = harness
            .auth()
            .login(&Credentials::new("a@b.com", "secret123"))
            .unwrap_err();
        assert_eq!(err.user_message(), "Login failed - invalid response from server");
        assert!(harness.backend.is_empty());
    }

    #[test]
    fn login_http_error_propagates_unchanged() {
        let harness = Harness::new(vec![json_response(401, json!({"success": false}))]);
        let err = harness
            .auth()
            .login(&Credentials::new("a@b.com", "wrong"))
            .unwrap_err();
        assert!(matches!(err, ApiError::Http { status: 401 }));
        assert!(harness.backend.is_empty());
    }

    #[test]
    fn signup_returns_user_without_session() {
        let harness = Harness::new(vec![json_response(
            201,
            json!({"success": true, "data": {"_id": "u2"}}),
        )]);
        let auth = harness.auth();
        let user = auth
            .signup(&RegistrationRequest::new("B", "b@c.com", "Secret123!"))
            .unwrap();

        assert_eq!(serde_json::to_value(&user).unwrap(), json!({"_id": "u2"}));
        assert!(!auth.is_logged_in());
        assert!(harness.backend.is_empty());
    }

    #[test]
    fn signup_ignores_token_in_response() {
        let harness = Harness::new(vec![json_response(
            201,
            json!({"success": true, "data": {"_id": "u2", "token": "tok2"}}),
        )]);
        let auth = harness.auth();
        auth.signup(&RegistrationRequest::new("B", "b@c.com", "Secret123!"))
            .unwrap();
        assert!(!auth.is_logged_in());
    }

    #[test]
    fn signup_without_id_is_invalid() {
        let harness = Harness::new(vec![json_response(
            201,
            json!({"success": true, "data": {"name": "B"}}),
        )]);
        let err = harness
            .auth()
            .signup(&RegistrationRequest::new("B", "b@c.com", "Secret123!"))
            .unwrap_err();
        assert!(matches!(err, ApiError::InvalidResponse(_)));
    }

    #[test]
    fn signup_validation_blocks_the_request() {
        let harness = Harness::new(Vec::new());
        let err = harness
            .auth()
            .signup(&RegistrationRequest::new("", "nope", "short"))
            .unwrap_err();
        assert!(matches!(err, ApiError::Validation(_)));
        assert!(harness.transport.requests().is_empty());
    }

    #[test]
    fn logout_clears_session_when_request_succeeds() {
        let harness = Harness::new(vec![login_ok(), json_response(200, json!({"success": true}))]);
        let auth = harness.auth();
        auth.login(&Credentials::new("a@b.com", "secret123")).unwrap();

        auth.logout().unwrap();

        assert!(!auth.is_logged_in());
        let sent = harness.transport.requests();
        assert_eq!(sent[1].url, "http://localhost:4000/auth/logout");
        assert_eq!(sent[1].header("Authorization"), Some("Bearer tok1"));
    }

    #[test]
    fn logout_clears_session_when_server_unreachable() {
        let harness = Harness::new(vec![
            login_ok(),
            Err(TransportError("failed to fetch".to_string())),
        ]);
        let auth = harness.auth();
        auth.login(&Credentials::new("a@b.com", "secret123")).unwrap();

        auth.logout().unwrap();

        assert!(!auth.is_logged_in());
        assert_eq!(harness.backend.get(USER_KEY).unwrap(), None);
    }

    #[test]
    fn logout_clears_session_when_server_errors() {
        let harness = Harness::new(vec![login_ok(), json_response(500, json!({}))]);
        let auth = harness.auth();
        auth.login(&Credentials::new("a@b.com", "secret123")).unwrap();
        auth.logout().unwrap();
        assert!(!auth.is_logged_in());
        assert_eq!(auth.current_user(), None);
    }
}
