//! Application shell: the authenticated/unauthenticated state machine.
//!
//! # Design
//! `Shell::bootstrap` is the only constructor and reads the session exactly
//! once; afterwards the in-memory state changes only through the shell's own
//! transitions. Any doubt about the stored session resolves to
//! `Unauthenticated`, since `SessionStore::load` fails closed.
//!
//! ```text
//! Unauthenticated{Login}  --login ok-->   Authenticated{Contacts}
//! Unauthenticated{Signup} --signup ok-->  Unauthenticated{Login, email hint}
//! Authenticated{*}        --logout-->     Unauthenticated{Login}
//! ```
//!
//! Submitting operations take `&mut self`, so one shell cannot have two
//! submissions in flight at once.

use tracing::info;

use crate::auth::AuthService;
use crate::error::ApiError;
use crate::session::User;
use crate::types::{Credentials, RegistrationRequest};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthScreen {
    Login,
    Signup,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Page {
    #[default]
    Contacts,
    Favorites,
    Tags,
    Groups,
    Settings,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ShellState {
    Unauthenticated {
        screen: AuthScreen,
        /// Email to pre-fill on the login form after a signup.
        email_hint: Option<String>,
    },
    Authenticated {
        active_page: Page,
    },
}

impl ShellState {
    fn login_screen(email_hint: Option<String>) -> Self {
        ShellState::Unauthenticated {
            screen: AuthScreen::Login,
            email_hint,
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ShellError {
    #[error("not signed in")]
    NotAuthenticated,

    #[error(transparent)]
    Api(#[from] ApiError),
}

pub struct Shell {
    auth: AuthService,
    state: ShellState,
}

impl Shell {
    /// Read the persisted session once and pick the initial screen.
    pub fn bootstrap(auth: AuthService) -> Self {
        let state = if auth.is_logged_in() {
            ShellState::Authenticated {
                active_page: Page::default(),
            }
        } else {
            ShellState::login_screen(None)
        };
        info!(authenticated = matches!(state, ShellState::Authenticated { .. }), "shell started");
        Self { auth, state }
    }

    pub fn state(&self) -> &ShellState {
        &self.state
    }

    pub fn is_authenticated(&self) -> bool {
        matches!(self.state, ShellState::Authenticated { .. })
    }

    pub fn auth(&self) -> &AuthService {
        &self.auth
    }

    pub fn current_user(&self) -> Option<User> {
        if self.is_authenticated() {
            self.auth.current_user()
        } else {
            None
        }
    }

    /// On success the shell enters the main views at the default page. On
    /// failure the state is unchanged.
    pub fn login(&mut self, credentials: &Credentials) -> Result<User, ApiError> {
        let user = self.auth.login(credentials)?;
        self.state = ShellState::Authenticated {
            active_page: Page::default(),
        };
        Ok(user)
    }

    /// On success the shell moves to the login screen with the submitted
    /// email as hint. It never authenticates.
    pub fn signup(&mut self, registration: &RegistrationRequest) -> Result<User, ApiError> {
        let user = self.auth.signup(registration)?;
        self.state = ShellState::login_screen(Some(registration.email.trim().to_string()));
        Ok(user)
    }

    /// Always lands on the login screen, even when clearing storage fails.
    pub fn logout(&mut self) -> Result<(), ApiError> {
        let result = self.auth.logout();
        self.state = ShellState::login_screen(None);
        result
    }

    pub fn show_signup(&mut self) {
        if let ShellState::Unauthenticated { screen, .. } = &mut self.state {
            *screen = AuthScreen::Signup;
        }
    }

    pub fn show_login(&mut self) {
        if let ShellState::Unauthenticated { screen, .. } = &mut self.state {
            *screen = AuthScreen::Login;
        }
    }

    pub fn navigate(&mut self, page: Page) -> Result<(), ShellError> {
        match &mut self.state {
            ShellState::Authenticated { active_page } => {
                *active_page = page;
                Ok(())
            }
            ShellState::Unauthenticated { .. } => Err(ShellError::NotAuthenticated),
        }
    }

    /// The auth service, once the shell is authenticated.
    pub fn require_auth(&self) -> Result<&AuthService, ShellError> {
        if self.is_authenticated() {
            Ok(&self.auth)
        } else {
            Err(ShellError::NotAuthenticated)
        }
    }
}
