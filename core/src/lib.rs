//! Session and request core for the contacts web client.
//!
//! # Overview
//! Authenticates a user, keeps the token/user pair persisted across restarts,
//! attaches the bearer token to every API call, and classifies failures into
//! one error taxonomy that screens can render.
//!
//! # Design
//! - `SessionStore` exclusively owns the persisted session; only
//!   `AuthService` writes to it.
//! - `Gateway` is the single chokepoint for HTTP. It builds `HttpRequest`
//!   values and hands them to an injected `Transport`, so tests swap the
//!   network for a scripted double.
//! - Envelopes are checked once, at the service boundary, and turned into
//!   typed results.
//! - `Shell` derives "is authenticated" from the store exactly once at
//!   startup and then follows its own transitions.

pub mod auth;
pub mod book;
pub mod client;
pub mod config;
pub mod endpoints;
pub mod error;
pub mod gateway;
pub mod http;
pub mod services;
pub mod session;
pub mod shell;
pub mod store;
pub mod transport;
pub mod types;
pub mod validation;

#[cfg(test)]
mod testing;

pub use auth::AuthService;
pub use book::ContactBook;
pub use client::Client;
pub use config::{Config, ConfigError};
pub use error::ApiError;
pub use gateway::Gateway;
pub use http::{HttpMethod, HttpRequest, HttpResponse, Transport, TransportError};
pub use services::{ContactService, FavoriteService, TagService};
pub use session::{Session, SessionStore, User};
pub use shell::{AuthScreen, Page, Shell, ShellError, ShellState};
pub use store::{FileStore, KeyValueStore, MemoryStore, StoreError};
pub use transport::UreqTransport;
pub use types::{Contact, Credentials, Envelope, RegistrationRequest, Tag};
pub use validation::FieldError;
