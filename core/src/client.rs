//! Wiring for a complete client over one session store and one transport.

use std::sync::Arc;

use crate::auth::AuthService;
use crate::book::ContactBook;
use crate::config::Config;
use crate::gateway::Gateway;
use crate::http::Transport;
use crate::services::{ContactService, FavoriteService, TagService};
use crate::session::SessionStore;
use crate::store::KeyValueStore;
use crate::transport::UreqTransport;

/// Every service, sharing the same session and gateway.
///
/// The session store is reachable only through `auth`, its sole writer.
#[derive(Clone)]
pub struct Client {
    pub gateway: Gateway,
    pub auth: AuthService,
    pub contacts: ContactService,
    pub favorites: FavoriteService,
    pub tags: TagService,
}

impl Client {
    /// Build a client that talks HTTP through `ureq`.
    pub fn new(config: &Config, backend: impl KeyValueStore + 'static) -> Self {
        let transport = Arc::new(UreqTransport::new(config.timeout));
        Self::with_transport(config, backend, transport)
    }

    pub fn with_transport(
        config: &Config,
        backend: impl KeyValueStore + 'static,
        transport: Arc<dyn Transport>,
    ) -> Self {
        let session = Arc::new(SessionStore::new(backend));
        let gateway = Gateway::new(config, session.clone(), transport);
        Self {
            auth: AuthService::new(gateway.clone(), session),
            contacts: ContactService::new(gateway.clone()),
            favorites: FavoriteService::new(gateway.clone()),
            tags: TagService::new(gateway.clone()),
            gateway,
        }
    }

    /// A fresh contact list bound to this client's services.
    pub fn contact_book(&self) -> ContactBook {
        ContactBook::new(self.contacts.clone(), self.favorites.clone())
    }
}
