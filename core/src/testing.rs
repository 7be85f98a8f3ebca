//! Scripted transport and wiring shared by the unit tests.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use serde_json::Value;

use crate::auth::AuthService;
use crate::config::Config;
use crate::gateway::Gateway;
use crate::http::{HttpRequest, HttpResponse, Transport, TransportError};
use crate::session::SessionStore;
use crate::store::MemoryStore;

pub type Scripted = Result<HttpResponse, TransportError>;

/// Replays canned outcomes in order and records every request it sees.
/// Running out of outcomes yields a transport error.
pub struct ScriptedTransport {
    outcomes: Mutex<VecDeque<Scripted>>,
    requests: Mutex<Vec<HttpRequest>>,
}

impl ScriptedTransport {
    pub fn new(outcomes: Vec<Scripted>) -> Self {
        Self {
            outcomes: Mutex::new(outcomes.into()),
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn requests(&self) -> Vec<HttpRequest> {
        self.requests.lock().unwrap().clone()
    }
}

impl Transport for ScriptedTransport {
    fn execute(&self, request: &HttpRequest) -> Result<HttpResponse, TransportError> {
        self.requests.lock().unwrap().push(request.clone());
        self.outcomes
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(TransportError("no scripted response".to_string())))
    }
}

pub fn json_response(status: u16, body: Value) -> Scripted {
    Ok(HttpResponse {
        status,
        headers: Vec::new(),
        body: body.to_string().into_bytes(),
    })
}

pub fn status_response(status: u16, body: impl AsRef<[u8]>) -> Scripted {
    Ok(HttpResponse {
        status,
        headers: Vec::new(),
        body: body.as_ref().to_vec(),
    })
}

/// A gateway over an in-memory session and a scripted transport.
pub struct Harness {
    pub transport: Arc<ScriptedTransport>,
    pub backend: MemoryStore,
    pub session: Arc<SessionStore>,
    pub gateway: Gateway,
}

impl Harness {
    pub fn new(outcomes: Vec<Scripted>) -> Self {
        let transport = Arc::new(ScriptedTransport::new(outcomes));
        let backend = MemoryStore::new();
        let session = Arc::new(SessionStore::new(backend.clone()));
        let gateway = Gateway::new(&Config::default(), session.clone(), transport.clone());
        Self {
            transport,
            backend,
            session,
            gateway,
        }
    }

    pub fn auth(&self) -> AuthService {
        AuthService::new(self.gateway.clone(), self.session.clone())
    }
}
