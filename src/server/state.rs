use std::sync::Arc;

use crate::{config::ServerConfig, integrations::Integrations};

/// Shared application state handed to every handler. Holds no per-request data.
#[derive(Clone)]
pub struct AppState {
    pub integrations: Integrations,
    api_key: Option<Arc<str>>,
    body_limit_bytes: usize,
}

impl AppState {
    pub fn new(integrations: Integrations, server: &ServerConfig) -> Self {
        Self {
            integrations,
            api_key: (!server.api_key.is_empty()).then(|| Arc::from(server.api_key.as_str())),
            body_limit_bytes: server.body_limit_bytes,
        }
    }

    /// `None` leaves protected endpoints open.
    pub fn api_key(&self) -> Option<&str> {
        self.api_key.as_deref()
    }

    pub fn body_limit_bytes(&self) -> usize {
        self.body_limit_bytes
    }
}
