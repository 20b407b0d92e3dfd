//! Application state for the HTTP server.

use crate::services::Services;

/// Shared application state passed to all handlers.
#[derive(Clone)]
pub struct AppState {
    pub services: Services,
}

impl AppState {
    pub fn new(services: Services) -> Self {
        Self { services }
    }
}
