use std::sync::Arc;

use crate::config::Config;
use crate::services::{AuthService, BookingEngine, EventCatalog};
use crate::store::Store;

/// Everything the handlers need, built once in main and cloned per request.
#[derive(Clone)]
pub struct AppState {
    pub auth: AuthService,
    pub events: EventCatalog,
    pub bookings: BookingEngine,
}

impl AppState {
    pub fn new(store: Arc<dyn Store>, config: &Config) -> Self {
        Self {
            auth: AuthService::new(
                store.clone(),
                config.jwt_secret.as_str(),
                config.token_ttl_hours,
            ),
            events: EventCatalog::new(store.clone()),
            bookings: BookingEngine::new(store),
        }
    }
}
