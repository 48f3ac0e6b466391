//! Shared application state for all routes.

use crate::store::CustomerStore;
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    /// Injected store handle; the only state shared between requests.
    pub store: Arc<dyn CustomerStore>,
}

impl AppState {
    pub fn new(store: impl CustomerStore + 'static) -> Self {
        AppState {
            store: Arc::new(store),
        }
    }
}
