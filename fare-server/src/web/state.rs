//! Application state for the web layer.

use crate::store::RouteStore;

/// Shared application state.
///
/// Cheap to clone; every clone shares the same route store.
#[derive(Clone)]
pub struct AppState {
    /// Bus routes and their fares
    pub store: RouteStore,
}

impl AppState {
    /// Create a new app state.
    pub fn new(store: RouteStore) -> Self {
        Self { store }
    }
}
