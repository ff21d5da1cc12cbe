//! Route storage.
//!
//! Routes live in memory behind a read-write lock, optionally mirrored to a
//! JSON [`Snapshot`] file after every change. Every mutation builds the
//! complete new route before publishing it, so readers never see a stop
//! sequence without its matching fares.

mod error;
mod snapshot;

pub use error::StoreError;
pub use snapshot::Snapshot;

use std::collections::{BTreeMap, HashSet};
use std::sync::Arc;

use chrono::Utc;
use tokio::sync::RwLock;
use tracing::{info, warn};

use crate::domain::{BusRoute, RouteId};

type Routes = BTreeMap<RouteId, BusRoute>;

/// Thread-safe route store.
///
/// Cloning is cheap; clones share the same routes.
#[derive(Clone)]
pub struct RouteStore {
    routes: Arc<RwLock<Routes>>,
    snapshot: Option<Arc<Snapshot>>,
}

impl RouteStore {
    /// Create an empty store that is never written to disk.
    pub fn in_memory() -> Self {
        Self {
            routes: Arc::new(RwLock::new(BTreeMap::new())),
            snapshot: None,
        }
    }

    /// Open a store backed by a snapshot file, loading any saved routes.
    ///
    /// Fails if the snapshot is unreadable, holds an invalid route, or has
    /// two routes with the same ID or number.
    pub fn open(snapshot: Snapshot) -> Result<Self, StoreError> {
        let loaded = snapshot.load()?;
        let mut routes = BTreeMap::new();
        let mut numbers = HashSet::new();
        for route in loaded {
            if !numbers.insert(route.number().to_string()) {
                return Err(StoreError::Inconsistent {
                    path: snapshot.path().to_path_buf(),
                    message: format!("route number {} appears twice", route.number()),
                });
            }
            if let Some(dup) = routes.insert(route.id(), route) {
                return Err(StoreError::Inconsistent {
                    path: snapshot.path().to_path_buf(),
                    message: format!("route ID {} appears twice", dup.id()),
                });
            }
        }
        info!(
            path = %snapshot.path().display(),
            routes = routes.len(),
            "route store opened"
        );

        Ok(Self {
            routes: Arc::new(RwLock::new(routes)),
            snapshot: Some(Arc::new(snapshot)),
        })
    }

    /// All routes, ordered by route number.
    pub async fn list(&self) -> Vec<BusRoute> {
        let guard = self.routes.read().await;
        let mut routes: Vec<BusRoute> = guard.values().cloned().collect();
        routes.sort_by(|a, b| a.number().cmp(b.number()));
        routes
    }

    pub async fn get(&self, id: RouteId) -> Result<BusRoute, StoreError> {
        let guard = self.routes.read().await;
        guard.get(&id).cloned().ok_or(StoreError::NotFound(id))
    }

    /// Get the number of routes in the store.
    pub async fn len(&self) -> usize {
        self.routes.read().await.len()
    }

    /// Check if the store is empty.
    pub async fn is_empty(&self) -> bool {
        self.routes.read().await.is_empty()
    }

    /// Add a new route. Its number must not already be in use.
    pub async fn create(&self, route: BusRoute) -> Result<BusRoute, StoreError> {
        let mut guard = self.routes.write().await;
        check_number_free(&guard, &route)?;

        let id = route.id();
        guard.insert(id, route.clone());
        if let Err(e) = self.persist(&guard) {
            guard.remove(&id);
            return Err(e);
        }
        info!(%id, number = route.number(), "route created");
        Ok(route)
    }

    /// Apply an edit to a route, all or nothing.
    ///
    /// The edit runs on a copy of the route. The store only changes if the
    /// edit succeeds, the route number is still unique, and the snapshot (if
    /// any) is written. The route's `last_updated` is refreshed.
    pub async fn update<F, E>(&self, id: RouteId, edit: F) -> Result<BusRoute, E>
    where
        F: FnOnce(&mut BusRoute) -> Result<(), E>,
        E: From<StoreError>,
    {
        let mut guard = self.routes.write().await;
        let mut edited = guard.get(&id).cloned().ok_or(StoreError::NotFound(id))?;
        edit(&mut edited)?;
        check_number_free(&guard, &edited)?;
        edited.touch(Utc::now());

        let previous = guard.insert(id, edited.clone());
        if let Err(e) = self.persist(&guard) {
            if let Some(previous) = previous {
                guard.insert(id, previous);
            }
            return Err(e.into());
        }
        info!(%id, "route updated");
        Ok(edited)
    }

    /// Remove a route, returning it.
    pub async fn delete(&self, id: RouteId) -> Result<BusRoute, StoreError> {
        let mut guard = self.routes.write().await;
        let removed = guard.remove(&id).ok_or(StoreError::NotFound(id))?;
        if let Err(e) = self.persist(&guard) {
            guard.insert(id, removed);
            return Err(e);
        }
        info!(%id, number = removed.number(), "route deleted");
        Ok(removed)
    }

    /// Write the snapshot, if this store has one. Runs under the write lock
    /// so snapshots are written in commit order.
    fn persist(&self, routes: &Routes) -> Result<(), StoreError> {
        let Some(snapshot) = &self.snapshot else {
            return Ok(());
        };
        snapshot.save(routes.values()).inspect_err(|e| {
            warn!(error = %e, "snapshot write failed, change rolled back");
        })
    }
}

fn check_number_free(routes: &Routes, route: &BusRoute) -> Result<(), StoreError> {
    let taken = routes
        .values()
        .any(|other| other.id() != route.id() && other.number() == route.number());
    if taken {
        return Err(StoreError::DuplicateNumber(route.number().to_string()));
    }
    Ok(())
}
