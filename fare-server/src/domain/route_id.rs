//! Bus route identifier type.

use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Error returned when parsing an invalid route ID.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid route ID: {value}")]
pub struct InvalidRouteId {
    value: String,
}

/// Opaque identifier of a bus route (a UUID).
///
/// # Examples
///
/// ```
/// use fare_server::domain::RouteId;
///
/// let id = RouteId::parse("67e55044-10b1-426f-9247-bb680e5fe0c8").unwrap();
/// assert_eq!(id.to_string(), "67e55044-10b1-426f-9247-bb680e5fe0c8");
///
/// assert!(RouteId::parse("route-1").is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RouteId(Uuid);

impl RouteId {
    /// Generate a fresh random ID.
    pub fn generate() -> Self {
        RouteId(Uuid::new_v4())
    }

    /// Parse an ID from its hyphenated string form.
    pub fn parse(s: &str) -> Result<Self, InvalidRouteId> {
        Uuid::parse_str(s.trim())
            .map(RouteId)
            .map_err(|_| InvalidRouteId {
                value: s.to_string(),
            })
    }
}

impl fmt::Display for RouteId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.hyphenated().fmt(f)
    }
}
