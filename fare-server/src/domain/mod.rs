//! Domain types for the fare finder.
//!
//! This module contains the validated model of bus routes: bus types,
//! route identifiers, stop sequences and the routes themselves. All types
//! enforce their invariants at construction time, so code that receives
//! them can trust their validity.

mod bus_type;
mod error;
mod route;
mod route_id;
mod stops;

pub use bus_type::{BusType, InvalidBusType};
pub use error::DomainError;
pub use route::{BusRoute, RouteRecord};
pub use route_id::{InvalidRouteId, RouteId};
pub use stops::{InvalidStops, StopSequence};
