//! Fare lookup between two cities on a route.
//!
//! This module contains the core logic behind the fare search form: resolve
//! both cities on each bus type's stop sequence and read the fare between
//! them from the flat fare array.

use std::collections::BTreeMap;

use tracing::debug;

use crate::domain::{BusRoute, BusType};
use crate::fares::{Fare, fare_index};

/// Errors from a fare lookup.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LookupError {
    /// One or both cities are not served by any bus type on the route.
    #[error("one or both cities not found in route")]
    UnknownCity {
        from_valid: bool,
        to_valid: bool,
        available: Vec<String>,
    },
}

/// Fares between two cities, per requested bus type.
#[derive(Debug, Clone, PartialEq)]
pub struct FareQuote {
    pub from_city: String,
    pub to_city: String,
    /// `None` where the bus type does not serve both cities.
    pub fares: BTreeMap<BusType, Option<Fare>>,
}

/// Every city on the route, across all bus types, in order of first
/// appearance.
pub fn cities(route: &BusRoute) -> Vec<String> {
    let mut cities: Vec<String> = Vec::new();
    for (_, line) in route.lines() {
        for stop in line.stops().iter() {
            if !cities.iter().any(|c| c == stop) {
                cities.push(stop.to_string());
            }
        }
    }
    cities
}

/// Look up the fare between two cities for each requested bus type.
///
/// An empty `bus_types` means every bus type the route offers. Both cities
/// must appear somewhere on the route; a bus type that lacks either of them
/// (or has no stops at all) yields `None` rather than an error. Asking for
/// the same city twice also yields `None`, as a stop has no fare to itself.
pub fn quote_fares(
    route: &BusRoute,
    from_city: &str,
    to_city: &str,
    bus_types: &[BusType],
) -> Result<FareQuote, LookupError> {
    let (from_city, to_city) = (from_city.trim(), to_city.trim());
    let served = |city: &str| route.lines().any(|(_, line)| line.stops().contains(city));
    let (from_valid, to_valid) = (served(from_city), served(to_city));
    if !from_valid || !to_valid {
        return Err(LookupError::UnknownCity {
            from_valid,
            to_valid,
            available: cities(route),
        });
    }

    let requested = if bus_types.is_empty() {
        route.bus_types()
    } else {
        bus_types
    };

    let fares = requested
        .iter()
        .map(|&bus_type| (bus_type, fare_on(route, bus_type, from_city, to_city)))
        .collect();

    Ok(FareQuote {
        from_city: from_city.to_string(),
        to_city: to_city.to_string(),
        fares,
    })
}

/// Fare between two cities on one bus type's stop sequence.
fn fare_on(route: &BusRoute, bus_type: BusType, from_city: &str, to_city: &str) -> Option<Fare> {
    let line = route.line(bus_type)?;
    let stops = line.stops();
    let (a, b) = (stops.position(from_city)?, stops.position(to_city)?);

    let index = fare_index(a.min(b), a.max(b), stops.len());
    if index.is_none() {
        debug!(%bus_type, from_city, to_city, "no fare slot for city pair");
    }
    index.map(|i| line.fares()[i])
}
