//! Bus routes and their per-bus-type fare matrices.

use std::collections::{BTreeMap, HashSet};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{BusType, DomainError, RouteId, StopSequence};
use crate::fares::{Fare, FareMatrix, MatrixError};

/// A numbered bus route and the fares of every bus type running on it.
///
/// Each offered bus type may have a [`FareMatrix`]: its stop sequence and
/// the fares between those stops. Stops and fares live in one value, so they
/// cannot drift apart. Bus types that are offered but have no stops yet
/// simply have no matrix.
///
/// Serializes as a [`RouteRecord`], with stops and fares in separate maps.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RouteRecord", into = "RouteRecord")]
pub struct BusRoute {
    id: RouteId,
    number: String,
    name: String,
    bus_types: Vec<BusType>,
    lines: BTreeMap<BusType, FareMatrix>,
    last_updated: DateTime<Utc>,
}

/// Serialized form of a [`BusRoute`].
///
/// `locations` holds each bus type's stop sequence and `fare_matrix` the
/// matching flat fare array.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RouteRecord {
    pub id: RouteId,
    pub number: String,
    pub name: String,
    #[serde(default)]
    pub bus_types: Vec<BusType>,
    #[serde(default)]
    pub locations: BTreeMap<BusType, Vec<String>>,
    #[serde(default)]
    pub fare_matrix: BTreeMap<BusType, Vec<Fare>>,
    pub last_updated: DateTime<Utc>,
}

impl BusRoute {
    /// Create a route with a fresh ID and no stops.
    pub fn new(number: &str, name: &str, bus_types: Vec<BusType>) -> Result<Self, DomainError> {
        let mut route = Self {
            id: RouteId::generate(),
            number: String::new(),
            name: String::new(),
            bus_types: Vec::new(),
            lines: BTreeMap::new(),
            last_updated: Utc::now(),
        };
        route.set_number(number)?;
        route.set_name(name)?;
        route.set_bus_types(bus_types)?;
        Ok(route)
    }

    pub fn id(&self) -> RouteId {
        self.id
    }

    /// Route number, unique across the store (e.g. "1" or "EX-01").
    pub fn number(&self) -> &str {
        &self.number
    }

    /// Descriptive name (e.g. "Colombo - Kandy").
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Bus types running on this route.
    pub fn bus_types(&self) -> &[BusType] {
        &self.bus_types
    }

    pub fn last_updated(&self) -> DateTime<Utc> {
        self.last_updated
    }

    pub fn offers(&self, bus_type: BusType) -> bool {
        self.bus_types.contains(&bus_type)
    }

    pub fn set_number(&mut self, number: &str) -> Result<(), DomainError> {
        self.number = required(number, "number")?;
        Ok(())
    }

    pub fn set_name(&mut self, name: &str) -> Result<(), DomainError> {
        self.name = required(name, "name")?;
        Ok(())
    }

    /// Replace the offered bus types.
    ///
    /// Stops and fares of bus types no longer offered are dropped.
    pub fn set_bus_types(&mut self, bus_types: Vec<BusType>) -> Result<(), DomainError> {
        let mut seen = HashSet::new();
        if let Some(dup) = bus_types.iter().find(|bt| !seen.insert(**bt)) {
            return Err(DomainError::DuplicateBusType(*dup));
        }
        self.lines.retain(|bt, _| bus_types.contains(bt));
        self.bus_types = bus_types;
        Ok(())
    }

    /// The stops and fares of one bus type, if it has any stops.
    pub fn line(&self, bus_type: BusType) -> Option<&FareMatrix> {
        self.lines.get(&bus_type)
    }

    /// Every bus type with stops, in [`BusType`] order.
    pub fn lines(&self) -> impl Iterator<Item = (BusType, &FareMatrix)> {
        self.lines.iter().map(|(bt, m)| (*bt, m))
    }

    /// Edit one bus type's fare matrix.
    ///
    /// The edit runs on a copy; the route only changes if it succeeds. A bus
    /// type without stops starts from an empty matrix. Matrices left with no
    /// stops are removed.
    pub fn edit_line<T, F>(&mut self, bus_type: BusType, edit: F) -> Result<T, DomainError>
    where
        F: FnOnce(&mut FareMatrix) -> Result<T, MatrixError>,
    {
        if !self.offers(bus_type) {
            return Err(DomainError::BusTypeNotOffered(bus_type));
        }
        let mut matrix = self
            .lines
            .get(&bus_type)
            .cloned()
            .unwrap_or_else(|| FareMatrix::new(StopSequence::empty()));
        let out = edit(&mut matrix).map_err(|source| DomainError::Matrix { bus_type, source })?;
        self.put_line(bus_type, matrix);
        Ok(out)
    }

    /// Replace a bus type's stop sequence.
    ///
    /// Fares between stops that appear in both the old and new sequence are
    /// kept; every other pair starts at the default fare.
    pub fn replace_stops(&mut self, bus_type: BusType, stops: StopSequence) -> Result<(), DomainError> {
        if !self.offers(bus_type) {
            return Err(DomainError::BusTypeNotOffered(bus_type));
        }
        let matrix = match self.lines.get(&bus_type) {
            Some(current) => current
                .with_stops(stops)
                .map_err(|source| DomainError::Matrix { bus_type, source })?,
            None => FareMatrix::new(stops),
        };
        self.put_line(bus_type, matrix);
        Ok(())
    }

    /// Replace a bus type's whole fare array.
    ///
    /// The array must hold one fare per pair of the bus type's current stops.
    pub fn replace_fares(&mut self, bus_type: BusType, fares: Vec<Fare>) -> Result<(), DomainError> {
        if !self.offers(bus_type) {
            return Err(DomainError::BusTypeNotOffered(bus_type));
        }
        let stops = self
            .lines
            .get(&bus_type)
            .map(|m| m.stops().clone())
            .unwrap_or_default();
        let matrix = FareMatrix::from_parts(stops, fares)
            .map_err(|source| DomainError::Matrix { bus_type, source })?;
        self.put_line(bus_type, matrix);
        Ok(())
    }

    /// Record a modification time.
    pub fn touch(&mut self, at: DateTime<Utc>) {
        self.last_updated = at;
    }

    fn put_line(&mut self, bus_type: BusType, matrix: FareMatrix) {
        if matrix.stops().is_empty() {
            self.lines.remove(&bus_type);
        } else {
            self.lines.insert(bus_type, matrix);
        }
    }
}

fn required(value: &str, field: &'static str) -> Result<String, DomainError> {
    let value = value.trim();
    if value.is_empty() {
        return Err(DomainError::MissingField(field));
    }
    Ok(value.to_string())
}

impl TryFrom<RouteRecord> for BusRoute {
    type Error = DomainError;

    fn try_from(record: RouteRecord) -> Result<Self, Self::Error> {
        let mut route = BusRoute::new(&record.number, &record.name, record.bus_types)?;
        route.id = record.id;
        route.last_updated = record.last_updated;

        let mut fare_matrix = record.fare_matrix;
        for (bus_type, names) in record.locations {
            route.replace_stops(bus_type, StopSequence::new(names)?)?;
            if let Some(fares) = fare_matrix.remove(&bus_type) {
                route.replace_fares(bus_type, fares)?;
            }
        }
        // Fares for bus types without stops must be empty.
        for (bus_type, fares) in fare_matrix {
            route.replace_fares(bus_type, fares)?;
        }
        Ok(route)
    }
}

impl From<BusRoute> for RouteRecord {
    fn from(route: BusRoute) -> Self {
        let mut locations = BTreeMap::new();
        let mut fare_matrix = BTreeMap::new();
        for (bus_type, matrix) in route.lines {
            let (stops, fares) = matrix.into_parts();
            locations.insert(bus_type, stops.into());
            fare_matrix.insert(bus_type, fares);
        }
        Self {
            id: route.id,
            number: route.number,
            name: route.name,
            bus_types: route.bus_types,
            locations,
            fare_matrix,
            last_updated: route.last_updated,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kandy_route() -> BusRoute {
        let mut route = BusRoute::new(
            "1",
            "Colombo - Kandy",
            vec![BusType::Luxury, BusType::Normal],
        )
        .unwrap();
        route
            .replace_stops(
                BusType::Luxury,
                StopSequence::new(["Colombo", "Kadawatha", "Kandy"]).unwrap(),
            )
            .unwrap();
        route
            .replace_fares(BusType::Luxury, vec![200.0, 1000.0, 800.0])
            .unwrap();
        route
    }

    #[test]
    fn new_validates_fields() {
        assert_eq!(
            BusRoute::new(" ", "Colombo - Kandy", vec![]),
            Err(DomainError::MissingField("number"))
        );
        assert_eq!(
            BusRoute::new("1", "", vec![]),
            Err(DomainError::MissingField("name"))
        );
        assert_eq!(
            BusRoute::new("1", "x", vec![BusType::Luxury, BusType::Luxury]),
            Err(DomainError::DuplicateBusType(BusType::Luxury))
        );
    }

    #[test]
    fn new_trims_fields() {
        let route = BusRoute::new(" 1 ", " Colombo - Kandy ", vec![]).unwrap();
        assert_eq!(route.number(), "1");
        assert_eq!(route.name(), "Colombo - Kandy");
    }

    #[test]
    fn stops_need_an_offered_bus_type() {
        let mut route = kandy_route();
        assert_eq!(
            route.replace_stops(BusType::SuperLuxury, StopSequence::empty()),
            Err(DomainError::BusTypeNotOffered(BusType::SuperLuxury))
        );
        assert_eq!(
            route.edit_line(BusType::SemiLuxury, |m| m.push_stop("Kandy")),
            Err(DomainError::BusTypeNotOffered(BusType::SemiLuxury))
        );
    }

    #[test]
    fn replace_fares_checks_size() {
        let mut route = kandy_route();
        let err = route.replace_fares(BusType::Luxury, vec![1.0]).unwrap_err();
        assert!(matches!(
            err,
            DomainError::Matrix {
                bus_type: BusType::Luxury,
                source: MatrixError::SizeMismatch { expected: 3, actual: 1, .. }
            }
        ));
        // Normal has no stops, so only an empty array fits
        assert!(route.replace_fares(BusType::Normal, vec![]).is_ok());
        assert!(route.replace_fares(BusType::Normal, vec![5.0]).is_err());
    }

    #[test]
    fn replace_stops_carries_fares() {
        let mut route = kandy_route();
        route
            .replace_stops(
                BusType::Luxury,
                StopSequence::new(["Colombo", "Kadawatha", "Kegalle", "Kandy"]).unwrap(),
            )
            .unwrap();
        let line = route.line(BusType::Luxury).unwrap();
        assert_eq!(line.fare_between("Colombo", "Kandy"), Some(1000.0));
        assert_eq!(line.fare_between("Kadawatha", "Kandy"), Some(800.0));
        assert_eq!(line.fare_between("Kegalle", "Kandy"), Some(0.0));
    }

    #[test]
    fn failed_edit_leaves_route_unchanged() {
        let mut route = kandy_route();
        let before = route.clone();
        let result = route.edit_line(BusType::Luxury, |m| {
            m.push_stop("Peradeniya")?;
            m.set_fare_between("Peradeniya", "Kandy", -1.0)
        });
        assert!(result.is_err());
        assert_eq!(route, before);
    }

    #[test]
    fn edit_line_creates_and_removes_matrices() {
        let mut route = kandy_route();
        route.edit_line(BusType::Normal, |m| m.push_stop("Colombo")).unwrap();
        assert_eq!(route.line(BusType::Normal).unwrap().stop_count(), 1);

        route
            .edit_line(BusType::Normal, |m| m.remove_stop_named("Colombo"))
            .unwrap();
        assert!(route.line(BusType::Normal).is_none());
    }

    #[test]
    fn dropping_a_bus_type_drops_its_fares() {
        let mut route = kandy_route();
        route.set_bus_types(vec![BusType::Normal]).unwrap();
        assert!(route.line(BusType::Luxury).is_none());
        route.set_bus_types(vec![BusType::Luxury]).unwrap();
        assert!(route.line(BusType::Luxury).is_none());
    }

    #[test]
    fn serializes_as_record() {
        let route = kandy_route();
        let json = serde_json::to_value(&route).unwrap();
        assert_eq!(json["number"], "1");
        assert_eq!(json["busTypes"], serde_json::json!(["LUXURY", "NORMAL"]));
        assert_eq!(
            json["locations"]["LUXURY"],
            serde_json::json!(["Colombo", "Kadawatha", "Kandy"])
        );
        assert_eq!(
            json["fareMatrix"]["LUXURY"],
            serde_json::json!([200.0, 1000.0, 800.0])
        );
        assert!(json["locations"].get("NORMAL").is_none());

        let back: BusRoute = serde_json::from_value(json).unwrap();
        assert_eq!(back, route);
    }

    #[test]
    fn deserialize_rejects_inconsistent_records() {
        let mut json = serde_json::to_value(kandy_route()).unwrap();
        json["fareMatrix"]["LUXURY"] = serde_json::json!([1.0, 2.0]);
        assert!(serde_json::from_value::<BusRoute>(json).is_err());

        let mut json = serde_json::to_value(kandy_route()).unwrap();
        json["locations"]["SUPER_LUXURY"] = serde_json::json!(["Colombo"]);
        assert!(serde_json::from_value::<BusRoute>(json).is_err());
    }
}
