//! Data transfer objects for web requests and responses.
//!
//! JSON field names are camelCase on the wire.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::domain::{BusRoute, BusType, DomainError, RouteId, StopSequence};
use crate::fares::Fare;
use crate::lookup::FareQuote;

use super::error::{AppError, invalid_bus_types};

/// Route identity, as listed in the search form.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RouteSummary {
    pub id: RouteId,
    pub number: String,
    pub name: String,
}

impl RouteSummary {
    pub fn from_route(route: &BusRoute) -> Self {
        Self {
            id: route.id(),
            number: route.number().to_string(),
            name: route.name().to_string(),
        }
    }
}

/// Response for the route list.
#[derive(Debug, Serialize)]
pub struct RouteListResponse {
    pub routes: Vec<RouteSummary>,
}

/// Response for a route's cities.
#[derive(Debug, Serialize)]
pub struct CitiesResponse {
    pub cities: Vec<String>,
}

/// Request to look up fares between two cities.
///
/// Fields are untyped here so that missing or mistyped fields are reported
/// together rather than as a JSON parse error.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchFareRequest {
    pub route_id: Option<Value>,
    pub from_city: Option<Value>,
    pub to_city: Option<Value>,
    pub bus_types: Option<Value>,
}

/// Query string of the HTML search form.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct SearchPageQuery {
    pub route_id: String,
    pub from_city: String,
    pub to_city: String,
    /// A single bus type code; empty for all
    pub bus_type: String,
}

impl From<SearchPageQuery> for SearchFareRequest {
    fn from(query: SearchPageQuery) -> Self {
        let bus_type = query.bus_type.trim();
        Self {
            route_id: Some(Value::String(query.route_id)),
            from_city: Some(Value::String(query.from_city)),
            to_city: Some(Value::String(query.to_city)),
            bus_types: (!bus_type.is_empty())
                .then(|| Value::Array(vec![Value::String(bus_type.to_string())])),
        }
    }
}

/// A [`SearchFareRequest`] with every required field present.
#[derive(Debug, Clone, PartialEq)]
pub struct FareSearch {
    pub route_id: RouteId,
    pub from_city: String,
    pub to_city: String,
    /// Bus type codes as sent, checked by [`parse_bus_types`]
    pub bus_types: Vec<String>,
}

impl SearchFareRequest {
    /// Check required fields and their types, collecting every problem.
    pub fn validate(self) -> Result<FareSearch, AppError> {
        let mut errors = Vec::new();
        let route_id = required(self.route_id, "routeId", &mut errors);
        let from_city = required(self.from_city, "fromCity", &mut errors);
        let to_city = required(self.to_city, "toCity", &mut errors);
        let bus_types = string_list(self.bus_types, "busTypes", &mut errors);

        let route_id = match route_id.as_deref().map(RouteId::parse) {
            Some(Ok(id)) => Some(id),
            Some(Err(_)) => {
                errors.push("routeId must be a valid route ID".to_string());
                None
            }
            None => None,
        };

        match (route_id, from_city, to_city) {
            (Some(route_id), Some(from_city), Some(to_city)) if errors.is_empty() => {
                Ok(FareSearch {
                    route_id,
                    from_city,
                    to_city,
                    bus_types,
                })
            }
            _ => Err(AppError::Validation {
                message: "Invalid fare search request".into(),
                errors,
                details: None,
            }),
        }
    }
}

fn required(value: Option<Value>, field: &str, errors: &mut Vec<String>) -> Option<String> {
    match value {
        Some(Value::String(v)) if !v.trim().is_empty() => Some(v.trim().to_string()),
        None | Some(Value::Null) | Some(Value::String(_)) => {
            errors.push(format!("{field} is required"));
            None
        }
        Some(_) => {
            errors.push(format!("{field} must be a string"));
            None
        }
    }
}

/// An optional array of strings; absent or `null` is empty.
fn string_list(value: Option<Value>, field: &str, errors: &mut Vec<String>) -> Vec<String> {
    let items = match value {
        None | Some(Value::Null) => return Vec::new(),
        Some(Value::Array(items)) => items,
        Some(_) => {
            errors.push(format!("{field} must be an array"));
            return Vec::new();
        }
    };
    let mut strings = Vec::with_capacity(items.len());
    for item in items {
        match item {
            Value::String(s) => strings.push(s),
            _ => {
                errors.push(format!("all {field} must be strings"));
                return Vec::new();
            }
        }
    }
    strings
}

/// Parse bus type codes, reporting every unknown one.
pub fn parse_bus_types(codes: &[String]) -> Result<Vec<BusType>, AppError> {
    let mut parsed = Vec::with_capacity(codes.len());
    let mut invalid = Vec::new();
    for code in codes {
        match BusType::parse(code) {
            Ok(bt) => parsed.push(bt),
            Err(e) => invalid.push(e.value().to_string()),
        }
    }
    if invalid.is_empty() {
        Ok(parsed)
    } else {
        Err(invalid_bus_types(invalid))
    }
}

/// Successful fare lookup.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchFareResponse {
    pub status: &'static str,
    pub route: RouteSummary,
    pub from_city: String,
    pub to_city: String,
    /// Fare per bus type; `null` where the bus type does not serve both cities
    pub results: BTreeMap<BusType, Option<Fare>>,
}

impl SearchFareResponse {
    pub fn new(route: &BusRoute, quote: FareQuote) -> Self {
        Self {
            status: "success",
            route: RouteSummary::from_route(route),
            from_city: quote.from_city,
            to_city: quote.to_city,
            results: quote.fares,
        }
    }
}

/// Request to create a route.
///
/// A bus type with stops but no fares gets every fare at the default.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateRouteRequest {
    pub number: String,
    pub name: String,
    #[serde(default)]
    pub bus_types: Vec<BusType>,
    #[serde(default)]
    pub locations: BTreeMap<BusType, Vec<String>>,
    #[serde(default)]
    pub fare_matrix: BTreeMap<BusType, Vec<Fare>>,
}

impl CreateRouteRequest {
    pub fn into_route(self) -> Result<BusRoute, DomainError> {
        let mut route = BusRoute::new(&self.number, &self.name, self.bus_types)?;
        for (bus_type, names) in self.locations {
            route.replace_stops(bus_type, StopSequence::new(names)?)?;
        }
        for (bus_type, fares) in self.fare_matrix {
            route.replace_fares(bus_type, fares)?;
        }
        Ok(route)
    }
}

/// Partial update of a route. Absent fields are left alone.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateRouteRequest {
    pub number: Option<String>,
    pub name: Option<String>,
    pub bus_types: Option<Vec<BusType>>,
    /// Replaces every stop sequence; offered bus types missing from the map
    /// lose their stops
    pub locations: Option<BTreeMap<BusType, Vec<String>>>,
    /// Replaces the listed bus types' fares, sized for their new stops
    pub fare_matrix: Option<BTreeMap<BusType, Vec<Fare>>>,
}

impl UpdateRouteRequest {
    /// Apply the update to `route`.
    ///
    /// Fares of stop pairs that survive a change of stops are carried over by
    /// stop name. On error `route` may be partly updated, so apply to a copy.
    pub fn apply(self, route: &mut BusRoute) -> Result<(), DomainError> {
        if let Some(number) = &self.number {
            route.set_number(number)?;
        }
        if let Some(name) = &self.name {
            route.set_name(name)?;
        }
        if let Some(bus_types) = self.bus_types {
            route.set_bus_types(bus_types)?;
        }

        if let Some(locations) = self.locations {
            let dropped: Vec<BusType> = route
                .bus_types()
                .iter()
                .copied()
                .filter(|bt| !locations.contains_key(bt))
                .collect();
            for bus_type in dropped {
                route.replace_stops(bus_type, StopSequence::empty())?;
            }
            for (bus_type, names) in locations {
                route.replace_stops(bus_type, StopSequence::new(names)?)?;
            }
        }

        if let Some(fare_matrix) = self.fare_matrix {
            for (bus_type, fares) in fare_matrix {
                route.replace_fares(bus_type, fares)?;
            }
        }
        Ok(())
    }
}

/// Request to add a stop to one bus type's sequence.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InsertStopRequest {
    pub bus_type: BusType,
    pub name: String,
    /// Zero-based position; appends when absent
    pub position: Option<usize>,
}

/// Request to set the fare between two stops.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SetFareRequest {
    pub bus_type: BusType,
    pub from_city: String,
    pub to_city: String,
    pub fare: Fare,
}

/// Plain acknowledgement.
#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: String,
}

/// Error response.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    /// Always `"error"`
    pub status: &'static str,

    /// Error category, e.g. `"ValidationError"`
    #[serde(rename = "type")]
    pub kind: &'static str,

    pub message: String,

    /// Individual validation failures
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub errors: Vec<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<Value>,
}

impl ErrorResponse {
    pub fn new(
        kind: &'static str,
        message: String,
        errors: Vec<String>,
        details: Option<Value>,
    ) -> Self {
        Self {
            status: "error",
            kind,
            message,
            errors,
            details,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fares::MatrixError;
    use serde_json::json;

    fn kandy_route() -> BusRoute {
        let request: CreateRouteRequest = serde_json::from_value(json!({
            "number": "1",
            "name": "Colombo - Kandy",
            "busTypes": ["LUXURY", "NORMAL"],
            "locations": {
                "LUXURY": ["Colombo", "Kadawatha", "Kandy"],
                "NORMAL": ["Colombo", "Kandy"]
            },
            "fareMatrix": { "LUXURY": [200.0, 1000.0, 800.0] }
        }))
        .unwrap();
        request.into_route().unwrap()
    }

    #[test]
    fn create_request_builds_route() {
        let route = kandy_route();
        assert_eq!(route.number(), "1");
        let luxury = route.line(BusType::Luxury).unwrap();
        assert_eq!(luxury.fare_between("Colombo", "Kandy"), Some(1000.0));
        // No fares given for NORMAL, so they start at the default
        let normal = route.line(BusType::Normal).unwrap();
        assert_eq!(normal.fares(), &[0.0]);
    }

    #[test]
    fn create_request_rejects_wrong_fare_size() {
        let request: CreateRouteRequest = serde_json::from_value(json!({
            "number": "1",
            "name": "Colombo - Kandy",
            "busTypes": ["LUXURY"],
            "locations": { "LUXURY": ["Colombo", "Kandy"] },
            "fareMatrix": { "LUXURY": [1.0, 2.0] }
        }))
        .unwrap();
        let err = request.into_route().unwrap_err();
        assert!(matches!(
            err,
            DomainError::Matrix {
                source: MatrixError::SizeMismatch { expected: 1, actual: 2, .. },
                ..
            }
        ));
    }

    #[test]
    fn create_request_rejects_stops_for_unoffered_bus_type() {
        let request: CreateRouteRequest = serde_json::from_value(json!({
            "number": "1",
            "name": "Colombo - Kandy",
            "busTypes": ["LUXURY"],
            "locations": { "NORMAL": ["Colombo", "Kandy"] }
        }))
        .unwrap();
        assert_eq!(
            request.into_route().unwrap_err(),
            DomainError::BusTypeNotOffered(BusType::Normal)
        );
    }

    #[test]
    fn update_carries_fares_by_stop_name() {
        let mut route = kandy_route();
        let update: UpdateRouteRequest = serde_json::from_value(json!({
            "locations": {
                "LUXURY": ["Colombo", "Kadawatha", "Kegalle", "Kandy"],
                "NORMAL": ["Colombo", "Kandy"]
            }
        }))
        .unwrap();
        update.apply(&mut route).unwrap();

        let luxury = route.line(BusType::Luxury).unwrap();
        assert_eq!(luxury.stop_count(), 4);
        assert_eq!(luxury.fare_between("Colombo", "Kandy"), Some(1000.0));
        assert_eq!(luxury.fare_between("Kadawatha", "Kandy"), Some(800.0));
        assert_eq!(luxury.fare_between("Kegalle", "Kandy"), Some(0.0));
    }

    #[test]
    fn update_locations_replaces_every_sequence() {
        let mut route = kandy_route();
        let update: UpdateRouteRequest = serde_json::from_value(json!({
            "locations": { "LUXURY": ["Colombo", "Kandy"] }
        }))
        .unwrap();
        update.apply(&mut route).unwrap();
        assert!(route.line(BusType::Normal).is_none());
        assert_eq!(
            route.line(BusType::Luxury).unwrap().fares(),
            &[1000.0]
        );
    }

    #[test]
    fn update_fares_must_fit_new_stops() {
        let mut route = kandy_route();
        let update: UpdateRouteRequest = serde_json::from_value(json!({
            "locations": {
                "LUXURY": ["Colombo", "Kandy"],
                "NORMAL": ["Colombo", "Kandy"]
            },
            "fareMatrix": { "LUXURY": [200.0, 1000.0, 800.0] }
        }))
        .unwrap();
        let err = update.apply(&mut route).unwrap_err();
        assert!(matches!(
            err,
            DomainError::Matrix {
                bus_type: BusType::Luxury,
                source: MatrixError::SizeMismatch { expected: 1, actual: 3, .. }
            }
        ));
    }

    #[test]
    fn empty_update_changes_nothing() {
        let mut route = kandy_route();
        let before = route.clone();
        UpdateRouteRequest::default().apply(&mut route).unwrap();
        assert_eq!(route, before);
    }

    #[test]
    fn search_request_reports_every_missing_field() {
        let request: SearchFareRequest = serde_json::from_value(json!({ "fromCity": " " })).unwrap();
        let Err(AppError::Validation { errors, .. }) = request.validate() else {
            panic!("expected a validation error");
        };
        assert_eq!(
            errors,
            vec![
                "routeId is required",
                "fromCity is required",
                "toCity is required",
            ]
        );
    }

    #[test]
    fn search_request_rejects_malformed_route_id() {
        let request = SearchFareRequest {
            route_id: Some(json!("route-1")),
            from_city: Some(json!("Colombo")),
            to_city: Some(json!("Kandy")),
            bus_types: None,
        };
        let Err(AppError::Validation { errors, .. }) = request.validate() else {
            panic!("expected a validation error");
        };
        assert_eq!(errors, vec!["routeId must be a valid route ID"]);
    }

    #[test]
    fn search_request_reports_wrong_types() {
        let request: SearchFareRequest = serde_json::from_value(json!({
            "routeId": 5,
            "fromCity": "Colombo",
            "toCity": ["Kandy"],
            "busTypes": "LUXURY"
        }))
        .unwrap();
        let Err(AppError::Validation { errors, .. }) = request.validate() else {
            panic!("expected a validation error");
        };
        assert_eq!(
            errors,
            vec![
                "routeId must be a string",
                "toCity must be a string",
                "busTypes must be an array",
            ]
        );
    }

    #[test]
    fn search_request_rejects_non_string_bus_types() {
        let request: SearchFareRequest = serde_json::from_value(json!({
            "routeId": RouteId::generate().to_string(),
            "fromCity": "Colombo",
            "toCity": "Kandy",
            "busTypes": ["LUXURY", 3, null]
        }))
        .unwrap();
        let Err(AppError::Validation { errors, .. }) = request.validate() else {
            panic!("expected a validation error");
        };
        assert_eq!(errors, vec!["all busTypes must be strings"]);
    }

    #[test]
    fn search_request_treats_null_as_missing() {
        let request: SearchFareRequest = serde_json::from_value(json!({
            "routeId": null,
            "fromCity": "Colombo",
            "toCity": "Kandy",
            "busTypes": null
        }))
        .unwrap();
        let Err(AppError::Validation { errors, .. }) = request.validate() else {
            panic!("expected a validation error");
        };
        assert_eq!(errors, vec!["routeId is required"]);
    }

    #[test]
    fn search_request_validates() {
        let id = RouteId::generate();
        let request: SearchFareRequest = serde_json::from_value(json!({
            "routeId": id.to_string(),
            "fromCity": " Colombo",
            "toCity": "Kandy",
            "busTypes": ["LUXURY"]
        }))
        .unwrap();
        let search = request.validate().unwrap();
        assert_eq!(search.route_id, id);
        assert_eq!(search.from_city, "Colombo");
        assert_eq!(search.bus_types, vec!["LUXURY"]);
    }

    #[test]
    fn search_page_query_with_all_bus_types() {
        let query = SearchPageQuery {
            route_id: RouteId::generate().to_string(),
            from_city: "Colombo".into(),
            to_city: "Kandy".into(),
            bus_type: String::new(),
        };
        let search = SearchFareRequest::from(query).validate().unwrap();
        assert!(search.bus_types.is_empty());
    }

    #[test]
    fn bus_type_codes_are_checked() {
        assert_eq!(
            parse_bus_types(&["NORMAL".into(), "LUXURY".into()]).unwrap(),
            vec![BusType::Normal, BusType::Luxury]
        );
        let err = parse_bus_types(&["NORMAL".into(), "EXPRESSWAY".into(), "AC".into()]).unwrap_err();
        let AppError::Validation { details, .. } = err else {
            panic!("expected a validation error");
        };
        assert_eq!(
            details.unwrap()["invalidTypes"],
            json!(["EXPRESSWAY", "AC"])
        );
    }

    #[test]
    fn search_response_shape() {
        let route = kandy_route();
        let quote = FareQuote {
            from_city: "Colombo".into(),
            to_city: "Kandy".into(),
            fares: BTreeMap::from([(BusType::Luxury, Some(1000.0)), (BusType::Normal, None)]),
        };
        let json = serde_json::to_value(SearchFareResponse::new(&route, quote)).unwrap();
        assert_eq!(json["status"], "success");
        assert_eq!(json["route"]["number"], "1");
        assert_eq!(json["route"]["id"], route.id().to_string());
        assert_eq!(json["fromCity"], "Colombo");
        assert_eq!(json["results"], json!({ "LUXURY": 1000.0, "NORMAL": null }));
    }

    #[test]
    fn error_response_omits_empty_fields() {
        let body = ErrorResponse::new("NotFoundError", "Route not found".into(), Vec::new(), None);
        assert_eq!(
            serde_json::to_value(body).unwrap(),
            json!({ "status": "error", "type": "NotFoundError", "message": "Route not found" })
        );
    }
}
