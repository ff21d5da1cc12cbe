//! Askama templates for the web frontend.

use askama::Template;

use crate::domain::{BusRoute, BusType};
use crate::fares::{Fare, FareMatrix};
use crate::lookup::FareQuote;

use super::dto::RouteSummary;

// ============================================================================
// Page Templates (extend base.html)
// ============================================================================

/// Home page with the fare search form.
#[derive(Template)]
#[template(path = "index.html")]
pub struct IndexTemplate {
    pub routes: Vec<RouteSummary>,
    pub bus_types: Vec<BusTypeOption>,
}

/// About page.
#[derive(Template)]
#[template(path = "about.html")]
pub struct AboutTemplate;

/// Error page.
#[derive(Template)]
#[template(path = "error.html")]
pub struct ErrorTemplate {
    pub title: String,
    pub message: String,
    pub details: Option<String>,
}

/// Fare search results.
#[derive(Template)]
#[template(path = "search_results.html")]
pub struct SearchResultsTemplate {
    pub route: RouteSummary,
    pub from_city: String,
    pub to_city: String,
    pub results: Vec<FareResultView>,
}

/// Every bus type's fare matrix for one route.
#[derive(Template)]
#[template(path = "matrix.html")]
pub struct MatrixTemplate {
    pub route: RouteSummary,
    pub last_updated: String,
    pub lines: Vec<LineView>,
}

// ============================================================================
// View Models (for templates)
// ============================================================================

/// A bus type choice in the search form.
#[derive(Debug, Clone, PartialEq)]
pub struct BusTypeOption {
    pub code: &'static str,
    pub label: &'static str,
}

impl BusTypeOption {
    pub fn all() -> Vec<Self> {
        BusType::ALL
            .iter()
            .map(|bt| Self {
                code: bt.as_str(),
                label: bt.label(),
            })
            .collect()
    }
}

/// One bus type's row in the search results.
#[derive(Debug, Clone, PartialEq)]
pub struct FareResultView {
    pub label: &'static str,
    pub fare: Option<String>,
}

impl FareResultView {
    pub fn from_quote(quote: &FareQuote) -> Vec<Self> {
        quote
            .fares
            .iter()
            .map(|(bt, fare)| Self {
                label: bt.label(),
                fare: fare.filter(|f| *f > 0.0).map(format_fare),
            })
            .collect()
    }

    /// The fare, or "N/A" when the bus type has no price for this trip.
    pub fn display_fare(&self) -> &str {
        self.fare.as_deref().unwrap_or("N/A")
    }
}

/// A bus type's fare matrix as a grid.
#[derive(Debug, Clone, PartialEq)]
pub struct LineView {
    pub label: &'static str,
    pub stops: Vec<String>,
    pub rows: Vec<MatrixRowView>,
}

/// One row of a [`LineView`]: fares from `stop` to every later stop.
///
/// Cells on and below the diagonal are empty strings.
#[derive(Debug, Clone, PartialEq)]
pub struct MatrixRowView {
    pub stop: String,
    pub cells: Vec<String>,
}

impl LineView {
    pub fn from_matrix(bus_type: BusType, matrix: &FareMatrix) -> Self {
        let rows = matrix
            .rows()
            .into_iter()
            .map(|row| MatrixRowView {
                stop: row.stop.to_string(),
                cells: row
                    .cells
                    .into_iter()
                    .map(|cell| cell.map(format_amount).unwrap_or_default())
                    .collect(),
            })
            .collect();
        Self {
            label: bus_type.label(),
            stops: matrix.stops().iter().map(str::to_string).collect(),
            rows,
        }
    }

    /// Views for every bus type on the route that has stops.
    pub fn from_route(route: &BusRoute) -> Vec<Self> {
        route
            .lines()
            .map(|(bt, matrix)| Self::from_matrix(bt, matrix))
            .collect()
    }
}

/// Fare with the currency prefix, e.g. "Rs. 450".
pub fn format_fare(fare: Fare) -> String {
    format!("Rs. {}", format_amount(fare))
}

/// Whole amounts without decimals, anything else to two places.
fn format_amount(fare: Fare) -> String {
    if fare.fract() == 0.0 {
        format!("{fare:.0}")
    } else {
        format!("{fare:.2}")
    }
}
