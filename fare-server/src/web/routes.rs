//! HTTP route handlers.

use std::path::Path as FsPath;

use askama::Template;
use axum::body::Bytes;
use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    response::{Html, IntoResponse, Response},
    routing::{delete, get, post, put},
};
use serde::de::DeserializeOwned;
use tower_http::services::ServeDir;
use tracing::{debug, warn};

use crate::domain::{BusRoute, BusType, RouteId};
use crate::lookup::{FareQuote, cities, quote_fares};

use super::dto::*;
use super::error::{AppError, invalid_bus_types};
use super::state::AppState;
use super::templates::*;

/// Create the application router.
///
/// `static_dir` is the path to the static assets directory.
pub fn create_router(state: AppState, static_dir: impl AsRef<FsPath>) -> Router {
    Router::new()
        .route("/", get(index_page))
        .route("/health", get(health))
        .route("/about", get(about_page))
        .route("/search", get(search_page))
        .route("/routes/:id/matrix", get(matrix_page))
        .route("/api/routes", get(list_routes).post(create_route))
        .route("/api/routes/list", get(list_route_summaries))
        .route("/api/routes/search-fare", post(search_fare))
        .route(
            "/api/routes/:id",
            get(get_route).patch(update_route).delete(delete_route),
        )
        .route("/api/routes/:id/cities", get(route_cities))
        .route("/api/routes/:id/stops", post(insert_stop))
        .route(
            "/api/routes/:id/stops/:bus_type/:name",
            delete(remove_stop),
        )
        .route("/api/routes/:id/fares", put(set_fare))
        .nest_service("/static", ServeDir::new(static_dir))
        .with_state(state)
}

/// Health check endpoint.
async fn health() -> &'static str {
    "ok"
}

/// Index page with search form.
async fn index_page(State(state): State<AppState>) -> Result<Html<String>, AppError> {
    let routes = state.store.list().await;
    render(&IndexTemplate {
        routes: routes.iter().map(RouteSummary::from_route).collect(),
        bus_types: BusTypeOption::all(),
    })
}

/// About page.
async fn about_page() -> Result<Html<String>, AppError> {
    render(&AboutTemplate)
}

/// Fare results for the search form.
async fn search_page(State(state): State<AppState>, Query(query): Query<SearchPageQuery>) -> Response {
    match search_results(&state, query).await {
        Ok(html) => html.into_response(),
        Err(e) => error_page(e),
    }
}

async fn search_results(state: &AppState, query: SearchPageQuery) -> Result<Html<String>, AppError> {
    let (route, quote) = find_fares(state, SearchFareRequest::from(query)).await?;
    render(&SearchResultsTemplate {
        route: RouteSummary::from_route(&route),
        results: FareResultView::from_quote(&quote),
        from_city: quote.from_city,
        to_city: quote.to_city,
    })
}

/// Every fare on a route, one grid per bus type.
async fn matrix_page(State(state): State<AppState>, Path(id): Path<String>) -> Response {
    match matrix_view(&state, &id).await {
        Ok(html) => html.into_response(),
        Err(e) => error_page(e),
    }
}

async fn matrix_view(state: &AppState, id: &str) -> Result<Html<String>, AppError> {
    let route = state.store.get(RouteId::parse(id)?).await?;
    render(&MatrixTemplate {
        route: RouteSummary::from_route(&route),
        last_updated: route.last_updated().format("%Y-%m-%d %H:%M UTC").to_string(),
        lines: LineView::from_route(&route),
    })
}

/// Route numbers and names for the search form.
async fn list_route_summaries(State(state): State<AppState>) -> Json<RouteListResponse> {
    let routes = state.store.list().await;
    Json(RouteListResponse {
        routes: routes.iter().map(RouteSummary::from_route).collect(),
    })
}

/// Every city on a route.
async fn route_cities(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<CitiesResponse>, AppError> {
    let route = state.store.get(RouteId::parse(&id)?).await?;
    Ok(Json(CitiesResponse {
        cities: cities(&route),
    }))
}

/// Look up the fare between two cities on a route.
async fn search_fare(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Json<SearchFareResponse>, AppError> {
    let req: SearchFareRequest = parse_json(&body)?;
    let (route, quote) = find_fares(&state, req).await?;
    Ok(Json(SearchFareResponse::new(&route, quote)))
}

/// Shared by the JSON and HTML searches.
///
/// Missing fields are reported before an unknown route, and an unknown
/// route before bad bus types or cities.
async fn find_fares(
    state: &AppState,
    req: SearchFareRequest,
) -> Result<(BusRoute, FareQuote), AppError> {
    let search = req.validate()?;
    let route = state.store.get(search.route_id).await?;
    let bus_types = parse_bus_types(&search.bus_types)?;
    let quote = quote_fares(&route, &search.from_city, &search.to_city, &bus_types)?;
    debug!(
        route = route.number(),
        from = %quote.from_city,
        to = %quote.to_city,
        "fare lookup"
    );
    Ok((route, quote))
}

/// Every route with its stops and fares.
async fn list_routes(State(state): State<AppState>) -> Json<Vec<BusRoute>> {
    Json(state.store.list().await)
}

async fn get_route(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<BusRoute>, AppError> {
    let route = state.store.get(RouteId::parse(&id)?).await?;
    Ok(Json(route))
}

async fn create_route(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<(StatusCode, Json<BusRoute>), AppError> {
    let req: CreateRouteRequest = parse_json(&body)?;
    let route = state.store.create(req.into_route()?).await?;
    Ok((StatusCode::CREATED, Json(route)))
}

async fn update_route(
    State(state): State<AppState>,
    Path(id): Path<String>,
    body: Bytes,
) -> Result<Json<BusRoute>, AppError> {
    let id = RouteId::parse(&id)?;
    let req: UpdateRouteRequest = parse_json(&body)?;
    let route = state
        .store
        .update(id, |route| -> Result<(), AppError> { Ok(req.apply(route)?) })
        .await?;
    Ok(Json(route))
}

async fn delete_route(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<MessageResponse>, AppError> {
    state.store.delete(RouteId::parse(&id)?).await?;
    Ok(Json(MessageResponse {
        message: "Route deleted".into(),
    }))
}

/// Add a stop to one bus type's sequence, re-indexing its fares.
async fn insert_stop(
    State(state): State<AppState>,
    Path(id): Path<String>,
    body: Bytes,
) -> Result<Json<BusRoute>, AppError> {
    let id = RouteId::parse(&id)?;
    let req: InsertStopRequest = parse_json(&body)?;
    let route = state
        .store
        .update(id, |route| -> Result<(), AppError> {
            route.edit_line(req.bus_type, |matrix| match req.position {
                Some(position) => matrix.insert_stop(position, &req.name),
                None => matrix.push_stop(&req.name),
            })?;
            Ok(())
        })
        .await?;
    Ok(Json(route))
}

/// Remove a stop from one bus type's sequence, dropping its fares.
async fn remove_stop(
    State(state): State<AppState>,
    Path((id, bus_type, name)): Path<(String, String, String)>,
) -> Result<Json<BusRoute>, AppError> {
    let id = RouteId::parse(&id)?;
    let bus_type = BusType::parse(&bus_type).map_err(|e| invalid_bus_types(vec![e.value().to_string()]))?;
    let route = state
        .store
        .update(id, |route| -> Result<(), AppError> {
            route.edit_line(bus_type, |matrix| matrix.remove_stop_named(&name))?;
            Ok(())
        })
        .await?;
    Ok(Json(route))
}

/// Set the fare between two stops of one bus type.
async fn set_fare(
    State(state): State<AppState>,
    Path(id): Path<String>,
    body: Bytes,
) -> Result<Json<BusRoute>, AppError> {
    let id = RouteId::parse(&id)?;
    let req: SetFareRequest = parse_json(&body)?;
    let route = state
        .store
        .update(id, |route| -> Result<(), AppError> {
            route.edit_line(req.bus_type, |matrix| {
                matrix.set_fare_between(&req.from_city, &req.to_city, req.fare)
            })?;
            Ok(())
        })
        .await?;
    Ok(Json(route))
}

/// Parse a JSON body manually so we can log it on failure.
fn parse_json<T: DeserializeOwned>(body: &Bytes) -> Result<T, AppError> {
    serde_json::from_slice(body).map_err(|e| {
        debug!(body = %String::from_utf8_lossy(body), "rejected request body");
        AppError::validation(format!("Invalid JSON: {e}"))
    })
}

fn render(template: &impl Template) -> Result<Html<String>, AppError> {
    template.render().map(Html).map_err(|e| AppError::Internal {
        message: format!("Template error: {e}"),
    })
}

/// Render an error as an HTML page with the matching status.
fn error_page(err: AppError) -> Response {
    let status = err.status();
    let title = match status {
        StatusCode::BAD_REQUEST => "Invalid search",
        StatusCode::NOT_FOUND => "Not found",
        _ => "Something went wrong",
    };
    let (message, details) = match &err {
        AppError::Internal { .. } => ("Please try again later.".to_string(), None),
        AppError::Validation { message, errors, details } => {
            let mut lines = errors.clone();
            if let Some(available) = details
                .as_ref()
                .and_then(|d| d.get("availableCities"))
                .and_then(|c| c.as_array())
            {
                let names: Vec<&str> = available.iter().filter_map(|c| c.as_str()).collect();
                lines.push(format!("Cities on this route: {}", names.join(", ")));
            }
            (message.clone(), (!lines.is_empty()).then(|| lines.join("\n")))
        }
        other => (other.message().to_string(), None),
    };
    warn!(%status, message = err.message(), "page request failed");

    let page = ErrorTemplate {
        title: title.to_string(),
        message,
        details,
    };
    let html = page
        .render()
        .unwrap_or_else(|e| format!("Template error: {}", e));
    (status, Html(html)).into_response()
}
