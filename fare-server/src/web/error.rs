//! Error responses for the JSON API.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::{Value, json};
use tracing::{error, warn};

use crate::domain::{BusType, DomainError, InvalidRouteId};
use crate::fares::MatrixError;
use crate::lookup::LookupError;
use crate::store::StoreError;

use super::dto::ErrorResponse;

/// Application error type.
#[derive(Debug)]
pub enum AppError {
    /// The request was malformed or failed validation (400)
    Validation {
        message: String,
        errors: Vec<String>,
        details: Option<Value>,
    },
    /// The route does not exist (404)
    NotFound { message: String, details: Option<Value> },
    /// The request clashes with existing data (409)
    Conflict { message: String },
    /// Something went wrong on our side (500)
    Internal { message: String },
}

impl AppError {
    pub fn validation(message: impl Into<String>) -> Self {
        AppError::Validation {
            message: message.into(),
            errors: Vec::new(),
            details: None,
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            AppError::Validation { .. } => StatusCode::BAD_REQUEST,
            AppError::NotFound { .. } => StatusCode::NOT_FOUND,
            AppError::Conflict { .. } => StatusCode::CONFLICT,
            AppError::Internal { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// The `type` field of the error body.
    pub fn kind(&self) -> &'static str {
        match self {
            AppError::Validation { .. } => "ValidationError",
            AppError::NotFound { .. } => "NotFoundError",
            AppError::Conflict { .. } => "ConflictError",
            AppError::Internal { .. } => "ServerError",
        }
    }

    pub fn message(&self) -> &str {
        match self {
            AppError::Validation { message, .. }
            | AppError::NotFound { message, .. }
            | AppError::Conflict { message }
            | AppError::Internal { message } => message,
        }
    }

    fn into_body(self) -> ErrorResponse {
        let kind = self.kind();
        match self {
            AppError::Validation {
                message,
                errors,
                details,
            } => ErrorResponse::new(kind, message, errors, details),
            AppError::NotFound { message, details } => {
                ErrorResponse::new(kind, message, Vec::new(), details)
            }
            // Internal details stay in the log.
            AppError::Conflict { message } => ErrorResponse::new(kind, message, Vec::new(), None),
            AppError::Internal { .. } => {
                ErrorResponse::new(kind, "Internal server error".into(), Vec::new(), None)
            }
        }
    }
}

impl From<StoreError> for AppError {
    fn from(e: StoreError) -> Self {
        match e {
            StoreError::NotFound(id) => AppError::NotFound {
                message: "Route not found".into(),
                details: Some(json!({ "routeId": id })),
            },
            StoreError::DuplicateNumber(_) => AppError::Conflict {
                message: e.to_string(),
            },
            StoreError::Io { .. }
            | StoreError::Corrupt { .. }
            | StoreError::Encode { .. }
            | StoreError::Inconsistent { .. } => AppError::Internal {
                message: e.to_string(),
            },
        }
    }
}

impl From<DomainError> for AppError {
    fn from(e: DomainError) -> Self {
        AppError::validation(e.to_string())
    }
}

impl From<MatrixError> for AppError {
    fn from(e: MatrixError) -> Self {
        AppError::validation(e.to_string())
    }
}

impl From<InvalidRouteId> for AppError {
    fn from(e: InvalidRouteId) -> Self {
        AppError::Validation {
            message: e.to_string(),
            errors: vec!["routeId must be a valid route ID".into()],
            details: None,
        }
    }
}

impl From<LookupError> for AppError {
    fn from(e: LookupError) -> Self {
        let message = "One or both cities not found in route".to_string();
        match e {
            LookupError::UnknownCity {
                from_valid,
                to_valid,
                available,
            } => AppError::Validation {
                message,
                errors: Vec::new(),
                details: Some(json!({
                    "fromCity": validity(from_valid),
                    "toCity": validity(to_valid),
                    "availableCities": available,
                })),
            },
        }
    }
}

fn validity(valid: bool) -> &'static str {
    if valid { "valid" } else { "invalid" }
}

/// Error for bus type names that are not recognised.
pub fn invalid_bus_types(invalid: Vec<String>) -> AppError {
    let valid: Vec<&str> = BusType::ALL.iter().map(BusType::as_str).collect();
    AppError::Validation {
        message: "Invalid bus types provided".into(),
        errors: Vec::new(),
        details: Some(json!({
            "invalidTypes": invalid,
            "validBusTypes": valid,
        })),
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            error!(%status, message = self.message(), "request failed");
        } else {
            warn!(%status, message = self.message(), "request rejected");
        }

        (status, Json(self.into_body())).into_response()
    }
}
