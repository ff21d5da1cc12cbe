//! Web layer for the fare finder.
//!
//! Serves the JSON route API under `/api/routes` and the HTML search pages.

mod dto;
mod error;
mod routes;
mod state;
pub mod templates;

pub use dto::*;
pub use error::AppError;
pub use routes::create_router;
pub use state::AppState;
pub use templates::*;
