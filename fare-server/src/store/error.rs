//! Route store error types.

use std::path::PathBuf;

use crate::domain::RouteId;

/// Errors that can occur when reading or writing routes.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// No route with this ID
    #[error("route {0} not found")]
    NotFound(RouteId),

    /// Another route already uses this number
    #[error("route number {0} is already in use")]
    DuplicateNumber(String),

    /// Reading or writing the snapshot file failed
    #[error("snapshot I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The snapshot file is not valid JSON or holds an invalid route
    #[error("snapshot {path} is corrupt: {source}")]
    Corrupt {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// The routes could not be serialized for the snapshot
    #[error("failed to encode snapshot {path}: {source}")]
    Encode {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// Two routes in the snapshot share an ID or number
    #[error("snapshot {path} is inconsistent: {message}")]
    Inconsistent { path: PathBuf, message: String },
}
