//! Domain error types.
//!
//! These errors represent validation failures when building or editing a
//! bus route. They are distinct from storage and HTTP errors.

use super::{BusType, InvalidStops};
use crate::fares::MatrixError;

/// Domain-level errors for route validation.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum DomainError {
    /// A required text field is empty
    #[error("{0} is required")]
    MissingField(&'static str),

    /// A bus type is listed twice
    #[error("duplicate bus type: {0}")]
    DuplicateBusType(BusType),

    /// Stops or fares were given for a bus type the route does not run
    #[error("bus type {0} is not offered on this route")]
    BusTypeNotOffered(BusType),

    /// A bus type's stops or fares are inconsistent
    #[error("invalid fares for {bus_type}: {source}")]
    Matrix {
        bus_type: BusType,
        #[source]
        source: MatrixError,
    },

    /// A stop sequence is invalid
    #[error(transparent)]
    Stops(#[from] InvalidStops),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display() {
        let err = DomainError::MissingField("name");
        assert_eq!(err.to_string(), "name is required");

        let err = DomainError::DuplicateBusType(BusType::Luxury);
        assert_eq!(err.to_string(), "duplicate bus type: LUXURY");

        let err = DomainError::BusTypeNotOffered(BusType::Normal);
        assert_eq!(err.to_string(), "bus type NORMAL is not offered on this route");

        let err = DomainError::Matrix {
            bus_type: BusType::SemiLuxury,
            source: MatrixError::SizeMismatch {
                stops: 3,
                expected: 3,
                actual: 2,
            },
        };
        assert_eq!(
            err.to_string(),
            "invalid fares for SEMI_LUXURY: fare array has 2 entries, expected 3 for 3 stops"
        );

        let err = DomainError::from(InvalidStops::Duplicate("Kandy".into()));
        assert_eq!(err.to_string(), "duplicate stop: Kandy");
    }
}
