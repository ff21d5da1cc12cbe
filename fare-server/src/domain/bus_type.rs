//! Bus service class type.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Error returned when parsing an unknown bus type.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid bus type: {value}")]
pub struct InvalidBusType {
    value: String,
}

impl InvalidBusType {
    /// The rejected input.
    pub fn value(&self) -> &str {
        &self.value
    }
}

/// The class of bus a fare applies to.
///
/// Each class runs its own stop sequence along a route and has its own fares.
/// Variants are ordered from most to least expensive, which is also the order
/// results are listed in.
///
/// # Examples
///
/// ```
/// use fare_server::domain::BusType;
///
/// let bt = BusType::parse("SEMI_LUXURY").unwrap();
/// assert_eq!(bt, BusType::SemiLuxury);
/// assert_eq!(bt.label(), "Semi Luxury");
///
/// // Wire codes are case sensitive
/// assert!(BusType::parse("semi_luxury").is_err());
/// ```
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BusType {
    SuperLuxury,
    Luxury,
    SemiLuxury,
    Normal,
}

impl BusType {
    /// Every bus type, in display order.
    pub const ALL: [BusType; 4] = [
        BusType::SuperLuxury,
        BusType::Luxury,
        BusType::SemiLuxury,
        BusType::Normal,
    ];

    /// Parse a wire code such as `"LUXURY"`.
    pub fn parse(s: &str) -> Result<Self, InvalidBusType> {
        Self::ALL
            .into_iter()
            .find(|bt| bt.as_str() == s)
            .ok_or_else(|| InvalidBusType {
                value: s.to_string(),
            })
    }

    /// The wire code.
    pub fn as_str(&self) -> &'static str {
        match self {
            BusType::SuperLuxury => "SUPER_LUXURY",
            BusType::Luxury => "LUXURY",
            BusType::SemiLuxury => "SEMI_LUXURY",
            BusType::Normal => "NORMAL",
        }
    }

    /// Human-readable name.
    pub fn label(&self) -> &'static str {
        match self {
            BusType::SuperLuxury => "Super Luxury",
            BusType::Luxury => "Luxury",
            BusType::SemiLuxury => "Semi Luxury",
            BusType::Normal => "Normal",
        }
    }
}

impl fmt::Display for BusType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BusType {
    type Err = InvalidBusType;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}
