//! Ordered stop sequences.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

/// Error returned when a stop sequence is invalid.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum InvalidStops {
    /// A stop name is empty or only whitespace.
    #[error("stop at position {0} has an empty name")]
    EmptyName(usize),

    /// The same stop appears twice.
    #[error("duplicate stop: {0}")]
    Duplicate(String),
}

/// The stops a bus type calls at along a route, in physical order.
///
/// Names are trimmed and must be non-empty and unique, so a name identifies
/// exactly one position.
///
/// # Examples
///
/// ```
/// use fare_server::domain::StopSequence;
///
/// let stops = StopSequence::new(["Colombo", " Kadawatha ", "Kandy"]).unwrap();
/// assert_eq!(stops.position("Kadawatha"), Some(1));
///
/// assert!(StopSequence::new(["Kandy", "Kandy"]).is_err());
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<String>", into = "Vec<String>")]
pub struct StopSequence(Vec<String>);

impl StopSequence {
    /// Build a sequence, trimming each name.
    pub fn new<I, S>(stops: I) -> Result<Self, InvalidStops>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut seen = HashSet::new();
        let mut names = Vec::new();
        for (position, stop) in stops.into_iter().enumerate() {
            let name = stop.as_ref().trim();
            if name.is_empty() {
                return Err(InvalidStops::EmptyName(position));
            }
            if !seen.insert(name.to_string()) {
                return Err(InvalidStops::Duplicate(name.to_string()));
            }
            names.push(name.to_string());
        }
        Ok(StopSequence(names))
    }

    /// A sequence with no stops.
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Position of a stop by name (exact match after trimming the query).
    pub fn position(&self, name: &str) -> Option<usize> {
        let name = name.trim();
        self.0.iter().position(|s| s == name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.position(name).is_some()
    }

    pub fn get(&self, position: usize) -> Option<&str> {
        self.0.get(position).map(String::as_str)
    }

    pub fn iter(&self) -> impl DoubleEndedIterator<Item = &str> + ExactSizeIterator {
        self.0.iter().map(String::as_str)
    }

    pub fn as_slice(&self) -> &[String] {
        &self.0
    }
}

impl TryFrom<Vec<String>> for StopSequence {
    type Error = InvalidStops;

    fn try_from(stops: Vec<String>) -> Result<Self, Self::Error> {
        StopSequence::new(stops)
    }
}

impl From<StopSequence> for Vec<String> {
    fn from(stops: StopSequence) -> Self {
        stops.0
    }
}
