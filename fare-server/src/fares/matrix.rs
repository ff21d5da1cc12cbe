//! A stop sequence together with its flat fare array.

use crate::domain::StopSequence;

use super::codec::{self, DEFAULT_FARE, Fare, MatrixError};

/// The fares between every pair of stops on one bus type's stop sequence.
///
/// The fare array always has exactly [`codec::pair_count`] entries for the
/// current stop count; every edit to the stops produces a new array of the
/// right size, carrying forward the fares of pairs that still exist.
#[derive(Debug, Clone, PartialEq)]
pub struct FareMatrix {
    stops: StopSequence,
    fares: Vec<Fare>,
}

/// One priced stop pair, as yielded by [`FareMatrix::entries`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FareEntry<'a> {
    pub from: &'a str,
    pub to: &'a str,
    pub fare: Fare,
}

/// One row of [`FareMatrix::rows`].
#[derive(Debug, Clone, PartialEq)]
pub struct FareRow<'a> {
    pub stop: &'a str,
    pub cells: Vec<Option<Fare>>,
}

impl FareMatrix {
    /// A matrix over `stops` with every fare at [`DEFAULT_FARE`].
    pub fn new(stops: StopSequence) -> Self {
        let fares = vec![DEFAULT_FARE; codec::pair_count(stops.len())];
        Self { stops, fares }
    }

    /// Pair an existing fare array with its stops.
    ///
    /// Fails if the array size does not match the stop count or a fare is
    /// negative or not finite.
    pub fn from_parts(stops: StopSequence, fares: Vec<Fare>) -> Result<Self, MatrixError> {
        codec::check_size(&fares, stops.len())?;
        for &fare in &fares {
            validate_fare(fare)?;
        }
        Ok(Self { stops, fares })
    }

    pub fn stops(&self) -> &StopSequence {
        &self.stops
    }

    /// The flat fare array, in storage order.
    pub fn fares(&self) -> &[Fare] {
        &self.fares
    }

    pub fn stop_count(&self) -> usize {
        self.stops.len()
    }

    pub fn into_parts(self) -> (StopSequence, Vec<Fare>) {
        (self.stops, self.fares)
    }

    /// Fare between the stops at two positions, in either order.
    ///
    /// `None` if either position is out of range or both are the same stop.
    pub fn fare(&self, a: usize, b: usize) -> Option<Fare> {
        self.slot(a, b).map(|index| self.fares[index])
    }

    /// Fare between two stops by name, in either order.
    pub fn fare_between(&self, a: &str, b: &str) -> Option<Fare> {
        let (a, b) = (self.stops.position(a)?, self.stops.position(b)?);
        self.fare(a, b)
    }

    /// Set the fare between the stops at two positions.
    pub fn set_fare(&mut self, a: usize, b: usize, fare: Fare) -> Result<(), MatrixError> {
        let index = self.slot(a, b).ok_or(MatrixError::InvalidPair(a, b))?;
        self.fares[index] = validate_fare(fare)?;
        Ok(())
    }

    /// Set the fare between two stops by name.
    pub fn set_fare_between(&mut self, a: &str, b: &str, fare: Fare) -> Result<(), MatrixError> {
        let a = self.position_of(a)?;
        let b = self.position_of(b)?;
        self.set_fare(a, b, fare)
    }

    /// Insert a new stop at `position` (`0..=len`).
    ///
    /// The new stop's fares start at [`DEFAULT_FARE`].
    pub fn insert_stop(&mut self, position: usize, name: &str) -> Result<(), MatrixError> {
        let count = self.stops.len();
        if position > count {
            return Err(MatrixError::PositionOutOfRange {
                position,
                stops: count,
            });
        }
        let mut names: Vec<&str> = self.stops.iter().collect();
        names.insert(position, name);
        let stops = StopSequence::new(names)?;

        self.fares = codec::insert_stop(&self.fares, count, position)?;
        self.stops = stops;
        Ok(())
    }

    /// Append a stop at the end of the sequence.
    pub fn push_stop(&mut self, name: &str) -> Result<(), MatrixError> {
        self.insert_stop(self.stops.len(), name)
    }

    /// Remove the stop at `position`, dropping its fares. Returns its name.
    pub fn remove_stop(&mut self, position: usize) -> Result<String, MatrixError> {
        let count = self.stops.len();
        let removed = self
            .stops
            .get(position)
            .ok_or(MatrixError::PositionOutOfRange {
                position,
                stops: count,
            })?
            .to_string();
        let stops = StopSequence::new(
            self.stops
                .iter()
                .enumerate()
                .filter(|&(i, _)| i != position)
                .map(|(_, s)| s),
        )?;

        self.fares = codec::remove_stop(&self.fares, count, position)?;
        self.stops = stops;
        Ok(removed)
    }

    /// Remove a stop by name. Returns the position it occupied.
    pub fn remove_stop_named(&mut self, name: &str) -> Result<usize, MatrixError> {
        let position = self.position_of(name)?;
        self.remove_stop(position)?;
        Ok(position)
    }

    /// Move the stop at `from` so it ends up at position `to`.
    pub fn move_stop(&mut self, from: usize, to: usize) -> Result<(), MatrixError> {
        let count = self.stops.len();
        let fares = codec::move_stop(&self.fares, count, from, to)?;
        let mut names: Vec<&str> = self.stops.iter().collect();
        let name = names.remove(from);
        names.insert(to, name);
        let stops = StopSequence::new(names)?;

        self.fares = fares;
        self.stops = stops;
        Ok(())
    }

    /// A matrix over a replacement stop sequence.
    ///
    /// Every pair of stops present in both sequences keeps its fare, whatever
    /// positions the two stops now occupy. Pairs involving a new stop start
    /// at [`DEFAULT_FARE`].
    pub fn with_stops(&self, stops: StopSequence) -> Result<Self, MatrixError> {
        let fares = codec::reindex(&self.fares, self.stops.len(), stops.len(), |i| {
            self.stops.get(i).and_then(|name| stops.position(name))
        })?;
        Ok(Self { stops, fares })
    }

    /// Every stop pair with its fare, in storage order.
    pub fn entries(&self) -> impl Iterator<Item = FareEntry<'_>> + '_ {
        self.fares.iter().enumerate().filter_map(|(index, &fare)| {
            let (from, to) = codec::pair_at(index);
            Some(FareEntry {
                from: self.stops.get(from)?,
                to: self.stops.get(to)?,
                fare,
            })
        })
    }

    /// The upper triangle as a grid, one row per stop.
    ///
    /// Cell `j` of row `i` is the fare from stop `i` to stop `j` when
    /// `i < j`, and `None` on and below the diagonal.
    pub fn rows(&self) -> Vec<FareRow<'_>> {
        let n = self.stops.len();
        self.stops
            .iter()
            .enumerate()
            .map(|(i, stop)| FareRow {
                stop,
                cells: (0..n)
                    .map(|j| codec::fare_index(i, j, n).map(|k| self.fares[k]))
                    .collect(),
            })
            .collect()
    }

    fn slot(&self, a: usize, b: usize) -> Option<usize> {
        codec::fare_index(a.min(b), a.max(b), self.stops.len())
    }

    fn position_of(&self, name: &str) -> Result<usize, MatrixError> {
        self.stops
            .position(name)
            .ok_or_else(|| MatrixError::UnknownStop(name.trim().to_string()))
    }
}

fn validate_fare(fare: Fare) -> Result<Fare, MatrixError> {
    if fare.is_finite() && fare >= 0.0 {
        Ok(fare)
    } else {
        Err(MatrixError::InvalidFare(fare))
    }
}
