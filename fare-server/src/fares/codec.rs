//! Flat encoding of the upper-triangular fare matrix.
//!
//! Fares are symmetric (A to B costs the same as B to A), so only pairs
//! `(from, to)` with `from < to` are stored. Pairs are laid out column by
//! column: column `to` holds `(0, to), (1, to), ..., (to - 1, to)` in `to`
//! consecutive slots, and starts at the triangular number `to * (to - 1) / 2`.
//!
//! ```text
//!         to=1  to=2  to=3
//! from=0    0     1     3
//! from=1          2     4
//! from=2                5
//! ```
//!
//! Column offsets never depend on the number of stops, so a slot index is a
//! function of the pair alone; the stop count only bounds which pairs exist.

/// A fare between two stops, in currency units.
pub type Fare = f64;

/// Fare given to every pair that has not been priced yet.
pub const DEFAULT_FARE: Fare = 0.0;

/// Errors from re-indexing a fare array.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum MatrixError {
    /// The fare array does not hold exactly one fare per stop pair.
    #[error("fare array has {actual} entries, expected {expected} for {stops} stops")]
    SizeMismatch {
        stops: usize,
        expected: usize,
        actual: usize,
    },

    /// A stop position lies outside the sequence.
    #[error("position {position} is out of range for {stops} stops")]
    PositionOutOfRange { position: usize, stops: usize },

    /// The two positions do not form a pair of distinct stops.
    #[error("no fare slot for stops {0} and {1}")]
    InvalidPair(usize, usize),

    /// A stop name is not part of the sequence.
    #[error("unknown stop: {0}")]
    UnknownStop(String),

    /// Fares must be finite and non-negative.
    #[error("invalid fare: {0}")]
    InvalidFare(Fare),

    /// The edited stop sequence is itself invalid.
    #[error(transparent)]
    Stops(#[from] crate::domain::InvalidStops),
}

/// Number of stop pairs, and so the fare array length, for `stops` stops.
///
/// Zero and one stop have no pairs.
pub const fn pair_count(stops: usize) -> usize {
    stops * stops.saturating_sub(1) / 2
}

/// Slot of the pair `(from, to)` in the fare array.
///
/// Returns `None` unless `from < to < stops`. Callers holding an unordered
/// pair must canonicalise it to `(min, max)` first; `(to, from)` and
/// `(x, x)` are never valid.
pub const fn fare_index(from: usize, to: usize, stops: usize) -> Option<usize> {
    if from >= to || to >= stops {
        return None;
    }
    Some(slot(from, to))
}

/// Inverse of [`fare_index`]: the `(from, to)` pair stored at `index`.
pub fn pair_at(index: usize) -> (usize, usize) {
    // Float estimate of the column, corrected for rounding at large indices.
    let mut to = ((1.0 + (1.0 + 8.0 * index as f64).sqrt()) / 2.0) as usize;
    to = to.max(1);
    while column_start(to) > index {
        to -= 1;
    }
    while column_start(to + 1) <= index {
        to += 1;
    }
    (index - column_start(to), to)
}

/// Unchecked slot computation; `from < to` must hold.
const fn slot(from: usize, to: usize) -> usize {
    column_start(to) + from
}

const fn column_start(to: usize) -> usize {
    to * to.saturating_sub(1) / 2
}

/// Check that `fares` holds exactly one entry per pair of `stops` stops.
pub fn check_size(fares: &[Fare], stops: usize) -> Result<(), MatrixError> {
    let expected = pair_count(stops);
    if fares.len() != expected {
        return Err(MatrixError::SizeMismatch {
            stops,
            expected,
            actual: fares.len(),
        });
    }
    Ok(())
}

/// Move every fare to a new stop layout.
///
/// `target` maps each old stop position to its position among `new_stops`
/// stops, or `None` if the stop is gone. A pair whose stops both survive
/// keeps its fare (re-canonicalised if the two stops swapped order); every
/// other new pair gets [`DEFAULT_FARE`].
pub fn reindex<F>(
    fares: &[Fare],
    stops: usize,
    new_stops: usize,
    mut target: F,
) -> Result<Vec<Fare>, MatrixError>
where
    F: FnMut(usize) -> Option<usize>,
{
    check_size(fares, stops)?;

    let targets: Vec<Option<usize>> = (0..stops).map(&mut target).collect();
    if let Some(position) = targets.iter().flatten().find(|&&p| p >= new_stops) {
        return Err(MatrixError::PositionOutOfRange {
            position: *position,
            stops: new_stops,
        });
    }

    let mut moved = vec![DEFAULT_FARE; pair_count(new_stops)];
    for to in 1..stops {
        let Some(new_to) = targets[to] else { continue };
        for from in 0..to {
            let Some(new_from) = targets[from] else {
                continue;
            };
            let (lo, hi) = (new_from.min(new_to), new_from.max(new_to));
            if let Some(index) = fare_index(lo, hi, new_stops) {
                moved[index] = fares[slot(from, to)];
            }
        }
    }
    Ok(moved)
}

/// Fares after inserting a stop at `position` (`0..=stops`).
///
/// Stops at or after `position` shift up by one. The new stop's fares start
/// at [`DEFAULT_FARE`].
pub fn insert_stop(fares: &[Fare], stops: usize, position: usize) -> Result<Vec<Fare>, MatrixError> {
    if position > stops {
        return Err(MatrixError::PositionOutOfRange { position, stops });
    }
    reindex(fares, stops, stops + 1, |i| {
        Some(if i >= position { i + 1 } else { i })
    })
}

/// Fares after removing the stop at `position` (`0..stops`).
///
/// Stops after `position` shift down by one; fares involving the removed
/// stop are dropped.
pub fn remove_stop(fares: &[Fare], stops: usize, position: usize) -> Result<Vec<Fare>, MatrixError> {
    if position >= stops {
        return Err(MatrixError::PositionOutOfRange { position, stops });
    }
    reindex(fares, stops, stops - 1, |i| match i.cmp(&position) {
        std::cmp::Ordering::Less => Some(i),
        std::cmp::Ordering::Equal => None,
        std::cmp::Ordering::Greater => Some(i - 1),
    })
}

/// Fares after moving the stop at `from` so it ends up at position `to`.
pub fn move_stop(fares: &[Fare], stops: usize, from: usize, to: usize) -> Result<Vec<Fare>, MatrixError> {
    for position in [from, to] {
        if position >= stops {
            return Err(MatrixError::PositionOutOfRange { position, stops });
        }
    }
    reindex(fares, stops, stops, |i| {
        Some(if i == from {
            to
        } else if from < to && i > from && i <= to {
            i - 1
        } else if to < from && i >= to && i < from {
            i + 1
        } else {
            i
        })
    })
}
