//! Triangular fare matrices.
//!
//! A fare matrix holds the fare between every pair of stops on a stop
//! sequence. It is symmetric, so only the upper triangle is stored, as one
//! flat array of `n * (n - 1) / 2` fares. [`codec`] maps stop pairs to
//! array slots and re-indexes the array when stops are inserted, removed
//! or reordered; [`FareMatrix`] keeps a stop sequence and its array in step.

pub mod codec;
mod matrix;

pub use codec::{DEFAULT_FARE, Fare, MatrixError, fare_index, pair_at, pair_count};
pub use matrix::{FareEntry, FareMatrix, FareRow};
