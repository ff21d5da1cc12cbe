//! Bus fare finder server.
//!
//! A web application that answers: "How much is the bus from here to
//! there, on each class of bus that runs this route?"

pub mod config;
pub mod domain;
pub mod fares;
pub mod lookup;
pub mod store;
pub mod web;
