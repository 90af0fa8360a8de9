//! Medroute client - ILP REST data provider
//!
//! Fetches drones, service points, availability and restricted areas for a
//! planning run. Every fetch degrades to an empty list on failure.

pub mod client;

pub use client::{IlpClient, DEFAULT_ILP_ENDPOINT};
