//! Team performance tracking: a directory of teams, members, and KPIs, an
//! evaluation intake pipeline, and the scoring/aggregation engine behind
//! the reporting surface.
//!
//! Persistence is a trait boundary ([`store`]); the concrete store lives
//! with the binary that wires the service together. Everything in
//! [`reports`] is a pure function over an already-fetched record set.

pub mod config;
pub mod directory;
pub mod error;
pub mod evaluations;
pub mod imports;
pub mod reports;
pub mod store;
pub mod telemetry;
