//! Aggregation of classified assessments.
//!
//! Everything here is a pure function over the assessed tables; the
//! renderers consume these rollups so both output formats always derive
//! from the same numbers.

pub mod aggregator;

pub use aggregator::*;
