//! Report rendering.
//!
//! Both the markdown and the JSON renderers are pure functions of one
//! [`AssessmentReport`](crate::models::AssessmentReport); neither performs
//! discovery, classification, or network access.

pub mod generator;

pub use generator::*;
