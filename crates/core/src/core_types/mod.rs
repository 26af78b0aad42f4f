//! Shared value types for the analysis engine

pub mod grid;
pub mod sample;
pub mod vessel;

// Re-export main types
pub use grid::{BoundingBox, GriddedField};
pub use sample::SampleValue;
pub use vessel::{Vessel, VesselClass};
