//! Core data models for building footprints.

pub mod building;
pub mod footprint;

pub use building::{parse_levels, BuildingGeometry, BuildingRecord, Height, OsmType, DEFAULT_LEVELS};
pub use footprint::Footprint;
