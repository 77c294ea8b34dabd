//! Footprint - building outlines for street addresses.
//!
//! This library geocodes an address, downloads nearby OpenStreetMap buildings
//! and extracts the nearest building's outline as metre coordinates centred
//! on the origin. It is shared by the `server` and `export` binaries.

pub mod config;
pub mod error;
pub mod extract;
pub mod geometry;
pub mod models;
pub mod osm;
pub mod service;

pub use error::{FootprintError, Upstream};
pub use models::{BuildingGeometry, BuildingRecord, Footprint, Height, OsmType};
pub use service::{locate_footprint, FootprintService};
