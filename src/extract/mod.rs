//! Nearest-building extraction.
//!
//! Picks the building closest to a reference point and turns its dominant
//! polygon into a ring centred on the origin, ready for extrusion.

mod nearest;

pub use nearest::{extract_nearest, normalize_ring, NearestBuilding};
