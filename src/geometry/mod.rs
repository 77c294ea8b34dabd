//! Planar geometry helpers: projection into metres and ring assembly.

mod projection;
mod rings;

pub use projection::UtmZone;
pub use rings::merge_rings_to_polygons;
