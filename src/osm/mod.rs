//! Clients for the OpenStreetMap services the footprint lookup depends on.

mod nominatim;
mod overpass;

pub use nominatim::{parse_search_response, NominatimClient};
pub use overpass::{building_query, parse_buildings, OverpassClient};
