//! Building records fetched from OSM.

use geo::{LineString, MapCoords, MultiPolygon, Polygon};
use serde::{Deserialize, Serialize};

/// Levels assumed when `building:levels` is missing or unparsable
pub const DEFAULT_LEVELS: f64 = 3.0;

/// Type of OSM object
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OsmType {
    Way,
    Relation,
}

impl std::fmt::Display for OsmType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OsmType::Way => write!(f, "way"),
            OsmType::Relation => write!(f, "relation"),
        }
    }
}

/// Geometry of a building record.
///
/// Unclosed ways are kept as `LineString` so callers can tell
/// "no buildings" apart from "no building polygons".
#[derive(Debug, Clone, PartialEq)]
pub enum BuildingGeometry {
    Polygon(Polygon<f64>),
    MultiPolygon(MultiPolygon<f64>),
    LineString(LineString<f64>),
}

impl BuildingGeometry {
    pub fn is_polygonal(&self) -> bool {
        !matches!(self, BuildingGeometry::LineString(_))
    }

    /// Polygon parts of this geometry, in stored order
    pub fn polygons(&self) -> &[Polygon<f64>] {
        match self {
            BuildingGeometry::Polygon(p) => std::slice::from_ref(p),
            BuildingGeometry::MultiPolygon(mp) => &mp.0,
            BuildingGeometry::LineString(_) => &[],
        }
    }

    /// Apply a coordinate transform (e.g. a projection) to every vertex
    pub fn map_coords(&self, f: impl Fn(geo::Coord<f64>) -> geo::Coord<f64> + Copy) -> Self {
        match self {
            BuildingGeometry::Polygon(p) => BuildingGeometry::Polygon(p.map_coords(f)),
            BuildingGeometry::MultiPolygon(mp) => BuildingGeometry::MultiPolygon(mp.map_coords(f)),
            BuildingGeometry::LineString(ls) => BuildingGeometry::LineString(ls.map_coords(f)),
        }
    }
}

/// Building height as tagged in OSM.
///
/// Numeric tags are kept as numbers; anything else ("12 m", "3'") is
/// passed through as the raw string.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Height {
    Number(f64),
    Text(String),
}

impl Height {
    pub fn from_tag(raw: &str) -> Self {
        match raw.trim().parse::<f64>() {
            Ok(v) if v.is_finite() => Height::Number(v),
            _ => Height::Text(raw.to_string()),
        }
    }
}

/// A building footprint with the attributes needed downstream
#[derive(Debug, Clone, PartialEq)]
pub struct BuildingRecord {
    pub osm_type: OsmType,
    pub osm_id: i64,
    pub geometry: BuildingGeometry,
    /// Raw `building:levels` tag
    pub levels: Option<String>,
    pub height: Option<Height>,
}

impl BuildingRecord {
    pub fn new(osm_type: OsmType, osm_id: i64, geometry: BuildingGeometry) -> Self {
        Self {
            osm_type,
            osm_id,
            geometry,
            levels: None,
            height: None,
        }
    }

    /// "{osm_type}/{osm_id}"
    pub fn source_id(&self) -> String {
        format!("{}/{}", self.osm_type, self.osm_id)
    }

    pub fn levels(&self) -> f64 {
        parse_levels(self.levels.as_deref())
    }
}

/// Parse a `building:levels` value.
///
/// Multi-valued tags ("5;6") use the first value. Missing, unparsable or
/// non-finite values fall back to [`DEFAULT_LEVELS`].
pub fn parse_levels(raw: Option<&str>) -> f64 {
    raw.and_then(|s| s.split(';').next())
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .and_then(|s| s.parse::<f64>().ok())
        .filter(|v| v.is_finite())
        .unwrap_or(DEFAULT_LEVELS)
}
