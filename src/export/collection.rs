//! GeoJSON conversion of fetched buildings.

use geo::Centroid;
use geojson::{Feature, FeatureCollection, Geometry, JsonObject, Value};
use serde_json::json;

use footprint::{BuildingGeometry, BuildingRecord};

/// Map centre used when no buildings were found (Warsaw)
pub const FALLBACK_CENTER: (f64, f64) = (52.2297, 21.0122);

/// Polygonal buildings as a feature collection; lines are left out
pub fn feature_collection(records: &[BuildingRecord]) -> FeatureCollection {
    let features = records.iter().filter_map(to_feature).collect();

    FeatureCollection {
        bbox: None,
        features,
        foreign_members: None,
    }
}

fn to_feature(record: &BuildingRecord) -> Option<Feature> {
    let value = match &record.geometry {
        BuildingGeometry::Polygon(p) => Value::from(p),
        BuildingGeometry::MultiPolygon(mp) => Value::from(mp),
        BuildingGeometry::LineString(_) => return None,
    };

    let mut properties = JsonObject::new();
    properties.insert("osm_type".to_string(), json!(record.osm_type));
    properties.insert("osm_id".to_string(), json!(record.osm_id));
    properties.insert("levels".to_string(), json!(record.levels()));
    properties.insert("height".to_string(), json!(record.height));

    Some(Feature {
        bbox: None,
        geometry: Some(Geometry::new(value)),
        id: None,
        properties: Some(properties),
        foreign_members: None,
    })
}

/// Mean of the building centroids as `(lat, lon)`
pub fn map_center(records: &[BuildingRecord]) -> (f64, f64) {
    let centroids: Vec<_> = records
        .iter()
        .filter_map(|r| match &r.geometry {
            BuildingGeometry::Polygon(p) => p.centroid(),
            BuildingGeometry::MultiPolygon(mp) => mp.centroid(),
            BuildingGeometry::LineString(_) => None,
        })
        .collect();

    if centroids.is_empty() {
        return FALLBACK_CENTER;
    }

    let n = centroids.len() as f64;
    let lat = centroids.iter().map(|c| c.y()).sum::<f64>() / n;
    let lon = centroids.iter().map(|c| c.x()).sum::<f64>() / n;
    (lat, lon)
}
