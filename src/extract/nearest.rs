//! Nearest-building selection and ring normalization.

use geo::{Area, Centroid, Coord, Distance, Euclidean, Point, Polygon};
use tracing::debug;

use crate::error::{FootprintError, Result};
use crate::models::{BuildingRecord, Footprint, Height};

/// The building chosen for a reference point, with its ring normalized
#[derive(Debug, Clone, PartialEq)]
pub struct NearestBuilding {
    pub source_id: String,
    /// Planar distance from the reference point (0 when inside)
    pub distance: f64,
    pub coords: Vec<[f64; 2]>,
    pub levels: f64,
    pub height: Option<Height>,
}

impl NearestBuilding {
    /// Attach the geocoded `[lat, lon]` centre
    pub fn into_footprint(self, center: [f64; 2]) -> Footprint {
        Footprint {
            coords: self.coords,
            center,
            levels: self.levels,
            height: self.height,
        }
    }
}

/// Select the record nearest to `reference` and normalize its dominant polygon.
///
/// All geometries must share a planar frame with `reference`. Records without
/// polygon geometry are skipped; ties go to the earlier record.
pub fn extract_nearest(reference: Point<f64>, records: &[BuildingRecord]) -> Result<NearestBuilding> {
    if records.is_empty() {
        return Err(FootprintError::EmptyInput);
    }

    let (record, distance) = records
        .iter()
        .filter_map(|r| distance_to(&reference, r).map(|d| (r, d)))
        .min_by(|a, b| a.1.total_cmp(&b.1))
        .ok_or(FootprintError::NoPolygonGeometry)?;

    let polygon = largest_part(record.geometry.polygons()).ok_or(FootprintError::NoPolygonGeometry)?;

    debug!(
        "Nearest building {} at {:.2} (of {} candidates)",
        record.source_id(),
        distance,
        records.len()
    );

    let coords = normalize_ring(polygon)?;

    Ok(NearestBuilding {
        source_id: record.source_id(),
        distance,
        coords,
        levels: record.levels(),
        height: record.height.clone(),
    })
}

/// Distance to the closest part of a record, `None` for non-polygonal records
fn distance_to(reference: &Point<f64>, record: &BuildingRecord) -> Option<f64> {
    record
        .geometry
        .polygons()
        .iter()
        .map(|p| Euclidean.distance(reference, p))
        .min_by(|a, b| a.total_cmp(b))
}

/// Largest polygon by area; the first one wins on equal areas
fn largest_part(parts: &[Polygon<f64>]) -> Option<&Polygon<f64>> {
    let mut best: Option<(&Polygon<f64>, f64)> = None;
    for part in parts {
        let area = part.unsigned_area();
        match best {
            Some((_, best_area)) if area <= best_area => {}
            _ => best = Some((part, area)),
        }
    }
    best.map(|(p, _)| p)
}

/// Translate the exterior ring so the polygon's area centroid is the origin
pub fn normalize_ring(polygon: &Polygon<f64>) -> Result<Vec<[f64; 2]>> {
    let exterior = polygon.exterior();

    let mut distinct: Vec<Coord<f64>> = Vec::with_capacity(exterior.0.len());
    for c in exterior.coords() {
        if !distinct.contains(c) {
            distinct.push(*c);
        }
    }
    if distinct.len() < 3 {
        return Err(FootprintError::DegeneratePolygon(format!(
            "{} distinct vertices",
            distinct.len()
        )));
    }

    // Holes are ignored, so the centroid is taken over the exterior alone
    let shell = Polygon::new(exterior.clone(), vec![]);
    if shell.unsigned_area() == 0.0 {
        return Err(FootprintError::DegeneratePolygon("zero area".to_string()));
    }

    let centroid = shell
        .centroid()
        .ok_or_else(|| FootprintError::DegeneratePolygon("undefined centroid".to_string()))?;

    Ok(exterior
        .coords()
        .map(|c| [c.x - centroid.x(), c.y - centroid.y()])
        .collect())
}
