//! Address to footprint lookup.

use geo::Point;
use tracing::{debug, info};

use crate::config::Config;
use crate::error::{FootprintError, Result};
use crate::extract::extract_nearest;
use crate::geometry::UtmZone;
use crate::models::{BuildingRecord, Footprint};
use crate::osm::{NominatimClient, OverpassClient};

/// Geocodes addresses and resolves the building standing there
#[derive(Clone)]
pub struct FootprintService {
    geocoder: NominatimClient,
    overpass: OverpassClient,
    radius_m: f64,
}

impl FootprintService {
    pub fn new(geocoder: NominatimClient, overpass: OverpassClient, radius_m: f64) -> Self {
        Self {
            geocoder,
            overpass,
            radius_m,
        }
    }

    pub fn from_config(config: &Config) -> anyhow::Result<Self> {
        let client = config.upstream.http_client()?;
        Ok(Self::new(
            NominatimClient::new(client.clone(), &config.upstream.nominatim_url),
            OverpassClient::new(client, &config.upstream.overpass_url, config.upstream.timeout()),
            config.search.radius_m,
        ))
    }

    /// Normalized footprint of the building nearest to `address`
    pub async fn footprint(&self, address: &str) -> Result<Footprint> {
        let (reference, records) = self.buildings(address, self.radius_m).await?;
        locate_footprint(reference, &records)
    }

    /// Geocoded point and raw lon/lat buildings within `radius_m` of it
    pub async fn buildings(&self, address: &str, radius_m: f64) -> Result<(Point<f64>, Vec<BuildingRecord>)> {
        let reference = self.geocoder.geocode(address).await?;
        let records = self.overpass.buildings_around(reference, radius_m).await?;
        Ok((reference, records))
    }
}

/// Pick the building nearest a lon/lat reference point.
///
/// Distances and areas are measured in the UTM zone of the reference point;
/// the returned `center` is the reference as `[lat, lon]`.
pub fn locate_footprint(reference: Point<f64>, records: &[BuildingRecord]) -> Result<Footprint> {
    if records.is_empty() {
        return Err(FootprintError::EmptyInput);
    }

    let zone = UtmZone::for_point(reference.x(), reference.y());
    debug!("Projecting {} buildings to EPSG:{}", records.len(), zone.epsg());

    let projected: Vec<BuildingRecord> = records
        .iter()
        .filter(|r| r.geometry.is_polygonal())
        .map(|r| BuildingRecord {
            geometry: zone.project_geometry(&r.geometry),
            ..r.clone()
        })
        .collect();

    if projected.is_empty() {
        return Err(FootprintError::NoPolygonGeometry);
    }

    let nearest = extract_nearest(zone.project_point(reference), &projected)?;
    info!(
        "Selected {} ({:.1} m away, {} levels)",
        nearest.source_id, nearest.distance, nearest.levels
    );

    Ok(nearest.into_footprint([reference.y(), reference.x()]))
}
