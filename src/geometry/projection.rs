//! WGS84 → UTM projection.
//!
//! Building selection needs a frame where Euclidean distance is metres, so
//! lon/lat geometries are projected into the UTM zone of the reference point
//! before any distance or area is measured.

use geo::{Coord, Point};

use crate::models::BuildingGeometry;

const WGS84_A: f64 = 6_378_137.0;
const WGS84_F: f64 = 1.0 / 298.257_223_563;
const K0: f64 = 0.9996;
const FALSE_EASTING: f64 = 500_000.0;
const FALSE_NORTHING_SOUTH: f64 = 10_000_000.0;

/// A UTM zone (1..=60) and hemisphere
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UtmZone {
    pub number: u8,
    pub north: bool,
}

impl UtmZone {
    /// Zone containing a lon/lat point
    pub fn for_point(lon: f64, lat: f64) -> Self {
        let number = (((lon + 180.0) / 6.0).floor() as i32 + 1).clamp(1, 60) as u8;
        Self {
            number,
            north: lat >= 0.0,
        }
    }

    /// Central meridian in degrees
    pub fn central_meridian(&self) -> f64 {
        (self.number as f64 - 1.0) * 6.0 - 180.0 + 3.0
    }

    /// EPSG code of the WGS84 / UTM zone
    pub fn epsg(&self) -> u32 {
        let base = if self.north { 32600 } else { 32700 };
        base + self.number as u32
    }

    /// Project a lon/lat coordinate to easting/northing in metres
    pub fn project(&self, c: Coord<f64>) -> Coord<f64> {
        let e2 = WGS84_F * (2.0 - WGS84_F);
        let e4 = e2 * e2;
        let e6 = e4 * e2;
        let ep2 = e2 / (1.0 - e2);

        let phi = c.y.to_radians();
        let lambda = (c.x - self.central_meridian()).to_radians();

        let (sin_phi, cos_phi) = phi.sin_cos();
        let tan_phi = phi.tan();

        let n = WGS84_A / (1.0 - e2 * sin_phi * sin_phi).sqrt();
        let t = tan_phi * tan_phi;
        let cc = ep2 * cos_phi * cos_phi;
        let a = cos_phi * lambda;

        // Meridian arc length
        let m = WGS84_A
            * ((1.0 - e2 / 4.0 - 3.0 * e4 / 64.0 - 5.0 * e6 / 256.0) * phi
                - (3.0 * e2 / 8.0 + 3.0 * e4 / 32.0 + 45.0 * e6 / 1024.0) * (2.0 * phi).sin()
                + (15.0 * e4 / 256.0 + 45.0 * e6 / 1024.0) * (4.0 * phi).sin()
                - (35.0 * e6 / 3072.0) * (6.0 * phi).sin());

        let x = K0
            * n
            * (a + (1.0 - t + cc) * a.powi(3) / 6.0
                + (5.0 - 18.0 * t + t * t + 72.0 * cc - 58.0 * ep2) * a.powi(5) / 120.0)
            + FALSE_EASTING;

        let mut y = K0
            * (m + n
                * tan_phi
                * (a * a / 2.0
                    + (5.0 - t + 9.0 * cc + 4.0 * cc * cc) * a.powi(4) / 24.0
                    + (61.0 - 58.0 * t + t * t + 600.0 * cc - 330.0 * ep2) * a.powi(6) / 720.0));

        if !self.north {
            y += FALSE_NORTHING_SOUTH;
        }

        Coord { x, y }
    }

    pub fn project_point(&self, p: Point<f64>) -> Point<f64> {
        Point::from(self.project(p.0))
    }

    pub fn project_geometry(&self, geometry: &BuildingGeometry) -> BuildingGeometry {
        geometry.map_coords(|c| self.project(c))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use geo::{coord, polygon, Area};

    #[test]
    fn test_zone_for_point() {
        // Poznań
        let zone = UtmZone::for_point(16.93, 52.40);
        assert_eq!(zone, UtmZone { number: 33, north: true });
        assert_eq!(zone.epsg(), 32633);
        assert_eq!(zone.central_meridian(), 15.0);

        let zone = UtmZone::for_point(-58.38, -34.60);
        assert_eq!(zone, UtmZone { number: 21, north: false });
        assert_eq!(zone.epsg(), 32721);
    }

    #[test]
    fn test_zone_clamped_at_antimeridian() {
        assert_eq!(UtmZone::for_point(180.0, 0.0).number, 60);
        assert_eq!(UtmZone::for_point(-180.0, 0.0).number, 1);
    }

    #[test]
    fn test_central_meridian_on_equator() {
        let zone = UtmZone::for_point(3.0, 0.0);
        let projected = zone.project(coord! { x: 3.0, y: 0.0 });
        assert!((projected.x - 500_000.0).abs() < 1e-6);
        assert!(projected.y.abs() < 1e-6);
    }

    #[test]
    fn test_central_meridian_at_45_north() {
        let zone = UtmZone::for_point(3.0, 45.0);
        let projected = zone.project(coord! { x: 3.0, y: 45.0 });
        assert!((projected.x - 500_000.0).abs() < 1e-6);
        assert!((projected.y - 4_982_950.4).abs() < 1.0, "{}", projected.y);
    }

    #[test]
    fn test_southern_hemisphere_false_northing() {
        let zone = UtmZone { number: 31, north: false };
        let projected = zone.project(coord! { x: 3.0, y: -45.0 });
        assert!((projected.y - (10_000_000.0 - 4_982_950.4)).abs() < 1.0);
    }

    #[test]
    fn test_easting_grows_eastward() {
        let zone = UtmZone::for_point(16.93, 52.40);
        let west = zone.project(coord! { x: 16.92, y: 52.40 });
        let east = zone.project(coord! { x: 16.94, y: 52.40 });
        assert!(east.x > west.x);
        // 0.02° of longitude at 52.4°N is about 1.36 km
        assert!(((east.x - west.x) - 1_359.0).abs() < 15.0);
    }

    #[test]
    fn test_projected_building_area_in_square_metres() {
        // Roughly 10 m x 10 m at 52.4°N
        let dlat = 10.0 / 111_250.0;
        let dlon = 10.0 / 67_960.0;
        let geometry = BuildingGeometry::Polygon(polygon![
            (x: 16.93, y: 52.40),
            (x: 16.93 + dlon, y: 52.40),
            (x: 16.93 + dlon, y: 52.40 + dlat),
            (x: 16.93, y: 52.40 + dlat),
        ]);

        let zone = UtmZone::for_point(16.93, 52.40);
        let projected = zone.project_geometry(&geometry);
        let area = projected.polygons()[0].unsigned_area();
        assert!((area - 100.0).abs() < 2.0, "{}", area);
    }
}
