use std::cmp;

use serde::{Deserialize, Serialize};

pub const EARTH_RADIUS: Distance = Distance::from_kilometers(6371.0);
pub(crate) const LONGITUDE_DISTANCE: Distance = Distance::from_meters(111_320.0);
pub(crate) const LATITUDE_DISTANCE: Distance = Distance::from_meters(110_540.0);

/// Stored in kilometers, the unit every radius and haversine result is expressed in.
#[derive(Debug, Clone, Copy, Default)]
pub struct Distance(f64);

impl PartialEq for Distance {
    fn eq(&self, other: &Self) -> bool {
        self.0 == other.0
    }
}

impl PartialOrd for Distance {
    fn partial_cmp(&self, other: &Self) -> Option<cmp::Ordering> {
        self.0.partial_cmp(&other.0)
    }
}

impl Distance {
    pub const fn from_meters(distance: f64) -> Self {
        Self(distance / 1000.0)
    }

    pub const fn from_kilometers(distance: f64) -> Self {
        Self(distance)
    }

    pub const fn as_meters(&self) -> f64 {
        self.0 * 1000.0
    }

    pub const fn as_kilometers(&self) -> f64 {
        self.0
    }
}

/// A WGS84 position as it appears in the data sheet, `{"lat": .., "lng": ..}`.
#[derive(Debug, Default, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    #[serde(rename = "lat")]
    pub latitude: f64,
    #[serde(rename = "lng")]
    pub longitude: f64,
}

impl Coordinate {
    pub const fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }

    /// Great-circle distance using the haversine formula.
    pub fn distance(&self, coord: &Self) -> Distance {
        let lat_a = f64::to_radians(self.latitude);
        let lon_a = f64::to_radians(self.longitude);
        let lat_b = f64::to_radians(coord.latitude);
        let lon_b = f64::to_radians(coord.longitude);
        let dist_lat = lat_b - lat_a;
        let dist_lon = lon_b - lon_a;
        let a = f64::powi(f64::sin(dist_lat / 2.0), 2)
            + f64::cos(lat_a) * f64::cos(lat_b) * f64::powi(f64::sin(dist_lon / 2.0), 2);
        let c = 2.0 * f64::atan2(f64::sqrt(a), f64::sqrt(1.0 - a));
        Distance::from_kilometers(EARTH_RADIUS.as_kilometers() * c)
    }

    /// Maps the coordinate onto a grid cell. Columns wrap around the antimeridian.
    pub fn to_grid(&self, cell: &CellSize) -> (i64, i64) {
        let x = ((self.longitude + 180.0) / 360.0 * cell.columns as f64).floor() as i64;
        let y = (self.latitude / cell.latitude).floor() as i64;
        (x.rem_euclid(cell.columns), y)
    }
}

/// Grid dimensions: rows are `latitude` degrees tall, the globe is split into `columns`
/// equal-width columns of longitude.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CellSize {
    pub latitude: f64,
    pub columns: i64,
}

impl CellSize {
    // Headroom over the flat approximation so a pair within `radius` never
    // lands more than one cell apart.
    const MARGIN: f64 = 1.5;

    /// Smallest grid that keeps every pair within `radius` in neighbouring cells,
    /// for points no further from the equator than `max_latitude`.
    pub fn covering(radius: Distance, max_latitude: f64) -> Self {
        let latitude =
            (radius.as_meters() / LATITUDE_DISTANCE.as_meters() * Self::MARGIN).max(f64::EPSILON);
        let shrink = f64::cos(f64::to_radians(max_latitude.abs().min(90.0)));
        let columns = if shrink > 1e-6 {
            let width = radius.as_meters() / (LONGITUDE_DISTANCE.as_meters() * shrink) * Self::MARGIN;
            (360.0 / width).floor().clamp(1.0, 1e7) as i64
        } else {
            1
        };
        Self { latitude, columns }
    }
}

/// Haversine distance in kilometers between two latitude/longitude pairs.
pub fn distance_km(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> f64 {
    Coordinate::new(lat1, lon1)
        .distance(&Coordinate::new(lat2, lon2))
        .as_kilometers()
}

#[test]
fn distance_test() {
    let coord_a = Coordinate {
        latitude: 48.85800943005911,
        longitude: 2.3514350059357927,
    };

    let coord_b = Coordinate {
        latitude: 51.5052389927712,
        longitude: -0.12495407345099824,
    };
    let d = coord_a.distance(&coord_b);
    assert!((d.as_kilometers() - 343.0).abs() < 1.0);
}

#[test]
fn distance_eq_test() {
    let dist_a = Distance::from_meters(1000.0);
    let dist_b = Distance::from_kilometers(1.0);
    assert_eq!(dist_a, dist_b)
}

#[test]
fn distance_cmp_test() {
    let dist_a = Distance::from_meters(1000.0);
    let dist_b = Distance::from_kilometers(0.5);
    assert!(dist_a > dist_b)
}

#[test]
fn coordinate_uses_lat_lng_keys_test() {
    let coordinate: Coordinate = serde_json::from_str(r#"{"lat": 22.3, "lng": 114.1}"#).unwrap();
    assert_eq!(coordinate, Coordinate::new(22.3, 114.1));
    assert_eq!(
        serde_json::to_string(&coordinate).unwrap(),
        r#"{"lat":22.3,"lng":114.1}"#
    );
}

#[test]
fn neighbouring_cells_test() {
    let radius = Distance::from_kilometers(0.3);
    let cell = CellSize::covering(radius, 22.5);
    let a = Coordinate::new(22.0, 114.0);
    let b = Coordinate::new(22.0, 114.0029);
    assert!(a.distance(&b) <= radius);
    let (ax, ay) = a.to_grid(&cell);
    let (bx, by) = b.to_grid(&cell);
    assert!((ax - bx).abs() <= 1 && (ay - by).abs() <= 1);
}
