use geo_types::Coord;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A WGS-84 position in decimal degrees.
///
/// Equality is exact on both fields. Use it for tests, never to decide
/// whether two places are "the same".
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    pub lng: f64,
    pub lat: f64,
}

impl Coordinate {
    pub fn new(lng: f64, lat: f64) -> Self {
        Self { lng, lat }
    }

    pub fn is_valid(&self) -> bool {
        self.lng.is_finite()
            && self.lat.is_finite()
            && (-180.0..=180.0).contains(&self.lng)
            && (-90.0..=90.0).contains(&self.lat)
    }
}

impl From<Coordinate> for Coord<f64> {
    fn from(coordinate: Coordinate) -> Self {
        Coord {
            x: coordinate.lng,
            y: coordinate.lat,
        }
    }
}

impl From<Coord<f64>> for Coordinate {
    fn from(coord: Coord<f64>) -> Self {
        Self::new(coord.x, coord.y)
    }
}

impl From<Coordinate> for String {
    fn from(coordinate: Coordinate) -> Self {
        format!("{},{}", coordinate.lng, coordinate.lat)
    }
}

impl fmt::Display for Coordinate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.6},{:.6}", self.lng, self.lat)
    }
}

#[test]
fn coordinate_query_string_is_lng_first() {
    let origin = Coordinate::new(-122.2685, 47.5505);
    let query: String = origin.into();

    assert_eq!(query, "-122.2685,47.5505");
    assert!(origin.is_valid());
    assert!(!Coordinate::new(200.0, 0.0).is_valid());
}
