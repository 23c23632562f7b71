use geo::{BoundingRect, Contains, Intersects};
use geo_types::{Coord, Line, LineString, Polygon, Rect};
use serde::ser::{Serialize, Serializer};

use crate::entities::Coordinate;

/// The closed, simple outer ring of a reachable area.
///
/// Built only through [`crate::geometry::assemble_polygon`], which guarantees the
/// ring is closed, has at least three distinct vertices and does not cross
/// itself.
#[derive(Clone, Debug, PartialEq)]
pub struct Contour {
    polygon: Polygon<f64>,
}

impl Contour {
    pub(crate) fn from_closed_ring(ring: LineString<f64>) -> Self {
        Self {
            polygon: Polygon::new(ring, vec![]),
        }
    }

    pub fn polygon(&self) -> &Polygon<f64> {
        &self.polygon
    }

    /// Ring vertices in order, without the repeated closing vertex.
    pub fn vertices(&self) -> Vec<Coordinate> {
        let ring = self.polygon.exterior();
        let count = ring.0.len().saturating_sub(1);
        ring.0[..count].iter().map(|c| Coordinate::from(*c)).collect()
    }

    pub fn edges(&self) -> impl Iterator<Item = Line<f64>> + '_ {
        self.polygon.exterior().lines()
    }

    /// Boundary-inclusive point test.
    pub fn contains(&self, coordinate: Coordinate) -> bool {
        self.polygon.intersects(&Coord::from(coordinate))
    }

    /// Interior-only point test; a point on the ring is not inside.
    pub fn surrounds(&self, coordinate: Coordinate) -> bool {
        self.polygon.contains(&Coord::from(coordinate))
    }

    pub fn bounds(&self) -> Option<Rect<f64>> {
        self.polygon.bounding_rect()
    }
}

impl Serialize for Contour {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_seq(self.polygon.exterior().0.iter().map(|c| Coordinate::from(*c)))
    }
}

#[test]
fn ring_points_are_contained_but_not_surrounded() {
    use crate::geometry::fixtures::square;

    let contour = square(2.0);

    for point in [Coordinate::new(1.0, 0.0), Coordinate::new(2.0, 2.0)] {
        assert!(contour.contains(point));
        assert!(!contour.surrounds(point));
    }
    assert!(contour.surrounds(Coordinate::new(1.0, 1.0)));
    assert!(!contour.contains(Coordinate::new(3.0, 1.0)));
}
