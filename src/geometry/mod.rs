//! Pure planar geometry over lng/lat coordinates: no I/O, no hidden state.

mod polygonize;
mod ray;
mod within;

pub use polygonize::assemble_polygon;
pub use ray::{ray_intersect, sample_bearing};
pub use within::points_within_polygon;

/// Distance in degrees under which two positions are treated as the same vertex.
pub const EPSILON: f64 = 1e-9;

use geo_types::Coord;

fn distance(a: Coord<f64>, b: Coord<f64>) -> f64 {
    (a.x - b.x).hypot(a.y - b.y)
}

fn near(a: Coord<f64>, b: Coord<f64>) -> bool {
    distance(a, b) <= EPSILON
}

fn cross(a: Coord<f64>, b: Coord<f64>) -> f64 {
    a.x * b.y - a.y * b.x
}

fn dot(a: Coord<f64>, b: Coord<f64>) -> f64 {
    a.x * b.x + a.y * b.y
}

#[cfg(test)]
pub(crate) mod fixtures {
    use geo_types::{Coord, LineString};

    use crate::entities::{Contour, Coordinate};

    /// Regular hexagon around `center`, counter-clockwise, first vertex due east.
    pub fn hexagon(center: Coordinate, radius: f64) -> Vec<Coord<f64>> {
        (0..6)
            .map(|i| {
                let angle = (i as f64 * 60.0).to_radians();
                Coord {
                    x: center.lng + radius * angle.cos(),
                    y: center.lat + radius * angle.sin(),
                }
            })
            .collect()
    }

    pub fn closed(vertices: &[Coord<f64>]) -> LineString<f64> {
        let mut coords = vertices.to_vec();
        coords.push(vertices[0]);
        LineString::new(coords)
    }

    pub fn square(size: f64) -> Contour {
        let vertices = [
            Coord { x: 0.0, y: 0.0 },
            Coord { x: size, y: 0.0 },
            Coord { x: size, y: size },
            Coord { x: 0.0, y: size },
        ];
        super::assemble_polygon(&[closed(&vertices)]).unwrap()
    }
}
