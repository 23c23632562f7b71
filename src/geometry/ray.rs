use geo_types::{Coord, Line};
use rand::Rng;
use rand_distr::{Distribution, Uniform};

use super::{cross, distance, dot, EPSILON};
use crate::entities::{Contour, Coordinate};
use crate::error::{no_intersection_error, Error};

/// Longitude degrees shrink toward the poles; below this the projection is clamped.
const MIN_LATITUDE_SCALE: f64 = 0.01;

/// Uniform compass bearing in [0, 360) drawn from the caller's random source.
pub fn sample_bearing<R: Rng + ?Sized>(rng: &mut R) -> f64 {
    Uniform::new(0.0, 360.0).sample(rng)
}

/// First point where a ray from `origin` along `bearing` meets the ring.
///
/// The ray is traced in a local equirectangular projection at the origin's
/// latitude, so `bearing` is a compass bearing rather than an angle in raw
/// degree space. Hits within [`EPSILON`] of a vertex resolve to that vertex;
/// equally distant hits resolve to the first edge in ring order.
pub fn ray_intersect(origin: Coordinate, bearing: f64, contour: &Contour) -> Result<Coordinate, Error> {
    if !bearing.is_finite() {
        return Err(no_intersection_error(bearing, "bearing is not a finite angle"));
    }
    if !contour.contains(origin) {
        return Err(no_intersection_error(bearing, "origin lies outside the ring"));
    }

    let start: Coord<f64> = origin.into();
    let direction = direction(origin, bearing);

    let mut nearest: Option<(f64, Coord<f64>)> = None;
    for edge in contour.edges() {
        if let Some((t, hit)) = cast(start, direction, edge) {
            if nearest.map_or(true, |(best, _)| t < best) {
                nearest = Some((t, hit));
            }
        }
    }

    nearest
        .map(|(_, hit)| Coordinate::from(hit))
        .ok_or_else(|| no_intersection_error(bearing, "ray is parallel to or misses every edge"))
}

fn direction(origin: Coordinate, bearing: f64) -> Coord<f64> {
    let theta = bearing.to_radians();
    let scale = origin.lat.to_radians().cos().max(MIN_LATITUDE_SCALE);

    Coord {
        x: theta.sin() / scale,
        y: theta.cos(),
    }
}

/// Ray parameter and hit point for one edge, if the ray crosses it ahead of the start.
fn cast(start: Coord<f64>, direction: Coord<f64>, edge: Line<f64>) -> Option<(f64, Coord<f64>)> {
    let a = edge.start;
    let b = edge.end;
    let span = b - a;
    let length = distance(a, b);
    let to_a = a - start;
    let norm = dot(direction, direction).sqrt();

    let denom = cross(direction, span);

    if denom.abs() <= EPSILON * norm * length {
        // parallel; only a collinear edge can be hit, at its nearest endpoint ahead
        if cross(to_a, direction).abs() > EPSILON * norm * distance(a, start).max(1.0) {
            return None;
        }
        return [a, b]
            .into_iter()
            .map(|p| (dot(p - start, direction) / (norm * norm), p))
            .filter(|(t, _)| *t * norm > EPSILON)
            .min_by(|x, y| x.0.total_cmp(&y.0));
    }

    let t = cross(to_a, span) / denom;
    let u = cross(to_a, direction) / denom;
    let tolerance = EPSILON / length;

    if t * norm <= EPSILON || u < -tolerance || u > 1.0 + tolerance {
        return None;
    }

    let hit = a + span * u;
    let hit = if distance(hit, a) <= EPSILON {
        a
    } else if distance(hit, b) <= EPSILON {
        b
    } else {
        hit
    };

    Some((t, hit))
}
