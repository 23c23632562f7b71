use geo::algorithm::line_intersection::{line_intersection, LineIntersection};
use geo::Area;
use geo_types::{Coord, Line, LineString, Polygon};

use super::{near, EPSILON};
use crate::entities::Contour;
use crate::error::{geometry_error, Error};

/// Chains unordered boundary fragments into one closed, simple ring.
///
/// Fragments are joined end to end and may be reversed to fit. The first
/// fragment keeps its direction, so the resulting loop is never mirrored.
pub fn assemble_polygon(features: &[LineString<f64>]) -> Result<Contour, Error> {
    let mut fragments: Vec<Vec<Coord<f64>>> = features
        .iter()
        .map(|feature| dedup(feature.coords().copied()))
        .filter(|fragment| fragment.len() >= 2)
        .collect();

    if fragments.is_empty() {
        return Err(geometry_error("no boundary fragments to assemble"));
    }

    let mut ring = fragments.remove(0);

    while !is_closed(&ring) {
        let end = ring[ring.len() - 1];
        let next = fragments
            .iter()
            .position(|f| near(f[0], end) || near(f[f.len() - 1], end));

        let mut fragment = match next {
            Some(index) => fragments.remove(index),
            None => {
                return Err(geometry_error(format!(
                    "gap in boundary: no fragment continues from {:?}",
                    (end.x, end.y)
                )))
            }
        };

        if !near(fragment[0], end) {
            fragment.reverse();
        }
        ring.extend(fragment.into_iter().skip(1));
    }

    if !fragments.is_empty() {
        return Err(geometry_error(format!(
            "{} fragment(s) left over after the ring closed",
            fragments.len()
        )));
    }

    let last = ring.len() - 1;
    ring[last] = ring[0];
    let ring = dedup(ring.into_iter());

    validate(&ring)?;

    Ok(Contour::from_closed_ring(LineString::new(ring)))
}

fn dedup(coords: impl Iterator<Item = Coord<f64>>) -> Vec<Coord<f64>> {
    let mut out: Vec<Coord<f64>> = Vec::new();
    for coord in coords {
        if !coord.x.is_finite() || !coord.y.is_finite() {
            continue;
        }
        if out.last().map_or(true, |last| !near(*last, coord)) {
            out.push(coord);
        }
    }
    out
}

fn is_closed(ring: &[Coord<f64>]) -> bool {
    ring.len() > 2 && near(ring[0], ring[ring.len() - 1])
}

fn validate(ring: &[Coord<f64>]) -> Result<(), Error> {
    // closed ring: n distinct vertices, n + 1 coordinates
    let vertices = ring.len().saturating_sub(1);
    if vertices < 3 {
        return Err(geometry_error(format!(
            "degenerate ring with {} distinct vertices",
            vertices
        )));
    }

    let edges: Vec<Line<f64>> = ring.windows(2).map(|w| Line::new(w[0], w[1])).collect();
    let n = edges.len();

    for i in 0..n {
        for j in (i + 1)..n {
            let adjacent = j == i + 1 || (i == 0 && j == n - 1);
            match line_intersection(edges[i], edges[j]) {
                None => {}
                Some(LineIntersection::SinglePoint { .. }) if adjacent => {}
                Some(_) => {
                    return Err(geometry_error(format!(
                        "ring crosses itself between edges {} and {}",
                        i, j
                    )))
                }
            }
        }
    }

    let area = Polygon::new(LineString::new(ring.to_vec()), vec![]).unsigned_area();
    if area <= EPSILON * EPSILON {
        return Err(geometry_error("degenerate ring with zero area"));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use geo_types::{Coord, LineString};

    use super::assemble_polygon;
    use crate::entities::Coordinate;
    use crate::geometry::fixtures::{closed, hexagon};

    fn is_rotation(ring: &[Coordinate], expected: &[Coord<f64>]) -> bool {
        if ring.len() != expected.len() {
            return false;
        }
        let expected: Vec<Coordinate> = expected.iter().map(|c| Coordinate::from(*c)).collect();
        (0..expected.len()).any(|shift| {
            (0..expected.len()).all(|i| ring[i] == expected[(i + shift) % expected.len()])
        })
    }

    fn fragment(vertices: &[Coord<f64>], from: usize, to: usize) -> LineString<f64> {
        LineString::new((from..=to).map(|i| vertices[i % vertices.len()]).collect())
    }

    #[test]
    fn single_closed_feature_reads_back_as_the_same_loop() {
        let vertices = hexagon(Coordinate::new(-122.2685, 47.5505), 0.05);

        let contour = assemble_polygon(&[closed(&vertices)]).unwrap();

        assert!(is_rotation(&contour.vertices(), &vertices));
    }

    #[test]
    fn shuffled_and_reversed_fragments_close_without_reflection() {
        let vertices = hexagon(Coordinate::new(2.35, 48.85), 0.1);

        let mut reversed = fragment(&vertices, 4, 6);
        reversed.0.reverse();
        let features = vec![
            fragment(&vertices, 0, 2),
            reversed,
            fragment(&vertices, 2, 4),
        ];

        let contour = assemble_polygon(&features).unwrap();

        assert!(is_rotation(&contour.vertices(), &vertices));
    }

    #[test]
    fn reversed_first_fragment_sets_the_orientation() {
        let vertices = hexagon(Coordinate::new(0.0, 0.0), 1.0);
        let mut first = fragment(&vertices, 0, 3);
        first.0.reverse();

        let contour = assemble_polygon(&[first, fragment(&vertices, 3, 6)]).unwrap();

        let mut mirrored = vertices.clone();
        mirrored.reverse();
        assert!(is_rotation(&contour.vertices(), &mirrored));
    }

    #[test]
    fn open_chain_is_rejected() {
        let vertices = hexagon(Coordinate::new(0.0, 0.0), 1.0);

        let err = assemble_polygon(&[fragment(&vertices, 0, 2), fragment(&vertices, 3, 5)])
            .unwrap_err();

        assert!(err.to_string().contains("gap"));
    }

    #[test]
    fn disjoint_rings_are_rejected() {
        let a = hexagon(Coordinate::new(0.0, 0.0), 1.0);
        let b = hexagon(Coordinate::new(10.0, 0.0), 1.0);

        let err = assemble_polygon(&[closed(&a), closed(&b)]).unwrap_err();

        assert!(err.to_string().contains("left over"));
    }

    #[test]
    fn bow_tie_is_rejected() {
        let bow_tie = [
            Coord { x: 0.0, y: 0.0 },
            Coord { x: 1.0, y: 1.0 },
            Coord { x: 1.0, y: 0.0 },
            Coord { x: 0.0, y: 1.0 },
        ];

        let err = assemble_polygon(&[closed(&bow_tie)]).unwrap_err();

        assert!(err.to_string().contains("crosses itself"));
    }

    #[test]
    fn collinear_ring_is_degenerate() {
        let line = [
            Coord { x: 0.0, y: 0.0 },
            Coord { x: 1.0, y: 0.0 },
            Coord { x: 2.0, y: 0.0 },
        ];

        assert!(assemble_polygon(&[closed(&line)]).is_err());
        assert!(assemble_polygon(&[]).is_err());
    }
}
