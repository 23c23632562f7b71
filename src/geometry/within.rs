use crate::entities::{Contour, Located};

/// Keeps the points lying inside `contour` or on its boundary, in input order.
pub fn points_within_polygon<T, I>(points: I, contour: &Contour) -> Vec<T>
where
    T: Located,
    I: IntoIterator<Item = T>,
{
    points
        .into_iter()
        .filter(|point| contour.contains(point.coordinate()))
        .collect()
}

#[test]
fn boundary_points_are_kept_and_outside_points_dropped() {
    use crate::entities::Coordinate;
    use crate::geometry::fixtures::square;

    let contour = square(2.0);
    let points = vec![
        Coordinate::new(1.0, 1.0),
        Coordinate::new(3.0, 1.0),
        Coordinate::new(1.0, 0.0),
        Coordinate::new(-0.5, 0.5),
        Coordinate::new(2.0, 2.0),
        Coordinate::new(0.25, 1.75),
    ];

    let kept = points_within_polygon(points, &contour);

    assert_eq!(
        kept,
        vec![
            Coordinate::new(1.0, 1.0),
            Coordinate::new(1.0, 0.0),
            Coordinate::new(2.0, 2.0),
            Coordinate::new(0.25, 1.75),
        ]
    );
}

#[test]
fn candidates_keep_their_descriptors() {
    use crate::entities::{Candidate, Coordinate};
    use crate::geometry::fixtures::square;

    let contour = square(1.0);
    let inside = Candidate::new(Coordinate::new(0.5, 0.5), "Cafe Allegro".into(), "coffee".into());
    let outside = Candidate::new(Coordinate::new(1.5, 0.5), "Far Cafe".into(), "coffee".into());

    let kept = points_within_polygon(vec![outside, inside.clone()], &contour);

    assert_eq!(kept, vec![inside]);
}
