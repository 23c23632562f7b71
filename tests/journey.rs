use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::extract::{Extension, Json};
use geo_types::{Coord, LineString};
use rand::rngs::StdRng;
use rand::SeedableRng;
use tokio_test::block_on;

use jaunt::api::{DynAPI, JourneyAPI};
use jaunt::engine::Engine;
use jaunt::entities::{Candidate, Contour, Coordinate, JourneyRequest, SearchArea, TravelProfile};
use jaunt::error::{provider_error, Error, ProviderFailure};
use jaunt::external::{CandidateProvider, ReachableAreaProvider};
use jaunt::server::{create_journey, create_journey_geojson};

const ORIGIN: Coordinate = Coordinate {
    lng: -122.2685,
    lat: 47.5505,
};

struct FixedArea {
    features: Vec<LineString<f64>>,
    budgets: Arc<Mutex<Vec<(TravelProfile, u32)>>>,
}

#[async_trait]
impl ReachableAreaProvider for FixedArea {
    async fn reachable_area(
        &self,
        _origin: Coordinate,
        profile: TravelProfile,
        minutes: u32,
    ) -> Result<Vec<LineString<f64>>, Error> {
        self.budgets.lock().unwrap().push((profile, minutes));
        Ok(self.features.clone())
    }
}

/// Returns nothing for the first `empty_calls` searches, then `candidates`.
struct FixedCandidates {
    candidates: Vec<Candidate>,
    empty_calls: usize,
    calls: Arc<AtomicUsize>,
}

#[async_trait]
impl CandidateProvider for FixedCandidates {
    async fn find_candidates(
        &self,
        _area: &SearchArea,
        _category: &str,
    ) -> Result<Vec<Candidate>, Error> {
        let call = self.calls.fetch_add(1, Ordering::SeqCst);
        if call < self.empty_calls {
            return Ok(vec![]);
        }
        Ok(self.candidates.clone())
    }
}

struct OfflineCandidates;

#[async_trait]
impl CandidateProvider for OfflineCandidates {
    async fn find_candidates(
        &self,
        _area: &SearchArea,
        _category: &str,
    ) -> Result<Vec<Candidate>, Error> {
        Err(provider_error("mapbox geocoding", ProviderFailure::Network))
    }
}

fn hexagon(center: Coordinate, radius: f64) -> Vec<Coord<f64>> {
    (0..=6)
        .map(|i| {
            let angle = ((i % 6) as f64 * 60.0).to_radians();
            Coord {
                x: center.lng + radius * angle.cos(),
                y: center.lat + radius * angle.sin(),
            }
        })
        .collect()
}

fn coffee(lng: f64, lat: f64, name: &str) -> Candidate {
    Candidate::new(Coordinate::new(lng, lat), name.into(), "coffee".into())
}

fn area(features: Vec<LineString<f64>>) -> (FixedArea, Arc<Mutex<Vec<(TravelProfile, u32)>>>) {
    let budgets = Arc::new(Mutex::new(vec![]));
    let provider = FixedArea {
        features,
        budgets: budgets.clone(),
    };
    (provider, budgets)
}

fn hexagon_area() -> (FixedArea, Arc<Mutex<Vec<(TravelProfile, u32)>>>) {
    area(vec![LineString::new(hexagon(ORIGIN, 0.05))])
}

fn candidates(candidates: Vec<Candidate>, empty_calls: usize) -> (FixedCandidates, Arc<AtomicUsize>) {
    let calls = Arc::new(AtomicUsize::new(0));
    let provider = FixedCandidates {
        candidates,
        empty_calls,
        calls: calls.clone(),
    };
    (provider, calls)
}

fn on_boundary(point: Coordinate, contour: &Contour) -> bool {
    let p: Coord<f64> = point.into();
    contour.edges().any(|edge| {
        let span = edge.end - edge.start;
        let offset = p - edge.start;
        let length = span.x.hypot(span.y);
        let off_line = (span.x * offset.y - span.y * offset.x).abs() / length;
        let along = (span.x * offset.x + span.y * offset.y) / (length * length);
        off_line <= 1e-9 && (-1e-9..=1.0 + 1e-9).contains(&along)
    })
}

#[test]
fn one_way_coffee_journey_inside_a_hexagon() {
    let (area, budgets) = hexagon_area();
    let inside = coffee(-122.2600, 47.5550, "Empire Espresso");
    let outside = coffee(-122.1000, 47.7000, "Across The Lake Cafe");
    let (candidates, _) = candidates(vec![outside, inside.clone()], 0);

    let engine = Engine::new(area, candidates);
    let request = JourneyRequest::new(ORIGIN, true, 30, "coffee");
    let mut rng = StdRng::seed_from_u64(42);

    let journey = block_on(engine.generate(&request, &mut rng)).unwrap();

    assert_eq!(journey.origin_point, ORIGIN);
    assert_eq!(journey.destination_point, inside.coordinate);
    assert_eq!(journey.destination_poi, inside);
    assert!((0.0..360.0).contains(&journey.bearing));
    assert!(on_boundary(journey.bearing_point, &journey.contour_ring));
    assert_eq!(budgets.lock().unwrap().as_slice(), &[(TravelProfile::Cycling, 30)]);
}

#[test]
fn no_candidate_inside_the_area_fails_the_journey() {
    let (area, _) = hexagon_area();
    let outside = coffee(-122.1000, 47.7000, "Across The Lake Cafe");
    let (candidates, calls) = candidates(vec![outside], 0);

    let engine = Engine::new(area, candidates);
    let request = JourneyRequest::new(ORIGIN, true, 30, "coffee");
    let mut rng = StdRng::seed_from_u64(42);

    let err = block_on(engine.generate(&request, &mut rng)).unwrap_err();

    match err {
        Error::NoCandidate { category, area } => {
            assert_eq!(category, "coffee");
            assert!(area.bounds.min().x < ORIGIN.lng && ORIGIN.lng < area.bounds.max().x);
        }
        other => panic!("expected NoCandidate, got {:?}", other),
    }
    assert_eq!(calls.load(Ordering::SeqCst), 1);
}

#[test]
fn round_trip_queries_half_the_duration() {
    for (is_one_way, expected) in [(false, 30), (true, 60)] {
        let (area, budgets) = hexagon_area();
        let (candidates, _) = candidates(vec![coffee(-122.2600, 47.5550, "Empire Espresso")], 0);

        let engine = Engine::new(area, candidates);
        let request = JourneyRequest::new(ORIGIN, is_one_way, 60, "coffee");
        let mut rng = StdRng::seed_from_u64(1);

        block_on(engine.generate(&request, &mut rng)).unwrap();

        assert_eq!(
            budgets.lock().unwrap().as_slice(),
            &[(TravelProfile::Cycling, expected)]
        );
    }
}

#[test]
fn same_seed_and_responses_give_the_same_journey() {
    let shops = vec![
        coffee(-122.2600, 47.5550, "Empire Espresso"),
        coffee(-122.2800, 47.5400, "Tin Umbrella"),
        coffee(-122.2700, 47.5700, "Columbia City Bakery"),
        coffee(-122.2500, 47.5450, "Bike Works Cafe"),
    ];
    let request = JourneyRequest::new(ORIGIN, false, 50, "coffee");

    let run = |seed: u64| {
        let (area, _) = hexagon_area();
        let (candidates, _) = candidates(shops.clone(), 0);
        let engine = Engine::new(area, candidates).with_profile(TravelProfile::Walking);
        let mut rng = StdRng::seed_from_u64(seed);
        block_on(engine.generate(&request, &mut rng)).unwrap()
    };

    assert_eq!(run(2024), run(2024));
    assert_eq!(run(7), run(7));
}

#[test]
fn empty_or_broken_boundaries_are_unreachable() {
    let (candidates_a, _) = candidates(vec![], 0);
    let (empty, _) = area(vec![]);
    let engine = Engine::new(empty, candidates_a);
    let request = JourneyRequest::new(ORIGIN, true, 30, "coffee");
    let mut rng = StdRng::seed_from_u64(3);

    let err = block_on(engine.generate(&request, &mut rng)).unwrap_err();
    assert!(matches!(err, Error::UnreachableArea { minutes: 30, source: None }));

    let mut open = hexagon(ORIGIN, 0.05);
    open.truncate(4);
    let (candidates_b, calls) = candidates(vec![], 0);
    let (broken, _) = area(vec![LineString::new(open)]);
    let engine = Engine::new(broken, candidates_b);

    let err = block_on(engine.generate(&request, &mut rng)).unwrap_err();
    assert!(matches!(err, Error::UnreachableArea { source: Some(_), .. }));
    assert_eq!(calls.load(Ordering::SeqCst), 0);
}

#[test]
fn area_that_misses_the_origin_is_a_geometry_error() {
    let elsewhere = Coordinate::new(-122.0, 47.0);
    let (area, _) = area(vec![LineString::new(hexagon(elsewhere, 0.05))]);
    let (candidates, _) = candidates(vec![], 0);

    let engine = Engine::new(area, candidates);
    let request = JourneyRequest::new(ORIGIN, true, 30, "coffee");
    let mut rng = StdRng::seed_from_u64(3);

    let err = block_on(engine.generate(&request, &mut rng)).unwrap_err();
    assert!(matches!(err, Error::Geometry(_)));
}

#[test]
fn origin_on_the_boundary_is_a_geometry_error() {
    let (lng, lat) = (ORIGIN.lng, ORIGIN.lat);
    let square = vec![
        Coord { x: lng - 0.05, y: lat },
        Coord { x: lng + 0.05, y: lat },
        Coord { x: lng + 0.05, y: lat + 0.05 },
        Coord { x: lng - 0.05, y: lat + 0.05 },
        Coord { x: lng - 0.05, y: lat },
    ];
    let (area, _) = area(vec![LineString::new(square)]);
    let shop = coffee(lng, lat + 0.02, "Empire Espresso");
    let (candidates, calls) = candidates(vec![shop], 0);

    let engine = Engine::new(area, candidates);
    let request = JourneyRequest::new(ORIGIN, true, 30, "coffee");

    for seed in 0..8 {
        let mut rng = StdRng::seed_from_u64(seed);
        let err = block_on(engine.generate(&request, &mut rng)).unwrap_err();
        assert!(matches!(err, Error::Geometry(_)), "{:?}", err);
    }
    assert_eq!(calls.load(Ordering::SeqCst), 0);
}

#[test]
fn invalid_requests_never_reach_the_providers() {
    let (area, budgets) = hexagon_area();
    let (candidates, _) = candidates(vec![], 0);
    let engine = Engine::new(area, candidates);
    let mut rng = StdRng::seed_from_u64(3);

    for request in [
        JourneyRequest::new(ORIGIN, true, 0, "coffee"),
        JourneyRequest::new(ORIGIN, false, 1, "coffee"),
        JourneyRequest::new(ORIGIN, true, 30, "  "),
        JourneyRequest::new(Coordinate::new(f64::NAN, 47.0), true, 30, "coffee"),
    ] {
        let err = block_on(engine.generate(&request, &mut rng)).unwrap_err();
        assert!(matches!(err, Error::InvalidInput(_)), "{:?}", request);
    }
    assert!(budgets.lock().unwrap().is_empty());
}

#[test]
fn provider_failures_surface_unchanged() {
    let (area, _) = hexagon_area();
    let engine = Engine::new(area, OfflineCandidates);
    let request = JourneyRequest::new(ORIGIN, true, 30, "bubble tea");
    let mut rng = StdRng::seed_from_u64(3);

    let err = block_on(engine.generate(&request, &mut rng)).unwrap_err();
    assert!(matches!(
        err,
        Error::Provider {
            kind: ProviderFailure::Network,
            ..
        }
    ));
}

#[test]
fn journey_api_resamples_the_bearing_when_nothing_is_found() {
    let (area, budgets) = hexagon_area();
    let shop = coffee(-122.2600, 47.5550, "Empire Espresso");
    let (candidates, calls) = candidates(vec![shop.clone()], 2);
    let engine = Engine::new(area, candidates).with_max_attempts(3);

    let journey = block_on(engine.create_journey(JourneyRequest::new(ORIGIN, true, 30, "coffee")))
        .unwrap();

    assert_eq!(journey.destination_poi, shop);
    assert_eq!(calls.load(Ordering::SeqCst), 3);
    assert_eq!(budgets.lock().unwrap().as_slice(), &[(TravelProfile::Cycling, 30)]);
}

#[test]
fn journey_api_gives_up_after_the_last_attempt() {
    let (area, budgets) = hexagon_area();
    let (candidates, calls) = candidates(vec![], 0);
    let engine = Engine::new(area, candidates).with_max_attempts(2);

    let err = block_on(engine.create_journey(JourneyRequest::new(ORIGIN, true, 30, "coffee")))
        .unwrap_err();

    assert!(err.is_no_candidate());
    assert_eq!(calls.load(Ordering::SeqCst), 2);
    assert_eq!(budgets.lock().unwrap().len(), 1);
}

#[test]
fn handlers_return_json_and_geojson() {
    let shop = coffee(-122.2600, 47.5550, "Empire Espresso");

    let api = || {
        let (area, _) = hexagon_area();
        let (candidates, _) = candidates(vec![shop.clone()], 0);
        Arc::new(Engine::new(area, candidates)) as DynAPI
    };
    let request = JourneyRequest::new(ORIGIN, true, 30, "coffee");

    let Json(journey) = block_on(create_journey(Extension(api()), Json(request.clone()))).unwrap();
    let body = serde_json::to_value(&journey).unwrap();
    assert_eq!(body["destination_poi"]["place_name"], "Empire Espresso");
    assert_eq!(body["contour_ring"].as_array().map(Vec::len), Some(7));

    let Json(collection) = block_on(create_journey_geojson(Extension(api()), Json(request))).unwrap();
    let labels: Vec<String> = collection
        .features
        .iter()
        .filter_map(|f| f.property("label").and_then(|v| v.as_str()).map(String::from))
        .collect();
    assert_eq!(labels, vec!["Ring", "Origin", "Bearing", "Destination"]);
}
