use geojson::{Feature, FeatureCollection, Geometry, JsonObject, Value};
use serde::{Deserialize, Serialize};

use crate::entities::{Candidate, Contour, Coordinate};

/// The parameters of one generation request.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct JourneyRequest {
    pub origin: Coordinate,
    pub is_one_way: bool,
    pub duration_minutes: u32,
    pub category: String,
}

impl JourneyRequest {
    pub fn new(origin: Coordinate, is_one_way: bool, duration_minutes: u32, category: &str) -> Self {
        Self {
            origin,
            is_one_way,
            duration_minutes,
            category: category.into(),
        }
    }

    /// Outbound time budget sent to the reachable-area provider.
    ///
    /// A round trip has to get back inside the same window, so only half of
    /// it (rounded down) is spent going out.
    pub fn budget_minutes(&self) -> u32 {
        if self.is_one_way {
            self.duration_minutes
        } else {
            self.duration_minutes / 2
        }
    }
}

/// The result of one successful generation. Never partially populated.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Journey {
    pub origin_point: Coordinate,
    pub contour_ring: Contour,
    pub bearing: f64,
    pub bearing_point: Coordinate,
    pub destination_point: Coordinate,
    pub destination_poi: Candidate,
}

impl Journey {
    /// Ring plus Origin, Bearing and Destination markers, ready for a map layer.
    pub fn to_feature_collection(&self) -> FeatureCollection {
        let ring = self
            .contour_ring
            .polygon()
            .exterior()
            .coords()
            .map(|c| vec![c.x, c.y])
            .collect();

        let mut features = vec![feature(Value::Polygon(vec![ring]), properties("Ring", None))];
        features.push(marker(self.origin_point, properties("Origin", None)));
        features.push(marker(self.bearing_point, properties("Bearing", None)));
        features.push(marker(
            self.destination_point,
            properties("Destination", Some(&self.destination_poi.place_name)),
        ));

        FeatureCollection {
            bbox: None,
            features,
            foreign_members: None,
        }
    }
}

fn properties(label: &str, place_name: Option<&str>) -> JsonObject {
    let mut properties = JsonObject::new();
    properties.insert("label".into(), label.into());
    if let Some(place_name) = place_name {
        properties.insert("place_name".into(), place_name.into());
    }
    properties
}

fn marker(coordinate: Coordinate, properties: JsonObject) -> Feature {
    feature(Value::Point(vec![coordinate.lng, coordinate.lat]), properties)
}

fn feature(value: Value, properties: JsonObject) -> Feature {
    Feature {
        bbox: None,
        geometry: Some(Geometry::new(value)),
        id: None,
        properties: Some(properties),
        foreign_members: None,
    }
}

#[test]
fn round_trip_budget_is_half_the_window() {
    let origin = Coordinate::new(-122.2685, 47.5505);

    assert_eq!(JourneyRequest::new(origin, true, 60, "coffee").budget_minutes(), 60);
    assert_eq!(JourneyRequest::new(origin, false, 60, "coffee").budget_minutes(), 30);
    assert_eq!(JourneyRequest::new(origin, false, 45, "coffee").budget_minutes(), 22);
}
