use geo_types::Rect;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::entities::Coordinate;

/// A point of interest returned by a candidate provider.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Candidate {
    pub coordinate: Coordinate,
    pub place_name: String,
    pub category: String,
}

impl Candidate {
    pub fn new(coordinate: Coordinate, place_name: String, category: String) -> Self {
        Self {
            coordinate,
            place_name,
            category,
        }
    }
}

/// Anything that sits at a single coordinate.
pub trait Located {
    fn coordinate(&self) -> Coordinate;
}

impl Located for Coordinate {
    fn coordinate(&self) -> Coordinate {
        *self
    }
}

impl Located for Candidate {
    fn coordinate(&self) -> Coordinate {
        self.coordinate
    }
}

/// Where candidates are searched for: biased toward `proximity`, limited to `bounds`.
#[derive(Clone, Debug, PartialEq)]
pub struct SearchArea {
    pub proximity: Coordinate,
    pub bounds: Rect<f64>,
}

impl SearchArea {
    pub fn bbox_param(&self) -> String {
        let min = self.bounds.min();
        let max = self.bounds.max();
        format!("{},{},{},{}", min.x, min.y, max.x, max.y)
    }
}

impl fmt::Display for SearchArea {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "near {} within [{}]", self.proximity, self.bbox_param())
    }
}
