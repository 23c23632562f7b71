pub mod mapbox;

use async_trait::async_trait;
use geo_types::LineString;

use crate::entities::{Candidate, Coordinate, SearchArea, TravelProfile};
use crate::error::Error;

/// Source of reachable-area boundaries (isochrones).
#[async_trait]
pub trait ReachableAreaProvider: Send + Sync {
    /// Boundary line features of everything reachable from `origin` within `minutes`.
    async fn reachable_area(
        &self,
        origin: Coordinate,
        profile: TravelProfile,
        minutes: u32,
    ) -> Result<Vec<LineString<f64>>, Error>;
}

/// Source of points of interest for a category.
#[async_trait]
pub trait CandidateProvider: Send + Sync {
    async fn find_candidates(
        &self,
        area: &SearchArea,
        category: &str,
    ) -> Result<Vec<Candidate>, Error>;
}
