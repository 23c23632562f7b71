mod journey_api;

use rand::seq::SliceRandom;
use rand::Rng;

use crate::{
    entities::{Contour, Journey, JourneyRequest, SearchArea, TravelProfile},
    error::{
        geometry_error, invalid_input_error, no_candidate_error, unreachable_area_error, Error,
    },
    external::{CandidateProvider, ReachableAreaProvider},
    geometry::{assemble_polygon, points_within_polygon, ray_intersect, sample_bearing},
};

/// Turns a [`JourneyRequest`] into a [`Journey`] using two geodata providers.
pub struct Engine<A, C> {
    area_provider: A,
    candidate_provider: C,
    profile: TravelProfile,
    max_attempts: u32,
}

impl<A, C> Engine<A, C>
where
    A: ReachableAreaProvider,
    C: CandidateProvider,
{
    pub fn new(area_provider: A, candidate_provider: C) -> Self {
        Self {
            area_provider,
            candidate_provider,
            profile: TravelProfile::default(),
            max_attempts: 1,
        }
    }

    pub fn with_profile(mut self, profile: TravelProfile) -> Self {
        self.profile = profile;
        self
    }

    /// Bearings tried by [`crate::api::JourneyAPI`] inside one reachable area
    /// before a missing candidate is reported. [`Engine::generate`] itself never retries.
    pub fn with_max_attempts(mut self, max_attempts: u32) -> Self {
        self.max_attempts = max_attempts.max(1);
        self
    }

    /// Generates one journey.
    ///
    /// Every random draw (bearing and destination) comes from `rng`, so a
    /// seeded source and fixed provider responses reproduce the same journey.
    /// Fails as a whole; no partially filled journey is ever returned.
    #[tracing::instrument(name = "Engine::generate", skip(self, rng))]
    pub async fn generate<R>(&self, request: &JourneyRequest, rng: &mut R) -> Result<Journey, Error>
    where
        R: Rng + Send + ?Sized,
    {
        let contour_ring = self.reachable_contour(request).await?;

        self.journey_within(request, &contour_ring, rng).await
    }

    /// Queries the reachable area for the request's budget and assembles it
    /// into a ring that strictly contains the origin.
    #[tracing::instrument(name = "Engine::reachable_contour", skip(self))]
    pub async fn reachable_contour(&self, request: &JourneyRequest) -> Result<Contour, Error> {
        validate(request)?;

        let minutes = request.budget_minutes();
        if minutes == 0 {
            return Err(invalid_input_error(format!(
                "a {} minute round trip leaves no time to travel out",
                request.duration_minutes
            )));
        }

        let features = self
            .area_provider
            .reachable_area(request.origin, self.profile, minutes)
            .await?;

        if features.is_empty() {
            return Err(unreachable_area_error(minutes, None));
        }

        let contour_ring =
            assemble_polygon(&features).map_err(|err| unreachable_area_error(minutes, Some(err)))?;

        // a ray cast from a point on the ring can leave the area without crossing it
        if !contour_ring.surrounds(request.origin) {
            return Err(geometry_error("origin is not strictly inside the reachable area"));
        }

        Ok(contour_ring)
    }

    /// Samples a bearing inside an assembled ring and picks a destination
    /// near where it meets the boundary.
    #[tracing::instrument(name = "Engine::journey_within", skip(self, contour_ring, rng))]
    pub async fn journey_within<R>(
        &self,
        request: &JourneyRequest,
        contour_ring: &Contour,
        rng: &mut R,
    ) -> Result<Journey, Error>
    where
        R: Rng + Send + ?Sized,
    {
        let bearing = sample_bearing(rng);
        let bearing_point = ray_intersect(request.origin, bearing, contour_ring)?;

        tracing::debug!(bearing, %bearing_point, "sampled bearing");

        let area = SearchArea {
            proximity: bearing_point,
            bounds: contour_ring
                .bounds()
                .ok_or_else(|| geometry_error("reachable area has no extent"))?,
        };

        let candidates = self
            .candidate_provider
            .find_candidates(&area, &request.category)
            .await?;
        let received = candidates.len();
        let candidates = points_within_polygon(candidates, contour_ring);

        tracing::debug!(received, inside = candidates.len(), "filtered candidates");

        let destination_poi = match candidates.choose(rng) {
            Some(candidate) => candidate.clone(),
            None => return Err(no_candidate_error(&request.category, area)),
        };

        Ok(Journey {
            origin_point: request.origin,
            contour_ring: contour_ring.clone(),
            bearing,
            bearing_point,
            destination_point: destination_poi.coordinate,
            destination_poi,
        })
    }
}

fn validate(request: &JourneyRequest) -> Result<(), Error> {
    if !request.origin.is_valid() {
        return Err(invalid_input_error(format!(
            "origin {:?} is not a WGS-84 coordinate",
            request.origin
        )));
    }
    if request.duration_minutes == 0 {
        return Err(invalid_input_error("duration must be a positive number of minutes"));
    }
    if request.category.trim().is_empty() {
        return Err(invalid_input_error("category must not be empty"));
    }

    Ok(())
}
