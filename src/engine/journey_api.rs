use super::Engine;

use async_trait::async_trait;
use rand::rngs::StdRng;
use rand::SeedableRng;

use crate::{
    api::{JourneyAPI, API},
    entities::{Journey, JourneyRequest},
    error::Error,
    external::{CandidateProvider, ReachableAreaProvider},
};

#[async_trait]
impl<A, C> JourneyAPI for Engine<A, C>
where
    A: ReachableAreaProvider,
    C: CandidateProvider,
{
    #[tracing::instrument(skip(self))]
    async fn create_journey(&self, request: JourneyRequest) -> Result<Journey, Error> {
        let mut rng = StdRng::from_entropy();
        let contour_ring = self.reachable_contour(&request).await?;
        let mut attempt = 1;

        loop {
            match self.journey_within(&request, &contour_ring, &mut rng).await {
                Err(err) if err.is_no_candidate() && attempt < self.max_attempts => {
                    tracing::warn!(attempt, "{}, sampling a new bearing", err);
                    attempt += 1;
                }
                result => return result,
            }
        }
    }
}

impl<A, C> API for Engine<A, C>
where
    A: ReachableAreaProvider,
    C: CandidateProvider,
{
}
