use async_trait::async_trait;
use std::sync::Arc;

use crate::entities::{Journey, JourneyRequest};
use crate::error::Error;

#[async_trait]
pub trait JourneyAPI {
    /// Generates a journey with a fresh random source, re-sampling the
    /// bearing up to the configured number of attempts when no candidate
    /// is found.
    async fn create_journey(&self, request: JourneyRequest) -> Result<Journey, Error>;
}

pub trait API: JourneyAPI {}

pub type DynAPI = Arc<dyn API + Send + Sync>;
