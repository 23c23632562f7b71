use axum::extract::{Extension, Json};
use geojson::FeatureCollection;

use crate::api::DynAPI;
use crate::entities::{Journey, JourneyRequest};
use crate::error::Error;

pub async fn create(
    Extension(api): Extension<DynAPI>,
    Json(request): Json<JourneyRequest>,
) -> Result<Json<Journey>, Error> {
    let journey = api.create_journey(request).await?;

    Ok(journey.into())
}

pub async fn create_geojson(
    Extension(api): Extension<DynAPI>,
    Json(request): Json<JourneyRequest>,
) -> Result<Json<FeatureCollection>, Error> {
    let journey = api.create_journey(request).await?;

    Ok(journey.to_feature_collection().into())
}
