mod handlers;

use std::net::SocketAddr;
use std::sync::Arc;

use axum::{
    extract::Extension,
    routing::{get, post},
    Router,
};

use crate::api::{DynAPI, API};
use crate::server::handlers::journeys;

pub use handlers::journeys::{create as create_journey, create_geojson as create_journey_geojson};

pub fn router(api: DynAPI) -> Router {
    Router::new()
        .route("/", get(root))
        .route("/journeys", post(journeys::create))
        .route("/journeys/geojson", post(journeys::create_geojson))
        .layer(Extension(api))
}

pub async fn serve<T: API + Sync + Send + 'static>(api: T, addr: SocketAddr) {
    let api = Arc::new(api) as DynAPI;
    let app = router(api);

    tracing::info!("listening on {}", addr);

    if let Err(err) = axum::Server::bind(&addr)
        .serve(app.into_make_service())
        .await
    {
        tracing::error!("server stopped: {}", err);
    }
}

async fn root() -> &'static str {
    "Go on a journey!"
}
