use jaunt::config::Config;
use jaunt::engine::Engine;
use jaunt::error::Error;
use jaunt::external::mapbox::MapboxClient;
use jaunt::server::serve;

#[tokio::main]
async fn main() -> Result<(), Error> {
    dotenv::dotenv().ok();
    tracing_subscriber::fmt::init();

    let config = Config::from_env()?;
    let mapbox = MapboxClient::new(&config)?;

    let engine = Engine::new(mapbox.clone(), mapbox)
        .with_profile(config.profile)
        .with_max_attempts(config.max_attempts);

    serve(engine, config.addr).await;

    Ok(())
}
