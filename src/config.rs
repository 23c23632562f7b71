use std::env;
use std::net::SocketAddr;
use std::str::FromStr;
use std::time::Duration;

use crate::entities::TravelProfile;
use crate::error::Error;

#[derive(Clone, Debug)]
pub struct Config {
    pub mapbox_api_base: String,
    pub mapbox_access_token: String,
    pub profile: TravelProfile,
    pub candidate_limit: u32,
    pub max_attempts: u32,
    pub request_timeout: Duration,
    pub addr: SocketAddr,
}

impl Config {
    /// Reads the process environment. Call `dotenv::dotenv()` first to pick up a `.env` file.
    pub fn from_env() -> Result<Self, Error> {
        Self::from_vars(|key| env::var(key).ok())
    }

    pub fn from_vars<F>(var: F) -> Result<Self, Error>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mapbox_access_token = var("MAPBOX_ACCESS_TOKEN")
            .filter(|token| !token.trim().is_empty())
            .ok_or_else(|| Error::Config("MAPBOX_ACCESS_TOKEN is not set".into()))?;

        let max_attempts: u32 = parse_or(&var, "JAUNT_MAX_ATTEMPTS", 3)?;
        if max_attempts == 0 {
            return Err(Error::Config("JAUNT_MAX_ATTEMPTS must be at least 1".into()));
        }

        Ok(Self {
            mapbox_api_base: var("MAPBOX_API_BASE").unwrap_or_else(|| "api.mapbox.com".into()),
            mapbox_access_token,
            profile: parse_or(&var, "JAUNT_PROFILE", TravelProfile::Cycling)?,
            candidate_limit: parse_or(&var, "JAUNT_CANDIDATE_LIMIT", 10)?,
            max_attempts,
            request_timeout: Duration::from_secs(parse_or(&var, "JAUNT_REQUEST_TIMEOUT_SECS", 10)?),
            addr: parse_or(&var, "JAUNT_ADDR", SocketAddr::from(([127, 0, 0, 1], 3000)))?,
        })
    }
}

fn parse_or<F, T>(var: &F, key: &str, default: T) -> Result<T, Error>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
{
    match var(key) {
        Some(value) => value
            .trim()
            .parse()
            .map_err(|_| Error::Config(format!("{} has an invalid value '{}'", key, value))),
        None => Ok(default),
    }
}

#[test]
fn defaults_apply_when_only_the_token_is_set() {
    let config = Config::from_vars(|key| match key {
        "MAPBOX_ACCESS_TOKEN" => Some("pk.test".into()),
        _ => None,
    })
    .unwrap();

    assert_eq!(config.mapbox_api_base, "api.mapbox.com");
    assert_eq!(config.profile, TravelProfile::Cycling);
    assert_eq!(config.candidate_limit, 10);
    assert_eq!(config.max_attempts, 3);
    assert_eq!(config.request_timeout, Duration::from_secs(10));
    assert_eq!(config.addr.port(), 3000);
}

#[test]
fn missing_token_and_bad_values_are_config_errors() {
    assert!(matches!(Config::from_vars(|_| None), Err(Error::Config(_))));

    let err = Config::from_vars(|key| match key {
        "MAPBOX_ACCESS_TOKEN" => Some("pk.test".into()),
        "JAUNT_PROFILE" => Some("teleport".into()),
        _ => None,
    })
    .unwrap_err();

    assert!(err.to_string().contains("JAUNT_PROFILE"));
}
