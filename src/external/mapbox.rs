use async_trait::async_trait;
use geo_types::{Coord, LineString};
use geojson::{GeoJson, Value};
use reqwest::{Client, Url};
use serde::Deserialize;

use crate::{
    config::Config,
    entities::{Candidate, Coordinate, SearchArea, TravelProfile},
    error::{provider_error, Error, ProviderFailure},
    external::{CandidateProvider, ReachableAreaProvider},
};

const ISOCHRONE: &str = "mapbox isochrone";
const GEOCODING: &str = "mapbox geocoding";

/// Client for the Mapbox Isochrone and Geocoding APIs.
#[derive(Clone)]
pub struct MapboxClient {
    http: Client,
    api_base: String,
    access_token: String,
    candidate_limit: u32,
}

#[derive(Debug, Deserialize)]
struct PlacesResponse {
    features: Vec<PlaceFeature>,
}

#[derive(Debug, Deserialize)]
struct PlaceFeature {
    center: [f64; 2],
    place_name: String,
    #[serde(default)]
    properties: PlaceProperties,
}

#[derive(Debug, Default, Deserialize)]
struct PlaceProperties {
    category: Option<String>,
}

impl MapboxClient {
    pub fn new(config: &Config) -> Result<Self, Error> {
        let http = Client::builder().timeout(config.request_timeout).build()?;

        Ok(Self {
            http,
            api_base: config.mapbox_api_base.clone(),
            access_token: config.mapbox_access_token.clone(),
            candidate_limit: config.candidate_limit,
        })
    }

    fn endpoint(&self, path: &str) -> Result<Url, Error> {
        Url::parse(&format!("https://{}/{}", self.api_base, path))
            .map_err(|err| Error::Config(format!("invalid MAPBOX_API_BASE: {}", err)))
    }
}

#[async_trait]
impl ReachableAreaProvider for MapboxClient {
    #[tracing::instrument(skip(self))]
    async fn reachable_area(
        &self,
        origin: Coordinate,
        profile: TravelProfile,
        minutes: u32,
    ) -> Result<Vec<LineString<f64>>, Error> {
        let coordinates: String = origin.into();
        let url = self.endpoint(&format!(
            "isochrone/v1/mapbox/{}/{}",
            profile.name(),
            coordinates
        ))?;

        let res = self
            .http
            .get(url)
            .query(&[("contours_minutes", minutes)])
            .query(&[("polygons", "false"), ("denoise", "1")])
            .query(&[("access_token", &self.access_token)])
            .send()
            .await?;

        check_status(ISOCHRONE, res.status().as_u16())?;

        let body = res.text().await?;
        let features = parse_isochrone(&body)?;

        tracing::info!("received {} boundary feature(s)", features.len());

        Ok(features)
    }
}

#[async_trait]
impl CandidateProvider for MapboxClient {
    #[tracing::instrument(skip(self))]
    async fn find_candidates(
        &self,
        area: &SearchArea,
        category: &str,
    ) -> Result<Vec<Candidate>, Error> {
        let mut url = self.endpoint("geocoding/v5/mapbox.places")?;
        url.path_segments_mut()
            .map_err(|_| Error::Config("MAPBOX_API_BASE cannot carry a path".into()))?
            .push(&format!("{}.json", category));

        let proximity: String = area.proximity.into();

        let res = self
            .http
            .get(url)
            .query(&[("types", "poi")])
            .query(&[("proximity", proximity)])
            .query(&[("bbox", area.bbox_param())])
            .query(&[("limit", self.candidate_limit)])
            .query(&[("access_token", &self.access_token)])
            .send()
            .await?;

        check_status(GEOCODING, res.status().as_u16())?;

        let body = res.text().await?;
        let candidates = parse_places(&body, category)?;

        tracing::info!("received {} '{}' candidate(s)", candidates.len(), category);

        Ok(candidates)
    }
}

fn check_status(provider: &'static str, status_code: u16) -> Result<(), Error> {
    if (400..500).contains(&status_code) {
        return Err(provider_error(provider, ProviderFailure::Rejected));
    } else if status_code != 200 {
        return Err(provider_error(provider, ProviderFailure::Upstream));
    }

    Ok(())
}

/// Boundary lines out of an isochrone FeatureCollection. Polygon contours
/// contribute their exterior ring.
fn parse_isochrone(body: &str) -> Result<Vec<LineString<f64>>, Error> {
    let malformed = || provider_error(ISOCHRONE, ProviderFailure::MalformedResponse);

    let features = match body.parse::<GeoJson>().map_err(|_| malformed())? {
        GeoJson::FeatureCollection(collection) => collection.features,
        GeoJson::Feature(feature) => vec![feature],
        GeoJson::Geometry(_) => return Err(malformed()),
    };

    let mut lines = vec![];

    for feature in features {
        let value = match feature.geometry {
            Some(geometry) => geometry.value,
            None => continue,
        };

        match value {
            Value::LineString(positions) => lines.push(to_line(&positions).ok_or_else(malformed)?),
            Value::MultiLineString(parts) => {
                for positions in parts {
                    lines.push(to_line(&positions).ok_or_else(malformed)?);
                }
            }
            Value::Polygon(rings) => {
                if let Some(exterior) = rings.first() {
                    lines.push(to_line(exterior).ok_or_else(malformed)?);
                }
            }
            Value::MultiPolygon(polygons) => {
                for rings in polygons {
                    if let Some(exterior) = rings.first() {
                        lines.push(to_line(exterior).ok_or_else(malformed)?);
                    }
                }
            }
            _ => {}
        }
    }

    Ok(lines)
}

fn to_line(positions: &[Vec<f64>]) -> Option<LineString<f64>> {
    positions
        .iter()
        .map(|position| match position.as_slice() {
            [x, y, ..] => Some(Coord { x: *x, y: *y }),
            _ => None,
        })
        .collect::<Option<Vec<_>>>()
        .map(LineString::new)
}

fn parse_places(body: &str, category: &str) -> Result<Vec<Candidate>, Error> {
    let data: PlacesResponse = serde_json::from_str(body)
        .map_err(|_| provider_error(GEOCODING, ProviderFailure::MalformedResponse))?;

    Ok(data
        .features
        .into_iter()
        .map(|feature| {
            let [lng, lat] = feature.center;
            Candidate::new(
                Coordinate::new(lng, lat),
                feature.place_name,
                feature.properties.category.unwrap_or_else(|| category.into()),
            )
        })
        .collect())
}

#[test]
fn isochrone_lines_are_read_from_a_feature_collection() {
    let body = r##"{
        "type": "FeatureCollection",
        "features": [{
            "type": "Feature",
            "properties": { "contour": 30, "color": "#bf4040", "opacity": 0.33, "metric": "time" },
            "geometry": {
                "type": "LineString",
                "coordinates": [[-122.30, 47.50], [-122.20, 47.50], [-122.25, 47.60], [-122.30, 47.50]]
            }
        }]
    }"##;

    let lines = parse_isochrone(body).unwrap();

    assert_eq!(lines.len(), 1);
    assert_eq!(lines[0].0.len(), 4);
    assert_eq!(lines[0].0[1], Coord { x: -122.20, y: 47.50 });
}

#[test]
fn isochrone_polygons_contribute_their_exterior() {
    let body = r#"{
        "type": "Feature",
        "properties": {},
        "geometry": {
            "type": "Polygon",
            "coordinates": [
                [[0.0, 0.0], [4.0, 0.0], [4.0, 4.0], [0.0, 4.0], [0.0, 0.0]],
                [[1.0, 1.0], [2.0, 1.0], [2.0, 2.0], [1.0, 1.0]]
            ]
        }
    }"#;

    let lines = parse_isochrone(body).unwrap();

    assert_eq!(lines.len(), 1);
    assert_eq!(lines[0].0.len(), 5);
}

#[test]
fn isochrone_garbage_is_a_malformed_response() {
    let err = parse_isochrone("<html>rate limited</html>").unwrap_err();

    assert!(matches!(
        err,
        Error::Provider {
            kind: ProviderFailure::MalformedResponse,
            ..
        }
    ));
}

#[test]
fn places_keep_order_and_fall_back_to_the_requested_category() {
    let body = r#"{
        "type": "FeatureCollection",
        "query": ["coffee"],
        "features": [
            {
                "id": "poi.1",
                "text": "Empire Espresso",
                "place_name": "Empire Espresso, 3829 S Edmunds St, Seattle, Washington 98118",
                "center": [-122.2843, 47.5598],
                "properties": { "category": "coffee, cafe" }
            },
            {
                "id": "poi.2",
                "text": "Tin Umbrella",
                "place_name": "Tin Umbrella Coffee, Seattle, Washington",
                "center": [-122.2839, 47.5396],
                "properties": {}
            }
        ]
    }"#;

    let candidates = parse_places(body, "coffee").unwrap();

    assert_eq!(candidates.len(), 2);
    assert_eq!(candidates[0].coordinate, Coordinate::new(-122.2843, 47.5598));
    assert_eq!(candidates[0].category, "coffee, cafe");
    assert_eq!(candidates[1].category, "coffee");
}

#[test]
fn status_codes_split_rejected_from_upstream() {
    assert!(check_status(GEOCODING, 200).is_ok());
    assert!(matches!(
        check_status(GEOCODING, 422),
        Err(Error::Provider {
            kind: ProviderFailure::Rejected,
            ..
        })
    ));
    assert!(matches!(
        check_status(ISOCHRONE, 503),
        Err(Error::Provider {
            kind: ProviderFailure::Upstream,
            ..
        })
    ));
}
