use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use tracing::{debug, info};

use crate::{
    error::{MeteoError, Result},
    http::{endpoint, get_json},
    model::{Location, ResolvedPlace},
};

use super::{GeoNamesResponse, Resolver};

const OPERATION: &str = "resolving place via GeoNames Wikipedia search";

/// Resolves places through GeoNames `wikipediaSearchJSON`.
///
/// Only candidates whose title equals the place name and whose country code
/// equals the requested country are accepted.
#[derive(Debug, Clone)]
pub struct WikipediaResolver {
    username: String,
    base_url: String,
    max_rows: u32,
    http: Client,
}

impl WikipediaResolver {
    pub fn new(username: &str, http: Client, base_url: &str, max_rows: u32) -> Self {
        Self {
            username: username.to_string(),
            base_url: base_url.to_string(),
            max_rows,
            http,
        }
    }

    pub async fn lookup(&self, place: &str, country: &str) -> Result<ResolvedPlace> {
        let input = format!("{place},{country}");
        let url = endpoint(&self.base_url, "wikipediaSearchJSON");
        let query = [
            ("q", place.to_string()),
            ("maxRows", self.max_rows.to_string()),
            ("title", place.to_string()),
            ("countryCode", country.to_string()),
            ("username", self.username.clone()),
        ];

        let parsed: WikipediaPlaces = get_json::<GeoNamesResponse<WikipediaPlaces>>(
            &self.http, OPERATION, &input, &url, &query,
        )
        .await?
        .into_result(OPERATION, &input)?;
        debug!(candidates = parsed.geonames.len(), "wikipedia search returned");

        let found = lookup_place(parsed.geonames, place, country)
            .ok_or_else(|| MeteoError::place_not_found(place, country))?;

        info!(place, country, lat = found.lat, lng = found.lng, "resolved place");
        Ok(found)
    }
}

fn lookup_place(
    candidates: Vec<WikipediaPlace>,
    place: &str,
    country: &str,
) -> Option<ResolvedPlace> {
    candidates
        .into_iter()
        .find(|c| c.title == place && c.country_code == country)
        .map(|c| ResolvedPlace {
            lat: c.lat,
            lng: c.lng,
            place_name: c.title,
            country_code: c.country_code,
        })
}

#[derive(Debug, Deserialize)]
struct WikipediaPlaces {
    geonames: Vec<WikipediaPlace>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct WikipediaPlace {
    lat: f64,
    lng: f64,
    #[serde(default)]
    country_code: String,
    #[serde(default)]
    title: String,
}

#[async_trait]
impl Resolver for WikipediaResolver {
    async fn resolve(&self, place: &str, country: &str) -> Result<Location> {
        self.lookup(place, country).await.map(|p| p.location())
    }
}
