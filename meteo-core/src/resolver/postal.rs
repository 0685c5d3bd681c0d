use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use tracing::info;

use crate::{
    error::{MeteoError, Result},
    http::{endpoint, get_json},
    model::{Location, ResolvedPlace},
};

use super::{GeoNamesResponse, Resolver};

const OPERATION: &str = "resolving place via GeoNames postal code search";

/// Resolves places through GeoNames `postalCodeSearchJSON`, taking the first result.
#[derive(Debug, Clone)]
pub struct PostalResolver {
    username: String,
    base_url: String,
    http: Client,
}

impl PostalResolver {
    pub fn new(username: &str, http: Client, base_url: &str) -> Self {
        Self {
            username: username.to_string(),
            base_url: base_url.to_string(),
            http,
        }
    }

    pub async fn lookup(&self, place: &str, country: &str) -> Result<ResolvedPlace> {
        let input = format!("{place},{country}");
        let url = endpoint(&self.base_url, "postalCodeSearchJSON");
        let query = [
            ("placename", place.to_string()),
            ("country", country.to_string()),
            ("username", self.username.clone()),
        ];

        let parsed: PostalCodes =
            get_json::<GeoNamesResponse<PostalCodes>>(&self.http, OPERATION, &input, &url, &query)
                .await?
                .into_result(OPERATION, &input)?;

        let first = parsed
            .postal_codes
            .into_iter()
            .next()
            .ok_or_else(|| MeteoError::place_not_found(place, country))?;

        info!(place, country, lat = first.lat, lng = first.lng, "resolved place");

        Ok(ResolvedPlace {
            lat: first.lat,
            lng: first.lng,
            place_name: first.place_name,
            country_code: first.country_code,
        })
    }
}

#[derive(Debug, Deserialize)]
struct PostalCodes {
    #[serde(rename = "postalCodes")]
    postal_codes: Vec<PostalCode>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PostalCode {
    lat: f64,
    lng: f64,
    #[serde(default)]
    place_name: String,
    #[serde(default)]
    country_code: String,
}

#[async_trait]
impl Resolver for PostalResolver {
    async fn resolve(&self, place: &str, country: &str) -> Result<Location> {
        self.lookup(place, country).await.map(|p| p.location())
    }
}
