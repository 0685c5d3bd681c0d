//! MET Norway Locationforecast 2.0 (compact) client.

use chrono::{DateTime, Utc};
use reqwest::Client;
use serde::Deserialize;
use tracing::debug;

use crate::{
    error::{MeteoError, Result},
    http::{endpoint, get_json},
    model::{Forecast, ForecastSample, HourlyForecast, Weather},
};

const COMPACT_PATH: &str = "weatherapi/locationforecast/2.0/compact";
const OPERATION: &str = "fetching MET Norway forecast";

#[derive(Debug, Clone)]
pub struct MetClient {
    base_url: String,
    http: Client,
}

impl MetClient {
    pub fn new(http: Client, base_url: &str) -> Self {
        Self {
            base_url: base_url.to_string(),
            http,
        }
    }

    /// Current conditions at the given coordinates.
    pub async fn fetch(&self, lat: f64, lon: f64) -> Result<Weather> {
        self.fetch_sample(lat, lon).await.map(Weather::from)
    }

    /// Temperature and next-hour condition of the soonest time series entry.
    pub async fn fetch_sample(&self, lat: f64, lon: f64) -> Result<ForecastSample> {
        let parsed = self.get_compact(lat, lon).await?;

        let first = parsed
            .properties
            .timeseries
            .into_iter()
            .next()
            .ok_or_else(|| empty_series(lat, lon))?;

        let condition_code = first
            .data
            .next_1_hours
            .as_ref()
            .map(|p| p.summary.symbol_code.clone())
            .ok_or_else(|| {
                MeteoError::NotFound(format!(
                    "forecast entry at {} for lat {lat:.2}, lon {lon:.2} \
                     has no next hour summary",
                    first.time
                ))
            })?;

        Ok(ForecastSample {
            time: first.time,
            air_temperature_c: first.data.instant.details.air_temperature,
            condition_code,
        })
    }

    /// Every entry of the time series at the given coordinates.
    pub async fn forecast(&self, lat: f64, lon: f64) -> Result<Forecast> {
        let parsed = self.get_compact(lat, lon).await?;
        let MetProperties { meta, timeseries } = parsed.properties;

        if timeseries.is_empty() {
            return Err(empty_series(lat, lon));
        }

        let hourly = timeseries.into_iter().map(HourlyForecast::from).collect();

        Ok(Forecast {
            updated_at: meta.map(|m| m.updated_at),
            hourly,
        })
    }

    async fn get_compact(&self, lat: f64, lon: f64) -> Result<MetResponse> {
        let url = endpoint(&self.base_url, COMPACT_PATH);
        let input = format!("lat {lat:.2}, lon {lon:.2}");
        let query = [("lat", format!("{lat:.2}")), ("lon", format!("{lon:.2}"))];

        let parsed: MetResponse = get_json(&self.http, OPERATION, &input, &url, &query).await?;
        debug!(entries = parsed.properties.timeseries.len(), "forecast received");
        Ok(parsed)
    }
}

fn empty_series(lat: f64, lon: f64) -> MeteoError {
    MeteoError::NotFound(format!(
        "empty forecast time series for lat {lat:.2}, lon {lon:.2}"
    ))
}

#[derive(Debug, Deserialize)]
struct MetResponse {
    properties: MetProperties,
}

#[derive(Debug, Deserialize)]
struct MetProperties {
    #[serde(default)]
    meta: Option<MetMeta>,
    #[serde(default)]
    timeseries: Vec<MetEntry>,
}

#[derive(Debug, Deserialize)]
struct MetMeta {
    updated_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize)]
struct MetEntry {
    time: DateTime<Utc>,
    data: MetData,
}

#[derive(Debug, Deserialize)]
struct MetData {
    instant: MetInstant,
    next_1_hours: Option<MetPeriod>,
    next_6_hours: Option<MetPeriod>,
    next_12_hours: Option<MetPeriod>,
}

impl MetData {
    /// Shortest period summary present; entries far ahead only carry 6h/12h blocks.
    fn summary_code(&self) -> Option<&str> {
        [&self.next_1_hours, &self.next_6_hours, &self.next_12_hours]
            .into_iter()
            .flatten()
            .map(|p| p.summary.symbol_code.as_str())
            .next()
    }

    fn precipitation_amount(&self) -> f64 {
        [&self.next_1_hours, &self.next_6_hours]
            .into_iter()
            .flatten()
            .find_map(|p| p.details.as_ref().map(|d| d.precipitation_amount))
            .unwrap_or_default()
    }
}

#[derive(Debug, Deserialize)]
struct MetInstant {
    details: MetInstantDetails,
}

#[derive(Debug, Deserialize)]
struct MetInstantDetails {
    air_temperature: f64,
    #[serde(default)]
    air_pressure_at_sea_level: f64,
    #[serde(default)]
    cloud_area_fraction: f64,
    #[serde(default)]
    relative_humidity: f64,
    #[serde(default)]
    wind_from_direction: f64,
    #[serde(default)]
    wind_speed: f64,
}

#[derive(Debug, Deserialize)]
struct MetPeriod {
    summary: MetSummary,
    details: Option<MetPeriodDetails>,
}

#[derive(Debug, Deserialize)]
struct MetSummary {
    symbol_code: String,
}

#[derive(Debug, Deserialize)]
struct MetPeriodDetails {
    #[serde(default)]
    precipitation_amount: f64,
}

impl From<MetEntry> for HourlyForecast {
    fn from(entry: MetEntry) -> Self {
        let details = &entry.data.instant.details;
        Self {
            time: entry.time,
            air_pressure: details.air_pressure_at_sea_level,
            air_temperature: details.air_temperature,
            cloud_area_fraction: details.cloud_area_fraction,
            relative_humidity: details.relative_humidity,
            wind_from_direction: details.wind_from_direction,
            wind_speed: details.wind_speed,
            precipitation_amount: entry.data.precipitation_amount(),
            summary: entry.data.summary_code().map(str::to_string),
        }
    }
}
