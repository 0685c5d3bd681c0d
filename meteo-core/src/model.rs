use std::{fmt, str::FromStr};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::MeteoError;

/// Geographic coordinates in decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Location {
    pub latitude: f64,
    pub longitude: f64,
}

impl Location {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }
}

/// A `"<place>,<country-code>"` query, e.g. `"Castlebar,IE"`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlaceQuery {
    pub place_name: String,
    pub country_code: String,
}

impl FromStr for PlaceQuery {
    type Err = MeteoError;

    fn from_str(input: &str) -> Result<Self, Self::Err> {
        let parse_err = || MeteoError::Parse {
            input: input.to_string(),
        };

        let (place, country) = input.split_once(',').ok_or_else(parse_err)?;
        let (place, country) = (place.trim(), country.trim());

        if place.is_empty() || country.is_empty() || country.contains(',') {
            return Err(parse_err());
        }

        Ok(Self {
            place_name: place.to_string(),
            country_code: country.to_string(),
        })
    }
}

impl fmt::Display for PlaceQuery {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{},{}", self.place_name, self.country_code)
    }
}

/// First usable candidate returned by a geocoder.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResolvedPlace {
    pub lat: f64,
    pub lng: f64,
    pub place_name: String,
    pub country_code: String,
}

impl ResolvedPlace {
    pub fn location(&self) -> Location {
        Location::new(self.lat, self.lng)
    }
}

/// The nearest entry of a forecast time series.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastSample {
    pub time: DateTime<Utc>,
    pub air_temperature_c: f64,
    pub condition_code: String,
}

/// Current conditions, ready for display.
///
/// `Display` renders `"<Condition> <temp>°C"` with the condition code
/// title-cased and the temperature rounded to one decimal.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Weather {
    pub summary: String,
    pub temp: f64,
}

impl From<ForecastSample> for Weather {
    fn from(sample: ForecastSample) -> Self {
        Self {
            summary: sample.condition_code,
            temp: sample.air_temperature_c,
        }
    }
}

impl fmt::Display for Weather {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {:.1}°C", title_case(&self.summary), self.temp)
    }
}

/// Upper-cases the first letter of every word and lower-cases the rest,
/// leaving the whitespace between words as it was.
fn title_case(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut word_start = true;
    for c in text.chars() {
        if c.is_whitespace() {
            out.push(c);
            word_start = true;
        } else if word_start {
            out.extend(c.to_uppercase());
            word_start = false;
        } else {
            out.extend(c.to_lowercase());
        }
    }
    out
}

/// Every entry of a forecast time series, plus the time the model run was published.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Forecast {
    pub updated_at: Option<DateTime<Utc>>,
    pub hourly: Vec<HourlyForecast>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HourlyForecast {
    pub time: DateTime<Utc>,
    /// hPa, at sea level
    pub air_pressure: f64,
    pub air_temperature: f64,
    /// %
    pub cloud_area_fraction: f64,
    /// %
    pub relative_humidity: f64,
    /// degrees
    pub wind_from_direction: f64,
    /// m/s
    pub wind_speed: f64,
    /// mm over the summary period
    pub precipitation_amount: f64,
    pub summary: Option<String>,
}

impl HourlyForecast {
    /// Friendlier wording for the condition code, falling back to the raw code.
    pub fn description(&self) -> &str {
        match self.summary.as_deref() {
            Some(code) => describe_condition(code).unwrap_or(code),
            None => "unknown",
        }
    }
}

/// Plain-English phrase for a MET Norway symbol code.
pub fn describe_condition(code: &str) -> Option<&'static str> {
    let phrase = match code {
        "rain" => "rain",
        "heavyrain" => "heavy rain",
        "lightrain" => "light rain",
        "cloudy" => "cloudy",
        "heavyrainshowers_day" | "heavyrainshowers_night" => "heavy rain showers",
        "rainshowers_day" | "rainshowers_night" => "rain showers",
        "lightrainshowers_day" | "lightrainshowers_night" => "light showers",
        "partlycloudy_day" | "partlycloudy_night" => "partly cloudy",
        "fair_day" | "fair_night" => "fair",
        "fog" => "fog",
        "clearsky_day" | "clearsky_night" => "clear sky",
        _ => return None,
    };
    Some(phrase)
}
