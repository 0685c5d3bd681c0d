//! Core library for the `meteo` CLI.
//!
//! This crate defines:
//! - Place name resolution through GeoNames (postal code and Wikipedia search)
//! - Current conditions from the MET Norway Locationforecast API
//! - Display formatting for the result, e.g. `"Rain 13.7°C"`
//! - Client options and the on-disk configuration
//!
//! It is used by `meteo-cli`, but can also be reused by other binaries or services.

pub mod client;
pub mod config;
pub mod error;
pub mod forecast;
mod http;
pub mod model;
pub mod resolver;

pub use client::{Client, get_weather, lookup_place};
pub use config::{ClientOptions, Config};
pub use error::{ErrorKind, MeteoError, Result};
pub use forecast::MetClient;
pub use model::{
    Forecast, ForecastSample, HourlyForecast, Location, PlaceQuery, ResolvedPlace, Weather,
    describe_condition,
};
pub use resolver::{
    Resolver, ResolverId, build_resolver, postal::PostalResolver, wikipedia::WikipediaResolver,
};
