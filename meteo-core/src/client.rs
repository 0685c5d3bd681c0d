use tracing::{debug, instrument};

use crate::{
    config::{ClientOptions, Config},
    error::{MeteoError, Result},
    forecast::MetClient,
    model::{Forecast, Location, PlaceQuery, ResolvedPlace, Weather},
    resolver::{Resolver, ResolverId, build_resolver, postal::PostalResolver, require_username},
};

/// Resolves a `"<place>,<country-code>"` string and reports the weather there.
///
/// Each lookup is one resolver round trip followed by one forecast round trip.
/// Nothing is cached or retried.
#[derive(Debug)]
pub struct Client {
    resolver: Option<Box<dyn Resolver>>,
    fetcher: MetClient,
}

impl Client {
    /// A client that can only look up coordinates until a resolver is attached.
    pub fn new(fetcher: MetClient) -> Self {
        Self {
            resolver: None,
            fetcher,
        }
    }

    pub fn with_resolver(mut self, resolver: Box<dyn Resolver>) -> Self {
        self.resolver = Some(resolver);
        self
    }

    /// Default options, resolving through `id` as GeoNames user `username`.
    pub fn with_username(id: ResolverId, username: &str) -> Result<Self> {
        Self::from_options(&ClientOptions::default(), id, Some(username))
    }

    pub fn from_options(
        options: &ClientOptions,
        id: ResolverId,
        username: Option<&str>,
    ) -> Result<Self> {
        let http = options.http_client()?;
        let client = Self::new(MetClient::new(http.clone(), &options.met_base_url));

        match username {
            Some(username) => {
                let resolver = build_resolver(id, username, http, options)?;
                Ok(client.with_resolver(resolver))
            }
            None => Ok(client),
        }
    }

    /// Build from persisted configuration. Without a username only
    /// [`Client::get_weather_for_coordinates`] will succeed.
    pub fn from_config(config: &Config) -> Result<Self> {
        Self::from_options(
            &config.client_options(),
            config.resolver_id()?,
            config.username(),
        )
    }

    pub async fn resolve(&self, location: &str) -> Result<Location> {
        let query: PlaceQuery = location.parse()?;
        let resolver = self.resolver.as_ref().ok_or_else(|| {
            MeteoError::Config(format!(
                "no place resolver configured, cannot resolve {query}; \
                 a GeoNames username is required"
            ))
        })?;

        resolver.resolve(&query.place_name, &query.country_code).await
    }

    /// Current weather for a `"<place>,<country-code>"` string such as `"Castlebar,IE"`.
    #[instrument(skip(self))]
    pub async fn get_weather(&self, location: &str) -> Result<Weather> {
        let loc = self.resolve(location).await?;
        debug!(lat = loc.latitude, lon = loc.longitude, "location resolved");
        self.fetcher.fetch(loc.latitude, loc.longitude).await
    }

    pub async fn get_weather_for_coordinates(&self, lat: f64, lon: f64) -> Result<Weather> {
        self.fetcher.fetch(lat, lon).await
    }

    #[instrument(skip(self))]
    pub async fn get_forecast(&self, location: &str) -> Result<Forecast> {
        let loc = self.resolve(location).await?;
        self.fetcher.forecast(loc.latitude, loc.longitude).await
    }
}

/// Current weather for `location` using default options and the postal code resolver.
pub async fn get_weather(location: &str, username: &str) -> Result<Weather> {
    Client::with_username(ResolverId::Postal, username)?
        .get_weather(location)
        .await
}

/// Coordinates and canonical name of `place` in `country` from the GeoNames
/// postal code search, using default options.
pub async fn lookup_place(place: &str, country: &str, username: &str) -> Result<ResolvedPlace> {
    let username = require_username(username)?;
    let options = ClientOptions::default();
    let http = options.http_client()?;
    let resolver = PostalResolver::new(username, http, &options.geonames_base_url);
    resolver.lookup(place, country).await
}
