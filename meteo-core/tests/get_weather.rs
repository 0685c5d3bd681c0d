//! End-to-end tests for the resolve-then-fetch pipeline against mock servers.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use meteo_core::{
    Client, ClientOptions, ErrorKind, Location, MetClient, MeteoError, Resolver, ResolverId,
    Weather,
};
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

const COMPACT: &str = include_str!("testdata/response-compact.json");
const POSTAL: &str = include_str!("testdata/postal-castlebar.json");
const FORECAST_PATH: &str = "/weatherapi/locationforecast/2.0/compact";

/// Resolver that answers from memory and counts calls.
#[derive(Debug, Default)]
struct FixedResolver {
    calls: Arc<AtomicUsize>,
    fail: bool,
}

#[async_trait]
impl Resolver for FixedResolver {
    async fn resolve(&self, place: &str, country: &str) -> meteo_core::Result<Location> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.fail {
            return Err(MeteoError::place_not_found(place, country));
        }
        assert_eq!((place, country), ("Castlebar", "IE"));
        Ok(Location::new(53.86, -9.30))
    }
}

fn options(server: &MockServer) -> ClientOptions {
    ClientOptions {
        geonames_base_url: server.uri(),
        met_base_url: server.uri(),
        ..Default::default()
    }
}

fn met_client(server: &MockServer) -> MetClient {
    let http = options(server).http_client().expect("http client");
    MetClient::new(http, &server.uri())
}

async fn mount_forecast(server: &MockServer, expected_calls: u64) {
    Mock::given(method("GET"))
        .and(path(FORECAST_PATH))
        .and(query_param("lat", "53.86"))
        .and(query_param("lon", "-9.30"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(COMPACT, "application/json"))
        .expect(expected_calls)
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_get_weather_with_mock_resolver() {
    let mock_server = MockServer::start().await;
    mount_forecast(&mock_server, 1).await;

    let resolver = FixedResolver::default();
    let calls = resolver.calls.clone();
    let client = Client::new(met_client(&mock_server)).with_resolver(Box::new(resolver));

    let weather = client.get_weather("Castlebar,IE").await.unwrap();

    assert_eq!(
        weather,
        Weather {
            summary: "rain".into(),
            temp: 13.7,
        }
    );
    assert_eq!(weather.to_string(), "Rain 13.7°C");
    assert_eq!(calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_get_weather_through_postal_resolver() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/postalCodeSearchJSON"))
        .and(query_param("placename", "Castlebar"))
        .and(query_param("country", "IE"))
        .and(query_param("username", "DummyUser"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(POSTAL, "application/json"))
        .expect(1)
        .mount(&mock_server)
        .await;
    // resolver answers 53.8608,-9.2988; the forecast request rounds it
    mount_forecast(&mock_server, 1).await;

    let client =
        Client::from_options(&options(&mock_server), ResolverId::Postal, Some("DummyUser"))
            .expect("client");

    let weather = client.get_weather("Castlebar,IE").await.unwrap();

    assert_eq!(weather.to_string(), "Rain 13.7°C");
}

#[tokio::test]
async fn test_resolver_failure_skips_forecast() {
    let mock_server = MockServer::start().await;
    mount_forecast(&mock_server, 0).await;

    let resolver = FixedResolver {
        fail: true,
        ..Default::default()
    };
    let client = Client::new(met_client(&mock_server)).with_resolver(Box::new(resolver));

    let err = client.get_weather("Atlantis,GR").await.unwrap_err();

    assert_eq!(err.kind(), ErrorKind::NotFound);
    assert_eq!(err.to_string(), "place Atlantis in country GR not found");
}

#[tokio::test]
async fn test_parse_error_makes_no_requests() {
    let mock_server = MockServer::start().await;
    mount_forecast(&mock_server, 0).await;

    let resolver = FixedResolver::default();
    let calls = resolver.calls.clone();
    let client = Client::new(met_client(&mock_server)).with_resolver(Box::new(resolver));

    let err = client.get_weather("Castlebar").await.unwrap_err();

    assert_eq!(err.kind(), ErrorKind::Parse);
    assert_eq!(calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_coordinates_skip_resolution() {
    let mock_server = MockServer::start().await;
    mount_forecast(&mock_server, 1).await;

    let client = Client::new(met_client(&mock_server));

    let weather = client.get_weather_for_coordinates(53.8608, -9.2988).await.unwrap();

    assert_eq!(
        weather,
        Weather {
            summary: "rain".into(),
            temp: 13.7,
        }
    );
}

#[tokio::test]
async fn test_forecast_status_error_propagates() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(FORECAST_PATH))
        .respond_with(ResponseTemplate::new(429).set_body_string("slow down"))
        .mount(&mock_server)
        .await;

    let client =
        Client::new(met_client(&mock_server)).with_resolver(Box::new(FixedResolver::default()));

    let err = client.get_weather("Castlebar,IE").await.unwrap_err();

    assert_eq!(err.kind(), ErrorKind::Transport);
    assert!(err.to_string().contains("slow down"));
}

#[tokio::test]
async fn test_get_forecast_lists_entries() {
    let mock_server = MockServer::start().await;
    mount_forecast(&mock_server, 1).await;

    let client =
        Client::new(met_client(&mock_server)).with_resolver(Box::new(FixedResolver::default()));

    let forecast = client.get_forecast("Castlebar,IE").await.unwrap();

    assert_eq!(forecast.hourly.len(), 3);
    assert_eq!(forecast.hourly[1].description(), "light rain");
}

#[tokio::test]
async fn test_timeout_is_transport_error() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(FORECAST_PATH))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_raw(COMPACT, "application/json")
                .set_delay(std::time::Duration::from_millis(500)),
        )
        .mount(&mock_server)
        .await;

    let opts = ClientOptions {
        timeout: std::time::Duration::from_millis(50),
        ..options(&mock_server)
    };
    let client = Client::from_options(&opts, ResolverId::Postal, None).expect("client");

    let err = client.get_weather_for_coordinates(53.86, -9.30).await.unwrap_err();

    assert_eq!(err.kind(), ErrorKind::Transport);
    assert!(err.is_timeout());
}
