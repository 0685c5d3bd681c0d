use crate::{
    ClientOptions, Location,
    error::{MeteoError, Result},
    resolver::{postal::PostalResolver, wikipedia::WikipediaResolver},
};
use async_trait::async_trait;
use serde::Deserialize;
use std::{convert::TryFrom, fmt::Debug};

pub mod postal;
pub mod wikipedia;

/// GeoNames search used to turn a place name into coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResolverId {
    /// `postalCodeSearchJSON`, first result wins.
    Postal,
    /// `wikipediaSearchJSON`, first result whose title and country match exactly.
    Wikipedia,
}

impl ResolverId {
    pub fn as_str(&self) -> &'static str {
        match self {
            ResolverId::Postal => "postal",
            ResolverId::Wikipedia => "wikipedia",
        }
    }

    pub const fn all() -> &'static [ResolverId] {
        &[ResolverId::Postal, ResolverId::Wikipedia]
    }
}

impl std::fmt::Display for ResolverId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<&str> for ResolverId {
    type Error = MeteoError;

    fn try_from(value: &str) -> std::result::Result<Self, Self::Error> {
        match value.trim().to_lowercase().as_str() {
            "postal" => Ok(ResolverId::Postal),
            "wikipedia" => Ok(ResolverId::Wikipedia),
            _ => Err(MeteoError::Config(format!(
                "unknown resolver '{value}', supported resolvers: postal, wikipedia"
            ))),
        }
    }
}

/// Converts a place name and country code into coordinates.
#[async_trait]
pub trait Resolver: Send + Sync + Debug {
    async fn resolve(&self, place: &str, country: &str) -> Result<Location>;
}

/// GeoNames answers account and quota problems with `200 OK` and a
/// `{"status": {"message", "value"}}` body instead of the result list.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub(crate) enum GeoNamesResponse<T> {
    Failure { status: GeoNamesStatus },
    Success(T),
}

#[derive(Debug, Deserialize)]
pub(crate) struct GeoNamesStatus {
    message: String,
    value: u32,
}

impl<T> GeoNamesResponse<T> {
    pub(crate) fn into_result(self, operation: &'static str, input: &str) -> Result<T> {
        match self {
            Self::Success(body) => Ok(body),
            Self::Failure { status } => Err(MeteoError::Service {
                operation,
                input: input.to_string(),
                code: status.value,
                message: status.message,
            }),
        }
    }
}

/// Trimmed GeoNames username, or a config error when there is none.
pub(crate) fn require_username(username: &str) -> Result<&str> {
    let username = username.trim();
    if username.is_empty() {
        return Err(MeteoError::Config(
            "missing GeoNames username; pass --username, set GEONAMES_USER \
             or run `meteo configure`"
                .into(),
        ));
    }
    Ok(username)
}

/// Construct a resolver for `id` that authenticates as `username`.
pub fn build_resolver(
    id: ResolverId,
    username: &str,
    http: reqwest::Client,
    options: &ClientOptions,
) -> Result<Box<dyn Resolver>> {
    let username = require_username(username)?;

    let boxed: Box<dyn Resolver> = match id {
        ResolverId::Postal => Box::new(PostalResolver::new(
            username,
            http,
            &options.geonames_base_url,
        )),
        ResolverId::Wikipedia => Box::new(WikipediaResolver::new(
            username,
            http,
            &options.geonames_base_url,
            options.max_rows,
        )),
    };

    Ok(boxed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    #[test]
    fn resolver_id_as_str_roundtrip() {
        for id in ResolverId::all() {
            let parsed = ResolverId::try_from(id.as_str()).expect("roundtrip should succeed");
            assert_eq!(*id, parsed);
        }
        assert_eq!(
            ResolverId::try_from("Wikipedia").ok(),
            Some(ResolverId::Wikipedia)
        );
    }

    #[test]
    fn unknown_resolver_error() {
        let err = ResolverId::try_from("doesnotexist").unwrap_err();

        assert_eq!(err.kind(), ErrorKind::Config);
        assert!(err.to_string().contains("unknown resolver"));
    }

    #[test]
    fn build_resolver_errors_when_username_missing() {
        let options = ClientOptions::default();
        let err = build_resolver(ResolverId::Postal, "  ", reqwest::Client::new(), &options)
            .unwrap_err();

        assert_eq!(err.kind(), ErrorKind::Config);
        assert!(err.to_string().contains("missing GeoNames username"));
    }

    #[test]
    fn build_resolver_works_with_username() {
        let options = ClientOptions::default();
        for id in ResolverId::all() {
            assert!(build_resolver(*id, "DummyUser", reqwest::Client::new(), &options).is_ok());
        }
    }

    #[derive(Debug, Deserialize)]
    struct Names {
        names: Vec<String>,
    }

    #[test]
    fn geonames_status_body_becomes_service_error() {
        let body = r#"{"status":{"message":"invalid user","value":10}}"#;
        let parsed: GeoNamesResponse<Names> = serde_json::from_str(body).expect("status body");

        let err = parsed.into_result("resolving place", "Castlebar,IE").unwrap_err();

        assert_eq!(err.kind(), ErrorKind::Config);
        assert_eq!(
            err.to_string(),
            "resolving place for Castlebar,IE: service error 10: invalid user"
        );
    }

    #[test]
    fn geonames_result_body_passes_through() {
        let body = r#"{"names":["Castlebar"]}"#;
        let parsed: GeoNamesResponse<Names> = serde_json::from_str(body).expect("result body");

        let names = parsed.into_result("resolving place", "Castlebar,IE").unwrap();
        assert_eq!(names.names, vec!["Castlebar".to_string()]);
    }

    #[test]
    fn body_without_list_or_status_does_not_decode() {
        assert!(serde_json::from_str::<GeoNamesResponse<Names>>(r#"{"other":1}"#).is_err());
    }
}
