//! Error types shared by the resolver, the fetcher and the client.

use reqwest::StatusCode;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, MeteoError>;

/// GeoNames reports authorization failures with this status value.
const GEONAMES_AUTHORIZATION_EXCEPTION: u32 = 10;

/// Coarse classification of a [`MeteoError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    Config,
    Parse,
    NotFound,
    Transport,
    Decode,
}

#[derive(Error, Debug)]
pub enum MeteoError {
    #[error("configuration error: {0}")]
    Config(String),

    #[error(
        "parsing place and country from location {input:?}: \
         expected \"<place>,<country-code>\""
    )]
    Parse { input: String },

    #[error("{0}")]
    NotFound(String),

    #[error("{operation} for {input}: sending request: {source}")]
    Transport {
        operation: &'static str,
        input: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("{operation} for {input}: got response code {status}: {body}")]
    Status {
        operation: &'static str,
        input: String,
        status: StatusCode,
        body: String,
    },

    /// The service answered `200 OK` but reported a failure in the body.
    #[error("{operation} for {input}: service error {code}: {message}")]
    Service {
        operation: &'static str,
        input: String,
        code: u32,
        message: String,
    },

    #[error("{operation} for {input}: decoding response body: {source}")]
    Decode {
        operation: &'static str,
        input: String,
        #[source]
        source: serde_json::Error,
    },
}

impl MeteoError {
    pub fn place_not_found(place: &str, country: &str) -> Self {
        Self::NotFound(format!("place {place} in country {country} not found"))
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Config(_) => ErrorKind::Config,
            Self::Parse { .. } => ErrorKind::Parse,
            Self::NotFound(_) => ErrorKind::NotFound,
            Self::Service { code, .. } if *code == GEONAMES_AUTHORIZATION_EXCEPTION => {
                ErrorKind::Config
            }
            Self::Transport { .. } | Self::Status { .. } | Self::Service { .. } => {
                ErrorKind::Transport
            }
            Self::Decode { .. } => ErrorKind::Decode,
        }
    }

    /// Whether the request was aborted by the client timeout.
    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::Transport { source, .. } if source.is_timeout())
    }

    /// HTTP status returned by the upstream service, if that is what failed.
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            Self::Status { status, .. } => Some(*status),
            _ => None,
        }
    }
}
