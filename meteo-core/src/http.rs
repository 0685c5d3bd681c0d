use reqwest::{Client, StatusCode, header::CONTENT_TYPE};
use serde::de::DeserializeOwned;
use tracing::{debug, warn};

use crate::error::{MeteoError, Result};

const MEDIA_TYPE: &str = "application/json";

/// GET `url` with `query` and decode a JSON body.
///
/// `input` names what is being looked up and ends up in every error.
/// Anything other than `200 OK` fails before the body is decoded.
pub(crate) async fn get_json<T: DeserializeOwned>(
    http: &Client,
    operation: &'static str,
    input: &str,
    url: &str,
    query: &[(&str, String)],
) -> Result<T> {
    debug!(operation, input, url, ?query, "sending request");

    let transport = |source: reqwest::Error| MeteoError::Transport {
        operation,
        input: input.to_string(),
        source,
    };

    let res = http
        .get(url)
        .header(CONTENT_TYPE, MEDIA_TYPE)
        .query(query)
        .send()
        .await
        .map_err(transport)?;

    let status = res.status();
    if status != StatusCode::OK {
        let body = res.text().await.unwrap_or_default();
        warn!(operation, input, %status, "upstream request failed");
        return Err(MeteoError::Status {
            operation,
            input: input.to_string(),
            status,
            body: truncate_body(&body),
        });
    }

    let body = res.text().await.map_err(transport)?;

    serde_json::from_str(&body).map_err(|source| MeteoError::Decode {
        operation,
        input: input.to_string(),
        source,
    })
}

/// Join a base URL and a path without doubling the slash.
pub(crate) fn endpoint(base_url: &str, path: &str) -> String {
    format!(
        "{}/{}",
        base_url.trim_end_matches('/'),
        path.trim_start_matches('/')
    )
}

fn truncate_body(body: &str) -> String {
    const MAX: usize = 200;
    match body.char_indices().nth(MAX) {
        Some((idx, _)) => format!("{}...", &body[..idx]),
        None => body.to_string(),
    }
}
