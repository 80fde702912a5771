//! what3words v3 REST backend.
//!
//! Both calls are plain GETs with the API key in the query string. An
//! error body (`{"error": {"code", "message"}}`) takes precedence over
//! the HTTP status, so `BadWords` from convert-to-coordinates can be
//! reported as an unknown address rather than a failure.

use std::fmt::Write as _;
use std::time::Duration;

use futures::future::BoxFuture;
use isahc::prelude::*;
use isahc::HttpClient;
use serde::Deserialize;

use super::{BackendError, Geocoder, Params, Resolution, Suggestion};
use crate::geo::Coordinate;

/// Public what3words v3 API root.
pub const DEFAULT_ENDPOINT: &str = "https://api.what3words.com/v3";

const REQUEST_TIMEOUT: Duration = Duration::from_secs(15);

/// Error code returned by convert-to-coordinates for words that do not
/// name a square.
const BAD_WORDS: &str = "BadWords";

/// what3words REST backend.
#[derive(Clone)]
pub struct Backend {
    client: HttpClient,
    endpoint: String,
    api_key: String,
}

impl Backend {
    /// Build a client for the API rooted at `endpoint`, normally
    /// [`DEFAULT_ENDPOINT`] or a self-hosted what3words server.
    pub fn with_endpoint(api_key: String, endpoint: String) -> Result<Self, BackendError> {
        let client = HttpClient::builder()
            .timeout(REQUEST_TIMEOUT)
            .default_header("User-Agent", concat!("w3wsuggest/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| BackendError::Transport(e.to_string()))?;
        Ok(Self {
            client,
            endpoint: endpoint.trim_end_matches('/').to_string(),
            api_key,
        })
    }

    async fn get(&self, path: &str, query: &[(&str, &str)]) -> Result<(u16, String), BackendError> {
        let mut url = format!("{}/{path}?key={}", self.endpoint, percent_encode(&self.api_key));
        for (name, value) in query {
            let _ = write!(url, "&{name}={}", percent_encode(value));
        }

        tracing::debug!(path, params = query.len(), "backend request");
        let mut response = self
            .client
            .get_async(url)
            .await
            .map_err(|e| BackendError::Transport(e.to_string()))?;
        let status = response.status().as_u16();
        let body = response
            .text()
            .await
            .map_err(|e| BackendError::Transport(e.to_string()))?;
        Ok((status, body))
    }
}

impl Geocoder for Backend {
    fn autosuggest(
        &self,
        input: String,
        params: Params,
    ) -> BoxFuture<'_, Result<Vec<Suggestion>, BackendError>> {
        Box::pin(async move {
            let mut query: Vec<(&str, &str)> = vec![("input", input.as_str())];
            query.extend(params.iter().map(|(name, value)| (*name, value.as_str())));
            let (status, body) = self.get("autosuggest", &query).await?;
            decode_suggestions(status, &body)
        })
    }

    fn convert_to_coordinates(
        &self,
        words: String,
    ) -> BoxFuture<'_, Result<Resolution, BackendError>> {
        Box::pin(async move {
            let (status, body) = self
                .get("convert-to-coordinates", &[("words", words.as_str())])
                .await?;
            decode_resolution(status, &body)
        })
    }
}

#[derive(Deserialize)]
struct AutosuggestResponse {
    #[serde(default)]
    suggestions: Vec<Suggestion>,
}

#[derive(Deserialize)]
struct ConvertResponse {
    coordinates: Option<WireCoordinates>,
}

#[derive(Deserialize)]
struct WireCoordinates {
    lat: f64,
    lng: f64,
}

#[derive(Deserialize)]
struct ErrorResponse {
    error: ApiError,
}

#[derive(Deserialize)]
struct ApiError {
    code: String,
    message: String,
}

/// Error body, if the response carries one.
fn api_error(body: &str) -> Option<ApiError> {
    serde_json::from_str::<ErrorResponse>(body)
        .ok()
        .map(|r| r.error)
}

fn decode_suggestions(status: u16, body: &str) -> Result<Vec<Suggestion>, BackendError> {
    if let Some(ApiError { code, message }) = api_error(body) {
        return Err(BackendError::Api { code, message });
    }
    if !(200..300).contains(&status) {
        return Err(BackendError::Status(status));
    }
    let response: AutosuggestResponse =
        serde_json::from_str(body).map_err(|e| BackendError::Decode(e.to_string()))?;
    Ok(response.suggestions)
}

fn decode_resolution(status: u16, body: &str) -> Result<Resolution, BackendError> {
    if let Some(ApiError { code, message }) = api_error(body) {
        if code == BAD_WORDS {
            return Ok(Resolution::NotFound);
        }
        return Err(BackendError::Api { code, message });
    }
    if !(200..300).contains(&status) {
        return Err(BackendError::Status(status));
    }
    let response: ConvertResponse =
        serde_json::from_str(body).map_err(|e| BackendError::Decode(e.to_string()))?;
    match response.coordinates {
        Some(WireCoordinates { lat, lng }) => Coordinate::new(lat, lng)
            .map(Resolution::Found)
            .map_err(|e| BackendError::Decode(e.to_string())),
        None => Ok(Resolution::NotFound),
    }
}

/// Percent-encode a string for use in a URL query parameter.
fn percent_encode(s: &str) -> String {
    let mut out = String::with_capacity(s.len() * 2);
    for byte in s.bytes() {
        match byte {
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'-' | b'_' | b'.' | b'~' => {
                out.push(byte as char);
            }
            _ => {
                let _ = write!(out, "%{byte:02X}");
            }
        }
    }
    out
}
