//! Geocoding backend capability.
//!
//! The control depends on the backend only through [`Geocoder`], which
//! is injected at construction. [`w3w::Backend`] talks to the public
//! what3words REST API; tests supply their own implementations.

pub mod w3w;

use futures::future::BoxFuture;
use serde::{Deserialize, Serialize};

use crate::geo::Coordinate;

/// Request parameters as produced by [`crate::query::OptionSet::serialize`].
pub type Params = Vec<(&'static str, String)>;

/// A three-word address candidate returned by autosuggest.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Suggestion {
    pub words: String,
    pub nearest_place: String,
    pub country: String,
    #[serde(default)]
    pub rank: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub distance_to_focus_km: Option<f64>,
}

/// Outcome of resolving text as a three-word address.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Resolution {
    Found(Coordinate),
    NotFound,
}

/// Backend call errors.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum BackendError {
    #[error("transport error: {0}")]
    Transport(String),
    #[error("backend returned status {0}")]
    Status(u16),
    #[error("{code}: {message}")]
    Api { code: String, message: String },
    #[error("failed to decode response: {0}")]
    Decode(String),
}

/// A geocoding service that can suggest and resolve three-word addresses.
pub trait Geocoder: Send + Sync + 'static {
    /// Suggest addresses for partial `input`, constrained by `params`.
    /// Results are in backend rank order.
    fn autosuggest(
        &self,
        input: String,
        params: Params,
    ) -> BoxFuture<'_, Result<Vec<Suggestion>, BackendError>>;

    /// Resolve complete `words` to a location.
    fn convert_to_coordinates(&self, words: String)
    -> BoxFuture<'_, Result<Resolution, BackendError>>;
}
