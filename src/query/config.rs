//! Autosuggest control configuration.
//!
//! [`SuggestConfig`] holds every tunable as a named field. The option
//! set sent with each request is derived from it by a pure function,
//! so re-deriving after a change never leaves stale or duplicate
//! entries behind.

use std::time::Duration;

use crate::geo::{self, ParseError};

use super::{OptionSet, QueryOption};

/// Default number of suggestions requested.
pub const DEFAULT_RESULTS: u32 = 3;

/// Default number of results the focus point applies to.
pub const DEFAULT_FOCUS_RESULTS: u32 = 3;

/// Default quiet period before a query is sent.
pub const DEFAULT_DEBOUNCE: Duration = Duration::from_millis(200);

/// Configuration errors. Each wraps the parse error of the offending field.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid focus point: {0}")]
    Focus(#[source] ParseError),
    #[error("invalid bounding box clip: {0}")]
    BoundingBox(#[source] ParseError),
    #[error("invalid circle clip: {0}")]
    Circle(#[source] ParseError),
    #[error("invalid polygon clip: {0}")]
    Polygon(#[source] ParseError),
    #[error("result count must be at least 1")]
    ZeroResults,
}

/// Autosuggest control configuration.
///
/// String-valued fields use the same comma-separated formats as the
/// geometry parsers in [`crate::geo`].
#[derive(Debug, Clone, PartialEq)]
pub struct SuggestConfig {
    /// Number of suggestions to return.
    pub n_results: u32,
    /// Number of results within `n_results` that the focus applies to.
    /// Only sent when `focus` is set; clamped to `n_results`.
    pub n_focus_results: u32,
    /// `"lat,lng"` point to focus results on.
    pub focus: Option<String>,
    /// Comma-separated country codes.
    pub clip_to_country: Option<String>,
    /// `"south_lat,west_lng,north_lat,east_lng"`.
    pub clip_to_bounding_box: Option<String>,
    /// `"lat,lng,km"`.
    pub clip_to_circle: Option<String>,
    /// `"lat,lng,lat,lng,..."`.
    pub clip_to_polygon: Option<String>,
    /// Language code for returned words.
    pub language: Option<String>,
    /// Quiet period before a query is sent.
    pub debounce: Duration,
    /// Treat backend errors as fatal to the control.
    pub debug: bool,
    /// Dismiss the list once a suggestion is picked.
    pub hide_on_select: bool,
}

impl Default for SuggestConfig {
    fn default() -> Self {
        Self {
            n_results: DEFAULT_RESULTS,
            n_focus_results: DEFAULT_FOCUS_RESULTS,
            focus: None,
            clip_to_country: None,
            clip_to_bounding_box: None,
            clip_to_circle: None,
            clip_to_polygon: None,
            language: None,
            debounce: DEFAULT_DEBOUNCE,
            debug: false,
            hide_on_select: true,
        }
    }
}

impl SuggestConfig {
    /// Derive the ordered option set for this configuration.
    ///
    /// Order: result count, focus, focus result count, country filter,
    /// bounding box, circle, polygon, language. Blank string fields are
    /// treated as unset.
    pub fn options(&self) -> Result<OptionSet, ConfigError> {
        if self.n_results == 0 {
            return Err(ConfigError::ZeroResults);
        }

        let mut set = OptionSet::new();
        set.push(QueryOption::ResultCount(self.n_results));

        if let Some(focus) = non_blank(&self.focus) {
            let point = geo::parse_coordinate(focus).map_err(ConfigError::Focus)?;
            set.push(QueryOption::FocusPoint(point));
            let n_focus = self.n_focus_results.min(self.n_results);
            if n_focus > 0 {
                set.push(QueryOption::FocusResultCount(n_focus));
            }
        }

        if let Some(countries) = non_blank(&self.clip_to_country) {
            let codes = country_codes(countries);
            if !codes.is_empty() {
                set.push(QueryOption::CountryFilter(codes));
            }
        }

        if let Some(raw) = non_blank(&self.clip_to_bounding_box) {
            let clip = geo::parse_bounding_box(raw).map_err(ConfigError::BoundingBox)?;
            set.push(QueryOption::Clip(clip));
        }
        if let Some(raw) = non_blank(&self.clip_to_circle) {
            let clip = geo::parse_circle(raw).map_err(ConfigError::Circle)?;
            set.push(QueryOption::Clip(clip));
        }
        if let Some(raw) = non_blank(&self.clip_to_polygon) {
            let clip = geo::parse_polygon(raw).map_err(ConfigError::Polygon)?;
            set.push(QueryOption::Clip(clip));
        }

        if let Some(language) = non_blank(&self.language) {
            set.push(QueryOption::Language(language.to_ascii_lowercase()));
        }

        Ok(set)
    }
}

fn non_blank(field: &Option<String>) -> Option<&str> {
    field.as_deref().map(str::trim).filter(|s| !s.is_empty())
}

/// Split a comma-separated country list: trimmed, upper-cased, blanks
/// dropped, duplicates removed keeping the first occurrence.
fn country_codes(raw: &str) -> Vec<String> {
    let mut codes: Vec<String> = Vec::new();
    for code in raw.split(',').map(str::trim).filter(|c| !c.is_empty()) {
        let code = code.to_ascii_uppercase();
        if !codes.contains(&code) {
            codes.push(code);
        }
    }
    codes
}
