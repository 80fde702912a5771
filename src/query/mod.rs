//! Autosuggest query options and their request parameter encoding.
//!
//! An [`OptionSet`] is a plain ordered accumulator. Validation happens
//! earlier, when [`config::SuggestConfig`] parses its string fields, so
//! serialization cannot fail.

pub mod config;

use std::fmt::Write as _;

use crate::geo::{Coordinate, GeoClip};

/// A single named constraint on an autosuggest request.
#[derive(Debug, Clone, PartialEq)]
pub enum QueryOption {
    /// Number of suggestions to return.
    ResultCount(u32),
    /// Point to bias results towards.
    FocusPoint(Coordinate),
    /// How many of the returned results the focus applies to.
    FocusResultCount(u32),
    /// ISO 3166-1 alpha-2 codes results are confined to.
    CountryFilter(Vec<String>),
    /// Geometric clip.
    Clip(GeoClip),
    /// Language code for the returned words.
    Language(String),
}

impl QueryOption {
    /// Backend parameter name for this option.
    pub fn param_name(&self) -> &'static str {
        match self {
            Self::ResultCount(_) => "n-results",
            Self::FocusPoint(_) => "focus",
            Self::FocusResultCount(_) => "n-focus-results",
            Self::CountryFilter(_) => "clip-to-country",
            Self::Clip(GeoClip::BoundingBox { .. }) => "clip-to-bounding-box",
            Self::Clip(GeoClip::Circle { .. }) => "clip-to-circle",
            Self::Clip(GeoClip::Polygon { .. }) => "clip-to-polygon",
            Self::Language(_) => "language",
        }
    }

    /// Backend parameter value for this option.
    pub fn param_value(&self) -> String {
        match self {
            Self::ResultCount(n) | Self::FocusResultCount(n) => n.to_string(),
            Self::FocusPoint(point) => point.to_string(),
            Self::CountryFilter(codes) => codes.join(","),
            Self::Clip(clip) => clip_value(clip),
            Self::Language(code) => code.clone(),
        }
    }
}

/// Encode a clip as the comma-separated value the backend expects.
///
/// Polygons are sent as closed rings: the first vertex is repeated at
/// the end unless the input already closed the ring.
fn clip_value(clip: &GeoClip) -> String {
    match clip {
        GeoClip::BoundingBox {
            south,
            west,
            north,
            east,
        } => format!("{south},{west},{north},{east}"),
        GeoClip::Circle { center, radius_km } => format!("{center},{radius_km}"),
        GeoClip::Polygon { vertices } => {
            let mut out = String::new();
            for vertex in vertices {
                if !out.is_empty() {
                    out.push(',');
                }
                let _ = write!(out, "{vertex}");
            }
            if let (Some(first), Some(last)) = (vertices.first(), vertices.last()) {
                if first != last {
                    let _ = write!(out, ",{first}");
                }
            }
            out
        }
    }
}

/// Ordered collection of query options.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct OptionSet {
    options: Vec<QueryOption>,
}

impl OptionSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an option. Insertion order is serialization order.
    pub fn push(&mut self, option: QueryOption) {
        self.options.push(option);
    }

    pub fn iter(&self) -> impl Iterator<Item = &QueryOption> {
        self.options.iter()
    }

    /// Serialize into `(name, value)` request parameters, in insertion order.
    pub fn serialize(&self) -> Vec<(&'static str, String)> {
        self.options
            .iter()
            .map(|option| (option.param_name(), option.param_value()))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn coord(latitude: f64, longitude: f64) -> Coordinate {
        Coordinate::new(latitude, longitude).unwrap()
    }

    #[test]
    fn empty_set_serializes_to_nothing() {
        assert!(OptionSet::new().serialize().is_empty());
    }

    #[test]
    fn serialize_preserves_insertion_order() {
        let mut set = OptionSet::new();
        set.push(QueryOption::CountryFilter(vec!["GB".into(), "FR".into()]));
        set.push(QueryOption::ResultCount(5));
        set.push(QueryOption::FocusPoint(coord(51.5, -0.1)));
        set.push(QueryOption::FocusResultCount(2));
        set.push(QueryOption::Language("en".into()));

        assert_eq!(
            set.serialize(),
            vec![
                ("clip-to-country", "GB,FR".to_string()),
                ("n-results", "5".to_string()),
                ("focus", "51.5,-0.1".to_string()),
                ("n-focus-results", "2".to_string()),
                ("language", "en".to_string()),
            ]
        );
    }

    #[test]
    fn bounding_box_value() {
        let option = QueryOption::Clip(GeoClip::BoundingBox {
            south: 51.0,
            west: -0.5,
            north: 52.0,
            east: 0.25,
        });
        assert_eq!(option.param_name(), "clip-to-bounding-box");
        assert_eq!(option.param_value(), "51,-0.5,52,0.25");
    }

    #[test]
    fn circle_value() {
        let option = QueryOption::Clip(GeoClip::Circle {
            center: coord(51.5, -0.1),
            radius_km: 5.0,
        });
        assert_eq!(option.param_name(), "clip-to-circle");
        assert_eq!(option.param_value(), "51.5,-0.1,5");
    }

    #[test]
    fn open_polygon_is_closed_on_serialize() {
        let option = QueryOption::Clip(GeoClip::Polygon {
            vertices: vec![coord(0.0, 0.0), coord(0.0, 1.0), coord(1.0, 1.0)],
        });
        assert_eq!(option.param_name(), "clip-to-polygon");
        assert_eq!(option.param_value(), "0,0,0,1,1,1,0,0");
    }

    #[test]
    fn closed_polygon_is_not_closed_twice() {
        let option = QueryOption::Clip(GeoClip::Polygon {
            vertices: vec![
                coord(0.0, 0.0),
                coord(0.0, 1.0),
                coord(1.0, 1.0),
                coord(0.0, 0.0),
            ],
        });
        assert_eq!(option.param_value(), "0,0,0,1,1,1,0,0");
    }

    #[test]
    fn largest_open_polygon_serializes_within_limit() {
        let input = (0..24)
            .map(|i| format!("{i}.0,{i}.5"))
            .collect::<Vec<_>>()
            .join(",");
        let clip = crate::geo::parse_polygon(&input).unwrap();
        let value = QueryOption::Clip(clip).param_value();
        assert_eq!(value.split(',').count() / 2, crate::geo::POLYGON_LIMIT);
        assert!(value.ends_with(",0,0.5"));
    }
}
