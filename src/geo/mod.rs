//! Coordinates and clipping shapes parsed from user strings.
//!
//! Every parser reads a comma-separated list of decimal numbers as
//! `(lat, lng)` pairs in order. Parsing is strict: a token that is not
//! a finite number fails the whole input instead of being read as zero,
//! and a point count that does not match the shape's arity fails rather
//! than being truncated.

pub mod address;

use std::fmt;

/// Maximum number of coordinate pairs in a polygon clip, counted as the
/// closed ring that is sent.
pub const POLYGON_LIMIT: usize = 25;

/// Number of coordinate pairs in a bounding box (south-west, north-east).
pub const BOUNDING_BOX_PAIRS: usize = 2;

/// Number of coordinate pairs in a circle (its centre).
pub const CIRCLE_PAIRS: usize = 1;

/// Geometry parse errors.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ParseError {
    #[error("empty input")]
    Empty,
    #[error("malformed input: {0}")]
    Malformed(&'static str),
    #[error("{shape} accepts {limit} coordinate pair(s), found {found}")]
    LimitExceeded {
        shape: &'static str,
        limit: usize,
        found: usize,
    },
    #[error("not a number: {0:?}")]
    InvalidNumber(String),
    #[error("coordinate out of range: {latitude},{longitude}")]
    OutOfRange { latitude: f64, longitude: f64 },
    #[error("radius must be positive, got {0}")]
    InvalidRadius(f64),
}

/// A WGS84 point. Latitude in [-90, 90], longitude in [-180, 180].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Coordinate {
    pub latitude: f64,
    pub longitude: f64,
}

impl Coordinate {
    /// Build a coordinate, rejecting values outside the valid range.
    pub fn new(latitude: f64, longitude: f64) -> Result<Self, ParseError> {
        if !(-90.0..=90.0).contains(&latitude) || !(-180.0..=180.0).contains(&longitude) {
            return Err(ParseError::OutOfRange {
                latitude,
                longitude,
            });
        }
        Ok(Self {
            latitude,
            longitude,
        })
    }
}

impl fmt::Display for Coordinate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{},{}", self.latitude, self.longitude)
    }
}

/// A geometric constraint restricting which suggestions are returned.
#[derive(Debug, Clone, PartialEq)]
pub enum GeoClip {
    BoundingBox {
        south: f64,
        west: f64,
        north: f64,
        east: f64,
    },
    Circle {
        center: Coordinate,
        radius_km: f64,
    },
    Polygon {
        vertices: Vec<Coordinate>,
    },
}

/// Parse a single `"lat,lng"` pair.
pub fn parse_coordinate(input: &str) -> Result<Coordinate, ParseError> {
    let values = numbers(input)?;
    let points = pairs(&values)?;
    match points.as_slice() {
        [point] => Ok(*point),
        _ => Err(ParseError::LimitExceeded {
            shape: "coordinate",
            limit: 1,
            found: points.len(),
        }),
    }
}

/// Parse `"south_lat,west_lng,north_lat,east_lng"` into a bounding box.
pub fn parse_bounding_box(input: &str) -> Result<GeoClip, ParseError> {
    let values = numbers(input)?;
    let points = pairs(&values)?;
    if points.len() != BOUNDING_BOX_PAIRS {
        return Err(ParseError::LimitExceeded {
            shape: "bounding box",
            limit: BOUNDING_BOX_PAIRS,
            found: points.len(),
        });
    }
    let (south_west, north_east) = (points[0], points[1]);
    Ok(GeoClip::BoundingBox {
        south: south_west.latitude,
        west: south_west.longitude,
        north: north_east.latitude,
        east: north_east.longitude,
    })
}

/// Parse `"lat,lng,km"` into a circle. The trailing unpaired value is
/// the radius in kilometres.
pub fn parse_circle(input: &str) -> Result<GeoClip, ParseError> {
    let values = numbers(input)?;
    let (&radius_km, coords) = values.split_last().ok_or(ParseError::Empty)?;
    if coords.is_empty() {
        return Err(ParseError::Malformed("circle needs a centre and a radius"));
    }
    let points = pairs(coords)?;
    if points.len() != CIRCLE_PAIRS {
        return Err(ParseError::LimitExceeded {
            shape: "circle",
            limit: CIRCLE_PAIRS,
            found: points.len(),
        });
    }
    if radius_km <= 0.0 {
        return Err(ParseError::InvalidRadius(radius_km));
    }
    Ok(GeoClip::Circle {
        center: points[0],
        radius_km,
    })
}

/// Parse `"lat,lng,lat,lng,..."` into a polygon of at least 3 vertices.
///
/// An open ring is closed when serialized, so the closing vertex counts
/// against [`POLYGON_LIMIT`]: 25 pairs pass only if the input already
/// repeats its first vertex at the end.
pub fn parse_polygon(input: &str) -> Result<GeoClip, ParseError> {
    let values = numbers(input)?;
    let vertices = pairs(&values)?;
    let ring = closed_ring_len(&vertices);
    if ring > POLYGON_LIMIT {
        return Err(ParseError::LimitExceeded {
            shape: "polygon",
            limit: POLYGON_LIMIT,
            found: ring,
        });
    }
    if vertices.len() < 3 {
        return Err(ParseError::Malformed("polygon needs at least 3 vertices"));
    }
    Ok(GeoClip::Polygon { vertices })
}

/// Number of vertices once the ring is closed.
fn closed_ring_len(vertices: &[Coordinate]) -> usize {
    match (vertices.first(), vertices.last()) {
        (Some(first), Some(last)) if vertices.len() > 1 && first != last => vertices.len() + 1,
        _ => vertices.len(),
    }
}

/// Split on commas and parse every token as a finite `f64`.
fn numbers(input: &str) -> Result<Vec<f64>, ParseError> {
    let input = input.trim();
    if input.is_empty() {
        return Err(ParseError::Empty);
    }
    input
        .split(',')
        .map(str::trim)
        .map(|token| match token.parse::<f64>() {
            Ok(v) if v.is_finite() => Ok(v),
            _ => Err(ParseError::InvalidNumber(token.to_string())),
        })
        .collect()
}

/// Pair consecutive values into coordinates.
fn pairs(values: &[f64]) -> Result<Vec<Coordinate>, ParseError> {
    if values.len() % 2 != 0 {
        return Err(ParseError::Malformed("odd number of coordinate values"));
    }
    values
        .chunks_exact(2)
        .map(|pair| Coordinate::new(pair[0], pair[1]))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn polygon_input(pairs: usize) -> String {
        (0..pairs)
            .map(|i| format!("{}.0,{}.5", i % 80, i % 170))
            .collect::<Vec<_>>()
            .join(",")
    }

    // -- Coordinates --

    #[test]
    fn coordinate_parses_with_whitespace() {
        let c = parse_coordinate(" 51.520847 , -0.195521 ").unwrap();
        assert_eq!(c.latitude, 51.520847);
        assert_eq!(c.longitude, -0.195521);
    }

    #[test]
    fn coordinate_out_of_range() {
        assert!(matches!(
            parse_coordinate("91,0"),
            Err(ParseError::OutOfRange { .. })
        ));
        assert!(matches!(
            parse_coordinate("0,180.5"),
            Err(ParseError::OutOfRange { .. })
        ));
    }

    #[test]
    fn coordinate_rejects_extra_pairs() {
        assert_eq!(
            parse_coordinate("1,2,3,4"),
            Err(ParseError::LimitExceeded {
                shape: "coordinate",
                limit: 1,
                found: 2
            })
        );
    }

    #[test]
    fn coordinate_display_is_lat_lng() {
        let c = Coordinate::new(51.5, -0.1).unwrap();
        assert_eq!(c.to_string(), "51.5,-0.1");
    }

    // -- Bounding box --

    #[test]
    fn bounding_box_success() {
        assert_eq!(
            parse_bounding_box("1.0,2.0,3.0,4.0").unwrap(),
            GeoClip::BoundingBox {
                south: 1.0,
                west: 2.0,
                north: 3.0,
                east: 4.0
            }
        );
    }

    #[test]
    fn bounding_box_wrong_pair_count() {
        assert!(matches!(
            parse_bounding_box("1,2"),
            Err(ParseError::LimitExceeded { found: 1, .. })
        ));
        assert!(matches!(
            parse_bounding_box("1,2,3,4,5,6"),
            Err(ParseError::LimitExceeded { found: 3, .. })
        ));
    }

    #[test]
    fn bounding_box_odd_tokens() {
        assert!(matches!(
            parse_bounding_box("1,2,3"),
            Err(ParseError::Malformed(_))
        ));
    }

    // -- Circle --

    #[test]
    fn circle_success() {
        assert_eq!(
            parse_circle("51.5,-0.1,5").unwrap(),
            GeoClip::Circle {
                center: Coordinate {
                    latitude: 51.5,
                    longitude: -0.1
                },
                radius_km: 5.0
            }
        );
    }

    #[test]
    fn circle_without_radius_is_malformed() {
        assert!(matches!(
            parse_circle("51.5,-0.1"),
            Err(ParseError::Malformed(_))
        ));
        assert!(matches!(parse_circle("5"), Err(ParseError::Malformed(_))));
    }

    #[test]
    fn circle_with_two_centres() {
        assert!(matches!(
            parse_circle("1,2,3,4,10"),
            Err(ParseError::LimitExceeded {
                shape: "circle",
                ..
            })
        ));
    }

    #[test]
    fn circle_rejects_non_positive_radius() {
        assert_eq!(
            parse_circle("51.5,-0.1,0"),
            Err(ParseError::InvalidRadius(0.0))
        );
    }

    // -- Polygon --

    #[test]
    fn polygon_three_vertices() {
        match parse_polygon("0,0,0,1,1,1").unwrap() {
            GeoClip::Polygon { vertices } => {
                assert_eq!(vertices.len(), 3);
                assert_eq!(vertices[1], Coordinate::new(0.0, 1.0).unwrap());
            }
            other => panic!("expected polygon, got {other:?}"),
        }
    }

    #[test]
    fn open_polygon_at_limit() {
        // 24 pairs plus the closing vertex.
        assert!(parse_polygon(&polygon_input(24)).is_ok());
    }

    #[test]
    fn closed_polygon_at_limit() {
        let input = format!("{},0.0,0.5", polygon_input(24));
        match parse_polygon(&input).unwrap() {
            GeoClip::Polygon { vertices } => assert_eq!(vertices.len(), 25),
            other => panic!("expected polygon, got {other:?}"),
        }
    }

    #[test]
    fn open_polygon_counts_closing_vertex() {
        assert_eq!(
            parse_polygon(&polygon_input(25)),
            Err(ParseError::LimitExceeded {
                shape: "polygon",
                limit: 25,
                found: 26
            })
        );
    }

    #[test]
    fn polygon_over_limit() {
        assert_eq!(
            parse_polygon(&polygon_input(26)),
            Err(ParseError::LimitExceeded {
                shape: "polygon",
                limit: 25,
                found: 27
            })
        );
    }

    #[test]
    fn polygon_too_few_vertices() {
        assert!(matches!(
            parse_polygon("0,0,1,1"),
            Err(ParseError::Malformed(_))
        ));
    }

    // -- Shared token rules --

    #[test]
    fn empty_input_for_every_shape() {
        assert_eq!(parse_bounding_box(""), Err(ParseError::Empty));
        assert_eq!(parse_circle("   "), Err(ParseError::Empty));
        assert_eq!(parse_polygon(""), Err(ParseError::Empty));
        assert_eq!(parse_coordinate(""), Err(ParseError::Empty));
    }

    #[test]
    fn non_numeric_token_is_rejected() {
        assert_eq!(
            parse_bounding_box("1.0,abc,3.0,4.0"),
            Err(ParseError::InvalidNumber("abc".into()))
        );
        assert_eq!(
            parse_polygon("0,0,,1,1,1"),
            Err(ParseError::InvalidNumber("".into()))
        );
    }

    #[test]
    fn non_finite_token_is_rejected() {
        assert_eq!(
            parse_circle("1,2,inf"),
            Err(ParseError::InvalidNumber("inf".into()))
        );
        assert!(matches!(
            parse_coordinate("NaN,0"),
            Err(ParseError::InvalidNumber(_))
        ));
    }
}
