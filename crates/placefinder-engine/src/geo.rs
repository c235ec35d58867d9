//! Coordinates and great-circle distance.

use placefinder_core::Language;
use serde::{Deserialize, Serialize};

use crate::error::LocationError;

/// Mean Earth radius used by the haversine formula.
pub const EARTH_RADIUS_KM: f64 = 6371.0;

/// A validated WGS-84 point, rounded to six decimal places (about 11 cm).
///
/// Construction is the only validation point: a `Coordinate` that exists is
/// finite and in range.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawCoordinate")]
pub struct Coordinate {
    lat: f64,
    lng: f64,
}

impl Coordinate {
    /// # Errors
    ///
    /// Returns [`LocationError::InvalidCoordinate`] for non-finite values or
    /// values outside `[-90, 90]` / `[-180, 180]`.
    pub fn new(lat: f64, lng: f64) -> Result<Self, LocationError> {
        check_axis("latitude", lat, 90.0)?;
        check_axis("longitude", lng, 180.0)?;
        Ok(Self {
            lat: round6(lat),
            lng: round6(lng),
        })
    }

    /// Parses textual degrees as they arrive from query strings or CLI flags.
    ///
    /// # Errors
    ///
    /// Returns [`LocationError::InvalidCoordinate`] when either part is not a
    /// number or is out of range.
    pub fn parse(lat: &str, lng: &str) -> Result<Self, LocationError> {
        let lat = parse_axis("latitude", lat)?;
        let lng = parse_axis("longitude", lng)?;
        Self::new(lat, lng)
    }

    #[must_use]
    pub fn lat(self) -> f64 {
        self.lat
    }

    #[must_use]
    pub fn lng(self) -> f64 {
        self.lng
    }
}

impl std::fmt::Display for Coordinate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:.6},{:.6}", self.lat, self.lng)
    }
}

fn round6(value: f64) -> f64 {
    (value * 1e6).round() / 1e6
}

fn check_axis(axis: &str, value: f64, bound: f64) -> Result<(), LocationError> {
    if !value.is_finite() {
        return Err(LocationError::InvalidCoordinate {
            reason: format!("{axis} must be a finite number"),
        });
    }
    if !(-bound..=bound).contains(&value) {
        return Err(LocationError::InvalidCoordinate {
            reason: format!("{axis} {value} is outside [-{bound}, {bound}]"),
        });
    }
    Ok(())
}

fn parse_axis(axis: &str, raw: &str) -> Result<f64, LocationError> {
    raw.trim()
        .parse::<f64>()
        .map_err(|_| LocationError::InvalidCoordinate {
            reason: format!("{axis} '{raw}' is not a number"),
        })
}

/// Wire shape accepted on input: numbers or numeric strings, with the long
/// field names as aliases.
#[derive(Deserialize)]
struct RawCoordinate {
    #[serde(alias = "latitude")]
    lat: NumberOrText,
    #[serde(alias = "longitude")]
    lng: NumberOrText,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum NumberOrText {
    Number(f64),
    Text(String),
}

impl NumberOrText {
    fn into_degrees(self, axis: &str) -> Result<f64, LocationError> {
        match self {
            NumberOrText::Number(value) => Ok(value),
            NumberOrText::Text(raw) => parse_axis(axis, &raw),
        }
    }
}

impl TryFrom<RawCoordinate> for Coordinate {
    type Error = LocationError;

    fn try_from(raw: RawCoordinate) -> Result<Self, Self::Error> {
        let lat = raw.lat.into_degrees("latitude")?;
        let lng = raw.lng.into_degrees("longitude")?;
        Coordinate::new(lat, lng)
    }
}

/// Haversine distance in kilometres, rounded to three decimals (metres).
#[must_use]
pub fn distance_km(a: Coordinate, b: Coordinate) -> f64 {
    haversine_km(a.lat, a.lng, b.lat, b.lng)
}

pub(crate) fn haversine_km(lat1: f64, lng1: f64, lat2: f64, lng2: f64) -> f64 {
    let d_lat = (lat2 - lat1).to_radians();
    let d_lng = (lng2 - lng1).to_radians();
    let h = (d_lat / 2.0).sin().powi(2)
        + lat1.to_radians().cos() * lat2.to_radians().cos() * (d_lng / 2.0).sin().powi(2);
    let c = 2.0 * h.sqrt().atan2((1.0 - h).sqrt());
    (EARTH_RADIUS_KM * c * 1000.0).round() / 1000.0
}

/// Human-readable distance label.
///
/// Under 100 m reads as "very close"; under 1 km as whole metres; under
/// 10 km with one decimal; beyond that as whole kilometres.
#[must_use]
#[allow(clippy::cast_possible_truncation)]
pub fn format_distance(km: f64, language: Language) -> String {
    if !km.is_finite() || km < 0.0 {
        return match language {
            Language::Es => "distancia no disponible".to_string(),
            Language::En => "distance unavailable".to_string(),
        };
    }
    if km < 0.1 {
        return match language {
            Language::Es => "muy cerca".to_string(),
            Language::En => "very close".to_string(),
        };
    }
    if km < 1.0 {
        return format!("{}m", (km * 1000.0).round() as i64);
    }
    if km < 10.0 {
        return format!("{km:.1}km");
    }
    format!("{}km", km.round() as i64)
}
