#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Monitoring station, sensor and reading types.
//!
//! These types describe air-quality monitoring stations as reported by an
//! upstream station directory, the raw readings their sensors produce, and
//! the resolved result handed to API callers. Nothing here is persisted;
//! every value is built fresh per request.

use std::collections::BTreeMap;

use chrono::{DateTime, FixedOffset, Utc};
use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumString};

/// A WGS84 coordinate with validated latitude and longitude.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Coordinate {
    latitude: f64,
    longitude: f64,
}

impl Coordinate {
    /// Creates a coordinate, rejecting non-finite or out-of-range values.
    ///
    /// # Errors
    ///
    /// Returns [`InvalidCoordinateError`] if latitude is outside
    /// `[-90, 90]` or longitude is outside `[-180, 180]`.
    pub fn new(latitude: f64, longitude: f64) -> Result<Self, InvalidCoordinateError> {
        if !latitude.is_finite() || !(-90.0..=90.0).contains(&latitude) {
            return Err(InvalidCoordinateError::Latitude(latitude));
        }
        if !longitude.is_finite() || !(-180.0..=180.0).contains(&longitude) {
            return Err(InvalidCoordinateError::Longitude(longitude));
        }
        Ok(Self {
            latitude,
            longitude,
        })
    }

    /// Latitude in degrees.
    #[must_use]
    pub const fn latitude(&self) -> f64 {
        self.latitude
    }

    /// Longitude in degrees.
    #[must_use]
    pub const fn longitude(&self) -> f64 {
        self.longitude
    }
}

/// Error returned when a [`Coordinate`] component is out of range.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum InvalidCoordinateError {
    /// Latitude outside `[-90, 90]` or not finite.
    Latitude(f64),
    /// Longitude outside `[-180, 180]` or not finite.
    Longitude(f64),
}

impl std::fmt::Display for InvalidCoordinateError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Latitude(v) => write!(f, "invalid latitude {v}: expected -90 to 90"),
            Self::Longitude(v) => write!(f, "invalid longitude {v}: expected -180 to 180"),
        }
    }
}

impl std::error::Error for InvalidCoordinateError {}

/// Pollutant vocabulary that upstream sensor labels are normalized into.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Pollutant {
    /// Fine particulate matter (2.5 µm).
    Pm25,
    /// Coarse particulate matter (10 µm).
    Pm10,
    /// Ozone.
    O3,
    /// Nitrogen dioxide.
    No2,
    /// Sulfur dioxide.
    So2,
    /// Carbon monoxide.
    Co,
    /// A sensor parameter outside the vocabulary. Never surfaced in results.
    Other,
}

impl Pollutant {
    /// Whether this pollutant belongs to the fixed vocabulary.
    #[must_use]
    pub const fn is_known(self) -> bool {
        !matches!(self, Self::Other)
    }
}

/// Upstream sensor identifier, unique within a station.
pub type SensorId = i64;

/// Describes one sensor on a station: what it measures and in which unit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SensorDescriptor {
    /// Sensor identifier used by the latest-readings endpoint.
    pub id: SensorId,
    /// Parameter name exactly as the upstream reported it (e.g. `"pm25"`).
    pub parameter: String,
    /// Unit exactly as the upstream reported it (e.g. `"µg/m³"`).
    pub unit: String,
}

/// A monitoring station as returned by the station directory.
#[derive(Debug, Clone, PartialEq)]
pub struct Station {
    /// Opaque upstream identifier.
    pub id: String,
    /// Display name.
    pub name: String,
    /// Station position.
    pub coordinate: Coordinate,
    /// Sensors installed at the station.
    pub sensors: Vec<SensorDescriptor>,
    /// Last observation as a UTC timestamp, if reported.
    pub last_observed_utc: Option<DateTime<Utc>>,
    /// Last observation as a local timestamp, if reported.
    pub last_observed_local: Option<DateTime<FixedOffset>>,
}

impl Station {
    /// The station's self-reported last observation time.
    ///
    /// Prefers the UTC field and falls back to the local one. Returns
    /// `None` when neither was reported.
    #[must_use]
    pub fn last_observed(&self) -> Option<DateTime<Utc>> {
        self.last_observed_utc
            .or_else(|| self.last_observed_local.map(|t| t.with_timezone(&Utc)))
    }
}

/// A single record from a station's latest-readings endpoint.
#[derive(Debug, Clone, PartialEq)]
pub struct RawReading {
    /// Sensor that produced the value.
    pub sensor_id: SensorId,
    /// Measured value; upstream may report `null`.
    pub value: Option<f64>,
    /// When the value was observed.
    pub observed_at: DateTime<Utc>,
}

/// A normalized pollutant reading.
#[derive(Debug, Clone, PartialEq)]
pub struct Reading {
    /// Normalized pollutant.
    pub pollutant: Pollutant,
    /// Value rounded to one decimal place.
    pub value: f64,
    /// Unit as reported by the sensor descriptor.
    pub unit: String,
    /// Observation time.
    pub observed_at: DateTime<Utc>,
}

/// Summary of the station a result was resolved from.
#[derive(Debug, Clone, PartialEq)]
pub struct StationSummary {
    /// Opaque upstream identifier.
    pub id: String,
    /// Display name.
    pub name: String,
    /// Distance from the requested coordinate in miles, one decimal place.
    pub distance_mi: f64,
    /// Station position.
    pub coordinate: Coordinate,
}

/// The air quality resolved for a requested coordinate.
///
/// Only built when PM2.5 or ozone is present and the governing reading is
/// fresh. When present, `aqi` is always derived from the PM2.5 reading.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedAirQuality {
    /// Station that supplied the readings.
    pub station: StationSummary,
    /// Latest reading per pollutant.
    pub readings: BTreeMap<Pollutant, Reading>,
    /// US EPA AQI computed from PM2.5, if PM2.5 was reported.
    pub aqi: Option<u16>,
    /// Observation time of the governing reading (PM2.5, else ozone).
    pub last_updated: DateTime<Utc>,
}

impl ResolvedAirQuality {
    /// EPA category for the computed AQI, if any.
    #[must_use]
    pub fn aqi_category(&self) -> Option<AqiCategory> {
        self.aqi.map(AqiCategory::from_aqi)
    }
}

/// US EPA AQI category.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum AqiCategory {
    /// 0-50
    Good,
    /// 51-100
    Moderate,
    /// 101-150
    UnhealthyForSensitiveGroups,
    /// 151-200
    Unhealthy,
    /// 201-300
    VeryUnhealthy,
    /// 301-500
    Hazardous,
}

impl AqiCategory {
    /// Classifies an AQI value. Values above 500 are `Hazardous`.
    #[must_use]
    pub const fn from_aqi(aqi: u16) -> Self {
        match aqi {
            0..=50 => Self::Good,
            51..=100 => Self::Moderate,
            101..=150 => Self::UnhealthyForSensitiveGroups,
            151..=200 => Self::Unhealthy,
            201..=300 => Self::VeryUnhealthy,
            _ => Self::Hazardous,
        }
    }

    /// Human-readable label.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Good => "Good",
            Self::Moderate => "Moderate",
            Self::UnhealthyForSensitiveGroups => "Unhealthy for Sensitive Groups",
            Self::Unhealthy => "Unhealthy",
            Self::VeryUnhealthy => "Very Unhealthy",
            Self::Hazardous => "Hazardous",
        }
    }

    /// EPA display color as a hex string.
    #[must_use]
    pub const fn color(self) -> &'static str {
        match self {
            Self::Good => "#00E400",
            Self::Moderate => "#FFFF00",
            Self::UnhealthyForSensitiveGroups => "#FF7E00",
            Self::Unhealthy => "#FF0000",
            Self::VeryUnhealthy => "#8F3F97",
            Self::Hazardous => "#7E0023",
        }
    }
}
