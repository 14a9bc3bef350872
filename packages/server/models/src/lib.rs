#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! API request and response types for the airwatch server.
//!
//! These types are serialized to JSON for the REST API. They are separate
//! from the monitoring types so the API contract can evolve independently
//! of the resolution logic.

use std::collections::BTreeMap;

use airwatch_monitoring_models::{AqiCategory, Pollutant, Reading, ResolvedAirQuality};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Query parameters for `GET /api/air-quality`.
///
/// Both values are kept as raw strings so the handler can tell a missing
/// parameter from a malformed one.
#[derive(Debug, Default, Deserialize)]
pub struct AirQualityQueryParams {
    /// Latitude in decimal degrees.
    pub lat: Option<String>,
    /// Longitude in decimal degrees.
    pub lon: Option<String>,
}

/// Air quality at the nearest active station.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiAirQuality {
    /// Station that supplied the readings.
    pub station: ApiStation,
    /// Latest reading per pollutant, keyed by pollutant name.
    pub readings: BTreeMap<Pollutant, ApiReading>,
    /// US EPA AQI from PM2.5. `null` when the station has no PM2.5 reading.
    pub aqi: Option<u16>,
    /// EPA category for `aqi`.
    pub aqi_category: Option<ApiAqiCategory>,
    /// Observation time of the governing reading.
    pub last_updated: DateTime<Utc>,
}

/// The station a result came from.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiStation {
    /// Upstream station identifier.
    pub id: String,
    /// Display name.
    pub name: String,
    /// Distance from the requested point in miles.
    pub distance_mi: f64,
    /// Latitude.
    pub latitude: f64,
    /// Longitude.
    pub longitude: f64,
}

/// A single pollutant reading.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiReading {
    /// Value rounded to one decimal place.
    pub value: f64,
    /// Unit as reported upstream.
    pub unit: String,
    /// Observation time.
    pub last_updated: DateTime<Utc>,
}

/// AQI category with its display label and color.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiAqiCategory {
    /// Category identifier (e.g. `MODERATE`).
    pub id: AqiCategory,
    /// Human-readable label.
    pub label: String,
    /// Hex display color.
    pub color: String,
}

/// Returned when no station within the largest radius had usable data.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiEmptyResult {
    /// Always empty.
    pub stations: Vec<ApiStation>,
}

/// Error response body.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiError {
    /// Human-readable message.
    pub error: String,
    /// HTTP status returned by the station directory, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub upstream_status: Option<u16>,
    /// Body returned by the station directory, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub upstream_body: Option<String>,
}

impl ApiError {
    /// An error with only a message.
    #[must_use]
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            upstream_status: None,
            upstream_body: None,
        }
    }
}

/// Health check response.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiHealth {
    /// Whether the server is healthy.
    pub healthy: bool,
    /// Server version.
    pub version: String,
    /// Whether an upstream API key is configured.
    pub configured: bool,
}

impl From<AqiCategory> for ApiAqiCategory {
    fn from(category: AqiCategory) -> Self {
        Self {
            id: category,
            label: category.label().to_string(),
            color: category.color().to_string(),
        }
    }
}

impl From<Reading> for ApiReading {
    fn from(reading: Reading) -> Self {
        Self {
            value: reading.value,
            unit: reading.unit,
            last_updated: reading.observed_at,
        }
    }
}

impl From<ResolvedAirQuality> for ApiAirQuality {
    fn from(resolved: ResolvedAirQuality) -> Self {
        let aqi_category = resolved.aqi_category().map(ApiAqiCategory::from);
        Self {
            station: ApiStation {
                id: resolved.station.id,
                name: resolved.station.name,
                distance_mi: resolved.station.distance_mi,
                latitude: resolved.station.coordinate.latitude(),
                longitude: resolved.station.coordinate.longitude(),
            },
            readings: resolved
                .readings
                .into_iter()
                .map(|(pollutant, reading)| (pollutant, reading.into()))
                .collect(),
            aqi: resolved.aqi,
            aqi_category,
            last_updated: resolved.last_updated,
        }
    }
}
