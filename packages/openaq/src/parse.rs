//! `OpenAQ` v3 response parsing.
//!
//! Converts `/locations` and `/locations/{id}/latest` response bodies into
//! monitoring model types. Locations without usable coordinates and
//! readings without a parseable timestamp are skipped.

use airwatch_monitoring_models::{Coordinate, RawReading, SensorDescriptor, Station};
use chrono::{DateTime, FixedOffset, Utc};
use serde::Deserialize;

use crate::OpenAqError;

#[derive(Debug, Deserialize)]
struct ResultsEnvelope<T> {
    #[serde(default = "Vec::new")]
    results: Vec<T>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ApiLocation {
    id: i64,
    name: Option<String>,
    coordinates: Option<ApiCoordinates>,
    #[serde(default)]
    sensors: Vec<ApiSensor>,
    datetime_last: Option<ApiDatetime>,
}

#[derive(Debug, Deserialize)]
struct ApiCoordinates {
    latitude: Option<f64>,
    longitude: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct ApiSensor {
    id: i64,
    parameter: ApiParameter,
}

#[derive(Debug, Deserialize)]
struct ApiParameter {
    name: String,
    #[serde(default)]
    units: String,
}

#[derive(Debug, Deserialize)]
struct ApiDatetime {
    utc: Option<String>,
    local: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ApiLatest {
    datetime: Option<ApiDatetime>,
    value: Option<f64>,
    sensors_id: i64,
}

/// Parses a `/locations` response body into stations.
///
/// # Errors
///
/// Returns [`OpenAqError::Json`] if the body is not a valid response.
pub fn parse_locations(body: &str) -> Result<Vec<Station>, OpenAqError> {
    let envelope: ResultsEnvelope<ApiLocation> = serde_json::from_str(body)?;
    Ok(envelope
        .results
        .into_iter()
        .filter_map(to_station)
        .collect())
}

/// Parses a `/locations/{id}/latest` response body into raw readings.
///
/// # Errors
///
/// Returns [`OpenAqError::Json`] if the body is not a valid response.
pub fn parse_latest(body: &str) -> Result<Vec<RawReading>, OpenAqError> {
    let envelope: ResultsEnvelope<ApiLatest> = serde_json::from_str(body)?;
    Ok(envelope
        .results
        .into_iter()
        .filter_map(|latest| {
            let observed_at = latest
                .datetime
                .as_ref()
                .and_then(|d| parse_utc(d.utc.as_deref()).or_else(|| local_as_utc(d)));
            let Some(observed_at) = observed_at else {
                log::debug!("Skipping sensor {} reading without timestamp", latest.sensors_id);
                return None;
            };
            Some(RawReading {
                sensor_id: latest.sensors_id,
                value: latest.value,
                observed_at,
            })
        })
        .collect())
}

fn to_station(location: ApiLocation) -> Option<Station> {
    let coordinate = location
        .coordinates
        .as_ref()
        .and_then(|c| Some((c.latitude?, c.longitude?)))
        .and_then(|(lat, lon)| Coordinate::new(lat, lon).ok());
    let Some(coordinate) = coordinate else {
        log::debug!("Skipping location {} without valid coordinates", location.id);
        return None;
    };

    let (last_observed_utc, last_observed_local) =
        location.datetime_last.as_ref().map_or((None, None), |d| {
            (parse_utc(d.utc.as_deref()), parse_local(d.local.as_deref()))
        });

    let name = location
        .name
        .map(|n| n.trim().to_string())
        .filter(|n| !n.is_empty())
        .unwrap_or_else(|| format!("Location {}", location.id));

    Some(Station {
        id: location.id.to_string(),
        name,
        coordinate,
        sensors: location
            .sensors
            .into_iter()
            .map(|s| SensorDescriptor {
                id: s.id,
                parameter: s.parameter.name,
                unit: s.parameter.units,
            })
            .collect(),
        last_observed_utc,
        last_observed_local,
    })
}

fn parse_utc(value: Option<&str>) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(value?)
        .ok()
        .map(|t| t.with_timezone(&Utc))
}

fn parse_local(value: Option<&str>) -> Option<DateTime<FixedOffset>> {
    DateTime::parse_from_rfc3339(value?).ok()
}

fn local_as_utc(d: &ApiDatetime) -> Option<DateTime<Utc>> {
    parse_local(d.local.as_deref()).map(|t| t.with_timezone(&Utc))
}
