//! Latest-reading retrieval and validation for a single candidate station.

use std::collections::BTreeMap;

use airwatch_monitoring_models::{
    Coordinate, Pollutant, RawReading, Reading, ResolvedAirQuality, SensorId, Station,
    StationSummary,
};
use chrono::{DateTime, TimeDelta, Utc};

use crate::aqi::pm25_to_aqi;
use crate::distance::{distance_km, km_to_miles};
use crate::normalize::normalize_parameter;
use crate::{StationDirectory, round_one_decimal};

/// Fetches a station's latest readings and resolves them into a result.
///
/// Returns `None` when the station cannot be used: the readings request
/// failed, neither PM2.5 nor ozone was reported, or the governing reading
/// is older than `max_age`. Upstream failures are logged, never returned.
pub async fn fetch_readings(
    directory: &dyn StationDirectory,
    station: &Station,
    origin: Coordinate,
    now: DateTime<Utc>,
    max_age: TimeDelta,
) -> Option<ResolvedAirQuality> {
    let raw = match directory.latest_readings(&station.id).await {
        Ok(raw) => raw,
        Err(e) => {
            log::warn!(
                "Latest readings failed for station {} ({}): {e}",
                station.id,
                station.name
            );
            return None;
        }
    };

    assemble(station, &raw, origin, now, max_age)
}

/// Builds a [`ResolvedAirQuality`] from a station and its raw readings.
///
/// Readings from unknown sensors, unmapped parameters and `null` values
/// are dropped. If a pollutant appears more than once the last record
/// wins.
#[must_use]
pub fn assemble(
    station: &Station,
    raw: &[RawReading],
    origin: Coordinate,
    now: DateTime<Utc>,
    max_age: TimeDelta,
) -> Option<ResolvedAirQuality> {
    let sensors: BTreeMap<SensorId, (Pollutant, &str)> = station
        .sensors
        .iter()
        .map(|s| (s.id, (normalize_parameter(&s.parameter), s.unit.as_str())))
        .collect();

    let mut readings = BTreeMap::new();
    for record in raw {
        let Some(&(pollutant, unit)) = sensors.get(&record.sensor_id) else {
            continue;
        };
        if !pollutant.is_known() {
            continue;
        }
        let Some(value) = record.value.filter(|v| v.is_finite()) else {
            continue;
        };
        readings.insert(
            pollutant,
            Reading {
                pollutant,
                value: round_one_decimal(value),
                unit: unit.to_string(),
                observed_at: record.observed_at,
            },
        );
    }

    let Some(governing) = readings
        .get(&Pollutant::Pm25)
        .or_else(|| readings.get(&Pollutant::O3))
    else {
        log::debug!(
            "Station {} has no PM2.5 or ozone reading ({} usable readings)",
            station.id,
            readings.len()
        );
        return None;
    };

    let last_updated = governing.observed_at;
    let age = now.signed_duration_since(last_updated);
    if age > max_age {
        log::debug!(
            "Station {} {} reading is stale ({} minutes old)",
            station.id,
            governing.pollutant,
            age.num_minutes()
        );
        return None;
    }

    let aqi = readings.get(&Pollutant::Pm25).map(|r| pm25_to_aqi(r.value));
    let distance_mi = round_one_decimal(km_to_miles(distance_km(origin, station.coordinate)));

    Some(ResolvedAirQuality {
        station: StationSummary {
            id: station.id.clone(),
            name: station.name.clone(),
            distance_mi,
            coordinate: station.coordinate,
        },
        readings,
        aqi,
        last_updated,
    })
}
