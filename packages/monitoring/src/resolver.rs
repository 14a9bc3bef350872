//! Station search orchestration.
//!
//! Searches the directory at each configured radius in turn. At a given
//! radius only stations that reported within the activity window are
//! considered; the closest few are tried one at a time, and the first one
//! that yields fresh readings ends the search. Candidates are never
//! fetched concurrently so the closest usable station always wins and no
//! more upstream calls are made than necessary.

use std::sync::Arc;

use airwatch_monitoring_models::{Coordinate, ResolvedAirQuality, Station};
use chrono::{DateTime, TimeDelta, Utc};

use crate::distance::distance_km;
use crate::fetcher::fetch_readings;
use crate::{MonitoringError, StationDirectory};

/// Search radii tried in order, in kilometres.
pub const DEFAULT_RADII_KM: [f64; 3] = [25.0, 50.0, 100.0];

/// Number of closest active stations tried per radius.
pub const DEFAULT_CANDIDATES_PER_RADIUS: usize = 3;

/// Maximum stations requested from the directory per radius.
pub const DEFAULT_RESULT_LIMIT: u32 = 100;

/// Tunables for [`Resolver`].
#[derive(Debug, Clone, PartialEq)]
pub struct ResolverConfig {
    /// Radii to search, smallest first.
    pub radii_km: Vec<f64>,
    /// How many of the closest active stations to try at each radius.
    pub candidates_per_radius: usize,
    /// Maximum stations requested from the directory per radius.
    pub result_limit: u32,
    /// A station is active if it reported within this window.
    pub active_window: TimeDelta,
    /// Maximum age of the governing reading.
    pub max_reading_age: TimeDelta,
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            radii_km: DEFAULT_RADII_KM.to_vec(),
            candidates_per_radius: DEFAULT_CANDIDATES_PER_RADIUS,
            result_limit: DEFAULT_RESULT_LIMIT,
            active_window: TimeDelta::days(7),
            max_reading_age: TimeDelta::hours(6),
        }
    }
}

/// Resolves a coordinate to the air quality at the nearest active station.
#[derive(Clone)]
pub struct Resolver {
    directory: Arc<dyn StationDirectory>,
    config: ResolverConfig,
}

impl Resolver {
    /// Creates a resolver over the given directory.
    #[must_use]
    pub fn new(directory: Arc<dyn StationDirectory>, config: ResolverConfig) -> Self {
        Self { directory, config }
    }

    /// The resolver's configuration.
    #[must_use]
    pub const fn config(&self) -> &ResolverConfig {
        &self.config
    }

    /// Resolves `origin` against the current time.
    ///
    /// # Errors
    ///
    /// See [`Self::resolve_at`].
    pub async fn resolve(
        &self,
        origin: Coordinate,
    ) -> Result<Option<ResolvedAirQuality>, MonitoringError> {
        self.resolve_at(origin, Utc::now()).await
    }

    /// Resolves `origin` with `now` as the reference time for the activity
    /// and freshness checks.
    ///
    /// Returns `Ok(None)` when no station at any radius produced usable
    /// readings.
    ///
    /// # Errors
    ///
    /// Returns [`MonitoringError`] if the station directory query fails or
    /// is not configured. Failures fetching an individual station's
    /// readings are not errors; that station is skipped.
    pub async fn resolve_at(
        &self,
        origin: Coordinate,
        now: DateTime<Utc>,
    ) -> Result<Option<ResolvedAirQuality>, MonitoringError> {
        for &radius_km in &self.config.radii_km {
            let stations = self
                .directory
                .stations_near(origin, radius_km, self.config.result_limit)
                .await?;
            let found = stations.len();

            let active = rank_by_distance(
                active_stations(stations, now, self.config.active_window),
                origin,
            );
            log::debug!(
                "Radius {radius_km} km: {found} stations, {} active",
                active.len()
            );

            for (distance, station) in active.iter().take(self.config.candidates_per_radius) {
                log::debug!(
                    "Trying station {} ({}) at {distance:.1} km",
                    station.id,
                    station.name
                );
                if let Some(resolved) = fetch_readings(
                    self.directory.as_ref(),
                    station,
                    origin,
                    now,
                    self.config.max_reading_age,
                )
                .await
                {
                    log::info!(
                        "Resolved ({}, {}) to station {} at {} mi",
                        origin.latitude(),
                        origin.longitude(),
                        resolved.station.id,
                        resolved.station.distance_mi
                    );
                    return Ok(Some(resolved));
                }
            }
        }

        log::info!(
            "No usable station near ({}, {})",
            origin.latitude(),
            origin.longitude()
        );
        Ok(None)
    }
}

/// Keeps stations whose last observation is no older than `window`.
///
/// Stations that report neither a UTC nor a local last-observation time
/// are dropped.
#[must_use]
pub fn active_stations(
    stations: Vec<Station>,
    now: DateTime<Utc>,
    window: TimeDelta,
) -> Vec<Station> {
    stations
        .into_iter()
        .filter(|s| {
            s.last_observed()
                .is_some_and(|t| now.signed_duration_since(t) <= window)
        })
        .collect()
}

/// Pairs each station with its distance from `origin` in kilometres,
/// closest first.
#[must_use]
pub fn rank_by_distance(stations: Vec<Station>, origin: Coordinate) -> Vec<(f64, Station)> {
    let mut ranked: Vec<(f64, Station)> = stations
        .into_iter()
        .map(|s| (distance_km(origin, s.coordinate), s))
        .collect();
    ranked.sort_by(|a, b| a.0.total_cmp(&b.0));
    ranked
}
