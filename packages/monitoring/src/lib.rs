#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Nearest-active-station air quality resolution.
//!
//! Given a coordinate, the [`resolver::Resolver`] searches an upstream
//! [`StationDirectory`] at widening radii, keeps stations that reported
//! recently, and tries the closest few until one yields fresh PM2.5 or
//! ozone readings. PM2.5 readings are converted to a US EPA AQI value by
//! [`aqi::pm25_to_aqi`].
//!
//! The directory is a trait so the search policy can be exercised without
//! network access; the `OpenAQ` implementation lives in `airwatch_openaq`.

pub mod aqi;
pub mod distance;
pub mod fetcher;
pub mod normalize;
pub mod resolver;

use airwatch_monitoring_models::{Coordinate, InvalidCoordinateError, RawReading, Station};
use async_trait::async_trait;

pub use resolver::{Resolver, ResolverConfig};

/// Errors reported by a [`StationDirectory`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DirectoryError {
    /// No credential is configured, so no request was attempted.
    #[error("station directory is not configured")]
    NotConfigured,

    /// The upstream answered with a non-success status.
    #[error("upstream returned HTTP {status}: {body}")]
    Status {
        /// HTTP status code.
        status: u16,
        /// Response body, for diagnosis.
        body: String,
    },

    /// The request could not be completed (connect, timeout, TLS).
    #[error("upstream request failed: {message}")]
    Transport {
        /// Description of the failure.
        message: String,
    },

    /// The upstream response could not be decoded.
    #[error("upstream response could not be decoded: {message}")]
    Decode {
        /// Description of the failure.
        message: String,
    },
}

/// Errors that abort a whole resolution.
///
/// Per-station reading failures never appear here; they only eliminate
/// that candidate.
#[derive(Debug, thiserror::Error)]
pub enum MonitoringError {
    /// The requested coordinate is missing, malformed or out of range.
    #[error("invalid coordinate: {0}")]
    InvalidCoordinate(#[from] InvalidCoordinateError),

    /// The upstream credential is missing.
    #[error("air quality service is not configured")]
    NotConfigured,

    /// The station directory answered with a non-success status.
    #[error("station directory returned HTTP {status}")]
    Upstream {
        /// Upstream HTTP status code.
        status: u16,
        /// Upstream response body.
        body: String,
    },

    /// The station directory could not be reached or decoded.
    #[error("station directory request failed: {message}")]
    Transport {
        /// Description of the failure.
        message: String,
    },

    /// The resolution exceeded its wall-clock budget.
    #[error("air quality lookup timed out")]
    Timeout,

    /// Any other failure.
    #[error("internal error: {message}")]
    Internal {
        /// Description of the failure.
        message: String,
    },
}

impl From<DirectoryError> for MonitoringError {
    fn from(e: DirectoryError) -> Self {
        match e {
            DirectoryError::NotConfigured => Self::NotConfigured,
            DirectoryError::Status { status, body } => Self::Upstream { status, body },
            DirectoryError::Transport { message } | DirectoryError::Decode { message } => {
                Self::Transport { message }
            }
        }
    }
}

/// Upstream source of monitoring stations and their latest readings.
#[async_trait]
pub trait StationDirectory: Send + Sync {
    /// Lists stations within `radius_km` of `center`, at most `limit` of
    /// them, in no particular order.
    ///
    /// # Errors
    ///
    /// Returns [`DirectoryError`] if the directory cannot be queried.
    async fn stations_near(
        &self,
        center: Coordinate,
        radius_km: f64,
        limit: u32,
    ) -> Result<Vec<Station>, DirectoryError>;

    /// Fetches the most recent reading of every sensor on a station.
    ///
    /// # Errors
    ///
    /// Returns [`DirectoryError`] if the readings cannot be retrieved.
    async fn latest_readings(&self, station_id: &str) -> Result<Vec<RawReading>, DirectoryError>;
}

/// Rounds `value` to one decimal place.
#[must_use]
pub fn round_one_decimal(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

#[cfg(test)]
pub(crate) mod test_support {
    //! In-memory [`StationDirectory`] used by the fetcher and resolver tests.

    use std::collections::BTreeMap;
    use std::sync::Mutex;

    use airwatch_monitoring_models::{Coordinate, RawReading, SensorDescriptor, Station};
    use async_trait::async_trait;
    use chrono::{DateTime, Utc};

    use crate::{DirectoryError, StationDirectory};

    /// An upstream call observed by [`FakeDirectory`].
    #[derive(Debug, Clone, PartialEq)]
    pub enum Call {
        Directory { radius_km: f64 },
        Latest { station_id: String },
    }

    /// Serves canned stations per radius and canned readings per station.
    #[derive(Default)]
    pub struct FakeDirectory {
        pub by_radius: Vec<(f64, Result<Vec<Station>, DirectoryError>)>,
        pub readings: BTreeMap<String, Result<Vec<RawReading>, DirectoryError>>,
        pub calls: Mutex<Vec<Call>>,
    }

    impl FakeDirectory {
        pub fn calls(&self) -> Vec<Call> {
            self.calls.lock().unwrap().clone()
        }

        pub fn latest_calls(&self) -> Vec<String> {
            self.calls()
                .into_iter()
                .filter_map(|c| match c {
                    Call::Latest { station_id } => Some(station_id),
                    Call::Directory { .. } => None,
                })
                .collect()
        }
    }

    #[async_trait]
    impl StationDirectory for FakeDirectory {
        async fn stations_near(
            &self,
            _center: Coordinate,
            radius_km: f64,
            _limit: u32,
        ) -> Result<Vec<Station>, DirectoryError> {
            self.calls
                .lock()
                .unwrap()
                .push(Call::Directory { radius_km });
            self.by_radius
                .iter()
                .find(|(r, _)| (*r - radius_km).abs() < f64::EPSILON)
                .map_or_else(|| Ok(Vec::new()), |(_, result)| result.clone())
        }

        async fn latest_readings(
            &self,
            station_id: &str,
        ) -> Result<Vec<RawReading>, DirectoryError> {
            self.calls.lock().unwrap().push(Call::Latest {
                station_id: station_id.to_string(),
            });
            self.readings
                .get(station_id)
                .cloned()
                .unwrap_or_else(|| Ok(Vec::new()))
        }
    }

    /// A coordinate `km` kilometres due north of `origin`.
    pub fn north_of(origin: Coordinate, km: f64) -> Coordinate {
        let dlat = (km / crate::distance::EARTH_RADIUS_KM).to_degrees();
        Coordinate::new(origin.latitude() + dlat, origin.longitude()).unwrap()
    }

    pub fn station(
        id: &str,
        coordinate: Coordinate,
        sensors: &[(i64, &str, &str)],
        last_observed: Option<DateTime<Utc>>,
    ) -> Station {
        Station {
            id: id.to_string(),
            name: format!("Station {id}"),
            coordinate,
            sensors: sensors
                .iter()
                .map(|(sid, parameter, unit)| SensorDescriptor {
                    id: *sid,
                    parameter: (*parameter).to_string(),
                    unit: (*unit).to_string(),
                })
                .collect(),
            last_observed_utc: last_observed,
            last_observed_local: None,
        }
    }

    pub fn reading(sensor_id: i64, value: Option<f64>, observed_at: DateTime<Utc>) -> RawReading {
        RawReading {
            sensor_id,
            value,
            observed_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn directory_errors_map_to_taxonomy() {
        assert!(matches!(
            MonitoringError::from(DirectoryError::NotConfigured),
            MonitoringError::NotConfigured
        ));
        assert!(matches!(
            MonitoringError::from(DirectoryError::Status {
                status: 500,
                body: "boom".to_string(),
            }),
            MonitoringError::Upstream { status: 500, ref body } if body == "boom"
        ));
        assert!(matches!(
            MonitoringError::from(DirectoryError::Decode {
                message: "bad json".to_string(),
            }),
            MonitoringError::Transport { .. }
        ));
    }

    #[test]
    fn rounds_to_one_decimal() {
        assert!((round_one_decimal(34.24) - 34.2).abs() < 1e-9);
        assert!((round_one_decimal(34.25) - 34.3).abs() < 1e-9);
        assert!((round_one_decimal(-1.04) - -1.0).abs() < 1e-9);
    }
}
