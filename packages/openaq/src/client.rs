//! HTTP client for the `OpenAQ` v3 API.

use airwatch_monitoring::distance::{EARTH_RADIUS_KM, distance_km};
use airwatch_monitoring::{DirectoryError, StationDirectory};
use airwatch_monitoring_models::{Coordinate, RawReading, Station};
use async_trait::async_trait;

use crate::OpenAqError;
use crate::config::OpenAqConfig;
use crate::parse::{parse_latest, parse_locations};

/// `OpenAQ` v3 station directory.
pub struct OpenAqClient {
    config: OpenAqConfig,
    client: reqwest::Client,
}

impl OpenAqClient {
    /// Creates a client.
    ///
    /// # Errors
    ///
    /// Returns [`OpenAqError::Http`] if the HTTP client cannot be built.
    pub fn new(config: OpenAqConfig) -> Result<Self, OpenAqError> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout())
            .user_agent(concat!("airwatch/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self { config, client })
    }

    /// The client's configuration.
    #[must_use]
    pub const fn config(&self) -> &OpenAqConfig {
        &self.config
    }

    /// Lists locations near `center`.
    ///
    /// Radii up to the service's point-query limit use `coordinates` +
    /// `radius`. Wider radii query the enclosing bounding box (two boxes
    /// when the circle crosses the antimeridian) and drop anything farther
    /// than `radius_km`.
    ///
    /// # Errors
    ///
    /// Returns [`OpenAqError`] if the key is missing, a request fails or a
    /// body cannot be parsed.
    pub async fn locations(
        &self,
        center: Coordinate,
        radius_km: f64,
        limit: u32,
    ) -> Result<Vec<Station>, OpenAqError> {
        let queries = locations_queries(
            center,
            radius_km,
            limit,
            self.config.service.max_point_radius_m,
        );

        let mut stations: Vec<Station> = Vec::new();
        for query in &queries {
            let body = self.get("/locations", query).await?;
            for station in parse_locations(&body)? {
                if !stations.iter().any(|s| s.id == station.id) {
                    stations.push(station);
                }
            }
        }

        if queries.iter().flatten().any(|(key, _)| *key == "bbox") {
            stations.retain(|s| distance_km(center, s.coordinate) <= radius_km);
        }

        log::debug!(
            "OpenAQ: {} locations within {radius_km} km of ({}, {})",
            stations.len(),
            center.latitude(),
            center.longitude()
        );
        Ok(stations)
    }

    /// Fetches the latest reading of every sensor at a location.
    ///
    /// # Errors
    ///
    /// Returns [`OpenAqError`] if the key is missing, the request fails or
    /// the body cannot be parsed.
    pub async fn latest(&self, location_id: &str) -> Result<Vec<RawReading>, OpenAqError> {
        let body = self
            .get(&format!("/locations/{location_id}/latest"), &[])
            .await?;
        parse_latest(&body)
    }

    /// Sends an authenticated GET and returns the body of a successful
    /// response.
    async fn get(&self, path: &str, query: &[(&str, String)]) -> Result<String, OpenAqError> {
        let api_key = self
            .config
            .api_key
            .as_deref()
            .ok_or(OpenAqError::NotConfigured)?;

        let url = format!("{}{path}", self.config.service.base_url);
        log::debug!("OpenAQ: GET {url} {query:?}");

        let resp = self
            .client
            .get(&url)
            .header("X-API-Key", api_key)
            .query(query)
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            log::warn!("OpenAQ: GET {url} returned {status}");
            return Err(OpenAqError::Status {
                status: status.as_u16(),
                body,
            });
        }

        Ok(resp.text().await?)
    }
}

#[async_trait]
impl StationDirectory for OpenAqClient {
    async fn stations_near(
        &self,
        center: Coordinate,
        radius_km: f64,
        limit: u32,
    ) -> Result<Vec<Station>, DirectoryError> {
        Ok(self.locations(center, radius_km, limit).await?)
    }

    async fn latest_readings(&self, station_id: &str) -> Result<Vec<RawReading>, DirectoryError> {
        Ok(self.latest(station_id).await?)
    }
}

/// A `(west, south, east, north)` box in degrees.
pub type BoundingBox = (f64, f64, f64, f64);

/// Builds the `/locations` queries for a search around `center`.
///
/// Returns a single query, or two bounding-box queries when the search
/// circle crosses the antimeridian.
#[must_use]
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
pub fn locations_queries(
    center: Coordinate,
    radius_km: f64,
    limit: u32,
    max_point_radius_m: u32,
) -> Vec<Vec<(&'static str, String)>> {
    let radius_m = (radius_km * 1000.0).round().max(1.0) as u32;
    let limit = ("limit", limit.to_string());

    if radius_m <= max_point_radius_m {
        return vec![vec![
            (
                "coordinates",
                format!("{},{}", center.latitude(), center.longitude()),
            ),
            ("radius", radius_m.to_string()),
            limit,
        ]];
    }

    bounding_boxes(center, radius_km)
        .into_iter()
        .map(|(west, south, east, north)| {
            vec![
                ("bbox", format!("{west},{south},{east},{north}")),
                limit.clone(),
            ]
        })
        .collect()
}

/// Latitude/longitude boxes that together contain the circle of
/// `radius_km` around `center`.
///
/// Latitudes are clamped at the poles. A circle that crosses the
/// antimeridian is split into one box on each side of it, since a box
/// cannot have `west > east`.
#[must_use]
pub fn bounding_boxes(center: Coordinate, radius_km: f64) -> Vec<BoundingBox> {
    let angular = radius_km / EARTH_RADIUS_KM;
    let dlat = angular.to_degrees();
    let south = (center.latitude() - dlat).max(-90.0);
    let north = (center.latitude() + dlat).min(90.0);

    let ratio = angular.sin() / center.latitude().to_radians().cos();
    // The circle reaches a pole once the ratio hits 1; every longitude is then in range.
    if !ratio.is_finite() || ratio >= 1.0 {
        return vec![(-180.0, south, 180.0, north)];
    }
    let dlon = ratio.asin().to_degrees();

    let west = center.longitude() - dlon;
    let east = center.longitude() + dlon;
    if west < -180.0 {
        vec![
            (west + 360.0, south, 180.0, north),
            (-180.0, south, east, north),
        ]
    } else if east > 180.0 {
        vec![
            (west, south, 180.0, north),
            (-180.0, south, east - 360.0, north),
        ]
    } else {
        vec![(west, south, east, north)]
    }
}
