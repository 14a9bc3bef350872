//! HTTP handler functions for the airwatch API.

use actix_web::error::{InternalError, QueryPayloadError};
use actix_web::http::header;
use actix_web::{HttpRequest, HttpResponse, web};
use airwatch_monitoring::MonitoringError;
use airwatch_monitoring_models::Coordinate;
use airwatch_server_models::{
    AirQualityQueryParams, ApiAirQuality, ApiEmptyResult, ApiError, ApiHealth,
};

use crate::AppState;

/// Cache lifetime for a resolved result.
const FOUND_CACHE_CONTROL: &str = "public, max-age=600";

/// Cache lifetime for the "no station nearby" result. Coverage changes
/// slowly, so this is cached longer.
const EMPTY_CACHE_CONTROL: &str = "public, max-age=1800";

/// `GET /api/health`
pub async fn health(state: web::Data<AppState>) -> HttpResponse {
    HttpResponse::Ok().json(ApiHealth {
        healthy: true,
        version: env!("CARGO_PKG_VERSION").to_string(),
        configured: state.configured,
    })
}

/// `GET /api/air-quality?lat=<f64>&lon=<f64>`
///
/// Resolves the coordinate to the nearest active station's latest
/// readings. Returns `{ "stations": [] }` when nothing usable is within
/// the largest search radius.
pub async fn air_quality(
    state: web::Data<AppState>,
    params: web::Query<AirQualityQueryParams>,
) -> HttpResponse {
    let origin = match parse_origin(&params) {
        Ok(origin) => origin,
        Err(message) => {
            log::debug!("Rejected air quality request: {message}");
            return HttpResponse::BadRequest().json(ApiError::new(message));
        }
    };

    match state.resolve(origin).await {
        Ok(Some(resolved)) => HttpResponse::Ok()
            .insert_header((header::CACHE_CONTROL, FOUND_CACHE_CONTROL))
            .json(ApiAirQuality::from(resolved)),
        Ok(None) => HttpResponse::Ok()
            .insert_header((header::CACHE_CONTROL, EMPTY_CACHE_CONTROL))
            .json(ApiEmptyResult::default()),
        Err(e) => error_response(&e),
    }
}

/// Answers query strings that fail to deserialize (e.g. a repeated `lat`)
/// with the same JSON error body as any other bad input.
pub fn query_error(err: QueryPayloadError, _req: &HttpRequest) -> actix_web::Error {
    log::debug!("Rejected query string: {err}");
    let response = HttpResponse::BadRequest().json(ApiError::new(err.to_string()));
    InternalError::from_response(err, response).into()
}

/// Parses and validates the `lat`/`lon` query parameters.
fn parse_origin(params: &AirQualityQueryParams) -> Result<Coordinate, String> {
    let (Some(lat), Some(lon)) = (params.lat.as_deref(), params.lon.as_deref()) else {
        return Err("lat and lon query parameters are required".to_string());
    };
    let lat: f64 = lat
        .trim()
        .parse()
        .map_err(|_| format!("lat must be a number, got {lat:?}"))?;
    let lon: f64 = lon
        .trim()
        .parse()
        .map_err(|_| format!("lon must be a number, got {lon:?}"))?;

    Coordinate::new(lat, lon).map_err(|e| MonitoringError::from(e).to_string())
}

fn error_response(e: &MonitoringError) -> HttpResponse {
    match e {
        MonitoringError::InvalidCoordinate(_) => {
            HttpResponse::BadRequest().json(ApiError::new(e.to_string()))
        }
        MonitoringError::NotConfigured => {
            log::warn!("Air quality requested but no OpenAQ API key is configured");
            HttpResponse::ServiceUnavailable().json(ApiError::new(e.to_string()))
        }
        MonitoringError::Timeout => {
            HttpResponse::ServiceUnavailable().json(ApiError::new(e.to_string()))
        }
        MonitoringError::Upstream { status, body } => {
            log::error!("Station directory returned HTTP {status}: {body}");
            HttpResponse::BadGateway().json(ApiError {
                error: "Failed to query monitoring stations".to_string(),
                upstream_status: Some(*status),
                upstream_body: Some(body.clone()),
            })
        }
        MonitoringError::Transport { message } => {
            log::error!("Station directory request failed: {message}");
            HttpResponse::BadGateway().json(ApiError::new("Failed to query monitoring stations"))
        }
        MonitoringError::Internal { message } => {
            log::error!("Air quality lookup failed: {message}");
            HttpResponse::InternalServerError().json(ApiError::new("Internal server error"))
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    use actix_web::http::StatusCode;
    use actix_web::{App, test};
    use airwatch_monitoring::{DirectoryError, Resolver, ResolverConfig, StationDirectory};
    use airwatch_monitoring_models::{RawReading, SensorDescriptor, Station};
    use async_trait::async_trait;
    use chrono::{TimeDelta, Utc};

    use super::*;

    struct FakeDirectory {
        stations: Result<Vec<Station>, DirectoryError>,
        readings: Vec<RawReading>,
        delay: Option<Duration>,
        panics: bool,
        calls: AtomicUsize,
    }

    impl FakeDirectory {
        fn new(stations: Result<Vec<Station>, DirectoryError>) -> Self {
            Self {
                stations,
                readings: Vec::new(),
                delay: None,
                panics: false,
                calls: AtomicUsize::new(0),
            }
        }
    }

    #[async_trait]
    impl StationDirectory for FakeDirectory {
        async fn stations_near(
            &self,
            _center: Coordinate,
            _radius_km: f64,
            _limit: u32,
        ) -> Result<Vec<Station>, DirectoryError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if let Some(delay) = self.delay {
                tokio::time::sleep(delay).await;
            }
            assert!(!self.panics, "station directory blew up");
            self.stations.clone()
        }

        async fn latest_readings(
            &self,
            _station_id: &str,
        ) -> Result<Vec<RawReading>, DirectoryError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(self.readings.clone())
        }
    }

    fn los_angeles_station() -> Station {
        Station {
            id: "2178".to_string(),
            name: "Los Angeles - N. Main".to_string(),
            coordinate: Coordinate::new(34.0666, -118.2269).unwrap(),
            sensors: vec![SensorDescriptor {
                id: 3917,
                parameter: "pm25".to_string(),
                unit: "µg/m³".to_string(),
            }],
            last_observed_utc: Some(Utc::now() - TimeDelta::minutes(10)),
            last_observed_local: None,
        }
    }

    struct Response {
        status: StatusCode,
        content_type: Option<String>,
        cache_control: Option<String>,
        body: serde_json::Value,
    }

    async fn get(directory: Arc<FakeDirectory>, uri: &str, budget: Duration) -> Response {
        let state = web::Data::new(AppState {
            resolver: Resolver::new(directory, ResolverConfig::default()),
            configured: true,
            resolve_timeout: budget,
        });
        let app =
            test::init_service(App::new().app_data(state).configure(crate::configure)).await;

        let resp = test::call_service(&app, test::TestRequest::get().uri(uri).to_request()).await;
        let status = resp.status();
        let header_value = |name: header::HeaderName| {
            resp.headers()
                .get(name)
                .and_then(|v| v.to_str().ok())
                .map(str::to_string)
        };
        let content_type = header_value(header::CONTENT_TYPE);
        let cache_control = header_value(header::CACHE_CONTROL);
        let body = test::read_body_json(resp).await;

        Response {
            status,
            content_type,
            cache_control,
            body,
        }
    }

    const BUDGET: Duration = Duration::from_secs(5);

    #[actix_web::test]
    async fn health_reports_configuration() {
        let directory = Arc::new(FakeDirectory::new(Ok(Vec::new())));
        let resp = get(directory, "/api/health", BUDGET).await;

        assert_eq!(resp.status, StatusCode::OK);
        assert_eq!(resp.body["healthy"], true);
        assert_eq!(resp.body["configured"], true);
    }

    #[actix_web::test]
    async fn resolves_nearest_station() {
        let mut directory = FakeDirectory::new(Ok(vec![los_angeles_station()]));
        directory.readings = vec![RawReading {
            sensor_id: 3917,
            value: Some(34.2),
            observed_at: Utc::now() - TimeDelta::minutes(5),
        }];

        let resp = get(
            Arc::new(directory),
            "/api/air-quality?lat=34.0522&lon=-118.2437",
            BUDGET,
        )
        .await;

        assert_eq!(resp.status, StatusCode::OK);
        assert_eq!(resp.cache_control.as_deref(), Some(FOUND_CACHE_CONTROL));
        assert_eq!(resp.body["station"]["id"], "2178");
        assert_eq!(resp.body["readings"]["pm25"]["value"], 34.2);
        assert_eq!(resp.body["aqi"], 97);
        assert_eq!(resp.body["aqiCategory"]["id"], "MODERATE");
    }

    #[actix_web::test]
    async fn empty_result_is_cached_longer() {
        let directory = Arc::new(FakeDirectory::new(Ok(Vec::new())));
        let resp = get(
            directory.clone(),
            "/api/air-quality?lat=0&lon=-140",
            BUDGET,
        )
        .await;

        assert_eq!(resp.status, StatusCode::OK);
        assert_eq!(resp.cache_control.as_deref(), Some(EMPTY_CACHE_CONTROL));
        assert_eq!(resp.body, serde_json::json!({ "stations": [] }));
        assert_eq!(directory.calls.load(Ordering::SeqCst), 3);
    }

    #[actix_web::test]
    async fn missing_or_malformed_coordinates_are_rejected() {
        for uri in [
            "/api/air-quality",
            "/api/air-quality?lat=34.05",
            "/api/air-quality?lat=abc&lon=-118.2",
            "/api/air-quality?lat=95&lon=0",
            "/api/air-quality?lat=0&lon=181",
        ] {
            let directory = Arc::new(FakeDirectory::new(Ok(Vec::new())));
            let resp = get(directory.clone(), uri, BUDGET).await;

            assert_eq!(resp.status, StatusCode::BAD_REQUEST, "{uri}");
            assert!(resp.body["error"].is_string(), "{uri}");
            assert_eq!(directory.calls.load(Ordering::SeqCst), 0, "{uri}");
        }
    }

    #[actix_web::test]
    async fn undeserializable_query_is_json_bad_request() {
        let directory = Arc::new(FakeDirectory::new(Ok(Vec::new())));
        let resp = get(
            directory.clone(),
            "/api/air-quality?lat=1&lat=2&lon=3",
            BUDGET,
        )
        .await;

        assert_eq!(resp.status, StatusCode::BAD_REQUEST);
        assert_eq!(resp.content_type.as_deref(), Some("application/json"));
        assert!(
            resp.body["error"]
                .as_str()
                .is_some_and(|e| e.contains("duplicate field"))
        );
        assert_eq!(directory.calls.load(Ordering::SeqCst), 0);
    }

    #[actix_web::test]
    async fn not_configured_is_unavailable() {
        let directory = Arc::new(FakeDirectory::new(Err(DirectoryError::NotConfigured)));
        let resp = get(directory, "/api/air-quality?lat=34&lon=-118", BUDGET).await;

        assert_eq!(resp.status, StatusCode::SERVICE_UNAVAILABLE);
        assert!(resp.body["error"].is_string());
    }

    #[actix_web::test]
    async fn upstream_failure_reports_status_and_body() {
        let directory = Arc::new(FakeDirectory::new(Err(DirectoryError::Status {
            status: 500,
            body: "internal".to_string(),
        })));
        let resp = get(directory.clone(), "/api/air-quality?lat=34&lon=-118", BUDGET).await;

        assert_eq!(resp.status, StatusCode::BAD_GATEWAY);
        assert_eq!(resp.body["upstreamStatus"], 500);
        assert_eq!(resp.body["upstreamBody"], "internal");
        assert_eq!(directory.calls.load(Ordering::SeqCst), 1);
    }

    #[actix_web::test]
    async fn resolution_panic_is_internal_error() {
        let mut directory = FakeDirectory::new(Ok(Vec::new()));
        directory.panics = true;

        let resp = get(Arc::new(directory), "/api/air-quality?lat=34&lon=-118", BUDGET).await;

        assert_eq!(resp.status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(resp.body["error"], "Internal server error");
        assert!(resp.cache_control.is_none());
    }

    #[actix_web::test]
    async fn slow_upstream_times_out() {
        let mut directory = FakeDirectory::new(Ok(Vec::new()));
        directory.delay = Some(Duration::from_secs(2));

        let resp = get(
            Arc::new(directory),
            "/api/air-quality?lat=34&lon=-118",
            Duration::from_millis(50),
        )
        .await;

        assert_eq!(resp.status, StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(resp.body["error"], "air quality lookup timed out");
    }
}
