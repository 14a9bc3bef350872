#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Actix-Web API server for airwatch.
//!
//! Serves `GET /api/air-quality`, which resolves a coordinate to the
//! latest PM2.5/ozone readings at the nearest active `OpenAQ` station, and
//! `GET /api/health`. Each resolution runs under a wall-clock budget; the
//! server keeps no state between requests.

pub mod config;
mod handlers;

use std::sync::Arc;
use std::time::Duration;

use actix_cors::Cors;
use actix_web::{App, HttpServer, middleware, web};
use airwatch_monitoring::{MonitoringError, Resolver, ResolverConfig};
use airwatch_monitoring_models::{Coordinate, ResolvedAirQuality};
use airwatch_openaq::{OpenAqClient, OpenAqConfig, OpenAqError};

use crate::config::ServerConfig;

/// Shared application state.
pub struct AppState {
    /// Nearest-station resolver.
    pub resolver: Resolver,
    /// Whether an upstream API key is configured.
    pub configured: bool,
    /// Budget for a single resolution.
    pub resolve_timeout: Duration,
}

impl AppState {
    /// Resolves `origin` within the configured budget.
    ///
    /// # Errors
    ///
    /// Returns [`MonitoringError::Timeout`] if the budget is exhausted, or
    /// whatever the resolver reports.
    pub async fn resolve(
        &self,
        origin: Coordinate,
    ) -> Result<Option<ResolvedAirQuality>, MonitoringError> {
        resolve_with_timeout(&self.resolver, origin, self.resolve_timeout).await
    }
}

/// Builds a resolver backed by the `OpenAQ` client.
///
/// # Errors
///
/// Returns [`OpenAqError`] if the HTTP client cannot be built.
pub fn build_resolver(openaq: OpenAqConfig) -> Result<Resolver, OpenAqError> {
    let resolver_config = ResolverConfig {
        result_limit: openaq.service.result_limit,
        ..ResolverConfig::default()
    };
    let client = OpenAqClient::new(openaq)?;
    Ok(Resolver::new(Arc::new(client), resolver_config))
}

/// Runs one resolution under `budget`.
///
/// The resolution runs on its own task. On expiry the task is aborted,
/// dropping any in-flight upstream calls, and no partial result is
/// returned. A panic inside the resolution surfaces as
/// [`MonitoringError::Internal`].
///
/// # Errors
///
/// Returns [`MonitoringError::Timeout`] if the budget is exhausted,
/// [`MonitoringError::Internal`] if the resolution task panicked, or
/// whatever the resolver reports.
pub async fn resolve_with_timeout(
    resolver: &Resolver,
    origin: Coordinate,
    budget: Duration,
) -> Result<Option<ResolvedAirQuality>, MonitoringError> {
    let resolver = resolver.clone();
    let mut task = tokio::spawn(async move { resolver.resolve(origin).await });

    match tokio::time::timeout(budget, &mut task).await {
        Ok(Ok(result)) => result,
        Ok(Err(e)) => {
            log::error!(
                "Resolution for ({}, {}) failed: {e}",
                origin.latitude(),
                origin.longitude()
            );
            Err(MonitoringError::Internal {
                message: e.to_string(),
            })
        }
        Err(_) => {
            task.abort();
            log::warn!(
                "Resolution for ({}, {}) exceeded {budget:?}",
                origin.latitude(),
                origin.longitude()
            );
            Err(MonitoringError::Timeout)
        }
    }
}

/// Registers the `/api` routes.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api")
            .app_data(web::QueryConfig::default().error_handler(handlers::query_error))
            .route("/health", web::get().to(handlers::health))
            .route("/air-quality", web::get().to(handlers::air_quality)),
    );
}

/// Starts the airwatch API server.
///
/// Reads the `OpenAQ` settings from the environment, builds the resolver
/// and starts the Actix-Web HTTP server. The caller provides the async
/// runtime (e.g. via `#[actix_web::main]`) and initializes logging.
///
/// # Errors
///
/// Returns an `std::io::Result` error if the HTTP client cannot be built,
/// or if the server fails to bind or encounters a runtime error.
#[allow(clippy::future_not_send)]
pub async fn run_server(config: ServerConfig) -> std::io::Result<()> {
    let openaq = OpenAqConfig::from_env();
    let configured = openaq.is_configured();
    let resolver = build_resolver(openaq).map_err(std::io::Error::other)?;

    let state = web::Data::new(AppState {
        resolver,
        configured,
        resolve_timeout: config.resolve_timeout,
    });

    let ServerConfig { bind_addr, port, .. } = config;

    log::info!("Starting server on {bind_addr}:{port}");

    HttpServer::new(move || {
        let cors = Cors::permissive();

        App::new()
            .wrap(cors)
            .wrap(middleware::Logger::default())
            .app_data(state.clone())
            .configure(configure)
    })
    .bind((bind_addr, port))?
    .run()
    .await
}
