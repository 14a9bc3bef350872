#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! `OpenAQ` v3 client.
//!
//! Implements [`airwatch_monitoring::StationDirectory`] on top of two
//! endpoints:
//!
//! - `GET /locations` lists monitoring locations near a coordinate,
//!   including their sensors and last-observation timestamps.
//! - `GET /locations/{id}/latest` returns the most recent value of every
//!   sensor at one location.
//!
//! Every request is authenticated with the `X-API-Key` header. When no key
//! is configured the client refuses to make requests at all.
//!
//! See <https://docs.openaq.org/>

pub mod client;
pub mod config;
pub mod parse;

use airwatch_monitoring::DirectoryError;
use thiserror::Error;

pub use client::OpenAqClient;
pub use config::OpenAqConfig;

/// Errors from `OpenAQ` requests.
#[derive(Debug, Error)]
pub enum OpenAqError {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// JSON decoding failed.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// No API key is configured.
    #[error("OPENAQ_API_KEY is not set")]
    NotConfigured,

    /// `OpenAQ` answered with a non-success status.
    #[error("OpenAQ returned HTTP {status}: {body}")]
    Status {
        /// HTTP status code.
        status: u16,
        /// Response body.
        body: String,
    },
}

impl From<OpenAqError> for DirectoryError {
    fn from(e: OpenAqError) -> Self {
        match e {
            OpenAqError::NotConfigured => Self::NotConfigured,
            OpenAqError::Status { status, body } => Self::Status { status, body },
            OpenAqError::Http(e) if e.is_decode() => Self::Decode {
                message: e.to_string(),
            },
            OpenAqError::Http(e) => Self::Transport {
                message: e.to_string(),
            },
            OpenAqError::Json(e) => Self::Decode {
                message: e.to_string(),
            },
        }
    }
}
