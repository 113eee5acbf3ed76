#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions)]

//! Socrata SODA client for restaurant inspection search.
//!
//! Turns a restaurant name or a map coordinate into a `$where` predicate,
//! builds the request URL with [`query::QueryBuilder`], sends it through an
//! [`HttpTransport`], and decodes the JSON rows into
//! [`InspectionRecord`](atx_health_inspection_models::InspectionRecord)
//! values. Every failure surfaces as a typed [`ClientError`]; nothing is
//! retried or swallowed here.

pub mod client;
pub mod normalize;
pub mod parsing;
pub mod query;
pub mod registry;
pub mod task;
pub mod transport;

use async_trait::async_trait;
use atx_health_inspection_models::InvalidCoordinateError;
use strum_macros::{AsRefStr, Display, EnumString};

pub use client::SocrataClient;
pub use reqwest::Url;

/// Errors returned by the inspection client.
///
/// Exactly one kind is produced per failed call.
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    /// The search term (or identifier) was blank.
    #[error("search input is empty")]
    EmptyInput,

    /// The search coordinate is outside WGS84 bounds.
    #[error("invalid location: {0}")]
    InvalidLocation(#[from] InvalidCoordinateError),

    /// The query could not be turned into a request URL.
    #[error("could not build a request URL")]
    InvalidUrl,

    /// The request never produced an HTTP response.
    #[error("network error: {0}")]
    Network(#[from] TransportError),

    /// The endpoint answered with a non-2xx status.
    #[error("unexpected HTTP status {status}")]
    InvalidResponse {
        /// The HTTP status code returned.
        status: u16,
    },

    /// The payload was not a JSON array of well-formed inspection rows.
    #[error("decoding error: {message}")]
    Decoding {
        /// Description of what went wrong.
        message: String,
    },

    /// The payload decoded but held no rows.
    #[error("no inspections returned")]
    EmptyResponse,
}

/// Payload-free discriminant of [`ClientError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, AsRefStr)]
pub enum ClientErrorKind {
    /// See [`ClientError::EmptyInput`].
    EmptyInput,
    /// See [`ClientError::InvalidLocation`].
    InvalidLocation,
    /// See [`ClientError::InvalidUrl`].
    InvalidUrl,
    /// See [`ClientError::Network`].
    NetworkError,
    /// See [`ClientError::InvalidResponse`].
    InvalidResponse,
    /// See [`ClientError::Decoding`].
    DecodingError,
    /// See [`ClientError::EmptyResponse`].
    EmptyResponse,
}

impl ClientError {
    /// Returns the kind of this error.
    #[must_use]
    pub const fn kind(&self) -> ClientErrorKind {
        match self {
            Self::EmptyInput => ClientErrorKind::EmptyInput,
            Self::InvalidLocation(_) => ClientErrorKind::InvalidLocation,
            Self::InvalidUrl => ClientErrorKind::InvalidUrl,
            Self::Network(_) => ClientErrorKind::NetworkError,
            Self::InvalidResponse { .. } => ClientErrorKind::InvalidResponse,
            Self::Decoding { .. } => ClientErrorKind::DecodingError,
            Self::EmptyResponse => ClientErrorKind::EmptyResponse,
        }
    }

    /// Message suitable for showing to an end user.
    ///
    /// Never includes transport or decoding details; log the error itself
    /// for those.
    #[must_use]
    pub const fn user_message(&self) -> &'static str {
        self.kind().user_message()
    }
}

impl ClientErrorKind {
    /// Message suitable for showing to an end user.
    #[must_use]
    pub const fn user_message(self) -> &'static str {
        match self {
            Self::EmptyInput => "Enter a restaurant name to search.",
            Self::InvalidLocation => "Your location could not be used for a search.",
            Self::InvalidUrl => "That search could not be prepared. Try different wording.",
            Self::NetworkError => {
                "Unable to reach the inspection service. Check your connection and try again."
            }
            Self::InvalidResponse => "The inspection service is unavailable right now.",
            Self::DecodingError => "The inspection service sent data that could not be read.",
            Self::EmptyResponse => "No inspections matched your search.",
        }
    }
}

/// Transport-level failures (no usable HTTP response).
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    /// The request exceeded its deadline.
    #[error("request timed out")]
    Timeout,

    /// The connection could not be established.
    #[error("connection failed: {message}")]
    Connect {
        /// Underlying error text.
        message: String,
    },

    /// Any other failure while sending the request or reading the body.
    #[error("request failed: {message}")]
    Request {
        /// Underlying error text.
        message: String,
    },
}

impl From<reqwest::Error> for TransportError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            Self::Timeout
        } else if e.is_connect() {
            Self::Connect {
                message: e.to_string(),
            }
        } else {
            Self::Request {
                message: e.to_string(),
            }
        }
    }
}

/// The parts of an HTTP response the client inspects.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    /// HTTP status code.
    pub status: u16,
    /// Response body. Empty for non-2xx responses.
    pub body: String,
}

impl HttpResponse {
    /// Returns `true` for 2xx statuses.
    #[must_use]
    pub const fn is_success(&self) -> bool {
        self.status >= 200 && self.status < 300
    }
}

/// Issues HTTP GET requests on behalf of [`SocrataClient`].
///
/// The production implementation is [`transport::ReqwestTransport`]; tests
/// swap in an in-memory fake.
#[async_trait]
pub trait HttpTransport: Send + Sync {
    /// Sends a GET request to `url`.
    ///
    /// # Errors
    ///
    /// Returns [`TransportError`] if no HTTP response could be obtained.
    async fn get(&self, url: &Url) -> Result<HttpResponse, TransportError>;
}
