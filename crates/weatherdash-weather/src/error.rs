//! Transport errors and the failure codes published by the store.

use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use weatherdash_core::WeatherError;

/// Errors raised by [`crate::client::WeatherApiClient`]
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    #[error("Weather API returned {status}: {body}")]
    Status { status: StatusCode, body: String },

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Failed to build client: {0}")]
    Build(String),
}

impl ClientError {
    /// Upstream HTTP status, when the request reached the server
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            Self::Status { status, .. } => Some(*status),
            Self::Network(e) => e.status(),
            Self::Build(_) => None,
        }
    }

    pub fn user_message(&self) -> &'static str {
        ErrorCode::classify(self).user_message()
    }
}

/// Failure code of the last `fetch_weather` call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ErrorCode {
    /// Upstream 400
    CityNotFound,
    /// Upstream 401
    InvalidApiKey,
    /// Anything else: transport, timeout, decoding, other statuses
    FetchFailed,
}

impl ErrorCode {
    pub fn classify(error: &ClientError) -> Self {
        match error.status() {
            Some(StatusCode::BAD_REQUEST) => Self::CityNotFound,
            Some(StatusCode::UNAUTHORIZED) => Self::InvalidApiKey,
            _ => Self::FetchFailed,
        }
    }

    /// Translation key (`errors.*`)
    pub fn as_str(self) -> &'static str {
        match self {
            Self::CityNotFound => "cityNotFound",
            Self::InvalidApiKey => "invalidApiKey",
            Self::FetchFailed => "fetchFailed",
        }
    }

    pub fn user_message(self) -> &'static str {
        WeatherError::from(self).user_message()
    }
}

impl std::fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<ErrorCode> for WeatherError {
    fn from(code: ErrorCode) -> Self {
        match code {
            ErrorCode::CityNotFound => WeatherError::CityNotFound(code.as_str().to_string()),
            ErrorCode::InvalidApiKey => WeatherError::InvalidApiKey,
            ErrorCode::FetchFailed => WeatherError::FetchFailed(code.as_str().to_string()),
        }
    }
}
