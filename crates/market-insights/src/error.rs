use crate::analytics::{AnalyticsError, CredentialsError, InvalidDateWindow};
use crate::clients::ClientDirectoryError;
use crate::config::ConfigError;
use crate::report::ReportError;
use crate::telemetry::TelemetryError;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use std::fmt;

#[derive(Debug)]
pub enum AppError {
    Config(ConfigError),
    Telemetry(TelemetryError),
    Io(std::io::Error),
    Server(axum::Error),
    Directory(ClientDirectoryError),
    MissingParameter(&'static str),
    InvalidParameter { name: &'static str, reason: String },
    Credentials(CredentialsError),
    Analytics(AnalyticsError),
    Report(ReportError),
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::MissingParameter(_) | AppError::InvalidParameter { .. } => {
                StatusCode::BAD_REQUEST
            }
            AppError::Config(_)
            | AppError::Telemetry(_)
            | AppError::Io(_)
            | AppError::Server(_)
            | AppError::Directory(_)
            | AppError::Credentials(_)
            | AppError::Analytics(_)
            | AppError::Report(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn detail(&self) -> Option<String> {
        match self {
            AppError::Report(err) => Some(err.detail()),
            AppError::Analytics(err) => Some(err.to_string()),
            _ => None,
        }
    }
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::Config(err) => write!(f, "configuration error: {}", err),
            AppError::Telemetry(err) => write!(f, "telemetry error: {}", err),
            AppError::Io(err) => write!(f, "io error: {}", err),
            AppError::Server(err) => write!(f, "server error: {}", err),
            AppError::Directory(err) => write!(f, "client directory error: {}", err),
            AppError::MissingParameter(name) => {
                write!(f, "missing required query parameter '{}'", name)
            }
            AppError::InvalidParameter { name, reason } => {
                write!(f, "invalid query parameter '{}': {}", name, reason)
            }
            AppError::Credentials(err) => write!(f, "analytics configuration error: {}", err),
            AppError::Analytics(_) => write!(f, "analytics query failed"),
            AppError::Report(_) => write!(f, "failed to build market report"),
        }
    }
}

impl std::error::Error for AppError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            AppError::Config(err) => Some(err),
            AppError::Telemetry(err) => Some(err),
            AppError::Io(err) => Some(err),
            AppError::Server(err) => Some(err),
            AppError::Directory(err) => Some(err),
            AppError::Credentials(err) => Some(err),
            AppError::Analytics(err) => Some(err),
            AppError::Report(err) => Some(err),
            AppError::MissingParameter(_) | AppError::InvalidParameter { .. } => None,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = match self.detail() {
            Some(detail) => json!({ "error": self.to_string(), "detail": detail }),
            None => json!({ "error": self.to_string() }),
        };
        (status, Json(body)).into_response()
    }
}

impl From<ConfigError> for AppError {
    fn from(value: ConfigError) -> Self {
        Self::Config(value)
    }
}

impl From<TelemetryError> for AppError {
    fn from(value: TelemetryError) -> Self {
        Self::Telemetry(value)
    }
}

impl From<std::io::Error> for AppError {
    fn from(value: std::io::Error) -> Self {
        Self::Io(value)
    }
}

impl From<axum::Error> for AppError {
    fn from(value: axum::Error) -> Self {
        Self::Server(value)
    }
}

impl From<ClientDirectoryError> for AppError {
    fn from(value: ClientDirectoryError) -> Self {
        Self::Directory(value)
    }
}

impl From<CredentialsError> for AppError {
    fn from(value: CredentialsError) -> Self {
        Self::Credentials(value)
    }
}

/// Credential failures surface as configuration errors, not query failures.
impl From<AnalyticsError> for AppError {
    fn from(value: AnalyticsError) -> Self {
        match value {
            AnalyticsError::Credentials(err) => Self::Credentials(err),
            other => Self::Analytics(other),
        }
    }
}

impl From<ReportError> for AppError {
    fn from(value: ReportError) -> Self {
        Self::Report(value)
    }
}

impl From<InvalidDateWindow> for AppError {
    fn from(value: InvalidDateWindow) -> Self {
        Self::InvalidParameter {
            name: "start_date",
            reason: value.to_string(),
        }
    }
}
