pub mod client;
pub mod credentials;
pub mod gateway;
pub mod queries;
mod window;
pub mod wire;

pub use client::{Ga4Client, Ga4Connector};
pub use credentials::{CredentialsError, ServiceAccountCredentials};
pub use gateway::{AnalyticsConnector, AnalyticsGateway};
pub use window::{DateWindow, InvalidDateWindow};

#[derive(Debug, thiserror::Error)]
pub enum AnalyticsError {
    #[error(transparent)]
    Credentials(#[from] CredentialsError),
    #[error("analytics authentication failed: {0}")]
    Auth(String),
    #[error("analytics request failed: {0}")]
    Transport(String),
    #[error("analytics API returned {status}: {message}")]
    Api { status: u16, message: String },
    #[error("unreadable analytics response: {0}")]
    Decode(String),
    #[error("metric value '{0}' is not a whole number")]
    MetricValue(String),
}
