use std::time::Duration;

use serde::Deserialize;
use tracing::debug;
use yup_oauth2::authenticator::DefaultAuthenticator;
use yup_oauth2::ServiceAccountAuthenticator;

use super::credentials::{CredentialsError, ServiceAccountCredentials};
use super::gateway::{AnalyticsConnector, AnalyticsGateway};
use super::wire::{RunReportRequest, RunReportResponse};
use super::AnalyticsError;
use crate::config::AnalyticsConfig;

const API_BASE: &str = "https://analyticsdata.googleapis.com/v1beta";
const READONLY_SCOPE: &str = "https://www.googleapis.com/auth/analytics.readonly";

pub struct Ga4Client {
    http: reqwest::Client,
    auth: DefaultAuthenticator,
    property_id: String,
}

impl Ga4Client {
    pub async fn connect(config: &AnalyticsConfig) -> Result<Self, AnalyticsError> {
        let property_id = config
            .property_id
            .as_deref()
            .map(normalize_property_id)
            .filter(|id| !id.is_empty())
            .ok_or(CredentialsError::MissingPropertyId)?;

        let credentials = ServiceAccountCredentials::resolve(config)?;
        let key = credentials.to_service_account_key()?;
        let auth = ServiceAccountAuthenticator::builder(key)
            .build()
            .await
            .map_err(|err| AnalyticsError::Auth(err.to_string()))?;

        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|err| AnalyticsError::Transport(err.to_string()))?;

        debug!(%property_id, client_email = %credentials.client_email, "GA4 client ready");

        Ok(Self {
            http,
            auth,
            property_id,
        })
    }

    fn report_url(&self) -> String {
        format!("{API_BASE}/properties/{}:runReport", self.property_id)
    }
}

impl std::fmt::Debug for Ga4Client {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Ga4Client")
            .field("property_id", &self.property_id)
            .finish_non_exhaustive()
    }
}

impl AnalyticsGateway for Ga4Client {
    async fn run_report(
        &self,
        request: RunReportRequest,
    ) -> Result<RunReportResponse, AnalyticsError> {
        let token = self
            .auth
            .token(&[READONLY_SCOPE])
            .await
            .map_err(|err| AnalyticsError::Auth(err.to_string()))?;
        let bearer = token
            .token()
            .ok_or_else(|| AnalyticsError::Auth("token endpoint returned no access token".into()))?;

        let response = self
            .http
            .post(self.report_url())
            .bearer_auth(bearer)
            .json(&request)
            .send()
            .await
            .map_err(|err| {
                if err.is_timeout() {
                    AnalyticsError::Transport("request timed out".to_string())
                } else {
                    AnalyticsError::Transport(err.to_string())
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(AnalyticsError::Api {
                status: status.as_u16(),
                message: api_error_message(&body),
            });
        }

        response
            .json::<RunReportResponse>()
            .await
            .map_err(|err| AnalyticsError::Decode(err.to_string()))
    }
}

#[derive(Debug, Clone)]
pub struct Ga4Connector {
    config: AnalyticsConfig,
}

impl Ga4Connector {
    pub fn new(config: AnalyticsConfig) -> Self {
        Self { config }
    }
}

impl AnalyticsConnector for Ga4Connector {
    type Gateway = Ga4Client;

    async fn connect(&self) -> Result<Ga4Client, AnalyticsError> {
        Ga4Client::connect(&self.config).await
    }
}

/// Accepts both `123456` and `properties/123456`.
fn normalize_property_id(raw: &str) -> String {
    raw.trim()
        .trim_start_matches("properties/")
        .trim()
        .to_string()
}

#[derive(Deserialize)]
struct ApiErrorEnvelope {
    error: ApiErrorBody,
}

#[derive(Deserialize)]
struct ApiErrorBody {
    #[serde(default)]
    message: String,
}

fn api_error_message(body: &str) -> String {
    match serde_json::from_str::<ApiErrorEnvelope>(body) {
        Ok(envelope) if !envelope.error.message.is_empty() => envelope.error.message,
        _ if body.trim().is_empty() => "empty response body".to_string(),
        _ => body.trim().to_string(),
    }
}
