use chrono::NaiveDate;
use market_insights::analytics::{AnalyticsConnector, DateWindow};
use market_insights::clients::ClientDirectory;
use market_insights::error::AppError;
use metrics_exporter_prometheus::PrometheusHandle;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;

/// Days covered when a request omits `start_date`.
pub(crate) const DEFAULT_WINDOW_DAYS: i64 = 28;

pub(crate) struct AppState<C> {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
    pub(crate) directory: Arc<ClientDirectory>,
    pub(crate) connector: Arc<C>,
}

impl<C> Clone for AppState<C> {
    fn clone(&self) -> Self {
        Self {
            readiness: self.readiness.clone(),
            metrics: self.metrics.clone(),
            directory: self.directory.clone(),
            connector: self.connector.clone(),
        }
    }
}

impl<C: AnalyticsConnector> AppState<C> {
    pub(crate) fn new(
        metrics: PrometheusHandle,
        directory: ClientDirectory,
        connector: C,
    ) -> Self {
        Self {
            readiness: Arc::new(AtomicBool::new(false)),
            metrics: Arc::new(metrics),
            directory: Arc::new(directory),
            connector: Arc::new(connector),
        }
    }
}

pub(crate) fn parse_date(raw: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
        .map_err(|err| format!("failed to parse '{raw}' as YYYY-MM-DD ({err})"))
}

/// Requires a non-blank `client` query value.
pub(crate) fn require_client(client: Option<&str>) -> Result<&str, AppError> {
    client
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .ok_or(AppError::MissingParameter("client"))
}

/// Inclusive window from optional `YYYY-MM-DD` bounds.
///
/// `end_date` defaults to `today`; `start_date` defaults to
/// [`DEFAULT_WINDOW_DAYS`] before the end.
pub(crate) fn resolve_window(
    start_date: Option<&str>,
    end_date: Option<&str>,
    today: NaiveDate,
) -> Result<DateWindow, AppError> {
    let end = parse_optional("end_date", end_date)?.unwrap_or(today);
    match parse_optional("start_date", start_date)? {
        Some(start) => Ok(DateWindow::new(start, end)?),
        None => Ok(DateWindow::trailing(end, DEFAULT_WINDOW_DAYS)),
    }
}

/// Lot count from an optional `limit` value; blank means `default`.
pub(crate) fn parse_limit(raw: Option<&str>, default: u32) -> Result<u32, AppError> {
    match raw.map(str::trim).filter(|value| !value.is_empty()) {
        Some(value) => value
            .parse::<u32>()
            .map_err(|err| AppError::InvalidParameter {
                name: "limit",
                reason: format!("'{value}' is not a whole number ({err})"),
            }),
        None => Ok(default),
    }
}

fn parse_optional(name: &'static str, raw: Option<&str>) -> Result<Option<NaiveDate>, AppError> {
    match raw.map(str::trim).filter(|value| !value.is_empty()) {
        Some(value) => parse_date(value)
            .map(Some)
            .map_err(|reason| AppError::InvalidParameter { name, reason }),
        None => Ok(None),
    }
}
