use crate::cli::ServeArgs;
use crate::infra::AppState;
use crate::routes::api_router;
use axum_prometheus::PrometheusMetricLayer;
use market_insights::analytics::Ga4Connector;
use market_insights::clients::ClientDirectory;
use market_insights::config::AppConfig;
use market_insights::error::AppError;
use market_insights::telemetry;
use std::sync::atomic::Ordering;
use tracing::{info, warn};

pub(crate) async fn run(mut args: ServeArgs) -> Result<(), AppError> {
    let mut config = AppConfig::load()?;

    if let Some(host) = args.host.take() {
        config.server.host = host;
    }
    if let Some(port) = args.port.take() {
        config.server.port = port;
    }

    telemetry::init(&config.telemetry)?;

    let directory = ClientDirectory::load(config.roster.path.as_deref())?;
    if directory.clients().is_empty() {
        warn!("client roster is empty; set MARKET_CLIENTS_PATH to list clients");
    }
    if config.analytics.property_id.is_none() {
        warn!("GA4_PROPERTY_ID is not set; report requests will fail until it is configured");
    }

    let (prometheus_layer, prometheus_handle) = PrometheusMetricLayer::pair();
    let connector = Ga4Connector::new(config.analytics.clone());
    let state = AppState::new(prometheus_handle, directory, connector);
    let readiness_flag = state.readiness.clone();

    let app = api_router(state).layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(?config.environment, %addr, "market insights service ready");

    axum::serve(listener, app).await?;
    Ok(())
}
