use crate::infra::{parse_limit, require_client, resolve_window, AppState};
use axum::extract::{Query, State};
use axum::http::{header, StatusCode};
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Json, Router};
use chrono::Local;
use market_insights::analytics::queries::{LotFilter, DEFAULT_LOT_LIMIT};
use market_insights::analytics::AnalyticsConnector;
use market_insights::clients::ClientProfile;
use market_insights::error::AppError;
use market_insights::report::{MarketReport, MarketReportBuilder, TopLotsReport};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::sync::atomic::Ordering;

#[derive(Debug, Default, Deserialize)]
pub(crate) struct ReportParams {
    #[serde(default)]
    pub(crate) client: Option<String>,
    #[serde(default)]
    pub(crate) start_date: Option<String>,
    #[serde(default)]
    pub(crate) end_date: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct LotsParams {
    #[serde(default)]
    pub(crate) client: Option<String>,
    #[serde(default)]
    pub(crate) start_date: Option<String>,
    #[serde(default)]
    pub(crate) end_date: Option<String>,
    #[serde(default)]
    pub(crate) community: Option<String>,
    #[serde(default)]
    pub(crate) limit: Option<String>,
}

#[derive(Debug, Serialize)]
pub(crate) struct ClientsResponse {
    pub(crate) clients: Vec<ClientProfile>,
}

pub(crate) fn api_router<C: AnalyticsConnector>(state: AppState<C>) -> Router {
    Router::new()
        .route("/health", get(healthcheck))
        .route("/ready", get(readiness_endpoint::<C>))
        .route("/metrics", get(metrics_endpoint::<C>))
        .route("/api/v1/clients", get(clients_endpoint::<C>))
        .route("/api/v1/lots", get(lots_endpoint::<C>))
        .route("/api/v1/report", get(report_endpoint::<C>))
        .with_state(state)
}

pub(crate) async fn healthcheck() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}

pub(crate) async fn readiness_endpoint<C: AnalyticsConnector>(
    State(state): State<AppState<C>>,
) -> impl IntoResponse {
    let ready = state.readiness.load(Ordering::Relaxed);
    let status = if ready {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    let payload = if ready {
        json!({ "status": "ready" })
    } else {
        json!({ "status": "initializing" })
    };

    (status, Json(payload))
}

pub(crate) async fn metrics_endpoint<C: AnalyticsConnector>(
    State(state): State<AppState<C>>,
) -> impl IntoResponse {
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        state.metrics.render(),
    )
}

pub(crate) async fn clients_endpoint<C: AnalyticsConnector>(
    State(state): State<AppState<C>>,
) -> Json<ClientsResponse> {
    Json(ClientsResponse {
        clients: state.directory.clients().to_vec(),
    })
}

pub(crate) async fn lots_endpoint<C: AnalyticsConnector>(
    State(state): State<AppState<C>>,
    Query(params): Query<LotsParams>,
) -> Result<Json<TopLotsReport>, AppError> {
    let client = require_client(params.client.as_deref())?;
    let window = resolve_window(
        params.start_date.as_deref(),
        params.end_date.as_deref(),
        Local::now().date_naive(),
    )?;
    let limit = parse_limit(params.limit.as_deref(), DEFAULT_LOT_LIMIT)?;
    let filter = LotFilter {
        community: params
            .community
            .map(|value| value.trim().to_string())
            .filter(|value| !value.is_empty()),
        limit,
    };

    let gateway = state.connector.connect().await?;
    let organization = state.directory.organization(client);
    let lots = MarketReportBuilder::new(gateway)
        .top_lots(&organization.client, window, filter)
        .await?;

    Ok(Json(lots))
}

pub(crate) async fn report_endpoint<C: AnalyticsConnector>(
    State(state): State<AppState<C>>,
    Query(params): Query<ReportParams>,
) -> Result<Json<MarketReport>, AppError> {
    let client = require_client(params.client.as_deref())?;
    let window = resolve_window(
        params.start_date.as_deref(),
        params.end_date.as_deref(),
        Local::now().date_naive(),
    )?;

    let gateway = state.connector.connect().await?;
    let organization = state.directory.organization(client);
    let report = MarketReportBuilder::new(gateway)
        .build(organization, window)
        .await?;

    Ok(Json(report))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::{to_bytes, Body};
    use axum::http::Request;
    use market_insights::analytics::queries::{COMMUNITY_DIMENSION, LOT_DIMENSION};
    use market_insights::analytics::wire::{Row, RunReportRequest, RunReportResponse};
    use market_insights::analytics::{AnalyticsError, AnalyticsGateway, CredentialsError};
    use market_insights::clients::ClientDirectory;
    use metrics_exporter_prometheus::PrometheusBuilder;
    use std::io::Cursor;
    use tower::ServiceExt;

    struct StubGateway {
        fail: bool,
    }

    impl AnalyticsGateway for StubGateway {
        async fn run_report(
            &self,
            request: RunReportRequest,
        ) -> Result<RunReportResponse, AnalyticsError> {
            if self.fail {
                return Err(AnalyticsError::Transport("connection reset".to_string()));
            }

            let dimensions = request.dimension_names();
            let rows = match (dimensions[0], dimensions.len()) {
                (COMMUNITY_DIMENSION, 2) => vec![
                    Row::new(&["Kings Landing", "/maps/kings-landing"], &[100]),
                    Row::new(&["Riverbend", "/maps/riverbend"], &[50]),
                ],
                (COMMUNITY_DIMENSION, _) => vec![Row::new(&["Kings Landing"], &[25])],
                (LOT_DIMENSION, _) => vec![
                    Row::new(&["Lot 1, Kings Landing"], &[30]),
                    Row::new(&["Lot 2, Riverbend"], &[10]),
                ],
                _ => vec![Row::new(&["20260117", "Kings Landing"], &[7])],
            };
            Ok(RunReportResponse::from_rows(rows))
        }
    }

    enum StubConnector {
        Ready,
        Failing,
        Unconfigured,
    }

    impl AnalyticsConnector for StubConnector {
        type Gateway = StubGateway;

        async fn connect(&self) -> Result<StubGateway, AnalyticsError> {
            match self {
                StubConnector::Ready => Ok(StubGateway { fail: false }),
                StubConnector::Failing => Ok(StubGateway { fail: true }),
                StubConnector::Unconfigured => Err(CredentialsError::Missing.into()),
            }
        }
    }

    fn app(connector: StubConnector) -> Router {
        let directory = ClientDirectory::from_reader(Cursor::new(
            "Client,Display Name,Website\nacme-homes,Acme Homes,\n",
        ))
        .expect("roster parses");
        let metrics = PrometheusBuilder::new().build_recorder().handle();
        api_router(AppState::new(metrics, directory, connector))
    }

    async fn get_json(app: Router, uri: &str) -> (StatusCode, serde_json::Value) {
        let response = app
            .oneshot(Request::builder().uri(uri).body(Body::empty()).expect("request"))
            .await
            .expect("router responds");
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("body reads");
        (status, serde_json::from_slice(&bytes).expect("json body"))
    }

    #[tokio::test]
    async fn report_endpoint_returns_full_report() {
        let (status, body) = get_json(
            app(StubConnector::Ready),
            "/api/v1/report?client=ACME-HOMES&start_date=2026-01-01&end_date=2026-01-28",
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["organization"]["client"], "acme-homes");
        assert_eq!(body["organization"]["display_name"], "Acme Homes");
        assert_eq!(body["date_range"]["start_date"], "2026-01-01");
        assert_eq!(body["communities"][0]["name"], "Kings Landing");
        assert_eq!(body["communities"][0]["ctr"], 25.0);
        assert_eq!(body["communities"][1]["ctr"], 0.0);
        assert_eq!(body["top_lots"][0]["share"], 75.0);
        assert_eq!(body["views_over_time"][0]["communities"]["kingsLanding"], 7);
        assert_eq!(body["insights"][0]["kind"], "trending");
    }

    #[tokio::test]
    async fn report_without_client_is_bad_request() {
        let (status, body) = get_json(app(StubConnector::Ready), "/api/v1/report").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "missing required query parameter 'client'");
    }

    #[tokio::test]
    async fn inverted_range_is_bad_request() {
        let (status, _) = get_json(
            app(StubConnector::Ready),
            "/api/v1/report?client=acme-homes&start_date=2026-02-01&end_date=2026-01-01",
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn missing_credentials_do_not_fall_back() {
        let (status, body) = get_json(
            app(StubConnector::Unconfigured),
            "/api/v1/report?client=acme-homes",
        )
        .await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert!(body["error"]
            .as_str()
            .expect("error text")
            .contains("GA4 credentials are not configured"));
    }

    #[tokio::test]
    async fn query_failure_reports_detail() {
        let (status, body) =
            get_json(app(StubConnector::Failing), "/api/v1/report?client=acme-homes").await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["error"], "failed to build market report");
        assert_eq!(body["detail"], "analytics request failed: connection reset");
    }

    #[tokio::test]
    async fn lots_endpoint_ranks_lots() {
        let (status, body) = get_json(
            app(StubConnector::Ready),
            "/api/v1/lots?client=acme-homes&community=Kings%20Landing&limit=5",
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["total_clicks"], 40);
        assert_eq!(body["community"], "Kings Landing");
        assert_eq!(body["lots"][1]["rank"], 2);
        assert_eq!(body["lots"][1]["community"], "Riverbend");
    }

    #[tokio::test]
    async fn malformed_lot_limit_is_json_bad_request() {
        let (status, body) = get_json(
            app(StubConnector::Ready),
            "/api/v1/lots?client=acme-homes&limit=abc",
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["error"]
            .as_str()
            .expect("error text")
            .starts_with("invalid query parameter 'limit'"));
    }

    #[tokio::test]
    async fn clients_endpoint_lists_roster() {
        let (status, body) = get_json(app(StubConnector::Unconfigured), "/api/v1/clients").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["clients"][0]["name"], "acme-homes");
        assert_eq!(body["clients"][0]["display_name"], "Acme Homes");
    }

    #[tokio::test]
    async fn readiness_reports_initializing_until_bound() {
        let (status, body) = get_json(app(StubConnector::Ready), "/ready").await;
        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(body["status"], "initializing");
    }
}
