//! The four read-only GA4 queries behind a market report.
//!
//! Every query is scoped to one client and one date window, caps its row
//! count, drops rows whose key dimension is blank or `(not set)`, and sums
//! its own total.

use std::collections::HashMap;

use super::gateway::AnalyticsGateway;
use super::wire::{Dimension, FilterExpression, Metric, OrderBy, RunReportRequest};
use super::window::DateWindow;
use super::AnalyticsError;

pub const CLIENT_DIMENSION: &str = "customEvent:client_name";
pub const COMMUNITY_DIMENSION: &str = "customEvent:community_name";
pub const LOT_DIMENSION: &str = "customEvent:lot_label";
pub const LOT_CLICK_EVENT: &str = "lot_click";

const PATH_DIMENSION: &str = "pagePath";
const DATE_DIMENSION: &str = "date";
const EVENT_NAME_DIMENSION: &str = "eventName";
const PAGE_VIEWS: &str = "screenPageViews";
const EVENT_COUNT: &str = "eventCount";

const NOT_SET: &str = "(not set)";
const LOT_PLACEHOLDER: &str = "-";

pub const COMMUNITY_LIMIT: u32 = 100;
pub const SERIES_LIMIT: u32 = 1000;
pub const DEFAULT_LOT_LIMIT: u32 = 10;
pub const MAX_LOT_LIMIT: u32 = 50;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommunityLoads {
    pub name: String,
    pub path: String,
    pub map_loads: u64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommunityClicks {
    pub name: String,
    pub lot_clicks: u64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LotClicks {
    pub lot: String,
    pub clicks: u64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommunityViews {
    /// Raw GA4 date, `YYYYMMDD`.
    pub date: String,
    pub community: String,
    pub views: u64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryResult<T> {
    pub rows: Vec<T>,
    pub total: u64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LotFilter {
    pub community: Option<String>,
    pub limit: u32,
}

impl Default for LotFilter {
    fn default() -> Self {
        Self {
            community: None,
            limit: DEFAULT_LOT_LIMIT,
        }
    }
}

pub fn is_unset(value: &str) -> bool {
    let trimmed = value.trim();
    trimmed.is_empty() || trimmed == NOT_SET
}

pub fn is_placeholder_lot(value: &str) -> bool {
    is_unset(value) || value.trim() == LOT_PLACEHOLDER
}

fn client_filter(client: &str) -> FilterExpression {
    FilterExpression::exact(CLIENT_DIMENSION, client)
}

fn lot_click_filter(client: &str) -> Vec<FilterExpression> {
    vec![
        client_filter(client),
        FilterExpression::exact(EVENT_NAME_DIMENSION, LOT_CLICK_EVENT),
    ]
}

pub(crate) fn map_loads_request(client: &str, window: DateWindow) -> RunReportRequest {
    RunReportRequest {
        date_ranges: vec![window.to_range()],
        dimensions: vec![
            Dimension::named(COMMUNITY_DIMENSION),
            Dimension::named(PATH_DIMENSION),
        ],
        metrics: vec![Metric::named(PAGE_VIEWS)],
        dimension_filter: Some(client_filter(client)),
        order_bys: vec![OrderBy::metric_desc(PAGE_VIEWS)],
        limit: Some(COMMUNITY_LIMIT),
    }
}

pub(crate) fn lot_clicks_request(client: &str, window: DateWindow) -> RunReportRequest {
    RunReportRequest {
        date_ranges: vec![window.to_range()],
        dimensions: vec![Dimension::named(COMMUNITY_DIMENSION)],
        metrics: vec![Metric::named(EVENT_COUNT)],
        dimension_filter: Some(FilterExpression::all(lot_click_filter(client))),
        order_bys: vec![OrderBy::metric_desc(EVENT_COUNT)],
        limit: Some(COMMUNITY_LIMIT),
    }
}

pub(crate) fn top_lots_request(
    client: &str,
    window: DateWindow,
    filter: &LotFilter,
) -> RunReportRequest {
    let mut expressions = lot_click_filter(client);
    if let Some(community) = filter.community.as_deref() {
        expressions.push(FilterExpression::exact(COMMUNITY_DIMENSION, community));
    }

    RunReportRequest {
        date_ranges: vec![window.to_range()],
        dimensions: vec![Dimension::named(LOT_DIMENSION)],
        metrics: vec![Metric::named(EVENT_COUNT)],
        dimension_filter: Some(FilterExpression::all(expressions)),
        order_bys: vec![OrderBy::metric_desc(EVENT_COUNT)],
        limit: Some(filter.limit.clamp(1, MAX_LOT_LIMIT)),
    }
}

pub(crate) fn views_over_time_request(client: &str, window: DateWindow) -> RunReportRequest {
    RunReportRequest {
        date_ranges: vec![window.to_range()],
        dimensions: vec![
            Dimension::named(DATE_DIMENSION),
            Dimension::named(COMMUNITY_DIMENSION),
        ],
        metrics: vec![Metric::named(PAGE_VIEWS)],
        dimension_filter: Some(client_filter(client)),
        order_bys: vec![OrderBy::dimension_asc(DATE_DIMENSION)],
        limit: Some(SERIES_LIMIT),
    }
}

/// Map loads per community. Multiple paths for one community are summed and
/// the first path the API returned is kept.
pub async fn map_loads_by_community<G: AnalyticsGateway>(
    gateway: &G,
    client: &str,
    window: DateWindow,
) -> Result<QueryResult<CommunityLoads>, AnalyticsError> {
    let response = gateway.run_report(map_loads_request(client, window)).await?;

    let mut rows: Vec<CommunityLoads> = Vec::new();
    let mut positions: HashMap<String, usize> = HashMap::new();
    for row in &response.rows {
        let name = row.dimension(0).trim();
        if is_unset(name) {
            continue;
        }
        let loads = row.count(0)?;

        match positions.get(name) {
            Some(&index) => rows[index].map_loads += loads,
            None => {
                positions.insert(name.to_string(), rows.len());
                rows.push(CommunityLoads {
                    name: name.to_string(),
                    path: row.dimension(1).trim().to_string(),
                    map_loads: loads,
                });
            }
        }
    }

    let total = rows.iter().map(|row| row.map_loads).sum();
    Ok(QueryResult { rows, total })
}

pub async fn lot_clicks_by_community<G: AnalyticsGateway>(
    gateway: &G,
    client: &str,
    window: DateWindow,
) -> Result<QueryResult<CommunityClicks>, AnalyticsError> {
    let response = gateway.run_report(lot_clicks_request(client, window)).await?;

    let mut rows = Vec::with_capacity(response.rows.len());
    for row in &response.rows {
        let name = row.dimension(0).trim();
        if is_unset(name) {
            continue;
        }
        rows.push(CommunityClicks {
            name: name.to_string(),
            lot_clicks: row.count(0)?,
        });
    }

    let total = rows.iter().map(|row| row.lot_clicks).sum();
    Ok(QueryResult { rows, total })
}

pub async fn top_lots<G: AnalyticsGateway>(
    gateway: &G,
    client: &str,
    window: DateWindow,
    filter: &LotFilter,
) -> Result<QueryResult<LotClicks>, AnalyticsError> {
    let response = gateway
        .run_report(top_lots_request(client, window, filter))
        .await?;

    let mut rows = Vec::with_capacity(response.rows.len());
    for row in &response.rows {
        let lot = row.dimension(0).trim();
        if is_placeholder_lot(lot) {
            continue;
        }
        rows.push(LotClicks {
            lot: lot.to_string(),
            clicks: row.count(0)?,
        });
    }

    let total = rows.iter().map(|row| row.clicks).sum();
    Ok(QueryResult { rows, total })
}

/// Daily views per community. Rows with a blank community are kept so they
/// can be charted as "other"; `(not set)` rows are dropped.
pub async fn views_over_time<G: AnalyticsGateway>(
    gateway: &G,
    client: &str,
    window: DateWindow,
) -> Result<QueryResult<CommunityViews>, AnalyticsError> {
    let response = gateway
        .run_report(views_over_time_request(client, window))
        .await?;

    let mut rows = Vec::with_capacity(response.rows.len());
    for row in &response.rows {
        let date = row.dimension(0).trim();
        let community = row.dimension(1).trim();
        if is_unset(date) || community == NOT_SET {
            continue;
        }
        rows.push(CommunityViews {
            date: date.to_string(),
            community: community.to_string(),
            views: row.count(0)?,
        });
    }

    let total = rows.iter().map(|row| row.views).sum();
    Ok(QueryResult { rows, total })
}
