use tracing::{info, warn};

use super::insights::generate_insights;
use super::merge::{click_through_rate, merge_community_performance, rank_top_lots};
use super::series::reshape_views;
use super::views::{MarketReport, Organization, ReportDateRange, ReportSummary, TopLotsReport};
use crate::analytics::queries::{self, LotFilter};
use crate::analytics::{AnalyticsError, AnalyticsGateway, DateWindow};

#[derive(Debug, thiserror::Error)]
pub enum ReportError {
    #[error("failed to build market report: {source}")]
    Query {
        #[from]
        source: AnalyticsError,
    },
}

impl ReportError {
    pub fn detail(&self) -> String {
        match self {
            ReportError::Query { source } => source.to_string(),
        }
    }
}

#[derive(Debug)]
pub struct MarketReportBuilder<G> {
    gateway: G,
}

impl<G: AnalyticsGateway> MarketReportBuilder<G> {
    pub fn new(gateway: G) -> Self {
        Self { gateway }
    }

    /// Any failed query fails the whole report; no partial results.
    pub async fn build(
        &self,
        organization: Organization,
        window: DateWindow,
    ) -> Result<MarketReport, ReportError> {
        let client = organization.client.as_str();
        let lot_filter = LotFilter::default();

        let joined = tokio::try_join!(
            queries::map_loads_by_community(&self.gateway, client, window),
            queries::lot_clicks_by_community(&self.gateway, client, window),
            queries::top_lots(&self.gateway, client, window, &lot_filter),
            queries::views_over_time(&self.gateway, client, window),
        );

        let (loads, clicks, lots, views) = match joined {
            Ok(results) => results,
            Err(err) => {
                warn!(%client, error = %err, "market report query failed");
                return Err(err.into());
            }
        };

        let communities = merge_community_performance(&loads.rows, &clicks.rows);
        let top_lots = rank_top_lots(&lots.rows);
        let views_over_time = reshape_views(&views.rows);
        let insights = generate_insights(&communities, &top_lots);

        let summary = ReportSummary {
            total_map_loads: loads.total,
            total_lot_clicks: clicks.total,
            overall_ctr: click_through_rate(clicks.total, loads.total),
            community_count: communities.len(),
        };

        info!(
            %client,
            start = %window.start(),
            end = %window.end(),
            communities = communities.len(),
            lots = top_lots.len(),
            days = views_over_time.len(),
            "market report built"
        );

        Ok(MarketReport {
            organization,
            date_range: date_range(window),
            summary,
            communities,
            top_lots,
            views_over_time,
            insights,
        })
    }

    pub async fn top_lots(
        &self,
        client: &str,
        window: DateWindow,
        filter: LotFilter,
    ) -> Result<TopLotsReport, ReportError> {
        let result = queries::top_lots(&self.gateway, client, window, &filter)
            .await
            .inspect_err(|err| warn!(%client, error = %err, "top lots query failed"))?;

        let lots = rank_top_lots(&result.rows);
        let total_clicks = lots.iter().map(|lot| lot.clicks).sum();

        Ok(TopLotsReport {
            client: client.to_string(),
            start_date: window.start(),
            end_date: window.end(),
            community: filter.community,
            total_clicks,
            lots,
        })
    }
}

fn date_range(window: DateWindow) -> ReportDateRange {
    ReportDateRange {
        start_date: window.start(),
        end_date: window.end(),
        start_label: window.start().format("%b %-d, %Y").to_string(),
        end_label: window.end().format("%b %-d, %Y").to_string(),
    }
}
