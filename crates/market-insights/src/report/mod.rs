mod builder;
mod insights;
mod merge;
mod series;
pub mod views;

pub use builder::{MarketReportBuilder, ReportError};
pub use merge::{
    click_share, click_through_rate, lot_community, merge_community_performance, rank_top_lots,
};
pub use series::{format_date_label, reshape_views, series_key};
pub use views::{
    CommunityPerformance, Insight, InsightKind, MarketReport, Organization, ReportDateRange,
    ReportSummary, TopLot, TopLotsReport, ViewsOverTime,
};
