use chrono::NaiveDate;
use serde::Serialize;
use std::collections::BTreeMap;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CommunityPerformance {
    pub name: String,
    pub path: String,
    pub map_loads: u64,
    pub lot_clicks: u64,
    /// Lot clicks per hundred map loads, one decimal.
    pub ctr: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TopLot {
    pub rank: usize,
    pub lot: String,
    pub community: String,
    pub clicks: u64,
    /// Percent of all returned lot clicks, two decimals.
    pub share: f64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ViewsOverTime {
    pub date: String,
    pub total: u64,
    pub communities: BTreeMap<String, u64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum InsightKind {
    Trending,
    Hot,
    Opportunity,
}

impl InsightKind {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Trending => "Trending",
            Self::Hot => "Hot",
            Self::Opportunity => "Opportunity",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Insight {
    pub kind: InsightKind,
    pub title: String,
    pub description: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Organization {
    pub client: String,
    pub display_name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReportDateRange {
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub start_label: String,
    pub end_label: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReportSummary {
    pub total_map_loads: u64,
    pub total_lot_clicks: u64,
    pub overall_ctr: f64,
    pub community_count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MarketReport {
    pub organization: Organization,
    pub date_range: ReportDateRange,
    pub summary: ReportSummary,
    pub communities: Vec<CommunityPerformance>,
    pub top_lots: Vec<TopLot>,
    pub views_over_time: Vec<ViewsOverTime>,
    pub insights: Vec<Insight>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TopLotsReport {
    pub client: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub community: Option<String>,
    pub total_clicks: u64,
    pub lots: Vec<TopLot>,
}
