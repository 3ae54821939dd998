//! Request and response shapes for the GA4 Data API `runReport` method.
//!
//! Only the subset of the API the market report needs is modeled here.

use serde::{Deserialize, Serialize};

use super::AnalyticsError;

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RunReportRequest {
    pub date_ranges: Vec<DateRange>,
    pub dimensions: Vec<Dimension>,
    pub metrics: Vec<Metric>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dimension_filter: Option<FilterExpression>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub order_bys: Vec<OrderBy>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub limit: Option<u32>,
}

impl RunReportRequest {
    pub fn dimension_names(&self) -> Vec<&str> {
        self.dimensions.iter().map(|dim| dim.name.as_str()).collect()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DateRange {
    pub start_date: String,
    pub end_date: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Dimension {
    pub name: String,
}

impl Dimension {
    pub fn named(name: &str) -> Self {
        Self {
            name: name.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Metric {
    pub name: String,
}

impl Metric {
    pub fn named(name: &str) -> Self {
        Self {
            name: name.to_string(),
        }
    }
}

/// Filter tree; serialized as `{"filter": {...}}` or `{"andGroup": {...}}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum FilterExpression {
    AndGroup(FilterExpressionList),
    Filter(Filter),
}

impl FilterExpression {
    pub fn exact(field_name: &str, value: &str) -> Self {
        Self::Filter(Filter {
            field_name: field_name.to_string(),
            string_filter: StringFilter {
                match_type: MatchType::Exact,
                value: value.to_string(),
                case_sensitive: true,
            },
        })
    }

    pub fn all(mut expressions: Vec<FilterExpression>) -> Self {
        if expressions.len() == 1 {
            return expressions.remove(0);
        }
        Self::AndGroup(FilterExpressionList { expressions })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FilterExpressionList {
    pub expressions: Vec<FilterExpression>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Filter {
    pub field_name: String,
    pub string_filter: StringFilter,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StringFilter {
    pub match_type: MatchType,
    pub value: String,
    pub case_sensitive: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MatchType {
    Exact,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OrderBy {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metric: Option<MetricOrderBy>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dimension: Option<DimensionOrderBy>,
    pub desc: bool,
}

impl OrderBy {
    pub fn metric_desc(metric_name: &str) -> Self {
        Self {
            metric: Some(MetricOrderBy {
                metric_name: metric_name.to_string(),
            }),
            dimension: None,
            desc: true,
        }
    }

    pub fn dimension_asc(dimension_name: &str) -> Self {
        Self {
            metric: None,
            dimension: Some(DimensionOrderBy {
                dimension_name: dimension_name.to_string(),
            }),
            desc: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MetricOrderBy {
    pub metric_name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DimensionOrderBy {
    pub dimension_name: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RunReportResponse {
    #[serde(default)]
    pub rows: Vec<Row>,
    #[serde(default)]
    pub row_count: Option<u64>,
}

impl RunReportResponse {
    pub fn from_rows(rows: Vec<Row>) -> Self {
        let row_count = Some(rows.len() as u64);
        Self { rows, row_count }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Row {
    #[serde(default)]
    pub dimension_values: Vec<CellValue>,
    #[serde(default)]
    pub metric_values: Vec<CellValue>,
}

impl Row {
    pub fn new(dimensions: &[&str], metrics: &[u64]) -> Self {
        Self {
            dimension_values: dimensions
                .iter()
                .map(|value| CellValue {
                    value: value.to_string(),
                })
                .collect(),
            metric_values: metrics
                .iter()
                .map(|value| CellValue {
                    value: value.to_string(),
                })
                .collect(),
        }
    }

    pub fn dimension(&self, index: usize) -> &str {
        self.dimension_values
            .get(index)
            .map(|cell| cell.value.as_str())
            .unwrap_or("")
    }

    /// Whole-number metric value at `index`. A missing cell counts as zero.
    pub fn count(&self, index: usize) -> Result<u64, AnalyticsError> {
        let Some(cell) = self.metric_values.get(index) else {
            return Ok(0);
        };

        let raw = cell.value.trim();
        if raw.is_empty() {
            return Ok(0);
        }

        raw.parse::<u64>()
            .map_err(|_| AnalyticsError::MetricValue(raw.to_string()))
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct CellValue {
    #[serde(default)]
    pub value: String,
}
