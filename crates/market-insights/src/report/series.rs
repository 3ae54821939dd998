use chrono::NaiveDate;
use std::collections::HashMap;

use super::views::ViewsOverTime;
use crate::analytics::queries::CommunityViews;

const OTHER_SERIES: &str = "other";

/// Short chart label for a GA4 date: `20260117` becomes `Jan 17`.
///
/// `YYYY-MM-DD` input is accepted too; anything else is returned unchanged.
pub fn format_date_label(raw: &str) -> String {
    let trimmed = raw.trim();
    NaiveDate::parse_from_str(trimmed, "%Y%m%d")
        .or_else(|_| NaiveDate::parse_from_str(trimmed, "%Y-%m-%d"))
        .map(|date| date.format("%b %-d").to_string())
        .unwrap_or_else(|_| trimmed.to_string())
}

pub fn series_key(community: &str) -> String {
    let compact: String = community.chars().filter(|c| !c.is_whitespace()).collect();
    let mut chars = compact.chars();
    match chars.next() {
        Some(first) => first.to_lowercase().chain(chars).collect(),
        None => OTHER_SERIES.to_string(),
    }
}

pub fn reshape_views(rows: &[CommunityViews]) -> Vec<ViewsOverTime> {
    let mut series: Vec<ViewsOverTime> = Vec::new();
    let mut positions: HashMap<String, usize> = HashMap::new();

    for row in rows {
        let label = format_date_label(&row.date);
        let index = match positions.get(&label) {
            Some(&index) => index,
            None => {
                positions.insert(label.clone(), series.len());
                series.push(ViewsOverTime {
                    date: label,
                    total: 0,
                    communities: Default::default(),
                });
                series.len() - 1
            }
        };

        let record = &mut series[index];
        *record
            .communities
            .entry(series_key(&row.community))
            .or_insert(0) += row.views;
        record.total += row.views;
    }

    series
}

#[cfg(test)]
mod tests {
    use super::*;

    fn views(date: &str, community: &str, count: u64) -> CommunityViews {
        CommunityViews {
            date: date.to_string(),
            community: community.to_string(),
            views: count,
        }
    }

    #[test]
    fn date_labels_are_short_and_stable() {
        assert_eq!(format_date_label("20260117"), "Jan 17");
        assert_eq!(format_date_label("20260203"), "Feb 3");
        assert_eq!(format_date_label("2026-02-03"), "Feb 3");
        assert_eq!(format_date_label("20260117"), format_date_label("20260117"));
        assert_eq!(format_date_label("yesterday"), "yesterday");
    }

    #[test]
    fn series_keys_are_camel_cased() {
        assert_eq!(series_key("Kings Landing"), "kingsLanding");
        assert_eq!(series_key("  North  Ridge Estates "), "northRidgeEstates");
        assert_eq!(series_key("riverbend"), "riverbend");
        assert_eq!(series_key(""), "other");
        assert_eq!(series_key("   "), "other");
    }

    #[test]
    fn rows_accumulate_per_date_in_first_seen_order() {
        let series = reshape_views(&[
            views("20260102", "Kings Landing", 4),
            views("20260101", "Riverbend", 1),
            views("20260102", "Riverbend", 3),
            views("20260102", "Kings Landing", 2),
            views("20260101", "", 5),
        ]);

        assert_eq!(series.len(), 2);
        assert_eq!(series[0].date, "Jan 2");
        assert_eq!(series[0].total, 9);
        assert_eq!(series[0].communities.get("kingsLanding"), Some(&6));
        assert_eq!(series[0].communities.get("riverbend"), Some(&3));

        assert_eq!(series[1].date, "Jan 1");
        assert_eq!(series[1].total, 6);
        assert_eq!(series[1].communities.get("other"), Some(&5));
    }

    #[test]
    fn no_rows_means_no_series() {
        assert!(reshape_views(&[]).is_empty());
    }
}
